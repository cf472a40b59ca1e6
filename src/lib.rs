pub mod config;
pub mod dates;
pub mod pump;
pub mod registry;
pub mod throttler;

pub use dates::compare_dates;
pub use registry::{Action, Throttle, DEFAULT_COOLDOWN};
pub use throttler::Throttler;
