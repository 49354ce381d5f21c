pub mod scroll;
pub mod state;

pub use scroll::{DEFAULT_THRESHOLD, ScrollMetrics, ScrollMonitor};
pub use state::{FeedEvent, FeedState, InFlight};
