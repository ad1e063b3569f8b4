pub mod clock;
pub mod pacer;

pub use clock::{Clock, ManualClock, WallClock};
pub use pacer::{high_precision_sleep, TickPacer, TickStats};
