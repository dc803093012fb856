pub mod backup;
pub mod calculator;
pub mod clock;
pub mod log;
pub mod session;
pub mod tracker;

pub use clock::{Clock, FixedClock, SystemClock};
pub use session::{Action, Transition};
pub use tracker::{ActionReport, Tracker, UserLocks};
