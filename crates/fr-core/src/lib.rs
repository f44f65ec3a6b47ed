//! fr-core: shared foundation for flowrunner.
//!
//! Contains:
//! - units (uom-backed conversions between user units and model SI units)
//! - retry (bounded retry-with-delay against eventually consistent resources)

pub mod retry;
pub mod units;

pub use retry::{Clock, RetryExhausted, RetryPolicy, SystemClock, retry_with_delay};
pub use units::*;
