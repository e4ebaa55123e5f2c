//! Wall clock in the form the signing routine takes

use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Clock not set yet (e.g. before SNTP sync on a fresh boot)
    #[error("system clock is before the unix epoch")]
    BeforeEpoch,
    #[error("unix time {0} does not fit in 32 bits")]
    OutOfRange(u64),
}

/// Current unix time in seconds
pub fn unix_timestamp() -> Result<u32, ClockError> {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| ClockError::BeforeEpoch)?
        .as_secs();
    to_timestamp(secs)
}

fn to_timestamp(secs: u64) -> Result<u32, ClockError> {
    u32::try_from(secs).map_err(|_| ClockError::OutOfRange(secs))
}
