use std::time::Duration;

/// Delay before retry number `attempt` (1-based): `initial * 2^attempt`,
/// capped at `max`.
pub fn backoff_delay(attempt: u32, initial: Duration, max: Duration) -> Duration {
    let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
    initial.saturating_mul(factor).min(max)
}
