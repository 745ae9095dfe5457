use std::fmt::Display;
use std::thread;
use std::time::Duration;

/// Run `operation` up to `max_attempts` times with linearly increasing
/// backoff (`delay`, `2 * delay`, ...). `should_retry` lets callers bail
/// out immediately on permanent failures such as a rejected API key.
pub fn retry_with_backoff<T, E, F>(
    max_attempts: usize,
    delay: Duration,
    should_retry: impl Fn(&E) -> bool,
    mut operation: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Result<T, E>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation() {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts && should_retry(&e) => {
                eprintln!(
                    "Warning: attempt {}/{} failed: {}",
                    attempt, max_attempts, e
                );
                thread::sleep(delay * attempt as u32);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
