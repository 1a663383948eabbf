use tracing::debug;

use crate::error::LedgerError;

/// Run `op` until it succeeds, fails with something other than a version
/// conflict, or `max_attempts` conflicts have been seen.
///
/// Each attempt must re-read the rows it writes.
pub(crate) fn retry_on_conflict<T>(
    operation: &'static str,
    max_attempts: u32,
    mut op: impl FnMut() -> Result<T, LedgerError>,
) -> Result<T, LedgerError> {
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op() {
            Err(e) if e.is_conflict() => {
                if attempt >= max_attempts {
                    return Err(LedgerError::Contention {
                        attempts: attempt,
                        message: e.to_string(),
                    });
                }
                debug!(operation, attempt, error = %e, "version conflict, retrying");
                attempt += 1;
            }
            other => return other,
        }
    }
}
