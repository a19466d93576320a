pub use tokio_util::sync::CancellationToken;

use super::FsError;

/// Fails with [`FsError::Cancelled`] once cancellation has been requested.
///
/// Call sites decide where to check; nothing is interrupted mid-flight.
pub fn check_cancellation(token: &CancellationToken) -> Result<(), FsError> {
    if token.is_cancelled() {
        return Err(FsError::Cancelled);
    }
    Ok(())
}
