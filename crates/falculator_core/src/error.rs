use thiserror::Error;

use crate::sanitize::SanitizeReport;

pub type Result<T> = std::result::Result<T, SimError>;

/// Fatal simulation errors.
///
/// Sanitize corrections are not errors; they travel in the
/// [`SanitizeReport`] and the simulation proceeds once the caller accepts
/// them. Only conditions the simulator refuses to start with end up here.
#[derive(Debug, Error)]
pub enum SimError {
    /// Sanitize found unrecoverable problems (multiple main savings,
    /// zero-unit-price shares wired into cash flows).
    #[error("configuration rejected by sanitize:\n{report}")]
    SanitizeFatal { report: SanitizeReport },

    /// No main-savings item could be resolved even after sanitize.
    #[error("no main savings item resolved")]
    NoMainSavings,
}
