/// Marker for the small set of conditions spec.md §7 says must terminate the
/// process rather than be recovered from: a snapshot write/read failure, an
/// applied-without-prepared dtx, or a size mismatch between a prepared dtx
/// and its apply request. Components that hit one of these call
/// [`FatalError::abort`] rather than propagating a `Result`, matching the
/// original's "this should never fail unless our system is broken" logger
/// calls.
#[derive(thiserror::Error, Debug)]
#[error("fatal invariant violation: {0}")]
pub struct FatalError(pub String);

impl FatalError {
    pub fn new(msg: impl Into<String>) -> Self {
        FatalError(msg.into())
    }

    /// Logs and terminates the process. Never returns.
    pub fn abort(self) -> ! {
        tracing::error!(error = %self.0, "fatal invariant violation, terminating");
        std::process::exit(1)
    }
}
