use thiserror::Error;

/// A read of backend data failed. Terminal for the page load that needed it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load {what}: {message}")]
pub(crate) struct DataUnavailable {
    pub(crate) what: &'static str,
    pub(crate) message: String,
}

impl DataUnavailable {
    pub(crate) fn new(what: &'static str, err: impl std::fmt::Display) -> Self {
        tracing::error!(error = %err, what, "Backend read failed");
        Self { what, message: err.to_string() }
    }
}
