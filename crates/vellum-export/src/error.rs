//! Export errors.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

use crate::config::ConfigError;

/// Why an export could not be completed.
///
/// Selector and stylesheet problems never show up here; they are recovered
/// locally (the rule or sheet is skipped) and reported through
/// [`vellum_common::warning::warn_once`].
#[derive(Debug, Error)]
pub enum ExportError {
    /// The host refused to provide a document.
    #[error("sandbox unavailable: {0}")]
    SandboxUnavailable(String),
    /// Any other failure while processing the document.
    #[error("processing failed: {0}")]
    Processing(String),
    /// Bad configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Run `step`, turning a panic into [`ExportError::Processing`].
pub(crate) fn catch_panic<T>(
    step: &str,
    f: impl FnOnce() -> Result<T, ExportError>,
) -> Result<T, ExportError> {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        Err(ExportError::Processing(format!(
            "{step} panicked: {}",
            panic_message(payload.as_ref())
        )))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catch_panic_passes_results_through() {
        assert!(matches!(catch_panic("ok", || Ok(3)), Ok(3)));
        assert!(matches!(
            catch_panic::<()>("err", || Err(ExportError::Processing("x".to_string()))),
            Err(ExportError::Processing(msg)) if msg == "x"
        ));
    }

    #[test]
    fn test_catch_panic_reports_message() {
        let result = catch_panic::<()>("inline", || panic!("boom {}", 7));
        assert!(matches!(
            result,
            Err(ExportError::Processing(msg)) if msg == "inline panicked: boom 7"
        ));
    }
}
