//! Result type alias for folio operations

use crate::error::FolioError;

pub type Result<T> = std::result::Result<T, FolioError>;

/// Extension trait for Result to provide additional convenience methods
pub trait ResultExt<T> {
    /// Turns a recoverable error into `Ok(None)`, keeping fatal ones
    fn recoverable(self) -> Result<Option<T>>;
}

impl<T> ResultExt<T> for Result<T> {
    fn recoverable(self) -> Result<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_recoverable() => {
                tracing::warn!("Recoverable error: {}", err);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}
