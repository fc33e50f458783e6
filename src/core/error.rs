//! # Errors
//!
//! One error type for the whole engine. The variants follow how each failure
//! is handled, not where it comes from:
//!
//! - `InvalidArgument`: programmer error, surfaced immediately.
//! - `Cancelled`: a cancel signal fired. Expected, recovered where raised.
//! - `UserCancelled`: an action says the user aborted it. Shown as a plain line.
//! - `Action`: any other action failure. Shown with its detail.
//! - `Source`: the lazy item source failed while a page was being filled.
//! - `Io`: the terminal itself failed. Propagates out of `MenuRunner::run`.

use std::fmt;

/// Boxed error produced by an item source or wrapped by an action failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MenuError>;

pub const DEFAULT_CANCEL_MESSAGE: &str = "Cancelled by the user";

#[derive(Debug)]
pub enum MenuError {
    /// Bad page number or page size.
    InvalidArgument(String),
    /// A cancellation token fired before the operation finished.
    Cancelled,
    /// An item's action was aborted by the user.
    UserCancelled(String),
    /// An item's action failed.
    Action(BoxError),
    /// The lazy item source failed mid-fetch.
    Source(BoxError),
    /// Terminal I/O failed.
    Io(std::io::Error),
}

impl MenuError {
    /// Wraps any error as an action failure.
    pub fn action<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        MenuError::Action(err.into())
    }

    /// The "user aborted" failure with the default message.
    pub fn user_cancelled() -> Self {
        MenuError::UserCancelled(DEFAULT_CANCEL_MESSAGE.to_string())
    }

    /// True for failures that mean "the user backed out" rather than "something broke".
    pub fn is_cancellation(&self) -> bool {
        matches!(self, MenuError::Cancelled | MenuError::UserCancelled(_))
    }
}

impl fmt::Display for MenuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            MenuError::Cancelled => write!(f, "operation cancelled"),
            MenuError::UserCancelled(msg) => write!(f, "{msg}"),
            MenuError::Action(e) => write!(f, "action failed: {e}"),
            MenuError::Source(e) => write!(f, "failed to load menu items: {e}"),
            MenuError::Io(e) => write!(f, "terminal I/O error: {e}"),
        }
    }
}

impl std::error::Error for MenuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MenuError::Action(e) | MenuError::Source(e) => Some(e.as_ref()),
            MenuError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MenuError {
    fn from(err: std::io::Error) -> Self {
        MenuError::Io(err)
    }
}
