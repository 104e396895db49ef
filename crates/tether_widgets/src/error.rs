//! Widget error types

use thiserror::Error;

/// Widget-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    /// The host could not create the native resource
    #[error("could not create window: {0}")]
    WindowCreation(String),

    /// A child was requested under a widget that is tearing down or gone
    #[error("parent widget is destroyed")]
    ParentDestroyed,
}

/// Result type for widget operations
pub type Result<T> = std::result::Result<T, WidgetError>;
