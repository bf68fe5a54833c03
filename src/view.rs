//! View State

/// Fetch state behind a list or detail view.
///
/// A failed fetch is kept as an inline error the view can offer to retry,
/// never collapsed into an empty list.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ViewState<T> {
    /// Nothing fetched yet or a fetch is running
    #[default]
    Loading,

    /// Fetched successfully
    Ready(T),

    /// The last fetch failed
    Failed {
        /// Human readable reason
        message: String,
    },
}

impl<T> ViewState<T> {
    /// Data, when ready.
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Ready(data) => Some(data),
            Self::Loading | Self::Failed { .. } => None,
        }
    }

    /// Whether a fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Whether the view should offer a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Failure message, when failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { message } => Some(message),
            Self::Loading | Self::Ready(_) => None,
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for ViewState<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::Ready(data),
            Err(error) => Self::Failed {
                message: error.to_string(),
            },
        }
    }
}
