use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Validation(String),
    NotFound(String),
    Conflict(String),
    Unauthenticated,
    Forbidden,
    Storage(String),
    Cancelled,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Validation(msg) => write!(f, "Invalid input: {}", msg),
            StoreError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            StoreError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            StoreError::Unauthenticated => write!(f, "Not signed in"),
            StoreError::Forbidden => write!(f, "Forbidden"),
            StoreError::Storage(msg) => write!(f, "Storage Error: {}", msg),
            StoreError::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl std::error::Error for StoreError {}

impl StoreError {
    /// Message suitable for inline form text.
    pub fn user_message(&self) -> String {
        match self {
            StoreError::Validation(msg) => msg.clone(),
            StoreError::NotFound(_) => "That item no longer exists".to_string(),
            StoreError::Conflict(msg) => msg.clone(),
            StoreError::Unauthenticated => "Please sign in to continue".to_string(),
            StoreError::Forbidden => "You can only change your own posts".to_string(),
            StoreError::Storage(_) => "Something went wrong, please try again".to_string(),
            StoreError::Cancelled => String::new(),
        }
    }
}

// Storage plumbing speaks anyhow; everything it raises is a storage failure
impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<StoreError>() {
            Ok(store_err) => store_err,
            Err(err) => StoreError::Storage(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Storage(err.to_string())
    }
}
