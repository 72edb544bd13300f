use vitals_core::CoreError;

/// Why a single message was counted as an error.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The message's pipeline panicked; the batch carried on.
    #[error("Message processing panicked: {0}")]
    Panicked(String),
}

impl MessageError {
    /// Build from a caught panic payload.
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        MessageError::Panicked(message)
    }
}
