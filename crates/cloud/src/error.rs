/// Error type for object storage configuration and writes.
#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    #[error("Invalid storage connection string: {0}")]
    InvalidConnectionString(String),

    #[error("Invalid blob URL: {0}")]
    InvalidUrl(String),

    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The storage service answered with a non-2xx status.
    #[error("Storage returned HTTP {status}{}", code_suffix(.code))]
    HttpStatus { status: u16, code: Option<String> },
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref()
        .map(|c| format!(" ({c})"))
        .unwrap_or_default()
}
