use thiserror::Error;

/// Errors returned by the sheet reader.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// Network or TLS failure, or a non-2xx status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The `gviz` payload could not be deserialized.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The response is not a `gviz` callback wrapper, or the base URL is bad.
    #[error("malformed sheet response: {0}")]
    Malformed(String),
}
