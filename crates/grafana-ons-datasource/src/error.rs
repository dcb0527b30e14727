use thiserror::Error;

/// Errors produced while setting up or running the datasource.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The datasource configuration is missing or cannot be used.
    ///
    /// This is fatal for the datasource instance: no client is created.
    #[error("invalid datasource configuration: {0}")]
    Config(String),
    /// JSON sent by Grafana could not be decoded.
    #[error("could not decode {what}: {source}")]
    Decode {
        /// What was being decoded.
        what: &'static str,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// A call to the ONS API failed.
    #[error("ONS call failed: {0}")]
    Remote(#[from] aliyun_ons::Error),
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
