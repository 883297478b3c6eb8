use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Failed to send the HTTP request: {0}")]
    Http(#[from] reqwest::Error),

    #[error("The data provider returned status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to decode the {dataset} CSV: {source}")]
    Csv {
        dataset: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid data format in {dataset}: {message}")]
    InvalidData {
        dataset: &'static str,
        message: String,
    },

    #[error("The {0} dataset is empty")]
    EmptyDataset(String),

    #[error("Failed to read local dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Background decoding task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
