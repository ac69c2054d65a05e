use thiserror::Error;

/// Failure to obtain a weather reading.
///
/// The dashboard shows these as a connection banner and skips the render.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The API answered with anything other than 200.
    #[error("City not found.")]
    NotFound,

    #[error("{0}")]
    Request(String),

    #[error("{0}")]
    Parse(String),

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),
}

/// Failure to load inventory. The store degrades these to an empty table.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Failed to connect to inventory database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("Inventory query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("Failed to parse inventory CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to read inventory file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
