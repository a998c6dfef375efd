use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown scenario '{name}'")]
    UnknownScenario { name: String },

    #[error("Unknown parameter '{name}'")]
    UnknownParameter { name: String },

    #[error("Invalid time step: dt must be positive and finite, got {dt}")]
    InvalidTimeStep { dt: f64 },

    #[error("Invalid horizon: expected a finite value, got {horizon}")]
    InvalidHorizon { horizon: f64 },

    #[error("Invalid range for '{name}': [{min}, {max}]")]
    InvalidRange { name: String, min: f64, max: f64 },

    #[error("Time series is empty")]
    EmptyTimeSeries,
}

pub type SimResult<T> = Result<T, SimError>;
