#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("duplicate node id: {id}")]
    DuplicateNode { id: String },

    #[error("edge {from} -> {to} references a missing node: {missing}")]
    MissingEndpoint {
        from: String,
        to: String,
        missing: String,
    },

    #[error("node {id} has a non-finite coordinate ({x}, {y})")]
    NonFiniteCoordinate { id: String, x: f64, y: f64 },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error was raised while validating a graph description.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::DuplicateNode { .. }
                | Error::MissingEndpoint { .. }
                | Error::NonFiniteCoordinate { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
