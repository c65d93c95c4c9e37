use thiserror::Error;

/// Hard failures raised by the collaborators behind the orchestrator.
///
/// Soft failures (an unresolved address, an empty address list, an empty
/// route) are ordinary values that drive branching and never surface
/// through this type.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("upstream returned {status}: {message}")]
    UpstreamHttp { status: u16, message: String },

    #[error("could not decode agent transcript: {0}")]
    ProtocolDecode(String),

    #[error("warehouse query failed: {0}")]
    Warehouse(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
