use thiserror::Error;

/// Errors raised while turning a schema into generated source.
///
/// Every variant describes a defect of the input schema: the pass aborts on
/// the first one and nothing is emitted for the file.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("identifier must not be empty")]
    EmptyIdentifier,

    #[error("invalid identifier: \"{name}\"")]
    InvalidIdentifier { name: String },

    #[error("identifier \"{name}\" is reserved")]
    ReservedIdentifier { name: String },

    #[error("method {method}: cannot resolve message type \"{reference}\"")]
    UnresolvedType { method: String, reference: String },

    #[error("failed to decode json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = GenerateError> = std::result::Result<T, E>;

/// Errors returned by a [`DispatchTable`](crate::dispatch::DispatchTable) call.
#[derive(Error, Debug, PartialEq)]
pub enum DispatchError {
    /// No handler is registered under the requested function name.
    #[error("function not found")]
    FunctionNotFound,

    #[error("service {service} of {file} is not registered")]
    ServiceNotFound { file: String, service: String },

    #[error("{0}")]
    Handler(String),
}
