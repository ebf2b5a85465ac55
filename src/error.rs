use thiserror::Error;

#[derive(Error, Debug)]
pub enum ActionResolverError {
    #[error("Request content must not be blank")]
    MissingContent,

    #[error("Customer identifier must not be blank")]
    MissingCustomerIdentifier,

    #[error("Customer lookup failed for '{identifier}': {details}")]
    CustomerLookup { identifier: String, details: String },

    #[error("Model call failed: {0}")]
    ModelCall(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[cfg(feature = "client")]
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ActionResolverError>;
