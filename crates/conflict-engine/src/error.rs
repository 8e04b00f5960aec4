use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Lease {0} not found in document memory")]
    NotFound(String),

    #[error("Amendment {amendment_id} references unregistered base lease {base_lease_id}")]
    UnknownBaseLease {
        amendment_id: String,
        base_lease_id: String,
    },

    #[error("Invalid document input: {0}")]
    Validation(String),
}
