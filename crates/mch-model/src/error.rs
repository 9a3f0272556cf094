use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("contact identifier is empty")]
    EmptyContactId,
    #[error("unknown record type: {0}")]
    UnknownRecordType(String),
    #[error("unknown delivery type: {0}")]
    UnknownDeliveryType(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
