use scrypto::prelude::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("[Router] Only fungible resources can be flash borrowed, '{0}' is non-fungible")]
    UnsupportedResourceKind(String),

    #[error("[Router] The requested loan amount must be positive, got '{0}'")]
    InvalidLoanAmount(Decimal),

    #[error("[Router] No lender can provide any of the requested resource")]
    NoEligibleLenders,

    #[error("[Router] Manifest slot '{0}' is already in use")]
    DuplicateSlot(String),

    #[error("[Router] Manifest slot '{0}' does not hold a live bucket or proof")]
    UnknownSlot(String),

    #[error("[Router] Failed to encode address: {0}")]
    AddressEncoding(String),

    #[error("[Router] Failed to decode address '{0}'")]
    AddressDecoding(String),

    #[error("[Router] Invalid decimal '{0}'")]
    InvalidDecimal(String),

    #[error("[Router] Unknown network '{0}'")]
    UnknownNetwork(String),

    #[error("[Router] [Config] {0}")]
    Config(String),

    #[error("[Router] [Registry] {0}")]
    Registry(String),

    #[error("[Router] [ResourceDetails] {0}")]
    ResourceDetails(String),

    #[error("[Router] The flash loan was aborted by the ledger, nothing was committed: {0}")]
    LoanAborted(String),
}

pub type Result<T> = core::result::Result<T, Error>;
