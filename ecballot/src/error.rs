use thiserror::Error;
use uuid::Uuid;

/// Error types
#[derive(Debug, Error)]
pub enum Error {
    #[error("ecballot: invalid configuration: {0}")]
    Configuration(String),

    #[error("ecballot: curve error: {0}")]
    Curve(#[from] CurveError),

    #[error("ecballot: invalid candidate {0}, election has {1} candidates")]
    InvalidCandidate(usize, usize),

    #[error("ecballot: ballot signature failed to verify")]
    Signature,

    #[error("ecballot: ballot proof rejected: {0}")]
    Proof(#[from] ProofError),

    #[error("ecballot: operation not allowed: {0}")]
    State(String),

    #[error("ecballot: no count vector matches the decrypted aggregate")]
    Tally,

    #[error("ecballot: voting authority {0} not found")]
    AuthorityNotFound(Uuid),

    #[error("ecballot: voter {0} not found")]
    VoterNotFound(Uuid),

    #[error("ecballot: RSA error: {0}")]
    RSAError(#[from] rsa::errors::Error),

    #[error("ecballot: CBOR error deserializing: {0}")]
    CBORDeserialization(#[from] serde_cbor::Error),

    #[error("ecballot: CBOR error serializing: {0}")]
    CBORSerialization(serde_cbor::Error),

    #[error("ecballot: JSON error deserializing: {0}")]
    JSONDeserialization(#[from] serde_json::Error),

    #[error("ecballot: error deserializing: unknown format")]
    DeserializationUnknownFormat,
}

impl Error {
    /// True for failures caused by the submitted ballot itself. The authority keeps
    /// accepting other ballots after one of these.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Error::Signature | Error::Proof(_) | Error::InvalidCandidate(..)
        )
    }

    /// True when a lookup at the service boundary found nothing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::AuthorityNotFound(_) | Error::VoterNotFound(_))
    }
}

/// Curve arithmetic errors
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CurveError {
    #[error("point is not on the curve")]
    NotOnCurve,

    #[error("denominator is not invertible modulo p")]
    NotInvertible,
}

/// Ballot proof verification failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProofError {
    #[error("malformed proof: expected {expected} entries per sequence, found {found}")]
    Dimension { expected: usize, found: usize },

    #[error("challenge share or response {0} is not reduced modulo the group order")]
    ScalarOutOfRange(usize),

    #[error("commitment {0} does not reconstruct from its response")]
    CommitmentMismatch(usize),

    #[error("challenge shares do not sum to the recomputed challenge")]
    ChallengeMismatch,

    #[error("curve error while checking proof: {0}")]
    Curve(#[from] CurveError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
