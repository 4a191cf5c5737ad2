use thiserror::Error;

/// Errors surfaced by key generation, decryption and share combination.
///
/// Nothing is retried internally except bounded sampling loops; their
/// exhaustion is reported here rather than looping forever.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A caller-supplied argument is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// Safe-prime sampling or coprimality checks exhausted their retry budget.
    #[error("key generation failure: prime sampling exhausted its retry budget")]
    KeyGenerationFailure,

    /// The set of decryption shares handed to the combiner is unusable.
    #[error("invalid share set: {0}")]
    InvalidShareSet(&'static str),

    /// A decryption-share proof failed to verify.
    #[error("invalid decryption share proof from party {id}")]
    InvalidProof {
        /// Id of the party whose proof was rejected.
        id: u32,
    },

    /// `4·Δ²` is not invertible modulo `n`; the key is malformed.
    #[error("invalid public key: combining constant is not invertible")]
    InvalidPublicKey,

    /// A key share is inconsistent with its published verification data.
    #[error("key share failed validation against its verification elements")]
    InvalidKey,

    /// A claimed plaintext disagrees with the recombined value.
    #[error("combined plaintext disagrees with the claimed plaintext")]
    DecryptionMismatch,

    /// Rejection sampling exhausted its retry budget.
    #[error("randomness failure: rejection sampling exhausted its retry budget")]
    RandomnessFailure,
}

pub type Result<T> = core::result::Result<T, Error>;
