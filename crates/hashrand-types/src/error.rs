/// Cryptographic operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    // General errors
    #[error("invalid argument")]
    InvalidArg,
    #[error("operation not supported")]
    NotSupported,

    // Buffer errors
    #[error("buffer length not enough: need {need}, got {got}")]
    BufferTooSmall { need: usize, got: usize },

    // Digest errors
    #[error("digest: unsupported output length {len}")]
    DigestBadOutputLength { len: usize },

    // DRBG errors
    #[error("drbg: invalid state")]
    DrbgInvalidState,
    #[error("drbg: failed to obtain entropy")]
    DrbgEntropyFail,
    #[error("drbg: entropy input too short: need at least {min}, got {got}")]
    DrbgInsufficientEntropy { min: usize, got: usize },
    #[error("drbg: input length out of range")]
    DrbgInvalidInputLength,
    #[error("drbg: request too large: max {max}, got {got}")]
    DrbgRequestTooLarge { max: usize, got: usize },
    #[error("drbg: reseed required")]
    DrbgReseedRequired,
}
