//! Deterministic Random Bit Generation (NIST SP 800-90A).
//!
//! Provides the Hash-DRBG construction (Section 10.1.1) over an injected
//! digest engine, plus the seed-length/strength parameterization shared by
//! all instances of the mechanism.

pub mod params;
pub use params::DrbgParams;

pub mod hash_drbg;
pub use hash_drbg::{HashDrbg, HashDrbgState, HashDrbgType};
