#![forbid(unsafe_code)]
#![doc = "Common types and error codes for the hashrand DRBG crates."]

pub mod error;

pub use error::*;
