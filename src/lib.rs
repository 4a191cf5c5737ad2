//! Threshold Paillier cryptosystem.
//!
//! Paillier encryption with the decryption key Shamir-shared among `l`
//! parties so that any `k` of them can jointly decrypt a ciphertext while
//! fewer than `k` learn nothing. Ciphertexts support homomorphic addition
//! and multiplication by plaintext constants. Each partial decryption can
//! carry a non-interactive Chaum-Pedersen proof of correctness so that
//! the combiner never has to trust an individual party.
//!
//! The engine is purely computational: no I/O, no internal mutable state.
//! Every sampling operation takes a caller-supplied cryptographically
//! secure RNG.

mod constants;
mod error;
pub mod paillier;
pub mod threshold;
pub mod wire;

pub use error::{Error, Result};
