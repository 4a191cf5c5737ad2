// Domain separation constants for hash function calls
pub const DECRYPTION_SHARE_PROOF_TAG: u8 = 0x00;

/// The min size of each safe-prime factor of the modulus.
/// Production deployments should use at least 1024 bits; the floor only
/// rules out sizes where safe primes stop existing.
pub const MIN_PRIME_SIZE: usize = 6;

/// Upper bound on the number of parties `l` in a threshold group.
/// `l!` grows past any reasonable exponent size beyond this.
pub const MAX_PARTIES: u32 = 1000;
