//! Paillier primitives over `Z*_{n²}` with safe-prime moduli.
//!
//! The non-threshold paths live here: keypair generation, encryption,
//! the homomorphic operations, and trapdoor decryption via `λ`/`μ`.
//! Threshold key generation reuses the factorization sampler.

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use unknown_order::BigNumber;
use zeroize::Zeroize;

use crate::constants::MIN_PRIME_SIZE;
use crate::error::{Error, Result};

use self::utils::{member_of_mod, member_of_mul_group, random_coprime};

pub(crate) mod utils;

/// Per-bit retry budget for the safe-prime candidate loop. The density
/// of Sophie Germain primes near `2^b` is `O(1/b²)` per odd candidate,
/// but each candidate here is already prime, leaving an `O(1/b)` success
/// rate; this budget puts exhaustion far out in the tail.
const SAFE_PRIME_TRIES_PER_BIT: usize = 128;

/// Retry budget for resampling a whole factor pair when the two safe
/// primes collide or fail the coprimality requirement.
const FACTOR_PAIR_MAX_TRIES: usize = 16;

/// Wrapper for a `BigNumber` that is zeroized on drop
#[derive(Debug, Zeroize)]
#[zeroize(drop)]
pub(crate) struct SecretNumber(pub(crate) BigNumber);

/// Paillier public encryption key: the modulus `n`, a product of two
/// distinct safe primes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Zeroize)]
pub struct EncryptionKey {
    n: BigNumber,
}

/// Paillier private decryption key holding the `λ`/`μ` trapdoor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Zeroize)]
#[zeroize(drop)]
pub struct DecryptionKey {
    ek: EncryptionKey,
    /// `lcm(p−1, q−1)`
    lambda: BigNumber,
    /// `λ⁻¹ mod n`
    mu: BigNumber,
}

/// Wrapper for a Paillier plaintext in `[0, n)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Zeroize)]
#[zeroize(drop)]
pub struct Plaintext(pub(crate) BigNumber);

/// Wrapper for a Paillier ciphertext in `Z*_{n²}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ciphertext(pub(crate) BigNumber);

/// Wrapper for randomness used in Paillier encryption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Zeroize)]
#[zeroize(drop)]
pub struct Randomness(pub(crate) BigNumber);

impl Plaintext {
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self(BigNumber::from_slice(bytes))
    }

    /// Big-endian magnitude bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes()
    }
}

impl From<u64> for Plaintext {
    fn from(value: u64) -> Self {
        Self(BigNumber::from(value))
    }
}

impl EncryptionKey {
    pub(crate) fn new(n: BigNumber) -> Self {
        Self { n }
    }

    pub fn n(&self) -> &BigNumber {
        &self.n
    }

    /// `n²`, the modulus of the ciphertext group
    pub fn nn(&self) -> BigNumber {
        &self.n * &self.n
    }

    /// Sample a plaintext uniformly from `[0, n)`
    pub fn random_plaintext(&self, rng: &mut (impl CryptoRng + RngCore)) -> Plaintext {
        Plaintext(BigNumber::from_rng(&self.n, rng))
    }

    /// Validate that `p` is a valid input to the Paillier encryption key.
    pub fn validate_plaintext(&self, p: &Plaintext) -> bool {
        member_of_mod(&p.0, &self.n)
    }

    /// Validate that `c` is a valid output of the Paillier encryption key.
    pub fn validate_ciphertext(&self, c: &Ciphertext) -> bool {
        member_of_mul_group(&c.0, &self.nn())
    }

    /// Encrypt a plaintext `p`, sampling fresh randomness from `Z*_n`.
    pub fn encrypt(
        &self,
        rng: &mut (impl CryptoRng + RngCore),
        p: &Plaintext,
    ) -> Result<(Ciphertext, Randomness)> {
        if !self.validate_plaintext(p) {
            return Err(Error::InvalidParameter("plaintext not in [0, n)"));
        }

        let r = Randomness(random_coprime(rng, &self.n)?);
        Ok((self.encrypt_with_randomness(p, &r), r))
    }

    /// `c = (1 + m·n) · r^n mod n²`. The identity
    /// `(1+n)^m ≡ 1 + m·n (mod n²)` turns the generator exponentiation
    /// into a single multiplication.
    pub fn encrypt_with_randomness(&self, p: &Plaintext, r: &Randomness) -> Ciphertext {
        let nn = self.nn();
        let gm = (BigNumber::one() + &p.0 * &self.n) % &nn;
        Ciphertext(gm.modmul(&r.0.modpow(&self.n, &nn), &nn))
    }

    /// Homomorphically add `c1` to `c2`
    pub fn add(&self, c1: &Ciphertext, c2: &Ciphertext) -> Ciphertext {
        Ciphertext(c1.0.modmul(&c2.0, &self.nn()))
    }

    /// Homomorphically multiply `c` by the plaintext constant `a`
    pub fn mul(&self, c: &Ciphertext, a: &Plaintext) -> Ciphertext {
        Ciphertext(c.0.modpow(&a.0, &self.nn()))
    }
}

impl DecryptionKey {
    pub fn ek(&self) -> &EncryptionKey {
        &self.ek
    }

    /// `m = L(c^λ mod n²) · μ mod n`
    pub fn decrypt(&self, c: &Ciphertext) -> Result<Plaintext> {
        if !self.ek.validate_ciphertext(c) {
            return Err(Error::InvalidParameter("ciphertext not in Z*_{n²}"));
        }

        let n = &self.ek.n;
        let u = c.0.modpow(&self.lambda, &self.ek.nn());
        Ok(Plaintext(l_function(&u, n).modmul(&self.mu, n)))
    }
}

/// `L(u) = (u − 1) / n`, defined only when `u ≡ 1 (mod n)`
pub(crate) fn l_function(u: &BigNumber, n: &BigNumber) -> BigNumber {
    (u - BigNumber::one()) / n
}

/// Generate a Paillier keypair from two fresh safe primes of `bits` bits
/// each.
pub fn keygen(
    rng: &mut (impl CryptoRng + RngCore),
    bits: usize,
) -> Result<(EncryptionKey, DecryptionKey)> {
    let factors = sample_factorization(rng, bits)?;
    let n = factors.n();

    // λ = lcm(p−1, q−1); with g = 1+n, L(g^λ) = λ mod n, so μ = λ⁻¹ mod n
    let lambda = (&factors.p - BigNumber::one()).lcm(&(&factors.q - BigNumber::one()));
    let mu = lambda.invert(&n).ok_or(Error::KeyGenerationFailure)?;

    let ek = EncryptionKey::new(n);
    let dk = DecryptionKey {
        ek: ek.clone(),
        lambda,
        mu,
    };
    Ok((ek, dk))
}

/// Factorization data for a freshly sampled modulus `n = p·q`.
#[derive(Debug, Zeroize)]
#[zeroize(drop)]
pub(crate) struct Factorization {
    pub(crate) p: BigNumber,
    pub(crate) q: BigNumber,
    /// `p' = (p−1)/2`
    pub(crate) p_germain: BigNumber,
    /// `q' = (q−1)/2`
    pub(crate) q_germain: BigNumber,
}

impl Factorization {
    pub(crate) fn n(&self) -> BigNumber {
        &self.p * &self.q
    }

    /// `m = p'·q'`
    pub(crate) fn m(&self) -> BigNumber {
        &self.p_germain * &self.q_germain
    }
}

/// Sample a safe prime `p = 2p' + 1` of exactly `bits` bits: draw a
/// Sophie Germain candidate `p'` and keep it when `2p' + 1` is prime.
/// `p'` is odd, so `p ≡ 3 (mod 4)` holds by construction.
fn sample_safe_prime(
    rng: &mut (impl CryptoRng + RngCore),
    bits: usize,
) -> Result<(BigNumber, BigNumber)> {
    for _ in 0..SAFE_PRIME_TRIES_PER_BIT.saturating_mul(bits) {
        let germain = BigNumber::prime_from_rng(bits - 1, rng);
        let prime = BigNumber::from(2u64) * &germain + BigNumber::one();
        if prime.is_prime() {
            return Ok((prime, germain));
        }
    }
    Err(Error::KeyGenerationFailure)
}

/// Sample two distinct safe primes `p`, `q` of `bits` bits each such
/// that `gcd(pq, (p−1)(q−1)) = 1`.
pub(crate) fn sample_factorization(
    rng: &mut (impl CryptoRng + RngCore),
    bits: usize,
) -> Result<Factorization> {
    if bits < MIN_PRIME_SIZE {
        return Err(Error::InvalidParameter("prime size below the minimum"));
    }

    for _ in 0..FACTOR_PAIR_MAX_TRIES {
        let (p, p_germain) = sample_safe_prime(rng, bits)?;
        let (q, q_germain) = sample_safe_prime(rng, bits)?;

        if p == q {
            continue;
        }

        // rules out p | q−1 and q | p−1 (Cunningham chains)
        let n = &p * &q;
        let totient = SecretNumber((&p - BigNumber::one()) * (&q - BigNumber::one()));
        if !n.gcd(&totient.0).is_one() {
            continue;
        }

        return Ok(Factorization {
            p,
            q,
            p_germain,
            q_germain,
        });
    }
    Err(Error::KeyGenerationFailure)
}
