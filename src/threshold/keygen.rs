//! Trusted-dealer key generation: Shamir-share the factorization
//! trapdoor of a fresh safe-prime modulus over `Z_{n·m}`.

use rand::{CryptoRng, RngCore};
use unknown_order::BigNumber;
use zeroize::Zeroize;

use crate::constants::MAX_PARTIES;
use crate::error::{Error, Result};
use crate::paillier::utils::{factorial, random_coprime};
use crate::paillier::{sample_factorization, EncryptionKey, SecretNumber};

use super::{SecretKeyShare, ThresholdPublicKey};

/// Generate a threshold keyset: a public key and one key share per
/// party, such that any `threshold` of the `parties` shares decrypt.
///
/// `bits` is the size of each safe-prime factor of the modulus. The
/// dealer is trusted: it sees the full trapdoor while dealing and must
/// forget it afterwards, which this function does by zeroizing all
/// intermediate secrets.
pub fn keygen(
    rng: &mut (impl CryptoRng + RngCore),
    bits: usize,
    parties: u32,
    threshold: u32,
) -> Result<(ThresholdPublicKey, Vec<SecretKeyShare>)> {
    if threshold == 0 {
        return Err(Error::InvalidParameter("threshold must be at least 1"));
    }
    if threshold > parties {
        return Err(Error::InvalidParameter(
            "threshold exceeds the number of parties",
        ));
    }
    if parties > MAX_PARTIES {
        return Err(Error::InvalidParameter("too many parties"));
    }

    let factors = sample_factorization(rng, bits)?;
    let n = factors.n();
    let nn = &n * &n;
    let m = SecretNumber(factors.m());
    let nm = SecretNumber(&n * &m.0);

    // The shared secret d must satisfy d ≡ 0 (mod m) and d ≡ 1 (mod n):
    // the first kills the randomness component of c^{4Δ²d}, the second
    // leaves the plaintext readable through L after the combiner cancels
    // 4Δ². gcd(m, n) = 1 was enforced when sampling the factors.
    let m_inv = SecretNumber(m.0.invert(&n).ok_or(Error::KeyGenerationFailure)?);
    let d = SecretNumber(&m.0 * &m_inv.0);

    let polynomial = Polynomial::sample(rng, &d, threshold, &nm.0);
    let shares: Vec<BigNumber> = (1..=parties)
        .map(|id| polynomial.evaluate(id, &nm.0))
        .collect();

    // v generates the squares mod n²; its powers commit to the shares
    let v = random_coprime(rng, &nn)?.modpow(&BigNumber::from(2u64), &nn);
    let delta = factorial(parties);
    let vi = shares
        .iter()
        .map(|share| {
            let exp = SecretNumber(&delta * share);
            v.modpow(&exp.0, &nn)
        })
        .collect();

    let pk = ThresholdPublicKey {
        ek: EncryptionKey::new(n),
        parties,
        threshold,
        v,
        vi,
    };

    let key_shares = shares
        .into_iter()
        .zip(1..)
        .map(|(share, id)| SecretKeyShare::new(pk.clone(), id, share))
        .collect();

    Ok((pk, key_shares))
}

/// Secret-sharing polynomial of degree `threshold − 1` over `Z_{n·m}`.
#[derive(Debug, Zeroize)]
#[zeroize(drop)]
struct Polynomial {
    coefficients: Vec<BigNumber>,
}

impl Polynomial {
    /// Constant term `d`, remaining coefficients uniform in `[0, nm)`.
    fn sample(
        rng: &mut (impl CryptoRng + RngCore),
        constant: &SecretNumber,
        threshold: u32,
        nm: &BigNumber,
    ) -> Self {
        let coefficients = core::iter::once(constant.0.clone())
            .chain((1..threshold).map(|_| BigNumber::from_rng(nm, rng)))
            .collect();
        Self { coefficients }
    }

    /// Evaluate at `x = id` using Horner's method, reduced mod `nm`.
    fn evaluate(&self, id: u32, nm: &BigNumber) -> BigNumber {
        let x = BigNumber::from(u64::from(id));
        self.coefficients
            .iter()
            .rev()
            .fold(BigNumber::zero(), |acc, coefficient| {
                (acc * &x + coefficient) % nm
            })
    }
}
