use rand::{CryptoRng, RngCore};
use unknown_order::BigNumber;

use crate::error::{Error, Result};

/// Sampling a random element of `Z*_n` fails with probability
/// `1 - phi(n)/n` per draw; for a Paillier modulus that is negligible,
/// so exhausting this budget means the RNG is broken.
const COPRIME_SAMPLE_MAX_TRIES: usize = 128;

/// Check if `x` is a member of the integers modulo `Z_n`
pub(crate) fn member_of_mod(x: &BigNumber, n: &BigNumber) -> bool {
    if x < &BigNumber::zero() || x >= n {
        return false;
    }

    true
}

/// Check if `x` is a member of the multiplicative group `Z*_n`
pub(crate) fn member_of_mul_group(x: &BigNumber, n: &BigNumber) -> bool {
    if x < &BigNumber::one() || x >= n {
        return false;
    }

    if !x.gcd(n).is_one() {
        return false;
    }

    true
}

/// Sample a uniform element of `Z*_n` by rejection.
pub(crate) fn random_coprime(
    rng: &mut (impl CryptoRng + RngCore),
    n: &BigNumber,
) -> Result<BigNumber> {
    for _ in 0..COPRIME_SAMPLE_MAX_TRIES {
        let x = BigNumber::from_rng(n, rng);
        if member_of_mul_group(&x, n) {
            return Ok(x);
        }
    }
    Err(Error::RandomnessFailure)
}

/// `l!` as a big integer; clears all Lagrange denominators for a group
/// of `l` parties.
pub(crate) fn factorial(l: u32) -> BigNumber {
    (2..=u64::from(l)).fold(BigNumber::one(), |acc, i| acc * BigNumber::from(i))
}

/// `base^exp mod n` where `exp` may be negative. A negative exponent is
/// realized by inverting `base` modulo `n` first; `None` when no inverse
/// exists.
pub(crate) fn mod_pow_signed(
    base: &BigNumber,
    exp: &BigNumber,
    n: &BigNumber,
) -> Option<BigNumber> {
    if exp < &BigNumber::zero() {
        let exp_abs = -exp;
        Some(base.invert(n)?.modpow(&exp_abs, n))
    } else {
        Some(base.modpow(exp, n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factorial_of_small_values() {
        assert_eq!(factorial(0), BigNumber::one());
        assert_eq!(factorial(1), BigNumber::one());
        assert_eq!(factorial(6), BigNumber::from(720u64));
        assert_eq!(factorial(10), BigNumber::from(3628800u64));
    }

    #[test]
    fn mul_group_membership() {
        let n = BigNumber::from(10u64);
        for (x, expected) in [
            (0u64, false),
            (1, true),
            (2, false),
            (3, true),
            (5, false),
            (7, true),
            (9, true),
            (10, false),
            (11, false),
        ] {
            assert_eq!(
                member_of_mul_group(&BigNumber::from(x), &n),
                expected,
                "x = {}",
                x
            );
        }
    }

    #[test]
    fn signed_exponents() {
        let n = BigNumber::from(101u64); // prime
        let base = BigNumber::from(7u64);

        let pos = mod_pow_signed(&base, &BigNumber::from(13u64), &n).unwrap();
        assert_eq!(pos, base.modpow(&BigNumber::from(13u64), &n));

        let neg = mod_pow_signed(&base, &(-BigNumber::from(13u64)), &n).unwrap();
        assert_eq!(pos.modmul(&neg, &n), BigNumber::one());

        // 2 has no inverse mod 10
        assert!(mod_pow_signed(
            &BigNumber::from(2u64),
            &(-BigNumber::one()),
            &BigNumber::from(10u64)
        )
        .is_none());
    }

    #[test]
    fn coprime_sampling() {
        let mut rng = rand::thread_rng();
        let n = BigNumber::from(101u64 * 103);
        for _ in 0..16 {
            let x = random_coprime(&mut rng, &n).unwrap();
            assert!(member_of_mul_group(&x, &n));
        }
    }
}
