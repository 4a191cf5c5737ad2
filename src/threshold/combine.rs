//! Lagrange recombination of decryption shares in the exponent.

use unknown_order::BigNumber;

use crate::error::{Error, Result};
use crate::paillier::utils::{member_of_mul_group, mod_pow_signed};
use crate::paillier::{l_function, Ciphertext, Plaintext};

use super::{DecryptionShare, ProvedDecryptionShare, ThresholdPublicKey};

impl ThresholdPublicKey {
    /// Recombine at least `threshold` decryption shares of one
    /// ciphertext into its plaintext. The result is independent of the
    /// order of `shares`, and extra shares beyond the threshold are
    /// folded in rather than ignored.
    pub fn combine_shares(&self, shares: &[DecryptionShare]) -> Result<Plaintext> {
        self.validate_share_set(shares)?;

        let n = self.ek.n();
        let nn = self.ek.nn();
        let delta = self.delta();
        let ids: Vec<u32> = shares.iter().map(|share| share.id).collect();

        // c' = Π cᵢ^{2λᵢ} = c^{4Δ²·f(0)} mod n²
        let mut combined = BigNumber::one();
        for share in shares {
            let exponent = BigNumber::from(2u64) * lagrange_coefficient(&delta, share.id, &ids);
            let factor = mod_pow_signed(&share.value, &exponent, &nn)
                .ok_or(Error::InvalidShareSet("share value not invertible"))?;
            combined = combined.modmul(&factor, &nn);
        }

        let mu = self.combine_constant()?;
        Ok(Plaintext(l_function(&combined, n).modmul(&mu, n)))
    }

    /// Verify every share's proof, then recombine. A rejected proof
    /// reports the offending party and nothing is combined.
    pub fn combine_proved_shares(&self, proved: &[ProvedDecryptionShare]) -> Result<Plaintext> {
        for p in proved {
            if !self.verify_share(p) {
                return Err(Error::InvalidProof { id: p.share.id });
            }
        }

        let shares: Vec<DecryptionShare> = proved.iter().map(|p| p.share.clone()).collect();
        self.combine_shares(&shares)
    }

    /// Check that `claimed` really is the decryption of `c` according to
    /// the given proved shares.
    pub fn verify_decryption(
        &self,
        c: &Ciphertext,
        claimed: &Plaintext,
        proved: &[ProvedDecryptionShare],
    ) -> Result<()> {
        for p in proved {
            if p.ciphertext != *c {
                return Err(Error::InvalidProof { id: p.share.id });
            }
        }

        if self.combine_proved_shares(proved)? != *claimed {
            return Err(Error::DecryptionMismatch);
        }
        Ok(())
    }

    fn validate_share_set(&self, shares: &[DecryptionShare]) -> Result<()> {
        if (shares.len() as u64) < u64::from(self.threshold) {
            return Err(Error::InvalidShareSet("fewer shares than the threshold"));
        }

        let nn = self.ek.nn();
        let mut seen = vec![false; self.parties as usize];
        for share in shares {
            if share.id == 0 || share.id > self.parties {
                return Err(Error::InvalidShareSet("party id outside the group"));
            }
            let i = share.id as usize - 1;
            if seen[i] {
                return Err(Error::InvalidShareSet("duplicate party id"));
            }
            seen[i] = true;

            if !member_of_mul_group(&share.value, &nn) {
                return Err(Error::InvalidShareSet("share value not in Z*_{n²}"));
            }
        }
        Ok(())
    }
}

/// `Δ · Π_{j∈S, j≠i} (−j)/(i−j)`, the Lagrange coefficient at zero
/// scaled to an integer; `Δ = l!` absorbs every denominator, so the
/// division is exact.
fn lagrange_coefficient(delta: &BigNumber, i: u32, ids: &[u32]) -> BigNumber {
    let (numerator, denominator) = ids.iter().filter(|&&j| j != i).fold(
        (delta.clone(), BigNumber::one()),
        |(numerator, denominator), &j| {
            (
                numerator * -BigNumber::from(u64::from(j)),
                denominator * (BigNumber::from(u64::from(i)) - BigNumber::from(u64::from(j))),
            )
        },
    );

    debug_assert!(&numerator % &denominator == BigNumber::zero());
    numerator / denominator
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paillier::EncryptionKey;
    use crate::threshold::keygen;

    fn test_key(n: u64, parties: u32, threshold: u32, v: u64) -> ThresholdPublicKey {
        ThresholdPublicKey {
            ek: EncryptionKey::new(BigNumber::from(n)),
            parties,
            threshold,
            v: BigNumber::from(v),
            vi: vec![BigNumber::one(); parties as usize],
        }
    }

    #[test]
    fn lagrange_coefficients() {
        let delta = BigNumber::from(2u64);
        assert_eq!(lagrange_coefficient(&delta, 1, &[1, 2]), BigNumber::from(4u64));
        assert_eq!(
            lagrange_coefficient(&delta, 2, &[1, 2]),
            -BigNumber::from(2u64)
        );

        let delta = BigNumber::from(6u64);
        assert_eq!(
            lagrange_coefficient(&delta, 1, &[1, 2, 3]),
            BigNumber::from(18u64)
        );
        assert_eq!(
            lagrange_coefficient(&delta, 2, &[1, 2, 3]),
            -BigNumber::from(18u64)
        );
        assert_eq!(
            lagrange_coefficient(&delta, 3, &[1, 2, 3]),
            BigNumber::from(6u64)
        );
    }

    #[test]
    fn combining_constant() {
        // n = 101 · 103, l = 6: (4·720²)⁻¹ mod 10403
        let pk = test_key(10403, 6, 4, 1);
        assert_eq!(pk.combine_constant().unwrap(), BigNumber::from(4558u64));
    }

    #[test]
    fn fixed_combine_vector() {
        let pk = test_key(637753, 2, 2, 70661107826);
        let shares = [
            DecryptionShare {
                id: 1,
                value: BigNumber::from(384111638639u64),
            },
            DecryptionShare {
                id: 2,
                value: BigNumber::from(235243761043u64),
            },
        ];
        assert_eq!(
            pk.combine_shares(&shares).unwrap(),
            Plaintext::from(100u64)
        );

        // order does not matter
        let reversed = [shares[1].clone(), shares[0].clone()];
        assert_eq!(
            pk.combine_shares(&reversed).unwrap(),
            Plaintext::from(100u64)
        );
    }

    #[test]
    fn rejects_bad_share_sets() {
        let pk = test_key(10403, 3, 2, 1);
        let share = |id, value: u64| DecryptionShare {
            id,
            value: BigNumber::from(value),
        };

        assert_eq!(
            pk.combine_shares(&[share(1, 2)]),
            Err(Error::InvalidShareSet("fewer shares than the threshold"))
        );
        assert_eq!(
            pk.combine_shares(&[share(1, 2), share(1, 3)]),
            Err(Error::InvalidShareSet("duplicate party id"))
        );
        assert_eq!(
            pk.combine_shares(&[share(0, 2), share(1, 3)]),
            Err(Error::InvalidShareSet("party id outside the group"))
        );
        assert_eq!(
            pk.combine_shares(&[share(1, 2), share(4, 3)]),
            Err(Error::InvalidShareSet("party id outside the group"))
        );
        // 101 divides n², so it is not a group member
        assert_eq!(
            pk.combine_shares(&[share(1, 101), share(2, 3)]),
            Err(Error::InvalidShareSet("share value not in Z*_{n²}"))
        );
    }

    #[test]
    fn rejected_proof_reports_the_party() {
        let mut rng = rand::thread_rng();
        let (pk, key_shares) = keygen(&mut rng, 16, 3, 2).unwrap();

        let pt = pk.ek().random_plaintext(&mut rng);
        let (ct, _) = pk.ek().encrypt(&mut rng, &pt).unwrap();

        let mut proved: Vec<ProvedDecryptionShare> = key_shares
            .iter()
            .map(|s| s.decrypt_with_proof(&mut rng, &ct).unwrap())
            .collect();
        assert_eq!(pk.combine_proved_shares(&proved).unwrap(), pt);

        proved[1].share.corrupt();
        assert_eq!(
            pk.combine_proved_shares(&proved),
            Err(Error::InvalidProof { id: 2 })
        );
    }

    #[test]
    fn verify_decryption_end_to_end() {
        let mut rng = rand::thread_rng();
        let (pk, key_shares) = keygen(&mut rng, 16, 2, 2).unwrap();

        let pt = Plaintext::from(1234u64);
        let (ct, _) = pk.ek().encrypt(&mut rng, &pt).unwrap();
        let proved: Vec<ProvedDecryptionShare> = key_shares
            .iter()
            .map(|s| s.decrypt_with_proof(&mut rng, &ct).unwrap())
            .collect();

        pk.verify_decryption(&ct, &pt, &proved).unwrap();
        assert_eq!(
            pk.verify_decryption(&ct, &Plaintext::from(1235u64), &proved),
            Err(Error::DecryptionMismatch)
        );

        // shares bound to a different ciphertext are rejected up front
        let (other_ct, _) = pk.ek().encrypt(&mut rng, &pt).unwrap();
        assert_eq!(
            pk.verify_decryption(&other_ct, &pt, &proved),
            Err(Error::InvalidProof { id: 1 })
        );
    }
}
