//! k-of-l threshold decryption for Paillier ciphertexts.
//!
//! A trusted generator Shamir-shares the factorization trapdoor among
//! `l` parties. Each party turns a ciphertext into a decryption share,
//! optionally with a proof of correctness, and any `k` shares recombine
//! into the plaintext via Lagrange interpolation in the exponent.

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use unknown_order::BigNumber;
use zeroize::Zeroize;

use crate::error::{Error, Result};
use crate::paillier::utils::factorial;
use crate::paillier::{Ciphertext, EncryptionKey, SecretNumber};

mod combine;
mod keygen;
pub mod zk;

pub use keygen::keygen;

/// Public key of a threshold decryption group.
///
/// `v` is a generator of squares mod `n²` and `vi[i]` commits to party
/// `i+1`'s key share; both exist only to let the combiner check
/// decryption shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPublicKey {
    ek: EncryptionKey,
    /// total number of parties `l`
    parties: u32,
    /// number of shares `k` needed to decrypt
    threshold: u32,
    v: BigNumber,
    vi: Vec<BigNumber>,
}

/// One party's share of the threshold decryption key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecretKeyShare {
    pk: ThresholdPublicKey,
    secret: ShareSecretInfo,
}

/// Secret info unique to each party. `id` is not secret but it's stored
/// here anyway because it's an essential part of secret data and parties
/// need a way to know their own id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Zeroize)]
#[zeroize(drop)]
struct ShareSecretInfo {
    /// 1-based party id
    id: u32,
    /// `f(id) mod n·m`
    share: BigNumber,
}

/// A single party's contribution `c^{2Δ·s_id} mod n²` to a decryption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecryptionShare {
    id: u32,
    value: BigNumber,
}

/// A decryption share bundled with the ciphertext it decrypts and a
/// proof that it was produced with the committed key share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvedDecryptionShare {
    share: DecryptionShare,
    ciphertext: Ciphertext,
    proof: zk::DecryptionShareProof,
}

impl ThresholdPublicKey {
    pub fn ek(&self) -> &EncryptionKey {
        &self.ek
    }

    /// Total number of parties `l`
    pub fn parties(&self) -> u32 {
        self.parties
    }

    /// Number of shares `k` needed to decrypt
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// `Δ = l!`
    pub(crate) fn delta(&self) -> BigNumber {
        factorial(self.parties)
    }

    /// Verification element `v_id` for a 1-based party id
    pub(crate) fn verification_element(&self, id: u32) -> Option<&BigNumber> {
        if id == 0 {
            return None;
        }
        self.vi.get(id as usize - 1)
    }

    /// `(4Δ²)⁻¹ mod n`, the constant that cancels the Lagrange scaling
    /// after recombination
    pub(crate) fn combine_constant(&self) -> Result<BigNumber> {
        let delta = self.delta();
        (BigNumber::from(4u64) * &delta * &delta)
            .invert(self.ek.n())
            .ok_or(Error::InvalidPublicKey)
    }

    /// Check a share's Chaum-Pedersen proof against this key.
    pub fn verify_share(&self, proved: &ProvedDecryptionShare) -> bool {
        let stmt = zk::Statement {
            id: proved.share.id,
            share_value: &proved.share.value,
            ciphertext: &proved.ciphertext,
            pk: self,
        };
        zk::verify(&stmt, &proved.proof)
    }
}

impl SecretKeyShare {
    pub(crate) fn new(pk: ThresholdPublicKey, id: u32, share: BigNumber) -> Self {
        Self {
            pk,
            secret: ShareSecretInfo { id, share },
        }
    }

    pub fn pk(&self) -> &ThresholdPublicKey {
        &self.pk
    }

    /// 1-based party id
    pub fn id(&self) -> u32 {
        self.secret.id
    }

    /// Produce this party's decryption share `c^{2Δ·s_id} mod n²`.
    pub fn decrypt(&self, c: &Ciphertext) -> Result<DecryptionShare> {
        if !self.pk.ek.validate_ciphertext(c) {
            return Err(Error::InvalidParameter("ciphertext not in Z*_{n²}"));
        }

        let nn = self.pk.ek.nn();
        let exp = SecretNumber(BigNumber::from(2u64) * self.pk.delta() * &self.secret.share);
        Ok(DecryptionShare {
            id: self.secret.id,
            value: c.0.modpow(&exp.0, &nn),
        })
    }

    /// Produce this party's decryption share along with a proof that it
    /// matches the verification element published for this party.
    pub fn decrypt_with_proof(
        &self,
        rng: &mut (impl CryptoRng + RngCore),
        c: &Ciphertext,
    ) -> Result<ProvedDecryptionShare> {
        let share = self.decrypt(c)?;
        let stmt = zk::Statement {
            id: share.id,
            share_value: &share.value,
            ciphertext: c,
            pk: &self.pk,
        };
        let proof = zk::prove(&stmt, &self.secret.share, rng)?;
        Ok(ProvedDecryptionShare {
            share,
            ciphertext: c.clone(),
            proof,
        })
    }

    /// Check this share against the published verification data: the id
    /// is in range, `v_id` commits to the stored share, and a proof
    /// produced with the share verifies on a fresh encryption.
    pub fn validate(&self, rng: &mut (impl CryptoRng + RngCore)) -> Result<()> {
        let id = self.secret.id;
        if id == 0 || id > self.pk.parties {
            return Err(Error::InvalidKey);
        }

        let nn = self.pk.ek.nn();
        let exp = SecretNumber(self.pk.delta() * &self.secret.share);
        let expected = self.pk.v.modpow(&exp.0, &nn);
        match self.pk.verification_element(id) {
            Some(vi) if *vi == expected => (),
            _ => return Err(Error::InvalidKey),
        }

        let pt = self.pk.ek.random_plaintext(rng);
        let (ct, _randomness) = self.pk.ek.encrypt(rng, &pt)?;
        let proved = self.decrypt_with_proof(rng, &ct)?;
        if !self.pk.verify_share(&proved) {
            return Err(Error::InvalidKey);
        }

        Ok(())
    }
}

impl DecryptionShare {
    /// 1-based id of the party that produced this share
    pub fn id(&self) -> u32 {
        self.id
    }
}

impl ProvedDecryptionShare {
    pub fn share(&self) -> &DecryptionShare {
        &self.share
    }
}

#[cfg(any(test, feature = "malicious"))]
pub mod malicious {
    use super::*;

    impl SecretKeyShare {
        pub fn corrupt_id(&mut self) {
            self.secret.id = self.secret.id % self.pk.parties + 1;
        }

        pub fn corrupt_share(&mut self) {
            self.secret.share += BigNumber::one();
        }

        pub fn corrupt_verification_element(&mut self) {
            let i = self.secret.id as usize - 1;
            self.pk.vi[i] += BigNumber::one();
        }
    }

    impl DecryptionShare {
        pub fn corrupt(&mut self) {
            self.value += BigNumber::one();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_honest_shares() {
        let mut rng = rand::thread_rng();
        let (_pk, shares) = keygen(&mut rng, 16, 3, 2).unwrap();
        for share in &shares {
            share.validate(&mut rng).unwrap();
        }
    }

    #[test]
    fn validate_rejects_tampering() {
        let mut rng = rand::thread_rng();
        let (_pk, shares) = keygen(&mut rng, 16, 3, 2).unwrap();

        let mut bad_id = shares[0].clone();
        bad_id.corrupt_id();
        assert_eq!(bad_id.validate(&mut rng), Err(Error::InvalidKey));

        let mut bad_share = shares[1].clone();
        bad_share.corrupt_share();
        assert_eq!(bad_share.validate(&mut rng), Err(Error::InvalidKey));

        let mut bad_vi = shares[2].clone();
        bad_vi.corrupt_verification_element();
        assert_eq!(bad_vi.validate(&mut rng), Err(Error::InvalidKey));

        let mut out_of_range = shares[0].clone();
        out_of_range.secret.id = 4;
        assert_eq!(out_of_range.validate(&mut rng), Err(Error::InvalidKey));
    }

    #[test]
    fn decrypt_rejects_malformed_ciphertext() {
        let mut rng = rand::thread_rng();
        let (pk, shares) = keygen(&mut rng, 16, 2, 2).unwrap();

        let c = Ciphertext(pk.ek().n().clone());
        assert!(shares[0].decrypt(&c).is_err());
    }
}
