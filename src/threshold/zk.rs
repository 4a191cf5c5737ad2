//! Chaum-Pedersen proof of correct partial decryption.
//!
//! A decryption share `c_i = c^{2Δ·s_i} mod n²` is correct iff
//! `log_{c⁴}(c_i²) = log_v(v_i)`, both discrete logs being `Δ·s_i`. The
//! proof is the standard equality-of-discrete-logs argument, made
//! non-interactive with a hash challenge that binds the full statement.

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;
use unknown_order::BigNumber;

use crate::constants;
use crate::error::{Error, Result};
use crate::paillier::utils::{member_of_mul_group, mod_pow_signed};
use crate::paillier::{Ciphertext, SecretNumber};
use crate::wire::uint_bytes;

use super::ThresholdPublicKey;

/// Statement that party `id` produced `share_value` by raising
/// `ciphertext` to twice its key share scaled by `Δ`.
#[derive(Clone, Debug)]
pub struct Statement<'a> {
    pub id: u32,
    pub share_value: &'a BigNumber,
    pub ciphertext: &'a Ciphertext,
    pub pk: &'a ThresholdPublicKey,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecryptionShareProof {
    e: BigNumber,
    z: BigNumber,
}

/// Challenge for the equality-of-dlogs statement
/// `base_a^w = power_a  ∧  base_b^w = power_b`
/// given the prover's commitments `a`, `b`.
fn compute_challenge(
    a: &BigNumber,
    b: &BigNumber,
    base_a: &BigNumber,
    power_a: &BigNumber,
    base_b: &BigNumber,
    power_b: &BigNumber,
) -> BigNumber {
    BigNumber::from_slice(
        Sha256::new()
            .chain_update(constants::DECRYPTION_SHARE_PROOF_TAG.to_be_bytes())
            .chain_update(uint_bytes(a))
            .chain_update(uint_bytes(b))
            .chain_update(uint_bytes(base_a))
            .chain_update(uint_bytes(power_a))
            .chain_update(uint_bytes(base_b))
            .chain_update(uint_bytes(power_b))
            .finalize(),
    )
}

/// The dlog bases and powers of the statement:
/// `(c⁴ mod n², share_value² mod n²)`.
fn statement_group_elements(stmt: &Statement, nn: &BigNumber) -> (BigNumber, BigNumber) {
    let u = stmt.ciphertext.0.modpow(&BigNumber::from(4u64), nn);
    let ui = stmt.share_value.modpow(&BigNumber::from(2u64), nn);
    (u, ui)
}

pub(super) fn prove(
    stmt: &Statement,
    share: &BigNumber,
    rng: &mut (impl CryptoRng + RngCore),
) -> Result<DecryptionShareProof> {
    let pk = stmt.pk;
    let nn = pk.ek().nn();
    let vi = pk
        .verification_element(stmt.id)
        .ok_or(Error::InvalidKey)?;

    let (u, ui) = statement_group_elements(stmt, &nn);
    let witness = SecretNumber(pk.delta() * share);

    // Assume: share_value = c^{2Δ·s}, so ui = u^w
    debug_assert!(ui == u.modpow(&witness.0, &nn));

    // The mask range must statistically hide w·e. The prover does not
    // know n·m, so the public bound 2^{8·|n²|}·n² > n·m stands in.
    let mask_bound = (BigNumber::one() << (nn.to_bytes().len() * 8)) * &nn;
    let r = SecretNumber(BigNumber::from_rng(&mask_bound, rng));

    let a = u.modpow(&r.0, &nn);
    let b = pk.v.modpow(&r.0, &nn);

    let e = compute_challenge(&a, &b, &u, &ui, &pk.v, vi);

    // z = w·e + r
    // This operation is performed over the integers (not modulo anything)
    let z = &witness.0 * &e + &r.0;

    Ok(DecryptionShareProof { e, z })
}

pub(super) fn verify(stmt: &Statement, proof: &DecryptionShareProof) -> bool {
    let pk = stmt.pk;
    let nn = pk.ek().nn();

    let vi = match pk.verification_element(stmt.id) {
        Some(vi) => vi,
        None => {
            warn!("decryption share proof: unknown party id {}", stmt.id);
            return false;
        }
    };

    if !member_of_mul_group(stmt.share_value, &nn) {
        warn!("decryption share proof: share value not in Z*_{{n²}}");
        return false;
    }

    if !member_of_mul_group(&stmt.ciphertext.0, &nn) {
        warn!("decryption share proof: ciphertext not in Z*_{{n²}}");
        return false;
    }

    if proof.z < BigNumber::zero() {
        warn!("decryption share proof: z is negative");
        return false;
    }

    if proof.e < BigNumber::zero() || proof.e.bit_length() > 256 {
        warn!("decryption share proof: e is not a 256-bit challenge");
        return false;
    }

    let (u, ui) = statement_group_elements(stmt, &nn);
    let neg_e = -&proof.e;

    // a' = u^z · (ui)^{−e},  b' = v^z · vi^{−e}
    let ui_neg_e = match mod_pow_signed(&ui, &neg_e, &nn) {
        Some(x) => x,
        None => {
            warn!("decryption share proof: share value not invertible");
            return false;
        }
    };
    let vi_neg_e = match mod_pow_signed(vi, &neg_e, &nn) {
        Some(x) => x,
        None => {
            warn!("decryption share proof: verification element not invertible");
            return false;
        }
    };

    let a = u.modpow(&proof.z, &nn).modmul(&ui_neg_e, &nn);
    let b = pk.v.modpow(&proof.z, &nn).modmul(&vi_neg_e, &nn);

    let e = compute_challenge(&a, &b, &u, &ui, &pk.v, vi);

    if e == proof.e {
        true
    } else {
        warn!("decryption share proof: failed to verify");
        false
    }
}

#[cfg(any(test, feature = "malicious"))]
pub mod malicious {
    use super::*;

    pub fn corrupt_challenge(proof: &DecryptionShareProof) -> DecryptionShareProof {
        let mut proof = proof.clone();
        proof.e += BigNumber::one();
        proof
    }

    pub fn corrupt_response(proof: &DecryptionShareProof) -> DecryptionShareProof {
        let mut proof = proof.clone();
        proof.z += BigNumber::one();
        proof
    }
}
