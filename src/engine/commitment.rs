// Copyright (c) 2024 The Liquid Sign Core Developers

use byteorder::{ByteOrder, LittleEndian};
use static_assertions::const_assert_eq;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::tx::{TxOutput, ASSET_COMMITMENT_LEN, ASSET_GENERATOR_LEN, ASSET_TAG_LEN};

use super::{Driver, Error};

/// Authenticated blob layout: generator, value commitment, asset id,
/// little-endian value
pub const COMMITMENT_BLOB_LEN: usize =
    ASSET_GENERATOR_LEN + ASSET_COMMITMENT_LEN + ASSET_TAG_LEN + 8;

const_assert_eq!(COMMITMENT_BLOB_LEN, 106);

/// Selects which deterministic blinding factor the driver derives for an
/// output index
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum BlindingFactorKind {
    Asset,
    Value,
}

/// Host-supplied unblinding data for one transaction output.
///
/// Issued by this device in an earlier (out of session) exchange and
/// authenticated by `authentication_tag`, but treated as untrusted until
/// [verify_trusted_commitment] proves it against the session's prevouts
/// hash.
#[derive(Clone, Debug, Zeroize)]
pub struct TrustedCommitment {
    /// False for entries paired with explicit outputs
    pub have_commitments: bool,
    pub asset_generator: [u8; ASSET_GENERATOR_LEN],
    pub value_commitment: [u8; ASSET_COMMITMENT_LEN],
    pub asset_id: [u8; ASSET_TAG_LEN],
    pub value: u64,
    /// Public blinding key for the output, surfaced on the confirmation
    /// screen alongside the unblinded amount
    pub blinding_key: [u8; ASSET_GENERATOR_LEN],
    /// HMAC tag over the commitment blob, keyed by this device
    pub authentication_tag: [u8; 32],
}

impl Default for TrustedCommitment {
    fn default() -> Self {
        Self {
            have_commitments: false,
            asset_generator: [0u8; ASSET_GENERATOR_LEN],
            value_commitment: [0u8; ASSET_COMMITMENT_LEN],
            asset_id: [0u8; ASSET_TAG_LEN],
            value: 0,
            blinding_key: [0u8; ASSET_GENERATOR_LEN],
            authentication_tag: [0u8; 32],
        }
    }
}

fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// Serialize the blob the authentication tag commits to
pub fn commitment_blob(commitment: &TrustedCommitment) -> [u8; COMMITMENT_BLOB_LEN] {
    let mut blob = [0u8; COMMITMENT_BLOB_LEN];

    let (g, rest) = blob.split_at_mut(ASSET_GENERATOR_LEN);
    let (vc, rest) = rest.split_at_mut(ASSET_COMMITMENT_LEN);
    let (id, value) = rest.split_at_mut(ASSET_TAG_LEN);

    g.copy_from_slice(&commitment.asset_generator);
    vc.copy_from_slice(&commitment.value_commitment);
    id.copy_from_slice(&commitment.asset_id);
    LittleEndian::write_u64(value, commitment.value);

    blob
}

/// Verify one trusted commitment against the finalized prevouts hash and
/// the transaction output it claims to unblind.
///
/// The asset generator is re-derived from the claimed asset id and the
/// deterministic asset blinding factor for this (prevouts hash, index)
/// pair, and must match both the commitment and the output. The value
/// commitment is re-derived the same way, with one allowance: exactly one
/// output per transaction may carry an unexpected value commitment, the
/// corrective output whose blinding factor was solved so the transaction
/// balances. `found_odd_vbf` carries that allowance across the outputs of
/// a session. The authentication tag is then recomputed over the
/// commitment blob and checked.
///
/// All comparisons are constant-time.
pub fn verify_trusted_commitment<D: Driver>(
    drv: &D,
    hash_prevouts: &[u8; 32],
    index: u32,
    txout: &TxOutput,
    commitment: &TrustedCommitment,
    found_odd_vbf: &mut bool,
) -> Result<(), Error> {
    let mut abf = drv.blinding_factor(hash_prevouts, index, BlindingFactorKind::Asset);
    let generator = drv.asset_generator(&commitment.asset_id, &abf);
    abf.zeroize();
    let generator = generator?;

    if !ct_eq(&generator, &commitment.asset_generator) || !ct_eq(&generator, &txout.asset) {
        return Err(Error::BadParameters(
            "failed to verify asset generator from commitments data",
        ));
    }

    let mut vbf = drv.blinding_factor(hash_prevouts, index, BlindingFactorKind::Value);
    let value_commitment = drv.value_commitment(commitment.value, &vbf, &generator);
    vbf.zeroize();
    let value_commitment = value_commitment?;

    if !ct_eq(&value_commitment, &commitment.value_commitment)
        || !ct_eq(&value_commitment, &txout.value)
    {
        #[cfg(feature = "log")]
        log::info!(
            "unexpected value commitment at output {} (at most one allowed per tx)",
            index
        );

        if *found_odd_vbf {
            return Err(Error::BadParameters(
                "failed to verify value commitment from commitments data",
            ));
        }
        *found_odd_vbf = true;
    }

    let tag = drv.master_hmac(&commitment_blob(commitment));
    if !ct_eq(&tag, &commitment.authentication_tag) {
        return Err(Error::BadParameters(
            "failed to verify hmac from commitments data",
        ));
    }

    Ok(())
}
