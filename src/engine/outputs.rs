// Copyright (c) 2024 The Liquid Sign Core Developers

use heapless::Vec;
use zeroize::Zeroize;

use crate::tx::{Transaction, ASSET_GENERATOR_LEN, ASSET_TAG_LEN, MAX_OUTPUTS};

use super::{commitment::TrustedCommitment, Error};

/// Normalised per-output info for the confirmation screens
#[derive(Clone, PartialEq, Debug, Zeroize)]
pub struct OutputInfo {
    pub is_confidential: bool,
    /// Host-declared change, proven by re-deriving the script
    pub is_change: bool,
    pub asset_id: [u8; ASSET_TAG_LEN],
    pub value: u64,
    /// Zeroed for explicit outputs
    pub blinding_key: [u8; ASSET_GENERATOR_LEN],
}

impl Default for OutputInfo {
    fn default() -> Self {
        Self {
            is_confidential: false,
            is_change: false,
            asset_id: [0u8; ASSET_TAG_LEN],
            value: 0,
            blinding_key: [0u8; ASSET_GENERATOR_LEN],
        }
    }
}

/// Classify every output as explicit or confidential, requiring exactly
/// one commitment entry per output.
///
/// Explicit scriptless outputs are fees; their values are summed with an
/// overflow check. For confidential outputs the trusted generator and
/// value commitment replace the host's copies in the transaction, so the
/// signature hashes cover the data that verification will later prove.
///
/// Returns per-output display info plus the fee total.
pub fn classify_outputs(
    tx: &mut Transaction,
    commitments: &[TrustedCommitment],
) -> Result<(Vec<OutputInfo, MAX_OUTPUTS>, u64), Error> {
    if commitments.len() != tx.outputs.len() {
        return Err(Error::BadParameters(
            "unexpected number of trusted commitments for transaction",
        ));
    }

    let mut infos = Vec::new();
    let mut fees = 0u64;

    for (txout, commitment) in tx.outputs.iter_mut().zip(commitments) {
        let mut info = OutputInfo::default();

        if txout.value_is_explicit() {
            let value = txout
                .explicit_value()
                .ok_or(Error::BadParameters("malformed explicit output value"))?;
            info.asset_id = txout
                .explicit_asset_id()
                .ok_or(Error::BadParameters("malformed explicit output asset"))?;
            info.value = value;

            // fees are always explicit and scriptless
            if txout.script_pubkey.is_empty() {
                fees = fees
                    .checked_add(value)
                    .ok_or(Error::BadParameters("fee total overflow"))?;
            }
        } else {
            if !commitment.have_commitments {
                return Err(Error::BadParameters(
                    "missing commitments data for blinded output",
                ));
            }

            txout.asset = Vec::from_slice(&commitment.asset_generator)
                .map_err(|_| Error::Internal("generator overflow"))?;
            txout.value = Vec::from_slice(&commitment.value_commitment)
                .map_err(|_| Error::Internal("commitment overflow"))?;

            info.is_confidential = true;
            info.asset_id = commitment.asset_id;
            info.value = commitment.value;
            info.blinding_key = commitment.blinding_key;
        }

        infos
            .push(info)
            .map_err(|_| Error::Internal("output info overflow"))?;
    }

    Ok((infos, fees))
}
