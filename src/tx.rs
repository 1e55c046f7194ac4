// Copyright (c) 2024 The Liquid Sign Core Developers

//! Minimal Elements transaction data model.
//!
//! Only the fields the signing engine inspects are modelled; outputs keep
//! their on-wire confidential/explicit prefix bytes so classification can
//! switch on them the same way the serialized transaction does. Framing
//! and full (de)serialization are a host-side concern.

use byteorder::{BigEndian, ByteOrder};
use heapless::Vec;

use crate::engine::Error;

/// Compressed asset generator length (prefixed point)
pub const ASSET_GENERATOR_LEN: usize = 33;

/// Compressed value commitment length (prefixed point)
pub const ASSET_COMMITMENT_LEN: usize = 33;

/// Asset id (asset tag) length
pub const ASSET_TAG_LEN: usize = 32;

/// Maximum scriptpubkey length carried per output
pub const MAX_SCRIPT_LEN: usize = 520;

/// Maximum transaction inputs per signing session
pub const MAX_INPUTS: usize = 32;

/// Maximum transaction outputs per signing session
pub const MAX_OUTPUTS: usize = 32;

/// Wire prefix marking an explicit (unblinded) asset or value
pub const EXPLICIT_PREFIX: u8 = 0x01;

/// Serialized explicit value length (prefix + u64 big-endian)
const EXPLICIT_VALUE_LEN: usize = 9;

/// One spent outpoint plus sequence
#[derive(Clone, Debug, PartialEq)]
pub struct TxIn {
    pub prev_txid: [u8; 32],
    pub prev_vout: u32,
    pub sequence: u32,
}

/// One transaction output, asset and value kept in wire form
#[derive(Clone, Debug, PartialEq)]
pub struct TxOutput {
    /// Explicit asset (`0x01` + asset id) or confidential asset generator
    pub asset: Vec<u8, ASSET_GENERATOR_LEN>,
    /// Explicit value (`0x01` + u64 BE) or confidential value commitment
    pub value: Vec<u8, ASSET_COMMITMENT_LEN>,
    /// Empty for the fee output
    pub script_pubkey: Vec<u8, MAX_SCRIPT_LEN>,
}

/// Candidate transaction supplied by the host
#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    pub version: u32,
    pub lock_time: u32,
    pub inputs: Vec<TxIn, MAX_INPUTS>,
    pub outputs: Vec<TxOutput, MAX_OUTPUTS>,
}

impl TxOutput {
    /// Build an explicit (unblinded) output; an empty `script` marks the
    /// fee output
    pub fn explicit(asset_id: &[u8; ASSET_TAG_LEN], value: u64, script: &[u8]) -> Result<Self, Error> {
        let mut asset = Vec::new();
        let _ = asset.push(EXPLICIT_PREFIX);
        asset
            .extend_from_slice(asset_id)
            .map_err(|_| Error::Internal("asset tag overflow"))?;

        let mut v = [0u8; EXPLICIT_VALUE_LEN];
        v[0] = EXPLICIT_PREFIX;
        BigEndian::write_u64(&mut v[1..], value);

        Ok(Self {
            asset,
            value: Vec::from_slice(&v).map_err(|_| Error::Internal("value overflow"))?,
            script_pubkey: Vec::from_slice(script)
                .map_err(|_| Error::BadParameters("output script too long"))?,
        })
    }

    /// Build a confidential (blinded) output
    pub fn confidential(
        asset_generator: &[u8; ASSET_GENERATOR_LEN],
        value_commitment: &[u8; ASSET_COMMITMENT_LEN],
        script: &[u8],
    ) -> Result<Self, Error> {
        Ok(Self {
            asset: Vec::from_slice(asset_generator).map_err(|_| Error::Internal("generator overflow"))?,
            value: Vec::from_slice(value_commitment).map_err(|_| Error::Internal("commitment overflow"))?,
            script_pubkey: Vec::from_slice(script)
                .map_err(|_| Error::BadParameters("output script too long"))?,
        })
    }

    /// True when the output's value carries the explicit wire prefix
    pub fn value_is_explicit(&self) -> bool {
        self.value.first() == Some(&EXPLICIT_PREFIX)
    }

    /// Satoshi value of an explicit output
    pub fn explicit_value(&self) -> Option<u64> {
        if !self.value_is_explicit() || self.value.len() != EXPLICIT_VALUE_LEN {
            return None;
        }
        Some(BigEndian::read_u64(&self.value[1..]))
    }

    /// Cleartext asset id of an explicit output
    pub fn explicit_asset_id(&self) -> Option<[u8; ASSET_TAG_LEN]> {
        if self.asset.first() != Some(&EXPLICIT_PREFIX) || self.asset.len() != 1 + ASSET_TAG_LEN {
            return None;
        }
        let mut id = [0u8; ASSET_TAG_LEN];
        id.copy_from_slice(&self.asset[1..]);
        Some(id)
    }
}
