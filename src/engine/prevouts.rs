// Copyright (c) 2024 The Liquid Sign Core Developers

use byteorder::{ByteOrder, LittleEndian};
use sha2::{Digest, Sha256};

/// Incremental, order-sensitive hash over every spent outpoint.
///
/// Matches the BIP143 `hashPrevouts` construction: each input contributes
/// its 32-byte prev txid followed by the 4-byte little-endian output
/// index, in transaction input order, with a double SHA256 at the end.
/// The trusted commitments are bound to this hash, so every input must be
/// folded in whether or not this device signs it.
///
/// [finish][Self::finish] consumes the accumulator; the type system rules
/// out feeding outpoints into an already-finalized hash.
pub struct PrevoutsHasher {
    ctx: Sha256,
}

impl PrevoutsHasher {
    pub fn new() -> Self {
        Self { ctx: Sha256::new() }
    }

    /// Fold in one outpoint, in transaction input order
    pub fn update(&mut self, prev_txid: &[u8; 32], prev_vout: u32) {
        let mut vout = [0u8; 4];
        LittleEndian::write_u32(&mut vout, prev_vout);

        self.ctx.update(prev_txid);
        self.ctx.update(vout);
    }

    /// Finalize to the double-SHA256 prevouts hash
    pub fn finish(self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&Sha256::digest(self.ctx.finalize()));
        out
    }
}

impl Default for PrevoutsHasher {
    fn default() -> Self {
        Self::new()
    }
}
