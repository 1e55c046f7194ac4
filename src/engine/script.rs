// Copyright (c) 2024 The Liquid Sign Core Developers

use strum::{Display, EnumIter, EnumString, EnumVariantNames};

const OP_0: u8 = 0x00;
const OP_DUP: u8 = 0x76;
const OP_EQUAL: u8 = 0x87;
const OP_EQUALVERIFY: u8 = 0x88;
const OP_HASH160: u8 = 0xa9;
const OP_CHECKSIG: u8 = 0xac;
const OP_CHECKMULTISIG: u8 = 0xae;

/// Aggregate spending-script category over a session's signed inputs.
///
/// Starts at [None][ScriptFlavour::None] and absorbs one classification
/// per signed input via [merge][ScriptFlavour::merge]. Two differing
/// flavours collapse to [Mixed][ScriptFlavour::Mixed], which is terminal
/// and drives a warning on the final confirmation screen.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, EnumString, Display, EnumVariantNames, EnumIter)]
pub enum ScriptFlavour {
    /// No signed inputs observed yet
    #[default]
    None,
    /// p2pkh / p2wpkh
    SingleSig,
    /// p2sh / p2wsh / bare multisig
    Multisig,
    /// Anything else
    Other,
    /// Differing flavours observed; terminal
    Mixed,
}

impl ScriptFlavour {
    /// Classify one spent scriptpubkey
    pub fn classify(script: &[u8]) -> Self {
        match script {
            [OP_DUP, OP_HASH160, 0x14, .., OP_EQUALVERIFY, OP_CHECKSIG] if script.len() == 25 => {
                Self::SingleSig
            }
            [OP_0, 0x14, ..] if script.len() == 22 => Self::SingleSig,
            [OP_HASH160, 0x14, .., OP_EQUAL] if script.len() == 23 => Self::Multisig,
            [OP_0, 0x20, ..] if script.len() == 34 => Self::Multisig,
            [.., OP_CHECKMULTISIG] => Self::Multisig,
            _ => Self::Other,
        }
    }

    /// Absorb a newly observed flavour into the aggregate
    pub fn merge(self, observed: Self) -> Self {
        match (self, observed) {
            (agg, Self::None) => agg,
            (Self::None, obs) => obs,
            (Self::Mixed, _) => Self::Mixed,
            (agg, obs) if agg == obs => agg,
            _ => Self::Mixed,
        }
    }
}
