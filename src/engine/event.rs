// Copyright (c) 2024 The Liquid Sign Core Developers

use heapless::Vec;

use crate::network::Network;
use crate::tx::{Transaction, ASSET_COMMITMENT_LEN, MAX_OUTPUTS};

use super::{commitment::TrustedCommitment, HOST_COMMITMENT_LEN, HOST_ENTROPY_LEN};

/// Host-declared change output: the derivation path the device re-derives
/// and checks against the output's script
#[derive(Clone, Debug, Default)]
pub struct ChangeOutput<'a> {
    pub path: &'a [u32],
}

/// [Engine][super::Engine] input events, decoded from host protocol
/// messages upstream of the engine
#[derive(Clone, Debug)]
pub enum Event<'a> {
    /// No-op event
    None,

    /// Start a signing session: the candidate transaction plus one
    /// trusted commitment entry per output
    TxInit {
        network: Network,
        tx: Transaction,
        /// Host-declared input count, must match the transaction
        num_inputs: u32,
        commitments: Vec<TrustedCommitment, MAX_OUTPUTS>,
        /// Selects the anti-exfil signature protocol for the session
        use_anti_exfil: bool,
        /// One optional entry per output (or empty to declare no change)
        change: &'a [Option<ChangeOutput<'a>>],
    },

    /// Per-input data, streamed strictly in transaction input order
    TxInput {
        id: &'a [u8],
        is_witness: bool,
        /// Omitted when this device does not sign the input
        path: Option<&'a [u32]>,
        /// Required alongside `path`
        script: Option<&'a [u8]>,
        /// Required alongside `path` in anti-exfil sessions
        host_commitment: Option<[u8; HOST_COMMITMENT_LEN]>,
        /// Spent-output value commitment, required for signed segwit
        /// inputs
        value_commitment: Option<[u8; ASSET_COMMITMENT_LEN]>,
    },

    /// Fetch one signature (anti-exfil sessions only), one request per
    /// input in input order
    GetSignature {
        id: &'a [u8],
        /// Required when the corresponding input is signed
        host_entropy: Option<[u8; HOST_ENTROPY_LEN]>,
    },
}
