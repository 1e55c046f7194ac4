// Copyright (c) 2024 The Liquid Sign Core Developers

use heapless::Vec;

use crate::tx::MAX_INPUTS;

use super::{MAX_ID_LEN, MAX_SIGNATURE_LEN, SIGNER_COMMITMENT_LEN};

/// Request correlation id, echoed in replies
pub type RequestId = Vec<u8, MAX_ID_LEN>;

/// DER signature plus sighash byte
pub type SignatureBytes = Vec<u8, MAX_SIGNATURE_LEN>;

/// One entry of the batched legacy reply
#[derive(Clone, PartialEq, Debug, Default)]
pub struct SignatureReply {
    pub id: RequestId,
    /// Empty when the input carried no derivation path
    pub signature: SignatureBytes,
}

/// [Engine][super::Engine] replies, one per handled event
#[derive(Clone, PartialEq, Debug)]
pub enum Output {
    /// No reply due for this message
    None,

    /// Plain acknowledgement
    Ok,

    /// Anti-exfil signer commitment for one input (zero-length when the
    /// input is not signed by this device)
    SignerCommitment(Vec<u8, SIGNER_COMMITMENT_LEN>),

    /// One anti-exfil signature
    Signature {
        id: RequestId,
        /// Empty when the input carried no derivation path
        signature: SignatureBytes,
    },

    /// Batched legacy EC signatures, one entry per input in input order
    Signatures(Vec<SignatureReply, MAX_INPUTS>),
}
