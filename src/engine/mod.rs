// Copyright (c) 2024 The Liquid Sign Core Developers

//! The signing [Engine] drives one confidential-transaction signing
//! session with an untrusted host.
//!
//! A session opens with a [TxInit][Event::TxInit] carrying the candidate
//! transaction and one [TrustedCommitment] per output. The output set is
//! shown to the user (first gate), then per-input
//! [TxInput][Event::TxInput] messages stream in transaction input order.
//! Every input's outpoint is folded into the [PrevoutsHasher] whether or
//! not this device signs it; once the last input lands the commitments
//! are proven against the finalized prevouts hash. The fee is then shown
//! (second gate) and signatures are delivered: batched in one reply for
//! the legacy protocol, or streamed one per
//! [GetSignature][Event::GetSignature] under anti-exfil.
//!
//! Any error, including a declined gate, is terminal: the engine moves
//! to [Cancelled][State::Cancelled] or [Failed][State::Failed], scrubs
//! session memory, and accepts no further protocol messages until
//! [reset][Engine::reset].

use heapless::Vec;
use strum::{Display, EnumIter, EnumString, EnumVariantNames};
use zeroize::Zeroize;

use crate::network::Network;
use crate::tx::{
    Transaction, ASSET_COMMITMENT_LEN, ASSET_GENERATOR_LEN, MAX_INPUTS, MAX_OUTPUTS,
    MAX_SCRIPT_LEN,
};

mod event;
pub use event::{ChangeOutput, Event};

mod output;
pub use output::{Output, RequestId, SignatureBytes, SignatureReply};

mod error;
pub use error::{Error, ErrorCode};

mod prevouts;
pub use prevouts::PrevoutsHasher;

mod commitment;
pub use commitment::{
    commitment_blob, verify_trusted_commitment, BlindingFactorKind, TrustedCommitment,
    COMMITMENT_BLOB_LEN,
};

mod outputs;
pub use outputs::{classify_outputs, OutputInfo};

mod script;
pub use script::ScriptFlavour;

/// Maximum BIP32 derivation path length for a signing input
pub const MAX_BIP32_PATH_LEN: usize = 16;

/// Maximum request correlation id length
pub const MAX_ID_LEN: usize = 16;

/// Maximum DER signature length (including the sighash byte)
pub const MAX_SIGNATURE_LEN: usize = 73;

/// Anti-exfil signer commitment length (compressed point)
pub const SIGNER_COMMITMENT_LEN: usize = 33;

/// Anti-exfil host commitment length
pub const HOST_COMMITMENT_LEN: usize = 32;

/// Anti-exfil host entropy length
pub const HOST_ENTROPY_LEN: usize = 32;

/// Engine state enumeration
#[derive(Copy, Clone, PartialEq, Debug, EnumString, Display, EnumVariantNames, EnumIter)]
pub enum State {
    /// Idle, no session running
    Init,
    /// Output set displayed, blocked on the first user gate
    AwaitingOutputConfirmation,
    /// Streaming per-input messages (next expected input index)
    CollectingInputs(usize),
    /// Fee and warnings displayed, blocked on the final user gate
    AwaitingFeeConfirmation,
    /// Streaming anti-exfil signatures (next input index)
    EmittingSignatures(usize),
    /// Fee gate declined under anti-exfil: the final signer-commitment
    /// reply has been sent, one more host message is consumed before the
    /// cancellation surfaces so the message streams stay aligned
    CancelPending,
    /// Session complete, signatures delivered
    Complete,
    /// Session cancelled by the user
    Cancelled,
    /// Session aborted on error
    Failed,
}

/// Signature-delivery protocol, selected once per session at
/// [TxInit][Event::TxInit]
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SignatureProtocol {
    /// Deterministic EC signatures, batched into the final input reply
    Legacy,
    /// Per-input commitment exchange with signatures streamed at the end
    AntiExfil,
}

/// Outcome of a blocking confirmation gate
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum UserDecision {
    Accept,
    Decline,
    /// Equivalent to a decline
    Timeout,
}

/// Platform driver, provides key material and crypto primitives to the
/// engine (and abstracts these for testing)
pub trait Driver {
    /// Derive the deterministic blinding factor for an output of the
    /// transaction identified by `hash_prevouts`
    fn blinding_factor(
        &self,
        hash_prevouts: &[u8; 32],
        output_index: u32,
        kind: BlindingFactorKind,
    ) -> [u8; 32];

    /// Compute the asset generator for an asset id and asset blinding
    /// factor
    fn asset_generator(
        &self,
        asset_id: &[u8; 32],
        abf: &[u8; 32],
    ) -> Result<[u8; ASSET_GENERATOR_LEN], Error>;

    /// Compute the pedersen value commitment for a value, value blinding
    /// factor and asset generator
    fn value_commitment(
        &self,
        value: u64,
        vbf: &[u8; 32],
        generator: &[u8; ASSET_GENERATOR_LEN],
    ) -> Result<[u8; ASSET_COMMITMENT_LEN], Error>;

    /// HMAC with the device key used to authenticate issued commitments
    fn master_hmac(&self, msg: &[u8]) -> [u8; 32];

    /// Compute the signature hash for one input
    fn signature_hash(
        &self,
        tx: &Transaction,
        input_index: usize,
        is_witness: bool,
        script: &[u8],
        value_commitment: Option<&[u8; ASSET_COMMITMENT_LEN]>,
    ) -> Result<[u8; 32], Error>;

    /// Compute the anti-exfil signer commitment for one input
    fn signer_commitment(
        &self,
        signature_hash: &[u8; 32],
        path: &[u32],
        host_commitment: &[u8; HOST_COMMITMENT_LEN],
    ) -> Result<[u8; SIGNER_COMMITMENT_LEN], Error>;

    /// Deterministic (RFC6979) EC signature over a signature hash
    fn sign_ec(&self, signature_hash: &[u8; 32], path: &[u32]) -> Result<SignatureBytes, Error>;

    /// Anti-exfil signature, nonce tweaked by the host entropy matching
    /// the earlier commitment exchange
    fn sign_anti_exfil(
        &self,
        signature_hash: &[u8; 32],
        path: &[u32],
        host_entropy: &[u8; HOST_ENTROPY_LEN],
    ) -> Result<SignatureBytes, Error>;

    /// Derive the wallet scriptpubkey for a path, used to prove
    /// host-declared change outputs
    fn change_script(
        &self,
        network: Network,
        path: &[u32],
    ) -> Result<Vec<u8, MAX_SCRIPT_LEN>, Error>;
}

impl<T: Driver> Driver for &T {
    fn blinding_factor(
        &self,
        hash_prevouts: &[u8; 32],
        output_index: u32,
        kind: BlindingFactorKind,
    ) -> [u8; 32] {
        <T as Driver>::blinding_factor(self, hash_prevouts, output_index, kind)
    }

    fn asset_generator(
        &self,
        asset_id: &[u8; 32],
        abf: &[u8; 32],
    ) -> Result<[u8; ASSET_GENERATOR_LEN], Error> {
        <T as Driver>::asset_generator(self, asset_id, abf)
    }

    fn value_commitment(
        &self,
        value: u64,
        vbf: &[u8; 32],
        generator: &[u8; ASSET_GENERATOR_LEN],
    ) -> Result<[u8; ASSET_COMMITMENT_LEN], Error> {
        <T as Driver>::value_commitment(self, value, vbf, generator)
    }

    fn master_hmac(&self, msg: &[u8]) -> [u8; 32] {
        <T as Driver>::master_hmac(self, msg)
    }

    fn signature_hash(
        &self,
        tx: &Transaction,
        input_index: usize,
        is_witness: bool,
        script: &[u8],
        value_commitment: Option<&[u8; ASSET_COMMITMENT_LEN]>,
    ) -> Result<[u8; 32], Error> {
        <T as Driver>::signature_hash(self, tx, input_index, is_witness, script, value_commitment)
    }

    fn signer_commitment(
        &self,
        signature_hash: &[u8; 32],
        path: &[u32],
        host_commitment: &[u8; HOST_COMMITMENT_LEN],
    ) -> Result<[u8; SIGNER_COMMITMENT_LEN], Error> {
        <T as Driver>::signer_commitment(self, signature_hash, path, host_commitment)
    }

    fn sign_ec(&self, signature_hash: &[u8; 32], path: &[u32]) -> Result<SignatureBytes, Error> {
        <T as Driver>::sign_ec(self, signature_hash, path)
    }

    fn sign_anti_exfil(
        &self,
        signature_hash: &[u8; 32],
        path: &[u32],
        host_entropy: &[u8; HOST_ENTROPY_LEN],
    ) -> Result<SignatureBytes, Error> {
        <T as Driver>::sign_anti_exfil(self, signature_hash, path, host_entropy)
    }

    fn change_script(
        &self,
        network: Network,
        path: &[u32],
    ) -> Result<Vec<u8, MAX_SCRIPT_LEN>, Error> {
        <T as Driver>::change_script(self, network, path)
    }
}

/// User-interface collaborator, implements the two blocking confirmation
/// gates. Implementations may block (screen flows, button handling) and
/// return [Timeout][UserDecision::Timeout] when the user walks away.
pub trait Approver {
    /// First gate: present every output (amount, asset, change marker,
    /// blinding key for confidential outputs)
    fn confirm_outputs(&mut self, network: Network, outputs: &[OutputInfo]) -> UserDecision;

    /// Final gate: present the fee total plus a warning when the signed
    /// inputs mixed script types
    fn confirm_final(&mut self, fee: u64, mixed_inputs: bool) -> UserDecision;
}

/// Per-input signing context, retained until signature delivery
#[derive(Clone, Debug, Default)]
pub struct SigningData {
    pub id: RequestId,
    /// Empty when this device does not sign the input
    pub path: Vec<u32, MAX_BIP32_PATH_LEN>,
    pub signature_hash: [u8; 32],
    pub signer_commitment: Option<[u8; SIGNER_COMMITMENT_LEN]>,
}

impl Zeroize for SigningData {
    fn zeroize(&mut self) {
        self.id[..].zeroize();
        self.id.clear();
        self.path[..].zeroize();
        self.path.clear();
        self.signature_hash.zeroize();
        if let Some(c) = self.signer_commitment.as_mut() {
            c.zeroize();
        }
        self.signer_commitment = None;
    }
}

/// Signing-session engine.
///
/// Owns all state for exactly one in-flight session; buffers are
/// pre-sized at their protocol maxima so no allocation happens per
/// message. Session memory is scrubbed on every exit path (completion,
/// cancellation, error, drop).
pub struct Engine<DRV: Driver, UI: Approver> {
    drv: DRV,
    ui: UI,

    state: State,
    protocol: SignatureProtocol,

    tx: Option<Transaction>,
    commitments: Vec<TrustedCommitment, MAX_OUTPUTS>,
    output_info: Vec<OutputInfo, MAX_OUTPUTS>,
    signing_data: Vec<SigningData, MAX_INPUTS>,
    prevouts: Option<PrevoutsHasher>,
    script_flavour: ScriptFlavour,
    fees: u64,
}

impl<DRV: Driver, UI: Approver> Engine<DRV, UI> {
    /// Create a new signing engine with the provided driver and approver
    pub fn new(drv: DRV, ui: UI) -> Self {
        Self {
            drv,
            ui,
            state: State::Init,
            protocol: SignatureProtocol::Legacy,
            tx: None,
            commitments: Vec::new(),
            output_info: Vec::new(),
            signing_data: Vec::new(),
            prevouts: None,
            script_flavour: ScriptFlavour::None,
            fees: 0,
        }
    }

    /// Fetch the current engine state
    pub fn state(&self) -> State {
        self.state
    }

    /// Return a closed engine to [State::Init] for a fresh session
    pub fn reset(&mut self) {
        self.clear_session();
        self.state = State::Init;
    }

    /// Handle one host event, returning the reply due (if any).
    ///
    /// On error the session is over: the state moves to
    /// [Cancelled][State::Cancelled] (user declines) or
    /// [Failed][State::Failed] (everything else) and session memory is
    /// scrubbed before the error is returned.
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn update(&mut self, evt: Event<'_>) -> Result<Output, Error> {
        #[cfg(feature = "log")]
        log::debug!("engine event (state: {})", self.state);

        let r = self.handle_event(evt);

        if let Err(e) = &r {
            #[cfg(feature = "log")]
            log::warn!("session aborted (state: {}): {:?}", self.state, e);

            self.state = match e {
                Error::UserCancelled => State::Cancelled,
                _ => State::Failed,
            };
            self.clear_session();
        }

        r
    }

    fn handle_event(&mut self, evt: Event<'_>) -> Result<Output, Error> {
        match (self.state, evt) {
            // a declined anti-exfil fee gate owes the host one more
            // reply, delivered as this error
            (State::CancelPending, _) => Err(Error::UserCancelled),

            (_, Event::None) => Ok(Output::None),

            (
                State::Init,
                Event::TxInit {
                    network,
                    tx,
                    num_inputs,
                    commitments,
                    use_anti_exfil,
                    change,
                },
            ) => self.tx_init(network, tx, num_inputs, commitments, use_anti_exfil, change),

            (
                State::CollectingInputs(index),
                Event::TxInput {
                    id,
                    is_witness,
                    path,
                    script,
                    host_commitment,
                    value_commitment,
                },
            ) => self.tx_input(index, id, is_witness, path, script, host_commitment, value_commitment),

            (State::EmittingSignatures(index), Event::GetSignature { id, host_entropy }) => {
                self.get_signature(index, id, host_entropy)
            }

            _ => Err(Error::Protocol("unexpected message")),
        }
    }

    /// Open a session: validate the transaction shape, classify outputs,
    /// prove declared change, then run the first user gate
    #[cfg_attr(feature = "noinline", inline(never))]
    fn tx_init(
        &mut self,
        network: Network,
        tx: Transaction,
        num_inputs: u32,
        commitments: Vec<TrustedCommitment, MAX_OUTPUTS>,
        use_anti_exfil: bool,
        change: &[Option<ChangeOutput<'_>>],
    ) -> Result<Output, Error> {
        // stash host buffers in the session up front so every abort path
        // scrubs them
        self.tx = Some(tx);
        self.commitments = commitments;
        self.protocol = match use_anti_exfil {
            true => SignatureProtocol::AntiExfil,
            false => SignatureProtocol::Legacy,
        };

        if !network.is_liquid() {
            return Err(Error::BadParameters(
                "transaction signing requires a liquid network",
            ));
        }

        let Some(tx) = self.tx.as_mut() else {
            return Err(Error::Internal("no transaction for session"));
        };

        if num_inputs == 0 || num_inputs as usize != tx.inputs.len() {
            return Err(Error::BadParameters(
                "unexpected number of inputs for transaction",
            ));
        }
        if tx.outputs.is_empty() {
            return Err(Error::BadParameters("transaction has no outputs"));
        }

        let input_count = tx.inputs.len();

        let (mut output_info, fees) = classify_outputs(tx, &self.commitments)?;

        validate_change(&self.drv, network, tx, change, &mut output_info)?;

        self.output_info = output_info;
        self.fees = fees;

        // First gate. The outputs are shown optimistically here; the
        // commitments backing the confidential ones are only provable
        // once every input outpoint is known.
        self.state = State::AwaitingOutputConfirmation;
        match self.ui.confirm_outputs(network, &self.output_info) {
            UserDecision::Accept => (),
            _ => return Err(Error::UserCancelled),
        }

        #[cfg(feature = "log")]
        log::debug!("outputs confirmed ({} inputs expected)", input_count);

        self.signing_data.clear();
        self.signing_data
            .resize_default(input_count)
            .map_err(|_| Error::Internal("signing data overflow"))?;
        self.prevouts = Some(PrevoutsHasher::new());
        self.script_flavour = ScriptFlavour::None;
        self.state = State::CollectingInputs(0);

        Ok(Output::Ok)
    }

    /// Handle one per-input message: validate, fold the outpoint into
    /// the prevouts hash, compute the signature hash (and anti-exfil
    /// signer commitment) when the input is ours to sign
    #[cfg_attr(feature = "noinline", inline(never))]
    #[allow(clippy::too_many_arguments)]
    fn tx_input(
        &mut self,
        index: usize,
        id: &[u8],
        is_witness: bool,
        path: Option<&[u32]>,
        script: Option<&[u8]>,
        host_commitment: Option<[u8; HOST_COMMITMENT_LEN]>,
        value_commitment: Option<[u8; ASSET_COMMITMENT_LEN]>,
    ) -> Result<Output, Error> {
        let num_inputs = self.signing_data.len();
        debug_assert!(index < num_inputs);

        let Some(tx) = self.tx.as_ref() else {
            return Err(Error::Internal("no transaction for session"));
        };

        let mut sig_data = SigningData::default();

        if id.is_empty() {
            return Err(Error::BadParameters("invalid message id"));
        }
        sig_data.id = RequestId::from_slice(id).map_err(|_| Error::BadParameters("invalid message id"))?;

        // Validate the signing fields as a group: a path means this
        // device signs the input and drags script (and protocol
        // dependent commitments) along with it
        let signing = match path {
            Some(path) => {
                if path.is_empty() || path.len() > MAX_BIP32_PATH_LEN {
                    return Err(Error::BadParameters(
                        "failed to extract valid path from parameters",
                    ));
                }

                let script = match script {
                    Some(s) if !s.is_empty() => s,
                    _ => {
                        return Err(Error::BadParameters(
                            "failed to extract script from parameters",
                        ))
                    }
                };

                if self.protocol == SignatureProtocol::AntiExfil && host_commitment.is_none() {
                    return Err(Error::BadParameters(
                        "failed to extract host commitment from parameters",
                    ));
                }

                // segwit sighashes commit to the spent value commitment,
                // which the device cannot look up itself
                if is_witness && value_commitment.is_none() {
                    return Err(Error::BadParameters(
                        "failed to extract value commitment from parameters",
                    ));
                }

                Some((path, script))
            }
            None => None,
        };

        // Every input's outpoint feeds the prevouts hash, signed or not
        let txin = &tx.inputs[index];
        match self.prevouts.as_mut() {
            Some(h) => h.update(&txin.prev_txid, txin.prev_vout),
            None => return Err(Error::Internal("prevouts hash already finalized")),
        }

        if let Some((path, script)) = signing {
            self.script_flavour = self.script_flavour.merge(ScriptFlavour::classify(script));

            sig_data.signature_hash =
                self.drv
                    .signature_hash(tx, index, is_witness, script, value_commitment.as_ref())?;
            sig_data.path = Vec::from_slice(path)
                .map_err(|_| Error::BadParameters("failed to extract valid path from parameters"))?;

            if self.protocol == SignatureProtocol::AntiExfil {
                let Some(hc) = host_commitment.as_ref() else {
                    return Err(Error::Internal("missing host commitment"));
                };
                sig_data.signer_commitment =
                    Some(self.drv.signer_commitment(&sig_data.signature_hash, path, hc)?);
            }
        }

        let reply = match self.protocol {
            SignatureProtocol::AntiExfil => {
                let mut sc = Vec::new();
                if let Some(c) = &sig_data.signer_commitment {
                    sc.extend_from_slice(c)
                        .map_err(|_| Error::Internal("signer commitment overflow"))?;
                }
                Output::SignerCommitment(sc)
            }
            // legacy replies are deferred to the end of the session
            SignatureProtocol::Legacy => Output::None,
        };

        self.signing_data[index] = sig_data;

        if index + 1 < num_inputs {
            self.state = State::CollectingInputs(index + 1);
            return Ok(reply);
        }

        self.finalize_inputs(reply)
    }

    /// All inputs received: prove the trusted commitments against the
    /// finalized prevouts hash, then run the final user gate
    #[cfg_attr(feature = "noinline", inline(never))]
    fn finalize_inputs(&mut self, input_reply: Output) -> Result<Output, Error> {
        let hash_prevouts = match self.prevouts.take() {
            Some(h) => h.finish(),
            None => return Err(Error::Internal("prevouts hash already finalized")),
        };

        // The user confirmed the outputs before the inputs streamed;
        // forged unblinding data is caught here, after the fact but
        // before anything is signed.
        let Some(tx) = self.tx.as_ref() else {
            return Err(Error::Internal("no transaction for session"));
        };
        let mut found_odd_vbf = false;
        for (i, (txout, commitment)) in tx.outputs.iter().zip(self.commitments.iter()).enumerate() {
            if txout.value_is_explicit() {
                continue;
            }
            verify_trusted_commitment(
                &self.drv,
                &hash_prevouts,
                i as u32,
                txout,
                commitment,
                &mut found_odd_vbf,
            )?;
        }

        #[cfg(feature = "log")]
        log::debug!("trusted commitments verified (odd vbf: {})", found_odd_vbf);

        let mixed = self.script_flavour == ScriptFlavour::Mixed;

        self.state = State::AwaitingFeeConfirmation;
        let decision = self.ui.confirm_final(self.fees, mixed);

        match (decision, self.protocol) {
            (UserDecision::Accept, SignatureProtocol::AntiExfil) => {
                self.state = State::EmittingSignatures(0);
                Ok(input_reply)
            }
            (UserDecision::Accept, SignatureProtocol::Legacy) => {
                let replies = self.sign_all_inputs()?;
                self.state = State::Complete;
                self.clear_session();
                Ok(Output::Signatures(replies))
            }
            // the anti-exfil stream still owes the host the final
            // signer-commitment reply; the cancellation goes out against
            // the next message
            (_, SignatureProtocol::AntiExfil) => {
                self.state = State::CancelPending;
                Ok(input_reply)
            }
            (_, SignatureProtocol::Legacy) => Err(Error::UserCancelled),
        }
    }

    /// Batched legacy signing, one reply entry per input in input order
    fn sign_all_inputs(&mut self) -> Result<Vec<SignatureReply, MAX_INPUTS>, Error> {
        let mut replies = Vec::new();

        for sig_data in self.signing_data.iter() {
            let mut reply = SignatureReply {
                id: sig_data.id.clone(),
                signature: SignatureBytes::new(),
            };

            // inputs without a path get an empty signature entry so the
            // reply stays aligned with the input order
            if !sig_data.path.is_empty() {
                reply.signature = self.drv.sign_ec(&sig_data.signature_hash, &sig_data.path)?;
            }

            replies
                .push(reply)
                .map_err(|_| Error::Internal("signature reply overflow"))?;
        }

        Ok(replies)
    }

    /// Deliver one anti-exfil signature
    #[cfg_attr(feature = "noinline", inline(never))]
    fn get_signature(
        &mut self,
        index: usize,
        id: &[u8],
        host_entropy: Option<[u8; HOST_ENTROPY_LEN]>,
    ) -> Result<Output, Error> {
        let num_inputs = self.signing_data.len();
        debug_assert!(index < num_inputs);

        if id.is_empty() {
            return Err(Error::BadParameters("invalid message id"));
        }
        let reply_id = RequestId::from_slice(id).map_err(|_| Error::BadParameters("invalid message id"))?;

        let sig_data = &self.signing_data[index];
        let signature = match sig_data.path.is_empty() {
            // unsigned input, empty reply keeps the streams aligned
            true => SignatureBytes::new(),
            false => {
                let Some(entropy) = host_entropy.as_ref() else {
                    return Err(Error::BadParameters(
                        "failed to extract host entropy from parameters",
                    ));
                };
                self.drv
                    .sign_anti_exfil(&sig_data.signature_hash, &sig_data.path, entropy)?
            }
        };

        let reply = Output::Signature {
            id: reply_id,
            signature,
        };

        if index + 1 < num_inputs {
            self.state = State::EmittingSignatures(index + 1);
        } else {
            self.state = State::Complete;
            self.clear_session();
        }

        Ok(reply)
    }

    /// Scrub and release all session memory; every exit path funnels
    /// through here
    #[cfg_attr(feature = "noinline", inline(never))]
    fn clear_session(&mut self) {
        for c in self.commitments.iter_mut() {
            c.zeroize();
        }
        self.commitments.clear();

        for o in self.output_info.iter_mut() {
            o.zeroize();
        }
        self.output_info.clear();

        for s in self.signing_data.iter_mut() {
            s.zeroize();
        }
        self.signing_data.clear();

        self.tx = None;
        self.prevouts = None;
        self.script_flavour = ScriptFlavour::None;
        self.fees = 0;
    }
}

impl<DRV: Driver, UI: Approver> Drop for Engine<DRV, UI> {
    fn drop(&mut self) {
        self.clear_session();
    }
}

/// Prove host-declared change outputs by re-deriving their scripts from
/// the declared paths
fn validate_change<D: Driver>(
    drv: &D,
    network: Network,
    tx: &Transaction,
    change: &[Option<ChangeOutput<'_>>],
    output_info: &mut [OutputInfo],
) -> Result<(), Error> {
    if change.is_empty() {
        return Ok(());
    }
    if change.len() != tx.outputs.len() {
        return Err(Error::BadParameters(
            "unexpected number of change entries for transaction",
        ));
    }

    for (i, entry) in change.iter().enumerate() {
        let Some(c) = entry else {
            continue;
        };

        if c.path.is_empty() || c.path.len() > MAX_BIP32_PATH_LEN {
            return Err(Error::BadParameters("invalid change output path"));
        }

        let script = drv.change_script(network, c.path)?;
        if script[..] != tx.outputs[i].script_pubkey[..] {
            return Err(Error::BadParameters(
                "change output does not match the derived script",
            ));
        }

        output_info[i].is_change = true;
    }

    Ok(())
}
