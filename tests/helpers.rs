// Copyright (c) 2024 The Liquid Sign Core Developers

//! Shared fixtures for signing-session integration tests

#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use liquid_sign_core::{
    engine::{
        commitment_blob, Approver, BlindingFactorKind, Driver, Error, OutputInfo, PrevoutsHasher,
        SignatureBytes, TrustedCommitment, UserDecision, HOST_COMMITMENT_LEN, HOST_ENTROPY_LEN,
        SIGNER_COMMITMENT_LEN,
    },
    network::Network,
    tx::{Transaction, TxIn, TxOutput, MAX_INPUTS, MAX_OUTPUTS, MAX_SCRIPT_LEN},
};

type HmacSha256 = Hmac<Sha256>;

pub fn init_logger() {
    let _ = simplelog::SimpleLogger::init(log::LevelFilter::Debug, Default::default());
}

pub fn point(prefix: u8, h: &[u8; 32]) -> [u8; 33] {
    let mut out = [0u8; 33];
    out[0] = prefix;
    out[1..].copy_from_slice(h);
    out
}

fn path_bytes(path: &[u32]) -> Vec<u8> {
    path.iter().flat_map(|p| p.to_le_bytes()).collect()
}

/// Deterministic stand-ins for the device crypto, keyed by a random
/// per-instance master key so host-side test code can mirror every
/// derivation through the same driver
pub struct TestDriver {
    master_key: [u8; 32],
    pub sign_ec_calls: Cell<usize>,
    pub sign_ae_calls: Cell<usize>,
}

impl TestDriver {
    pub fn new() -> Self {
        Self {
            master_key: rand::random(),
            sign_ec_calls: Cell::new(0),
            sign_ae_calls: Cell::new(0),
        }
    }

    fn keyed(&self, parts: &[&[u8]]) -> [u8; 32] {
        let mut mac = HmacSha256::new_from_slice(&self.master_key).unwrap();
        for p in parts {
            mac.update(p);
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&mac.finalize().into_bytes());
        out
    }
}

impl Default for TestDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for TestDriver {
    fn blinding_factor(
        &self,
        hash_prevouts: &[u8; 32],
        output_index: u32,
        kind: BlindingFactorKind,
    ) -> [u8; 32] {
        let tag: &[u8] = match kind {
            BlindingFactorKind::Asset => b"abf",
            BlindingFactorKind::Value => b"vbf",
        };
        self.keyed(&[b"blind", hash_prevouts, &output_index.to_le_bytes(), tag])
    }

    fn asset_generator(&self, asset_id: &[u8; 32], abf: &[u8; 32]) -> Result<[u8; 33], Error> {
        Ok(point(0x0a, &self.keyed(&[b"generator", asset_id, abf])))
    }

    fn value_commitment(
        &self,
        value: u64,
        vbf: &[u8; 32],
        generator: &[u8; 33],
    ) -> Result<[u8; 33], Error> {
        Ok(point(
            0x08,
            &self.keyed(&[b"commitment", generator, vbf, &value.to_le_bytes()]),
        ))
    }

    fn master_hmac(&self, msg: &[u8]) -> [u8; 32] {
        self.keyed(&[b"auth", msg])
    }

    fn signature_hash(
        &self,
        tx: &Transaction,
        input_index: usize,
        is_witness: bool,
        script: &[u8],
        value_commitment: Option<&[u8; 33]>,
    ) -> Result<[u8; 32], Error> {
        // public function of the transaction, unkeyed
        let mut d = Sha256::new();
        d.update(tx.version.to_le_bytes());
        d.update(tx.lock_time.to_le_bytes());
        for i in tx.inputs.iter() {
            d.update(i.prev_txid);
            d.update(i.prev_vout.to_le_bytes());
            d.update(i.sequence.to_le_bytes());
        }
        for o in tx.outputs.iter() {
            d.update(&o.asset);
            d.update(&o.value);
            d.update(&o.script_pubkey);
        }
        d.update((input_index as u32).to_le_bytes());
        d.update([is_witness as u8]);
        d.update(script);
        if let Some(vc) = value_commitment {
            d.update(vc);
        }

        let mut out = [0u8; 32];
        out.copy_from_slice(&d.finalize());
        Ok(out)
    }

    fn signer_commitment(
        &self,
        signature_hash: &[u8; 32],
        path: &[u32],
        host_commitment: &[u8; HOST_COMMITMENT_LEN],
    ) -> Result<[u8; SIGNER_COMMITMENT_LEN], Error> {
        Ok(point(
            0x02,
            &self.keyed(&[b"s2c", signature_hash, &path_bytes(path), host_commitment]),
        ))
    }

    fn sign_ec(&self, signature_hash: &[u8; 32], path: &[u32]) -> Result<SignatureBytes, Error> {
        self.sign_ec_calls.set(self.sign_ec_calls.get() + 1);

        let r = self.keyed(&[b"ec-r", signature_hash, &path_bytes(path)]);
        let s = self.keyed(&[b"ec-s", signature_hash, &path_bytes(path)]);

        let mut sig = SignatureBytes::new();
        sig.extend_from_slice(&r).unwrap();
        sig.extend_from_slice(&s).unwrap();
        Ok(sig)
    }

    fn sign_anti_exfil(
        &self,
        signature_hash: &[u8; 32],
        path: &[u32],
        host_entropy: &[u8; HOST_ENTROPY_LEN],
    ) -> Result<SignatureBytes, Error> {
        self.sign_ae_calls.set(self.sign_ae_calls.get() + 1);

        let r = self.keyed(&[b"ae-r", signature_hash, &path_bytes(path), host_entropy]);
        let s = self.keyed(&[b"ae-s", signature_hash, &path_bytes(path), host_entropy]);

        let mut sig = SignatureBytes::new();
        sig.extend_from_slice(&r).unwrap();
        sig.extend_from_slice(&s).unwrap();
        Ok(sig)
    }

    fn change_script(
        &self,
        network: Network,
        path: &[u32],
    ) -> Result<heapless::Vec<u8, MAX_SCRIPT_LEN>, Error> {
        let h = self.keyed(&[b"script", network.to_string().as_bytes(), &path_bytes(path)]);

        let mut script = heapless::Vec::new();
        script.extend_from_slice(&[0x00, 0x14]).unwrap();
        script.extend_from_slice(&h[..20]).unwrap();
        Ok(script)
    }
}

/// Programmed user decisions with interior-mutable call recording, so
/// tests can inspect what the screens showed while the engine holds the
/// approver
pub struct ScriptedApprover {
    pub outputs_decision: UserDecision,
    pub fee_decision: UserDecision,
    pub output_calls: Cell<usize>,
    pub fee_calls: Cell<usize>,
    pub last_fee: Cell<Option<u64>>,
    pub last_mixed: Cell<Option<bool>>,
    pub outputs_seen: RefCell<Vec<OutputInfo>>,
}

impl ScriptedApprover {
    fn with(outputs_decision: UserDecision, fee_decision: UserDecision) -> Self {
        Self {
            outputs_decision,
            fee_decision,
            output_calls: Cell::new(0),
            fee_calls: Cell::new(0),
            last_fee: Cell::new(None),
            last_mixed: Cell::new(None),
            outputs_seen: RefCell::new(Vec::new()),
        }
    }

    pub fn accept() -> Self {
        Self::with(UserDecision::Accept, UserDecision::Accept)
    }

    pub fn decline_outputs() -> Self {
        Self::with(UserDecision::Decline, UserDecision::Accept)
    }

    pub fn decline_fee() -> Self {
        Self::with(UserDecision::Accept, UserDecision::Decline)
    }
}

impl Approver for &ScriptedApprover {
    fn confirm_outputs(&mut self, _network: Network, outputs: &[OutputInfo]) -> UserDecision {
        self.output_calls.set(self.output_calls.get() + 1);
        *self.outputs_seen.borrow_mut() = outputs.to_vec();
        self.outputs_decision
    }

    fn confirm_final(&mut self, fee: u64, mixed_inputs: bool) -> UserDecision {
        self.fee_calls.set(self.fee_calls.get() + 1);
        self.last_fee.set(Some(fee));
        self.last_mixed.set(Some(mixed_inputs));
        self.fee_decision
    }
}

pub fn test_inputs(n: usize) -> Vec<TxIn> {
    (0..n)
        .map(|i| TxIn {
            prev_txid: rand::random(),
            prev_vout: i as u32,
            sequence: 0xffff_fffe,
        })
        .collect()
}

/// Host-side mirror of the device prevouts derivation
pub fn prevouts_hash(inputs: &[TxIn]) -> [u8; 32] {
    let mut h = PrevoutsHasher::new();
    for i in inputs {
        h.update(&i.prev_txid, i.prev_vout);
    }
    h.finish()
}

/// Issue the commitment this device would have handed out for the given
/// output, bound to `hash_prevouts`
pub fn issue_commitment(
    drv: &TestDriver,
    hash_prevouts: &[u8; 32],
    index: u32,
    asset_id: [u8; 32],
    value: u64,
    script: &[u8],
) -> (TrustedCommitment, TxOutput) {
    let mut c = TrustedCommitment {
        have_commitments: true,
        asset_id,
        value,
        blinding_key: point(0x02, &rand::random()),
        ..Default::default()
    };

    let abf = drv.blinding_factor(hash_prevouts, index, BlindingFactorKind::Asset);
    c.asset_generator = drv.asset_generator(&asset_id, &abf).unwrap();

    let vbf = drv.blinding_factor(hash_prevouts, index, BlindingFactorKind::Value);
    c.value_commitment = drv.value_commitment(value, &vbf, &c.asset_generator).unwrap();

    c.authentication_tag = drv.master_hmac(&commitment_blob(&c));

    let txout = TxOutput::confidential(&c.asset_generator, &c.value_commitment, script).unwrap();

    (c, txout)
}

/// Corrective-output variant: the value commitment does not match the
/// device derivation (its vbf was solved for balance), the tag is still
/// valid
pub fn issue_odd_commitment(
    drv: &TestDriver,
    hash_prevouts: &[u8; 32],
    index: u32,
    asset_id: [u8; 32],
    value: u64,
    script: &[u8],
) -> (TrustedCommitment, TxOutput) {
    let mut c = TrustedCommitment {
        have_commitments: true,
        asset_id,
        value,
        blinding_key: point(0x02, &rand::random()),
        ..Default::default()
    };

    let abf = drv.blinding_factor(hash_prevouts, index, BlindingFactorKind::Asset);
    c.asset_generator = drv.asset_generator(&asset_id, &abf).unwrap();
    c.value_commitment = point(0x08, &rand::random());
    c.authentication_tag = drv.master_hmac(&commitment_blob(&c));

    let txout = TxOutput::confidential(&c.asset_generator, &c.value_commitment, script).unwrap();

    (c, txout)
}

pub fn build_tx(inputs: &[TxIn], outputs: &[TxOutput]) -> Transaction {
    Transaction {
        version: 2,
        lock_time: 0,
        inputs: heapless::Vec::<_, MAX_INPUTS>::from_slice(inputs).unwrap(),
        outputs: heapless::Vec::<_, MAX_OUTPUTS>::from_slice(outputs).unwrap(),
    }
}

pub fn p2wpkh_script() -> Vec<u8> {
    let mut s = vec![0u8; 22];
    s[1] = 0x14;
    s
}

pub fn p2sh_script() -> Vec<u8> {
    let mut s = vec![0u8; 23];
    s[0] = 0xa9;
    s[1] = 0x14;
    s[22] = 0x87;
    s
}
