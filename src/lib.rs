// Copyright (c) 2024 The Liquid Sign Core Developers

//! Signing-session core for a hardware wallet co-signing confidential
//! (Liquid / Elements) transactions with an untrusted host.
//!
//! The [Engine][engine::Engine] consumes decoded host protocol messages
//! as [Event][engine::Event]s and produces [Output][engine::Output]
//! replies, backed by a platform [Driver][engine::Driver] for key
//! material and crypto primitives and an [Approver][engine::Approver]
//! for the two user confirmation gates.
//!
//! A legacy session runs:
//!
//! ```text
//! TxInit ------------------> Ok            (outputs confirmed)
//! TxInput (1st .. n-1th) --> None
//! TxInput (nth) -----------> Signatures    (commitments proven, fee
//!                                           confirmed, batched replies)
//! ```
//!
//! An anti-exfil session exchanges per-input commitments before any
//! signature exists, then fetches signatures one by one:
//!
//! ```text
//! TxInit ------------------> Ok
//! TxInput (each) ----------> SignerCommitment
//! GetSignature (each) -----> Signature
//! ```
//!
//! The trusted commitments carried by `TxInit` were issued by this
//! device in an earlier exchange, bound to the transaction's prevouts
//! hash. The engine re-derives that hash from the streamed inputs and
//! proves every confidential output against it before the final gate,
//! so a host cannot splice verified unblinding data onto a different
//! transaction.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod engine;
pub mod network;
pub mod tx;
