// Copyright (c) 2024 The Liquid Sign Core Developers

//! Network identifiers accepted by the signing engine

use strum::{Display, EnumIter, EnumString, EnumVariantNames};

/// Networks known to the device.
///
/// Only the liquid (confidential-asset) networks are valid for a signing
/// session; the bitcoin names are recognised so a mismatched request can
/// be rejected with a sensible parameter error rather than a parse error.
#[derive(Copy, Clone, PartialEq, Eq, Debug, EnumString, Display, EnumVariantNames, EnumIter)]
pub enum Network {
    #[strum(serialize = "mainnet")]
    Mainnet,
    #[strum(serialize = "testnet")]
    Testnet,
    #[strum(serialize = "localtest")]
    Localtest,
    #[strum(serialize = "liquid")]
    Liquid,
    #[strum(serialize = "testnet-liquid")]
    TestnetLiquid,
    #[strum(serialize = "localtest-liquid")]
    LocaltestLiquid,
}

impl Network {
    /// True for networks carrying confidential assets
    pub fn is_liquid(&self) -> bool {
        matches!(
            self,
            Network::Liquid | Network::TestnetLiquid | Network::LocaltestLiquid
        )
    }
}
