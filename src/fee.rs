//! # Fee policies
//!
//! Each lender decides, per resource, whether flash borrowing is allowed and what it
//! costs. A policy is plain data; it is read by the allocator when ranking lenders and by
//! the composer when building fee-config update manifests.

use scrypto::prelude::Decimal;
use serde::Deserialize;

/// How the fee owed to a lender is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeType {
    /// A percentage of the borrowed amount, paid in the borrowed resource.
    Percentage,
    /// A fixed amount of the fee resource, independent of the borrowed amount.
    Fixed,
}

impl FeeType {
    /// Variant index of the ledger-side `Fee` enum.
    pub fn discriminator(&self) -> u8 {
        match self {
            FeeType::Percentage => 0,
            FeeType::Fixed => 1,
        }
    }
}

/// A lender's fee policy for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeConfig {
    pub enabled: bool,
    pub fee_type: FeeType,
    /// `None` while the lender has not set a value yet.
    pub fee_value: Option<Decimal>,
}

impl FeeConfig {
    pub fn new(enabled: bool, fee_type: FeeType, fee_value: Option<Decimal>) -> Self {
        Self {
            enabled,
            fee_type,
            fee_value,
        }
    }

    pub fn percentage(fee_value: Decimal) -> Self {
        Self::new(true, FeeType::Percentage, Some(fee_value))
    }

    pub fn fixed(fee_value: Decimal) -> Self {
        Self::new(true, FeeType::Fixed, Some(fee_value))
    }

    pub fn disabled(self) -> Self {
        Self {
            enabled: false,
            ..self
        }
    }

    /// The fee value if it is defined and not negative.
    pub fn defined_fee(&self) -> Option<Decimal> {
        self.fee_value.filter(|value| !value.is_negative())
    }

    /// Whether this policy can be written to the ledger. The ledger rejects undefined and
    /// negative fees but keeps disabled entries.
    pub fn is_well_formed(&self) -> bool {
        self.defined_fee().is_some()
    }

    /// Whether a borrower may draw on this policy right now.
    pub fn is_borrowable(&self) -> bool {
        self.enabled && self.is_well_formed()
    }
}
