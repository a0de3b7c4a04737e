//! # Lender accounts and the lender registry
//!
//! A lender account is a ledger account that opted in to flash lending. The registry that
//! knows all of them is an external collaborator (an indexer over the lender component's
//! state); the router only reads from it through [`LenderRegistry`].

use std::collections::HashMap;

use scrypto::prelude::{ComponentAddress, Decimal, ResourceAddress};

use crate::error::Result;
use crate::fee::FeeConfig;

/// A lender as seen by the router at quote time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LenderAccount {
    pub account_address: ComponentAddress,
    pub fee_configs: HashMap<ResourceAddress, FeeConfig>,
    pub available: HashMap<ResourceAddress, Decimal>,
    /// Whether the lender component can currently move funds for this account.
    pub withdraw_accessible: bool,
}

impl LenderAccount {
    pub fn new(account_address: ComponentAddress) -> Self {
        Self {
            account_address,
            fee_configs: HashMap::new(),
            available: HashMap::new(),
            withdraw_accessible: true,
        }
    }

    pub fn with_resource(
        mut self,
        resource: ResourceAddress,
        available: Decimal,
        fee_config: FeeConfig,
    ) -> Self {
        self.available.insert(resource, available);
        self.fee_configs.insert(resource, fee_config);
        self
    }

    pub fn available_amount(&self, resource: &ResourceAddress) -> Decimal {
        self.available.get(resource).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn fee_config(&self, resource: &ResourceAddress) -> Option<&FeeConfig> {
        self.fee_configs.get(resource)
    }
}

/// Supplies the known lender accounts.
pub trait LenderRegistry {
    fn lender_accounts(&self) -> Result<Vec<LenderAccount>>;
}

/// A fixed set of lenders, e.g. loaded from a config snapshot or assembled in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    lenders: Vec<LenderAccount>,
}

impl StaticRegistry {
    pub fn new(lenders: Vec<LenderAccount>) -> Self {
        Self { lenders }
    }

    pub fn push(&mut self, lender: LenderAccount) {
        self.lenders.push(lender);
    }

    pub fn lenders(&self) -> &[LenderAccount] {
        &self.lenders
    }
}

impl LenderRegistry for StaticRegistry {
    fn lender_accounts(&self) -> Result<Vec<LenderAccount>> {
        Ok(self.lenders.clone())
    }
}
