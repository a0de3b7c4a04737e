//! # Router configuration
//!
//! TOML configuration naming the network, the well-known ledger addresses the composer
//! needs, and optionally a snapshot of resources and lenders for a static registry.
//!
//! ```toml
//! network = "stokenet"
//!
//! [addresses]
//! router_component = "component_tdx_2_1..."
//! loan_receipt_resource = "resource_tdx_2_1..."
//! lender_badge_resource = "resource_tdx_2_1..."
//! fee_resource = "resource_tdx_2_1..."
//!
//! [[resources]]
//! address = "resource_tdx_2_1..."
//! symbol = "HUG"
//!
//! [[lenders]]
//! account = "account_tdx_2_1..."
//!
//! [[lenders.resources]]
//! address = "resource_tdx_2_1..."
//! available = "5000"
//! fee_type = "fixed"
//! fee_value = "1"
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::info;
use scrypto::prelude::{
    AddressBech32Decoder, ComponentAddress, Decimal, NetworkDefinition, ResourceAddress,
};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::fee::{FeeConfig, FeeType};
use crate::lender::{LenderAccount, StaticRegistry};
use crate::resources::ResourceDetails;

// =============================================================================
// Resolved configuration
// =============================================================================

/// The ledger entities a flash loan manifest refers to.
#[derive(Debug, Clone)]
pub struct LedgerAddresses {
    pub network: NetworkDefinition,
    /// The lender component exposing `borrow` and `repay_loan`.
    pub router_component: ComponentAddress,
    pub loan_receipt_resource: ResourceAddress,
    pub lender_badge_resource: ResourceAddress,
    /// The resource fixed fees are paid in.
    pub fee_resource: ResourceAddress,
}

#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub addresses: LedgerAddresses,
    pub resources: Vec<ResourceDetails>,
    pub lenders: Vec<LenderAccount>,
}

impl RouterConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|err| Error::Config(format!("cannot read {}: {}", path.display(), err)))?;
        let config = Self::from_toml_str(&content)?;
        info!(
            "Loaded router config from {} ({} resources, {} lenders)",
            path.display(),
            config.resources.len(),
            config.lenders.len()
        );
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content).map_err(|err| Error::Config(err.to_string()))?;
        raw.resolve()
    }

    /// A registry serving the configured lender snapshot.
    pub fn registry(&self) -> StaticRegistry {
        StaticRegistry::new(self.lenders.clone())
    }

    /// A resource details source serving the configured resources.
    pub fn resource_source(&self) -> HashMap<ResourceAddress, ResourceDetails> {
        self.resources
            .iter()
            .map(|details| (details.address, details.clone()))
            .collect()
    }
}

pub fn network_by_name(name: &str) -> Result<NetworkDefinition> {
    match name.to_ascii_lowercase().as_str() {
        "mainnet" => Ok(NetworkDefinition::mainnet()),
        "stokenet" => Ok(NetworkDefinition::stokenet()),
        "simulator" => Ok(NetworkDefinition::simulator()),
        _ => Err(Error::UnknownNetwork(name.to_string())),
    }
}

// =============================================================================
// File format
// =============================================================================

#[derive(Debug, Deserialize)]
struct RawConfig {
    network: String,
    addresses: RawAddresses,
    #[serde(default)]
    resources: Vec<RawResource>,
    #[serde(default)]
    lenders: Vec<RawLender>,
}

#[derive(Debug, Deserialize)]
struct RawAddresses {
    router_component: String,
    loan_receipt_resource: String,
    lender_badge_resource: String,
    fee_resource: String,
}

#[derive(Debug, Deserialize)]
struct RawResource {
    address: String,
    #[serde(default = "default_true")]
    fungible: bool,
    symbol: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLender {
    account: String,
    #[serde(default = "default_true")]
    withdraw_accessible: bool,
    #[serde(default)]
    resources: Vec<RawLenderResource>,
}

#[derive(Debug, Deserialize)]
struct RawLenderResource {
    address: String,
    available: String,
    #[serde(default = "default_true")]
    enabled: bool,
    fee_type: FeeType,
    fee_value: Option<String>,
}

fn default_true() -> bool {
    true
}

impl RawConfig {
    fn resolve(self) -> Result<RouterConfig> {
        let network = network_by_name(&self.network)?;
        let decoder = AddressBech32Decoder::new(&network);

        let addresses = LedgerAddresses {
            router_component: decode_component(&decoder, &self.addresses.router_component)?,
            loan_receipt_resource: decode_resource(
                &decoder,
                &self.addresses.loan_receipt_resource,
            )?,
            lender_badge_resource: decode_resource(
                &decoder,
                &self.addresses.lender_badge_resource,
            )?,
            fee_resource: decode_resource(&decoder, &self.addresses.fee_resource)?,
            network: network.clone(),
        };

        let resources = self
            .resources
            .into_iter()
            .map(|raw| {
                Ok(ResourceDetails {
                    address: decode_resource(&decoder, &raw.address)?,
                    fungible: raw.fungible,
                    symbol: raw.symbol,
                    name: raw.name,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let lenders = self
            .lenders
            .into_iter()
            .map(|raw| raw.resolve(&decoder))
            .collect::<Result<Vec<_>>>()?;

        Ok(RouterConfig {
            addresses,
            resources,
            lenders,
        })
    }
}

impl RawLender {
    fn resolve(self, decoder: &AddressBech32Decoder) -> Result<LenderAccount> {
        let mut lender = LenderAccount::new(decode_component(decoder, &self.account)?);
        lender.withdraw_accessible = self.withdraw_accessible;

        for raw in self.resources {
            let resource = decode_resource(decoder, &raw.address)?;
            let fee_value = raw.fee_value.as_deref().map(parse_decimal).transpose()?;
            lender
                .available
                .insert(resource, parse_decimal(&raw.available)?);
            lender.fee_configs.insert(
                resource,
                FeeConfig::new(raw.enabled, raw.fee_type, fee_value),
            );
        }

        Ok(lender)
    }
}

fn decode_component(decoder: &AddressBech32Decoder, address: &str) -> Result<ComponentAddress> {
    ComponentAddress::try_from_bech32(decoder, address)
        .ok_or_else(|| Error::AddressDecoding(address.to_string()))
}

fn decode_resource(decoder: &AddressBech32Decoder, address: &str) -> Result<ResourceAddress> {
    ResourceAddress::try_from_bech32(decoder, address)
        .ok_or_else(|| Error::AddressDecoding(address.to_string()))
}

fn parse_decimal(value: &str) -> Result<Decimal> {
    Decimal::from_str(value.trim()).map_err(|_| Error::InvalidDecimal(value.to_string()))
}
