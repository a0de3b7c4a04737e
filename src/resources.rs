//! # Resource metadata
//!
//! The router needs a little metadata about the resources it handles: whether a resource
//! is fungible (only fungibles can be flash borrowed) and a human readable label for the
//! manifest comments. That data lives on ledger and is fetched through a
//! [`ResourceDetailsSource`]. [`ResourceDetailsCache`] is the read-through cache in front of
//! it. The caller owns the cache and passes it where it is needed; nothing here is global.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use log::debug;
use scrypto::prelude::{AddressBech32Encoder, NetworkDefinition, NodeId, ResourceAddress};

use crate::error::{Error, Result};

/// Metadata of a resource as reported by the ledger state query service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDetails {
    pub address: ResourceAddress,
    pub fungible: bool,
    pub symbol: Option<String>,
    pub name: Option<String>,
}

impl ResourceDetails {
    pub fn fungible(address: ResourceAddress) -> Self {
        Self {
            address,
            fungible: true,
            symbol: None,
            name: None,
        }
    }

    pub fn non_fungible(address: ResourceAddress) -> Self {
        Self {
            fungible: false,
            ..Self::fungible(address)
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The symbol, else the name, else the shortened address.
    pub fn display_name(&self, network: &NetworkDefinition) -> Result<String> {
        let label = self
            .symbol
            .iter()
            .chain(self.name.iter())
            .find(|label| !label.trim().is_empty());

        match label {
            Some(label) => Ok(label.clone()),
            None => Ok(shorten_address(&encode_address(
                network,
                self.address.as_node_id(),
            )?)),
        }
    }
}

/// Looks up resource metadata on ledger.
pub trait ResourceDetailsSource {
    fn fetch(&self, address: ResourceAddress) -> Result<ResourceDetails>;
}

impl ResourceDetailsSource for HashMap<ResourceAddress, ResourceDetails> {
    fn fetch(&self, address: ResourceAddress) -> Result<ResourceDetails> {
        self.get(&address)
            .cloned()
            .ok_or_else(|| Error::ResourceDetails(format!("unknown resource {:?}", address)))
    }
}

/// Read-through cache of [`ResourceDetails`].
pub struct ResourceDetailsCache<S> {
    source: S,
    entries: HashMap<ResourceAddress, ResourceDetails>,
}

impl<S: ResourceDetailsSource> ResourceDetailsCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            entries: HashMap::new(),
        }
    }

    /// Returns the cached details, fetching them from the source on a miss.
    pub fn get(&mut self, address: ResourceAddress) -> Result<&ResourceDetails> {
        match self.entries.entry(address) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                debug!("Resource details cache miss for {:?}", address);
                let details = self.source.fetch(address)?;
                Ok(entry.insert(details))
            }
        }
    }

    /// Seeds the cache, e.g. with well-known resources.
    pub fn insert(&mut self, details: ResourceDetails) {
        self.entries.insert(details.address, details);
    }

    /// Drops a cached entry so the next lookup goes to the source again.
    pub fn invalidate(&mut self, address: &ResourceAddress) -> Option<ResourceDetails> {
        self.entries.remove(address)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

/// Bech32 encodes a global address for the given network.
pub fn encode_address(network: &NetworkDefinition, node_id: &NodeId) -> Result<String> {
    AddressBech32Encoder::new(network)
        .encode(node_id.as_bytes())
        .map_err(|err| Error::AddressEncoding(format!("{:?}", err)))
}

/// Shortens a Bech32 address for display, e.g. `account_sim1...a8f3k2`.
pub fn shorten_address(address: &str) -> String {
    const HEAD: usize = 12;
    const TAIL: usize = 6;

    if address.len() <= HEAD + TAIL + 3 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}...{}", &address[..HEAD], &address[address.len() - TAIL..])
}
