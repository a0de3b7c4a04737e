//! # Flash Loan Router Crate
//!
//! This crate contains the off-ledger side of multi-lender flash loans on Radix. Given a requested amount of a
//! fungible resource and the lenders that opted in to flash lending, it decides whom to borrow from and builds the
//! transaction manifest that borrows from all of them, puts the capital to work, and repays every lender its
//! principal plus fee, all in one atomic transaction.
//!
//! The lender side lives on ledger, in the `flash_lender_component` blueprint package next to this crate.
//!
//! ## Modules
//!
//! - `fee`: Per-resource fee policies that lenders configure (enabled flag, percentage or fixed fee).
//! - `lender`: Lender accounts as quoted at planning time, and the `LenderRegistry` that supplies them.
//! - `resources`: Resource metadata and the caller-owned read-through cache in front of the ledger state query service.
//! - `allocator`: Pure lender selection. Filters, ranks and sizes the draws into a `LoanPlan`.
//! - `manifest`: The manifest script model: instructions, named bucket/proof slots and the text rendering.
//! - `composer`: Builds the borrow/use/repay/settle script from a `LoanPlan`, and fee-config update scripts for lenders.
//! - `router`: The `FlashLoanRouter` facade and the `ManifestSubmitter` boundary to the ledger.
//! - `config`: TOML configuration with the network, well-known ledger addresses and an optional registry snapshot.
//! - `error`: The crate's error type.

pub mod allocator;
pub mod composer;
pub mod config;
pub mod error;
pub mod fee;
pub mod lender;
pub mod manifest;
pub mod resources;
pub mod router;

pub use allocator::{calculate_loan, BorrowInstruction, LoanPlan};
pub use composer::{compose_fee_config_update, compose_loan_manifest, NoUse, UsePhase};
pub use config::{LedgerAddresses, RouterConfig};
pub use error::{Error, Result};
pub use fee::{FeeConfig, FeeType};
pub use lender::{LenderAccount, LenderRegistry, StaticRegistry};
pub use manifest::{Instruction, ManifestArg, ManifestLine, ManifestScript};
pub use resources::{ResourceDetails, ResourceDetailsCache, ResourceDetailsSource};
pub use router::{FlashLoanRouter, ManifestSubmitter, TransactionReceipt};
