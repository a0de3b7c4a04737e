//! # Flash Lender Package
//!
//! The on-ledger side of multi-lender flash loans. Lenders register once, deposit the liquidity they are
//! willing to lend and configure a fee per resource. Borrowers (usually through a manifest composed by the
//! `flash_loan_router` crate) borrow from any number of lenders and must repay every one of them, principal
//! plus fee, before the transaction ends.
//!
//! - `flash_lender`: The `FlashLender` blueprint.
//! - `shared_structs`: Fee policies, loan receipts, lender badges and the read-only lender view.
//! - `events`: Events emitted by the blueprint.

pub mod events;
pub mod flash_lender;
pub mod shared_structs;
