//! Defines events emitted by the flash lender component.

use crate::shared_structs::*;
use scrypto::prelude::*;

/// Event emitted when an account registers as a lender.
#[derive(ScryptoSbor, ScryptoEvent, Clone)]
pub struct EventLenderRegistered {
    pub account: ComponentAddress,
    /// The `NonFungibleLocalId` of the lender badge deposited into the account.
    pub badge_id: NonFungibleLocalId,
}

/// Event emitted when a lender replaces its fee configs.
#[derive(ScryptoSbor, ScryptoEvent, Clone)]
pub struct EventFeeConfigsUpdated {
    pub account: ComponentAddress,
    pub fee_policies: HashMap<ResourceAddress, FeePolicy>,
}

/// Event emitted when a lender adds liquidity.
#[derive(ScryptoSbor, ScryptoEvent, Clone)]
pub struct EventLiquidityDeposited {
    pub account: ComponentAddress,
    pub resource: ResourceAddress,
    pub amount: Decimal,
    /// The lender's liquidity of `resource` after the deposit.
    pub available: Decimal,
}

#[derive(ScryptoSbor, ScryptoEvent, Clone)]
pub struct EventLiquidityWithdrawn {
    pub account: ComponentAddress,
    pub resource: ResourceAddress,
    pub amount: Decimal,
    pub available: Decimal,
}

/// Event emitted when a loan is handed out.
#[derive(ScryptoSbor, ScryptoEvent, Clone)]
pub struct EventLoanIssued {
    pub receipt_id: NonFungibleLocalId,
    pub receipt: LoanReceipt,
}

/// Event emitted when a loan is repaid and its receipt burned.
#[derive(ScryptoSbor, ScryptoEvent, Clone)]
pub struct EventLoanRepaid {
    pub receipt_id: NonFungibleLocalId,
    pub receipt: LoanReceipt,
}
