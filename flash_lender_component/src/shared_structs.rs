//! # Flash lender shared structs
//! Data types used by the `FlashLender` blueprint, its events and its callers.

use scrypto::prelude::*;

/// How a lender charges for a flash loan of one resource.
#[derive(ScryptoSbor, PartialEq, Eq, Clone, Copy, Debug)]
pub enum Fee {
    /// A percentage of the borrowed amount (e.g. `dec!(1)` for 1%), paid in the borrowed resource.
    Percentage(Decimal),
    /// A fixed amount of the component's fee resource, whatever the borrowed amount.
    Fixed(Decimal),
}

impl Fee {
    pub fn value(&self) -> Decimal {
        match self {
            Fee::Percentage(value) | Fee::Fixed(value) => *value,
        }
    }
}

/// A lender's fee policy for one resource. Disabled policies are kept so a lender can pause
/// lending without losing its fee settings.
#[derive(ScryptoSbor, PartialEq, Eq, Clone, Copy, Debug)]
pub struct FeePolicy {
    pub enabled: bool,
    pub fee: Fee,
}

/// Badge minted to every registered lender, proving control over its lender position.
#[derive(ScryptoSbor, NonFungibleData, Clone, Debug)]
pub struct LenderBadge {
    /// The account the badge was minted for.
    pub account: ComponentAddress,
}

/// Non-fungible data of the transient receipt handed out with every loan.
/// It can only be burned by the issuing component, and only through `repay_loan`.
#[derive(ScryptoSbor, NonFungibleData, Clone, Debug)]
pub struct LoanReceipt {
    /// The lender the loan was drawn from. Repayment must go back to this lender.
    pub lender: ComponentAddress,
    pub resource: ResourceAddress,
    pub amount: Decimal,
    /// The resource the fee is owed in.
    pub fee_resource: ResourceAddress,
    pub fee_amount: Decimal,
}

/// Read-only view of a lender, as returned by `get_lender`.
#[derive(ScryptoSbor, Clone, Debug)]
pub struct LenderView {
    pub account: ComponentAddress,
    pub badge_id: NonFungibleLocalId,
    pub fee_policies: HashMap<ResourceAddress, FeePolicy>,
    /// Liquidity currently held for the lender, per resource.
    pub available: HashMap<ResourceAddress, Decimal>,
}

/// The resources a `FlashLender` component created or was configured with.
#[derive(ScryptoSbor, Clone, Debug)]
pub struct FlashLenderAddresses {
    pub lender_badge: ResourceAddress,
    pub loan_receipt: ResourceAddress,
    pub fee_resource: ResourceAddress,
}
