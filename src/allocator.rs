//! # Lender selection
//!
//! Given a requested amount of a fungible resource and the candidate lenders, the allocator
//! decides whom to borrow from and how much. It is a pure function of its inputs: the same
//! request against the same lenders always yields the same plan.
//!
//! ## Logic
//! 1. Drop every lender that has nothing of the resource available or no borrowable fee
//!    policy for it.
//! 2. Rank the rest by `fee_value / available_amount`, cheapest first. Ties keep the order
//!    in which the registry returned the lenders.
//! 3. Walk the ranking and draw `min(remaining, available)` from each lender until the
//!    request is covered or the lenders run out.
//!
//! The score and the recorded fee use the configured fee value as-is for both fee types.
//! A plan may under-fill the request; callers check [`LoanPlan::shortfall`].

use std::cmp::min;

use log::debug;
use scrypto::prelude::{CheckedDiv, ComponentAddress, Decimal, ResourceAddress};

use crate::error::{Error, Result};
use crate::lender::LenderAccount;
use crate::resources::ResourceDetails;

/// One draw from one lender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowInstruction {
    pub lender_account: ComponentAddress,
    pub amount: Decimal,
    pub fee: Decimal,
}

/// The lenders to draw from, in draw order.
#[derive(Debug, PartialEq, Eq)]
pub struct LoanPlan {
    resource: ResourceDetails,
    borrow_instructions: Vec<BorrowInstruction>,
}

impl LoanPlan {
    pub fn resource(&self) -> &ResourceDetails {
        &self.resource
    }

    pub fn resource_address(&self) -> ResourceAddress {
        self.resource.address
    }

    pub fn borrow_instructions(&self) -> &[BorrowInstruction] {
        &self.borrow_instructions
    }

    pub fn is_empty(&self) -> bool {
        self.borrow_instructions.is_empty()
    }

    pub fn total_fee(&self) -> Decimal {
        self.borrow_instructions
            .iter()
            .fold(Decimal::ZERO, |total, instruction| total + instruction.fee)
    }

    pub fn total_borrowed(&self) -> Decimal {
        self.borrow_instructions
            .iter()
            .fold(Decimal::ZERO, |total, instruction| total + instruction.amount)
    }

    /// How much of `requested` the plan could not cover.
    pub fn shortfall(&self, requested: Decimal) -> Decimal {
        let borrowed = self.total_borrowed();
        if borrowed >= requested {
            Decimal::ZERO
        } else {
            requested - borrowed
        }
    }

    pub fn is_fully_funded(&self, requested: Decimal) -> bool {
        self.shortfall(requested).is_zero()
    }
}

struct Candidate<'a> {
    lender: &'a LenderAccount,
    fee_value: Decimal,
    available: Decimal,
    score: Decimal,
}

/// Builds the loan plan for borrowing `amount` of `resource` from `lenders`.
pub fn calculate_loan(
    resource: &ResourceDetails,
    amount: Decimal,
    lenders: &[LenderAccount],
) -> Result<LoanPlan> {
    if !resource.fungible {
        return Err(Error::UnsupportedResourceKind(format!(
            "{:?}",
            resource.address
        )));
    }
    if !amount.is_positive() {
        return Err(Error::InvalidLoanAmount(amount));
    }

    let mut candidates: Vec<Candidate> = lenders
        .iter()
        .filter_map(|lender| eligible_candidate(lender, &resource.address))
        .collect();
    candidates.sort_by(|a, b| a.score.cmp(&b.score));

    let mut borrow_instructions = Vec::new();
    let mut open_amount = amount;
    for candidate in candidates {
        let borrow_amount = min(open_amount, candidate.available);
        open_amount = open_amount - borrow_amount;

        borrow_instructions.push(BorrowInstruction {
            lender_account: candidate.lender.account_address,
            amount: borrow_amount,
            fee: candidate.fee_value,
        });

        if !open_amount.is_positive() {
            break;
        }
    }

    Ok(LoanPlan {
        resource: resource.clone(),
        borrow_instructions,
    })
}

fn eligible_candidate<'a>(
    lender: &'a LenderAccount,
    resource: &ResourceAddress,
) -> Option<Candidate<'a>> {
    let available = lender.available_amount(resource);
    if !available.is_positive() {
        debug!(
            "Skipping lender {:?}: nothing available of {:?}",
            lender.account_address, resource
        );
        return None;
    }

    let fee_value = match lender.fee_config(resource) {
        Some(config) if config.is_borrowable() => config.defined_fee()?,
        _ => {
            debug!(
                "Skipping lender {:?}: no borrowable fee config for {:?}",
                lender.account_address, resource
            );
            return None;
        }
    };

    // Both values are non-negative and `available` is positive, so only overflow fails.
    let score = fee_value.checked_div(available).unwrap_or(Decimal::MAX);

    Some(Candidate {
        lender,
        fee_value,
        available,
        score,
    })
}
