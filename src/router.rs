//! # Flash loan router
//!
//! Ties the pieces together for one borrower: quote lenders from the registry, compose the
//! atomic manifest, and hand it to the ledger. Planning and composing are local and
//! synchronous. Submission is a single blocking call that either commits every phase or
//! nothing.

use log::{info, warn};
use scrypto::prelude::{ComponentAddress, Decimal, ResourceAddress};

use crate::allocator::{calculate_loan, LoanPlan};
use crate::composer::{compose_loan_manifest, UsePhase};
use crate::config::LedgerAddresses;
use crate::error::{Error, Result};
use crate::lender::LenderRegistry;
use crate::manifest::ManifestScript;
use crate::resources::{ResourceDetailsCache, ResourceDetailsSource};

/// What the ledger reports for a committed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_id: String,
}

/// Signs and submits manifests. Implementations own timeouts and retries; a returned
/// error means nothing was committed.
pub trait ManifestSubmitter {
    fn submit(&mut self, manifest: &ManifestScript) -> Result<TransactionReceipt>;
}

pub struct FlashLoanRouter<R, S> {
    registry: R,
    resources: ResourceDetailsCache<S>,
    addresses: LedgerAddresses,
}

impl<R, S> FlashLoanRouter<R, S>
where
    R: LenderRegistry,
    S: ResourceDetailsSource,
{
    pub fn new(registry: R, resources: ResourceDetailsCache<S>, addresses: LedgerAddresses) -> Self {
        Self {
            registry,
            resources,
            addresses,
        }
    }

    pub fn addresses(&self) -> &LedgerAddresses {
        &self.addresses
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn resources(&self) -> &ResourceDetailsCache<S> {
        &self.resources
    }

    /// Quotes the registry and plans a loan of `amount` of `resource`. A plan that cannot
    /// cover the full amount is still returned.
    pub fn plan(&mut self, resource: ResourceAddress, amount: Decimal) -> Result<LoanPlan> {
        let details = self.resources.get(resource)?.clone();
        let lenders = self.registry.lender_accounts()?;
        let plan = calculate_loan(&details, amount, &lenders)?;

        let shortfall = plan.shortfall(amount);
        if shortfall.is_positive() {
            warn!(
                "Only {} of the requested {} {:?} can be borrowed from {} lenders",
                plan.total_borrowed(),
                amount,
                resource,
                plan.borrow_instructions().len()
            );
        } else {
            info!(
                "Planned a loan of {} {:?} from {} lenders, total fee {}",
                amount,
                resource,
                plan.borrow_instructions().len(),
                plan.total_fee()
            );
        }

        Ok(plan)
    }

    /// Composes the atomic manifest for `plan` on behalf of `borrower`.
    pub fn prepare(
        &mut self,
        plan: LoanPlan,
        borrower: ComponentAddress,
        use_phase: &dyn UsePhase,
    ) -> Result<ManifestScript> {
        if plan.is_empty() {
            return Err(Error::NoEligibleLenders);
        }
        let fee_resource = self.resources.get(self.addresses.fee_resource)?.clone();
        compose_loan_manifest(plan, borrower, &self.addresses, &fee_resource, use_phase)
    }

    /// Plans and composes in one go.
    pub fn borrow(
        &mut self,
        resource: ResourceAddress,
        amount: Decimal,
        borrower: ComponentAddress,
        use_phase: &dyn UsePhase,
    ) -> Result<ManifestScript> {
        let plan = self.plan(resource, amount)?;
        self.prepare(plan, borrower, use_phase)
    }

    /// Submits the manifest. Any failure is reported as a single aborted loan.
    pub fn execute<T: ManifestSubmitter>(
        &self,
        manifest: &ManifestScript,
        submitter: &mut T,
    ) -> Result<TransactionReceipt> {
        match submitter.submit(manifest) {
            Ok(receipt) => {
                info!("Flash loan committed in {}", receipt.transaction_id);
                Ok(receipt)
            }
            Err(Error::LoanAborted(reason)) => {
                warn!("Flash loan aborted: {}", reason);
                Err(Error::LoanAborted(reason))
            }
            Err(err) => {
                warn!("Flash loan aborted: {}", err);
                Err(Error::LoanAborted(err.to_string()))
            }
        }
    }
}
