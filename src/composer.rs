//! # Manifest composition
//!
//! Turns a [`LoanPlan`] into the four-phase script that the ledger executes atomically:
//!
//! 1. **Borrow** from every lender in plan order and keep each loan receipt in its own slot.
//! 2. **Use** the capital. The caller supplies this phase as a [`UsePhase`].
//! 3. **Repay** every lender, in the same order, its principal plus fee, handing back the
//!    receipt captured for that lender in phase 1.
//! 4. **Settle** by depositing whatever is left into the borrower's account.
//!
//! If any phase fails on ledger, none of them commit.

use scrypto::prelude::{ComponentAddress, Decimal};

use crate::allocator::LoanPlan;
use crate::config::LedgerAddresses;
use crate::error::Result;
use crate::fee::FeeConfig;
use crate::manifest::{ManifestArg, ManifestScript};
use crate::resources::{encode_address, shorten_address, ResourceDetails};

pub const BORROW_METHOD: &str = "borrow";
pub const REPAY_METHOD: &str = "repay_loan";
pub const UPDATE_FEE_CONFIGS_METHOD: &str = "update_fee_configs";
pub const ACCOUNT_DEPOSIT_METHOD: &str = "deposit";
pub const ACCOUNT_CREATE_PROOF_METHOD: &str = "create_proof_of_amount";

pub const PROFIT_BUCKET: &str = "profit";
pub const FEE_CHANGE_BUCKET: &str = "fee_change";
pub const LENDER_BADGE_PROOF: &str = "lender_badge";

pub fn loan_receipt_bucket(index: usize) -> String {
    format!("loan_receipt_{}", index)
}

pub fn loan_bucket(index: usize) -> String {
    format!("loan_{}", index)
}

pub fn fee_bucket(index: usize) -> String {
    format!("fee_{}", index)
}

/// The caller's use of the borrowed capital, e.g. an arbitrage sequence. The borrowed
/// resources are on the worktop when it runs; it must leave enough there to repay.
pub trait UsePhase {
    fn emit(&self, manifest: &mut ManifestScript, plan: &LoanPlan) -> Result<()>;
}

impl<F> UsePhase for F
where
    F: Fn(&mut ManifestScript, &LoanPlan) -> Result<()>,
{
    fn emit(&self, manifest: &mut ManifestScript, plan: &LoanPlan) -> Result<()> {
        self(manifest, plan)
    }
}

/// A use phase that does nothing with the capital.
pub struct NoUse;

impl UsePhase for NoUse {
    fn emit(&self, manifest: &mut ManifestScript, _plan: &LoanPlan) -> Result<()> {
        manifest.comment("Nothing to do with the borrowed funds");
        Ok(())
    }
}

/// Composes the borrow/use/repay/settle script for `plan`.
///
/// The plan is consumed: a plan backs exactly one manifest. `fee_resource` describes the
/// resource fees are paid in and only serves the comments.
pub fn compose_loan_manifest(
    plan: LoanPlan,
    borrower: ComponentAddress,
    addresses: &LedgerAddresses,
    fee_resource: &ResourceDetails,
    use_phase: &dyn UsePhase,
) -> Result<ManifestScript> {
    let network = &addresses.network;
    let resource = plan.resource_address();
    let resource_name = plan.resource().display_name(network)?;
    let fee_name = fee_resource.display_name(network)?;
    let lender_label = |lender: &ComponentAddress| -> Result<String> {
        Ok(shorten_address(&encode_address(network, lender.as_node_id())?))
    };

    let mut manifest = ManifestScript::new();

    manifest.comment("----- PART #1 - Take out the loan");
    manifest.comment("----- Put each loan receipt into a bucket so we can return it");
    for (i, instruction) in plan.borrow_instructions().iter().enumerate() {
        manifest.comment(format!(
            "Borrow {} {} from account {}",
            instruction.amount,
            resource_name,
            lender_label(&instruction.lender_account)?
        ));
        manifest
            .call_method(
                addresses.router_component,
                BORROW_METHOD,
                vec![
                    ManifestArg::Resource(resource),
                    ManifestArg::Decimal(instruction.amount),
                    ManifestArg::Component(instruction.lender_account),
                ],
            )?
            .take_from_worktop(
                addresses.loan_receipt_resource,
                Decimal::ONE,
                &loan_receipt_bucket(i),
            )?;
        manifest.blank_line();
    }

    manifest.blank_line();
    manifest.comment("----- PART #2 - Use the loan");
    use_phase.emit(&mut manifest, &plan)?;

    manifest.blank_line();
    manifest.blank_line();
    manifest.comment("----- PART #3 - Repay the loan");
    for (i, instruction) in plan.borrow_instructions().iter().enumerate() {
        manifest.comment(format!(
            "Return {} {} plus a fee of {} {} to account {}",
            instruction.amount,
            resource_name,
            instruction.fee,
            fee_name,
            lender_label(&instruction.lender_account)?
        ));
        manifest
            .take_from_worktop(resource, instruction.amount, &loan_bucket(i))?
            .take_from_worktop(addresses.fee_resource, instruction.fee, &fee_bucket(i))?
            .call_method(
                addresses.router_component,
                REPAY_METHOD,
                vec![
                    ManifestArg::bucket(loan_receipt_bucket(i)),
                    ManifestArg::bucket(loan_bucket(i)),
                    ManifestArg::bucket(fee_bucket(i)),
                    ManifestArg::Component(instruction.lender_account),
                ],
            )?;
        manifest.blank_line();
    }

    manifest.blank_line();
    manifest.comment("----- PART #4 - Profit");
    manifest.comment("Deposit the remaining funds into the borrower's account");
    manifest
        .take_all_from_worktop(resource, PROFIT_BUCKET)?
        .call_method(
            borrower,
            ACCOUNT_DEPOSIT_METHOD,
            vec![ManifestArg::bucket(PROFIT_BUCKET)],
        )?;
    if addresses.fee_resource != resource {
        manifest.comment(format!("Deposit the unspent {} into the borrower's account", fee_name));
        manifest
            .take_all_from_worktop(addresses.fee_resource, FEE_CHANGE_BUCKET)?
            .call_method(
                borrower,
                ACCOUNT_DEPOSIT_METHOD,
                vec![ManifestArg::bucket(FEE_CHANGE_BUCKET)],
            )?;
    }

    Ok(manifest)
}

/// Composes the script a lender signs to replace its fee configs. Configs the ledger would
/// reject (no value, or a negative one) are left out; disabled ones are kept.
pub fn compose_fee_config_update(
    lender: ComponentAddress,
    configs: &[(ResourceDetails, FeeConfig)],
    addresses: &LedgerAddresses,
) -> Result<ManifestScript> {
    let entries = configs
        .iter()
        .filter_map(|(resource, config)| {
            config
                .defined_fee()
                .map(|fee_value| (resource.address, config, fee_value))
        })
        .map(|(resource, config, fee_value)| {
            (
                ManifestArg::Resource(resource),
                ManifestArg::Tuple(vec![
                    ManifestArg::Bool(config.enabled),
                    ManifestArg::Enum(
                        config.fee_type.discriminator(),
                        vec![ManifestArg::Decimal(fee_value)],
                    ),
                ]),
            )
        })
        .collect::<Vec<_>>();

    let mut manifest = ManifestScript::new();
    manifest.comment("Prove ownership of the lender account");
    manifest
        .call_method(
            lender,
            ACCOUNT_CREATE_PROOF_METHOD,
            vec![
                ManifestArg::Resource(addresses.lender_badge_resource),
                ManifestArg::Decimal(Decimal::ONE),
            ],
        )?
        .pop_from_auth_zone(LENDER_BADGE_PROOF)?;
    manifest.comment(format!("Update {} fee configs", entries.len()));
    manifest.call_method(
        addresses.router_component,
        UPDATE_FEE_CONFIGS_METHOD,
        vec![
            ManifestArg::proof(LENDER_BADGE_PROOF),
            ManifestArg::Map {
                key_kind: "Address",
                value_kind: "Tuple",
                entries,
            },
        ],
    )?;

    Ok(manifest)
}
