//! # Flash Lender Blueprint
//!
//! This blueprint pools the liquidity of many independent lenders and lends it out as flash loans.
//! Flash loans are uncollateralized loans that must be borrowed and repaid within the same transaction.
//!
//! ## Functionality
//! - Accounts register as lenders and receive a lender badge, which authorizes all their lender actions.
//! - Lenders deposit liquidity, withdraw it again, and configure a fee policy per resource.
//! - Borrowers name the lender they borrow from. Every loan comes with a transient `LoanReceipt` NFT that can
//!   neither be deposited nor burned by anyone but this component.
//! - The borrower *must* call `repay_loan` within the same transaction, returning the principal and the fee
//!   to the lender the loan came from. Otherwise the receipt is left dangling and the transaction fails.
//!
//! A single transaction can hold loans from any number of lenders at once, one receipt per loan.

use crate::events::*;
use crate::shared_structs::*;
use scrypto::prelude::*;

/// A lender's state inside the component.
#[derive(ScryptoSbor)]
pub struct LenderPosition {
    pub badge_id: NonFungibleLocalId,
    pub fee_policies: HashMap<ResourceAddress, FeePolicy>,
    /// Liquidity the lender made available, one vault per resource.
    pub vaults: HashMap<ResourceAddress, Vault>,
}

#[blueprint]
#[events(
    EventLenderRegistered,
    EventFeeConfigsUpdated,
    EventLiquidityDeposited,
    EventLiquidityWithdrawn,
    EventLoanIssued,
    EventLoanRepaid,
)]
mod flash_lender {
    enable_method_auth! {
        methods {
            register_lender => PUBLIC;
            update_fee_configs => PUBLIC;
            deposit => PUBLIC;
            withdraw => PUBLIC;
            borrow => PUBLIC;
            repay_loan => PUBLIC;
            get_lender => PUBLIC;
            get_addresses => PUBLIC;
            set_lending_enabled => restrict_to: [OWNER];
        }
    }

    /// Contains the state and logic for the flash lender component.
    struct FlashLender {
        /// Lender positions, keyed by the lender's account.
        lenders: KeyValueStore<ComponentAddress, LenderPosition>,
        /// Mints the badges handed to registered lenders.
        lender_badge_manager: ResourceManager,
        /// Manages the creation and burning of the transient `LoanReceipt` NFTs.
        loan_receipt_manager: ResourceManager,
        /// The resource `Fee::Fixed` fees are paid in.
        fee_resource: ResourceAddress,
        lender_counter: u64,
        loan_receipt_counter: u64,
        /// A flag indicating whether flash loans are currently enabled.
        enabled: bool,
    }

    impl FlashLender {
        /// Instantiates the `FlashLender` component.
        ///
        /// # Arguments
        /// * `owner_role`: The owner of the component, allowed to switch lending on and off.
        /// * `fee_resource`: The resource fixed fees are charged in.
        ///
        /// # Logic
        /// 1. Allocates a component address.
        /// 2. Creates the lender badge resource, mintable only by this component.
        /// 3. Creates the `LoanReceipt` resource. Only this component can mint and burn receipts, and depositing
        ///    them is denied, which makes them **transient**: they must be returned to `repay_loan` within the
        ///    same transaction.
        /// 4. Globalizes the component with lending enabled.
        pub fn instantiate(owner_role: OwnerRole, fee_resource: ResourceAddress) -> Global<FlashLender> {
            let (address_reservation, component_address) =
                Runtime::allocate_component_address(FlashLender::blueprint_id());

            let lender_badge_manager: ResourceManager =
                ResourceBuilder::new_integer_non_fungible::<LenderBadge>(OwnerRole::None)
                    .metadata(metadata!(
                        init {
                            "name" => "Flash Lender Badge", locked;
                            "description" => "Proves control over a flash lender position", locked;
                        }
                    ))
                    .mint_roles(mint_roles!(
                        minter => rule!(require(global_caller(component_address)));
                        minter_updater => rule!(deny_all);
                    ))
                    .create_with_no_initial_supply()
                    .into();

            let loan_receipt_manager: ResourceManager =
                ResourceBuilder::new_integer_non_fungible::<LoanReceipt>(OwnerRole::None)
                    .metadata(metadata!(
                        init {
                            "name" => "Flash Loan Receipt", locked;
                            "description" => "A receipt for your flash loan", locked;
                        }
                    ))
                    .mint_roles(mint_roles!(
                        minter => rule!(require(global_caller(component_address)));
                        minter_updater => rule!(deny_all);
                    ))
                    .burn_roles(burn_roles!(
                        burner => rule!(require(global_caller(component_address)));
                        burner_updater => rule!(deny_all);
                    ))
                    .deposit_roles(deposit_roles!(
                        depositor => rule!(deny_all);
                        depositor_updater => rule!(deny_all);
                    ))
                    .create_with_no_initial_supply()
                    .into();

            Self {
                lenders: KeyValueStore::new(),
                lender_badge_manager,
                loan_receipt_manager,
                fee_resource,
                lender_counter: 0,
                loan_receipt_counter: 0,
                enabled: true,
            }
            .instantiate()
            .prepare_to_globalize(owner_role)
            .with_address(address_reservation)
            .metadata(metadata! {
                init {
                    "name" => "Flash Lender".to_string(), updatable;
                    "description" => "Flash loans from many lenders in one transaction".to_string(), updatable;
                }
            })
            .globalize()
        }

        /// Registers `account` as a lender and deposits a fresh lender badge into it.
        ///
        /// # Panics
        /// * If the account is already registered.
        pub fn register_lender(&mut self, account: ComponentAddress) {
            assert!(
                self.lenders.get(&account).is_none(),
                "Account is already registered as a lender."
            );

            self.lender_counter += 1;
            let badge_id = NonFungibleLocalId::integer(self.lender_counter);
            let badge: Bucket = self
                .lender_badge_manager
                .mint_non_fungible(&badge_id, LenderBadge { account });

            self.lenders.insert(
                account,
                LenderPosition {
                    badge_id: badge_id.clone(),
                    fee_policies: HashMap::new(),
                    vaults: HashMap::new(),
                },
            );

            let mut lender_account: Global<Account> = Global::from(account);
            lender_account.try_deposit_or_abort(badge, None);

            Runtime::emit_event(EventLenderRegistered { account, badge_id });
        }

        /// Replaces the fee configs of the badge holder's position.
        ///
        /// # Panics
        /// * If the proof is not a lender badge.
        /// * If a fee value is negative, or a resource is non-fungible.
        pub fn update_fee_configs(
            &mut self,
            lender_badge: NonFungibleProof,
            fee_policies: HashMap<ResourceAddress, FeePolicy>,
        ) {
            let account = self.lender_of(lender_badge);

            for (resource, policy) in fee_policies.iter() {
                assert!(
                    !policy.fee.value().is_negative(),
                    "Fee values cannot be negative."
                );
                assert!(
                    ResourceManager::from_address(*resource)
                        .resource_type()
                        .is_fungible(),
                    "Only fungible resources can be lent."
                );
            }

            self.lenders
                .get_mut(&account)
                .expect("Account is not registered as a lender.")
                .fee_policies = fee_policies.clone();

            Runtime::emit_event(EventFeeConfigsUpdated {
                account,
                fee_policies,
            });
        }

        /// Adds liquidity to the badge holder's position.
        pub fn deposit(&mut self, lender_badge: NonFungibleProof, liquidity: Bucket) {
            let account = self.lender_of(lender_badge);
            let resource = liquidity.resource_address();
            let amount = liquidity.amount();

            let mut position = self
                .lenders
                .get_mut(&account)
                .expect("Account is not registered as a lender.");
            if let Some(vault) = position.vaults.get_mut(&resource) {
                vault.put(liquidity);
            } else {
                position
                    .vaults
                    .insert(resource, Vault::with_bucket(liquidity));
            }
            let available = position.vaults[&resource].amount();

            Runtime::emit_event(EventLiquidityDeposited {
                account,
                resource,
                amount,
                available,
            });
        }

        /// Takes liquidity out of the badge holder's position.
        ///
        /// # Panics
        /// * If the position holds less than `amount` of `resource`.
        pub fn withdraw(
            &mut self,
            lender_badge: NonFungibleProof,
            resource: ResourceAddress,
            amount: Decimal,
        ) -> Bucket {
            let account = self.lender_of(lender_badge);

            let mut position = self
                .lenders
                .get_mut(&account)
                .expect("Account is not registered as a lender.");
            let vault = position
                .vaults
                .get_mut(&resource)
                .expect("No liquidity of this resource.");
            assert!(vault.amount() >= amount, "Not enough liquidity to withdraw.");
            let liquidity = vault.take(amount);
            let available = vault.amount();

            Runtime::emit_event(EventLiquidityWithdrawn {
                account,
                resource,
                amount,
                available,
            });

            liquidity
        }

        /// Takes out a flash loan of `amount` of `resource` from `lender`.
        ///
        /// # Returns
        /// * `(Bucket, Bucket)`: The borrowed tokens and the transient `LoanReceipt` NFT.
        ///
        /// # Panics
        /// * If flash loans are disabled, globally or by the lender for this resource.
        /// * If the lender holds less than `amount`. A balance that dropped after the borrower's quote fails here,
        ///   taking the whole transaction down with it.
        ///
        /// # Logic
        /// 1. Takes `amount` from the lender's vault.
        /// 2. Computes the fee: `Percentage(p)` is `p` percent of `amount` in the borrowed resource, rounded to its
        ///    divisibility. `Fixed(v)` is `v` of the fee resource.
        /// 3. Mints a `LoanReceipt` recording lender, principal and fee.
        pub fn borrow(
            &mut self,
            resource: ResourceAddress,
            amount: Decimal,
            lender: ComponentAddress,
        ) -> (Bucket, Bucket) {
            assert!(self.enabled, "Flash loans are disabled.");
            assert!(amount > Decimal::ZERO, "Loan amount must be positive.");

            let (loan, policy) = {
                let mut position = self
                    .lenders
                    .get_mut(&lender)
                    .expect("Account is not registered as a lender.");
                let policy = *position
                    .fee_policies
                    .get(&resource)
                    .expect("The lender does not lend this resource.");
                assert!(
                    policy.enabled,
                    "The lender has disabled flash loans of this resource."
                );
                let vault = position
                    .vaults
                    .get_mut(&resource)
                    .expect("The lender holds none of this resource.");
                assert!(
                    vault.amount() >= amount,
                    "The lender cannot cover the requested amount."
                );
                (vault.take(amount), policy)
            };

            let (fee_resource, fee_amount) = match policy.fee {
                Fee::Percentage(percentage) => {
                    let divisibility = ResourceManager::from_address(resource)
                        .resource_type()
                        .divisibility()
                        .unwrap_or(DIVISIBILITY_MAXIMUM);
                    let fee_amount = (amount * percentage / dec!(100))
                        .checked_round(divisibility, RoundingMode::ToNearestMidpointAwayFromZero)
                        .expect("Fee calculation overflowed.");
                    (resource, fee_amount)
                }
                Fee::Fixed(value) => (self.fee_resource, value),
            };

            let loan_receipt = LoanReceipt {
                lender,
                resource,
                amount,
                fee_resource,
                fee_amount,
            };

            self.loan_receipt_counter += 1;
            let receipt_id = NonFungibleLocalId::integer(self.loan_receipt_counter);
            let receipt: Bucket = self
                .loan_receipt_manager
                .mint_non_fungible(&receipt_id, loan_receipt.clone());

            Runtime::emit_event(EventLoanIssued {
                receipt_id,
                receipt: loan_receipt,
            });

            (loan, receipt)
        }

        /// Repays a flash loan to `lender`.
        ///
        /// # Returns
        /// * `(Bucket, Bucket)`: Whatever was overpaid of the principal and of the fee.
        ///
        /// # Panics
        /// * If `receipt` is not a loan receipt of this component, or was issued for another lender.
        /// * If `loan` or `fee` hold the wrong resource or too little of it.
        pub fn repay_loan(
            &mut self,
            receipt: Bucket,
            mut loan: Bucket,
            mut fee: Bucket,
            lender: ComponentAddress,
        ) -> (Bucket, Bucket) {
            assert!(
                receipt.resource_address() == self.loan_receipt_manager.address(),
                "Invalid loan receipt."
            );

            let receipt_id = receipt.as_non_fungible().non_fungible_local_id();
            let loan_receipt: LoanReceipt = self
                .loan_receipt_manager
                .get_non_fungible_data(&receipt_id);

            assert!(
                loan_receipt.lender == lender,
                "The loan was taken from another lender."
            );
            assert!(
                loan.resource_address() == loan_receipt.resource
                    && loan.amount() >= loan_receipt.amount,
                "Not enough of the borrowed resource paid back."
            );
            assert!(
                fee.resource_address() == loan_receipt.fee_resource
                    && fee.amount() >= loan_receipt.fee_amount,
                "Not enough fee paid."
            );

            let principal = loan.take(loan_receipt.amount);
            let fee_paid = fee.take(loan_receipt.fee_amount);

            {
                let mut position = self
                    .lenders
                    .get_mut(&lender)
                    .expect("Account is not registered as a lender.");
                for payment in [principal, fee_paid] {
                    let resource = payment.resource_address();
                    if let Some(vault) = position.vaults.get_mut(&resource) {
                        vault.put(payment);
                    } else {
                        position.vaults.insert(resource, Vault::with_bucket(payment));
                    }
                }
            }

            receipt.burn();

            Runtime::emit_event(EventLoanRepaid {
                receipt_id,
                receipt: loan_receipt,
            });

            (loan, fee)
        }

        /// Fee configs and available liquidity of `account`, if it is a registered lender.
        pub fn get_lender(&self, account: ComponentAddress) -> Option<LenderView> {
            self.lenders.get(&account).map(|position| LenderView {
                account,
                badge_id: position.badge_id.clone(),
                fee_policies: position.fee_policies.clone(),
                available: position
                    .vaults
                    .iter()
                    .map(|(resource, vault)| (*resource, vault.amount()))
                    .collect(),
            })
        }

        pub fn get_addresses(&self) -> FlashLenderAddresses {
            FlashLenderAddresses {
                lender_badge: self.lender_badge_manager.address(),
                loan_receipt: self.loan_receipt_manager.address(),
                fee_resource: self.fee_resource,
            }
        }

        /// Enables or disables all flash loans.
        pub fn set_lending_enabled(&mut self, enabled: bool) {
            self.enabled = enabled;
        }

        fn lender_of(&self, lender_badge: NonFungibleProof) -> ComponentAddress {
            let checked = lender_badge.check_with_message(
                self.lender_badge_manager.address(),
                "Invalid lender badge.",
            );
            checked.non_fungible::<LenderBadge>().data().account
        }
    }
}
