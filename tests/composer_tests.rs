use helper::*;

use flash_loan_router::composer::*;
use flash_loan_router::resources::encode_address;
use flash_loan_router::{
    calculate_loan, Error, FeeConfig, FeeType, Instruction, LenderAccount, LoanPlan, ManifestArg,
    ManifestLine, ManifestScript, NoUse, ResourceDetails,
};
use scrypto::prelude::*;

fn two_lender_plan(fixture: &Fixture) -> LoanPlan {
    let hug = fixture.hug.address;
    let lenders = vec![
        LenderAccount::new(account(1)).with_resource(hug, dec!(5), FeeConfig::fixed(dec!(1))),
        LenderAccount::new(account(2)).with_resource(hug, dec!(3), FeeConfig::fixed(dec!("0.5"))),
    ];
    calculate_loan(&fixture.hug, dec!(6), &lenders).unwrap()
}

fn call(instruction: &Instruction) -> (ComponentAddress, &str, &[ManifestArg]) {
    match instruction {
        Instruction::CallMethod {
            address,
            method,
            args,
        } => (*address, method.as_str(), args.as_slice()),
        other => panic!("expected a method call, got {:?}", other),
    }
}

fn taken_bucket(instruction: &Instruction) -> (ResourceAddress, Option<Decimal>, &str) {
    match instruction {
        Instruction::TakeFromWorktop {
            resource,
            amount,
            bucket,
        } => (*resource, Some(*amount), bucket.as_str()),
        Instruction::TakeAllFromWorktop { resource, bucket } => (*resource, None, bucket.as_str()),
        other => panic!("expected a worktop take, got {:?}", other),
    }
}

#[test]
fn test_loan_manifest_phases_are_ordered_and_paired() {
    let fixture = Fixture::new();
    let addresses = &fixture.addresses;
    let hug = fixture.hug.address;
    let xrd = fixture.xrd.address;
    let plan = two_lender_plan(&fixture);

    let manifest =
        compose_loan_manifest(plan, fixture.borrower, addresses, &fixture.xrd, &NoUse).unwrap();
    let instructions: Vec<&Instruction> = manifest.instructions().collect();
    assert_eq!(instructions.len(), 14);

    // Phase 1: lender 2 is cheaper and comes first
    for (i, lender) in [account(2), account(1)].into_iter().enumerate() {
        let (address, method, args) = call(instructions[2 * i]);
        assert_eq!(address, addresses.router_component);
        assert_eq!(method, BORROW_METHOD);
        assert_eq!(args[0], ManifestArg::Resource(hug));
        assert_eq!(args[1], ManifestArg::Decimal(dec!(3)));
        assert_eq!(args[2], ManifestArg::Component(lender));

        let receipt_bucket = loan_receipt_bucket(i);
        assert_eq!(
            taken_bucket(instructions[2 * i + 1]),
            (addresses.loan_receipt_resource, Some(dec!(1)), receipt_bucket.as_str())
        );
    }

    // Phase 3: same order, each repay hands back its own receipt
    for (i, (lender, fee)) in [(account(2), dec!("0.5")), (account(1), dec!(1))]
        .into_iter()
        .enumerate()
    {
        let base = 4 + 3 * i;
        let loan_bucket_name = loan_bucket(i);
        let fee_bucket_name = fee_bucket(i);
        assert_eq!(
            taken_bucket(instructions[base]),
            (hug, Some(dec!(3)), loan_bucket_name.as_str())
        );
        assert_eq!(
            taken_bucket(instructions[base + 1]),
            (xrd, Some(fee), fee_bucket_name.as_str())
        );

        let (address, method, args) = call(instructions[base + 2]);
        assert_eq!(address, addresses.router_component);
        assert_eq!(method, REPAY_METHOD);
        assert_eq!(
            args,
            &[
                ManifestArg::bucket(loan_receipt_bucket(i)),
                ManifestArg::bucket(loan_bucket(i)),
                ManifestArg::bucket(fee_bucket(i)),
                ManifestArg::Component(lender),
            ]
        );
    }

    // Phase 4: profit and fee change go to the borrower
    assert_eq!(taken_bucket(instructions[10]), (hug, None, PROFIT_BUCKET));
    assert_eq!(
        call(instructions[11]),
        (
            fixture.borrower,
            ACCOUNT_DEPOSIT_METHOD,
            &[ManifestArg::bucket(PROFIT_BUCKET)][..]
        )
    );
    assert_eq!(taken_bucket(instructions[12]), (xrd, None, FEE_CHANGE_BUCKET));
    assert_eq!(
        call(instructions[13]),
        (
            fixture.borrower,
            ACCOUNT_DEPOSIT_METHOD,
            &[ManifestArg::bucket(FEE_CHANGE_BUCKET)][..]
        )
    );

    // Every receipt was consumed
    assert!(!manifest.is_live(&loan_receipt_bucket(0)));
    assert!(!manifest.is_live(&loan_receipt_bucket(1)));
}

#[test]
fn test_use_phase_runs_between_borrow_and_repay() {
    let fixture = Fixture::new();
    let plan = two_lender_plan(&fixture);
    let use_phase = faucet_use_phase(
        fixture.faucet,
        fixture.hug.address,
        dec!(2),
        fixture.xrd.address,
        dec!("1.5"),
    );

    let manifest = compose_loan_manifest(
        plan,
        fixture.borrower,
        &fixture.addresses,
        &fixture.xrd,
        &use_phase,
    )
    .unwrap();

    let methods: Vec<&str> = manifest
        .instructions()
        .filter_map(|instruction| match instruction {
            Instruction::CallMethod { method, .. } => Some(method.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(
        methods,
        vec![
            BORROW_METHOD,
            BORROW_METHOD,
            FAUCET_FREE_METHOD,
            FAUCET_FREE_METHOD,
            REPAY_METHOD,
            REPAY_METHOD,
            ACCOUNT_DEPOSIT_METHOD,
            ACCOUNT_DEPOSIT_METHOD,
        ]
    );

    // The use phase's own comment sits under the PART #2 heading
    let comments: Vec<&str> = manifest
        .lines()
        .iter()
        .filter_map(|line| match line {
            ManifestLine::Comment(text) if text.starts_with("-----") || text.starts_with("Trade") => {
                Some(text.as_str())
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        comments,
        vec![
            "----- PART #1 - Take out the loan",
            "----- Put each loan receipt into a bucket so we can return it",
            "----- PART #2 - Use the loan",
            "Trade the borrowed funds",
            "----- PART #3 - Repay the loan",
            "----- PART #4 - Profit",
        ]
    );
    assert!(matches!(manifest.lines().first(), Some(ManifestLine::Comment(_))));
}

#[test]
fn test_no_fee_change_when_fees_are_paid_in_the_borrowed_resource() {
    let fixture = Fixture::new();
    let mut addresses = fixture.addresses.clone();
    addresses.fee_resource = fixture.hug.address;
    let plan = two_lender_plan(&fixture);

    let manifest =
        compose_loan_manifest(plan, fixture.borrower, &addresses, &fixture.hug, &NoUse).unwrap();

    assert_eq!(manifest.instructions().count(), 12);
    assert!(!manifest
        .instructions()
        .any(|instruction| taken_bucket_name(instruction) == Some(FEE_CHANGE_BUCKET)));
}

fn taken_bucket_name(instruction: &Instruction) -> Option<&str> {
    match instruction {
        Instruction::TakeFromWorktop { bucket, .. } | Instruction::TakeAllFromWorktop { bucket, .. } => {
            Some(bucket.as_str())
        }
        _ => None,
    }
}

#[test]
fn test_use_phase_cannot_steal_reserved_slots() {
    let fixture = Fixture::new();
    let plan = two_lender_plan(&fixture);
    let hug = fixture.hug.address;
    let greedy = move |manifest: &mut ManifestScript, _plan: &LoanPlan| -> flash_loan_router::Result<()> {
        manifest.take_all_from_worktop(hug, PROFIT_BUCKET)?;
        Ok(())
    };

    let result = compose_loan_manifest(
        plan,
        fixture.borrower,
        &fixture.addresses,
        &fixture.xrd,
        &greedy,
    );

    assert_eq!(result.unwrap_err(), Error::DuplicateSlot(PROFIT_BUCKET.to_string()));
}

#[test]
fn test_use_phase_errors_abort_composition() {
    let fixture = Fixture::new();
    let plan = two_lender_plan(&fixture);
    let failing = |_manifest: &mut ManifestScript, _plan: &LoanPlan| -> flash_loan_router::Result<()> {
        Err(Error::Registry("price feed unavailable".into()))
    };

    let result = compose_loan_manifest(
        plan,
        fixture.borrower,
        &fixture.addresses,
        &fixture.xrd,
        &failing,
    );

    assert_eq!(
        result.unwrap_err(),
        Error::Registry("price feed unavailable".into())
    );
}

#[test]
fn test_slots_are_declared_once_and_consumed_once() {
    let fixture = Fixture::new();
    let hug = fixture.hug.address;
    let mut manifest = ManifestScript::new();

    manifest.take_from_worktop(hug, dec!(1), "loan").unwrap();
    assert!(manifest.is_live("loan"));
    assert_eq!(
        manifest.take_from_worktop(hug, dec!(1), "loan").unwrap_err(),
        Error::DuplicateSlot("loan".into())
    );

    manifest
        .call_method(fixture.borrower, ACCOUNT_DEPOSIT_METHOD, vec![ManifestArg::bucket("loan")])
        .unwrap();
    assert!(!manifest.is_live("loan"));

    // Consumed buckets cannot be used again, nor declared anew
    assert_eq!(
        manifest
            .call_method(fixture.borrower, ACCOUNT_DEPOSIT_METHOD, vec![ManifestArg::bucket("loan")])
            .unwrap_err(),
        Error::UnknownSlot("loan".into())
    );
    assert_eq!(
        manifest.take_all_from_worktop(hug, "loan").unwrap_err(),
        Error::DuplicateSlot("loan".into())
    );

    // A bucket is not a proof
    manifest.take_from_worktop(hug, dec!(1), "other").unwrap();
    assert_eq!(
        manifest
            .call_method(fixture.borrower, ACCOUNT_DEPOSIT_METHOD, vec![ManifestArg::proof("other")])
            .unwrap_err(),
        Error::UnknownSlot("other".into())
    );

    // Nor can one call consume the same bucket twice
    assert_eq!(
        manifest
            .call_method(
                fixture.borrower,
                ACCOUNT_DEPOSIT_METHOD,
                vec![ManifestArg::bucket("other"), ManifestArg::bucket("other")]
            )
            .unwrap_err(),
        Error::UnknownSlot("other".into())
    );

    // Failed operations leave the script untouched
    assert_eq!(manifest.instructions().count(), 3);
    assert!(manifest.is_live("other"));
}

#[test]
fn test_loan_manifest_renders_as_transaction_manifest() {
    let fixture = Fixture::new();
    let network = &fixture.addresses.network;
    let plan = two_lender_plan(&fixture);

    let manifest =
        compose_loan_manifest(plan, fixture.borrower, &fixture.addresses, &fixture.xrd, &NoUse)
            .unwrap();
    let rendered = manifest.render(network).unwrap();

    let router = encode_address(network, fixture.addresses.router_component.as_node_id()).unwrap();
    let hug = encode_address(network, fixture.hug.address.as_node_id()).unwrap();
    let lender = encode_address(network, account(2).as_node_id()).unwrap();

    assert!(rendered.starts_with("# ----- PART #1 - Take out the loan\n"));
    assert!(rendered.contains(&format!(
        "CALL_METHOD\n    Address(\"{}\")\n    \"borrow\"\n    Address(\"{}\")\n    Decimal(\"3\")\n    Address(\"{}\")\n;",
        router, hug, lender
    )));
    assert!(rendered.contains("    Bucket(\"loan_receipt_0\")\n"));
    assert!(rendered.contains("# ----- PART #2 - Use the loan\n"));
    assert!(rendered.contains("# ----- PART #3 - Repay the loan\n"));
    assert!(rendered.contains("# ----- PART #4 - Profit\n"));
    assert!(rendered.contains("# Borrow 3 HUG from account "));
    assert!(rendered.contains("plus a fee of 0.5 XRD"));
    assert!(rendered.contains(&format!("TAKE_ALL_FROM_WORKTOP\n    Address(\"{}\")\n    Bucket(\"profit\")\n;", hug)));
}

#[test]
fn test_fee_config_update_manifest() {
    let fixture = Fixture::new();
    let network = &fixture.addresses.network;
    let lender = account(1);
    let configs = vec![
        (fixture.hug.clone(), FeeConfig::percentage(dec!("0.3"))),
        (fixture.xrd.clone(), FeeConfig::fixed(dec!(2)).disabled()),
        (
            ResourceDetails::fungible(fungible(50)),
            FeeConfig::new(true, FeeType::Fixed, None),
        ),
        (ResourceDetails::fungible(fungible(51)), FeeConfig::fixed(-dec!(1))),
    ];

    let manifest = compose_fee_config_update(lender, &configs, &fixture.addresses).unwrap();
    let instructions: Vec<&Instruction> = manifest.instructions().collect();
    assert_eq!(instructions.len(), 3);

    assert_eq!(
        call(instructions[0]),
        (
            lender,
            ACCOUNT_CREATE_PROOF_METHOD,
            &[
                ManifestArg::Resource(fixture.addresses.lender_badge_resource),
                ManifestArg::Decimal(dec!(1)),
            ][..]
        )
    );
    assert_eq!(
        instructions[1],
        &Instruction::PopFromAuthZone {
            proof: LENDER_BADGE_PROOF.to_string()
        }
    );

    let (address, method, args) = call(instructions[2]);
    assert_eq!(address, fixture.addresses.router_component);
    assert_eq!(method, UPDATE_FEE_CONFIGS_METHOD);
    assert_eq!(args[0], ManifestArg::proof(LENDER_BADGE_PROOF));
    match &args[1] {
        ManifestArg::Map { entries, .. } => assert_eq!(
            entries,
            &vec![
                (
                    ManifestArg::Resource(fixture.hug.address),
                    ManifestArg::Tuple(vec![
                        ManifestArg::Bool(true),
                        ManifestArg::Enum(0, vec![ManifestArg::Decimal(dec!("0.3"))]),
                    ]),
                ),
                (
                    ManifestArg::Resource(fixture.xrd.address),
                    ManifestArg::Tuple(vec![
                        ManifestArg::Bool(false),
                        ManifestArg::Enum(1, vec![ManifestArg::Decimal(dec!(2))]),
                    ]),
                ),
            ]
        ),
        other => panic!("expected a map, got {:?}", other),
    }

    let rendered = manifest.render(network).unwrap();
    let hug = encode_address(network, fixture.hug.address.as_node_id()).unwrap();
    assert!(rendered.contains(&format!(
        "Map<Address, Tuple>(Address(\"{}\") => Tuple(true, Enum<0u8>(Decimal(\"0.3\")))",
        hug
    )));
}
