use chrono::NaiveDate;
use genka_finance_core::fiscal::{initialize_fiscal_info, FiscalInfo};
use genka_finance_core::forecast::forecast_cash_flow;
use genka_finance_core::ledger::{record_month, MonthlyBalanceInput, OnConflict};
use genka_finance_core::store::{BillingStore, MemoryDataset};
use genka_finance_core::types::{
    CompanyId, CostEntry, Currency, Project, ProjectId, ProjectStatus, ScheduledBilling,
    SubscriptionCharge, YearMonth,
};
use genka_finance_core::GenkaFinanceError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Fixtures
// ===========================================================================

fn tenant(settlement_month: u32) -> (MemoryDataset, CompanyId) {
    let mut store = MemoryDataset::new();
    let company = CompanyId::new();
    initialize_fiscal_info(
        &mut store,
        FiscalInfo {
            company_id: company,
            fiscal_year: 2025,
            settlement_month,
            current_period: 1,
            bank_balance: dec!(0),
            is_mid_period_change: false,
            change_reason: None,
            original_fiscal_year: None,
            original_settlement_month: None,
        },
    )
    .unwrap();
    (store, company)
}

fn add_project(store: &mut MemoryDataset, company: CompanyId, business_number: &str) -> ProjectId {
    let project = Project {
        id: ProjectId::new(),
        company_id: company,
        business_number: business_number.to_string(),
        name: format!("{business_number} 建築工事"),
        contract_amount: dec!(30_000_000),
        status: ProjectStatus::Active,
        currency: Currency::JPY,
    };
    let id = project.id;
    store.add_project(project);
    id
}

fn billing(company: CompanyId, project: ProjectId, year: i32, month: u32, amount: Decimal) -> ScheduledBilling {
    ScheduledBilling {
        company_id: company,
        project_id: project,
        year_month: YearMonth::new(year, month).unwrap(),
        amount,
    }
}

// ===========================================================================
// Window shape
// ===========================================================================

#[test]
fn test_forecast_is_twelve_consecutive_months() {
    let (store, company) = tenant(9);
    let rows = forecast_cash_flow(&store, company).unwrap().result;

    assert_eq!(rows.len(), 12);
    assert_eq!(rows[0].year_month, YearMonth::new(2025, 10).unwrap());
    assert_eq!(rows[11].year_month, YearMonth::new(2026, 9).unwrap());
    for pair in rows.windows(2) {
        assert_eq!(pair[0].year_month.succ(), pair[1].year_month);
    }
}

#[test]
fn test_december_settlement_starts_next_january() {
    let (store, company) = tenant(12);
    let rows = forecast_cash_flow(&store, company).unwrap().result;
    assert_eq!(rows[0].year_month, YearMonth::new(2026, 1).unwrap());
    assert_eq!(rows[11].year_month, YearMonth::new(2026, 12).unwrap());
}

#[test]
fn test_forecast_requires_fiscal_info() {
    let store = MemoryDataset::new();
    let err = forecast_cash_flow(&store, CompanyId::new()).unwrap_err();
    assert!(matches!(err, GenkaFinanceError::NotFound { .. }));
}

// ===========================================================================
// Inflows and outflows
// ===========================================================================

#[test]
fn test_inflow_adds_billing_and_subscription_for_same_month() {
    let (mut store, company) = tenant(9);
    let site = add_project(&mut store, company, "K-2025-020");

    store
        .put_scheduled_billing(billing(company, site, 2025, 11, dec!(3_000_000)))
        .unwrap();
    store.set_subscription_charge(SubscriptionCharge {
        company_id: company,
        year_month: YearMonth::new(2025, 11).unwrap(),
        amount: dec!(55_000),
    });

    let rows = forecast_cash_flow(&store, company).unwrap().result;
    let november = rows
        .iter()
        .find(|r| r.year_month == YearMonth::new(2025, 11).unwrap())
        .unwrap();
    // Both sources add; they are not mutually exclusive
    assert_eq!(november.projected_inflow, dec!(3_055_000));
}

#[test]
fn test_subscription_project_billings_are_excluded() {
    let (mut store, company) = tenant(9);
    let caddon = add_project(&mut store, company, "CADDON-0001");

    store
        .put_scheduled_billing(billing(company, caddon, 2025, 11, dec!(800_000)))
        .unwrap();

    let output = forecast_cash_flow(&store, company).unwrap();
    let november = output
        .result
        .iter()
        .find(|r| r.year_month == YearMonth::new(2025, 11).unwrap())
        .unwrap();
    assert_eq!(november.projected_inflow, dec!(0));
    assert!(output.warnings.iter().any(|w| w.contains("excluded")));
}

#[test]
fn test_outflow_comes_from_dated_cost_entries() {
    let (mut store, company) = tenant(9);
    let site = add_project(&mut store, company, "K-2025-021");

    store
        .add_cost_entry(CostEntry {
            project_id: site,
            amount: dec!(1_200_000),
            incurred_on: NaiveDate::from_ymd_opt(2025, 12, 8).unwrap(),
        })
        .unwrap();
    // Outside the window: ignored
    store
        .add_cost_entry(CostEntry {
            project_id: site,
            amount: dec!(9_999_999),
            incurred_on: NaiveDate::from_ymd_opt(2025, 1, 8).unwrap(),
        })
        .unwrap();

    let rows = forecast_cash_flow(&store, company).unwrap().result;
    let december = rows
        .iter()
        .find(|r| r.year_month == YearMonth::new(2025, 12).unwrap())
        .unwrap();
    assert_eq!(december.projected_outflow, dec!(1_200_000));
}

#[test]
fn test_rebilled_month_is_never_double_counted() {
    let (mut store, company) = tenant(9);
    let site = add_project(&mut store, company, "K-2025-022");

    store
        .put_scheduled_billing(billing(company, site, 2025, 11, dec!(1_000_000)))
        .unwrap();
    // Second write for the same (project, month) replaces the amount
    store
        .put_scheduled_billing(billing(company, site, 2025, 11, dec!(1_400_000)))
        .unwrap();

    let rows = forecast_cash_flow(&store, company).unwrap().result;
    let november = rows
        .iter()
        .find(|r| r.year_month == YearMonth::new(2025, 11).unwrap())
        .unwrap();
    assert_eq!(november.projected_inflow, dec!(1_400_000));
}

// ===========================================================================
// Running balance
// ===========================================================================

#[test]
fn test_running_balance_seeds_from_latest_ledger_closing() {
    let (mut store, company) = tenant(9);
    let site = add_project(&mut store, company, "K-2025-023");

    record_month(
        &mut store,
        MonthlyBalanceInput {
            company_id: company,
            fiscal_year: 2025,
            balance_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            opening_balance: dec!(4_000_000),
            closing_balance: dec!(5_000_000),
            total_income: dec!(1_500_000),
            total_expense: dec!(500_000),
        },
        OnConflict::Reject,
    )
    .unwrap();

    store
        .put_scheduled_billing(billing(company, site, 2025, 10, dec!(2_000_000)))
        .unwrap();
    store
        .add_cost_entry(CostEntry {
            project_id: site,
            amount: dec!(700_000),
            incurred_on: NaiveDate::from_ymd_opt(2025, 10, 15).unwrap(),
        })
        .unwrap();

    let rows = forecast_cash_flow(&store, company).unwrap().result;
    // 5,000,000 + 2,000,000 - 700,000
    assert_eq!(rows[0].running_balance, dec!(6_300_000));
    // Later months with no activity carry the balance forward
    assert_eq!(rows[1].running_balance, dec!(6_300_000));
}

#[test]
fn test_missing_ledger_defaults_to_zero_with_warning() {
    let (store, company) = tenant(9);
    let output = forecast_cash_flow(&store, company).unwrap();
    assert_eq!(output.result[0].running_balance, dec!(0));
    assert!(output
        .warnings
        .iter()
        .any(|w| w.contains("opening balance assumed 0")));
}

#[test]
fn test_forecast_is_idempotent() {
    let (mut store, company) = tenant(6);
    let site = add_project(&mut store, company, "K-2025-024");
    store
        .put_scheduled_billing(billing(company, site, 2025, 8, dec!(640_000)))
        .unwrap();

    let first = forecast_cash_flow(&store, company).unwrap().result;
    let second = forecast_cash_flow(&store, company).unwrap().result;
    assert_eq!(first, second);
}

// ===========================================================================
// Properties
// ===========================================================================

mod props {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// For every settlement month the forecast is exactly 12 gapless,
        /// repeat-free consecutive months starting right after settlement.
        #[test]
        fn prop_window_shape_holds_for_all_settlement_months(settlement in 1u32..=12) {
            let (store, company) = tenant(settlement);
            let rows = forecast_cash_flow(&store, company).unwrap().result;

            prop_assert_eq!(rows.len(), 12);
            let expected_start = if settlement == 12 {
                YearMonth::new(2026, 1).unwrap()
            } else {
                YearMonth::new(2025, settlement + 1).unwrap()
            };
            prop_assert_eq!(rows[0].year_month, expected_start);
            for pair in rows.windows(2) {
                prop_assert_eq!(pair[0].year_month.succ(), pair[1].year_month);
            }
        }

        /// The running balance is the cumulative sum of net flows over the
        /// opening balance, for arbitrary per-month amounts.
        #[test]
        fn prop_running_balance_is_cumulative(
            amounts in proptest::collection::vec(0u64..=5_000_000, 12),
        ) {
            let (mut store, company) = tenant(3);
            let site = add_project(&mut store, company, "K-2025-030");

            let mut month = YearMonth::new(2025, 4).unwrap();
            for amount in &amounts {
                store
                    .put_scheduled_billing(billing(
                        company,
                        site,
                        month.year,
                        month.month,
                        Decimal::from(*amount),
                    ))
                    .unwrap();
                month = month.succ();
            }

            let rows = forecast_cash_flow(&store, company).unwrap().result;
            let mut expected = Decimal::ZERO;
            for (row, amount) in rows.iter().zip(&amounts) {
                expected += Decimal::from(*amount);
                prop_assert_eq!(row.projected_inflow, Decimal::from(*amount));
                prop_assert_eq!(row.running_balance, expected);
            }
        }
    }
}
