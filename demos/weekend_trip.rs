//! Single-group clearing example.
//!
//! Walks through a weekend trip: multi-currency expenses, per-member
//! balances, and the settlement plan that clears them.

use expense_clearing::clearing::balances::BalanceCalculator;
use expense_clearing::clearing::report::ClearingSummary;
use expense_clearing::clearing::settlement::SettlementPlanner;
use expense_clearing::core::currency::CurrencyCode;
use expense_clearing::core::group::Group;
use expense_clearing::core::member::MemberId;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn main() {
    println!("╔══════════════════════════════════════════════╗");
    println!("║  expense-clearing: Weekend Trip Example      ║");
    println!("╚══════════════════════════════════════════════╝\n");

    let alice = MemberId::new("alice");
    let bob = MemberId::new("bob");
    let carol = MemberId::new("carol");

    let mut group = Group::new(
        "prague weekend",
        [alice.clone(), bob.clone(), carol.clone()],
    );
    group.set_rate(CurrencyCode::new("EUR"), dec!(1.0)).unwrap();
    group.set_rate(CurrencyCode::new("CZK"), dec!(0.0400)).unwrap();

    // alice books the apartment for everyone
    group
        .add_expense(
            alice.clone(),
            dec!(180.00),
            &CurrencyCode::new("EUR"),
            [alice.clone(), bob.clone(), carol.clone()],
        )
        .unwrap();
    // bob covers dinner in koruna
    group
        .add_expense(
            bob.clone(),
            dec!(1500),
            &CurrencyCode::new("CZK"),
            [alice.clone(), bob.clone(), carol.clone()],
        )
        .unwrap();
    // carol buys her own museum ticket — nets to zero for her
    group
        .add_expense(
            carol.clone(),
            dec!(12.00),
            &CurrencyCode::new("EUR"),
            [carol.clone()],
        )
        .unwrap();

    println!("━━━ Balances ━━━\n");
    let balances = BalanceCalculator::for_group(&group);
    for (member, balance) in balances.iter() {
        let status = if balance > Decimal::ZERO {
            "CREDITOR"
        } else if balance < Decimal::ZERO {
            "DEBTOR"
        } else {
            "SETTLED"
        };
        println!("  {:<10} {:>10}  [{}]", member.to_string(), balance.to_string(), status);
    }

    println!("\n━━━ Settlement ━━━\n");
    let plan = SettlementPlanner::plan(&balances);
    println!("{}", plan);

    println!("━━━ Summary ━━━\n");
    println!("{}", ClearingSummary::for_group(&group));
}
