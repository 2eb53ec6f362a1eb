//! Global clearing example.
//!
//! Two groups compute balances independently; the maps merge pointwise
//! and a single settlement plan clears everyone's debts across both.

use expense_clearing::clearing::balances::BalanceCalculator;
use expense_clearing::clearing::settlement::SettlementPlanner;
use expense_clearing::core::balance::BalanceMap;
use expense_clearing::core::currency::CurrencyCode;
use expense_clearing::core::group::Group;
use expense_clearing::core::member::MemberId;
use rust_decimal_macros::dec;

fn main() {
    println!("╔══════════════════════════════════════════════╗");
    println!("║  expense-clearing: Global Clearing Example   ║");
    println!("╚══════════════════════════════════════════════╝\n");

    let alice = MemberId::new("alice");
    let bob = MemberId::new("bob");
    let carol = MemberId::new("carol");

    let mut lisbon = Group::new("lisbon trip", [alice.clone(), bob.clone()]);
    lisbon.set_rate(CurrencyCode::new("EUR"), dec!(1.0)).unwrap();
    lisbon
        .add_expense(
            alice.clone(),
            dec!(100.00),
            &CurrencyCode::new("EUR"),
            [alice.clone(), bob.clone()],
        )
        .unwrap();

    let mut flat = Group::new("flat expenses", [alice.clone(), bob.clone(), carol.clone()]);
    flat.set_rate(CurrencyCode::new("EUR"), dec!(1.0)).unwrap();
    flat.set_rate(CurrencyCode::new("USD"), dec!(0.9200)).unwrap();
    flat.add_expense(
        bob.clone(),
        dec!(90.00),
        &CurrencyCode::new("EUR"),
        [alice.clone(), bob.clone(), carol.clone()],
    )
    .unwrap();
    flat.add_expense(
        carol.clone(),
        dec!(50.00),
        &CurrencyCode::new("USD"),
        [alice.clone(), carol.clone()],
    )
    .unwrap();

    let lisbon_balances = BalanceCalculator::for_group(&lisbon);
    let flat_balances = BalanceCalculator::for_group(&flat);

    for (name, balances) in [("lisbon trip", &lisbon_balances), ("flat expenses", &flat_balances)] {
        println!("━━━ {} ━━━", name);
        for (member, balance) in balances.iter() {
            println!("  {:<10} {:>10}", member.to_string(), balance.to_string());
        }
        println!();
    }

    let global = BalanceMap::merged([&lisbon_balances, &flat_balances]);

    println!("━━━ Global ━━━");
    for (member, balance) in global.iter() {
        println!("  {:<10} {:>10}", member.to_string(), balance.to_string());
    }
    println!();

    let plan = SettlementPlanner::plan(&global);
    println!("{}", plan);
}
