use crate::core::balance::BalanceMap;
use crate::core::currency::AMOUNT_SCALE;
use crate::core::expense::Expense;
use crate::core::group::Group;
use crate::core::member::MemberId;
use log::debug;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeSet;

/// Computes per-member net balances from a group's expense history.
///
/// Converts each expense to the base unit, credits the payer the full
/// converted amount, and debits each beneficiary an equal share. The
/// result is a [`BalanceMap`] where positive means the member is owed
/// money and negative means they owe.
pub struct BalanceCalculator;

impl BalanceCalculator {
    /// Compute net balances for a roster of members over a list of expenses.
    ///
    /// `members` is the universe whose balances are tracked. Expenses
    /// referencing outsiders still convert and split; the outsiders'
    /// credits and debits are silently dropped, so only current members
    /// accumulate positions.
    ///
    /// # Algorithm
    ///
    /// 1. Initialize every member to zero.
    /// 2. Skip any expense with no beneficiaries (checked before the
    ///    share division ever runs).
    /// 3. Convert the amount to the base unit at the expense's rate.
    /// 4. Split the converted amount across beneficiaries by
    ///    largest-remainder allocation, so shares sum exactly to the
    ///    converted amount.
    /// 5. Credit the payer the full converted amount; debit each
    ///    beneficiary its share.
    ///
    /// For a closed expense set (payers and beneficiaries all on the
    /// roster) the resulting balances sum to exactly zero.
    pub fn group_balances(members: &BTreeSet<MemberId>, expenses: &[Expense]) -> BalanceMap {
        let mut balances = BalanceMap::with_members(members.iter().cloned());

        for expense in expenses {
            let beneficiaries = expense.beneficiaries();
            if beneficiaries.is_empty() {
                debug!("expense {} has no beneficiaries, skipping", expense.id());
                continue;
            }

            let amount_base = expense.amount_in_base();
            let shares = split_even(amount_base, beneficiaries.len());

            balances.credit_tracked(expense.paid_by(), amount_base);
            for (beneficiary, share) in beneficiaries.iter().zip(shares) {
                balances.debit_tracked(beneficiary, share);
            }
        }

        balances
    }

    /// Compute balances for a [`Group`]: its roster over its expense history.
    pub fn for_group(group: &Group) -> BalanceMap {
        Self::group_balances(group.members(), group.expenses().expenses())
    }
}

/// Split `amount` into `parts` shares that sum exactly to `amount`.
///
/// Largest-remainder allocation at [`AMOUNT_SCALE`]: every share gets the
/// floor of `amount / parts`, and the leftover minor units are handed out
/// one each to the earliest shares. Callers pair the shares with
/// beneficiaries in member order, which fixes who absorbs the remainder
/// deterministically.
///
/// # Panics
///
/// Panics if `parts` is zero; the caller filters empty beneficiary sets
/// first.
fn split_even(amount: Decimal, parts: usize) -> Vec<Decimal> {
    assert!(parts > 0, "cannot split across zero parts");
    let count = Decimal::from(parts as u64);

    let floor_share =
        (amount / count).round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::ToZero);
    let mut remainder = amount - floor_share * count;

    let step = Decimal::new(1, AMOUNT_SCALE);
    let mut shares = vec![floor_share; parts];
    for share in shares.iter_mut() {
        if remainder <= Decimal::ZERO {
            break;
        }
        *share += step;
        remainder -= step;
    }
    shares
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::{CurrencyCode, CurrencyRate};
    use rust_decimal_macros::dec;

    fn eur() -> CurrencyRate {
        CurrencyRate::new(CurrencyCode::new("EUR"), dec!(1.0))
    }

    fn roster(names: &[&str]) -> BTreeSet<MemberId> {
        names.iter().map(|n| MemberId::new(*n)).collect()
    }

    #[test]
    fn test_split_even_exact() {
        assert_eq!(
            split_even(dec!(90.00), 3),
            vec![dec!(30.00), dec!(30.00), dec!(30.00)]
        );
    }

    #[test]
    fn test_split_even_remainder_to_earliest() {
        // 100.00 / 3 = 33.33 floor, 1 cent left over
        assert_eq!(
            split_even(dec!(100.00), 3),
            vec![dec!(33.34), dec!(33.33), dec!(33.33)]
        );
        // 0.05 / 4: one cent each, fifth cent to the first share
        assert_eq!(
            split_even(dec!(0.05), 4),
            vec![dec!(0.02), dec!(0.01), dec!(0.01), dec!(0.01)]
        );
    }

    #[test]
    fn test_split_even_conserves_amount() {
        for parts in 1..=9 {
            let shares = split_even(dec!(77.77), parts);
            assert_eq!(shares.iter().sum::<Decimal>(), dec!(77.77));
        }
    }

    #[test]
    fn test_two_way_split() {
        let members = roster(&["alice", "bob"]);
        let expenses = vec![Expense::new(
            MemberId::new("alice"),
            dec!(100.00),
            eur(),
            [MemberId::new("alice"), MemberId::new("bob")],
        )];

        let balances = BalanceCalculator::group_balances(&members, &expenses);
        assert_eq!(balances.balance(&MemberId::new("alice")), dec!(50.00));
        assert_eq!(balances.balance(&MemberId::new("bob")), dec!(-50.00));
        assert!(balances.is_balanced());
    }

    #[test]
    fn test_payer_sole_beneficiary_nets_to_zero() {
        let members = roster(&["alice", "bob"]);
        let expenses = vec![Expense::new(
            MemberId::new("alice"),
            dec!(42.00),
            eur(),
            [MemberId::new("alice")],
        )];

        let balances = BalanceCalculator::group_balances(&members, &expenses);
        assert_eq!(balances.balance(&MemberId::new("alice")), Decimal::ZERO);
        assert_eq!(balances.balance(&MemberId::new("bob")), Decimal::ZERO);
    }

    #[test]
    fn test_empty_beneficiaries_skipped() {
        let members = roster(&["alice", "bob"]);
        let expenses = vec![Expense::new(
            MemberId::new("alice"),
            dec!(42.00),
            eur(),
            [],
        )];

        let balances = BalanceCalculator::group_balances(&members, &expenses);
        assert_eq!(balances.balance(&MemberId::new("alice")), Decimal::ZERO);
        assert!(balances.is_balanced());
    }

    #[test]
    fn test_outside_payer_dropped() {
        let members = roster(&["alice", "bob"]);
        let expenses = vec![Expense::new(
            MemberId::new("mallory"),
            dec!(30.00),
            eur(),
            [MemberId::new("alice"), MemberId::new("bob"), MemberId::new("mallory")],
        )];

        let balances = BalanceCalculator::group_balances(&members, &expenses);
        // mallory's credit and her own share are dropped; alice and bob
        // each still owe a 10.00 share
        assert_eq!(balances.balance(&MemberId::new("alice")), dec!(-10.00));
        assert_eq!(balances.balance(&MemberId::new("bob")), dec!(-10.00));
        assert!(!balances.contains(&MemberId::new("mallory")));
    }

    #[test]
    fn test_outside_beneficiary_dropped() {
        let members = roster(&["alice", "bob"]);
        let expenses = vec![Expense::new(
            MemberId::new("alice"),
            dec!(30.00),
            eur(),
            [MemberId::new("bob"), MemberId::new("mallory"), MemberId::new("zed")],
        )];

        let balances = BalanceCalculator::group_balances(&members, &expenses);
        // alice is credited the full 30.00; only bob's 10.00 share lands
        assert_eq!(balances.balance(&MemberId::new("alice")), dec!(30.00));
        assert_eq!(balances.balance(&MemberId::new("bob")), dec!(-10.00));
    }

    #[test]
    fn test_conversion_applied_before_split() {
        let members = roster(&["alice", "bob"]);
        let usd = CurrencyRate::new(CurrencyCode::new("USD"), dec!(0.9200));
        let expenses = vec![Expense::new(
            MemberId::new("alice"),
            dec!(100.00),
            usd,
            [MemberId::new("alice"), MemberId::new("bob")],
        )];

        let balances = BalanceCalculator::group_balances(&members, &expenses);
        // 100.00 USD -> 92.00 base, split 46.00 each
        assert_eq!(balances.balance(&MemberId::new("alice")), dec!(46.00));
        assert_eq!(balances.balance(&MemberId::new("bob")), dec!(-46.00));
    }

    #[test]
    fn test_uneven_split_conserves() {
        let members = roster(&["alice", "bob", "carol"]);
        let expenses = vec![Expense::new(
            MemberId::new("alice"),
            dec!(100.00),
            eur(),
            [
                MemberId::new("alice"),
                MemberId::new("bob"),
                MemberId::new("carol"),
            ],
        )];

        let balances = BalanceCalculator::group_balances(&members, &expenses);
        // alice absorbs the rounding cent: +100.00 - 33.34 = 66.66
        assert_eq!(balances.balance(&MemberId::new("alice")), dec!(66.66));
        assert_eq!(balances.balance(&MemberId::new("bob")), dec!(-33.33));
        assert_eq!(balances.balance(&MemberId::new("carol")), dec!(-33.33));
        assert!(balances.is_balanced());
    }

    #[test]
    fn test_three_way_scenario() {
        let members = roster(&["a", "b", "c"]);
        let expenses = vec![Expense::new(
            MemberId::new("a"),
            dec!(90.00),
            eur(),
            [MemberId::new("a"), MemberId::new("b"), MemberId::new("c")],
        )];

        let balances = BalanceCalculator::group_balances(&members, &expenses);
        assert_eq!(balances.balance(&MemberId::new("a")), dec!(60.00));
        assert_eq!(balances.balance(&MemberId::new("b")), dec!(-30.00));
        assert_eq!(balances.balance(&MemberId::new("c")), dec!(-30.00));
    }
}
