use crate::core::member::MemberId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Net position of each member in the base unit of account.
///
/// A positive balance means the member is owed money (net creditor).
/// A negative balance means the member owes money (net debtor).
///
/// Backed by a `BTreeMap` so iteration order is the member order — every
/// downstream consumer (settlement planning, reporting, serialization)
/// sees the same deterministic sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceMap {
    balances: BTreeMap<MemberId, Decimal>,
}

impl BalanceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a map with every given member initialized to zero.
    pub fn with_members(members: impl IntoIterator<Item = MemberId>) -> Self {
        Self {
            balances: members.into_iter().map(|m| (m, Decimal::ZERO)).collect(),
        }
    }

    /// Whether this member has an entry (tracked by the map).
    pub fn contains(&self, member: &MemberId) -> bool {
        self.balances.contains_key(member)
    }

    /// Add to a member's balance, creating the entry if absent.
    pub fn credit(&mut self, member: &MemberId, amount: Decimal) {
        *self
            .balances
            .entry(member.clone())
            .or_insert(Decimal::ZERO) += amount;
    }

    /// Subtract from a member's balance, creating the entry if absent.
    pub fn debit(&mut self, member: &MemberId, amount: Decimal) {
        *self
            .balances
            .entry(member.clone())
            .or_insert(Decimal::ZERO) -= amount;
    }

    /// Add to a member's balance only if the member is already tracked.
    /// Contributions from members outside the roster are dropped.
    pub fn credit_tracked(&mut self, member: &MemberId, amount: Decimal) {
        if let Some(balance) = self.balances.get_mut(member) {
            *balance += amount;
        }
    }

    /// Subtract from a member's balance only if the member is already tracked.
    pub fn debit_tracked(&mut self, member: &MemberId, amount: Decimal) {
        if let Some(balance) = self.balances.get_mut(member) {
            *balance -= amount;
        }
    }

    /// The net balance of a member; zero if untracked.
    pub fn balance(&self, member: &MemberId) -> Decimal {
        self.balances.get(member).copied().unwrap_or(Decimal::ZERO)
    }

    /// All entries in member order.
    pub fn iter(&self) -> impl Iterator<Item = (&MemberId, Decimal)> {
        self.balances.iter().map(|(m, &b)| (m, b))
    }

    /// All tracked members in order.
    pub fn members(&self) -> impl Iterator<Item = &MemberId> {
        self.balances.keys()
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Verify conservation: the sum of all balances is exactly zero.
    ///
    /// Holds for any closed set of expenses referencing only tracked
    /// members; money credited to payers always equals money debited
    /// from beneficiaries.
    pub fn is_balanced(&self) -> bool {
        self.balances.values().sum::<Decimal>() == Decimal::ZERO
    }

    /// Sum of positive balances — the total that needs to change hands
    /// to settle the map (equal to the sum of debtor magnitudes when
    /// the map is balanced).
    pub fn total_owed(&self) -> Decimal {
        self.balances
            .values()
            .filter(|v| **v > Decimal::ZERO)
            .sum()
    }

    /// Pointwise sum of several balance maps into a new one.
    ///
    /// Used for global clearing: each group's map is computed
    /// independently, then merged so one settlement plan can clear a
    /// member's debts across all groups. Members absent from a map
    /// default to zero. Pure fold; the inputs are not touched.
    pub fn merged<'a>(maps: impl IntoIterator<Item = &'a BalanceMap>) -> BalanceMap {
        maps.into_iter().fold(BalanceMap::new(), |mut acc, map| {
            for (member, balance) in map.iter() {
                acc.credit(member, balance);
            }
            acc
        })
    }
}

impl FromIterator<(MemberId, Decimal)> for BalanceMap {
    fn from_iter<T: IntoIterator<Item = (MemberId, Decimal)>>(iter: T) -> Self {
        Self {
            balances: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_balance_basic() {
        let mut map = BalanceMap::new();
        let alice = MemberId::new("alice");
        let bob = MemberId::new("bob");

        map.credit(&alice, dec!(100));
        map.debit(&bob, dec!(100));

        assert_eq!(map.balance(&alice), dec!(100));
        assert_eq!(map.balance(&bob), dec!(-100));
        assert!(map.is_balanced());
    }

    #[test]
    fn test_untracked_member_reads_zero() {
        let map = BalanceMap::new();
        assert_eq!(map.balance(&MemberId::new("nobody")), Decimal::ZERO);
    }

    #[test]
    fn test_tracked_mutation_drops_outsiders() {
        let alice = MemberId::new("alice");
        let mallory = MemberId::new("mallory");
        let mut map = BalanceMap::with_members([alice.clone()]);

        map.credit_tracked(&mallory, dec!(50));
        map.debit_tracked(&mallory, dec!(20));

        assert!(!map.contains(&mallory));
        assert_eq!(map.balance(&alice), Decimal::ZERO);
    }

    #[test]
    fn test_with_members_initializes_zero() {
        let map = BalanceMap::with_members([MemberId::new("a"), MemberId::new("b")]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.balance(&MemberId::new("a")), Decimal::ZERO);
        assert!(map.is_balanced());
    }

    #[test]
    fn test_total_owed_sums_creditors() {
        let mut map = BalanceMap::new();
        map.credit(&MemberId::new("a"), dec!(60));
        map.credit(&MemberId::new("b"), dec!(15));
        map.debit(&MemberId::new("c"), dec!(75));

        assert_eq!(map.total_owed(), dec!(75));
        assert!(map.is_balanced());
    }

    #[test]
    fn test_merged_pointwise_sum() {
        let alice = MemberId::new("alice");
        let bob = MemberId::new("bob");
        let carol = MemberId::new("carol");

        let mut lisbon = BalanceMap::new();
        lisbon.credit(&alice, dec!(50));
        lisbon.debit(&bob, dec!(50));

        let mut prague = BalanceMap::new();
        prague.debit(&alice, dec!(20));
        prague.credit(&carol, dec!(20));

        let global = BalanceMap::merged([&lisbon, &prague]);
        assert_eq!(global.balance(&alice), dec!(30));
        assert_eq!(global.balance(&bob), dec!(-50));
        assert_eq!(global.balance(&carol), dec!(20));
        assert!(global.is_balanced());

        // inputs untouched
        assert_eq!(lisbon.balance(&alice), dec!(50));
    }

    #[test]
    fn test_merged_of_nothing_is_empty() {
        let global = BalanceMap::merged([]);
        assert!(global.is_empty());
        assert!(global.is_balanced());
    }
}
