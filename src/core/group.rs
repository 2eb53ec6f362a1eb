use crate::core::currency::{CurrencyCode, RateError, RateTable};
use crate::core::expense::{Expense, ExpenseSet};
use crate::core::member::MemberId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A group of people sharing expenses — a trip, a flat, an event.
///
/// Carries the member roster, the group's own currency rate table, and
/// the expense history. The roster defines whose balances are tracked:
/// expenses referencing members outside it still convert and split, but
/// the outsiders' contributions are dropped by the balance calculation.
///
/// # Examples
///
/// ```
/// use expense_clearing::prelude::*;
/// use rust_decimal_macros::dec;
///
/// let mut group = Group::new("lisbon trip", [MemberId::new("alice"), MemberId::new("bob")]);
/// group.set_rate(CurrencyCode::new("EUR"), dec!(1.0)).unwrap();
/// group
///     .add_expense(
///         MemberId::new("alice"),
///         dec!(100.00),
///         &CurrencyCode::new("EUR"),
///         [MemberId::new("alice"), MemberId::new("bob")],
///     )
///     .unwrap();
///
/// assert_eq!(group.expenses().len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    name: String,
    members: BTreeSet<MemberId>,
    rates: RateTable,
    expenses: ExpenseSet,
}

impl Group {
    /// Create a group with the given roster and an empty rate table.
    pub fn new(name: impl Into<String>, members: impl IntoIterator<Item = MemberId>) -> Self {
        Self {
            name: name.into(),
            members: members.into_iter().collect(),
            rates: RateTable::new(),
            expenses: ExpenseSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &BTreeSet<MemberId> {
        &self.members
    }

    pub fn is_member(&self, member: &MemberId) -> bool {
        self.members.contains(member)
    }

    /// Add a member to the roster. Idempotent.
    pub fn add_member(&mut self, member: MemberId) {
        self.members.insert(member);
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Register a currency rate for this group.
    pub fn set_rate(&mut self, code: CurrencyCode, rate_to_base: Decimal) -> Result<(), RateError> {
        self.rates.set_rate(code, rate_to_base)
    }

    pub fn expenses(&self) -> &ExpenseSet {
        &self.expenses
    }

    /// Record an expense, resolving the currency against this group's
    /// rate table. Fails if the code is not registered.
    pub fn add_expense(
        &mut self,
        paid_by: MemberId,
        amount: Decimal,
        currency: &CurrencyCode,
        beneficiaries: impl IntoIterator<Item = MemberId>,
    ) -> Result<(), RateError> {
        let rate = self.rates.resolve(currency)?;
        self.expenses
            .add(Expense::new(paid_by, amount, rate, beneficiaries));
        Ok(())
    }

    /// Record an already-built expense (rate resolved elsewhere).
    pub fn push_expense(&mut self, expense: Expense) {
        self.expenses.add(expense);
    }

    /// Total this member has fronted across the group's history,
    /// converted to the base unit.
    pub fn total_paid_by(&self, member: &MemberId) -> Decimal {
        self.expenses
            .expenses()
            .iter()
            .filter(|e| e.paid_by() == member)
            .map(|e| e.amount_in_base())
            .sum()
    }
}
