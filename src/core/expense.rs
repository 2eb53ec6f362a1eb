use crate::core::currency::{CurrencyCode, CurrencyRate};
use crate::core::member::MemberId;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// A single shared expense within a group.
///
/// Records that `paid_by` spent `amount` in `currency` on behalf of the
/// `beneficiaries`. The currency carries its resolved rate to the base
/// unit, so an expense is self-contained for balance computation.
///
/// Expenses are immutable once created. An empty beneficiary set is legal
/// and makes the expense contribute nothing to any balance.
///
/// # Examples
///
/// ```
/// use expense_clearing::core::currency::{CurrencyCode, CurrencyRate};
/// use expense_clearing::core::expense::Expense;
/// use expense_clearing::core::member::MemberId;
/// use rust_decimal_macros::dec;
///
/// let dinner = Expense::new(
///     MemberId::new("alice"),
///     dec!(100.00),
///     CurrencyRate::new(CurrencyCode::new("EUR"), dec!(1.0)),
///     [MemberId::new("alice"), MemberId::new("bob")],
/// );
///
/// assert_eq!(dinner.amount_in_base(), dec!(100.00));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier for this expense.
    id: Uuid,
    /// The member who fronted the money.
    paid_by: MemberId,
    /// The amount spent, in `currency`. Must be positive.
    amount: Decimal,
    /// The currency of denomination with its resolved rate.
    currency: CurrencyRate,
    /// The members who shared in the benefit and owe a proportional share.
    beneficiaries: BTreeSet<MemberId>,
    /// The day the expense occurred.
    date: Option<NaiveDate>,
    /// Free-form description ("dinner at the harbor").
    description: Option<String>,
    /// When this record was created.
    created_at: DateTime<Utc>,
}

impl Expense {
    /// Create a new expense.
    ///
    /// # Panics
    ///
    /// Panics if `amount` is not positive.
    pub fn new(
        paid_by: MemberId,
        amount: Decimal,
        currency: CurrencyRate,
        beneficiaries: impl IntoIterator<Item = MemberId>,
    ) -> Self {
        assert!(
            amount > Decimal::ZERO,
            "Expense amount must be positive, got {}",
            amount
        );
        Self {
            id: Uuid::new_v4(),
            paid_by,
            amount,
            currency,
            beneficiaries: beneficiaries.into_iter().collect(),
            date: None,
            description: None,
            created_at: Utc::now(),
        }
    }

    /// Create an expense with a specific ID (useful for testing / determinism).
    pub fn with_id(
        id: Uuid,
        paid_by: MemberId,
        amount: Decimal,
        currency: CurrencyRate,
        beneficiaries: impl IntoIterator<Item = MemberId>,
    ) -> Self {
        assert!(amount > Decimal::ZERO);
        Self {
            id,
            paid_by,
            amount,
            currency,
            beneficiaries: beneficiaries.into_iter().collect(),
            date: None,
            description: None,
            created_at: Utc::now(),
        }
    }

    /// Set the expense date.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Set a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn paid_by(&self) -> &MemberId {
        &self.paid_by
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &CurrencyRate {
        &self.currency
    }

    pub fn beneficiaries(&self) -> &BTreeSet<MemberId> {
        &self.beneficiaries
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The amount converted to the base unit at the expense's rate.
    pub fn amount_in_base(&self) -> Decimal {
        self.currency.to_base(self.amount)
    }
}

/// An ordered collection of expenses, typically one group's history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseSet {
    expenses: Vec<Expense>,
}

impl ExpenseSet {
    pub fn new() -> Self {
        Self {
            expenses: Vec::new(),
        }
    }

    pub fn add(&mut self, expense: Expense) {
        self.expenses.push(expense);
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    /// Total spend converted to the base unit.
    pub fn gross_total_base(&self) -> Decimal {
        self.expenses.iter().map(|e| e.amount_in_base()).sum()
    }

    /// All unique members referenced as payer or beneficiary.
    pub fn members(&self) -> Vec<MemberId> {
        let mut members: Vec<MemberId> = self
            .expenses
            .iter()
            .flat_map(|e| {
                std::iter::once(e.paid_by().clone()).chain(e.beneficiaries().iter().cloned())
            })
            .collect();
        members.sort();
        members.dedup();
        members
    }

    /// All unique currency codes referenced in this set.
    pub fn currencies(&self) -> Vec<CurrencyCode> {
        let mut currencies: Vec<CurrencyCode> = self
            .expenses
            .iter()
            .map(|e| e.currency().code.clone())
            .collect();
        currencies.sort();
        currencies.dedup();
        currencies
    }
}

impl FromIterator<Expense> for ExpenseSet {
    fn from_iter<T: IntoIterator<Item = Expense>>(iter: T) -> Self {
        Self {
            expenses: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn eur() -> CurrencyRate {
        CurrencyRate::new(CurrencyCode::new("EUR"), dec!(1.0))
    }

    fn sample_expense() -> Expense {
        Expense::new(
            MemberId::new("alice"),
            dec!(100.00),
            eur(),
            [MemberId::new("alice"), MemberId::new("bob")],
        )
    }

    #[test]
    fn test_expense_creation() {
        let e = sample_expense();
        assert_eq!(e.paid_by().as_str(), "alice");
        assert_eq!(e.amount(), dec!(100.00));
        assert_eq!(e.currency().code.as_str(), "EUR");
        assert_eq!(e.beneficiaries().len(), 2);
    }

    #[test]
    #[should_panic(expected = "must be positive")]
    fn test_expense_zero_amount() {
        Expense::new(MemberId::new("alice"), Decimal::ZERO, eur(), []);
    }

    #[test]
    #[should_panic(expected = "must be positive")]
    fn test_expense_negative_amount() {
        Expense::new(MemberId::new("alice"), dec!(-5), eur(), []);
    }

    #[test]
    fn test_amount_in_base_applies_rate() {
        let e = Expense::new(
            MemberId::new("alice"),
            dec!(250),
            CurrencyRate::new(CurrencyCode::new("CZK"), dec!(0.0405)),
            [MemberId::new("bob")],
        );
        // 250 * 0.0405 = 10.125 -> 10.12 (banker's rounding at scale 2)
        assert_eq!(e.amount_in_base(), dec!(10.12));
    }

    #[test]
    fn test_empty_beneficiaries_is_legal() {
        let e = Expense::new(MemberId::new("alice"), dec!(10), eur(), []);
        assert!(e.beneficiaries().is_empty());
    }

    #[test]
    fn test_expense_set_totals() {
        let mut set = ExpenseSet::new();
        set.add(Expense::new(
            MemberId::new("alice"),
            dec!(100),
            eur(),
            [MemberId::new("bob")],
        ));
        set.add(Expense::new(
            MemberId::new("bob"),
            dec!(40),
            eur(),
            [MemberId::new("alice")],
        ));
        assert_eq!(set.gross_total_base(), dec!(140.00));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_expense_set_members() {
        let mut set = ExpenseSet::new();
        set.add(sample_expense());
        set.add(Expense::new(
            MemberId::new("carol"),
            dec!(20),
            eur(),
            [MemberId::new("bob")],
        ));
        let members = set.members();
        assert_eq!(members.len(), 3);
    }
}
