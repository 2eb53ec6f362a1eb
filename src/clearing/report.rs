use crate::clearing::balances::BalanceCalculator;
use crate::clearing::settlement::{SettlementPlan, SettlementPlanner};
use crate::core::balance::BalanceMap;
use crate::core::currency::CurrencyCode;
use crate::core::group::Group;
use crate::core::member::MemberId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-member summary row: what they fronted and where they stand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRow {
    pub member: MemberId,
    /// Total this member paid out of pocket, in the base unit.
    pub total_paid: Decimal,
    /// Net position: positive = owed, negative = owes.
    pub net_balance: Decimal,
}

/// Spending recorded in one currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencySpend {
    pub currency: CurrencyCode,
    /// Gross spend in that currency, converted to the base unit.
    pub gross_base: Decimal,
    pub expense_count: usize,
}

/// Summary of a group's clearing state: how much was spent, how much
/// actually needs to change hands, and where each member stands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearingSummary {
    /// Total spend across all expenses, in the base unit.
    gross_spend: Decimal,
    /// Amount that must change hands to settle (sum of positive balances).
    to_move: Decimal,
    /// Number of payments in the settlement plan.
    operation_count: usize,
    /// Per-currency breakdown of the gross spend.
    currency_breakdown: HashMap<CurrencyCode, CurrencySpend>,
    /// One row per roster member, in member order.
    member_rows: Vec<MemberRow>,
}

impl ClearingSummary {
    /// Summarize a group: balances, settlement plan, and breakdowns.
    pub fn for_group(group: &Group) -> Self {
        let balances = BalanceCalculator::for_group(group);
        let plan = SettlementPlanner::plan(&balances);
        Self::build(group, &balances, &plan)
    }

    fn build(group: &Group, balances: &BalanceMap, plan: &SettlementPlan) -> Self {
        let mut currency_breakdown: HashMap<CurrencyCode, CurrencySpend> = HashMap::new();
        for expense in group.expenses().expenses() {
            let entry = currency_breakdown
                .entry(expense.currency().code.clone())
                .or_insert_with(|| CurrencySpend {
                    currency: expense.currency().code.clone(),
                    gross_base: Decimal::ZERO,
                    expense_count: 0,
                });
            entry.gross_base += expense.amount_in_base();
            entry.expense_count += 1;
        }

        let member_rows = group
            .members()
            .iter()
            .map(|member| MemberRow {
                member: member.clone(),
                total_paid: group.total_paid_by(member),
                net_balance: balances.balance(member),
            })
            .collect();

        Self {
            gross_spend: group.expenses().gross_total_base(),
            to_move: balances.total_owed(),
            operation_count: plan.len(),
            currency_breakdown,
            member_rows,
        }
    }

    pub fn gross_spend(&self) -> Decimal {
        self.gross_spend
    }

    pub fn to_move(&self) -> Decimal {
        self.to_move
    }

    pub fn operation_count(&self) -> usize {
        self.operation_count
    }

    pub fn currency_breakdown(&self) -> &HashMap<CurrencyCode, CurrencySpend> {
        &self.currency_breakdown
    }

    pub fn member_rows(&self) -> &[MemberRow] {
        &self.member_rows
    }

    /// Fraction of the gross spend that still has to change hands.
    /// Zero when everyone already paid exactly their own share.
    pub fn transfer_ratio(&self) -> f64 {
        if self.gross_spend == Decimal::ZERO {
            return 0.0;
        }
        let ratio = self.to_move / self.gross_spend;
        ratio.to_string().parse::<f64>().unwrap_or(0.0)
    }
}

impl std::fmt::Display for ClearingSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Clearing Summary ===")?;
        writeln!(f, "Gross Spend:   {}", self.gross_spend)?;
        writeln!(f, "To Move:       {}", self.to_move)?;
        writeln!(f, "Operations:    {}", self.operation_count)?;
        writeln!(f, "Transfer %:    {:.1}%", self.transfer_ratio() * 100.0)?;

        let mut currencies: Vec<&CurrencySpend> = self.currency_breakdown.values().collect();
        currencies.sort_by(|a, b| a.currency.cmp(&b.currency));
        for spend in currencies {
            writeln!(
                f,
                "\n--- {} ---\n  Spend:    {}\n  Expenses: {}",
                spend.currency, spend.gross_base, spend.expense_count
            )?;
        }

        writeln!(f, "\nMembers:")?;
        for row in &self.member_rows {
            writeln!(
                f,
                "  {:<15} paid {:>10}   net {:>10}",
                row.member.to_string(),
                row.total_paid.to_string(),
                row.net_balance.to_string()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;

    fn sample_group() -> Group {
        let mut group = Group::new(
            "lisbon trip",
            [MemberId::new("alice"), MemberId::new("bob")],
        );
        group.set_rate(CurrencyCode::new("EUR"), dec!(1.0)).unwrap();
        group.set_rate(CurrencyCode::new("USD"), dec!(0.92)).unwrap();
        group
            .add_expense(
                MemberId::new("alice"),
                dec!(100.00),
                &CurrencyCode::new("EUR"),
                [MemberId::new("alice"), MemberId::new("bob")],
            )
            .unwrap();
        group
            .add_expense(
                MemberId::new("bob"),
                dec!(50.00),
                &CurrencyCode::new("USD"),
                [MemberId::new("alice"), MemberId::new("bob")],
            )
            .unwrap();
        group
    }

    #[test]
    fn test_summary_totals() {
        let summary = ClearingSummary::for_group(&sample_group());

        // 100.00 EUR + 46.00 (50 USD @ 0.92)
        assert_eq!(summary.gross_spend(), dec!(146.00));
        // alice: +100 - 50 - 23 = +27; bob: +46 - 50 - 23 = -27
        assert_eq!(summary.to_move(), dec!(27.00));
        assert_eq!(summary.operation_count(), 1);
    }

    #[test]
    fn test_currency_breakdown() {
        let summary = ClearingSummary::for_group(&sample_group());
        let eur = &summary.currency_breakdown()[&CurrencyCode::new("EUR")];
        assert_eq!(eur.gross_base, dec!(100.00));
        assert_eq!(eur.expense_count, 1);

        let usd = &summary.currency_breakdown()[&CurrencyCode::new("USD")];
        assert_eq!(usd.gross_base, dec!(46.00));
    }

    #[test]
    fn test_member_rows_in_member_order() {
        let summary = ClearingSummary::for_group(&sample_group());
        let rows = summary.member_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].member, MemberId::new("alice"));
        assert_eq!(rows[0].total_paid, dec!(100.00));
        assert_eq!(rows[0].net_balance, dec!(27.00));
        assert_eq!(rows[1].net_balance, dec!(-27.00));
    }

    #[test]
    fn test_transfer_ratio() {
        let summary = ClearingSummary::for_group(&sample_group());
        assert_relative_eq!(
            summary.transfer_ratio(),
            27.0 / 146.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_empty_group_summary() {
        let group = Group::new("empty", [MemberId::new("alice")]);
        let summary = ClearingSummary::for_group(&group);
        assert_eq!(summary.gross_spend(), Decimal::ZERO);
        assert_eq!(summary.transfer_ratio(), 0.0);
        assert_eq!(summary.operation_count(), 0);
    }
}
