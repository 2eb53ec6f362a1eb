use crate::core::balance::BalanceMap;
use crate::core::member::MemberId;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single directed payment instruction: `from` pays `to` `amount`
/// in the base unit. The amount is always strictly positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementOperation {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Decimal,
}

impl std::fmt::Display for SettlementOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}: {}", self.from, self.to, self.amount)
    }
}

/// The ordered list of payments that settles a balance map.
///
/// Applying every operation (credit `to`, debit `from`) drives each
/// member's balance to exactly zero. The plan is deterministic for a
/// given input; see [`SettlementPlanner::plan`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettlementPlan {
    operations: Vec<SettlementOperation>,
}

impl SettlementPlan {
    pub fn operations(&self) -> &[SettlementOperation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Total amount changing hands across all operations.
    pub fn total_transferred(&self) -> Decimal {
        self.operations.iter().map(|op| op.amount).sum()
    }

    /// Verify that applying this plan to `balances` zeroes every member.
    pub fn settles(&self, balances: &BalanceMap) -> bool {
        let mut remaining = balances.clone();
        for op in &self.operations {
            remaining.debit(&op.to, op.amount);
            remaining.credit(&op.from, op.amount);
        }
        let settled = remaining.iter().all(|(_, b)| b == Decimal::ZERO);
        settled
    }
}

impl std::fmt::Display for SettlementPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Settlement Plan ===")?;
        writeln!(f, "Operations:        {}", self.len())?;
        writeln!(f, "Total Transferred: {}", self.total_transferred())?;
        for op in &self.operations {
            writeln!(f, "  {}", op)?;
        }
        Ok(())
    }
}

/// Produces a settlement plan from a balance map.
///
/// Greedy largest-first matching: the biggest debtor always pays the
/// biggest creditor next. This settles in at most
/// `creditors + debtors - 1` operations but does not chase the
/// theoretical minimum operation count, which is a harder combinatorial
/// problem.
pub struct SettlementPlanner;

impl SettlementPlanner {
    /// Compute the payments that settle `balances`.
    ///
    /// # Algorithm
    ///
    /// 1. Partition members into creditors (balance > 0) and debtors
    ///    (balance < 0, kept as positive owed magnitude). Members at
    ///    zero are already settled and drop out.
    /// 2. If either side is empty there is nothing to settle.
    /// 3. Sort both sides by amount descending, ties broken by member
    ///    ID ascending, so identical input always yields the same plan.
    /// 4. Repeatedly transfer `min(debtor_remaining, creditor_remaining)`
    ///    between the current largest debtor and creditor, advancing
    ///    past whichever side reaches exactly zero.
    ///
    /// With balances at a fixed decimal scale the zero test is exact,
    /// so the loop always terminates with both sides exhausted.
    pub fn plan(balances: &BalanceMap) -> SettlementPlan {
        let mut creditors: Vec<(MemberId, Decimal)> = Vec::new();
        let mut debtors: Vec<(MemberId, Decimal)> = Vec::new();

        for (member, balance) in balances.iter() {
            if balance > Decimal::ZERO {
                creditors.push((member.clone(), balance));
            } else if balance < Decimal::ZERO {
                debtors.push((member.clone(), -balance));
            }
        }

        if creditors.is_empty() || debtors.is_empty() {
            return SettlementPlan::default();
        }

        // Largest amounts first; member ID keeps equal amounts stable.
        creditors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        debtors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        debug!(
            "planning settlement: {} creditors, {} debtors",
            creditors.len(),
            debtors.len()
        );

        let mut operations = Vec::new();
        let mut i = 0;
        let mut j = 0;

        while i < debtors.len() && j < creditors.len() {
            let pay = debtors[i].1.min(creditors[j].1);
            if pay > Decimal::ZERO {
                operations.push(SettlementOperation {
                    from: debtors[i].0.clone(),
                    to: creditors[j].0.clone(),
                    amount: pay,
                });
            }

            debtors[i].1 -= pay;
            creditors[j].1 -= pay;

            if debtors[i].1 == Decimal::ZERO {
                i += 1;
            }
            if creditors[j].1 == Decimal::ZERO {
                j += 1;
            }
        }

        SettlementPlan { operations }
    }
}
