//! # expense-clearing
//!
//! Shared-expense clearing engine for groups.
//!
//! Given a group's expenses (each with a payer, an amount, a currency, and
//! a set of beneficiaries), this engine converts multi-currency spending
//! into a common base unit of account, computes each member's net balance,
//! and produces a small set of peer-to-peer payments that settles all
//! outstanding balances.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: members, currencies and rates, expenses, balances
//! - **clearing** — Balance calculation, settlement planning, summary reporting
//! - **simulation** — Random group generation for stress testing

pub mod clearing;
pub mod core;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::clearing::balances::BalanceCalculator;
    pub use crate::clearing::settlement::{SettlementOperation, SettlementPlan, SettlementPlanner};
    pub use crate::core::balance::BalanceMap;
    pub use crate::core::currency::{CurrencyCode, CurrencyRate, RateTable};
    pub use crate::core::expense::{Expense, ExpenseSet};
    pub use crate::core::group::Group;
    pub use crate::core::member::MemberId;
}
