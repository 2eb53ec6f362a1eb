//! Foundational types for the clearing engine.

pub mod balance;
pub mod currency;
pub mod expense;
pub mod group;
pub mod member;
