//! Expense ledger and balance settlement.
//!
//! [`Engine`] records expenses, keeps the username-keyed running totals up
//! to date and recomputes group balances on demand. The arithmetic lives in
//! [`settlement`] and does not touch the database.

pub use error::EngineError;
pub use expenses::{DEFAULT_GROUP_ID, Expense, NewExpense};
pub use groups::Group;
pub use ops::{Engine, EngineBuilder};
pub use settlement::{BalanceDelta, Balances};
pub use user_balances::BalanceEntry;

pub mod settlement;

mod error;
mod expense_participants;
mod expenses;
mod group_participants;
mod groups;
mod ops;
mod user_balances;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
