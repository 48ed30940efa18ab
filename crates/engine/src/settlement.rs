//! Balance settlement.
//!
//! Two independent ways of turning expenses into signed balances:
//!
//! - [`contribution_deltas`]: the incremental rule applied once per recorded
//!   expense to the running totals. The share is `amount / participants`.
//! - [`group_balances`]: the full recomputation of a group from its roster
//!   and its expenses. The share is `amount / roster`, and every roster
//!   member other than the payer is charged, whatever the expense's own
//!   participant list says.
//!
//! The two rules use different divisors and scopes, so the running totals
//! and a group recomputation can disagree. Balances are plain `f64` without
//! rounding: totals may drift by floating point error.
//!
//! A positive balance means the participant is owed money, a negative one
//! means they owe.

use std::collections::BTreeMap;

use crate::{EngineError, Expense, ResultEngine};

/// Net balance per participant.
pub type Balances = BTreeMap<String, f64>;

/// A signed change to one participant's running balance.
#[derive(Clone, Debug, PartialEq)]
pub struct BalanceDelta {
    pub username: String,
    pub delta: f64,
}

/// Reject amounts that would poison stored balances with NaN or infinity.
pub fn validate_amount(amount: f64) -> ResultEngine<()> {
    if !amount.is_finite() {
        return Err(EngineError::InvalidAmount(
            "amount must be a number".to_string(),
        ));
    }
    if amount <= 0.0 {
        return Err(EngineError::InvalidAmount("amount must be > 0".to_string()));
    }
    Ok(())
}

/// Deltas posted to the running totals for one expense.
///
/// The payer, when listed, gets `amount - share`; every other listed
/// participant gets `-share`. A name listed twice is posted twice. A payer
/// missing from `participants` receives nothing.
pub fn contribution_deltas(
    amount: f64,
    paid_by: &str,
    participants: &[String],
) -> ResultEngine<Vec<BalanceDelta>> {
    validate_amount(amount)?;
    if participants.is_empty() {
        return Err(EngineError::InvalidParticipants(
            "participants must not be empty".to_string(),
        ));
    }

    let share = amount / participants.len() as f64;
    Ok(participants
        .iter()
        .map(|participant| BalanceDelta {
            username: participant.clone(),
            delta: if participant == paid_by {
                amount - share
            } else {
                -share
            },
        })
        .collect())
}

/// Recompute a group's balances from scratch.
///
/// Every roster member starts at zero. A payer outside the roster gets an
/// entry of its own so the credit is not lost. An empty roster yields an
/// empty map.
pub fn group_balances<'a, I>(roster: &[String], expenses: I) -> Balances
where
    I: IntoIterator<Item = &'a Expense>,
{
    let mut balances: Balances = roster.iter().map(|p| (p.clone(), 0.0)).collect();
    if roster.is_empty() {
        return balances;
    }

    let members = roster.len() as f64;
    for expense in expenses {
        let share = expense.amount / members;
        *balances.entry(expense.paid_by.clone()).or_insert(0.0) += expense.amount - share;
        for participant in roster.iter().filter(|p| **p != expense.paid_by) {
            if let Some(balance) = balances.get_mut(participant) {
                *balance -= share;
            }
        }
    }

    balances
}
