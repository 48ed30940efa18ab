//! Request and response bodies of the HTTP API.
//!
//! Field names are camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpenseNew {
        /// Defaults to `"default"` when missing or blank.
        pub group_id: Option<String>,
        pub description: String,
        pub amount: f64,
        pub paid_by: String,
        pub participants: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Expense {
        pub id: Uuid,
        pub group_id: String,
        pub description: String,
        pub amount: f64,
        pub paid_by: String,
        pub participants: Vec<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseDeleted {
        pub message: String,
    }
}

pub mod group {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
        pub participants: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Group {
        pub id: Uuid,
        pub name: String,
        /// The roster, in the order it was given.
        pub participants: Vec<String>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod balance {
    use std::collections::BTreeMap;

    use super::*;

    /// Participant to net balance. Positive means owed, negative means owes.
    pub type GroupBalances = BTreeMap<String, f64>;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RunningBalance {
        pub username: String,
        pub balance: f64,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub username: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserCreated {
        pub username: String,
    }
}

pub mod health {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Health {
        pub connected: bool,
        pub database: String,
    }
}

#[cfg(test)]
mod tests {
    use super::expense::ExpenseNew;

    #[test]
    fn expense_new_reads_camel_case() {
        let body = r#"{"description":"Dinner","amount":12.5,"paidBy":"John","participants":["John","Jane"]}"#;
        let parsed: ExpenseNew = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.group_id, None);
        assert_eq!(parsed.paid_by, "John");
        assert_eq!(parsed.amount, 12.5);
    }

    #[test]
    fn expense_new_rejects_text_amount() {
        let body = r#"{"description":"Dinner","amount":"lots","paidBy":"John","participants":[]}"#;
        assert!(serde_json::from_str::<ExpenseNew>(body).is_err());
    }
}
