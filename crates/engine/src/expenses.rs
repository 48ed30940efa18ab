//! Expense ledger primitives.
//!
//! An `Expense` records who paid how much for whom. Recording one posts its
//! contribution to the running totals exactly once; deleting it never takes
//! that contribution back.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, expense_participants, settlement};

/// Group tag used when an expense is recorded without one.
pub const DEFAULT_GROUP_ID: &str = "default";

/// Input of [`Engine::record_expense`](crate::Engine::record_expense).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub group_id: Option<String>,
    pub description: String,
    pub amount: f64,
    pub paid_by: String,
    pub participants: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
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

impl Expense {
    /// Validate and normalize a new expense. Nothing is persisted here.
    pub fn new(new: NewExpense) -> ResultEngine<Self> {
        let group_id = new
            .group_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_GROUP_ID)
            .to_string();
        let description = required_text(&new.description, "description")?;
        let paid_by = required_text(&new.paid_by, "paidBy")?;
        settlement::validate_amount(new.amount)?;

        if new.participants.is_empty() {
            return Err(EngineError::InvalidParticipants(
                "participants must not be empty".to_string(),
            ));
        }
        let participants = new
            .participants
            .iter()
            .map(|p| {
                let p = p.trim();
                if p.is_empty() {
                    Err(EngineError::InvalidParticipants(
                        "participant name must not be empty".to_string(),
                    ))
                } else {
                    Ok(p.to_string())
                }
            })
            .collect::<ResultEngine<Vec<_>>>()?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            group_id,
            description,
            amount: new.amount,
            paid_by,
            participants,
            created_at: now,
            updated_at: now,
        })
    }

    /// Participant rows, one per listed participant, keeping the list order.
    pub(crate) fn participant_models(&self) -> Vec<expense_participants::ActiveModel> {
        self.participants
            .iter()
            .enumerate()
            .map(|(position, username)| expense_participants::ActiveModel {
                expense_id: ActiveValue::Set(self.id.to_string()),
                position: ActiveValue::Set(position as i32),
                username: ActiveValue::Set(username.clone()),
            })
            .collect()
    }
}

fn required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidField(format!("{label} is required")));
    }
    Ok(trimmed.to_string())
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub group_id: String,
    pub description: String,
    pub amount: f64,
    pub paid_by: String,
    pub contribution_applied: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::expense_participants::Entity")]
    ExpenseParticipants,
}

impl Related<super::expense_participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseParticipants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            group_id: ActiveValue::Set(expense.group_id.clone()),
            description: ActiveValue::Set(expense.description.clone()),
            amount: ActiveValue::Set(expense.amount),
            paid_by: ActiveValue::Set(expense.paid_by.clone()),
            contribution_applied: ActiveValue::Set(false),
            created_at: ActiveValue::Set(expense.created_at),
            updated_at: ActiveValue::Set(expense.updated_at),
        }
    }
}

impl TryFrom<(Model, Vec<String>)> for Expense {
    type Error = EngineError;

    fn try_from((model, participants): (Model, Vec<String>)) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("expense not exists".to_string()))?,
            group_id: model.group_id,
            description: model.description,
            amount: model.amount,
            paid_by: model.paid_by,
            participants,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
