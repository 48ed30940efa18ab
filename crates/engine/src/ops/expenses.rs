use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};

use crate::{
    EngineError, Expense, Group, NewExpense, ResultEngine, expense_participants, expenses,
    settlement,
};

use super::{Engine, balances::increment_balance, groups::find_group, with_tx};

fn expense_not_found() -> EngineError {
    EngineError::KeyNotFound("expense not exists".to_string())
}

/// Payer and participants of an expense tagged with an existing group must
/// be on that group's roster.
fn ensure_roster_members(group: &Group, expense: &Expense) -> ResultEngine<()> {
    if !group.is_member(&expense.paid_by) {
        return Err(EngineError::InvalidParticipants(format!(
            "payer {} is not a member of group {}",
            expense.paid_by, group.id
        )));
    }
    if let Some(stranger) = expense.participants.iter().find(|p| !group.is_member(p)) {
        return Err(EngineError::InvalidParticipants(format!(
            "participant {stranger} is not a member of group {}",
            group.id
        )));
    }
    Ok(())
}

async fn participants_by_expense<C: ConnectionTrait>(
    db: &C,
    expense_ids: Vec<String>,
) -> ResultEngine<HashMap<String, Vec<String>>> {
    let mut participants: HashMap<String, Vec<String>> = HashMap::new();
    for row in expense_participants::Entity::find()
        .filter(expense_participants::Column::ExpenseId.is_in(expense_ids))
        .order_by_asc(expense_participants::Column::Position)
        .all(db)
        .await?
    {
        participants
            .entry(row.expense_id)
            .or_default()
            .push(row.username);
    }
    Ok(participants)
}

async fn attach_participants<C: ConnectionTrait>(
    db: &C,
    models: Vec<expenses::Model>,
) -> ResultEngine<Vec<Expense>> {
    let ids = models.iter().map(|m| m.id.clone()).collect();
    let mut participants = participants_by_expense(db, ids).await?;
    models
        .into_iter()
        .map(|model| {
            let list = participants.remove(&model.id).unwrap_or_default();
            Expense::try_from((model, list))
        })
        .collect()
}

/// All expenses tagged with `group_id`, oldest first.
pub(super) async fn group_expenses<C: ConnectionTrait>(
    db: &C,
    group_id: &str,
) -> ResultEngine<Vec<Expense>> {
    let models = expenses::Entity::find()
        .filter(expenses::Column::GroupId.eq(group_id))
        .order_by_asc(expenses::Column::CreatedAt)
        .order_by_asc(expenses::Column::Id)
        .all(db)
        .await?;
    attach_participants(db, models).await
}

impl Engine {
    /// Records an expense in the ledger and posts its contribution to the
    /// running totals.
    ///
    /// Validation happens before anything is written. The ledger row, its
    /// participants and every balance increment share one transaction.
    pub async fn record_expense(&self, new: NewExpense) -> ResultEngine<Expense> {
        let expense = Expense::new(new)?;
        tracing::info!(
            expense_id = %expense.id,
            group_id = %expense.group_id,
            amount = expense.amount,
            "recording expense"
        );

        with_tx!(self, |db_tx| {
            if let Some(group) = find_group(&db_tx, &expense.group_id).await? {
                ensure_roster_members(&group, &expense)?;
            }
            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;
            expense_participants::Entity::insert_many(expense.participant_models())
                .exec(&db_tx)
                .await?;
            self.post_contribution(&db_tx, &expense.id.to_string())
                .await?;
            Ok(expense)
        })
    }

    /// Posts the contribution of an already recorded expense.
    ///
    /// Returns `false` without touching any balance when the contribution
    /// was already posted, so re-running it for the same expense is safe.
    pub async fn apply_contribution(&self, expense_id: &str) -> ResultEngine<bool> {
        with_tx!(self, |db_tx| {
            let applied = self.post_contribution(&db_tx, expense_id).await?;
            Ok(applied)
        })
    }

    async fn post_contribution(
        &self,
        db_tx: &DatabaseTransaction,
        expense_id: &str,
    ) -> ResultEngine<bool> {
        let model = expenses::Entity::find_by_id(expense_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(expense_not_found)?;
        if model.contribution_applied {
            tracing::debug!(expense_id, "contribution already applied");
            return Ok(false);
        }

        let participants = participants_by_expense(db_tx, vec![model.id.clone()])
            .await?
            .remove(&model.id)
            .unwrap_or_default();
        let deltas = settlement::contribution_deltas(model.amount, &model.paid_by, &participants)?;

        let now = Utc::now();
        for delta in &deltas {
            increment_balance(db_tx, &delta.username, delta.delta, now).await?;
            tracing::debug!(
                expense_id,
                username = %delta.username,
                delta = delta.delta,
                "balance updated"
            );
        }

        expenses::ActiveModel {
            id: ActiveValue::Set(model.id),
            contribution_applied: ActiveValue::Set(true),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .update(db_tx)
        .await?;

        Ok(true)
    }

    /// Returns one expense.
    pub async fn expense(&self, expense_id: &str) -> ResultEngine<Expense> {
        let model = expenses::Entity::find_by_id(expense_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(expense_not_found)?;
        attach_participants(&self.database, vec![model])
            .await?
            .pop()
            .ok_or_else(expense_not_found)
    }

    /// Lists the expenses tagged with `group_id`, oldest first.
    ///
    /// The group itself does not need to exist.
    pub async fn list_group_expenses(&self, group_id: &str) -> ResultEngine<Vec<Expense>> {
        group_expenses(&self.database, group_id).await
    }

    /// Deletes an expense from the ledger.
    ///
    /// The running totals keep whatever the expense contributed.
    pub async fn delete_expense(&self, expense_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            expenses::Entity::find_by_id(expense_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(expense_not_found)?;

            expense_participants::Entity::delete_many()
                .filter(expense_participants::Column::ExpenseId.eq(expense_id))
                .exec(&db_tx)
                .await?;
            expenses::Entity::delete_by_id(expense_id.to_string())
                .exec(&db_tx)
                .await?;
            tracing::info!(expense_id, "expense deleted");
            Ok(())
        })
    }
}
