use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, prelude::*, sea_query::Expr,
};

use crate::{BalanceEntry, Balances, EngineError, ResultEngine, settlement, user_balances};

use super::{Engine, expenses::group_expenses, groups::find_group};

/// Adds `delta` to a running total inside the store, creating the row at
/// zero first when the username has none yet.
///
/// The addition is a single `UPDATE ... SET balance = balance + ?`, so two
/// expenses touching the same username serialize on the row instead of
/// overwriting each other.
pub(super) async fn increment_balance(
    db: &DatabaseTransaction,
    username: &str,
    delta: f64,
    now: DateTime<Utc>,
) -> ResultEngine<()> {
    let updated = user_balances::Entity::update_many()
        .col_expr(
            user_balances::Column::Balance,
            Expr::col(user_balances::Column::Balance).add(delta),
        )
        .col_expr(user_balances::Column::UpdatedAt, Expr::value(now))
        .filter(user_balances::Column::Username.eq(username))
        .exec(db)
        .await?;

    if updated.rows_affected == 0 {
        user_balances::ActiveModel {
            username: ActiveValue::Set(username.to_string()),
            balance: ActiveValue::Set(delta),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(db)
        .await?;
    }

    Ok(())
}

impl Engine {
    /// Recomputes a group's balances from its roster and every expense
    /// tagged with it.
    ///
    /// Nothing is read from or written to the running totals.
    pub async fn group_balances(&self, group_id: &str) -> ResultEngine<Balances> {
        let group = find_group(&self.database, group_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("group not exists".to_string()))?;
        let expenses = group_expenses(&self.database, group_id).await?;

        Ok(settlement::group_balances(&group.participants, &expenses))
    }

    /// Returns the running totals of every username, across all groups.
    pub async fn running_balances(&self) -> ResultEngine<Vec<BalanceEntry>> {
        Ok(user_balances::Entity::find()
            .order_by_asc(user_balances::Column::Username)
            .all(&self.database)
            .await?
            .into_iter()
            .map(BalanceEntry::from)
            .collect())
    }

    /// Returns the running total of one username, `None` when nothing was
    /// ever posted for it.
    pub async fn running_balance(&self, username: &str) -> ResultEngine<Option<BalanceEntry>> {
        Ok(user_balances::Entity::find_by_id(username.to_string())
            .one(&self.database)
            .await?
            .map(BalanceEntry::from))
    }
}
