use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, users};

use super::{Engine, with_tx};

impl Engine {
    /// `true` when a user matches both credentials exactly.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<bool> {
        if username.is_empty() || password.is_empty() {
            return Ok(false);
        }
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .filter(users::Column::Password.eq(password))
            .one(&self.database)
            .await?;
        Ok(user.is_some())
    }

    /// Registers a new user. Fails with `ExistingKey` when the username is
    /// taken.
    pub async fn create_user(&self, username: &str, password: &str) -> ResultEngine<String> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(EngineError::InvalidField(
                "username and password are required".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(username.to_string())
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(username.to_string()));
            }
            users::ActiveModel {
                username: ActiveValue::Set(username.to_string()),
                password: ActiveValue::Set(password.to_string()),
            }
            .insert(&db_tx)
            .await?;
            tracing::info!(username, "user registered");
            Ok(username.to_string())
        })
    }

    /// Creates a user, or resets its password when it already exists.
    pub async fn upsert_user(&self, username: &str, password: &str) -> ResultEngine<()> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(EngineError::InvalidField(
                "username and password are required".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let active = users::ActiveModel {
                username: ActiveValue::Set(username.to_string()),
                password: ActiveValue::Set(password.to_string()),
            };
            match users::Entity::find_by_id(username.to_string())
                .one(&db_tx)
                .await?
            {
                Some(_) => {
                    active.update(&db_tx).await?;
                }
                None => {
                    active.insert(&db_tx).await?;
                }
            }
            Ok(())
        })
    }
}
