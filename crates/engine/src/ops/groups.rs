use std::collections::HashMap;

use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{EngineError, Group, ResultEngine, group_participants, groups};

use super::{Engine, with_tx};

/// Load a group and its roster, `None` when no group has this id.
pub(super) async fn find_group<C: ConnectionTrait>(
    db: &C,
    group_id: &str,
) -> ResultEngine<Option<Group>> {
    let Some(model) = groups::Entity::find_by_id(group_id.to_string())
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let roster = group_participants::Entity::find()
        .filter(group_participants::Column::GroupId.eq(group_id))
        .order_by_asc(group_participants::Column::Position)
        .all(db)
        .await?
        .into_iter()
        .map(|row| row.username)
        .collect();

    Group::try_from((model, roster)).map(Some)
}

impl Engine {
    /// Creates a group with its roster.
    pub async fn create_group(&self, name: &str, participants: &[String]) -> ResultEngine<Group> {
        let group = Group::new(name, participants)?;
        with_tx!(self, |db_tx| {
            groups::ActiveModel::from(&group).insert(&db_tx).await?;
            group_participants::Entity::insert_many(group.roster_models())
                .exec(&db_tx)
                .await?;
            Ok(group)
        })
    }

    /// Returns a group and its roster.
    pub async fn group(&self, group_id: &str) -> ResultEngine<Group> {
        find_group(&self.database, group_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("group not exists".to_string()))
    }

    /// Lists every group, oldest first.
    pub async fn list_groups(&self) -> ResultEngine<Vec<Group>> {
        let models = groups::Entity::find()
            .order_by_asc(groups::Column::CreatedAt)
            .order_by_asc(groups::Column::Id)
            .all(&self.database)
            .await?;

        let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
        let mut rosters: HashMap<String, Vec<String>> = HashMap::new();
        for row in group_participants::Entity::find()
            .filter(group_participants::Column::GroupId.is_in(ids))
            .order_by_asc(group_participants::Column::Position)
            .all(&self.database)
            .await?
        {
            rosters.entry(row.group_id).or_default().push(row.username);
        }

        models
            .into_iter()
            .map(|model| {
                let roster = rosters.remove(&model.id).unwrap_or_default();
                Group::try_from((model, roster))
            })
            .collect()
    }
}
