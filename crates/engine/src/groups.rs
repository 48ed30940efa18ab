//! A `Group` owns the roster: the authoritative, ordered list of the people
//! who share its expenses.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, group_participants};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub participants: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Group {
    /// Build a new group, trimming the name and every roster entry.
    ///
    /// The roster is an ordered set: it must not be empty and must not
    /// repeat a name.
    pub fn new(name: &str, participants: &[String]) -> ResultEngine<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidField(
                "group name must not be empty".to_string(),
            ));
        }
        if participants.is_empty() {
            return Err(EngineError::InvalidParticipants(
                "group roster must not be empty".to_string(),
            ));
        }

        let mut roster: Vec<String> = Vec::with_capacity(participants.len());
        for participant in participants {
            let participant = participant.trim();
            if participant.is_empty() {
                return Err(EngineError::InvalidParticipants(
                    "participant name must not be empty".to_string(),
                ));
            }
            if roster.iter().any(|p| p == participant) {
                return Err(EngineError::ExistingKey(participant.to_string()));
            }
            roster.push(participant.to_string());
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            participants: roster,
            created_at: Utc::now(),
        })
    }

    pub fn is_member(&self, username: &str) -> bool {
        self.participants.iter().any(|p| p == username)
    }

    /// Roster rows, one per participant, keeping the roster order.
    pub(crate) fn roster_models(&self) -> Vec<group_participants::ActiveModel> {
        self.participants
            .iter()
            .enumerate()
            .map(|(position, username)| group_participants::ActiveModel {
                group_id: ActiveValue::Set(self.id.to_string()),
                position: ActiveValue::Set(position as i32),
                username: ActiveValue::Set(username.clone()),
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::group_participants::Entity")]
    GroupParticipants,
}

impl Related<super::group_participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GroupParticipants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Group> for ActiveModel {
    fn from(value: &Group) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<(Model, Vec<String>)> for Group {
    type Error = EngineError;

    fn try_from((model, participants): (Model, Vec<String>)) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("group not exists".to_string()))?,
            name: model.name,
            participants,
            created_at: model.created_at,
        })
    }
}
