use crate::domain;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// DTO for a returned collaborative list on the API
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, PartialEq, Eq, Debug))]
pub struct ListData {
    #[schema(example = 3)]
    pub id: i32,
    #[schema(example = "Groceries")]
    pub name: String,
    #[schema(example = 4)]
    pub owner: i32,
    /// Additional member profiles; never contains the owner
    pub members: Vec<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<domain::list::CollaborativeList> for ListData {
    fn from(value: domain::list::CollaborativeList) -> Self {
        ListData {
            id: value.id,
            name: value.name,
            owner: value.owner_profile_id,
            members: value.member_profile_ids,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// DTO for creating a new collaborative list via the API
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct NewList {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

impl From<NewList> for domain::list::NewList {
    fn from(value: NewList) -> Self {
        domain::list::NewList { name: value.name }
    }
}

/// DTO for a newly created list
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct InsertedList {
    #[schema(example = 7)]
    pub id: i32,
}

/// DTO naming the account to add to a list's membership
#[derive(Deserialize, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct AddMember {
    #[schema(example = "carol")]
    pub username: String,
}

/// DTO confirming a membership addition
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct AddedMember {
    #[schema(example = 9)]
    pub profile_id: i32,
}
