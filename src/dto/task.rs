use crate::domain;
use crate::domain::task::TaskOrigin;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Task priority as it appears on the wire
#[derive(Serialize, Deserialize, Clone, Copy, ToSchema)]
#[cfg_attr(test, derive(PartialEq, Eq, Debug))]
pub enum Priority {
    High,
    Mid,
    Low,
}

impl From<domain::task::Priority> for Priority {
    fn from(value: domain::task::Priority) -> Self {
        match value {
            domain::task::Priority::High => Priority::High,
            domain::task::Priority::Mid => Priority::Mid,
            domain::task::Priority::Low => Priority::Low,
        }
    }
}

impl From<Priority> for domain::task::Priority {
    fn from(value: Priority) -> Self {
        match value {
            Priority::High => domain::task::Priority::High,
            Priority::Mid => domain::task::Priority::Mid,
            Priority::Low => domain::task::Priority::Low,
        }
    }
}

/// Task progress state as it appears on the wire
#[derive(Serialize, Deserialize, Clone, Copy, ToSchema)]
#[cfg_attr(test, derive(PartialEq, Eq, Debug))]
pub enum Status {
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl From<domain::task::Status> for Status {
    fn from(value: domain::task::Status) -> Self {
        match value {
            domain::task::Status::NotStarted => Status::NotStarted,
            domain::task::Status::InProgress => Status::InProgress,
            domain::task::Status::Completed => Status::Completed,
        }
    }
}

impl From<Status> for domain::task::Status {
    fn from(value: Status) -> Self {
        match value {
            Status::NotStarted => domain::task::Status::NotStarted,
            Status::InProgress => domain::task::Status::InProgress,
            Status::Completed => domain::task::Status::Completed,
        }
    }
}

/// DTO for a returned task on the API. Exactly one of `owner` and `list` is
/// populated, matching the task's origin.
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, PartialEq, Eq, Debug))]
pub struct TaskData {
    #[schema(example = 10)]
    pub id: i32,
    #[schema(example = "Buy milk")]
    pub title: String,
    pub description: Option<String>,
    pub due_datetime: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub status: Status,
    #[schema(example = 4)]
    pub created_by: i32,
    /// Owning profile, present only on personal tasks
    pub owner: Option<i32>,
    /// Containing list, present only on collaborative tasks
    pub list: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<domain::task::Task> for TaskData {
    fn from(value: domain::task::Task) -> Self {
        let (owner, list) = match value.origin {
            TaskOrigin::Personal { owner } => (Some(owner), None),
            TaskOrigin::Collaborative { list } => (None, Some(list)),
        };

        TaskData {
            id: value.id,
            title: value.title,
            description: value.description,
            due_datetime: value.due_at,
            priority: value.priority.into(),
            status: value.status.into(),
            created_by: value.created_by,
            owner,
            list,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// DTO for creating a new task via the API
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct NewTask {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    pub due_datetime: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    /// Target collaborative list; omit to create a personal task
    pub list: Option<i32>,
}

impl From<NewTask> for domain::task::NewTask {
    fn from(value: NewTask) -> Self {
        domain::task::NewTask {
            title: value.title,
            description: value.description,
            due_at: value.due_datetime,
            priority: value.priority.map(Into::into).unwrap_or_default(),
            status: value.status.map(Into::into).unwrap_or_default(),
        }
    }
}

/// DTO for patching a task's content via the API. Absent fields are left
/// unchanged.
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct UpdateTask {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    /// An explicit `null` clears the stored description; omitting the key
    /// leaves it unchanged
    #[serde(default, deserialize_with = "present_field")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    /// An explicit `null` clears the stored due date; omitting the key leaves
    /// it unchanged
    #[serde(default, deserialize_with = "present_field")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub due_datetime: Option<Option<DateTime<Utc>>>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
}

/// Keeps "key absent" distinguishable from "key set to null" on PATCH bodies.
/// Absent keys fall back to the outer `None` via `#[serde(default)]`, while a
/// present key (null included) lands in `Some`.
fn present_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

impl From<UpdateTask> for domain::task::UpdateTask {
    fn from(value: UpdateTask) -> Self {
        domain::task::UpdateTask {
            title: value.title,
            description: value.description,
            due_at: value.due_datetime,
            priority: value.priority.map(Into::into),
            status: value.status.map(Into::into),
        }
    }
}

/// DTO for a newly created task
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct InsertedTask {
    #[schema(example = 5)]
    pub id: i32,
}
