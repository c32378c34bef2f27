use crate::domain::DeletedRows;
use crate::domain::access;
use crate::domain::list::driven_ports::ListReader;
use crate::domain::task::driven_ports::{TaskReader, TaskWriter};
use crate::domain::task::driving_ports::{
    CreateTaskError, ModifyTaskError, RestoreTaskError, TaskDetailError,
};
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    High,
    #[default]
    Mid,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

/// Raised when a stored priority or status string doesn't match any known value
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized value: {0}")]
pub struct UnrecognizedValue(pub String);

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Mid => "Mid",
            Priority::Low => "Low",
        }
    }
}

impl FromStr for Priority {
    type Err = UnrecognizedValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "High" => Ok(Priority::High),
            "Mid" => Ok(Priority::Mid),
            "Low" => Ok(Priority::Low),
            other => Err(UnrecognizedValue(other.to_owned())),
        }
    }
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::NotStarted => "Not Started",
            Status::InProgress => "In Progress",
            Status::Completed => "Completed",
        }
    }
}

impl FromStr for Status {
    type Err = UnrecognizedValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Not Started" => Ok(Status::NotStarted),
            "In Progress" => Ok(Status::InProgress),
            "Completed" => Ok(Status::Completed),
            other => Err(UnrecognizedValue(other.to_owned())),
        }
    }
}

/// Where a task lives. Every task is either personal or collaborative; the enum
/// makes "both" and "neither" unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOrigin {
    Personal { owner: i32 },
    Collaborative { list: i32 },
}

#[derive(PartialEq, Eq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub status: Status,
    /// Profile that created the task. Immutable after creation.
    pub created_by: i32,
    pub origin: TaskOrigin,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied task content; origin and creator wiring comes from a [TaskSeed]
#[cfg_attr(test, derive(Clone, Debug))]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub status: Status,
}

/// Patch for task content. Outer `None` fields are left untouched; for the
/// nullable fields an inner `None` clears the stored value. Origin and creator
/// are not patchable.
#[cfg_attr(test, derive(Clone, Debug, PartialEq))]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub due_at: Option<Option<DateTime<Utc>>>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
}

/// The ownership wiring of a task about to be created, decided by this module
/// and merged with user-supplied content by the persistence layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSeed {
    pub created_by: i32,
    pub origin: TaskOrigin,
}

/// Seed for a task owned directly by the creating profile
pub fn personal_seed(profile_id: i32) -> TaskSeed {
    TaskSeed {
        created_by: profile_id,
        origin: TaskOrigin::Personal { owner: profile_id },
    }
}

pub mod driven_ports {
    use super::*;

    pub trait TaskReader {
        async fn personal_tasks(
            &self,
            owner_profile_id: i32,
            deleted: DeletedRows,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Task>, anyhow::Error>;

        async fn tasks_in_lists(
            &self,
            list_ids: &[i32],
            deleted: DeletedRows,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Task>, anyhow::Error>;

        async fn task_by_id(
            &self,
            task_id: i32,
            deleted: DeletedRows,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Task>, anyhow::Error>;
    }

    pub trait TaskWriter {
        async fn create(
            &self,
            content: &NewTask,
            seed: TaskSeed,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<i32, anyhow::Error>;

        async fn update(
            &self,
            task_id: i32,
            update: &UpdateTask,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;

        /// Sets the deletion marker if it isn't set already; a second call must
        /// leave the original deletion timestamp in place
        async fn mark_deleted(
            &self,
            task_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;

        async fn clear_deleted(
            &self,
            task_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum CreateTaskError {
        /// The referenced list id doesn't resolve; a validation failure, since
        /// the id came from the request body
        #[error("the specified list does not exist")]
        ListDoesNotExist,
        #[error("the requesting profile cannot create tasks in that list")]
        ListNotAccessible,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    #[derive(Debug, Error)]
    pub enum TaskDetailError {
        #[error("no accessible task matches the given id")]
        NotFound,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    #[derive(Debug, Error)]
    pub enum ModifyTaskError {
        #[error("no accessible task matches the given id")]
        NotFound,
        #[error("the requesting profile cannot modify this task")]
        PermissionDenied,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    impl From<TaskDetailError> for ModifyTaskError {
        fn from(value: TaskDetailError) -> Self {
            match value {
                TaskDetailError::NotFound => ModifyTaskError::NotFound,
                TaskDetailError::PortError(err) => ModifyTaskError::PortError(err),
            }
        }
    }

    impl From<access::PermissionDenied> for ModifyTaskError {
        fn from(_: access::PermissionDenied) -> Self {
            ModifyTaskError::PermissionDenied
        }
    }

    #[derive(Debug, Error)]
    pub enum RestoreTaskError {
        /// No task with that id exists at all, deleted or otherwise
        #[error("no task matches the given id")]
        NotFound,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }


    pub trait TaskPort {
        /// Creates a task from user-supplied content, wiring its origin from the
        /// optional list id: present means collaborative, absent means personal
        async fn create_task(
            &self,
            profile_id: i32,
            new_task: &NewTask,
            in_list: Option<i32>,
            ext_cxn: &mut impl ExternalConnectivity,
            list_read: &impl crate::domain::list::driven_ports::ListReader,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<i32, CreateTaskError>;

        async fn personal_tasks(
            &self,
            profile_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskReader,
        ) -> Result<Vec<Task>, anyhow::Error>;

        /// Tasks from every list accessible to the profile, optionally narrowed
        /// to a single list. Narrowing to an inaccessible list yields an empty
        /// result rather than an error.
        async fn collaborative_tasks(
            &self,
            profile_id: i32,
            narrowed_list: Option<i32>,
            ext_cxn: &mut impl ExternalConnectivity,
            list_read: &impl crate::domain::list::driven_ports::ListReader,
            task_read: &impl driven_ports::TaskReader,
        ) -> Result<Vec<Task>, anyhow::Error>;

        /// Resolution set for single-task operations: the union of the profile's
        /// personal tasks and tasks in its accessible lists
        async fn task_for_detail(
            &self,
            task_id: i32,
            profile_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            list_read: &impl crate::domain::list::driven_ports::ListReader,
            task_read: &impl driven_ports::TaskReader,
        ) -> Result<Task, TaskDetailError>;

        async fn update_task(
            &self,
            task_id: i32,
            profile_id: i32,
            update: &UpdateTask,
            ext_cxn: &mut impl ExternalConnectivity,
            list_read: &impl crate::domain::list::driven_ports::ListReader,
            task_read: &impl driven_ports::TaskReader,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<(), ModifyTaskError>;

        /// Unprivileged soft delete. Idempotent: deleting an already-deleted
        /// task succeeds without changing anything. User-initiated deletion must
        /// resolve the task and pass an ownership check before calling this.
        async fn delete(
            &self,
            task_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<(), anyhow::Error>;

        /// Resolves, ownership-checks and soft-deletes in one step on behalf of
        /// the requesting profile
        async fn delete_task(
            &self,
            task_id: i32,
            profile_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            list_read: &impl crate::domain::list::driven_ports::ListReader,
            task_read: &impl driven_ports::TaskReader,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<(), ModifyTaskError>;

        /// Clears the deletion marker. Performs no access check itself; callers
        /// doing a user-scoped restore chain an ownership check on the returned
        /// task before exposing any of its data.
        async fn restore_task(
            &self,
            task_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskReader,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<Task, RestoreTaskError>;
    }
}

/// Seed for a task created inside a collaborative list. Fails if the list does
/// not resolve or the creating profile is neither its owner nor a member.
pub async fn collaborative_seed(
    list_id: i32,
    profile_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    list_read: &impl ListReader,
) -> Result<TaskSeed, CreateTaskError> {
    let maybe_list = list_read
        .list_by_id(list_id, DeletedRows::Exclude, &mut *ext_cxn)
        .await
        .context("resolving a list for task creation")?;
    let Some(list) = maybe_list else {
        return Err(CreateTaskError::ListDoesNotExist);
    };

    if !access::can_access_list(&list, profile_id) {
        return Err(CreateTaskError::ListNotAccessible);
    }

    Ok(TaskSeed {
        created_by: profile_id,
        origin: TaskOrigin::Collaborative { list: list.id },
    })
}

pub struct TaskService {}

impl driving_ports::TaskPort for TaskService {
    async fn create_task(
        &self,
        profile_id: i32,
        new_task: &NewTask,
        in_list: Option<i32>,
        ext_cxn: &mut impl ExternalConnectivity,
        list_read: &impl ListReader,
        task_write: &impl TaskWriter,
    ) -> Result<i32, CreateTaskError> {
        let seed = match in_list {
            Some(list_id) => {
                collaborative_seed(list_id, profile_id, &mut *ext_cxn, list_read).await?
            }
            None => personal_seed(profile_id),
        };

        let created_task_id = task_write
            .create(new_task, seed, &mut *ext_cxn)
            .await
            .context("persisting a new task")?;
        Ok(created_task_id)
    }

    async fn personal_tasks(
        &self,
        profile_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl TaskReader,
    ) -> Result<Vec<Task>, anyhow::Error> {
        task_read
            .personal_tasks(profile_id, DeletedRows::Exclude, &mut *ext_cxn)
            .await
            .context("fetching personal tasks")
    }

    async fn collaborative_tasks(
        &self,
        profile_id: i32,
        narrowed_list: Option<i32>,
        ext_cxn: &mut impl ExternalConnectivity,
        list_read: &impl ListReader,
        task_read: &impl TaskReader,
    ) -> Result<Vec<Task>, anyhow::Error> {
        let accessible_lists = list_read
            .accessible_to(profile_id, DeletedRows::Exclude, &mut *ext_cxn)
            .await
            .context("resolving accessible lists for task enumeration")?;

        // Narrowing re-verifies accessibility so a caller can't read arbitrary
        // lists by guessing ids. An inaccessible narrow target filters to
        // nothing instead of surfacing an error.
        let list_ids: Vec<i32> = match narrowed_list {
            Some(wanted_id) => {
                if accessible_lists.iter().any(|list| list.id == wanted_id) {
                    vec![wanted_id]
                } else {
                    return Ok(Vec::new());
                }
            }
            None => accessible_lists.iter().map(|list| list.id).collect(),
        };

        task_read
            .tasks_in_lists(&list_ids, DeletedRows::Exclude, &mut *ext_cxn)
            .await
            .context("fetching tasks in accessible lists")
    }

    async fn task_for_detail(
        &self,
        task_id: i32,
        profile_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        list_read: &impl ListReader,
        task_read: &impl TaskReader,
    ) -> Result<Task, TaskDetailError> {
        let maybe_task = task_read
            .task_by_id(task_id, DeletedRows::Exclude, &mut *ext_cxn)
            .await
            .context("resolving a task for detail access")?;
        let Some(task) = maybe_task else {
            return Err(TaskDetailError::NotFound);
        };

        let visible = match task.origin {
            TaskOrigin::Personal { owner } => owner == profile_id,
            TaskOrigin::Collaborative { list } => {
                let maybe_list = list_read
                    .list_by_id(list, DeletedRows::Exclude, &mut *ext_cxn)
                    .await
                    .context("resolving a task's list for detail access")?;
                maybe_list
                    .map(|task_list| access::can_access_list(&task_list, profile_id))
                    .unwrap_or(false)
            }
        };

        if visible {
            Ok(task)
        } else {
            // Invisible and nonexistent tasks are indistinguishable to callers
            Err(TaskDetailError::NotFound)
        }
    }

    async fn update_task(
        &self,
        task_id: i32,
        profile_id: i32,
        update: &UpdateTask,
        ext_cxn: &mut impl ExternalConnectivity,
        list_read: &impl ListReader,
        task_read: &impl TaskReader,
        task_write: &impl TaskWriter,
    ) -> Result<(), ModifyTaskError> {
        let task = self
            .task_for_detail(task_id, profile_id, &mut *ext_cxn, list_read, task_read)
            .await?;
        access::ensure_can_modify_task(&task, profile_id)?;

        task_write
            .update(task.id, update, &mut *ext_cxn)
            .await
            .context("updating a task")?;
        Ok(())
    }

    async fn delete(
        &self,
        task_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        task_write: &impl TaskWriter,
    ) -> Result<(), anyhow::Error> {
        task_write
            .mark_deleted(task_id, &mut *ext_cxn)
            .await
            .context("soft-deleting a task")?;
        Ok(())
    }

    async fn delete_task(
        &self,
        task_id: i32,
        profile_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        list_read: &impl ListReader,
        task_read: &impl TaskReader,
        task_write: &impl TaskWriter,
    ) -> Result<(), ModifyTaskError> {
        let task = self
            .task_for_detail(task_id, profile_id, &mut *ext_cxn, list_read, task_read)
            .await?;
        access::ensure_can_modify_task(&task, profile_id)?;

        self.delete(task.id, &mut *ext_cxn, task_write).await?;
        Ok(())
    }

    async fn restore_task(
        &self,
        task_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl TaskReader,
        task_write: &impl TaskWriter,
    ) -> Result<Task, RestoreTaskError> {
        let maybe_task = task_read
            .task_by_id(task_id, DeletedRows::Include, &mut *ext_cxn)
            .await
            .context("resolving a task for restoration")?;
        let Some(task) = maybe_task else {
            return Err(RestoreTaskError::NotFound);
        };

        task_write
            .clear_deleted(task.id, &mut *ext_cxn)
            .await
            .context("restoring a soft-deleted task")?;

        Ok(Task {
            deleted_at: None,
            ..task
        })
    }
}


#[cfg(test)]
pub mod test_util {
    use super::*;
    use crate::domain::test_util::{Connectivity, FakeImplementation};
    use std::sync::{Mutex, RwLock};

    pub fn new_task_titled(title: &str) -> NewTask {
        NewTask {
            title: title.to_owned(),
            description: None,
            due_at: None,
            priority: Priority::Mid,
            status: Status::NotStarted,
        }
    }

    pub fn personal_task(id: i32, owner: i32) -> Task {
        Task {
            id,
            title: format!("Task {id}"),
            description: None,
            due_at: None,
            priority: Priority::Mid,
            status: Status::NotStarted,
            created_by: owner,
            origin: TaskOrigin::Personal { owner },
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn collaborative_task(id: i32, list: i32, creator: i32) -> Task {
        Task {
            id,
            title: format!("Task {id}"),
            description: None,
            due_at: None,
            priority: Priority::Mid,
            status: Status::NotStarted,
            created_by: creator,
            origin: TaskOrigin::Collaborative { list },
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub struct InMemoryTaskPersistence {
        pub tasks: Vec<Task>,
        pub connected: Connectivity,
        highest_task_id: i32,
    }

    pub struct NewTaskWithSeed {
        pub seed: TaskSeed,
        pub task: NewTask,
    }

    impl InMemoryTaskPersistence {
        pub fn new() -> InMemoryTaskPersistence {
            InMemoryTaskPersistence {
                tasks: Vec::new(),
                connected: Connectivity::Connected,
                highest_task_id: 0,
            }
        }

        pub fn new_with_tasks(tasks: &[NewTaskWithSeed]) -> InMemoryTaskPersistence {
            InMemoryTaskPersistence {
                tasks: tasks
                    .iter()
                    .enumerate()
                    .map(|(index, seeded_task)| {
                        task_from_create(index as i32 + 1, &seeded_task.task, seeded_task.seed)
                    })
                    .collect(),
                connected: Connectivity::Connected,
                highest_task_id: tasks.len() as i32,
            }
        }

        pub fn new_locked() -> RwLock<InMemoryTaskPersistence> {
            RwLock::new(Self::new())
        }
    }

    pub fn task_from_create(task_id: i32, new_task: &NewTask, seed: TaskSeed) -> Task {
        Task {
            id: task_id,
            title: new_task.title.clone(),
            description: new_task.description.clone(),
            due_at: new_task.due_at,
            priority: new_task.priority,
            status: new_task.status,
            created_by: seed.created_by,
            origin: seed.origin,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn row_visible(task: &Task, deleted: DeletedRows) -> bool {
        match deleted {
            DeletedRows::Exclude => task.deleted_at.is_none(),
            DeletedRows::Include => true,
        }
    }

    impl driven_ports::TaskReader for RwLock<InMemoryTaskPersistence> {
        async fn personal_tasks(
            &self,
            owner_profile_id: i32,
            deleted: DeletedRows,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Task>, anyhow::Error> {
            let persistence = self.read().expect("task persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            Ok(persistence
                .tasks
                .iter()
                .filter(|task| {
                    row_visible(task, deleted)
                        && matches!(task.origin, TaskOrigin::Personal { owner } if owner == owner_profile_id)
                })
                .cloned()
                .collect())
        }

        async fn tasks_in_lists(
            &self,
            list_ids: &[i32],
            deleted: DeletedRows,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Task>, anyhow::Error> {
            let persistence = self.read().expect("task persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            Ok(persistence
                .tasks
                .iter()
                .filter(|task| {
                    row_visible(task, deleted)
                        && matches!(task.origin, TaskOrigin::Collaborative { list } if list_ids.contains(&list))
                })
                .cloned()
                .collect())
        }

        async fn task_by_id(
            &self,
            task_id: i32,
            deleted: DeletedRows,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Task>, anyhow::Error> {
            let persistence = self.read().expect("task persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            Ok(persistence
                .tasks
                .iter()
                .find(|task| task.id == task_id && row_visible(task, deleted))
                .cloned())
        }
    }

    impl driven_ports::TaskWriter for RwLock<InMemoryTaskPersistence> {
        async fn create(
            &self,
            content: &NewTask,
            seed: TaskSeed,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<i32, anyhow::Error> {
            let mut persistence = self.write().expect("task persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            persistence.highest_task_id += 1;
            let task_id = persistence.highest_task_id;
            let new_row = task_from_create(task_id, content, seed);
            persistence.tasks.push(new_row);
            Ok(task_id)
        }

        async fn update(
            &self,
            task_id: i32,
            update: &UpdateTask,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error> {
            let mut persistence = self.write().expect("task persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            if let Some(task) = persistence.tasks.iter_mut().find(|task| task.id == task_id) {
                if let Some(ref title) = update.title {
                    task.title = title.clone();
                }
                if let Some(ref description) = update.description {
                    task.description = description.clone();
                }
                if let Some(due_at) = update.due_at {
                    task.due_at = due_at;
                }
                if let Some(priority) = update.priority {
                    task.priority = priority;
                }
                if let Some(status) = update.status {
                    task.status = status;
                }
            }

            Ok(())
        }

        async fn mark_deleted(
            &self,
            task_id: i32,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error> {
            let mut persistence = self.write().expect("task persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            if let Some(task) = persistence.tasks.iter_mut().find(|task| task.id == task_id) {
                if task.deleted_at.is_none() {
                    task.deleted_at = Some(Utc::now());
                }
            }

            Ok(())
        }

        async fn clear_deleted(
            &self,
            task_id: i32,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error> {
            let mut persistence = self.write().expect("task persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            if let Some(task) = persistence.tasks.iter_mut().find(|task| task.id == task_id) {
                task.deleted_at = None;
            }

            Ok(())
        }
    }

    pub struct MockTaskService {
        pub create_task_result:
            FakeImplementation<(i32, NewTask, Option<i32>), Result<i32, driving_ports::CreateTaskError>>,
        pub personal_tasks_result: FakeImplementation<i32, Result<Vec<Task>, anyhow::Error>>,
        pub collaborative_tasks_result:
            FakeImplementation<(i32, Option<i32>), Result<Vec<Task>, anyhow::Error>>,
        pub task_for_detail_result:
            FakeImplementation<(i32, i32), Result<Task, driving_ports::TaskDetailError>>,
        pub update_task_result:
            FakeImplementation<(i32, i32, UpdateTask), Result<(), driving_ports::ModifyTaskError>>,
        pub delete_result: FakeImplementation<i32, Result<(), anyhow::Error>>,
        pub delete_task_result:
            FakeImplementation<(i32, i32), Result<(), driving_ports::ModifyTaskError>>,
        pub restore_task_result:
            FakeImplementation<i32, Result<Task, driving_ports::RestoreTaskError>>,
    }

    impl MockTaskService {
        pub fn new() -> MockTaskService {
            MockTaskService {
                create_task_result: FakeImplementation::new(),
                personal_tasks_result: FakeImplementation::new(),
                collaborative_tasks_result: FakeImplementation::new(),
                task_for_detail_result: FakeImplementation::new(),
                update_task_result: FakeImplementation::new(),
                delete_result: FakeImplementation::new(),
                delete_task_result: FakeImplementation::new(),
                restore_task_result: FakeImplementation::new(),
            }
        }

        pub fn new_locked() -> Mutex<MockTaskService> {
            Mutex::new(Self::new())
        }
    }

    impl driving_ports::TaskPort for Mutex<MockTaskService> {
        async fn create_task(
            &self,
            profile_id: i32,
            new_task: &NewTask,
            in_list: Option<i32>,
            _ext_cxn: &mut impl ExternalConnectivity,
            _list_read: &impl crate::domain::list::driven_ports::ListReader,
            _task_write: &impl driven_ports::TaskWriter,
        ) -> Result<i32, driving_ports::CreateTaskError> {
            let mut locked_self = self.lock().expect("mock task service mutex poisoned");
            locked_self
                .create_task_result
                .save_arguments((profile_id, new_task.clone(), in_list));

            locked_self.create_task_result.return_value_result()
        }

        async fn personal_tasks(
            &self,
            profile_id: i32,
            _ext_cxn: &mut impl ExternalConnectivity,
            _task_read: &impl driven_ports::TaskReader,
        ) -> Result<Vec<Task>, anyhow::Error> {
            let mut locked_self = self.lock().expect("mock task service mutex poisoned");
            locked_self.personal_tasks_result.save_arguments(profile_id);

            locked_self.personal_tasks_result.return_value_anyhow()
        }

        async fn collaborative_tasks(
            &self,
            profile_id: i32,
            narrowed_list: Option<i32>,
            _ext_cxn: &mut impl ExternalConnectivity,
            _list_read: &impl crate::domain::list::driven_ports::ListReader,
            _task_read: &impl driven_ports::TaskReader,
        ) -> Result<Vec<Task>, anyhow::Error> {
            let mut locked_self = self.lock().expect("mock task service mutex poisoned");
            locked_self
                .collaborative_tasks_result
                .save_arguments((profile_id, narrowed_list));

            locked_self.collaborative_tasks_result.return_value_anyhow()
        }

        async fn task_for_detail(
            &self,
            task_id: i32,
            profile_id: i32,
            _ext_cxn: &mut impl ExternalConnectivity,
            _list_read: &impl crate::domain::list::driven_ports::ListReader,
            _task_read: &impl driven_ports::TaskReader,
        ) -> Result<Task, driving_ports::TaskDetailError> {
            let mut locked_self = self.lock().expect("mock task service mutex poisoned");
            locked_self
                .task_for_detail_result
                .save_arguments((task_id, profile_id));

            locked_self.task_for_detail_result.return_value_result()
        }

        async fn update_task(
            &self,
            task_id: i32,
            profile_id: i32,
            update: &UpdateTask,
            _ext_cxn: &mut impl ExternalConnectivity,
            _list_read: &impl crate::domain::list::driven_ports::ListReader,
            _task_read: &impl driven_ports::TaskReader,
            _task_write: &impl driven_ports::TaskWriter,
        ) -> Result<(), driving_ports::ModifyTaskError> {
            let mut locked_self = self.lock().expect("mock task service mutex poisoned");
            locked_self
                .update_task_result
                .save_arguments((task_id, profile_id, update.clone()));

            locked_self.update_task_result.return_value_result()
        }

        async fn delete(
            &self,
            task_id: i32,
            _ext_cxn: &mut impl ExternalConnectivity,
            _task_write: &impl driven_ports::TaskWriter,
        ) -> Result<(), anyhow::Error> {
            let mut locked_self = self.lock().expect("mock task service mutex poisoned");
            locked_self.delete_result.save_arguments(task_id);

            locked_self.delete_result.return_value_anyhow()
        }

        async fn delete_task(
            &self,
            task_id: i32,
            profile_id: i32,
            _ext_cxn: &mut impl ExternalConnectivity,
            _list_read: &impl crate::domain::list::driven_ports::ListReader,
            _task_read: &impl driven_ports::TaskReader,
            _task_write: &impl driven_ports::TaskWriter,
        ) -> Result<(), driving_ports::ModifyTaskError> {
            let mut locked_self = self.lock().expect("mock task service mutex poisoned");
            locked_self
                .delete_task_result
                .save_arguments((task_id, profile_id));

            locked_self.delete_task_result.return_value_result()
        }

        async fn restore_task(
            &self,
            task_id: i32,
            _ext_cxn: &mut impl ExternalConnectivity,
            _task_read: &impl driven_ports::TaskReader,
            _task_write: &impl driven_ports::TaskWriter,
        ) -> Result<Task, driving_ports::RestoreTaskError> {
            let mut locked_self = self.lock().expect("mock task service mutex poisoned");
            locked_self.restore_task_result.save_arguments(task_id);

            locked_self.restore_task_result.return_value_result()
        }
    }
}
