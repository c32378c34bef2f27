use crate::domain::list::CollaborativeList;
use crate::domain::task::{Task, TaskOrigin};
use thiserror::Error;

/// Raised when a profile tries to mutate an entity it has no rights over
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("the requesting profile does not have rights to this entity")]
pub struct PermissionDenied;

/// A personal task may only be modified by its owner. A collaborative task may
/// only be modified by its creator; list membership alone is not enough.
pub fn can_modify_task(task: &Task, profile_id: i32) -> bool {
    match task.origin {
        TaskOrigin::Personal { owner } => owner == profile_id,
        TaskOrigin::Collaborative { .. } => task.created_by == profile_id,
    }
}

pub fn ensure_can_modify_task(task: &Task, profile_id: i32) -> Result<(), PermissionDenied> {
    if can_modify_task(task, profile_id) {
        Ok(())
    } else {
        Err(PermissionDenied)
    }
}

/// A list is readable by its owner and by every member. The owner is stored
/// outside the member set, so both fields must be consulted.
pub fn can_access_list(list: &CollaborativeList, profile_id: i32) -> bool {
    list.owner_profile_id == profile_id || list.member_profile_ids.contains(&profile_id)
}

/// Membership mutation is owner-only
pub fn ensure_owns_list(list: &CollaborativeList, profile_id: i32) -> Result<(), PermissionDenied> {
    if list.owner_profile_id == profile_id {
        Ok(())
    } else {
        Err(PermissionDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::list;
    use crate::domain::task;

    mod can_modify_task {
        use super::*;

        #[test]
        fn personal_task_is_owner_only() {
            let owned_task = task::test_util::personal_task(1, 10);

            assert!(can_modify_task(&owned_task, 10));
            assert!(!can_modify_task(&owned_task, 11));
        }

        #[test]
        fn collaborative_task_is_creator_only() {
            // Created by profile 10 inside list 3
            let list_task = task::test_util::collaborative_task(1, 3, 10);

            assert!(can_modify_task(&list_task, 10));
            // Another member of the list still can't touch it
            assert!(!can_modify_task(&list_task, 11));
        }

        #[test]
        fn ensure_variant_raises_permission_denied() {
            let owned_task = task::test_util::personal_task(1, 10);

            assert_eq!(ensure_can_modify_task(&owned_task, 10), Ok(()));
            assert_eq!(ensure_can_modify_task(&owned_task, 99), Err(PermissionDenied));
        }
    }

    mod can_access_list {
        use super::*;

        #[test]
        fn owner_and_members_have_access() {
            let shared_list = list::test_util::list_with_members(5, 10, &[11, 12]);

            assert!(can_access_list(&shared_list, 10));
            assert!(can_access_list(&shared_list, 11));
            assert!(can_access_list(&shared_list, 12));
        }

        #[test]
        fn outsiders_have_no_access() {
            let shared_list = list::test_util::list_with_members(5, 10, &[11]);

            assert!(!can_access_list(&shared_list, 42));
        }

        #[test]
        fn owner_with_empty_member_set_still_has_access() {
            let solo_list = list::test_util::list_with_members(5, 10, &[]);

            assert!(can_access_list(&solo_list, 10));
        }
    }

    mod ensure_owns_list {
        use super::*;

        #[test]
        fn members_cannot_manage_membership() {
            let shared_list = list::test_util::list_with_members(5, 10, &[11]);

            assert_eq!(ensure_owns_list(&shared_list, 10), Ok(()));
            assert_eq!(ensure_owns_list(&shared_list, 11), Err(PermissionDenied));
        }
    }
}
