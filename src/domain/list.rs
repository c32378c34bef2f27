use crate::domain;
use crate::domain::DeletedRows;
use crate::domain::access;
use crate::domain::list::driven_ports::{ListReader, ListWriter};
use crate::domain::list::driving_ports::{AddMemberError, DeleteListError};
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use chrono::{DateTime, Utc};

/// A named, shared container of tasks. The owner is tracked separately from the
/// "additional member" set and is never inserted into it.
#[derive(PartialEq, Eq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct CollaborativeList {
    pub id: i32,
    pub name: String,
    pub owner_profile_id: i32,
    pub member_profile_ids: Vec<i32>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg_attr(test, derive(Clone))]
pub struct NewList {
    pub name: String,
}

pub mod driven_ports {
    use super::*;

    pub trait ListReader {
        async fn accessible_to(
            &self,
            profile_id: i32,
            deleted: DeletedRows,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<CollaborativeList>, anyhow::Error>;

        async fn list_by_id(
            &self,
            list_id: i32,
            deleted: DeletedRows,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<CollaborativeList>, anyhow::Error>;
    }

    pub trait ListWriter {
        async fn create(
            &self,
            new_list: &NewList,
            owner_profile_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<i32, anyhow::Error>;

        /// Must be idempotent: inserting a profile that is already a member
        /// leaves the membership set unchanged
        async fn add_member(
            &self,
            list_id: i32,
            profile_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;

        async fn mark_deleted(
            &self,
            list_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum AddMemberError {
        /// Covers both "no such list" and "list not visible to the requester" so
        /// list existence never leaks to outsiders
        #[error("the specified list does not exist")]
        ListNotFound,
        #[error("only the list owner can add members")]
        NotOwner,
        #[error("a username must be provided")]
        UsernameRequired,
        #[error("no account exists with that username")]
        UserNotFound,
        #[error("the specified account does not have a profile")]
        UserHasNoProfile,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    #[derive(Debug, Error)]
    pub enum DeleteListError {
        #[error("the specified list does not exist")]
        ListNotFound,
        #[error("only the list owner can delete the list")]
        NotOwner,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    #[cfg(test)]
    mod error_clone {
        use super::*;
        use anyhow::anyhow;

        impl Clone for AddMemberError {
            fn clone(&self) -> Self {
                match self {
                    Self::ListNotFound => Self::ListNotFound,
                    Self::NotOwner => Self::NotOwner,
                    Self::UsernameRequired => Self::UsernameRequired,
                    Self::UserNotFound => Self::UserNotFound,
                    Self::UserHasNoProfile => Self::UserHasNoProfile,
                    Self::PortError(err) => Self::PortError(anyhow!(format!("{}", err))),
                }
            }
        }

        impl Clone for DeleteListError {
            fn clone(&self) -> Self {
                match self {
                    Self::ListNotFound => Self::ListNotFound,
                    Self::NotOwner => Self::NotOwner,
                    Self::PortError(err) => Self::PortError(anyhow!(format!("{}", err))),
                }
            }
        }
    }

    pub trait ListPort {
        /// Lists the requester owns plus lists they are a member of, deduplicated.
        /// Inaccessible lists are silently absent, never a permission failure.
        async fn accessible_lists(
            &self,
            profile_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            list_read: &impl driven_ports::ListReader,
        ) -> Result<Vec<CollaborativeList>, anyhow::Error>;

        async fn create_list(
            &self,
            profile_id: i32,
            new_list: &NewList,
            ext_cxn: &mut impl ExternalConnectivity,
            list_write: &impl driven_ports::ListWriter,
        ) -> Result<i32, anyhow::Error>;

        async fn add_member(
            &self,
            list_id: i32,
            username: &str,
            requester_profile_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            list_read: &impl driven_ports::ListReader,
            account_read: &impl domain::account::driven_ports::AccountReader,
            list_write: &impl driven_ports::ListWriter,
        ) -> Result<i32, AddMemberError>;

        async fn delete_list(
            &self,
            list_id: i32,
            requester_profile_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            list_read: &impl driven_ports::ListReader,
            list_write: &impl driven_ports::ListWriter,
        ) -> Result<(), DeleteListError>;
    }
}

/// Resolves a list for a mutating operation. Lists the requester cannot access
/// resolve as "not found" to avoid confirming their existence.
async fn visible_list_by_id(
    list_id: i32,
    profile_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    list_read: &impl ListReader,
) -> Result<Option<CollaborativeList>, anyhow::Error> {
    let maybe_list = list_read
        .list_by_id(list_id, DeletedRows::Exclude, &mut *ext_cxn)
        .await
        .context("resolving a list by ID")?;

    Ok(maybe_list.filter(|list| access::can_access_list(list, profile_id)))
}

pub struct ListService {}

impl driving_ports::ListPort for ListService {
    async fn accessible_lists(
        &self,
        profile_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        list_read: &impl ListReader,
    ) -> Result<Vec<CollaborativeList>, anyhow::Error> {
        list_read
            .accessible_to(profile_id, DeletedRows::Exclude, &mut *ext_cxn)
            .await
            .context("fetching lists accessible to a profile")
    }

    async fn create_list(
        &self,
        profile_id: i32,
        new_list: &NewList,
        ext_cxn: &mut impl ExternalConnectivity,
        list_write: &impl ListWriter,
    ) -> Result<i32, anyhow::Error> {
        list_write
            .create(new_list, profile_id, &mut *ext_cxn)
            .await
            .context("creating a collaborative list")
    }

    async fn add_member(
        &self,
        list_id: i32,
        username: &str,
        requester_profile_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        list_read: &impl ListReader,
        account_read: &impl domain::account::driven_ports::AccountReader,
        list_write: &impl ListWriter,
    ) -> Result<i32, AddMemberError> {
        let Some(list) =
            visible_list_by_id(list_id, requester_profile_id, &mut *ext_cxn, list_read).await?
        else {
            return Err(AddMemberError::ListNotFound);
        };

        access::ensure_owns_list(&list, requester_profile_id)
            .map_err(|_| AddMemberError::NotOwner)?;

        if username.trim().is_empty() {
            return Err(AddMemberError::UsernameRequired);
        }

        let maybe_account = account_read
            .account_by_username(username, &mut *ext_cxn)
            .await
            .context("looking up an account to add as list member")?;
        let Some(account) = maybe_account else {
            return Err(AddMemberError::UserNotFound);
        };

        let maybe_profile = account_read
            .profile_for_account(account.id, DeletedRows::Exclude, &mut *ext_cxn)
            .await
            .context("looking up the profile of a prospective list member")?;
        let Some(profile) = maybe_profile else {
            return Err(AddMemberError::UserHasNoProfile);
        };

        list_write
            .add_member(list.id, profile.id, &mut *ext_cxn)
            .await
            .context("adding a member to a collaborative list")?;

        Ok(profile.id)
    }

    async fn delete_list(
        &self,
        list_id: i32,
        requester_profile_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        list_read: &impl ListReader,
        list_write: &impl ListWriter,
    ) -> Result<(), DeleteListError> {
        let Some(list) =
            visible_list_by_id(list_id, requester_profile_id, &mut *ext_cxn, list_read).await?
        else {
            return Err(DeleteListError::ListNotFound);
        };

        access::ensure_owns_list(&list, requester_profile_id)
            .map_err(|_| DeleteListError::NotOwner)?;

        list_write
            .mark_deleted(list.id, &mut *ext_cxn)
            .await
            .context("soft-deleting a collaborative list")?;

        Ok(())
    }
}


#[cfg(test)]
pub mod test_util {
    use super::*;
    use crate::domain::test_util::{Connectivity, FakeImplementation};
    use std::sync::{Mutex, RwLock};

    pub fn list_with_members(id: i32, owner: i32, members: &[i32]) -> CollaborativeList {
        CollaborativeList {
            id,
            name: format!("List {id}"),
            owner_profile_id: owner,
            member_profile_ids: members.to_vec(),
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub struct InMemoryListPersistence {
        pub lists: Vec<CollaborativeList>,
        pub connected: Connectivity,
        highest_list_id: i32,
    }

    pub struct NewListWithMembers {
        pub owner: i32,
        pub name: String,
        pub members: Vec<i32>,
    }

    impl InMemoryListPersistence {
        pub fn new() -> InMemoryListPersistence {
            InMemoryListPersistence {
                lists: Vec::new(),
                connected: Connectivity::Connected,
                highest_list_id: 0,
            }
        }

        pub fn new_with_lists(lists: &[NewListWithMembers]) -> InMemoryListPersistence {
            InMemoryListPersistence {
                lists: lists
                    .iter()
                    .enumerate()
                    .map(|(index, list_info)| CollaborativeList {
                        id: index as i32 + 1,
                        name: list_info.name.clone(),
                        owner_profile_id: list_info.owner,
                        member_profile_ids: list_info.members.clone(),
                        deleted_at: None,
                        created_at: Utc::now(),
                        updated_at: Utc::now(),
                    })
                    .collect(),
                connected: Connectivity::Connected,
                highest_list_id: lists.len() as i32,
            }
        }

        pub fn new_locked() -> RwLock<InMemoryListPersistence> {
            RwLock::new(Self::new())
        }
    }

    fn row_visible(list: &CollaborativeList, deleted: DeletedRows) -> bool {
        match deleted {
            DeletedRows::Exclude => list.deleted_at.is_none(),
            DeletedRows::Include => true,
        }
    }

    impl driven_ports::ListReader for RwLock<InMemoryListPersistence> {
        async fn accessible_to(
            &self,
            profile_id: i32,
            deleted: DeletedRows,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<CollaborativeList>, anyhow::Error> {
            let persistence = self.read().expect("list persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            Ok(persistence
                .lists
                .iter()
                .filter(|list| {
                    row_visible(list, deleted)
                        && (list.owner_profile_id == profile_id
                            || list.member_profile_ids.contains(&profile_id))
                })
                .cloned()
                .collect())
        }

        async fn list_by_id(
            &self,
            list_id: i32,
            deleted: DeletedRows,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<CollaborativeList>, anyhow::Error> {
            let persistence = self.read().expect("list persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            Ok(persistence
                .lists
                .iter()
                .find(|list| list.id == list_id && row_visible(list, deleted))
                .cloned())
        }
    }

    impl driven_ports::ListWriter for RwLock<InMemoryListPersistence> {
        async fn create(
            &self,
            new_list: &NewList,
            owner_profile_id: i32,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<i32, anyhow::Error> {
            let mut persistence = self.write().expect("list persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            persistence.highest_list_id += 1;
            let list_id = persistence.highest_list_id;
            persistence.lists.push(CollaborativeList {
                id: list_id,
                name: new_list.name.clone(),
                owner_profile_id,
                member_profile_ids: Vec::new(),
                deleted_at: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            });
            Ok(list_id)
        }

        async fn add_member(
            &self,
            list_id: i32,
            profile_id: i32,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error> {
            let mut persistence = self.write().expect("list persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            if let Some(list) = persistence.lists.iter_mut().find(|list| list.id == list_id) {
                if !list.member_profile_ids.contains(&profile_id) {
                    list.member_profile_ids.push(profile_id);
                }
            }

            Ok(())
        }

        async fn mark_deleted(
            &self,
            list_id: i32,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error> {
            let mut persistence = self.write().expect("list persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            if let Some(list) = persistence.lists.iter_mut().find(|list| list.id == list_id) {
                if list.deleted_at.is_none() {
                    list.deleted_at = Some(Utc::now());
                }
            }

            Ok(())
        }
    }

    pub struct MockListService {
        pub accessible_lists_result:
            FakeImplementation<i32, Result<Vec<CollaborativeList>, anyhow::Error>>,
        pub create_list_result: FakeImplementation<(i32, NewList), Result<i32, anyhow::Error>>,
        pub add_member_result:
            FakeImplementation<(i32, String, i32), Result<i32, AddMemberError>>,
        pub delete_list_result: FakeImplementation<(i32, i32), Result<(), DeleteListError>>,
    }

    impl MockListService {
        pub fn new() -> MockListService {
            MockListService {
                accessible_lists_result: FakeImplementation::new(),
                create_list_result: FakeImplementation::new(),
                add_member_result: FakeImplementation::new(),
                delete_list_result: FakeImplementation::new(),
            }
        }

        pub fn new_locked() -> Mutex<MockListService> {
            Mutex::new(Self::new())
        }
    }

    impl driving_ports::ListPort for Mutex<MockListService> {
        async fn accessible_lists(
            &self,
            profile_id: i32,
            _ext_cxn: &mut impl ExternalConnectivity,
            _list_read: &impl driven_ports::ListReader,
        ) -> Result<Vec<CollaborativeList>, anyhow::Error> {
            let mut locked_self = self.lock().expect("mock list service mutex poisoned");
            locked_self.accessible_lists_result.save_arguments(profile_id);

            locked_self.accessible_lists_result.return_value_anyhow()
        }

        async fn create_list(
            &self,
            profile_id: i32,
            new_list: &NewList,
            _ext_cxn: &mut impl ExternalConnectivity,
            _list_write: &impl driven_ports::ListWriter,
        ) -> Result<i32, anyhow::Error> {
            let mut locked_self = self.lock().expect("mock list service mutex poisoned");
            locked_self
                .create_list_result
                .save_arguments((profile_id, new_list.clone()));

            locked_self.create_list_result.return_value_anyhow()
        }

        async fn add_member(
            &self,
            list_id: i32,
            username: &str,
            requester_profile_id: i32,
            _ext_cxn: &mut impl ExternalConnectivity,
            _list_read: &impl driven_ports::ListReader,
            _account_read: &impl domain::account::driven_ports::AccountReader,
            _list_write: &impl driven_ports::ListWriter,
        ) -> Result<i32, AddMemberError> {
            let mut locked_self = self.lock().expect("mock list service mutex poisoned");
            locked_self.add_member_result.save_arguments((
                list_id,
                username.to_owned(),
                requester_profile_id,
            ));

            locked_self.add_member_result.return_value_result()
        }

        async fn delete_list(
            &self,
            list_id: i32,
            requester_profile_id: i32,
            _ext_cxn: &mut impl ExternalConnectivity,
            _list_read: &impl driven_ports::ListReader,
            _list_write: &impl driven_ports::ListWriter,
        ) -> Result<(), DeleteListError> {
            let mut locked_self = self.lock().expect("mock list service mutex poisoned");
            locked_self
                .delete_list_result
                .save_arguments((list_id, requester_profile_id));

            locked_self.delete_list_result.return_value_result()
        }
    }
}
