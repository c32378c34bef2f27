use crate::domain;
use crate::domain::DeletedRows;
use crate::domain::list::{CollaborativeList, NewList};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use chrono::{DateTime, Utc};
use sqlx::{query, query_as};
use std::collections::HashMap;

pub struct DbListReader;
pub struct DbListWriter;

#[derive(sqlx::FromRow)]
struct ListRow {
    id: i32,
    name: String,
    owner_profile_id: i32,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct MembershipRow {
    list_id: i32,
    profile_id: i32,
}

impl ListRow {
    fn into_list(self, member_profile_ids: Vec<i32>) -> CollaborativeList {
        CollaborativeList {
            id: self.id,
            name: self.name,
            owner_profile_id: self.owner_profile_id,
            member_profile_ids,
            deleted_at: self.deleted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn deleted_filter(deleted: DeletedRows) -> &'static str {
    match deleted {
        DeletedRows::Exclude => " AND l.deleted_at IS NULL",
        DeletedRows::Include => "",
    }
}

/// Fetches the membership sets for a group of lists in one round trip
async fn members_by_list(
    list_ids: &[i32],
    cxn: &mut impl ConnectionHandle,
) -> Result<HashMap<i32, Vec<i32>>, Error> {
    let membership_rows = query_as::<_, MembershipRow>(
        "SELECT lm.list_id, lm.profile_id FROM list_members lm \
         WHERE lm.list_id = ANY($1) ORDER BY lm.profile_id",
    )
    .bind(list_ids)
    .fetch_all(cxn.borrow_connection())
    .await
    .context("trying to fetch list memberships")?;

    let mut members: HashMap<i32, Vec<i32>> = HashMap::new();
    for row in membership_rows {
        members.entry(row.list_id).or_default().push(row.profile_id);
    }

    Ok(members)
}

impl domain::list::driven_ports::ListReader for DbListReader {
    async fn accessible_to(
        &self,
        profile_id: i32,
        deleted: DeletedRows,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<CollaborativeList>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let sql = format!(
            "SELECT l.* FROM lists l \
             WHERE (l.owner_profile_id = $1 \
                OR l.id IN (SELECT lm.list_id FROM list_members lm WHERE lm.profile_id = $1)){} \
             ORDER BY l.id",
            deleted_filter(deleted)
        );
        let list_rows = query_as::<_, ListRow>(&sql)
            .bind(profile_id)
            .fetch_all(cxn.borrow_connection())
            .await
            .context("trying to fetch lists accessible to a profile")?;

        let list_ids: Vec<i32> = list_rows.iter().map(|row| row.id).collect();
        let mut members = members_by_list(&list_ids, &mut cxn).await?;

        Ok(list_rows
            .into_iter()
            .map(|row| {
                let list_members = members.remove(&row.id).unwrap_or_default();
                row.into_list(list_members)
            })
            .collect())
    }

    async fn list_by_id(
        &self,
        list_id: i32,
        deleted: DeletedRows,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<CollaborativeList>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let sql = format!(
            "SELECT l.* FROM lists l WHERE l.id = $1{}",
            deleted_filter(deleted)
        );
        let maybe_row = query_as::<_, ListRow>(&sql)
            .bind(list_id)
            .fetch_optional(cxn.borrow_connection())
            .await
            .context("trying to fetch a list by ID")?;
        let Some(row) = maybe_row else {
            return Ok(None);
        };

        let mut members = members_by_list(&[row.id], &mut cxn).await?;
        let list_members = members.remove(&row.id).unwrap_or_default();

        Ok(Some(row.into_list(list_members)))
    }
}

impl domain::list::driven_ports::ListWriter for DbListWriter {
    async fn create(
        &self,
        new_list: &NewList,
        owner_profile_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<i32, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let new_id = query_as::<_, super::NewId>(
            "INSERT INTO lists(name, owner_profile_id) VALUES ($1, $2) RETURNING lists.id",
        )
        .bind(&new_list.name)
        .bind(owner_profile_id)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("trying to insert a new list into the database")?;

        Ok(new_id.id)
    }

    async fn add_member(
        &self,
        list_id: i32,
        profile_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        // ON CONFLICT keeps repeat additions idempotent
        query(
            "INSERT INTO list_members(list_id, profile_id) VALUES ($1, $2) \
             ON CONFLICT (list_id, profile_id) DO NOTHING",
        )
        .bind(list_id)
        .bind(profile_id)
        .execute(cxn.borrow_connection())
        .await
        .context("trying to add a member to a list in the database")?;

        Ok(())
    }

    async fn mark_deleted(
        &self,
        list_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        query("UPDATE lists SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL")
            .bind(list_id)
            .execute(cxn.borrow_connection())
            .await
            .context("trying to soft-delete a list in the database")?;

        Ok(())
    }
}
