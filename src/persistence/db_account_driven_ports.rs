use crate::domain;
use crate::domain::DeletedRows;
use crate::domain::account::driven_ports::AccountRecord;
use crate::domain::account::{Account, Profile};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use chrono::{DateTime, Utc};
use sqlx::{query, query_as, query_scalar};

pub struct DbAccountReader;
pub struct DbAccountWriter;
pub struct DbTokenStore;

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: i32,
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(value: AccountRow) -> Self {
        Account {
            id: value.id,
            username: value.username,
            email: value.email,
            password_hash: value.password_hash,
            created_at: value.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: i32,
    account_id: i32,
    security_question: Option<String>,
    security_answer: Option<String>,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(value: ProfileRow) -> Self {
        Profile {
            id: value.id,
            account_id: value.account_id,
            security_question: value.security_question,
            security_answer: value.security_answer,
            deleted_at: value.deleted_at,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl domain::account::driven_ports::AccountReader for DbAccountReader {
    async fn account_by_username(
        &self,
        username: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Account>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let maybe_account =
            query_as::<_, AccountRow>("SELECT u.* FROM users u WHERE u.username = $1")
                .bind(username)
                .fetch_optional(cxn.borrow_connection())
                .await
                .context("trying to fetch an account by username")?
                .map(Account::from);

        Ok(maybe_account)
    }

    async fn account_by_id(
        &self,
        account_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Account>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let maybe_account = query_as::<_, AccountRow>("SELECT u.* FROM users u WHERE u.id = $1")
            .bind(account_id)
            .fetch_optional(cxn.borrow_connection())
            .await
            .context("trying to fetch an account by ID")?
            .map(Account::from);

        Ok(maybe_account)
    }

    async fn profile_for_account(
        &self,
        account_id: i32,
        deleted: DeletedRows,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Profile>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let deleted_filter = match deleted {
            DeletedRows::Exclude => " AND p.deleted_at IS NULL",
            DeletedRows::Include => "",
        };
        let sql = format!(
            "SELECT p.* FROM profiles p WHERE p.account_id = $1{deleted_filter}"
        );
        let maybe_profile = query_as::<_, ProfileRow>(&sql)
            .bind(account_id)
            .fetch_optional(cxn.borrow_connection())
            .await
            .context("trying to fetch the profile attached to an account")?
            .map(Profile::from);

        Ok(maybe_profile)
    }

    async fn email_in_use(
        &self,
        email: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<bool, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let in_use: bool =
            query_scalar("SELECT EXISTS(SELECT 1 FROM users u WHERE u.email = $1)")
                .bind(email)
                .fetch_one(cxn.borrow_connection())
                .await
                .context("trying to check whether an email address is in use")?;

        Ok(in_use)
    }
}

impl domain::account::driven_ports::AccountWriter for DbAccountWriter {
    async fn create_account(
        &self,
        record: &AccountRecord<'_>,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<i32, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let new_id = query_as::<_, super::NewId>(
            "INSERT INTO users(username, email, password_hash) VALUES ($1, $2, $3) RETURNING users.id",
        )
        .bind(record.username)
        .bind(record.email)
        .bind(record.password_hash)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("trying to insert a new account into the database")?;

        Ok(new_id.id)
    }

    async fn create_profile(
        &self,
        account_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<i32, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let new_id = query_as::<_, super::NewId>(
            "INSERT INTO profiles(account_id) VALUES ($1) RETURNING profiles.id",
        )
        .bind(account_id)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("trying to insert a new profile into the database")?;

        Ok(new_id.id)
    }

    async fn set_password_hash(
        &self,
        account_id: i32,
        password_hash: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(account_id)
            .execute(cxn.borrow_connection())
            .await
            .context("trying to update an account's password hash")?;

        Ok(())
    }

    async fn set_security_question(
        &self,
        profile_id: i32,
        question: &str,
        answer: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        query(
            "UPDATE profiles SET security_question = $1, security_answer = $2, updated_at = now() \
             WHERE id = $3",
        )
        .bind(question)
        .bind(answer)
        .bind(profile_id)
        .execute(cxn.borrow_connection())
        .await
        .context("trying to update a profile's security question")?;

        Ok(())
    }
}

impl domain::account::driven_ports::TokenStore for DbTokenStore {
    async fn store_token(
        &self,
        account_id: i32,
        token: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        query("INSERT INTO auth_tokens(token, account_id) VALUES ($1, $2)")
            .bind(token)
            .bind(account_id)
            .execute(cxn.borrow_connection())
            .await
            .context("trying to store a session token")?;

        Ok(())
    }

    async fn token_for_account(
        &self,
        account_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<String>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let maybe_token: Option<String> = query_scalar(
            "SELECT at.token FROM auth_tokens at WHERE at.account_id = $1 \
             ORDER BY at.created_at LIMIT 1",
        )
        .bind(account_id)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("trying to fetch an account's session token")?;

        Ok(maybe_token)
    }

    async fn account_for_token(
        &self,
        token: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<i32>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let maybe_account_id: Option<i32> =
            query_scalar("SELECT at.account_id FROM auth_tokens at WHERE at.token = $1")
                .bind(token)
                .fetch_optional(cxn.borrow_connection())
                .await
                .context("trying to resolve a session token")?;

        Ok(maybe_account_id)
    }

    async fn revoke_tokens_for_account(
        &self,
        account_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<bool, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let delete_result = query("DELETE FROM auth_tokens WHERE account_id = $1")
            .bind(account_id)
            .execute(cxn.borrow_connection())
            .await
            .context("trying to revoke an account's session tokens")?;

        Ok(delete_result.rows_affected() > 0)
    }
}
