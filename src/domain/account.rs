use crate::domain::DeletedRows;
use crate::domain::account::driven_ports::{AccountReader, AccountRecord, AccountWriter, TokenStore};
use crate::domain::account::driving_ports::{
    AuthError, ChangePasswordError, LoginError, RecoveryError, SecurityQuestionError, SignupError,
};
use crate::external_connections::{
    ExternalConnectivity, TransactableExternalConnectivity, TransactionHandle,
};
use crate::security;
use anyhow::{Context, anyhow};
use chrono::{DateTime, Utc};

/// The identity record a user logs in with
#[derive(PartialEq, Eq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct Account {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// The in-app actor attached to an account. Tasks and lists reference profiles,
/// never accounts.
#[derive(PartialEq, Eq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct Profile {
    pub id: i32,
    pub account_id: i32,
    pub security_question: Option<String>,
    pub security_answer: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The resolved identity of an authenticated request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub account_id: i32,
    pub profile_id: i32,
}

#[cfg_attr(test, derive(Clone, Debug))]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// A successful signup or login: the identity pair plus the session token the
/// client should present on subsequent requests
#[derive(PartialEq, Eq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct AuthGrant {
    pub account_id: i32,
    pub profile_id: i32,
    pub token: String,
}

pub mod driven_ports {
    use super::*;

    /// Account content ready for insertion, password already hashed
    pub struct AccountRecord<'acct> {
        pub username: &'acct str,
        pub email: &'acct str,
        pub password_hash: &'acct str,
    }

    pub trait AccountReader {
        async fn account_by_username(
            &self,
            username: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Account>, anyhow::Error>;

        async fn account_by_id(
            &self,
            account_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Account>, anyhow::Error>;

        async fn profile_for_account(
            &self,
            account_id: i32,
            deleted: DeletedRows,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Profile>, anyhow::Error>;

        async fn email_in_use(
            &self,
            email: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error>;
    }

    pub trait AccountWriter {
        async fn create_account(
            &self,
            record: &AccountRecord<'_>,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<i32, anyhow::Error>;

        async fn create_profile(
            &self,
            account_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<i32, anyhow::Error>;

        async fn set_password_hash(
            &self,
            account_id: i32,
            password_hash: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;

        async fn set_security_question(
            &self,
            profile_id: i32,
            question: &str,
            answer: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;
    }

    pub trait TokenStore {
        async fn store_token(
            &self,
            account_id: i32,
            token: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;

        /// The account's existing session token, if one was issued earlier and
        /// not revoked since
        async fn token_for_account(
            &self,
            account_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<String>, anyhow::Error>;

        async fn account_for_token(
            &self,
            token: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<i32>, anyhow::Error>;

        /// Reports whether any token actually existed to revoke
        async fn revoke_tokens_for_account(
            &self,
            account_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use crate::external_connections::TransactableExternalConnectivity;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum SignupError {
        #[error("that username is already taken")]
        UsernameTaken,
        #[error("that email address is already in use")]
        EmailInUse,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    #[derive(Debug, Error)]
    pub enum LoginError {
        /// Unknown username and wrong password are deliberately the same error
        #[error("the username or password was incorrect")]
        BadCredentials,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    #[derive(Debug, Error)]
    pub enum AuthError {
        /// Unknown tokens and tokens whose account lost its profile are
        /// indistinguishable to callers
        #[error("the provided token is not valid")]
        InvalidToken,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    #[derive(Debug, Error)]
    pub enum SecurityQuestionError {
        /// Covers "no such account", "no profile" and "no question configured"
        /// uniformly so the endpoint can't be used for account enumeration
        #[error("no security question is available for that username")]
        NotFound,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    #[derive(Debug, Error)]
    pub enum RecoveryError {
        #[error("user not found")]
        UnknownUser,
        #[error("incorrect answer")]
        WrongAnswer,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    #[derive(Debug, Error)]
    pub enum ChangePasswordError {
        #[error("the current password was incorrect")]
        WrongOldPassword,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    #[cfg(test)]
    mod error_clone {
        use super::*;
        use anyhow::anyhow;

        impl Clone for SignupError {
            fn clone(&self) -> Self {
                match self {
                    Self::UsernameTaken => Self::UsernameTaken,
                    Self::EmailInUse => Self::EmailInUse,
                    Self::PortError(err) => Self::PortError(anyhow!(format!("{}", err))),
                }
            }
        }

        impl Clone for LoginError {
            fn clone(&self) -> Self {
                match self {
                    Self::BadCredentials => Self::BadCredentials,
                    Self::PortError(err) => Self::PortError(anyhow!(format!("{}", err))),
                }
            }
        }

        impl Clone for AuthError {
            fn clone(&self) -> Self {
                match self {
                    Self::InvalidToken => Self::InvalidToken,
                    Self::PortError(err) => Self::PortError(anyhow!(format!("{}", err))),
                }
            }
        }

        impl Clone for SecurityQuestionError {
            fn clone(&self) -> Self {
                match self {
                    Self::NotFound => Self::NotFound,
                    Self::PortError(err) => Self::PortError(anyhow!(format!("{}", err))),
                }
            }
        }

        impl Clone for RecoveryError {
            fn clone(&self) -> Self {
                match self {
                    Self::UnknownUser => Self::UnknownUser,
                    Self::WrongAnswer => Self::WrongAnswer,
                    Self::PortError(err) => Self::PortError(anyhow!(format!("{}", err))),
                }
            }
        }

        impl Clone for ChangePasswordError {
            fn clone(&self) -> Self {
                match self {
                    Self::WrongOldPassword => Self::WrongOldPassword,
                    Self::PortError(err) => Self::PortError(anyhow!(format!("{}", err))),
                }
            }
        }
    }

    pub trait AccountPort {
        /// Creates the account, its profile and a session token atomically.
        /// Failure at any step leaves no partial records behind.
        async fn signup(
            &self,
            new_account: &NewAccount,
            ext_cxn: &mut impl TransactableExternalConnectivity,
            account_read: &impl driven_ports::AccountReader,
            account_write: &impl driven_ports::AccountWriter,
            tokens: &impl driven_ports::TokenStore,
        ) -> Result<AuthGrant, SignupError>;

        /// Verifies credentials and hands back the account's session token,
        /// reusing an existing one when present
        async fn login(
            &self,
            username: &str,
            password: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            account_read: &impl driven_ports::AccountReader,
            tokens: &impl driven_ports::TokenStore,
        ) -> Result<AuthGrant, LoginError>;

        /// Revokes the account's tokens, reporting whether any existed
        async fn logout(
            &self,
            account_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            tokens: &impl driven_ports::TokenStore,
        ) -> Result<bool, anyhow::Error>;

        async fn authenticate(
            &self,
            token: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            account_read: &impl driven_ports::AccountReader,
            tokens: &impl driven_ports::TokenStore,
        ) -> Result<AuthContext, AuthError>;

        async fn security_question(
            &self,
            username: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            account_read: &impl driven_ports::AccountReader,
        ) -> Result<String, SecurityQuestionError>;

        async fn verify_security_answer(
            &self,
            username: &str,
            answer: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            account_read: &impl driven_ports::AccountReader,
        ) -> Result<(), RecoveryError>;

        /// Re-verifies the security answer before storing a fresh password hash
        async fn reset_password(
            &self,
            username: &str,
            answer: &str,
            new_password: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            account_read: &impl driven_ports::AccountReader,
            account_write: &impl driven_ports::AccountWriter,
        ) -> Result<(), RecoveryError>;

        async fn set_security_question(
            &self,
            profile_id: i32,
            question: &str,
            answer: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            account_write: &impl driven_ports::AccountWriter,
        ) -> Result<(), anyhow::Error>;

        async fn change_password(
            &self,
            account_id: i32,
            old_password: &str,
            new_password: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            account_read: &impl driven_ports::AccountReader,
            account_write: &impl driven_ports::AccountWriter,
        ) -> Result<(), ChangePasswordError>;
    }
}

/// Security answers are compared leniently: surrounding whitespace and letter
/// case never count against the user
fn answers_match(stored: &str, given: &str) -> bool {
    stored.trim().to_lowercase() == given.trim().to_lowercase()
}

/// Resolves an account through its username and checks the recovery answer.
/// Shared by answer verification and password reset so reset can never skip
/// the check.
async fn verified_account(
    username: &str,
    answer: &str,
    ext_cxn: &mut impl ExternalConnectivity,
    account_read: &impl AccountReader,
) -> Result<Account, RecoveryError> {
    let maybe_account = account_read
        .account_by_username(username, &mut *ext_cxn)
        .await
        .context("resolving an account for recovery")?;
    let Some(account) = maybe_account else {
        return Err(RecoveryError::UnknownUser);
    };

    let maybe_profile = account_read
        .profile_for_account(account.id, DeletedRows::Exclude, &mut *ext_cxn)
        .await
        .context("resolving a profile for recovery")?;
    let Some(profile) = maybe_profile else {
        return Err(RecoveryError::UnknownUser);
    };

    // A profile with no configured answer can never pass verification
    let answer_matches = profile
        .security_answer
        .as_deref()
        .map(|stored_answer| answers_match(stored_answer, answer))
        .unwrap_or(false);
    if !answer_matches {
        return Err(RecoveryError::WrongAnswer);
    }

    Ok(account)
}

pub struct AccountService {}

impl driving_ports::AccountPort for AccountService {
    async fn signup(
        &self,
        new_account: &NewAccount,
        ext_cxn: &mut impl TransactableExternalConnectivity,
        account_read: &impl AccountReader,
        account_write: &impl AccountWriter,
        tokens: &impl TokenStore,
    ) -> Result<AuthGrant, SignupError> {
        let mut txn = ext_cxn
            .start_transaction()
            .await
            .context("opening the signup transaction")?;

        let existing_account = account_read
            .account_by_username(&new_account.username, &mut txn)
            .await
            .context("checking username availability")?;
        if existing_account.is_some() {
            return Err(SignupError::UsernameTaken);
        }

        let email_taken = account_read
            .email_in_use(&new_account.email, &mut txn)
            .await
            .context("checking email availability")?;
        if email_taken {
            return Err(SignupError::EmailInUse);
        }

        let password_hash = security::hash_password(&new_account.password)
            .map_err(anyhow::Error::new)
            .context("hashing a new account's password")?;

        let account_id = account_write
            .create_account(
                &AccountRecord {
                    username: &new_account.username,
                    email: &new_account.email,
                    password_hash: &password_hash,
                },
                &mut txn,
            )
            .await
            .context("inserting a new account")?;
        let profile_id = account_write
            .create_profile(account_id, &mut txn)
            .await
            .context("inserting a new account's profile")?;

        let token = security::generate_token();
        tokens
            .store_token(account_id, &token, &mut txn)
            .await
            .context("storing a new account's session token")?;

        txn.commit().await.context("committing the signup transaction")?;

        Ok(AuthGrant {
            account_id,
            profile_id,
            token,
        })
    }

    async fn login(
        &self,
        username: &str,
        password: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        account_read: &impl AccountReader,
        tokens: &impl TokenStore,
    ) -> Result<AuthGrant, LoginError> {
        let maybe_account = account_read
            .account_by_username(username, &mut *ext_cxn)
            .await
            .context("resolving an account at login")?;
        let Some(account) = maybe_account else {
            return Err(LoginError::BadCredentials);
        };

        let password_valid = security::verify_password(password, &account.password_hash)
            .map_err(anyhow::Error::new)
            .context("verifying a password at login")?;
        if !password_valid {
            return Err(LoginError::BadCredentials);
        }

        let profile = account_read
            .profile_for_account(account.id, DeletedRows::Exclude, &mut *ext_cxn)
            .await
            .context("resolving a profile at login")?
            .ok_or_else(|| anyhow!("account {} has no active profile", account.id))?;

        let existing_token = tokens
            .token_for_account(account.id, &mut *ext_cxn)
            .await
            .context("looking up an existing session token")?;
        let token = match existing_token {
            Some(token) => token,
            None => {
                let fresh_token = security::generate_token();
                tokens
                    .store_token(account.id, &fresh_token, &mut *ext_cxn)
                    .await
                    .context("storing a fresh session token")?;
                fresh_token
            }
        };

        Ok(AuthGrant {
            account_id: account.id,
            profile_id: profile.id,
            token,
        })
    }

    async fn logout(
        &self,
        account_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        tokens: &impl TokenStore,
    ) -> Result<bool, anyhow::Error> {
        tokens
            .revoke_tokens_for_account(account_id, &mut *ext_cxn)
            .await
            .context("revoking session tokens at logout")
    }

    async fn authenticate(
        &self,
        token: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        account_read: &impl AccountReader,
        tokens: &impl TokenStore,
    ) -> Result<AuthContext, AuthError> {
        let maybe_account_id = tokens
            .account_for_token(token, &mut *ext_cxn)
            .await
            .context("resolving a session token")?;
        let Some(account_id) = maybe_account_id else {
            return Err(AuthError::InvalidToken);
        };

        let maybe_profile = account_read
            .profile_for_account(account_id, DeletedRows::Exclude, &mut *ext_cxn)
            .await
            .context("resolving the profile behind a session token")?;
        let Some(profile) = maybe_profile else {
            return Err(AuthError::InvalidToken);
        };

        Ok(AuthContext {
            account_id,
            profile_id: profile.id,
        })
    }

    async fn security_question(
        &self,
        username: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        account_read: &impl AccountReader,
    ) -> Result<String, SecurityQuestionError> {
        let maybe_account = account_read
            .account_by_username(username, &mut *ext_cxn)
            .await
            .context("resolving an account for its security question")?;
        let Some(account) = maybe_account else {
            return Err(SecurityQuestionError::NotFound);
        };

        let maybe_profile = account_read
            .profile_for_account(account.id, DeletedRows::Exclude, &mut *ext_cxn)
            .await
            .context("resolving a profile for its security question")?;

        maybe_profile
            .and_then(|profile| profile.security_question)
            .ok_or(SecurityQuestionError::NotFound)
    }

    async fn verify_security_answer(
        &self,
        username: &str,
        answer: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        account_read: &impl AccountReader,
    ) -> Result<(), RecoveryError> {
        verified_account(username, answer, &mut *ext_cxn, account_read).await?;
        Ok(())
    }

    async fn reset_password(
        &self,
        username: &str,
        answer: &str,
        new_password: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        account_read: &impl AccountReader,
        account_write: &impl AccountWriter,
    ) -> Result<(), RecoveryError> {
        let account = verified_account(username, answer, &mut *ext_cxn, account_read).await?;

        let new_hash = security::hash_password(new_password)
            .map_err(anyhow::Error::new)
            .context("hashing a recovered account's new password")?;
        account_write
            .set_password_hash(account.id, &new_hash, &mut *ext_cxn)
            .await
            .context("storing a recovered account's new password")?;

        Ok(())
    }

    async fn set_security_question(
        &self,
        profile_id: i32,
        question: &str,
        answer: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        account_write: &impl AccountWriter,
    ) -> Result<(), anyhow::Error> {
        account_write
            .set_security_question(profile_id, question, answer, &mut *ext_cxn)
            .await
            .context("storing a profile's security question")
    }

    async fn change_password(
        &self,
        account_id: i32,
        old_password: &str,
        new_password: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        account_read: &impl AccountReader,
        account_write: &impl AccountWriter,
    ) -> Result<(), ChangePasswordError> {
        let account = account_read
            .account_by_id(account_id, &mut *ext_cxn)
            .await
            .context("resolving an account for a password change")?
            .ok_or_else(|| anyhow!("authenticated account {account_id} no longer exists"))?;

        let old_password_valid = security::verify_password(old_password, &account.password_hash)
            .map_err(anyhow::Error::new)
            .context("verifying the current password")?;
        if !old_password_valid {
            return Err(ChangePasswordError::WrongOldPassword);
        }

        let new_hash = security::hash_password(new_password)
            .map_err(anyhow::Error::new)
            .context("hashing a changed password")?;
        account_write
            .set_password_hash(account.id, &new_hash, &mut *ext_cxn)
            .await
            .context("storing a changed password")?;

        Ok(())
    }
}
