use super::ServiceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use tokio::sync::RwLock;
use tracing::debug;

/// A chat user linked to a Challonge account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Platform id of the user.
    pub sender: String,
    /// Challonge username.
    pub challonge_username: String,
    /// Email hash of the Challonge member, when the username was found.
    #[serde(default)]
    pub challonge_email_hash: Option<String>,
}

impl UserRecord {
    /// Returns `true` when the account is linked to a known member.
    pub fn is_verified(&self) -> bool {
        self.challonge_email_hash.is_some()
    }
}

/// Maps platform user ids to stored profiles.
#[async_trait]
pub trait UserDirectory: Send + Sync + Debug {
    /// Looks up the user for `sender`.
    async fn get_user(&self, sender: &str) -> Result<Option<UserRecord>, ServiceError>;

    /// Stores a user, replacing any previous record, and returns it.
    async fn add_user(
        &self,
        sender: &str,
        challonge_username: &str,
        challonge_email_hash: Option<&str>,
    ) -> Result<UserRecord, ServiceError>;

    /// Forgets the user for `sender`. Unknown senders are ignored.
    async fn delete_user(&self, sender: &str) -> Result<(), ServiceError>;
}

/// A [`UserDirectory`] kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory holding `users`.
    pub fn with_users(users: impl IntoIterator<Item = UserRecord>) -> Self {
        Self {
            users: RwLock::new(
                users
                    .into_iter()
                    .map(|user| (user.sender.clone(), user))
                    .collect(),
            ),
        }
    }

    /// Returns the number of stored users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Returns `true` if no user is stored.
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn get_user(&self, sender: &str) -> Result<Option<UserRecord>, ServiceError> {
        Ok(self.users.read().await.get(sender).cloned())
    }

    async fn add_user(
        &self,
        sender: &str,
        challonge_username: &str,
        challonge_email_hash: Option<&str>,
    ) -> Result<UserRecord, ServiceError> {
        let user = UserRecord {
            sender: sender.to_string(),
            challonge_username: challonge_username.to_string(),
            challonge_email_hash: challonge_email_hash.map(str::to_string),
        };
        debug!("Storing user {} as '{}'", sender, challonge_username);
        self.users
            .write()
            .await
            .insert(sender.to_string(), user.clone());
        Ok(user)
    }

    async fn delete_user(&self, sender: &str) -> Result<(), ServiceError> {
        self.users.write().await.remove(sender);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_add_get_delete() {
        let directory = InMemoryUserDirectory::new();
        assert_eq!(assert_ok!(directory.get_user("U1").await), None);

        let user = assert_ok!(directory.add_user("U1", "alice", None).await);
        assert!(!user.is_verified());
        assert_eq!(assert_ok!(directory.get_user("U1").await), Some(user));
        assert_eq!(directory.len().await, 1);

        assert_ok!(directory.delete_user("U1").await);
        assert_ok!(directory.delete_user("U1").await);
        assert!(directory.is_empty().await);
    }

    #[tokio::test]
    async fn test_add_replaces_previous_record() {
        let directory = InMemoryUserDirectory::new();
        assert_ok!(directory.add_user("U1", "alice", None).await);
        let user = assert_ok!(directory.add_user("U1", "bob", Some("hash-bob")).await);

        assert!(user.is_verified());
        assert_eq!(
            assert_ok!(directory.get_user("U1").await).map(|u| u.challonge_username),
            Some("bob".to_string())
        );
    }

    #[test]
    fn test_user_record_json_shape() {
        let user: UserRecord = serde_json::from_str(
            r#"{"sender":"U1","challongeUsername":"alice","challongeEmailHash":"abc"}"#,
        )
        .expect("valid user");
        assert_eq!(user.challonge_email_hash.as_deref(), Some("abc"));
    }
}
