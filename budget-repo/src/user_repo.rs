use async_trait::async_trait;
use thiserror::Error;

#[async_trait]
pub trait UserRepo: Sync + Send {
    async fn create_user(&self, user: User) -> Result<(), UserRepoError>;
    /// Deletes the user along with their transactions, tags and recurring transactions.
    async fn delete_user(&self, user_id: &str) -> Result<(), UserRepoError>;
}

pub struct User {
    pub id: String,
}

impl User {
    pub fn new(id: String) -> User {
        User { id }
    }
}

#[derive(Error, Debug)]
pub enum UserRepoError {
    #[error("User {0} not found")]
    UserNotFound(String),
    #[error("User {0} already exists")]
    UserAlreadyExists(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
