use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: i32,
    pub name: String,
    pub color: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NewTag {
    pub name: String,
    pub color: String,
}

impl NewTag {
    pub fn new(name: String, color: String) -> Self {
        NewTag { name, color }
    }

    pub fn to_tag(self, id: i32) -> Tag {
        Tag {
            id,
            name: self.name,
            color: self.color,
        }
    }
}

#[derive(Error, Debug)]
pub enum TagRepoError {
    #[error("Tag with id {0} not found")]
    TagNotFound(i32),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait TagRepo: Sync + Send {
    async fn create_tag(&self, user_id: &str, new_tag: NewTag) -> Result<Tag, TagRepoError>;

    /// Returns the user's tags ordered by name.
    async fn get_tags(&self, user_id: &str) -> Result<Vec<Tag>, TagRepoError>;

    /// Case-insensitive substring search on tag names, used to warn about near duplicates
    /// before creating a tag.
    async fn find_tags_by_name(&self, user_id: &str, name: &str) -> Result<Vec<Tag>, TagRepoError>;

    /// Deletes the tag and unlinks it from every transaction.
    async fn delete_tag(&self, user_id: &str, tag_id: i32) -> Result<Tag, TagRepoError>;
}
