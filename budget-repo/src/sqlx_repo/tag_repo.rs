use crate::sqlx_repo::SQLxRepo;
use crate::tag_repo::{NewTag, Tag, TagRepo, TagRepoError};
use anyhow::Context;
use async_trait::async_trait;
use sqlx::query_as;
use tracing::instrument;

#[derive(sqlx::FromRow)]
struct TagEntry {
    id: i32,
    name: String,
    color: String,
}

impl From<TagEntry> for Tag {
    fn from(value: TagEntry) -> Self {
        Tag {
            id: value.id,
            name: value.name,
            color: value.color,
        }
    }
}

#[async_trait]
impl TagRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn create_tag(&self, user_id: &str, new_tag: NewTag) -> Result<Tag, TagRepoError> {
        let entry: TagEntry = query_as(
            "INSERT INTO tags(user_id, name, color) VALUES ($1, $2, $3) RETURNING id, name, color",
        )
        .bind(user_id)
        .bind(&new_tag.name)
        .bind(&new_tag.color)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("Unable to create tag {}", new_tag.name))?;
        Ok(entry.into())
    }

    #[instrument(skip(self))]
    async fn get_tags(&self, user_id: &str) -> Result<Vec<Tag>, TagRepoError> {
        let tags = query_as::<_, TagEntry>(
            "SELECT id, name, color FROM tags WHERE user_id = $1 ORDER BY name, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Unable to get tags for user {}", user_id))?
        .into_iter()
        .map(Tag::from)
        .collect();
        Ok(tags)
    }

    #[instrument(skip(self))]
    async fn find_tags_by_name(&self, user_id: &str, name: &str) -> Result<Vec<Tag>, TagRepoError> {
        let tags = query_as::<_, TagEntry>(
            "SELECT id, name, color FROM tags WHERE user_id = $1 AND POSITION(UPPER($2) IN UPPER(name)) > 0 ORDER BY name, id",
        )
        .bind(user_id)
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Unable to search tags for user {}", user_id))?
        .into_iter()
        .map(Tag::from)
        .collect();
        Ok(tags)
    }

    #[instrument(skip(self))]
    async fn delete_tag(&self, user_id: &str, tag_id: i32) -> Result<Tag, TagRepoError> {
        let entry: Option<TagEntry> = query_as(
            "DELETE FROM tags WHERE user_id = $1 AND id = $2 RETURNING id, name, color",
        )
        .bind(user_id)
        .bind(tag_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to delete tag {}", tag_id))?;
        entry
            .map(Tag::from)
            .ok_or(TagRepoError::TagNotFound(tag_id))
    }
}
