use crate::mem_repo::MemRepo;
use crate::tag_repo::{NewTag, Tag, TagRepo, TagRepoError};
use async_trait::async_trait;
use std::collections::HashSet;

#[async_trait]
impl TagRepo for MemRepo {
    async fn create_tag(&self, user_id: &str, new_tag: NewTag) -> Result<Tag, TagRepoError> {
        let mut write_guard = self.write_lock()?;

        let id = write_guard.next_id();
        let tag = new_tag.to_tag(id);

        write_guard.tags.insert(id, tag.clone());
        write_guard
            .user_tags
            .entry(user_id.to_owned())
            .or_insert_with(HashSet::new)
            .insert(id);

        Ok(tag)
    }

    async fn get_tags(&self, user_id: &str) -> Result<Vec<Tag>, TagRepoError> {
        let read_guard = self.read_lock()?;

        let Some(tag_ids) = read_guard.user_tags.get(user_id) else {
            return Ok(Vec::new());
        };

        let mut tags: Vec<Tag> = tag_ids
            .iter()
            .map(|id| {
                read_guard
                    .tags
                    .get(id)
                    .expect("tags should have all the ids in user_tags")
            })
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(tags)
    }

    async fn find_tags_by_name(&self, user_id: &str, name: &str) -> Result<Vec<Tag>, TagRepoError> {
        let needle = name.to_uppercase();
        let tags = self
            .get_tags(user_id)
            .await?
            .into_iter()
            .filter(|tag| tag.name.to_uppercase().contains(&needle))
            .collect();
        Ok(tags)
    }

    async fn delete_tag(&self, user_id: &str, tag_id: i32) -> Result<Tag, TagRepoError> {
        let mut write_guard = self.write_lock()?;

        let Some(tag_ids) = write_guard.user_tags.get_mut(user_id) else {
            return Err(TagRepoError::TagNotFound(tag_id));
        };
        if !tag_ids.remove(&tag_id) {
            return Err(TagRepoError::TagNotFound(tag_id));
        }

        let tag = write_guard
            .tags
            .remove(&tag_id)
            .expect("tag should exist if there is an entry in user_tags");
        for transaction in write_guard.transactions.values_mut() {
            transaction.tags.remove(&tag_id);
        }
        Ok(tag)
    }
}
