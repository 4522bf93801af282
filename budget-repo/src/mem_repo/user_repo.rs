use crate::mem_repo::MemRepo;
use crate::user_repo::UserRepoError::{UserAlreadyExists, UserNotFound};
use crate::user_repo::{User, UserRepo, UserRepoError};
use async_trait::async_trait;

#[async_trait]
impl UserRepo for MemRepo {
    async fn create_user(&self, user: User) -> Result<(), UserRepoError> {
        let mut write_guard = self.write_lock()?;

        if write_guard.users.insert(user.id.clone()) {
            Ok(())
        } else {
            Err(UserAlreadyExists(user.id))
        }
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), UserRepoError> {
        let mut write_guard = self.write_lock()?;

        if !write_guard.users.remove(user_id) {
            return Err(UserNotFound(user_id.to_owned()));
        }

        let state = &mut *write_guard;
        for id in state.user_transactions.remove(user_id).unwrap_or_default() {
            state.transactions.remove(&id);
        }
        for id in state.user_tags.remove(user_id).unwrap_or_default() {
            state.tags.remove(&id);
        }
        for id in state
            .user_recurring_transactions
            .remove(user_id)
            .unwrap_or_default()
        {
            state.recurring_transactions.remove(&id);
        }

        Ok(())
    }
}
