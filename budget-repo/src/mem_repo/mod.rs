use crate::recurring_transaction_repo::RecurringTransaction;
use crate::tag_repo::Tag;
use crate::transaction_repo::Transaction;
use crate::Repos;
use anyhow::anyhow;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

mod candidate_repo;
mod recurring_transaction_repo;
mod tag_repo;
mod transaction_repo;
mod user_repo;

pub fn create_repos() -> Repos {
    Repos::from_store(Arc::new(MemRepo::new()))
}

#[derive(Default)]
struct State {
    users: HashSet<String>,
    transactions: HashMap<i32, Transaction>,
    user_transactions: HashMap<String, HashSet<i32>>,
    tags: HashMap<i32, Tag>,
    user_tags: HashMap<String, HashSet<i32>>,
    recurring_transactions: HashMap<i32, RecurringTransaction>,
    user_recurring_transactions: HashMap<String, HashSet<i32>>,
    next_id: i32,
}

impl State {
    /// Ids start at 1, like a database sequence.
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    /// The user's transactions, most recent first.
    fn transactions_of(&self, user: &str) -> Vec<&Transaction> {
        let Some(transaction_ids) = self.user_transactions.get(user) else {
            return Vec::new();
        };

        let mut transactions: Vec<&Transaction> = transaction_ids
            .iter()
            .map(|id| {
                self.transactions
                    .get(id)
                    .expect("transactions should have all the ids from user_transactions")
            })
            .collect();
        transactions.sort_by(|a, b| b.cmp(a));
        transactions
    }

    fn owns_transaction(&self, user: &str, transaction_id: i32) -> bool {
        self.user_transactions
            .get(user)
            .is_some_and(|ids| ids.contains(&transaction_id))
    }
}

pub struct MemRepo {
    state: RwLock<State>,
}

impl MemRepo {
    pub fn new() -> MemRepo {
        MemRepo {
            state: RwLock::new(State::default()),
        }
    }

    fn read_lock(&self) -> Result<RwLockReadGuard<State>, anyhow::Error> {
        self.state
            .read()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<State>, anyhow::Error> {
        self.state
            .write()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }
}

impl Default for MemRepo {
    fn default() -> Self {
        MemRepo::new()
    }
}
