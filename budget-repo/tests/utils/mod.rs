pub mod generator;
pub mod test_user;

use budget_repo::Repos;
use serde::Deserialize;
use std::fs;

#[derive(Deserialize)]
struct TestConfig {
    database_url: String,
}

#[derive(Debug)]
pub enum RepoType {
    SQLx,
    Mem,
}

pub async fn build_repos(repo_type: RepoType) -> Repos {
    match repo_type {
        RepoType::SQLx => {
            let config = fs::read_to_string("config_test.toml").unwrap();
            let config: TestConfig = toml::from_str(config.as_str()).unwrap();
            budget_repo::sqlx_repo::create_repos(config.database_url, 1)
                .await
                .unwrap()
        }
        RepoType::Mem => budget_repo::mem_repo::create_repos(),
    }
}
