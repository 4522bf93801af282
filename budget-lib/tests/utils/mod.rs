use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use rstest::*;
use rust_decimal::Decimal;
use tracing::info;
use tracing::Level;
use uuid::Uuid;

use budget_lib::user::UserId;
use budget_repo::recurring_transaction_repo::{NewRecurringTransaction, RecurringTransaction};
use budget_repo::tag_repo::{NewTag, Tag};
use budget_repo::transaction_repo::{NewTransaction, Transaction};
use budget_repo::user_repo::{User, UserRepo};
use budget_repo::Repos;

#[allow(unused_macros)]
macro_rules! build_app {
    ($repos:expr, $config:expr) => {{
        let repos: budget_repo::Repos = $repos;
        let config: budget_lib::config::RecommendationConfig = $config;
        let app = actix_web::App::new()
            .app_data(actix_web::web::Data::new(repos.transaction_repo.clone()))
            .app_data(actix_web::web::Data::new(
                budget_lib::recommendation::TagRecommender::new(
                    repos.tag_candidates.clone(),
                    config.clone(),
                ),
            ))
            .app_data(actix_web::web::Data::new(
                budget_lib::recommendation::RecurringTransactionRecommender::new(
                    repos.recurring_candidates.clone(),
                    config,
                ),
            ))
            .wrap(budget_lib::tracing::create_middleware())
            .service(
                budget_lib::recommendation::recommendation_service().wrap(
                    budget_lib::user::TrustedHeaderAuth::new(
                        budget_lib::config::DEFAULT_USER_HEADER,
                    )
                    .unwrap(),
                ),
            );
        tracing::info!("Built app");
        app
    }};
}

pub struct TestUser {
    pub user_id: UserId,
    repo: Arc<dyn UserRepo>,
}

impl TestUser {
    pub async fn new(user_repo: Arc<dyn UserRepo>) -> TestUser {
        let user_id = "test-user-".to_owned() + &Uuid::new_v4().to_string();
        user_repo
            .create_user(User::new(user_id.clone()))
            .await
            .unwrap();
        info!(%user_id, "Created user");
        TestUser {
            user_id,
            repo: user_repo,
        }
    }

    pub async fn delete(&self) {
        self.repo.delete_user(&self.user_id).await.unwrap()
    }
}

#[fixture]
#[once]
pub fn tracing_setup() -> () {
    tracing_subscriber::fmt()
        .pretty()
        .with_max_level(Level::DEBUG)
        .init();
    info!("tracing initialized");
}

#[fixture]
pub fn repos() -> Repos {
    budget_repo::mem_repo::create_repos()
}

#[allow(dead_code)]
pub async fn create_tag(repos: &Repos, user: &TestUser, name: &str) -> Tag {
    repos
        .tag_repo
        .create_tag(&user.user_id, NewTag::new(name.to_string(), "#4363d8".to_string()))
        .await
        .unwrap()
}

#[allow(dead_code)]
pub async fn create_recurring_transaction(
    repos: &Repos,
    user: &TestUser,
    name: &str,
) -> RecurringTransaction {
    repos
        .recurring_transaction_repo
        .create_recurring_transaction(&user.user_id, NewRecurringTransaction::new(name.to_string()))
        .await
        .unwrap()
}

#[allow(dead_code)]
pub async fn create_transaction(
    repos: &Repos,
    user: &TestUser,
    label: &str,
    amount: &str,
    date: &str,
    tags: &[i32],
    recurring_transaction_id: Option<i32>,
) -> Transaction {
    let new_transaction = NewTransaction::new(
        label.to_string(),
        Decimal::from_str(amount).unwrap(),
        NaiveDate::from_str(date).unwrap(),
        tags.iter().copied().collect::<HashSet<i32>>(),
        recurring_transaction_id,
    );
    repos
        .transaction_repo
        .create_new_transaction(&user.user_id, new_transaction)
        .await
        .unwrap()
}

/// Monthly electricity bills and a couple of supermarket receipts. `subject` is this month's
/// bill, not categorized yet.
#[allow(dead_code)]
pub struct EnergyHistory {
    pub energie: Tag,
    pub courses: Tag,
    pub edf: RecurringTransaction,
    pub subject: Transaction,
}

#[allow(dead_code)]
pub async fn seed_energy_history(repos: &Repos, user: &TestUser) -> EnergyHistory {
    let energie = create_tag(repos, user, "Energie").await;
    let courses = create_tag(repos, user, "Courses").await;
    let edf = create_recurring_transaction(repos, user, "EDF").await;

    let bills = [
        ("2024-01-05", "-52.10"),
        ("2024-02-05", "-48.30"),
        ("2024-03-05", "-50.00"),
    ];
    for (date, amount) in bills {
        create_transaction(
            repos,
            user,
            "PRLV EDF ENERGIE",
            amount,
            date,
            &[energie.id],
            Some(edf.id),
        )
        .await;
    }
    create_transaction(repos, user, "PRLV EDF ENERGIE", "-51.00", "2023-12-05", &[], None).await;
    create_transaction(repos, user, "CARTE CARREFOUR", "-23.40", "2024-03-08", &[courses.id], None)
        .await;
    create_transaction(repos, user, "CARTE CARREFOUR", "-41.00", "2024-03-15", &[courses.id], None)
        .await;

    let subject =
        create_transaction(repos, user, "PRLV EDF ENERGIE", "-49.90", "2024-04-05", &[], None).await;

    EnergyHistory {
        energie,
        courses,
        edf,
        subject,
    }
}
