mod utils;

use budget_repo::candidate_repo::{AmountPattern, CandidateRepo, LabelledTarget, TargetUsage};
use budget_repo::recurring_transaction_repo::{NewRecurringTransaction, RecurringTransaction};
use budget_repo::tag_repo::{NewTag, Tag};
use budget_repo::transaction_repo::{NewTransaction, Transaction};
use budget_repo::Repos;
use chrono::NaiveDate;
use rstest::rstest;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::str::FromStr;
use utils::test_user::TestUser;
use utils::RepoType;

/// A small statement history:
///
/// | date       | label                  | amount | tags     | recurring |
/// |------------|------------------------|--------|----------|-----------|
/// | 2024-03-12 | CARTE CARREFOUR MARKET |  12.00 | Courses  |           |
/// | 2024-03-10 | CARTE CARREFOUR        |  -8.50 | Courses  |           |
/// | 2024-03-05 | PRLV EDF ENERGIE       | -50.00 | Energie  | EDF       |
/// | 2024-02-05 | PRLV EDF ENERGIE       | -60.00 | Energie  | EDF       |
/// | 2024-01-05 | PRLV EDF ENERGIE       | -55.00 |          |           |
struct History {
    user: TestUser,
    courses: Tag,
    energie: Tag,
    edf: RecurringTransaction,
    transactions: Vec<Transaction>,
}

async fn seed_history(repos: &Repos) -> History {
    let user = TestUser::new(&repos.user_repo).await;
    let courses = repos
        .tag_repo
        .create_tag(&user.id, NewTag::new("Courses".to_string(), "#3cb44b".to_string()))
        .await
        .unwrap();
    let energie = repos
        .tag_repo
        .create_tag(&user.id, NewTag::new("Energie".to_string(), "#ffe119".to_string()))
        .await
        .unwrap();
    let edf = repos
        .recurring_transaction_repo
        .create_recurring_transaction(&user.id, NewRecurringTransaction::new("EDF".to_string()))
        .await
        .unwrap();

    let rows = [
        ("2024-03-12", "CARTE CARREFOUR MARKET", "12.00", Some(courses.id), None),
        ("2024-03-10", "CARTE CARREFOUR", "-8.50", Some(courses.id), None),
        ("2024-03-05", "PRLV EDF ENERGIE", "-50.00", Some(energie.id), Some(edf.id)),
        ("2024-02-05", "PRLV EDF ENERGIE", "-60.00", Some(energie.id), Some(edf.id)),
        ("2024-01-05", "PRLV EDF ENERGIE", "-55.00", None, None),
    ];
    let mut transactions = Vec::new();
    for (date, label, amount, tag, recurring) in rows {
        let new_transaction = NewTransaction::new(
            label.to_string(),
            Decimal::from_str(amount).unwrap(),
            NaiveDate::from_str(date).unwrap(),
            tag.into_iter().collect(),
            recurring,
        );
        let transaction = repos
            .transaction_repo
            .create_new_transaction(&user.id, new_transaction)
            .await
            .unwrap();
        transactions.push(transaction);
    }

    History {
        user,
        courses,
        energie,
        edf,
        transactions,
    }
}

fn tag_ids(tags: &[Tag]) -> Vec<i32> {
    tags.iter().map(|t| t.id).collect()
}

fn usage_counts<T>(usages: &[TargetUsage<T>], id: impl Fn(&T) -> i32) -> Vec<(i32, u64)> {
    usages.iter().map(|u| (id(&u.target), u.count)).collect()
}

#[rstest]
#[case::mem(RepoType::Mem)]
#[ignore]
#[case::sqlx(RepoType::SQLx)]
#[actix_rt::test]
async fn test_exact_label_matches(#[case] repo_type: RepoType) {
    let repos = utils::build_repos(repo_type).await;
    let history = seed_history(&repos).await;

    let matches = repos
        .tag_candidates
        .exact_label_matches(&history.user.id, "PRLV EDF ENERGIE", None)
        .await
        .unwrap();
    assert_eq!(matches.total, 3);
    assert_eq!(
        matches.targets,
        vec![TargetUsage::new(history.energie.clone(), 2)]
    );

    let excluded = repos
        .tag_candidates
        .exact_label_matches(
            &history.user.id,
            "PRLV EDF ENERGIE",
            Some(history.transactions[2].id),
        )
        .await
        .unwrap();
    assert_eq!(excluded.total, 2);
    assert_eq!(
        excluded.targets,
        vec![TargetUsage::new(history.energie.clone(), 1)]
    );

    let case_differs = repos
        .tag_candidates
        .exact_label_matches(&history.user.id, "prlv edf energie", None)
        .await
        .unwrap();
    assert_eq!(case_differs.total, 0);
    assert!(case_differs.targets.is_empty());

    history.user.delete().await;
}

#[rstest]
#[case::mem(RepoType::Mem)]
#[ignore]
#[case::sqlx(RepoType::SQLx)]
#[actix_rt::test]
async fn test_exact_label_matches_recurring(#[case] repo_type: RepoType) {
    let repos = utils::build_repos(repo_type).await;
    let history = seed_history(&repos).await;

    let matches = repos
        .recurring_candidates
        .exact_label_matches(&history.user.id, "PRLV EDF ENERGIE", None)
        .await
        .unwrap();
    assert_eq!(matches.total, 3);
    assert_eq!(matches.targets, vec![TargetUsage::new(history.edf.clone(), 2)]);

    history.user.delete().await;
}

#[rstest]
#[case::mem(RepoType::Mem)]
#[ignore]
#[case::sqlx(RepoType::SQLx)]
#[actix_rt::test]
async fn test_labelled_targets_window(#[case] repo_type: RepoType) {
    let repos = utils::build_repos(repo_type).await;
    let history = seed_history(&repos).await;

    let labelled = repos
        .tag_candidates
        .labelled_targets(&history.user.id, None, 3)
        .await
        .unwrap();
    assert_eq!(
        labelled,
        vec![
            LabelledTarget {
                label: "CARTE CARREFOUR MARKET".to_string(),
                target: history.courses.clone(),
            },
            LabelledTarget {
                label: "CARTE CARREFOUR".to_string(),
                target: history.courses.clone(),
            },
            LabelledTarget {
                label: "PRLV EDF ENERGIE".to_string(),
                target: history.energie.clone(),
            },
        ]
    );

    let excluded = repos
        .tag_candidates
        .labelled_targets(&history.user.id, Some(history.transactions[0].id), 1)
        .await
        .unwrap();
    assert_eq!(excluded.len(), 1);
    assert_eq!(excluded[0].label, "CARTE CARREFOUR");

    history.user.delete().await;
}

#[rstest]
#[case::mem(RepoType::Mem)]
#[ignore]
#[case::sqlx(RepoType::SQLx)]
#[actix_rt::test]
async fn test_keyword_targets(#[case] repo_type: RepoType) {
    let repos = utils::build_repos(repo_type).await;
    let history = seed_history(&repos).await;

    let carrefour = repos
        .tag_candidates
        .keyword_targets(&history.user.id, "CARREFOUR", None, 30)
        .await
        .unwrap();
    assert_eq!(tag_ids(&carrefour), vec![history.courses.id]);

    let edf = repos
        .tag_candidates
        .keyword_targets(&history.user.id, "edf", None, 30)
        .await
        .unwrap();
    assert_eq!(tag_ids(&edf), vec![history.energie.id]);

    let unknown = repos
        .tag_candidates
        .keyword_targets(&history.user.id, "NETFLIX", None, 30)
        .await
        .unwrap();
    assert!(unknown.is_empty());

    let recurring = repos
        .recurring_candidates
        .keyword_targets(&history.user.id, "EDF", None, 10)
        .await
        .unwrap();
    assert_eq!(recurring, vec![history.edf.clone()]);

    history.user.delete().await;
}

#[rstest]
#[case::mem(RepoType::Mem)]
#[ignore]
#[case::sqlx(RepoType::SQLx)]
#[actix_rt::test]
async fn test_most_used_targets(#[case] repo_type: RepoType) {
    let repos = utils::build_repos(repo_type).await;
    let history = seed_history(&repos).await;
    let unused = repos
        .tag_repo
        .create_tag(&history.user.id, NewTag::new("Loisirs".to_string(), "#911eb4".to_string()))
        .await
        .unwrap();

    let usages = repos
        .tag_candidates
        .most_used_targets(&history.user.id, 10)
        .await
        .unwrap();
    // Equal counts are ordered by name.
    assert_eq!(
        usage_counts(&usages, |t: &Tag| t.id),
        vec![(history.courses.id, 2), (history.energie.id, 2)]
    );
    assert!(usages.iter().all(|u| u.target.id != unused.id));

    let limited = repos
        .tag_candidates
        .most_used_targets(&history.user.id, 1)
        .await
        .unwrap();
    assert_eq!(limited.len(), 1);

    history.user.delete().await;
}

#[rstest]
#[case::mem(RepoType::Mem)]
#[ignore]
#[case::sqlx(RepoType::SQLx)]
#[actix_rt::test]
async fn test_amount_targets(#[case] repo_type: RepoType) {
    let repos = utils::build_repos(repo_type).await;
    let history = seed_history(&repos).await;

    let positive = repos
        .tag_candidates
        .amount_targets(&history.user.id, AmountPattern::Positive, None, 5)
        .await
        .unwrap();
    assert_eq!(
        usage_counts(&positive, |t: &Tag| t.id),
        vec![(history.courses.id, 1)]
    );

    let small = repos
        .tag_candidates
        .amount_targets(&history.user.id, AmountPattern::AbsBelow(Decimal::TEN), None, 5)
        .await
        .unwrap();
    assert_eq!(
        usage_counts(&small, |t: &Tag| t.id),
        vec![(history.courses.id, 1)]
    );

    let around_fifty_five = AmountPattern::Between(Decimal::from(-61), Decimal::from(-49));
    let recurring = repos
        .recurring_candidates
        .amount_targets(&history.user.id, around_fifty_five, None, 5)
        .await
        .unwrap();
    assert_eq!(
        usage_counts(&recurring, |r: &RecurringTransaction| r.id),
        vec![(history.edf.id, 2)]
    );

    let excluded = repos
        .tag_candidates
        .amount_targets(
            &history.user.id,
            AmountPattern::Positive,
            Some(history.transactions[0].id),
            5,
        )
        .await
        .unwrap();
    assert!(excluded.is_empty());

    history.user.delete().await;
}

#[rstest]
#[case::mem(RepoType::Mem)]
#[ignore]
#[case::sqlx(RepoType::SQLx)]
#[actix_rt::test]
async fn test_targets_of_other_users_are_skipped(#[case] repo_type: RepoType) {
    let repos = utils::build_repos(repo_type).await;
    let history = seed_history(&repos).await;
    let other_user = TestUser::new(&repos.user_repo).await;
    let foreign = repos
        .tag_repo
        .create_tag(&other_user.id, NewTag::new("Voyage".to_string(), "#46f0f0".to_string()))
        .await
        .unwrap();

    let new_transaction = NewTransaction::new(
        "CARTE SNCF".to_string(),
        Decimal::from(-42),
        NaiveDate::from_str("2024-03-20").unwrap(),
        HashSet::from([foreign.id, history.courses.id]),
        None,
    );
    repos
        .transaction_repo
        .create_new_transaction(&history.user.id, new_transaction)
        .await
        .unwrap();

    let matches = repos
        .tag_candidates
        .exact_label_matches(&history.user.id, "CARTE SNCF", None)
        .await
        .unwrap();
    assert_eq!(matches.total, 1);
    assert_eq!(
        matches.targets,
        vec![TargetUsage::new(history.courses.clone(), 1)]
    );

    let usages = repos
        .tag_candidates
        .most_used_targets(&history.user.id, 10)
        .await
        .unwrap();
    assert!(usages.iter().all(|u| u.target.id != foreign.id));

    history.user.delete().await;
    other_user.delete().await;
}

#[rstest]
#[case::mem(RepoType::Mem)]
#[ignore]
#[case::sqlx(RepoType::SQLx)]
#[actix_rt::test]
async fn test_candidates_of_user_without_history(#[case] repo_type: RepoType) {
    let repos = utils::build_repos(repo_type).await;
    let user = TestUser::new(&repos.user_repo).await;

    let matches = repos
        .tag_candidates
        .exact_label_matches(&user.id, "PRLV EDF ENERGIE", None)
        .await
        .unwrap();
    assert_eq!(matches.total, 0);
    assert!(repos
        .tag_candidates
        .labelled_targets(&user.id, None, 200)
        .await
        .unwrap()
        .is_empty());
    assert!(repos
        .recurring_candidates
        .most_used_targets(&user.id, 5)
        .await
        .unwrap()
        .is_empty());

    user.delete().await;
}
