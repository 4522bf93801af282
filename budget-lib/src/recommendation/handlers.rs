use crate::error::HandlerError;
use crate::recommendation::{
    RecommendationSubject, RecommendationTarget, Recommender, RecurringTransactionRecommender,
    TagRecommender,
};
use crate::user::UserId;
use actix_web::{get, post, web, HttpResponse, Responder, Scope};
use budget_repo::transaction_repo::TransactionRepo;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

pub fn recommendation_service() -> Scope {
    web::scope("")
        .service(recommend_tags)
        .service(recommend_recurring_transactions)
        .service(recommend_for_draft)
}

#[derive(Deserialize)]
pub struct LimitQuery {
    limit: Option<usize>,
}

/// A transaction that is not stored yet, such as a line of a bank statement being imported.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct TransactionDraft {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub tags: HashSet<i32>,
    #[serde(default)]
    pub recurring_transaction_id: Option<i32>,
}

async fn recommend_for_transaction<T: RecommendationTarget>(
    transaction_repo: &dyn TransactionRepo,
    recommender: &Recommender<T>,
    user_id: &str,
    transaction_id: i32,
    limit: Option<usize>,
) -> Result<HttpResponse, HandlerError> {
    let transaction = transaction_repo
        .get_transaction(user_id, transaction_id)
        .await?;
    let subject = RecommendationSubject::from_transaction(user_id, &transaction);
    let limit = limit.unwrap_or_else(|| recommender.default_limit());

    let recommendations = recommender.recommend(&subject, limit).await?;
    Ok(HttpResponse::Ok().json(recommendations))
}

#[get("/transactions/{transaction_id}/recommendations/tags")]
pub async fn recommend_tags(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    recommender: web::Data<TagRecommender>,
    user_id: web::ReqData<UserId>,
    transaction_id: web::Path<i32>,
    query: web::Query<LimitQuery>,
) -> Result<impl Responder, HandlerError> {
    recommend_for_transaction(
        transaction_repo.get_ref().as_ref(),
        recommender.get_ref(),
        &user_id.into_inner(),
        transaction_id.into_inner(),
        query.limit,
    )
    .await
}

#[get("/transactions/{transaction_id}/recommendations/recurring-transactions")]
pub async fn recommend_recurring_transactions(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    recommender: web::Data<RecurringTransactionRecommender>,
    user_id: web::ReqData<UserId>,
    transaction_id: web::Path<i32>,
    query: web::Query<LimitQuery>,
) -> Result<impl Responder, HandlerError> {
    recommend_for_transaction(
        transaction_repo.get_ref().as_ref(),
        recommender.get_ref(),
        &user_id.into_inner(),
        transaction_id.into_inner(),
        query.limit,
    )
    .await
}

#[post("/recommendations")]
pub async fn recommend_for_draft(
    tag_recommender: web::Data<TagRecommender>,
    recurring_recommender: web::Data<RecurringTransactionRecommender>,
    user_id: web::ReqData<UserId>,
    query: web::Query<LimitQuery>,
    draft: web::Json<TransactionDraft>,
) -> Result<impl Responder, HandlerError> {
    let subject = RecommendationSubject::from_draft(&user_id.into_inner(), draft.into_inner());

    let tags = tag_recommender
        .recommend(
            &subject,
            query.limit.unwrap_or_else(|| tag_recommender.default_limit()),
        )
        .await?;
    let recurring_transactions = recurring_recommender
        .recommend(
            &subject,
            query
                .limit
                .unwrap_or_else(|| recurring_recommender.default_limit()),
        )
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "tags": tags,
        "recurring_transactions": recurring_transactions,
    })))
}
