use crate::recommendation::RecommendationError;
use actix_web::body::BoxBody;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use budget_repo::transaction_repo::TransactionRepoError;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error(transparent)]
    TransactionRepo(#[from] TransactionRepoError),
    #[error(transparent)]
    Recommendation(#[from] RecommendationError),
}

impl ResponseError for HandlerError {
    fn status_code(&self) -> StatusCode {
        match self {
            HandlerError::TransactionRepo(TransactionRepoError::TransactionNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            HandlerError::TransactionRepo(TransactionRepoError::DuplicateTransaction { .. }) => {
                StatusCode::CONFLICT
            }
            HandlerError::Recommendation(RecommendationError::Timeout(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = ?self, "Request failed");
        }
        HttpResponse::build(status).finish()
    }
}
