use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::HeaderName;
use actix_web::{Error, HttpMessage, HttpResponse};
use anyhow::Context;
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tracing::warn;
use tracing_actix_web::RootSpan;

pub type UserId = String;

/// Trusts an authenticating proxy: the user id is read from a request header set upstream.
/// Requests without the header are rejected with 401. The user id is injected into the request
/// and into the [RootSpan].
#[derive(Clone)]
pub struct TrustedHeaderAuth {
    header: HeaderName,
}

impl TrustedHeaderAuth {
    pub fn new(header: &str) -> Result<TrustedHeaderAuth, anyhow::Error> {
        let header = HeaderName::from_bytes(header.as_bytes())
            .with_context(|| format!("Invalid user header name {:?}", header))?;
        Ok(TrustedHeaderAuth { header })
    }
}

impl<S, B> Transform<S, ServiceRequest> for TrustedHeaderAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = TrustedHeaderAuthMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TrustedHeaderAuthMiddleware {
            service,
            header: self.header.clone(),
        }))
    }
}

pub struct TrustedHeaderAuthMiddleware<S> {
    service: S,
    header: HeaderName,
}

impl<S> TrustedHeaderAuthMiddleware<S> {
    fn user_of(&self, req: &ServiceRequest) -> Option<UserId> {
        let value = req.headers().get(&self.header)?.to_str().ok()?.trim();
        (!value.is_empty()).then(|| value.to_string())
    }
}

impl<S, B> Service<ServiceRequest> for TrustedHeaderAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let Some(user) = self.user_of(&req) else {
            warn!(header = %self.header, path = req.path(), "Request without user");
            let response = req
                .into_response(HttpResponse::Unauthorized().finish())
                .map_into_right_body();
            return Box::pin(async { Ok(response) });
        };

        if let Some(root_span) = req.extensions().get::<RootSpan>() {
            root_span.record("user_id", user.as_str());
        }
        req.extensions_mut().insert::<UserId>(user);

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{TrustedHeaderAuth, UserId};
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use actix_web::{test, web, App, Responder};
    use rstest::rstest;

    macro_rules! build_service {
        () => {{
            let auth = TrustedHeaderAuth::new("X-Authenticated-User").unwrap();
            let app = App::new()
                .route("/", web::get().to(return_user))
                .wrap(auth);
            test::init_service(app).await
        }};
    }

    async fn return_user(user_id: web::ReqData<UserId>) -> impl Responder {
        user_id.into_inner()
    }

    #[rstest]
    #[actix_rt::test]
    async fn header_sets_user() {
        let service = build_service!();

        let request = TestRequest::get()
            .uri("/")
            .insert_header(("X-Authenticated-User", "alice"))
            .to_request();
        let response = test::call_service(&service, request).await;
        assert!(
            response.status().is_success(),
            "Response status is {}",
            response.status()
        );

        let body = test::read_body(response).await;
        assert_eq!("alice".as_bytes(), &body)
    }

    #[rstest]
    #[case::missing(None)]
    #[case::blank(Some("  "))]
    #[actix_rt::test]
    async fn rejects_requests_without_user(#[case] header: Option<&str>) {
        let service = build_service!();

        let mut request = TestRequest::get().uri("/");
        if let Some(value) = header {
            request = request.insert_header(("X-Authenticated-User", value));
        }
        let response = test::call_service(&service, request.to_request()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED)
    }

    #[::core::prelude::v1::test]
    fn invalid_header_name() {
        assert!(TrustedHeaderAuth::new("not a header").is_err());
    }
}
