use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ResponseError,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use sqlx::PgPool;
use std::rc::Rc;

use crate::auth::extractors::Session;
use crate::auth::token::TokenSigner;
use crate::error::AppError;
use crate::store;

/// Authentication gate for protected routes.
///
/// Resolves the `Authorization: Bearer <token>` header to a [`Session`] and
/// stores it in the request extensions. A session is only granted when the
/// token's signature verifies, it is unexpired, AND the token is still present
/// in the user's active-token collection — the last check is what makes logout
/// an effective revocation rather than a client-side courtesy.
///
/// Every failure path (missing or malformed header, bad signature, expired or
/// revoked token, unknown user, even a store failure during the lookup)
/// produces one byte-identical 401 response. The cause is deliberately not
/// disclosed.
pub struct AuthGate {
    signer: TokenSigner,
}

impl AuthGate {
    pub fn new(signer: TokenSigner) -> Self {
        Self { signer }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthGateService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGateService {
            service: Rc::new(service),
            signer: self.signer.clone(),
        }))
    }
}

pub struct AuthGateService<S> {
    service: Rc<S>,
    signer: TokenSigner,
}

impl<S, B> Service<ServiceRequest> for AuthGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let signer = self.signer.clone();

        Box::pin(async move {
            let session = match authenticate(&signer, &req).await {
                Ok(session) => session,
                Err(_) => return Ok(unauthorized(req)),
            };

            req.extensions_mut().insert(session);

            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}

/// Runs the full gate algorithm: header extraction, signature/expiry
/// verification, then the revocation check against the active-token
/// collection. The error carries no cause on purpose.
async fn authenticate(signer: &TokenSigner, req: &ServiceRequest) -> Result<Session, AppError> {
    let token = bearer_token(req).ok_or_else(AppError::unauthenticated)?;
    let claims = signer.verify(&token)?;

    let pool = req
        .app_data::<web::Data<PgPool>>()
        .ok_or_else(AppError::unauthenticated)?;

    let user = store::users::find_by_id_and_token(pool.get_ref(), claims.sub, &token)
        .await
        .map_err(|_| AppError::unauthenticated())?
        .ok_or_else(AppError::unauthenticated)?;

    // The raw token is kept alongside the user so single-session logout can
    // remove exactly this credential.
    Ok(Session { user, token })
}

fn unauthorized<B>(req: ServiceRequest) -> ServiceResponse<EitherBody<B>> {
    let response = AppError::unauthenticated().error_response();
    req.into_response(response).map_into_right_body()
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App, HttpResponse};
    use pretty_assertions::assert_eq;

    // These tests exercise the failure paths that never reach the store, so no
    // database pool is required.
    async fn response_for(header: Option<&str>) -> (u16, actix_web::web::Bytes) {
        let app = test::init_service(
            App::new().service(
                web::scope("")
                    .wrap(AuthGate::new(TokenSigner::new("middleware-test-secret")))
                    .route(
                        "/protected",
                        web::get().to(|| async { HttpResponse::Ok().finish() }),
                    ),
            ),
        )
        .await;

        let mut req = test::TestRequest::get().uri("/protected");
        if let Some(value) = header {
            req = req.append_header(("Authorization", value));
        }
        let resp = test::call_service(&app, req.to_request()).await;
        let status = resp.status().as_u16();
        (status, test::read_body(resp).await)
    }

    #[actix_rt::test]
    async fn test_missing_header_is_rejected() {
        let (status, body) = response_for(None).await;
        assert_eq!(status, 401);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["message"], "Please authenticate.");
    }

    #[actix_rt::test]
    async fn test_malformed_scheme_is_rejected() {
        let (status, _) = response_for(Some("Basic dXNlcjpwYXNz")).await;
        assert_eq!(status, 401);
    }

    #[actix_rt::test]
    async fn test_failure_responses_are_byte_identical() {
        // Missing header, garbage token, and a token signed with another
        // secret must produce indistinguishable responses.
        let (_, missing_header) = response_for(None).await;
        let (_, garbage) = response_for(Some("Bearer not-a-jwt")).await;

        let foreign = TokenSigner::new("some-other-secret")
            .issue(uuid::Uuid::new_v4())
            .unwrap();
        let (_, bad_signature) = response_for(Some(&format!("Bearer {}", foreign))).await;

        assert_eq!(missing_header, garbage);
        assert_eq!(garbage, bad_signature);
    }
}
