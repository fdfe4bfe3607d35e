use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::models::User;

/// The authenticated session resolved by [`crate::auth::AuthGate`].
///
/// Carries the full user record plus the exact token string the request
/// authenticated with; the latter is what single-session logout removes.
///
/// Using this extractor on a route that is not behind the auth gate yields the
/// uniform 401, the same as any other authentication failure.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

impl FromRequest for Session {
    type Error = ActixError; // AppError converts into ActixError via ResponseError
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Session>().cloned() {
            Some(session) => ready(Ok(session)),
            None => ready(Err(AppError::unauthenticated().into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::dev::Payload;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_session() -> Session {
        Session {
            user: User {
                id: Uuid::new_v4(),
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                password_hash: "$2b$12$hash".to_string(),
                age: 36,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            token: "some.jwt.token".to_string(),
        }
    }

    #[actix_rt::test]
    async fn test_session_extractor_success() {
        let req = test::TestRequest::default().to_http_request();
        let session = sample_session();
        req.extensions_mut().insert(session.clone());

        let mut payload = Payload::None;
        let extracted = Session::from_request(&req, &mut payload).await.unwrap();
        assert_eq!(extracted.user.id, session.user.id);
        assert_eq!(extracted.token, session.token);
    }

    #[actix_rt::test]
    async fn test_session_extractor_failure() {
        let req = test::TestRequest::default().to_http_request();
        // No session inserted into extensions

        let mut payload = Payload::None;
        let result = Session::from_request(&req, &mut payload).await;
        assert!(result.is_err());

        let response = result.unwrap_err().error_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
