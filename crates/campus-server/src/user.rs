use axum::extract::FromRequestParts;
use axum::{Extension, RequestPartsExt};
use axum_auth::AuthBearer;
use axum_extra::extract::Cached;
use campus_db::user;
use campus_entity::user::Model as User;
use http::StatusCode;
use http::request::Parts;

use sea_orm::DatabaseConnection;
use std::error::Error;
use url::form_urlencoded;
use uuid::Uuid;

/// Fallback for clients that pass the token as `?access_token=`.
pub fn extract_auth_token_from_params(parts: &Parts) -> Option<String> {
    let query = parts.uri.query()?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "access_token")
        .map(|(_, value)| value.into_owned())
}

type Rejection = (StatusCode, &'static str);

#[derive(Clone)]
struct Session {
    user: User,
}

/// The authenticated account behind the request's access token.
#[derive(Clone)]
pub(crate) struct ExtractUser(pub User);

#[derive(Clone)]
pub(crate) struct ExtractUserId(pub Uuid);

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = match parts.extract::<AuthBearer>().await {
            Ok(AuthBearer(token)) => Some(token),
            Err(_) => extract_auth_token_from_params(parts),
        }
        .ok_or((StatusCode::UNAUTHORIZED, "No authentication token provided"))?;

        let Extension::<DatabaseConnection>(conn) =
            parts
                .extract::<Extension<DatabaseConnection>>()
                .await
                .map_err(|error| {
                    tracing::error!(
                        error = &error as &dyn Error,
                        "database connection not found in app data"
                    );
                    (StatusCode::INTERNAL_SERVER_ERROR, "Database Connection not found")
                })?;

        Self::from_db(&conn, &token).await.map(|user| Self { user })
    }
}

impl Session {
    async fn from_db(conn: &DatabaseConnection, token: &str) -> Result<User, Rejection> {
        let user = user::Query::find_by_token(conn, token)
            .await
            .map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, "Error loading user"))?
            .ok_or((StatusCode::UNAUTHORIZED, "Authentication failed."))?;

        sentry::configure_scope(|scope| {
            scope.set_user(Some(sentry::User {
                id: Some(user.id.as_hyphenated().to_string()),
                username: Some(user.username.clone()),
                ..Default::default()
            }));
        });

        Ok(user)
    }
}

impl<S> FromRequestParts<S> for ExtractUser
where
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session: Session = Cached::<Session>::from_request_parts(parts, state).await?.0;
        Ok(Self(session.user))
    }
}

impl<S> FromRequestParts<S> for ExtractUserId
where
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session: Session = Cached::<Session>::from_request_parts(parts, state).await?.0;
        Ok(Self(session.user.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Request;

    #[test]
    fn test_token_from_query() {
        let (parts, ()) = Request::builder()
            .uri("/api/v0/courses?page=2&access_token=abc%2Ddef")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(extract_auth_token_from_params(&parts).as_deref(), Some("abc-def"));

        let (parts, ()) = Request::builder().uri("/api/v0/courses").body(()).unwrap().into_parts();
        assert!(extract_auth_token_from_params(&parts).is_none());
    }
}
