use anyhow::anyhow;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use schoolyard_auth::{Claims, UserType, verify_token};
use schoolyard_core::AppError;

use crate::state::AppState;

/// The authenticated caller, taken from a verified access token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.0.sub)
            .map_err(|_| AppError::unauthorized(anyhow!("Invalid user ID in token")))
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }

    pub fn user_type(&self) -> UserType {
        self.0.user_type
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized(anyhow!("Missing authorization header")))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::unauthorized(anyhow!("Invalid authorization header format")))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let token = bearer_token(parts)?;
        let claims = verify_token(token, &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}

/// Rejects the request with 401 unless it carries a valid bearer token.
///
/// ```ignore
/// Router::new()
///     .nest("/level", init_levels_router())
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));
/// ```
pub async fn require_auth(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let (mut parts, body) = req.into_parts();

    match AuthUser::from_request_parts(&mut parts, &state).await {
        Ok(user) => {
            parts.extensions.insert(user);
            next.run(Request::from_parts(parts, body)).await
        }
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request as HttpRequest, StatusCode};

    fn claims(sub: &str) -> Claims {
        Claims {
            sub: sub.to_string(),
            email: "head@school.org".to_string(),
            user_type: UserType::Admin,
            exp: 9999999999,
            iat: 1234567890,
        }
    }

    fn parts_with_header(value: Option<&str>) -> Parts {
        let mut builder = HttpRequest::builder().uri("/api/level");
        if let Some(value) = value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_user_id_parses_subject() {
        let id = Uuid::new_v4();
        let user = AuthUser(claims(&id.to_string()));
        assert_eq!(user.user_id().unwrap(), id);
        assert_eq!(user.email(), "head@school.org");
        assert_eq!(user.user_type(), UserType::Admin);
    }

    #[test]
    fn test_invalid_subject_is_unauthorized() {
        let err = AuthUser(claims("not-a-uuid")).user_id().unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(
            bearer_token(&parts_with_header(Some("Bearer abc.def"))).unwrap(),
            "abc.def"
        );

        for header in [None, Some("Basic abc"), Some("Bearer "), Some("abc.def")] {
            let err = bearer_token(&parts_with_header(header)).unwrap_err();
            assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        }
    }
}
