use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

const GENERIC_SERVER_MESSAGE: &str = "Something went wrong, please try again later.";

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    /// A duplicate value for a unique field.
    pub fn conflict<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    /// Missing, malformed or expired bearer token.
    pub fn unauthorized<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNAUTHORIZED, err)
    }

    /// Credentials were supplied but rejected.
    pub fn forbidden<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::FORBIDDEN, err)
    }

    /// Converts a failed insert/update into a conflict when a unique index
    /// rejected it, otherwise into a 500 carrying `context`.
    pub fn from_write(err: sqlx::Error, conflict: &'static str, context: &'static str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::conflict(anyhow::anyhow!(conflict));
            }
        }
        Self::internal(Error::new(err).context(context))
    }

    /// Message shown to the client.
    ///
    /// Server errors only expose the outermost context attached with
    /// [`anyhow::Context`]; bare driver errors are replaced by a generic text.
    pub fn message(&self) -> String {
        if self.status.is_server_error() && self.error.chain().count() < 2 {
            GENERIC_SERVER_MESSAGE.to_string()
        } else {
            self.error.to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = %self.status,
                error = %format!("{:#}", self.error),
                "Request failed"
            );
        }

        let body = Json(json!({
            "message": self.message()
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, anyhow};
    use http_body_util::BodyExt;

    async fn body_message(err: AppError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, body["message"].as_str().unwrap().to_string())
    }

    #[test]
    fn test_constructors_set_status() {
        assert_eq!(AppError::not_found(anyhow!("x")).status, StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::unprocessable(anyhow!("x")).status,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::conflict(anyhow!("x")).status,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(AppError::bad_request(anyhow!("x")).status, StatusCode::BAD_REQUEST);
        assert_eq!(AppError::unauthorized(anyhow!("x")).status, StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::forbidden(anyhow!("x")).status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_blanket_from_is_internal() {
        let err: AppError = std::io::Error::other("disk on fire").into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_from_write_non_database_error_is_internal() {
        let err = AppError::from_write(sqlx::Error::RowNotFound, "dup", "Saving failed.");
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Saving failed.");
    }

    #[tokio::test]
    async fn test_client_error_body_carries_message() {
        let (status, message) =
            body_message(AppError::not_found(anyhow!("Could not find level."))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(message, "Could not find level.");
    }

    #[tokio::test]
    async fn test_server_error_hides_driver_text() {
        let (status, message) =
            body_message(AppError::internal(anyhow!("relation \"x\" does not exist"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, GENERIC_SERVER_MESSAGE);
    }

    #[tokio::test]
    async fn test_server_error_exposes_outer_context() {
        let failed: Result<(), anyhow::Error> = Err(anyhow!("connection reset"));
        let err = AppError::internal(
            failed
                .context("Creating class failed, please try again.")
                .unwrap_err(),
        );
        let (_, message) = body_message(err).await;
        assert_eq!(message, "Creating class failed, please try again.");
    }
}
