use anyhow::{Context, anyhow};
use sqlx::PgPool;
use tracing::instrument;

use schoolyard_auth::create_access_token;
use schoolyard_config::JwtConfig;
use schoolyard_core::{AppError, hash_password, pin_matches, verify_password};
use schoolyard_db::repositories::{AdminRepository, StudentRepository, TeacherRepository};
use schoolyard_models::{LoginRequest, LoginResponse, SignupDto, SignupResponse, UserType};

use crate::metrics;

const INVALID_CREDENTIALS: &str = "Invalid credentials, could not log you in.";
const USER_EXISTS: &str = "User exists already, please login instead.";

fn invalid_credentials() -> AppError {
    AppError::forbidden(anyhow!(INVALID_CREDENTIALS))
}

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, dto, jwt_config), fields(email = %dto.email))]
    pub async fn signup(
        db: &PgPool,
        dto: SignupDto,
        jwt_config: &JwtConfig,
    ) -> Result<SignupResponse, AppError> {
        let mut conn = db
            .acquire()
            .await
            .context("Signing up failed, please try again later.")?;

        if AdminRepository::email_exists(&mut conn, &dto.email)
            .await
            .context("Signing up failed, please try again later.")?
        {
            return Err(AppError::conflict(anyhow!(USER_EXISTS)));
        }

        let password_hash = hash_password(&dto.password)?;
        let admin = AdminRepository::insert(
            &mut conn,
            &dto.name,
            &dto.email,
            &password_hash,
            dto.is_admin,
        )
        .await
        .map_err(|e| {
            AppError::from_write(e, USER_EXISTS, "Signing up failed, please try again later.")
        })?;

        let token = create_access_token(
            admin.id.into_inner(),
            &admin.email,
            UserType::Admin,
            jwt_config,
        )?;

        tracing::info!(admin_id = %admin.id, "Admin signed up");

        Ok(SignupResponse {
            user_id: admin.id,
            email: admin.email,
            is_admin: admin.is_admin,
            token,
            expires_in: jwt_config.access_token_expiry,
        })
    }

    /// Checks the credentials against the collection selected by
    /// `dto.user_type` and issues an access token.
    #[instrument(skip(db, dto, jwt_config), fields(email = %dto.email, user_type = %dto.user_type))]
    pub async fn login(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let result = Self::authenticate(db, &dto, jwt_config).await;
        metrics::track_login_attempt(dto.user_type.as_str(), result.is_ok());
        result
    }

    async fn authenticate(
        db: &PgPool,
        dto: &LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let mut conn = db
            .acquire()
            .await
            .context("Logging in failed, please try again later.")?;

        let (user_id, email, name, is_admin) = match dto.user_type {
            UserType::Admin => {
                let admin = AdminRepository::credentials_by_email(&mut conn, &dto.email)
                    .await
                    .context("Logging in failed, please try again later.")?
                    .ok_or_else(invalid_credentials)?;

                if !verify_password(&dto.password, &admin.password)? {
                    return Err(invalid_credentials());
                }
                (admin.id.into_inner(), admin.email, admin.name, Some(admin.is_admin))
            }
            UserType::Teacher => {
                let teacher = TeacherRepository::credentials_by_email(&mut conn, &dto.email)
                    .await
                    .context("Logging in failed, please try again later.")?
                    .ok_or_else(invalid_credentials)?;

                if !pin_matches(&dto.password, &teacher.pin_number) {
                    return Err(invalid_credentials());
                }
                let name = format!("{} {}", teacher.first_name, teacher.last_name);
                (teacher.id.into_inner(), teacher.email, name, None)
            }
            UserType::Student => {
                let student = StudentRepository::credentials_by_email(&mut conn, &dto.email)
                    .await
                    .context("Logging in failed, please try again later.")?
                    .ok_or_else(invalid_credentials)?;

                if !pin_matches(&dto.password, &student.pin_number) {
                    return Err(invalid_credentials());
                }
                let name = format!("{} {}", student.first_name, student.last_name);
                (student.id.into_inner(), student.email, name, None)
            }
        };

        let token = create_access_token(user_id, &email, dto.user_type, jwt_config)?;

        Ok(LoginResponse {
            user_id,
            email,
            name,
            user_type: dto.user_type,
            is_admin,
            token,
            expires_in: jwt_config.access_token_expiry,
        })
    }
}
