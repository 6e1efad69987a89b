//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use nid::Nanoid;
use platform::password::HashedPassword;
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::entity::{credential::Credential, session::AuthSession, user::User};
use crate::domain::repository::{CredentialRepository, SessionRepository, UserRepository};
use crate::domain::value_object::{
    account_type::AccountType, email::Email, one_shot_token::OneShotToken, public_id::PublicId,
    totp_secret::TotpSecret, user_id::UserId,
};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: &User, credential: &Credential) -> AuthResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                public_id,
                name,
                email,
                image,
                keywords,
                account_type,
                is_verified,
                last_login_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.public_id.as_str())
        .bind(&user.name)
        .bind(user.email.as_str())
        .bind(&user.image)
        .bind(&user.keywords)
        .bind(user.account_type.id())
        .bind(user.is_verified)
        .bind(user.last_login_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO auth_credentials (
                user_id,
                password_hash,
                totp_secret,
                totp_enabled,
                verify_token,
                verify_token_expiry,
                reset_token,
                reset_token_expiry,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(credential.user_id.as_uuid())
        .bind(credential.password_hash.as_ref().map(|h| h.as_phc_string()))
        .bind(credential.totp_secret.as_base32())
        .bind(credential.totp_enabled)
        .bind(credential.verify_token.as_ref().map(|t| t.as_str()))
        .bind(credential.verify_token.as_ref().map(|t| t.expires_at()))
        .bind(credential.reset_token.as_ref().map(|t| t.as_str()))
        .bind(credential.reset_token.as_ref().map(|t| t.expires_at()))
        .bind(credential.created_at)
        .bind(credential.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "{USER_COLUMNS} WHERE user_id = $1"
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "{USER_COLUMNS} WHERE public_id = $1"
        ))
        .bind(public_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "{USER_COLUMNS} WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)",
        )
        .bind(email.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                name = $2,
                image = $3,
                keywords = $4,
                is_verified = $5,
                last_login_at = $6,
                updated_at = $7
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(&user.name)
        .bind(&user.image)
        .bind(&user.keywords)
        .bind(user.is_verified)
        .bind(user.last_login_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Credential Repository Implementation
// ============================================================================

impl CredentialRepository for PgAuthRepository {
    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<Credential>> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT
                user_id,
                password_hash,
                totp_secret,
                totp_enabled,
                verify_token,
                verify_token_expiry,
                reset_token,
                reset_token_expiry,
                created_at,
                updated_at
            FROM auth_credentials
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_credential()).transpose()
    }

    async fn update(&self, credential: &Credential) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE auth_credentials SET
                password_hash = $2,
                totp_secret = $3,
                totp_enabled = $4,
                verify_token = $5,
                verify_token_expiry = $6,
                reset_token = $7,
                reset_token_expiry = $8,
                updated_at = $9
            WHERE user_id = $1
            "#,
        )
        .bind(credential.user_id.as_uuid())
        .bind(credential.password_hash.as_ref().map(|h| h.as_phc_string()))
        .bind(credential.totp_secret.as_base32())
        .bind(credential.totp_enabled)
        .bind(credential.verify_token.as_ref().map(|t| t.as_str()))
        .bind(credential.verify_token.as_ref().map(|t| t.expires_at()))
        .bind(credential.reset_token.as_ref().map(|t| t.as_str()))
        .bind(credential.reset_token.as_ref().map(|t| t.expires_at()))
        .bind(credential.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn consume_verify_token(&self, token: &str) -> AuthResult<Option<UserId>> {
        // Single statement so two concurrent consumers race on the row
        // lock and exactly one sees the token still present.
        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            WITH consumed AS (
                UPDATE auth_credentials
                SET verify_token = NULL,
                    verify_token_expiry = NULL,
                    updated_at = now()
                WHERE verify_token = $1 AND verify_token_expiry > now()
                RETURNING user_id
            )
            UPDATE users
            SET is_verified = TRUE, updated_at = now()
            WHERE user_id IN (SELECT user_id FROM consumed)
            RETURNING user_id
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user_id.map(UserId::from_uuid))
    }

    async fn consume_reset_token(
        &self,
        user_id: &UserId,
        token: &str,
        new_hash: &HashedPassword,
    ) -> AuthResult<bool> {
        let affected = sqlx::query(
            r#"
            UPDATE auth_credentials
            SET password_hash = $3,
                reset_token = NULL,
                reset_token_expiry = NULL,
                updated_at = now()
            WHERE user_id = $1 AND reset_token = $2 AND reset_token_expiry > now()
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(token)
        .bind(new_hash.as_phc_string())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected == 1)
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAuthRepository {
    async fn create(&self, session: &AuthSession) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO auth_sessions (
                session_id,
                user_id,
                public_id,
                expires_at_ms,
                created_at
            ) VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(session.session_id)
        .bind(session.user_id.as_uuid())
        .bind(session.public_id.as_str())
        .bind(session.expires_at_ms)
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, session_id: Uuid) -> AuthResult<Option<AuthSession>> {
        let now_ms = Utc::now().timestamp_millis();

        let row = sqlx::query_as::<_, AuthSessionRow>(
            r#"
            SELECT
                session_id,
                user_id,
                public_id,
                expires_at_ms,
                created_at
            FROM auth_sessions
            WHERE session_id = $1 AND expires_at_ms > $2
            "#,
        )
        .bind(session_id)
        .bind(now_ms)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_session()).transpose()
    }

    async fn delete(&self, session_id: Uuid) -> AuthResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let deleted = sqlx::query("DELETE FROM auth_sessions WHERE expires_at_ms < $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired auth sessions");

        Ok(deleted)
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

const USER_COLUMNS: &str = r#"
    SELECT
        user_id,
        public_id,
        name,
        email,
        image,
        keywords,
        account_type,
        is_verified,
        last_login_at,
        created_at,
        updated_at
    FROM users
"#;

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    public_id: String,
    name: String,
    email: String,
    image: Option<String>,
    keywords: Vec<String>,
    account_type: i16,
    is_verified: bool,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let public_id = PublicId::from_nanoid(
            Nanoid::from_str(&self.public_id)
                .map_err(|e| AuthError::Internal(format!("Invalid public_id: {}", e)))?,
        );

        let account_type = AccountType::from_id(self.account_type)
            .ok_or_else(|| AuthError::Internal(format!("Invalid account_type: {}", self.account_type)))?;

        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            public_id,
            name: self.name,
            email: Email::from_db(self.email),
            image: self.image,
            keywords: self.keywords,
            account_type,
            is_verified: self.is_verified,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    user_id: Uuid,
    password_hash: Option<String>,
    totp_secret: String,
    totp_enabled: bool,
    verify_token: Option<String>,
    verify_token_expiry: Option<DateTime<Utc>>,
    reset_token: Option<String>,
    reset_token_expiry: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CredentialRow {
    fn into_credential(self) -> AuthResult<Credential> {
        let password_hash = self
            .password_hash
            .map(HashedPassword::from_phc_string)
            .transpose()
            .map_err(|e| AuthError::Internal(format!("Invalid password hash: {}", e)))?;

        let totp_secret = TotpSecret::from_base32(self.totp_secret)
            .map_err(|e| AuthError::Internal(format!("Invalid TOTP secret: {}", e)))?;

        Ok(Credential {
            user_id: UserId::from_uuid(self.user_id),
            password_hash,
            totp_secret,
            totp_enabled: self.totp_enabled,
            verify_token: token_from_columns(self.verify_token, self.verify_token_expiry)?,
            reset_token: token_from_columns(self.reset_token, self.reset_token_expiry)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn token_from_columns(
    value: Option<String>,
    expiry: Option<DateTime<Utc>>,
) -> AuthResult<Option<OneShotToken>> {
    match (value, expiry) {
        (Some(value), Some(expiry)) => {
            let nanoid = Nanoid::from_str(&value)
                .map_err(|e| AuthError::Internal(format!("Invalid token value: {}", e)))?;
            Ok(Some(OneShotToken::from_parts(nanoid, expiry)))
        }
        _ => Ok(None),
    }
}

#[derive(sqlx::FromRow)]
struct AuthSessionRow {
    session_id: Uuid,
    user_id: Uuid,
    public_id: String,
    expires_at_ms: i64,
    created_at: DateTime<Utc>,
}

impl AuthSessionRow {
    fn into_session(self) -> AuthResult<AuthSession> {
        let public_id = PublicId::from_nanoid(
            Nanoid::from_str(&self.public_id)
                .map_err(|e| AuthError::Internal(format!("Invalid public_id: {}", e)))?,
        );

        Ok(AuthSession {
            session_id: self.session_id,
            user_id: UserId::from_uuid(self.user_id),
            public_id,
            expires_at_ms: self.expires_at_ms,
            created_at: self.created_at,
        })
    }
}
