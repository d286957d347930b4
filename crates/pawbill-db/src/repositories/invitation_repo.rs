//! Invitation repository implementation
//!
//! Provides PostgreSQL-backed storage for registration invitations.

use async_trait::async_trait;
use pawbill_core::{models::Invitation, traits::InvitationRepository, AppError, AppResult};
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// PostgreSQL implementation of InvitationRepository
pub struct PgInvitationRepository {
    pool: PgPool,
}

#[derive(FromRow)]
struct InvitationRow {
    id: Uuid,
    email: String,
    token: String,
    created_by: Uuid,
    used_at: Option<chrono::DateTime<chrono::Utc>>,
    expires_at: chrono::DateTime<chrono::Utc>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<InvitationRow> for Invitation {
    fn from(row: InvitationRow) -> Self {
        Invitation {
            id: row.id,
            email: row.email,
            token: row.token,
            created_by: row.created_by,
            used_at: row.used_at,
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}

const SELECT_COLUMNS: &str = "id, email, token, created_by, used_at, expires_at, created_at";

impl PgInvitationRepository {
    /// Create a new invitation repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvitationRepository for PgInvitationRepository {
    #[instrument(skip(self))]
    async fn find_all(&self) -> AppResult<Vec<Invitation>> {
        debug!("Listing invitations");

        let rows: Vec<InvitationRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM invitations ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing invitations: {}", e);
            AppError::Database(format!("Failed to fetch invitations: {}", e))
        })?;

        Ok(rows.into_iter().map(Invitation::from).collect())
    }

    #[instrument(skip(self, token))]
    async fn find_by_token(&self, token: &str) -> AppResult<Option<Invitation>> {
        debug!("Finding invitation by token");

        let row: Option<InvitationRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM invitations WHERE token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding invitation by token: {}", e);
            AppError::Database(format!("Failed to find invitation: {}", e))
        })?;

        Ok(row.map(Invitation::from))
    }

    #[instrument(skip(self))]
    async fn find_active_for_email(&self, email: &str) -> AppResult<Option<Invitation>> {
        debug!("Finding active invitation for email: {}", email);

        let row: Option<InvitationRow> = sqlx::query_as(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM invitations
            WHERE email = $1 AND used_at IS NULL AND expires_at > NOW()
            ORDER BY created_at DESC
            LIMIT 1
            "#
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding invitation for email: {}", e);
            AppError::Database(format!("Failed to find invitation: {}", e))
        })?;

        Ok(row.map(Invitation::from))
    }

    #[instrument(skip(self, invitation))]
    async fn create(&self, invitation: &Invitation) -> AppResult<Invitation> {
        debug!("Creating invitation for {}", invitation.email);

        let row: InvitationRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO invitations (id, email, token, created_by, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(invitation.id)
        .bind(&invitation.email)
        .bind(&invitation.token)
        .bind(invitation.created_by)
        .bind(invitation.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating invitation: {}", e);
            if e.to_string().contains("unique constraint") {
                AppError::AlreadyExists(format!(
                    "Invitation for {} already exists",
                    invitation.email
                ))
            } else {
                AppError::Database(format!("Failed to create invitation: {}", e))
            }
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn mark_used(&self, id: Uuid) -> AppResult<()> {
        debug!("Marking invitation {} as used", id);

        let result = sqlx::query(
            "UPDATE invitations SET used_at = NOW() WHERE id = $1 AND used_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error marking invitation {} used: {}", id, e);
            AppError::Database(format!("Failed to mark invitation used: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::InvitationUsed);
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        debug!("Deleting invitation: {}", id);

        let result = sqlx::query("DELETE FROM invitations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting invitation {}: {}", id, e);
                AppError::Database(format!("Failed to delete invitation: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}
