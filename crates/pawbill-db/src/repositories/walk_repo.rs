//! Walk repository implementation
//!
//! Provides PostgreSQL-backed storage for group walks and their
//! attendance rosters. Lifecycle transitions are compare-and-swap
//! updates keyed on the current status, so two racing requests resolve
//! to one winner; the loser sees a conflict. Multi-row writes (roster
//! creation and replacement, duration stamping on completion) run
//! inside transactions.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use pawbill_core::{
    models::{
        walk::compute_duration_minutes, Attendance, OwnerInfo, Walk, WalkStatus,
    },
    traits::WalkRepository,
    AppError, AppResult,
};
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

/// PostgreSQL implementation of WalkRepository
pub struct PgWalkRepository {
    pool: PgPool,
}

const SELECT_WALK: &str = r#"
    SELECT id, date, status, admin_id, notes, start_time, end_time, created_at
    FROM walks
"#;

impl PgWalkRepository {
    /// Create a new walk repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn parse_status(s: &str) -> WalkStatus {
        WalkStatus::parse(s).unwrap_or_default()
    }

    fn map_walk_row(row: sqlx::postgres::PgRow) -> Walk {
        use sqlx::Row;
        Walk {
            id: row.get("id"),
            date: row.get("date"),
            status: Self::parse_status(row.get("status")),
            admin_id: row.get("admin_id"),
            notes: row.get("notes"),
            start_time: row.get("start_time"),
            end_time: row.get("end_time"),
            created_at: row.get("created_at"),
            attendances: Vec::new(),
        }
    }

    fn map_attendance_row(row: sqlx::postgres::PgRow) -> Attendance {
        use sqlx::Row;
        Attendance {
            id: row.get("id"),
            walk_id: row.get("walk_id"),
            dog_id: row.get("dog_id"),
            dog_name: row.get("dog_name"),
            owner: Some(OwnerInfo {
                id: row.get("owner_id"),
                first_name: row.get("owner_first_name"),
                last_name: row.get("owner_last_name"),
            }),
            attended: row.get("attended"),
            duration: row.get("duration"),
            created_at: row.get("created_at"),
        }
    }

    /// Load attendance rosters for a set of walks, grouped by walk id
    async fn load_attendances(
        &self,
        walk_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, Vec<Attendance>>> {
        if walk_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT
                a.id, a.walk_id, a.dog_id, a.attended, a.duration, a.created_at,
                d.name AS dog_name,
                u.id AS owner_id,
                u.first_name AS owner_first_name,
                u.last_name AS owner_last_name
            FROM attendances a
            JOIN dogs d ON d.id = a.dog_id
            JOIN users u ON u.id = d.owner_id
            WHERE a.walk_id = ANY($1)
            ORDER BY d.name
            "#,
        )
        .bind(walk_ids)
        .map(Self::map_attendance_row)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error loading attendances: {}", e);
            AppError::Database(format!("Failed to fetch attendances: {}", e))
        })?;

        let mut grouped: HashMap<Uuid, Vec<Attendance>> = HashMap::new();
        for attendance in rows {
            grouped.entry(attendance.walk_id).or_default().push(attendance);
        }
        Ok(grouped)
    }

    /// Current status of a walk, if it exists
    async fn status_of(&self, id: Uuid) -> AppResult<Option<WalkStatus>> {
        let status: Option<String> = sqlx::query_scalar("SELECT status FROM walks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error reading walk status {}: {}", id, e);
                AppError::Database(format!("Failed to read walk status: {}", e))
            })?;

        Ok(status.map(|s| Self::parse_status(&s)))
    }

    /// Map a failed compare-and-swap into NotFound or Conflict
    async fn transition_rejected(&self, id: Uuid, action: &str) -> AppError {
        match self.status_of(id).await {
            Ok(Some(status)) => {
                warn!("Rejected {} on walk {} in status {}", action, id, status);
                AppError::IllegalTransition(format!("cannot {} a {} walk", action, status))
            }
            Ok(None) => AppError::WalkNotFound(id.to_string()),
            Err(e) => e,
        }
    }

    async fn insert_roster(
        tx: &mut Transaction<'_, Postgres>,
        walk_id: Uuid,
        dog_ids: &[Uuid],
    ) -> AppResult<()> {
        for dog_id in dog_ids {
            sqlx::query(
                r#"
                INSERT INTO attendances (id, walk_id, dog_id, attended)
                VALUES ($1, $2, $3, FALSE)
                ON CONFLICT (walk_id, dog_id) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(walk_id)
            .bind(dog_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                error!("Database error adding dog {} to walk {}: {}", dog_id, walk_id, e);
                if e.to_string().contains("foreign key") {
                    AppError::DogNotFound(dog_id.to_string())
                } else {
                    AppError::Database(format!("Failed to add roster entry: {}", e))
                }
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl WalkRepository for PgWalkRepository {
    #[instrument(skip(self))]
    async fn find_with_attendances(&self, id: Uuid) -> AppResult<Option<Walk>> {
        debug!("Finding walk by id: {}", id);

        let walk = sqlx::query(&format!("{SELECT_WALK} WHERE id = $1"))
            .bind(id)
            .map(Self::map_walk_row)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding walk {}: {}", id, e);
                AppError::Database(format!("Failed to find walk: {}", e))
            })?;

        let Some(mut walk) = walk else {
            return Ok(None);
        };

        let mut rosters = self.load_attendances(&[id]).await?;
        walk.attendances = rosters.remove(&id).unwrap_or_default();
        Ok(Some(walk))
    }

    #[instrument(skip(self))]
    async fn list_filtered(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        dog_ids: Option<&[Uuid]>,
    ) -> AppResult<Vec<Walk>> {
        debug!(
            "Listing walks from {:?} to {:?}, dog filter: {:?}",
            start_date, end_date, dog_ids
        );

        let dog_filter: Option<Vec<Uuid>> = dog_ids.map(|ids| ids.to_vec());

        let mut walks = sqlx::query(&format!(
            r#"
            {SELECT_WALK}
            WHERE ($1::date IS NULL OR date >= $1)
              AND ($2::date IS NULL OR date <= $2)
              AND ($3::uuid[] IS NULL OR EXISTS (
                    SELECT 1 FROM attendances a
                    WHERE a.walk_id = walks.id AND a.dog_id = ANY($3)
              ))
            ORDER BY date DESC, created_at DESC
            "#
        ))
        .bind(start_date)
        .bind(end_date)
        .bind(dog_filter)
        .map(Self::map_walk_row)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing walks: {}", e);
            AppError::Database(format!("Failed to fetch walks: {}", e))
        })?;

        let walk_ids: Vec<Uuid> = walks.iter().map(|w| w.id).collect();
        let mut rosters = self.load_attendances(&walk_ids).await?;
        for walk in &mut walks {
            walk.attendances = rosters.remove(&walk.id).unwrap_or_default();
        }

        Ok(walks)
    }

    #[instrument(skip(self, notes))]
    async fn create_with_roster(
        &self,
        date: NaiveDate,
        admin_id: Uuid,
        notes: Option<&str>,
        dog_ids: &[Uuid],
    ) -> AppResult<Walk> {
        debug!("Creating walk on {} with {} dogs", date, dog_ids.len());

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            AppError::Transaction(format!("Failed to begin transaction: {}", e))
        })?;

        let walk_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO walks (id, date, status, admin_id, notes)
            VALUES ($1, $2, 'SCHEDULED', $3, $4)
            "#,
        )
        .bind(walk_id)
        .bind(date)
        .bind(admin_id)
        .bind(notes)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("Database error creating walk: {}", e);
            AppError::Database(format!("Failed to create walk: {}", e))
        })?;

        Self::insert_roster(&mut tx, walk_id, dog_ids).await?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit walk creation: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        self.find_with_attendances(walk_id)
            .await?
            .ok_or_else(|| AppError::WalkNotFound(walk_id.to_string()))
    }

    #[instrument(skip(self, notes))]
    async fn update_details(
        &self,
        id: Uuid,
        date: Option<NaiveDate>,
        notes: Option<&str>,
    ) -> AppResult<Walk> {
        debug!("Updating walk {}", id);

        let result = sqlx::query(
            r#"
            UPDATE walks
            SET date = COALESCE($2, date),
                notes = COALESCE($3, notes)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(date)
        .bind(notes)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating walk {}: {}", id, e);
            AppError::Database(format!("Failed to update walk: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::WalkNotFound(id.to_string()));
        }

        self.find_with_attendances(id)
            .await?
            .ok_or_else(|| AppError::WalkNotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    async fn replace_roster(&self, id: Uuid, dog_ids: &[Uuid]) -> AppResult<Walk> {
        debug!("Replacing roster of walk {} with {} dogs", id, dog_ids.len());

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            AppError::Transaction(format!("Failed to begin transaction: {}", e))
        })?;

        // Lock the walk row so the status check and the rewrite are atomic
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM walks WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    error!("Database error locking walk {}: {}", id, e);
                    AppError::Database(format!("Failed to lock walk: {}", e))
                })?;

        let status = match status {
            Some(s) => Self::parse_status(&s),
            None => return Err(AppError::WalkNotFound(id.to_string())),
        };
        if status.is_terminal() {
            warn!("Rejected roster change on walk {} in status {}", id, status);
            return Err(AppError::IllegalTransition(format!(
                "cannot change the roster of a {} walk",
                status
            )));
        }

        sqlx::query("DELETE FROM attendances WHERE walk_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Database error clearing roster of walk {}: {}", id, e);
                AppError::Database(format!("Failed to clear roster: {}", e))
            })?;

        Self::insert_roster(&mut tx, id, dog_ids).await?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit roster replacement: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        self.find_with_attendances(id)
            .await?
            .ok_or_else(|| AppError::WalkNotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    async fn start(&self, id: Uuid) -> AppResult<Walk> {
        debug!("Starting walk {}", id);

        let result = sqlx::query(
            r#"
            UPDATE walks
            SET status = 'IN_PROGRESS', start_time = NOW()
            WHERE id = $1 AND status = 'SCHEDULED'
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error starting walk {}: {}", id, e);
            AppError::Database(format!("Failed to start walk: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(self.transition_rejected(id, "start").await);
        }

        self.find_with_attendances(id)
            .await?
            .ok_or_else(|| AppError::WalkNotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    async fn complete(&self, id: Uuid) -> AppResult<Walk> {
        debug!("Completing walk {}", id);

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            AppError::Transaction(format!("Failed to begin transaction: {}", e))
        })?;

        let stamped: Option<(Option<DateTime<Utc>>, DateTime<Utc>)> = sqlx::query_as(
            r#"
            UPDATE walks
            SET status = 'COMPLETED', end_time = NOW()
            WHERE id = $1 AND status = 'IN_PROGRESS'
            RETURNING start_time, end_time
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            error!("Database error completing walk {}: {}", id, e);
            AppError::Database(format!("Failed to complete walk: {}", e))
        })?;

        let Some((start_time, end_time)) = stamped else {
            return Err(self.transition_rejected(id, "end").await);
        };

        // Group walk: every attended dog gets the same duration
        let duration = compute_duration_minutes(start_time, end_time);
        sqlx::query(
            r#"
            UPDATE attendances
            SET duration = $2
            WHERE walk_id = $1 AND attended = TRUE
            "#,
        )
        .bind(id)
        .bind(duration)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("Database error stamping durations for walk {}: {}", id, e);
            AppError::Database(format!("Failed to stamp durations: {}", e))
        })?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit walk completion: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        debug!("Walk {} completed with duration {} min", id, duration);

        self.find_with_attendances(id)
            .await?
            .ok_or_else(|| AppError::WalkNotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    async fn cancel(&self, id: Uuid) -> AppResult<Walk> {
        debug!("Cancelling walk {}", id);

        let result = sqlx::query(
            r#"
            UPDATE walks
            SET status = 'CANCELLED'
            WHERE id = $1 AND status IN ('SCHEDULED', 'IN_PROGRESS')
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error cancelling walk {}: {}", id, e);
            AppError::Database(format!("Failed to cancel walk: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(self.transition_rejected(id, "cancel").await);
        }

        self.find_with_attendances(id)
            .await?
            .ok_or_else(|| AppError::WalkNotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    async fn set_attendance(
        &self,
        walk_id: Uuid,
        dog_id: Uuid,
        attended: bool,
    ) -> AppResult<Walk> {
        debug!(
            "Marking dog {} on walk {} as attended={}",
            dog_id, walk_id, attended
        );

        match self.status_of(walk_id).await? {
            None => return Err(AppError::WalkNotFound(walk_id.to_string())),
            Some(status) if status.is_terminal() => {
                warn!(
                    "Rejected attendance change on walk {} in status {}",
                    walk_id, status
                );
                return Err(AppError::IllegalTransition(format!(
                    "cannot change attendance of a {} walk",
                    status
                )));
            }
            Some(_) => {}
        }

        let result = sqlx::query(
            r#"
            UPDATE attendances
            SET attended = $3
            WHERE walk_id = $1 AND dog_id = $2
            "#,
        )
        .bind(walk_id)
        .bind(dog_id)
        .bind(attended)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating attendance: {}", e);
            AppError::Database(format!("Failed to update attendance: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::AttendanceNotFound {
                walk_id: walk_id.to_string(),
                dog_id: dog_id.to_string(),
            });
        }

        self.find_with_attendances(walk_id)
            .await?
            .ok_or_else(|| AppError::WalkNotFound(walk_id.to_string()))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        debug!("Deleting walk: {}", id);

        let result = sqlx::query("DELETE FROM walks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting walk {}: {}", id, e);
                AppError::Database(format!("Failed to delete walk: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}
