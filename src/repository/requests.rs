//! Item requests repository for database operations.
//!
//! All writes to the request ledger go through the transactional routines
//! here. The check-then-insert in `submit` is serialized per
//! (item, requester) pair with an advisory transaction lock, backed by the
//! partial unique index on the same pair; `accept` locks the item row so
//! concurrent accepts on the same item serialize.

use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        item::ItemShort,
        request::{ItemRequest, RequestDetails, RequestStatus, SubmitOutcome},
        user::UserShort,
    },
};

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Postgres>,
}

fn details_from_row(row: &sqlx::postgres::PgRow) -> RequestDetails {
    RequestDetails {
        id: row.get("id"),
        status: row.get("status"),
        requested_date: row.get("requested_date"),
        item: ItemShort {
            id: row.get("item_id"),
            owner_id: row.get("owner_id"),
            title: row.get("title"),
            item_type: row.get("item_type"),
            price: row.get("price"),
            is_available: row.get("is_available"),
            status: row.get("item_status"),
        },
        requested_by: UserShort {
            id: row.get("requester_id"),
            username: row.get("username"),
            location: row.get("location"),
        },
    }
}

const DETAILS_SELECT: &str = r#"
    SELECT r.id, r.status, r.requested_date,
           i.id as item_id, i.owner_id, i.title, i.item_type, i.price,
           i.is_available, i.status as item_status,
           u.id as requester_id, u.username, u.location
    FROM item_requests r
    JOIN items i ON r.item_id = i.id
    JOIN users u ON r.requested_by_id = u.id
"#;

impl RequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get request by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<ItemRequest> {
        sqlx::query_as::<_, ItemRequest>("SELECT * FROM item_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Request with id {} not found", id)))
    }

    /// Get request with item and requester details
    pub async fn get_details_by_id(&self, id: i32) -> AppResult<RequestDetails> {
        let row = sqlx::query(&format!("{} WHERE r.id = $1", DETAILS_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Request with id {} not found", id)))?;

        Ok(details_from_row(&row))
    }

    /// Find the most recent request for the (item, requester) pair that
    /// still blocks a new submission. Only `Accepted` frees the pair, so a
    /// `Rejected` record blocks as much as a `Pending` one does.
    pub async fn find_blocking(
        &self,
        item_id: i32,
        requester_id: i32,
    ) -> AppResult<Option<ItemRequest>> {
        let existing = sqlx::query_as::<_, ItemRequest>(
            r#"
            SELECT * FROM item_requests
            WHERE item_id = $1 AND requested_by_id = $2 AND status <> 'Accepted'
            ORDER BY requested_date DESC
            LIMIT 1
            "#,
        )
        .bind(item_id)
        .bind(requester_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(existing)
    }

    /// Submit a request for an item.
    ///
    /// Returns the existing blocking request without writing anything when
    /// one exists; otherwise inserts a fresh `Pending` row. Two concurrent
    /// submissions for the same pair produce at most one `Created` outcome:
    /// the check-then-insert runs under an advisory transaction lock scoped
    /// to the pair, and the partial unique index converts any remaining
    /// race into an `AlreadyRequested` answer for the loser.
    pub async fn submit(&self, item_id: i32, requester_id: i32) -> AppResult<SubmitOutcome> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
            .bind(item_id)
            .bind(requester_id)
            .execute(&mut *tx)
            .await?;

        let existing = sqlx::query_as::<_, ItemRequest>(
            r#"
            SELECT * FROM item_requests
            WHERE item_id = $1 AND requested_by_id = $2 AND status <> 'Accepted'
            ORDER BY requested_date DESC
            LIMIT 1
            "#,
        )
        .bind(item_id)
        .bind(requester_id)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(existing) = existing {
            tx.commit().await?;
            return Ok(SubmitOutcome::AlreadyRequested(existing));
        }

        let inserted = sqlx::query_as::<_, ItemRequest>(
            r#"
            INSERT INTO item_requests (item_id, requested_by_id, status)
            VALUES ($1, $2, 'Pending')
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(requester_id)
        .fetch_one(&mut *tx)
        .await;

        match inserted {
            Ok(created) => {
                tx.commit().await?;
                Ok(SubmitOutcome::Created(created))
            }
            Err(e) if is_unique_violation(&e) => {
                // A concurrent submission won the pair; surface its request.
                tx.rollback().await?;
                let existing = self
                    .find_blocking(item_id, requester_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::Internal("Blocking request vanished after conflict".to_string())
                    })?;
                Ok(SubmitOutcome::AlreadyRequested(existing))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Accept a request.
    ///
    /// Marks the request `Accepted`, flips the item status to `requested`,
    /// and rejects every other `Pending` request for the same item. The
    /// three effects commit in one transaction. Lock order is item row
    /// first, then request rows: accepts on the same item serialize on the
    /// item lock, and the loser re-reads its target after the cascade and
    /// fails the `Pending` check instead of double-accepting.
    pub async fn accept(&self, request_id: i32, acting_user_id: i32) -> AppResult<ItemRequest> {
        let mut tx = self.pool.begin().await?;

        let item_id: i32 =
            sqlx::query_scalar("SELECT item_id FROM item_requests WHERE id = $1")
                .bind(request_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Request with id {} not found", request_id))
                })?;

        let owner_id: i32 =
            sqlx::query_scalar("SELECT owner_id FROM items WHERE id = $1 FOR UPDATE")
                .bind(item_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", item_id)))?;

        if owner_id != acting_user_id {
            return Err(AppError::Authorization(
                "You do not have permission to accept this request".to_string(),
            ));
        }

        // Re-read under lock: a concurrent accept or reject may have settled
        // this request between the lookup and the item lock.
        let request = sqlx::query_as::<_, ItemRequest>(
            "SELECT * FROM item_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        if request.status != RequestStatus::Pending {
            return Err(AppError::InvalidTransition(request.status.to_string()));
        }

        let accepted = sqlx::query_as::<_, ItemRequest>(
            "UPDATE item_requests SET status = 'Accepted' WHERE id = $1 RETURNING *",
        )
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE items SET status = 'requested', updated_at = NOW() WHERE id = $1")
            .bind(request.item_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE item_requests SET status = 'Rejected'
            WHERE item_id = $1 AND status = 'Pending' AND id <> $2
            "#,
        )
        .bind(request.item_id)
        .bind(request_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(accepted)
    }

    /// Reject a request. No cascade; the item status is untouched.
    pub async fn reject(&self, request_id: i32, acting_user_id: i32) -> AppResult<ItemRequest> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, ItemRequest>(
            "SELECT * FROM item_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Request with id {} not found", request_id)))?;

        let owner_id: i32 = sqlx::query_scalar("SELECT owner_id FROM items WHERE id = $1")
            .bind(request.item_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Item with id {} not found", request.item_id))
            })?;

        if owner_id != acting_user_id {
            return Err(AppError::Authorization(
                "You do not have permission to reject this request".to_string(),
            ));
        }

        if request.status != RequestStatus::Pending {
            return Err(AppError::InvalidTransition(request.status.to_string()));
        }

        let rejected = sqlx::query_as::<_, ItemRequest>(
            "UPDATE item_requests SET status = 'Rejected' WHERE id = $1 RETURNING *",
        )
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(rejected)
    }

    /// Requests targeting items owned by a user, most recent first
    pub async fn list_for_owner(
        &self,
        owner_id: i32,
        status: Option<RequestStatus>,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<RequestDetails>, i64)> {
        self.list_filtered("i.owner_id", owner_id, status, page, per_page)
            .await
    }

    /// Requests made by a user, most recent first
    pub async fn list_for_requester(
        &self,
        requester_id: i32,
        status: Option<RequestStatus>,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<RequestDetails>, i64)> {
        self.list_filtered("r.requested_by_id", requester_id, status, page, per_page)
            .await
    }

    async fn list_filtered(
        &self,
        user_column: &str,
        user_id: i32,
        status: Option<RequestStatus>,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<RequestDetails>, i64)> {
        let offset = (page - 1) * per_page;

        let (list_sql, count_sql) = if status.is_some() {
            (
                format!(
                    "{} WHERE {} = $1 AND r.status = $2 ORDER BY r.requested_date DESC LIMIT $3 OFFSET $4",
                    DETAILS_SELECT, user_column
                ),
                format!(
                    "SELECT COUNT(*) FROM item_requests r JOIN items i ON r.item_id = i.id WHERE {} = $1 AND r.status = $2",
                    user_column
                ),
            )
        } else {
            (
                format!(
                    "{} WHERE {} = $1 ORDER BY r.requested_date DESC LIMIT $2 OFFSET $3",
                    DETAILS_SELECT, user_column
                ),
                format!(
                    "SELECT COUNT(*) FROM item_requests r JOIN items i ON r.item_id = i.id WHERE {} = $1",
                    user_column
                ),
            )
        };

        let rows = if let Some(status) = status {
            sqlx::query(&list_sql)
                .bind(user_id)
                .bind(status)
                .bind(per_page)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
        } else {
            sqlx::query(&list_sql)
                .bind(user_id)
                .bind(per_page)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
        };

        let total: i64 = if let Some(status) = status {
            sqlx::query_scalar(&count_sql)
                .bind(user_id)
                .bind(status)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar(&count_sql)
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?
        };

        let details = rows.iter().map(details_from_row).collect();
        Ok((details, total))
    }

    /// Count pending requests on a user's items
    pub async fn pending_count(&self, owner_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM item_requests r
            JOIN items i ON r.item_id = i.id
            WHERE i.owner_id = $1 AND r.status = 'Pending'
            "#,
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505")
    )
}
