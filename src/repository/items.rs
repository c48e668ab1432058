//! Items repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::item::{Item, ItemInput, ItemQuery, ItemShort},
};

#[derive(Clone)]
pub struct ItemsRepository {
    pool: Pool<Postgres>,
}

impl ItemsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get item by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Item> {
        sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", id)))
    }

    /// Search available items with optional filters and pagination
    pub async fn search(&self, query: &ItemQuery) -> AppResult<(Vec<ItemShort>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(12).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let mut conditions = vec!["is_available = TRUE".to_string()];
        let mut bind_idx = 0;

        let search = query.search.as_ref().filter(|s| !s.is_empty());
        if search.is_some() {
            bind_idx += 1;
            conditions.push(format!(
                "(title ILIKE ${0} OR description ILIKE ${0})",
                bind_idx
            ));
        }
        if query.category.is_some() {
            bind_idx += 1;
            conditions.push(format!("category_id = ${}", bind_idx));
        }
        let item_type = query.item_type.as_ref().filter(|s| !s.is_empty());
        if item_type.is_some() {
            bind_idx += 1;
            conditions.push(format!("item_type = ${}", bind_idx));
        }

        let where_clause = conditions.join(" AND ");
        let list_sql = format!(
            r#"
            SELECT id, owner_id, title, item_type, price, is_available, status
            FROM items
            WHERE {}
            ORDER BY created_at DESC
            LIMIT ${} OFFSET ${}
            "#,
            where_clause,
            bind_idx + 1,
            bind_idx + 2
        );
        let count_sql = format!("SELECT COUNT(*) FROM items WHERE {}", where_clause);

        let mut list_query = sqlx::query_as::<_, ItemShort>(&list_sql);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);

        if let Some(search) = search {
            let pattern = format!("%{}%", search);
            list_query = list_query.bind(pattern.clone());
            count_query = count_query.bind(pattern);
        }
        if let Some(category) = query.category {
            list_query = list_query.bind(category);
            count_query = count_query.bind(category);
        }
        if let Some(item_type) = item_type {
            list_query = list_query.bind(item_type.clone());
            count_query = count_query.bind(item_type.clone());
        }

        let items = list_query
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        let total = count_query.fetch_one(&self.pool).await?;

        Ok((items, total))
    }

    /// Items owned by a user, optionally filtered by availability
    pub async fn list_for_owner(
        &self,
        owner_id: i32,
        available: Option<bool>,
    ) -> AppResult<Vec<ItemShort>> {
        let items = if let Some(available) = available {
            sqlx::query_as::<_, ItemShort>(
                r#"
                SELECT id, owner_id, title, item_type, price, is_available, status
                FROM items
                WHERE owner_id = $1 AND is_available = $2
                ORDER BY created_at DESC
                "#,
            )
            .bind(owner_id)
            .bind(available)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, ItemShort>(
                r#"
                SELECT id, owner_id, title, item_type, price, is_available, status
                FROM items
                WHERE owner_id = $1
                ORDER BY created_at DESC
                "#,
            )
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(items)
    }

    /// Related items from the same category, excluding the item itself
    pub async fn related(&self, item: &Item, limit: i64) -> AppResult<Vec<ItemShort>> {
        let Some(category_id) = item.category_id else {
            return Ok(Vec::new());
        };

        let items = sqlx::query_as::<_, ItemShort>(
            r#"
            SELECT id, owner_id, title, item_type, price, is_available, status
            FROM items
            WHERE category_id = $1 AND is_available = TRUE AND id <> $2
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(category_id)
        .bind(item.id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Create a new item
    pub async fn create(&self, owner_id: i32, input: &ItemInput) -> AppResult<Item> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (owner_id, title, description, category_id, item_type, price)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.category_id)
        .bind(input.item_type)
        .bind(input.price)
        .fetch_one(&self.pool)
        .await?;

        Ok(item)
    }

    /// Update an existing item
    pub async fn update(&self, id: i32, input: &ItemInput) -> AppResult<Item> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            UPDATE items
            SET title = $1, description = $2, category_id = $3, item_type = $4,
                price = $5, updated_at = NOW()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.category_id)
        .bind(input.item_type)
        .bind(input.price)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", id)))?;

        Ok(item)
    }

    /// Delete an item
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Item with id {} not found", id)));
        }
        Ok(())
    }

    /// Toggle the listing availability flag
    pub async fn toggle_availability(&self, id: i32) -> AppResult<Item> {
        sqlx::query_as::<_, Item>(
            "UPDATE items SET is_available = NOT is_available, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", id)))
    }
}
