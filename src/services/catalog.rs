//! Catalog service for item and category management

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        category::{Category, CreateCategory},
        item::{Item, ItemInput, ItemQuery, ItemShort},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search available items
    pub async fn search_items(&self, query: &ItemQuery) -> AppResult<(Vec<ItemShort>, i64)> {
        self.repository.items.search(query).await
    }

    /// Get item with related items from the same category
    pub async fn get_item(&self, id: i32) -> AppResult<(Item, Vec<ItemShort>)> {
        let item = self.repository.items.get_by_id(id).await?;
        let related = self.repository.items.related(&item, 4).await?;
        Ok((item, related))
    }

    /// Items owned by a user
    pub async fn my_items(
        &self,
        owner_id: i32,
        available: Option<bool>,
    ) -> AppResult<Vec<ItemShort>> {
        self.repository.items.list_for_owner(owner_id, available).await
    }

    /// Create a new item listing
    pub async fn create_item(&self, owner_id: i32, input: ItemInput) -> AppResult<Item> {
        self.validate_input(&input).await?;
        let item = self.repository.items.create(owner_id, &input).await?;
        tracing::info!(item_id = item.id, owner_id, "item listed");
        Ok(item)
    }

    /// Update an item (owner only)
    pub async fn update_item(
        &self,
        id: i32,
        acting_user_id: i32,
        input: ItemInput,
    ) -> AppResult<Item> {
        let item = self.repository.items.get_by_id(id).await?;
        self.ensure_owner(&item, acting_user_id, "edit")?;
        self.validate_input(&input).await?;
        self.repository.items.update(id, &input).await
    }

    /// Delete an item (owner only)
    pub async fn delete_item(&self, id: i32, acting_user_id: i32) -> AppResult<()> {
        let item = self.repository.items.get_by_id(id).await?;
        self.ensure_owner(&item, acting_user_id, "delete")?;
        self.repository.items.delete(id).await
    }

    /// Toggle listing availability (owner only)
    pub async fn toggle_availability(&self, id: i32, acting_user_id: i32) -> AppResult<Item> {
        let item = self.repository.items.get_by_id(id).await?;
        self.ensure_owner(&item, acting_user_id, "modify")?;
        self.repository.items.toggle_availability(id).await
    }

    /// List all categories
    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.repository.categories.list().await
    }

    /// Create a new category
    pub async fn create_category(&self, category: CreateCategory) -> AppResult<Category> {
        category
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.categories.create(&category).await
    }

    fn ensure_owner(&self, item: &Item, acting_user_id: i32, action: &str) -> AppResult<()> {
        if item.owner_id != acting_user_id {
            return Err(AppError::Authorization(format!(
                "You do not have permission to {} this item",
                action
            )));
        }
        Ok(())
    }

    async fn validate_input(&self, input: &ItemInput) -> AppResult<()> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        input
            .check_price_rules()
            .map_err(AppError::Validation)?;

        // Reject dangling category references up front
        if let Some(category_id) = input.category_id {
            self.repository.categories.get_by_id(category_id).await?;
        }
        Ok(())
    }
}
