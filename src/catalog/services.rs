use sqlx::SqlitePool;
use tracing::info;

use super::models::{
    CatalogExport, CatalogOverview, Category, CategoryExport, CreateItemRequest, Item, ItemExport,
    UpdateItemRequest,
};
use crate::common::{generate_category_id, generate_item_id, ApiError};

/// Number of recently added items shown on the catalog front page
const RECENT_ITEMS_LIMIT: i64 = 3;

pub struct CatalogService {
    db: SqlitePool,
}

impl CatalogService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// All categories plus the most recently added items, newest first
    pub async fn overview(&self) -> Result<CatalogOverview, ApiError> {
        let categories = self.all_categories().await?;

        let recent_items = sqlx::query_as::<_, Item>(
            "SELECT * FROM items ORDER BY creation_date DESC, id DESC LIMIT ?",
        )
        .bind(RECENT_ITEMS_LIMIT)
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        Ok(CatalogOverview {
            categories,
            recent_items,
        })
    }

    pub async fn all_categories(&self) -> Result<Vec<Category>, ApiError> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name ASC")
            .fetch_all(&self.db)
            .await
            .map_err(ApiError::DatabaseError)
    }

    pub async fn get_category(&self, category_id: &str) -> Result<Category, ApiError> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?")
            .bind(category_id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?
            .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))
    }

    pub async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, ApiError> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::DatabaseError)
    }

    pub async fn items_in_category(&self, category_id: &str) -> Result<Vec<Item>, ApiError> {
        sqlx::query_as::<_, Item>(
            "SELECT * FROM items WHERE category_id = ? ORDER BY creation_date DESC, id DESC",
        )
        .bind(category_id)
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::DatabaseError)
    }

    pub async fn get_item(&self, item_id: &str) -> Result<Item, ApiError> {
        sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = ?")
            .bind(item_id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?
            .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))
    }

    // ========================================================================
    // Category mutations
    // ========================================================================

    /// Create a category owned by the acting user
    pub async fn create_category(
        &self,
        name: &str,
        owner_user_id: &str,
    ) -> Result<Category, ApiError> {
        let category_id = generate_category_id();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO categories (id, name, owner_user_id, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&category_id)
        .bind(name)
        .bind(owner_user_id)
        .bind(&now)
        .execute(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        info!("Created category: {} ({})", name, category_id);

        self.get_category(&category_id).await
    }

    /// Rename a category. Ownership never changes.
    pub async fn rename_category(
        &self,
        category_id: &str,
        name: &str,
    ) -> Result<Category, ApiError> {
        let result = sqlx::query("UPDATE categories SET name = ? WHERE id = ?")
            .bind(name)
            .bind(category_id)
            .execute(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Category not found".to_string()));
        }

        self.get_category(category_id).await
    }

    /// Delete a category and every item in it. One transaction: either
    /// the category and all of its items go, or nothing does.
    pub async fn delete_category(&self, category_id: &str) -> Result<(), ApiError> {
        let mut tx = self.db.begin().await.map_err(ApiError::DatabaseError)?;

        sqlx::query("DELETE FROM items WHERE category_id = ?")
            .bind(category_id)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::DatabaseError)?;

        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(category_id)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::DatabaseError)?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls back the item deletes.
            return Err(ApiError::NotFound("Category not found".to_string()));
        }

        tx.commit().await.map_err(ApiError::DatabaseError)?;

        info!("Deleted category {} and its items", category_id);

        Ok(())
    }

    // ========================================================================
    // Item mutations
    // ========================================================================

    /// Create an item under a category. The item's owner is always derived
    /// from the category row read inside the same transaction, never taken
    /// from the caller; creation_date is server-assigned.
    pub async fn create_item(
        &self,
        category_id: &str,
        request: &CreateItemRequest,
    ) -> Result<Item, ApiError> {
        let mut tx = self.db.begin().await.map_err(ApiError::DatabaseError)?;

        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?")
            .bind(category_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(ApiError::DatabaseError)?
            .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

        let item_id = generate_item_id();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO items (id, title, description, creation_date, category_id, owner_user_id)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item_id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(&now)
        .bind(&category.id)
        .bind(&category.owner_user_id)
        .execute(&mut *tx)
        .await
        .map_err(ApiError::DatabaseError)?;

        tx.commit().await.map_err(ApiError::DatabaseError)?;

        info!(
            "Created item {} under category {} for owner {}",
            item_id, category.id, category.owner_user_id
        );

        self.get_item(&item_id).await
    }

    /// Edit an item's title/description, optionally moving it to another
    /// category. A move re-derives the owner from the target category
    /// inside the transaction, preserving the owner-inheritance invariant.
    pub async fn update_item(
        &self,
        item_id: &str,
        request: &UpdateItemRequest,
    ) -> Result<Item, ApiError> {
        let mut tx = self.db.begin().await.map_err(ApiError::DatabaseError)?;

        let item = sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = ?")
            .bind(item_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(ApiError::DatabaseError)?
            .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))?;

        let (category_id, owner_user_id) = match &request.category_id {
            Some(target_id) if *target_id != item.category_id => {
                let target =
                    sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?")
                        .bind(target_id)
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(ApiError::DatabaseError)?
                        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;
                (target.id, target.owner_user_id)
            }
            _ => (item.category_id.clone(), item.owner_user_id.clone()),
        };

        let title = request.title.as_deref().unwrap_or(&item.title);
        let description = match &request.description {
            Some(d) => Some(d.as_str()),
            None => item.description.as_deref(),
        };

        sqlx::query(
            r#"
            UPDATE items
            SET title = ?, description = ?, category_id = ?, owner_user_id = ?
            WHERE id = ?
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(&category_id)
        .bind(&owner_user_id)
        .bind(item_id)
        .execute(&mut *tx)
        .await
        .map_err(ApiError::DatabaseError)?;

        tx.commit().await.map_err(ApiError::DatabaseError)?;

        self.get_item(item_id).await
    }

    pub async fn delete_item(&self, item_id: &str) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(item_id)
            .execute(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Item not found".to_string()));
        }

        info!("Deleted item {}", item_id);

        Ok(())
    }

    // ========================================================================
    // JSON export
    // ========================================================================

    /// Full catalog export: every category with its items nested
    pub async fn export_catalog(&self) -> Result<CatalogExport, ApiError> {
        let categories = self.all_categories().await?;

        let mut exports = Vec::with_capacity(categories.len());
        for category in categories {
            let items = self.items_in_category(&category.id).await?;
            exports.push(CategoryExport {
                id: category.id,
                name: category.name,
                items: items.into_iter().map(ItemExport::from).collect(),
            });
        }

        Ok(CatalogExport {
            categories: exports,
        })
    }

    /// Single-category export, looked up by name. None when the category
    /// does not exist; the handler turns that into the Error payload.
    pub async fn export_category(&self, name: &str) -> Result<Option<CategoryExport>, ApiError> {
        let Some(category) = self.find_category_by_name(name).await? else {
            return Ok(None);
        };

        let items = self.items_in_category(&category.id).await?;

        Ok(Some(CategoryExport {
            id: category.id,
            name: category.name,
            items: items.into_iter().map(ItemExport::from).collect(),
        }))
    }
}
