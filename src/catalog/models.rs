use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub owner_user_id: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub creation_date: String,
    pub category_id: String,
    pub owner_user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<String>,
}

/// Front-page payload: every category plus the most recently added items
#[derive(Debug, Serialize)]
pub struct CatalogOverview {
    pub categories: Vec<Category>,
    pub recent_items: Vec<Item>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ----------------------------------------------------------------------
// JSON export shapes. Field names and nesting mirror the public export
// format: {"Categories": [{id, name, Items: [...]}]} with item entries
// {title, id, description, category_id}.
// ----------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ItemExport {
    pub title: String,
    pub id: String,
    pub description: Option<String>,
    pub category_id: String,
}

impl From<Item> for ItemExport {
    fn from(item: Item) -> Self {
        Self {
            title: item.title,
            id: item.id,
            description: item.description,
            category_id: item.category_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryExport {
    pub id: String,
    pub name: String,
    #[serde(rename = "Items")]
    pub items: Vec<ItemExport>,
}

#[derive(Debug, Serialize)]
pub struct CatalogExport {
    #[serde(rename = "Categories")]
    pub categories: Vec<CategoryExport>,
}
