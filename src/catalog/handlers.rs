use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::guard::{self, CatalogAction};
use super::models::{
    CreateCategoryRequest, CreateItemRequest, MessageResponse, UpdateCategoryRequest,
    UpdateItemRequest,
};
use super::services::CatalogService;
use crate::auth::MaybeUser;
use crate::common::{ApiError, AppState, Validator};

// ============================================================================
// Public reads
// ============================================================================

/// GET /api/catalog - All categories plus the most recent items
pub async fn show_catalog(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let catalog = CatalogService::new(app_state.db.clone());

    let overview = catalog.overview().await?;

    Ok(Json(overview))
}

/// GET /api/categories/:id/items - Items in one category
pub async fn list_category_items(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    Path(category_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let catalog = CatalogService::new(app_state.db.clone());

    let category = catalog.get_category(&category_id).await?;
    let items = catalog.items_in_category(&category.id).await?;

    Ok(Json(serde_json::json!({
        "category": category,
        "items": items,
    })))
}

/// GET /api/items/:id - Show one item
pub async fn show_item(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    Path(item_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let catalog = CatalogService::new(app_state.db.clone());

    let item = catalog.get_item(&item_id).await?;

    Ok(Json(item))
}

// ============================================================================
// Category mutations
// ============================================================================

/// POST /api/categories - Create a category owned by the session user
pub async fn create_category(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    MaybeUser(user): MaybeUser,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let validation = request.validate(&request);
    if !validation.is_valid {
        return Err(ApiError::from(validation));
    }

    let owner = guard::require_owner(CatalogAction::Create, None, user.as_ref())?;

    let app_state = state.read().await;
    let catalog = CatalogService::new(app_state.db.clone());

    let category = catalog.create_category(&request.name, &owner.id).await?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/categories/:id - Rename a category
pub async fn update_category(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    MaybeUser(user): MaybeUser,
    Path(category_id): Path<String>,
    Json(request): Json<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let validation = request.validate(&request);
    if !validation.is_valid {
        return Err(ApiError::from(validation));
    }

    let app_state = state.read().await;
    let catalog = CatalogService::new(app_state.db.clone());

    let category = catalog.get_category(&category_id).await?;
    guard::require_owner(
        CatalogAction::Edit,
        Some(category.owner_user_id.as_str()),
        user.as_ref(),
    )?;

    let category = catalog.rename_category(&category_id, &request.name).await?;

    Ok(Json(category))
}

/// DELETE /api/categories/:id - Delete a category and its items
pub async fn delete_category(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    MaybeUser(user): MaybeUser,
    Path(category_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let catalog = CatalogService::new(app_state.db.clone());

    let category = catalog.get_category(&category_id).await?;
    guard::require_owner(
        CatalogAction::Delete,
        Some(category.owner_user_id.as_str()),
        user.as_ref(),
    )?;

    catalog.delete_category(&category_id).await?;

    Ok(Json(MessageResponse {
        message: "Category deleted successfully".to_string(),
    }))
}

// ============================================================================
// Item mutations
// ============================================================================

/// POST /api/categories/:id/items - Add an item under a category
///
/// Authorization is transitive: creating an item under a category requires
/// owning the category, and the item inherits that owner.
pub async fn create_item(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    MaybeUser(user): MaybeUser,
    Path(category_id): Path<String>,
    Json(request): Json<CreateItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let validation = request.validate(&request);
    if !validation.is_valid {
        return Err(ApiError::from(validation));
    }

    let app_state = state.read().await;
    let catalog = CatalogService::new(app_state.db.clone());

    let category = catalog.get_category(&category_id).await?;
    guard::require_owner(
        CatalogAction::Create,
        Some(category.owner_user_id.as_str()),
        user.as_ref(),
    )?;

    let item = catalog.create_item(&category.id, &request).await?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/items/:id - Edit an item, optionally moving it between categories
pub async fn update_item(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    MaybeUser(user): MaybeUser,
    Path(item_id): Path<String>,
    Json(request): Json<UpdateItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let validation = request.validate(&request);
    if !validation.is_valid {
        return Err(ApiError::from(validation));
    }

    let app_state = state.read().await;
    let catalog = CatalogService::new(app_state.db.clone());

    let item = catalog.get_item(&item_id).await?;
    guard::require_owner(
        CatalogAction::Edit,
        Some(item.owner_user_id.as_str()),
        user.as_ref(),
    )?;

    // Moving the item means creating it under the target category, which
    // requires owning that category as well.
    if let Some(target_id) = &request.category_id {
        if *target_id != item.category_id {
            let target = catalog.get_category(target_id).await?;
            guard::require_owner(
                CatalogAction::Create,
                Some(target.owner_user_id.as_str()),
                user.as_ref(),
            )?;
        }
    }

    let item = catalog.update_item(&item_id, &request).await?;

    Ok(Json(item))
}

/// DELETE /api/items/:id - Delete an item
pub async fn delete_item(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    MaybeUser(user): MaybeUser,
    Path(item_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let catalog = CatalogService::new(app_state.db.clone());

    let item = catalog.get_item(&item_id).await?;
    guard::require_owner(
        CatalogAction::Delete,
        Some(item.owner_user_id.as_str()),
        user.as_ref(),
    )?;

    catalog.delete_item(&item_id).await?;

    Ok(Json(MessageResponse {
        message: "Item deleted successfully".to_string(),
    }))
}

// ============================================================================
// JSON export
// ============================================================================

/// GET /api/catalog.json - Full catalog export
pub async fn export_catalog(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let catalog = CatalogService::new(app_state.db.clone());

    let export = catalog.export_catalog().await?;

    Ok(Json(export))
}

/// GET /api/catalog/:category_name/json - Single-category export
///
/// A miss is part of the export format, not a request failure: the body
/// carries {"Error": "Category <name> not found"} with a 200 status.
pub async fn export_category(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    Path(category_name): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let app_state = state.read().await;
    let catalog = CatalogService::new(app_state.db.clone());

    match catalog.export_category(&category_name).await? {
        Some(export) => Ok(Json(serde_json::json!(export))),
        None => Ok(Json(serde_json::json!({
            "Error": format!("Category {} not found", category_name)
        }))),
    }
}
