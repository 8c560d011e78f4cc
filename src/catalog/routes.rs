use super::handlers;
use axum::{
    routing::{get, post},
    Router,
};

/// Creates the catalog router with all category and item routes
///
/// Reads are public; every mutating route goes through the authorization
/// guard inside its handler.
pub fn catalog_routes() -> Router {
    Router::new()
        // Public catalog reads
        .route("/api/catalog", get(handlers::show_catalog))
        .route("/api/catalog.json", get(handlers::export_catalog))
        .route(
            "/api/catalog/:category_name/json",
            get(handlers::export_category),
        )
        // Category CRUD
        .route("/api/categories", post(handlers::create_category))
        .route(
            "/api/categories/:id",
            axum::routing::put(handlers::update_category).delete(handlers::delete_category),
        )
        .route(
            "/api/categories/:id/items",
            get(handlers::list_category_items).post(handlers::create_item),
        )
        // Item CRUD
        .route(
            "/api/items/:id",
            get(handlers::show_item)
                .put(handlers::update_item)
                .delete(handlers::delete_item),
        )
}
