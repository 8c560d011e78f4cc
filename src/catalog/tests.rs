//! Tests for catalog module
//!
//! These tests verify the authorization guard decisions, owner
//! inheritance from category to item, cascading deletes, and the JSON
//! export shapes, all against an in-memory database.

#[cfg(test)]
mod tests {
    use super::super::guard::{authorize, require_owner, CatalogAction, Decision, DenyReason};
    use super::super::models::{CreateItemRequest, UpdateItemRequest};
    use super::super::services::CatalogService;
    use crate::auth::models::User;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        crate::common::migrations::run_migrations(&pool)
            .await
            .expect("migrations");
        pool
    }

    async fn insert_user(pool: &SqlitePool, id: &str, email: &str) -> User {
        sqlx::query("INSERT INTO users (id, name, email) VALUES (?, ?, ?)")
            .bind(id)
            .bind("Test User")
            .bind(email)
            .execute(pool)
            .await
            .unwrap();

        User {
            id: id.to_string(),
            name: "Test User".to_string(),
            email: email.to_string(),
            picture: None,
            created_at: None,
        }
    }

    fn new_item(title: &str) -> CreateItemRequest {
        CreateItemRequest {
            title: title.to_string(),
            description: Some("description".to_string()),
        }
    }

    // ------------------------------------------------------------------
    // Authorization guard
    // ------------------------------------------------------------------

    #[test]
    fn test_reads_are_always_allowed() {
        assert_eq!(
            authorize(CatalogAction::View, Some("U_OWNER"), None),
            Decision::Allowed
        );
        assert_eq!(
            authorize(CatalogAction::View, Some("U_OWNER"), Some("U_OTHER")),
            Decision::Allowed
        );
    }

    #[test]
    fn test_anonymous_mutation_is_not_logged_in() {
        for action in [CatalogAction::Create, CatalogAction::Edit, CatalogAction::Delete] {
            assert_eq!(
                authorize(action, Some("U_OWNER"), None),
                Decision::Denied(DenyReason::NotLoggedIn)
            );
        }
        assert_eq!(
            authorize(CatalogAction::Create, None, None),
            Decision::Denied(DenyReason::NotLoggedIn)
        );
    }

    #[test]
    fn test_non_owner_mutation_is_not_owner() {
        assert_eq!(
            authorize(CatalogAction::Delete, Some("U_OWNER"), Some("U_OTHER")),
            Decision::Denied(DenyReason::NotOwner)
        );
    }

    #[test]
    fn test_owner_mutation_is_allowed() {
        assert_eq!(
            authorize(CatalogAction::Edit, Some("U_OWNER"), Some("U_OWNER")),
            Decision::Allowed
        );
        // Creation with no parent resource only needs a logged-in user.
        assert_eq!(
            authorize(CatalogAction::Create, None, Some("U_ANY")),
            Decision::Allowed
        );
    }

    #[test]
    fn test_require_owner_returns_the_acting_user() {
        let user = User {
            id: "U_OWNER".to_string(),
            name: "Owner".to_string(),
            email: "owner@example.com".to_string(),
            picture: None,
            created_at: None,
        };

        let acting = require_owner(CatalogAction::Edit, Some("U_OWNER"), Some(&user)).unwrap();
        assert_eq!(acting.id, "U_OWNER");

        assert!(require_owner(CatalogAction::Edit, Some("U_OWNER"), None).is_err());
        let other = User {
            id: "U_OTHER".to_string(),
            ..user
        };
        assert!(require_owner(CatalogAction::Edit, Some("U_OWNER"), Some(&other)).is_err());
    }

    // ------------------------------------------------------------------
    // Ownership inheritance
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_item_inherits_owner_from_category() {
        let pool = test_pool().await;
        let user = insert_user(&pool, "U_A", "a@example.com").await;
        let catalog = CatalogService::new(pool.clone());

        let category = catalog
            .create_category("Snowboarding", &user.id)
            .await
            .unwrap();
        assert_eq!(category.owner_user_id, user.id);

        let item = catalog
            .create_item(&category.id, &new_item("Goggles"))
            .await
            .unwrap();

        assert_eq!(item.owner_user_id, category.owner_user_id);
        assert_eq!(item.owner_user_id, user.id);
        assert_eq!(item.category_id, category.id);
        assert!(!item.creation_date.is_empty());
    }

    #[tokio::test]
    async fn test_moving_an_item_rederives_its_owner() {
        let pool = test_pool().await;
        let alice = insert_user(&pool, "U_A", "a@example.com").await;
        let bob = insert_user(&pool, "U_B", "b@example.com").await;
        let catalog = CatalogService::new(pool.clone());

        let snow = catalog.create_category("Snowboarding", &alice.id).await.unwrap();
        let surf = catalog.create_category("Surfing", &bob.id).await.unwrap();

        let item = catalog
            .create_item(&snow.id, &new_item("Board"))
            .await
            .unwrap();
        assert_eq!(item.owner_user_id, alice.id);

        let moved = catalog
            .update_item(
                &item.id,
                &UpdateItemRequest {
                    title: None,
                    description: None,
                    category_id: Some(surf.id.clone()),
                },
            )
            .await
            .unwrap();

        assert_eq!(moved.category_id, surf.id);
        assert_eq!(moved.owner_user_id, bob.id);
        assert_eq!(moved.title, "Board");
    }

    #[tokio::test]
    async fn test_create_item_under_missing_category_is_not_found() {
        let pool = test_pool().await;
        let catalog = CatalogService::new(pool.clone());

        let result = catalog.create_item("C_MISSING", &new_item("Lost")).await;
        assert!(result.is_err());

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM items")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }

    // ------------------------------------------------------------------
    // Deletes
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_delete_category_removes_its_items() {
        let pool = test_pool().await;
        let user = insert_user(&pool, "U_A", "a@example.com").await;
        let catalog = CatalogService::new(pool.clone());

        let category = catalog.create_category("Snowboarding", &user.id).await.unwrap();
        catalog.create_item(&category.id, &new_item("Goggles")).await.unwrap();
        catalog.create_item(&category.id, &new_item("Board")).await.unwrap();

        catalog.delete_category(&category.id).await.unwrap();

        assert!(catalog.get_category(&category.id).await.is_err());
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM items")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }

    #[tokio::test]
    async fn test_single_row_miss_is_not_found_not_a_fault() {
        let pool = test_pool().await;
        let catalog = CatalogService::new(pool.clone());

        assert!(catalog.get_category("C_MISSING").await.is_err());
        assert!(catalog.get_item("T_MISSING").await.is_err());
        assert!(catalog.rename_category("C_MISSING", "New").await.is_err());
        assert!(catalog.delete_item("T_MISSING").await.is_err());
        assert!(catalog.delete_category("C_MISSING").await.is_err());
    }

    // ------------------------------------------------------------------
    // Overview and export
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_overview_limits_recent_items_to_three_newest() {
        let pool = test_pool().await;
        let user = insert_user(&pool, "U_A", "a@example.com").await;
        let catalog = CatalogService::new(pool.clone());

        let category = catalog.create_category("Gear", &user.id).await.unwrap();
        for n in 1..=5 {
            // Distinct creation dates so ordering is deterministic.
            let id = format!("T_ITEM{:02}", n);
            sqlx::query(
                "INSERT INTO items (id, title, creation_date, category_id, owner_user_id) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&id)
            .bind(format!("Item {}", n))
            .bind(format!("2026-01-{:02}T00:00:00Z", n))
            .bind(&category.id)
            .bind(&user.id)
            .execute(&pool)
            .await
            .unwrap();
        }

        let overview = catalog.overview().await.unwrap();
        assert_eq!(overview.categories.len(), 1);
        assert_eq!(overview.recent_items.len(), 3);
        let titles: Vec<&str> = overview
            .recent_items
            .iter()
            .map(|i| i.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Item 5", "Item 4", "Item 3"]);
    }

    #[tokio::test]
    async fn test_export_catalog_shape() {
        let pool = test_pool().await;
        let user = insert_user(&pool, "U_A", "a@example.com").await;
        let catalog = CatalogService::new(pool.clone());

        let category = catalog.create_category("Snowboarding", &user.id).await.unwrap();
        let item = catalog.create_item(&category.id, &new_item("Goggles")).await.unwrap();

        let export = catalog.export_catalog().await.unwrap();
        let json = serde_json::to_value(&export).unwrap();

        let categories = json.get("Categories").unwrap().as_array().unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0]["name"], "Snowboarding");

        let items = categories[0].get("Items").unwrap().as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["title"], "Goggles");
        assert_eq!(items[0]["id"], serde_json::json!(item.id));
        assert_eq!(items[0]["category_id"], serde_json::json!(category.id));
    }

    #[tokio::test]
    async fn test_export_missing_category_is_none() {
        let pool = test_pool().await;
        let catalog = CatalogService::new(pool.clone());

        let export = catalog.export_category("Snowboarding").await.unwrap();
        assert!(export.is_none());
    }

    #[tokio::test]
    async fn test_export_category_by_name() {
        let pool = test_pool().await;
        let user = insert_user(&pool, "U_A", "a@example.com").await;
        let catalog = CatalogService::new(pool.clone());

        let category = catalog.create_category("Surfing", &user.id).await.unwrap();
        catalog.create_item(&category.id, &new_item("Wax")).await.unwrap();

        let export = catalog.export_category("Surfing").await.unwrap().unwrap();
        assert_eq!(export.name, "Surfing");
        assert_eq!(export.items.len(), 1);
    }

    // ------------------------------------------------------------------
    // Denied mutations leave the store unchanged
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_denied_delete_leaves_category_in_place() {
        let pool = test_pool().await;
        let alice = insert_user(&pool, "U_A", "a@example.com").await;
        let bob = insert_user(&pool, "U_B", "b@example.com").await;
        let catalog = CatalogService::new(pool.clone());

        let category = catalog.create_category("Snowboarding", &alice.id).await.unwrap();

        // Bob's session fails the guard, so the service is never invoked.
        let decision = authorize(
            CatalogAction::Delete,
            Some(category.owner_user_id.as_str()),
            Some(bob.id.as_str()),
        );
        assert_eq!(decision, Decision::Denied(DenyReason::NotOwner));

        assert!(catalog.get_category(&category.id).await.is_ok());

        // Alice's delete goes through.
        let decision = authorize(
            CatalogAction::Delete,
            Some(category.owner_user_id.as_str()),
            Some(alice.id.as_str()),
        );
        assert_eq!(decision, Decision::Allowed);
        catalog.delete_category(&category.id).await.unwrap();
        assert!(catalog.get_category(&category.id).await.is_err());
    }
}
