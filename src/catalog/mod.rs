//! # Catalog Module
//!
//! This module handles the public catalog and its ownership rules:
//! - Category and item CRUD, gated by the authorization guard
//! - Owner inheritance from category to item
//! - JSON export of the catalog

pub mod guard;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::catalog_routes;
