//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - The anti-forgery state handshake and login callback verification
//! - Binding verified identities to local users and sessions
//! - The session cookie extractors used by protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod provider;
pub mod routes;
pub mod service;
pub mod session;
pub mod verifier;


pub use extractors::MaybeUser;
pub use models::User;
pub use routes::auth_routes;
