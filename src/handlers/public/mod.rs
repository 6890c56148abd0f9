// handlers/public - Endpoints that never require a bearer token

pub mod auth;
pub mod files;
pub mod health;
