// Library exports for yeet-server
// The binary and the integration tests both build on these modules

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod routes;
pub mod state;
