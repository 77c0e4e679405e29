// handlers/protected/mod.rs - endpoints that need a valid bearer token
//
// Route prefix: /api/*  Middleware: require_auth
pub mod auth;
pub mod checkin;
pub mod meetings;
pub mod notes;
pub mod progress;
pub mod properties;
pub mod shareholders;
