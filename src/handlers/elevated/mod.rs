// handlers/elevated/mod.rs - administrative endpoints
//
// Route prefix: /api/admin/*  Middleware: require_auth + require_admin
pub mod checkins;
pub mod meetings;
pub mod progress;
pub mod schema;
pub mod users;
