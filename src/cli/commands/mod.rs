pub mod admin;
pub mod checkin;
pub mod config;
pub mod designee;
pub mod health;
pub mod meetings;
pub mod shareholders;
