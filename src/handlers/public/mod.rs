// handlers/public/mod.rs - endpoints reachable without a token
pub mod health;
pub mod root;

pub use health::health;
pub use root::root;
