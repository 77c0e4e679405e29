// handlers/mod.rs - three security tiers
//
// Public (no auth) → Protected (valid bearer token) → Elevated (admin role)
pub mod elevated;
pub mod protected;
pub mod public;
