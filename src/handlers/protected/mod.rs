// handlers/protected/mod.rs - endpoints for any authenticated caller (/api/*)
//
// Every handler receives the `Session` injected by `session_middleware`. Reads that take a
// `user_id` go through owner-scoped repositories, so only the owner or an assigned
// psychiatrist gets data back.

pub mod analytics;
pub mod auth;
pub mod moods;
pub mod profile;
pub mod psychology;
pub mod reports;
pub mod routines;
pub mod views;
