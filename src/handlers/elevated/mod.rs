// handlers/elevated/mod.rs - admin endpoints (/api/admin/*)
//
// Security Level: admin role, checked by the services on every call
// Route Prefix: /api/admin/*

pub mod analytics;
pub mod assignments;
pub mod reports;
pub mod users;
