// handlers/mod.rs - tiered handler layout
//
// public       no auth                          /, /health
// protected    JWT + session                    /api/*
// psychiatrist JWT + session + is_psychiatrist  /api/psychiatrist/*
// elevated     JWT + session + is_admin         /api/admin/*
//
// Role checks happen inside the services, so a handler mounted in the wrong tier still
// refuses callers without the role.

pub mod elevated;
pub mod protected;
pub mod psychiatrist;
pub mod public;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `?user_id=` for reads that default to the caller
#[derive(Debug, Default, Deserialize)]
pub struct OwnerQuery {
    pub user_id: Option<Uuid>,
}

/// Body of DELETE responses
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: u64,
}
