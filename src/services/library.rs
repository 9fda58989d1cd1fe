use super::degrade_store_errors;
use crate::access::{AccessError, AccessResult};
use crate::database::models::PsychologyReport;
use crate::database::Repository;
use crate::filter::FilterData;
use crate::state::AppState;

/// The shared psychology library. Every authenticated caller sees the same articles.
pub struct LibraryService {
    articles: Repository<PsychologyReport>,
}

impl LibraryService {
    pub fn new(state: &AppState) -> Self {
        Self {
            articles: Repository::new(state.store.clone()),
        }
    }

    /// Newest publications first
    pub async fn list(&self) -> AccessResult<Vec<PsychologyReport>> {
        let articles = self.articles.select_any(FilterData::default()).await;
        degrade_store_errors("psychology library", articles.map_err(AccessError::from))
    }
}
