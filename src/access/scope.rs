use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{gate, AccessError, AccessResult, Session};
use crate::database::models::{Assignment, Owned};
use crate::database::repository::to_row;
use crate::database::{DatabaseError, Repository, Store};
use crate::filter::FilterData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Read,
    Write,
}

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub limit: Option<i32>,
    pub order: Option<String>,
    /// Extra conditions, combined with the owner filter
    pub where_clause: Option<Value>,
}

impl ListOptions {
    pub fn limit(limit: i32) -> Self {
        Self {
            limit: Some(limit),
            ..Default::default()
        }
    }

    pub fn matching(where_clause: Value) -> Self {
        Self {
            where_clause: Some(where_clause),
            ..Default::default()
        }
    }
}

pub async fn is_assigned(
    assignments: &Repository<Assignment>,
    psychiatrist_id: Uuid,
    patient_id: Uuid,
) -> Result<bool, DatabaseError> {
    let count = assignments
        .count(Some(json!({ "psychiatrist_id": psychiatrist_id, "patient_id": patient_id })))
        .await?;
    Ok(count > 0)
}

/// An owner-scoped repository that checks the caller before every call.
///
/// Callers may read and write their own rows. A psychiatrist may additionally read the rows
/// of patients assigned to them. Nobody else gets through, admins included.
pub struct AuthorizedRepository<E> {
    inner: Repository<E>,
    assignments: Repository<Assignment>,
    session: Session,
}

impl<E: Owned> AuthorizedRepository<E> {
    pub fn new(store: Arc<dyn Store>, session: Session) -> Self {
        Self {
            inner: Repository::new(store.clone()),
            assignments: Repository::new(store),
            session,
        }
    }

    fn owner_column() -> &'static str {
        E::TABLE.owner.unwrap_or("user_id")
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn check(&self, owner: Uuid, capability: Capability) -> AccessResult<()> {
        let caller = self.session.user_id();
        if owner == caller {
            return Ok(());
        }
        if capability == Capability::Read
            && gate::is_psychiatrist(&self.session)
            && is_assigned(&self.assignments, caller, owner).await?
        {
            return Ok(());
        }

        tracing::info!(
            "Denied {:?} on {} owned by {} for user {}",
            capability,
            E::TABLE.name,
            owner,
            caller
        );
        Err(AccessError::unauthorized(format!("Not allowed to access {} of this user", E::TABLE.name)))
    }

    pub async fn list(&self, owner: Uuid, options: ListOptions) -> AccessResult<Vec<E>> {
        self.check(owner, Capability::Read).await?;

        let column = Self::owner_column();
        let owner_filter = json!({ column: owner });
        let where_clause = match options.where_clause {
            Some(extra) => json!({ "$and": [owner_filter, extra] }),
            None => owner_filter,
        };
        let mut filter = FilterData::where_(where_clause).limit(options.limit);
        if let Some(order) = options.order {
            filter = filter.order_by(order);
        }
        Ok(self.inner.select_any(filter).await?)
    }

    pub async fn count(&self, owner: Uuid) -> AccessResult<i64> {
        self.check(owner, Capability::Read).await?;
        let column = Self::owner_column();
        Ok(self.inner.count(Some(json!({ column: owner }))).await?)
    }

    /// Fetch one row by id. A row the caller may not read is reported as such, not hidden.
    pub async fn find(&self, id: Uuid) -> AccessResult<E> {
        let row = self.inner.select_404(FilterData::where_(json!({ "id": id }))).await?;
        self.check(row.owner_id(), Capability::Read).await?;
        Ok(row)
    }

    /// Insert a row owned by the caller. Any owner field in the payload is overwritten.
    pub async fn create<S: Serialize>(&self, payload: &S) -> AccessResult<E> {
        let mut row = to_row(payload)?;
        row.insert(Self::owner_column().to_string(), json!(self.session.user_id()));
        Ok(self.inner.insert(&row).await?)
    }

    /// Update a row by id. A row the caller may not write is reported as missing.
    pub async fn update<S: Serialize>(&self, id: Uuid, changes: &S) -> AccessResult<E> {
        let not_found = || AccessError::not_found(format!("{} record not found", E::TABLE.name));
        let existing = self
            .inner
            .select_one(FilterData::where_(json!({ "id": id })))
            .await?
            .ok_or_else(not_found)?;
        match self.check(existing.owner_id(), Capability::Write).await {
            Ok(()) => {}
            Err(AccessError::Unauthorized(_)) => return Err(not_found()),
            Err(e) => return Err(e),
        }
        Ok(self.inner.update_404(id, changes).await?)
    }

    /// Update the caller's rows matching `where_clause`
    pub async fn update_own_where<S: Serialize>(&self, where_clause: Value, changes: &S) -> AccessResult<Vec<E>> {
        let column = Self::owner_column();
        let scoped = json!({ "$and": [{ column: self.session.user_id() }, where_clause] });
        Ok(self.inner.update_where(scoped, changes).await?)
    }

    /// Delete a row by id, returning the number of rows removed. A missing id is a no-op.
    pub async fn delete(&self, id: Uuid) -> AccessResult<u64> {
        let existing = self.inner.select_one(FilterData::where_(json!({ "id": id }))).await?;
        match existing {
            None => Ok(0),
            Some(row) => {
                self.check(row.owner_id(), Capability::Write).await?;
                Ok(self.inner.delete(id).await?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Entity, MoodLog, Role};
    use crate::database::MemoryStore;
    use chrono::Utc;

    async fn assign(store: Arc<dyn Store>, psychiatrist_id: Uuid, patient_id: Uuid) {
        Repository::<Assignment>::new(store)
            .insert(&json!({ "psychiatrist_id": psychiatrist_id, "patient_id": patient_id }))
            .await
            .unwrap();
    }

    fn mood(owner: Uuid) -> Value {
        json!({ "user_id": owner, "mood": "good", "note": null, "created_at": Utc::now() })
    }

    #[tokio::test]
    async fn create_stamps_caller_as_owner() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let caller = Uuid::new_v4();
        let repo = AuthorizedRepository::<MoodLog>::new(store, Session::with_role(caller, Role::User));

        let created = repo.create(&mood(Uuid::new_v4())).await.unwrap();
        assert_eq!(created.user_id, caller);
    }

    #[tokio::test]
    async fn assigned_psychiatrist_reads_but_cannot_write() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let patient = Uuid::new_v4();
        let doctor = Uuid::new_v4();
        assign(store.clone(), doctor, patient).await;

        let own = AuthorizedRepository::<MoodLog>::new(store.clone(), Session::with_role(patient, Role::User));
        let log = own.create(&mood(patient)).await.unwrap();

        let repo = AuthorizedRepository::<MoodLog>::new(store, Session::with_role(doctor, Role::Psychiatrist));
        assert_eq!(repo.list(patient, ListOptions::default()).await.unwrap().len(), 1);
        assert!(matches!(repo.delete(log.id).await, Err(AccessError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn unassigned_callers_are_refused() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let patient = Uuid::new_v4();

        for role in [Role::User, Role::Psychiatrist, Role::Admin] {
            let repo = AuthorizedRepository::<MoodLog>::new(store.clone(), Session::with_role(Uuid::new_v4(), role));
            let err = repo.list(patient, ListOptions::default()).await.unwrap_err();
            assert!(matches!(err, AccessError::Unauthorized(_)), "{:?} should be refused", role);
        }
    }

    #[tokio::test]
    async fn deleting_missing_row_is_a_no_op() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let repo = AuthorizedRepository::<MoodLog>::new(store, Session::with_role(Uuid::new_v4(), Role::User));
        assert_eq!(repo.delete(Uuid::new_v4()).await.unwrap(), 0);
        assert_eq!(MoodLog::TABLE.name, "mood_logs");
    }
}
