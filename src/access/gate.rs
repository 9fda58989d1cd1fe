use super::{AccessError, AccessResult, Session};
use crate::database::models::Role;

pub fn is_admin(session: &Session) -> bool {
    session.effective_role() == Role::Admin
}

/// Admins hold every psychiatrist capability
pub fn is_psychiatrist(session: &Session) -> bool {
    matches!(session.effective_role(), Role::Psychiatrist | Role::Admin)
}

pub fn require_admin(session: &Session) -> AccessResult<()> {
    if is_admin(session) {
        Ok(())
    } else {
        tracing::info!("Denied admin operation for user {}", session.user_id());
        Err(AccessError::unauthorized("Admin access required"))
    }
}

pub fn require_psychiatrist(session: &Session) -> AccessResult<()> {
    if is_psychiatrist(session) {
        Ok(())
    } else {
        tracing::info!("Denied psychiatrist operation for user {}", session.user_id());
        Err(AccessError::unauthorized("Psychiatrist access required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{Identity, RoleLookup};
    use uuid::Uuid;

    #[test]
    fn admin_is_a_superset_of_psychiatrist() {
        let admin = Session::with_role(Uuid::new_v4(), Role::Admin);
        assert!(is_admin(&admin));
        assert!(is_psychiatrist(&admin));

        let doc = Session::with_role(Uuid::new_v4(), Role::Psychiatrist);
        assert!(!is_admin(&doc));
        assert!(is_psychiatrist(&doc));
        assert!(require_admin(&doc).is_err());

        let user = Session::with_role(Uuid::new_v4(), Role::User);
        assert!(matches!(require_psychiatrist(&user), Err(AccessError::Unauthorized(_))));
    }

    #[test]
    fn transient_lookup_gates_as_user() {
        let session = Session {
            identity: Identity {
                id: Uuid::new_v4(),
                email: "x@example.com".to_string(),
            },
            role_lookup: RoleLookup::TransientError,
        };
        assert!(!is_psychiatrist(&session));
        assert!(require_admin(&session).is_err());
    }
}
