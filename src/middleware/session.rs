use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    Extension,
};

use crate::access::{Identity, Session};
use crate::middleware::AuthUser;
use crate::state::AppState;

/// Resolve the caller's role and attach the [`Session`] to the request.
///
/// Runs after `jwt_auth_middleware`. Role lookup never rejects the request; a missing
/// profile or a store failure leaves the session at the `user` role.
pub async fn session_middleware(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = Identity {
        id: auth_user.user_id,
        email: auth_user.email,
    };
    let session = Session::resolve(state.store.clone(), identity).await;
    tracing::debug!(
        "Session for {} resolved as {:?}",
        session.user_id(),
        session.role_lookup
    );

    request.extensions_mut().insert(session);
    next.run(request).await
}
