//! Per-navigation access decisions and the middleware that enforces them.

use std::sync::Arc;

use axent_common::Role;
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use super::permissions::{home_path, PermissionTable};
use crate::auth::{AuthError, Session};
use crate::error::AppError;
use crate::AppState;

pub const SIGN_IN_PATH: &str = "/sign-in";
pub const LANDING_PATH: &str = "/";

/// What to do with a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Allow,
    Redirect(String),
}

/// Decide a page navigation.
///
/// Unauthenticated users are sent to sign-in, authenticated users without
/// permission to their home route. Paths the table does not cover at all
/// go home, or to the landing page when signed out.
pub fn navigate(table: &PermissionTable, path: &str, role: Option<Role>) -> Navigation {
    if !table.covers(path) {
        return Navigation::Redirect(not_found_target(role).to_string());
    }

    if table.resolve(path, role).is_allowed() {
        return Navigation::Allow;
    }

    match role {
        None => Navigation::Redirect(SIGN_IN_PATH.to_string()),
        Some(role) => Navigation::Redirect(home_path(role).to_string()),
    }
}

/// Where a navigation to an unserved path lands.
pub fn not_found_target(role: Option<Role>) -> &'static str {
    match role {
        Some(role) => home_path(role),
        None => LANDING_PATH,
    }
}

/// Verify the request's session token (if any) and sync its profile.
///
/// Token problems are not errors here: the request simply has no identity.
pub async fn resolve_session(state: &AppState, headers: &HeaderMap) -> Session {
    let identity = match state.jwks_client.authenticate(headers).await {
        Ok(identity) => Some(identity),
        Err(AuthError::MissingToken) => None,
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring unusable session token");
            None
        }
    };

    state.sessions.sync(identity).await
}

/// Attach the caller's session without gating. Used on public pages.
pub async fn attach_session(State(state): State<Arc<AppState>>, mut request: Request, next: Next) -> Response {
    let session = resolve_session(&state, request.headers()).await;
    request.extensions_mut().insert(session);
    next.run(request).await
}

/// Gate a role module page; denied navigations become 303 redirects.
pub async fn require_page_access(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = resolve_session(&state, request.headers()).await;
    let path = request.uri().path().to_string();

    match navigate(&state.permissions, &path, session.role()) {
        Navigation::Allow => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Navigation::Redirect(target) => {
            tracing::info!(
                path = %path,
                role = ?session.role(),
                redirect = %target,
                "Navigation denied"
            );
            Redirect::to(&target).into_response()
        }
    }
}

/// Require a signed-in profile on JSON APIs (401 otherwise).
pub async fn require_session(State(state): State<Arc<AppState>>, mut request: Request, next: Next) -> Response {
    let session = resolve_session(&state, request.headers()).await;
    if !session.is_authenticated() {
        return AppError::Unauthorized.into_response();
    }
    request.extensions_mut().insert(session);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use Role::{Admin, Customer, Organization, Provider};

    #[rstest]
    #[case("/provider/dashboard", None, Navigation::Redirect("/sign-in".into()))]
    #[case("/provider/dashboard", Some(Customer), Navigation::Redirect("/customer/dashboard".into()))]
    #[case("/provider/dashboard", Some(Admin), Navigation::Allow)]
    #[case("/provider/dashboard", Some(Provider), Navigation::Allow)]
    #[case("/admin/dashboard", Some(Organization), Navigation::Redirect("/organization/dashboard".into()))]
    #[case("/customer/estimator", Some(Customer), Navigation::Allow)]
    #[case("/settings", Some(Provider), Navigation::Redirect("/provider/dashboard".into()))]
    #[case("/settings", None, Navigation::Redirect("/".into()))]
    #[case("/customer/../admin", Some(Customer), Navigation::Redirect("/customer/dashboard".into()))]
    fn test_navigate(#[case] path: &str, #[case] role: Option<Role>, #[case] expected: Navigation) {
        let table = PermissionTable::standard();
        assert_eq!(navigate(&table, path, role), expected);
    }

    #[test]
    fn test_not_found_target() {
        assert_eq!(not_found_target(None), LANDING_PATH);
        assert_eq!(not_found_target(Some(Admin)), "/admin/dashboard");
    }

    #[test]
    fn test_redirect_never_targets_a_denied_page() {
        let table = PermissionTable::standard();
        for role in Role::ALL {
            for path in ["/customer/x", "/organization/x", "/provider/x", "/admin/x", "/nope"] {
                if let Navigation::Redirect(target) = navigate(&table, path, Some(role)) {
                    assert_eq!(navigate(&table, &target, Some(role)), Navigation::Allow);
                }
            }
        }
    }
}
