//! Role-based access control for page navigations.

pub mod guard;
pub mod permissions;

pub use guard::{navigate, not_found_target, Navigation, LANDING_PATH, SIGN_IN_PATH};
pub use permissions::{home_path, normalize_path, Access, PermissionTable};
