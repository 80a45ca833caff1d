//! AXENT Common Types
//!
//! Shared types used by the backend-for-frontend and its tests: the role
//! model, user profiles, the AI service contract and marketplace records.

pub mod ai;
pub mod marketplace;
pub mod profile;
pub mod role;

pub use profile::{Coordinates, Location, ProfileUpdate, UserProfile};
pub use role::{InvalidRole, Role};
