//! Permission system types and utilities.
//!
//! - Role: the five-tier hierarchy and its capabilities
//! - Visibility: who may see unpublished content
//! - Guards: capability checks for mutating routes

pub mod guard;
pub mod role;
pub mod visibility;

pub use guard::{require_capability, ContentManager, Moderator};
pub use role::{can_assign_role, Capability, Role, RoleAssignmentError};
pub use visibility::{is_visible, require_visible, sees_unpublished, Publishable};
