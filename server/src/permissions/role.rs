//! Five-tier role hierarchy and the capabilities derived from it.
//!
//! Every capability is a single rank comparison, so a higher role always
//! holds every capability of the roles below it.

use serde::{Deserialize, Serialize};

/// A user's place in the palace hierarchy.
///
/// Declared highest first; [`Role::rank`] follows declaration order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The traditional ruler (super administrator).
    Ruler,
    /// Palace administrator.
    PalaceAdmin,
    /// Member of the Council of Chiefs.
    Chief,
    /// Registered community member.
    Member,
    /// Public visitor with read-only access.
    Visitor,
}

/// A named permission derived from role rank, never stored on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Create, edit, publish and delete palace content.
    ManageContent,
    /// Triage and respond to community submissions.
    Moderate,
    /// Access reserved for registered community members.
    CommunityMember,
}

impl Capability {
    /// Lowest-ranked role that still holds this capability.
    #[must_use]
    pub const fn minimum_role(self) -> Role {
        match self {
            Self::ManageContent => Role::PalaceAdmin,
            Self::Moderate => Role::Chief,
            Self::CommunityMember => Role::Member,
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::ManageContent => "Manage palace content",
            Self::Moderate => "Moderate community submissions",
            Self::CommunityMember => "Community member access",
        }
    }
}

impl Role {
    /// Total order over roles: `Ruler` = 0 (highest) through `Visitor` = 4.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Ruler => 0,
            Self::PalaceAdmin => 1,
            Self::Chief => 2,
            Self::Member => 3,
            Self::Visitor => 4,
        }
    }

    /// True if this role ranks at or above `other`.
    #[must_use]
    pub const fn is_at_least(self, other: Self) -> bool {
        self.rank() <= other.rank()
    }

    /// True if this role ranks strictly above `other`.
    #[must_use]
    pub const fn outranks(self, other: Self) -> bool {
        self.rank() < other.rank()
    }

    #[must_use]
    pub const fn has(self, capability: Capability) -> bool {
        self.is_at_least(capability.minimum_role())
    }

    #[must_use]
    pub const fn is_ruler(self) -> bool {
        matches!(self, Self::Ruler)
    }

    #[must_use]
    pub const fn can_manage_content(self) -> bool {
        self.has(Capability::ManageContent)
    }

    #[must_use]
    pub const fn can_moderate(self) -> bool {
        self.has(Capability::Moderate)
    }

    #[must_use]
    pub const fn is_chief_or_above(self) -> bool {
        self.is_at_least(Self::Chief)
    }

    #[must_use]
    pub const fn is_palace_admin_or_above(self) -> bool {
        self.is_at_least(Self::PalaceAdmin)
    }

    #[must_use]
    pub const fn is_community_member(self) -> bool {
        self.has(Capability::CommunityMember)
    }

    /// Storage and wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ruler => "ruler",
            Self::PalaceAdmin => "palace_admin",
            Self::Chief => "chief",
            Self::Member => "member",
            Self::Visitor => "visitor",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ruler => "Ejeh (Traditional Ruler)",
            Self::PalaceAdmin => "Palace Administrator",
            Self::Chief => "Council of Chiefs",
            Self::Member => "Community Member",
            Self::Visitor => "Public Visitor",
        }
    }

    /// All roles, highest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Ruler,
            Self::PalaceAdmin,
            Self::Chief,
            Self::Member,
            Self::Visitor,
        ]
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role assignment is not permitted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoleAssignmentError {
    #[error("Role {actor} cannot manage user roles")]
    NotAnAdministrator { actor: Role },

    #[error("The ruler role is only assigned through the privileged creation path")]
    RulerReserved,

    #[error("Role {actor} cannot assign role {target}")]
    Hierarchy { actor: Role, target: Role },
}

/// Check whether `actor` may give another account the `target` role.
///
/// Rules:
/// 1. Actor must be able to manage content
/// 2. Nobody assigns `Ruler` through the admin path
/// 3. Below the ruler, actors assign only roles strictly beneath their own
pub const fn can_assign_role(actor: Role, target: Role) -> Result<(), RoleAssignmentError> {
    if !actor.can_manage_content() {
        return Err(RoleAssignmentError::NotAnAdministrator { actor });
    }
    if target.is_ruler() {
        return Err(RoleAssignmentError::RulerReserved);
    }
    if !actor.is_ruler() && !actor.outranks(target) {
        return Err(RoleAssignmentError::Hierarchy { actor, target });
    }
    Ok(())
}
