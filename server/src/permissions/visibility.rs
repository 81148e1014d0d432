//! Publication visibility.
//!
//! A single rule decides who sees unpublished content: only authenticated
//! viewers holding [`Capability::ManageContent`]. Detail lookups go through
//! [`require_visible`], list queries bind [`sees_unpublished`] into SQL as
//! `(is_published OR $n)`.

use crate::auth::Viewer;
use crate::error::{ApiError, ApiResult};

use super::Capability;

/// Content with a publication gate.
pub trait Publishable {
    fn is_published(&self) -> bool;
}

impl<T: Publishable + ?Sized> Publishable for &T {
    fn is_published(&self) -> bool {
        (**self).is_published()
    }
}

/// Whether `viewer` may see unpublished items.
#[must_use]
pub fn sees_unpublished(viewer: &Viewer) -> bool {
    viewer
        .role()
        .is_some_and(|role| role.has(Capability::ManageContent))
}

/// Whether `item` is visible to `viewer`.
#[must_use]
pub fn is_visible<T: Publishable + ?Sized>(item: &T, viewer: &Viewer) -> bool {
    item.is_published() || sees_unpublished(viewer)
}

/// Gate a detail lookup.
///
/// Absent rows and rows hidden from the viewer both become
/// `ApiError::NotFound(kind)`, so the response never reveals that an
/// unpublished item exists.
pub fn require_visible<T: Publishable>(
    item: Option<T>,
    viewer: &Viewer,
    kind: &'static str,
) -> ApiResult<T> {
    match item {
        Some(item) if is_visible(&item, viewer) => Ok(item),
        _ => Err(ApiError::NotFound(kind)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthUser;
    use crate::permissions::Role;
    use uuid::Uuid;

    struct Item(bool);

    impl Publishable for Item {
        fn is_published(&self) -> bool {
            self.0
        }
    }

    fn viewer(role: Role) -> Viewer {
        Viewer::Authenticated(AuthUser {
            id: Uuid::new_v4(),
            email: format!("{role}@example.com"),
            display_name: role.label().to_string(),
            role,
        })
    }

    #[test]
    fn test_published_visible_to_everyone() {
        assert!(is_visible(&Item(true), &Viewer::Anonymous));
        for role in Role::all() {
            assert!(is_visible(&Item(true), &viewer(*role)));
        }
    }

    #[test]
    fn test_unpublished_visible_iff_manage_content() {
        assert!(!is_visible(&Item(false), &Viewer::Anonymous));
        for role in Role::all() {
            assert_eq!(
                is_visible(&Item(false), &viewer(*role)),
                role.can_manage_content(),
                "{role}"
            );
        }
    }

    #[test]
    fn test_sees_unpublished_matches_is_visible() {
        let viewers = std::iter::once(Viewer::Anonymous)
            .chain(Role::all().iter().map(|r| viewer(*r)))
            .collect::<Vec<_>>();
        for v in &viewers {
            assert_eq!(sees_unpublished(v), is_visible(&Item(false), v));
        }
    }

    #[test]
    fn test_hidden_and_absent_are_the_same_not_found() {
        let hidden = require_visible(Some(Item(false)), &viewer(Role::Member), "Event");
        let absent = require_visible(None::<Item>, &viewer(Role::Member), "Event");
        let (Err(hidden), Err(absent)) = (hidden, absent) else {
            panic!("both lookups must fail");
        };
        assert_eq!(hidden.to_string(), absent.to_string());
        assert!(matches!(hidden, ApiError::NotFound("Event")));
        assert!(matches!(absent, ApiError::NotFound("Event")));
    }

    #[test]
    fn test_require_visible_returns_item_for_manager() {
        let item = require_visible(Some(Item(false)), &viewer(Role::PalaceAdmin), "Event");
        assert!(item.is_ok());
    }
}
