//! Permission-gated rendering.
//!
//! [`use_can`] asks the server whether the signed-in caller may perform a set
//! of actions; [`Can`] renders its children only once that answer is a yes.
//! The check is a rendering convenience, not a security boundary: the remote
//! API enforces the same permissions on every call.

use crate::user::check_permissions;
use leptos::prelude::*;
use std::collections::BTreeMap;

/// State of a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionCheck {
    /// The server has not answered yet.
    pub loading: bool,
    /// Every requested action was granted.
    pub allowed: bool,
}

impl PermissionCheck {
    /// A check that has not completed.
    pub const LOADING: Self = Self {
        loading: true,
        allowed: false,
    };

    /// Interprets a server answer for `requested`.
    ///
    /// `None` is still loading. An error, or any requested action that is not
    /// granted, is a denial.
    #[must_use]
    pub fn from_outcome(
        requested: &[String],
        outcome: Option<&Result<BTreeMap<String, bool>, ServerFnError>>,
    ) -> Self {
        match outcome {
            None => Self::LOADING,
            Some(Ok(granted)) => Self {
                loading: false,
                allowed: requested
                    .iter()
                    .all(|action| granted.get(action).copied() == Some(true)),
            },
            Some(Err(_)) => Self {
                loading: false,
                allowed: false,
            },
        }
    }

    /// Whether gated content should be shown.
    #[must_use]
    pub fn should_render(&self) -> bool {
        !self.loading && self.allowed
    }
}

/// Checks `actions` for the signed-in caller.
///
/// The check re-runs whenever `actions` changes.
pub fn use_can(actions: Signal<Vec<String>>) -> Signal<PermissionCheck> {
    let outcome = Resource::new(move || actions.get(), check_permissions);

    Signal::derive(move || {
        let requested = actions.get();
        PermissionCheck::from_outcome(&requested, outcome.get().as_ref())
    })
}

/// Renders `children` only if every action in `actions` is granted.
///
/// Nothing is shown while the check is pending.
#[component]
pub fn Can(#[prop(into)] actions: Signal<Vec<String>>, children: ChildrenFn) -> impl IntoView {
    let check = use_can(actions);

    view! {
        <Suspense fallback=|| ()>
            {
                let children = children.clone();
                move || check.get().should_render().then(|| children())
            }
        </Suspense>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requested(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn granted(entries: &[(&str, bool)]) -> BTreeMap<String, bool> {
        entries
            .iter()
            .map(|(action, allowed)| (action.to_string(), *allowed))
            .collect()
    }

    #[test]
    fn pending_check_is_loading_and_hidden() {
        let check = PermissionCheck::from_outcome(&requested(&["a"]), None);
        assert_eq!(check, PermissionCheck::LOADING);
        assert!(!check.should_render());
    }

    #[test]
    fn all_granted_renders() {
        let outcome = Ok(granted(&[("a", true), ("b", true)]));
        let check = PermissionCheck::from_outcome(&requested(&["a", "b"]), Some(&outcome));
        assert!(check.allowed);
        assert!(check.should_render());
    }

    #[test]
    fn one_denied_hides() {
        let outcome = Ok(granted(&[("a", true), ("b", false)]));
        let check = PermissionCheck::from_outcome(&requested(&["a", "b"]), Some(&outcome));
        assert!(!check.loading);
        assert!(!check.allowed);
    }

    #[test]
    fn missing_entry_is_a_denial() {
        let outcome = Ok(granted(&[("a", true)]));
        let check = PermissionCheck::from_outcome(&requested(&["a", "b"]), Some(&outcome));
        assert!(!check.should_render());
    }

    #[test]
    fn error_is_a_denial() {
        let outcome = Err(ServerFnError::new("Not authenticated"));
        let check = PermissionCheck::from_outcome(&requested(&["a"]), Some(&outcome));
        assert_eq!(
            check,
            PermissionCheck {
                loading: false,
                allowed: false
            }
        );
    }
}
