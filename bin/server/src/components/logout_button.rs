//! Logout button component.

use leptos::prelude::*;

/// Route that clears the session cookie.
pub const LOGOUT_PATH: &str = "/api/auth/logout";

/// Button that signs the user out.
///
/// Logout is a full page navigation so the server can clear the HTTP-only
/// session cookie.
#[component]
pub fn LogoutButton() -> impl IntoView {
    let on_click = move |_: leptos::ev::MouseEvent| {
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(window) = web_sys::window()
                && window.location().set_href(LOGOUT_PATH).is_err()
            {
                leptos::logging::warn!("failed to navigate to {}", LOGOUT_PATH);
            }
        }
    };

    view! {
        <button type="button" class="logout-button" on:click=on_click>
            "Log out"
        </button>
    }
}
