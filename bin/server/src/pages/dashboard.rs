//! Dashboard page component.

use crate::components::{Can, LogoutButton};
use leptos::prelude::*;

/// Action required to see the dashboard content.
pub const DASHBOARD_VIEW: &str = "dashboard:view";

/// The protected landing page.
#[component]
pub fn DashboardPage() -> impl IntoView {
    view! {
        <div class="dashboard-page">
            <Can actions=vec![DASHBOARD_VIEW.to_string()]>
                <h1>"Dashboard"</h1>
                <LogoutButton/>
            </Can>
            <h2>"Visible to every signed-in user"</h2>
        </div>
    }
}
