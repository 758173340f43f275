//! Login page component.

use crate::user::is_authenticated;
use leptos::prelude::*;

/// Login page - links to the identity provider's sign-in.
#[component]
pub fn LoginPage() -> impl IntoView {
    let signed_in = Resource::new(|| (), |_| is_authenticated());

    view! {
        <div class="login-page">
            <div class="login-box">
                <h1>"Login"</h1>
                <Suspense fallback=move || view! { <p>"Loading..."</p> }>
                    {move || {
                        signed_in.get().map(|result| {
                            match result {
                                Ok(true) => view! {
                                    <p>"You are already signed in."</p>
                                    <a href="/dashboard" class="login-button">"Go to dashboard"</a>
                                }.into_any(),
                                _ => view! {
                                    <p>"Sign in with your iugu account to continue."</p>
                                    <a href="/api/auth/login" rel="external" class="login-button">"Log in with iugu"</a>
                                }.into_any(),
                            }
                        })
                    }}
                </Suspense>
            </div>
        </div>
    }
}
