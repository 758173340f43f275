//! Reusable UI components.

pub mod can;
pub mod logout_button;

pub use can::{Can, PermissionCheck, use_can};
pub use logout_button::LogoutButton;
