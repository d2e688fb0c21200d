//! Shared UI crate for the Tapir member-administration islands. Platform
//! crates only add routing and launch.

pub mod core;
pub mod i18n;
pub mod shift_management;
pub mod statistics;
pub mod views;
pub mod welcome_desk;

pub mod components {
    pub mod app_navbar;
    pub use app_navbar::register_nav;
    pub use app_navbar::AppNavbar;
    pub use app_navbar::NavBuilder;
}
