//! Welcome-desk island: member lookup at the shop entrance.

pub mod search;
mod view;

pub use view::WelcomeDeskCard;
