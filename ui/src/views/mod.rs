mod home;
mod shift_management;
mod statistics;
mod welcome_desk;

pub use home::Home;
pub use shift_management::{Qualifications, ShiftWarnings};
pub use statistics::{StatisticsExport, StatisticsGraph};
pub use welcome_desk::WelcomeDesk;
