//! Statistics islands: the incremental dataset graph and the member export.

pub mod cache;
pub mod chart;
pub mod dates;
pub mod engine;
pub mod export;
pub mod fancy_export;
pub mod graph;
mod view;

pub use view::{FancyExportCard, FancyGraphCard};
