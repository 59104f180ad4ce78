//! # UI Widgets

pub mod forms;
pub mod status_bar;
pub mod tables;

pub use status_bar::render_status_bar;
pub use tables::{render_empty_state, render_table, TableConfig};
