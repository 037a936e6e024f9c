//! Terminal rendering helpers.

pub mod table;

pub use table::{colorize_status, list_table, render_list};
