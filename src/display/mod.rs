//! Console reporter
//!
//! Prints the export as an indented tree for whoever is watching the run.
//! Output only; nothing here feeds back into the export.

mod tree;

pub use tree::render_tree;

use crate::models::ExportResult;

/// Print the export tree to stdout
pub fn print_tree(result: &ExportResult) {
    print!("{}", render_tree(result));
}
