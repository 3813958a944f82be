// PDF report rendering for generated content ideas.
// Layout is computed up front (pure, testable); `pdf` only draws the result.

pub mod font_metrics;
pub mod layout;
pub mod pdf;
pub mod sanitize;

pub use pdf::write_report;
