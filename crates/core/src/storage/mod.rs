pub mod reports;

pub use reports::{report_filename, ReportWriter, SaveOutcome};
