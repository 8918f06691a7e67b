mod file;

pub use file::{CategorySummary, CategoryUsage, FileCategory, FileRecord, UsageSummary};
