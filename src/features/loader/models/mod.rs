mod load_report;

pub use load_report::{LoadOutcome, RecordDetail, SourceReport};
