pub mod csv_record;
pub mod service;
pub mod types;
pub mod writer;

pub use csv_record::CsvRecord;
pub use service::{ExportService, ExportServiceImpl};
pub use types::{project, ExportError, ExportSummary, SortMode, SubmissionFilter};
pub use writer::{write_csv, EXPORT_FILE_NAME};
