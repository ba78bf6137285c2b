use crate::domains::export::csv_record::CsvRecord;
use crate::domains::export::types::ExportError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// The file name the host shares with the member.
pub const EXPORT_FILE_NAME: &str = "Donations.csv";

/// Writes the rows to `Donations.csv` inside `target_dir`, replacing any
/// previous export. The file is built in a temp file in the same
/// directory and renamed into place, so readers never see a half-written
/// export. Starts with a UTF-8 BOM so spreadsheet apps decode Telugu
/// donor names correctly.
pub fn write_csv<T: CsvRecord>(rows: &[T], target_dir: &Path) -> Result<PathBuf, ExportError> {
    let mut buffer: Vec<u8> = Vec::new();
    buffer.extend_from_slice(b"\xEF\xBB\xBF");
    {
        let mut writer = csv::WriterBuilder::new().from_writer(&mut buffer);
        writer
            .write_record(T::headers())
            .map_err(|e| ExportError::Csv(e.to_string()))?;
        for row in rows {
            writer
                .write_record(row.to_csv())
                .map_err(|e| ExportError::Csv(e.to_string()))?;
        }
        writer.flush().map_err(|e| ExportError::Io(e.to_string()))?;
    }

    let final_path = target_dir.join(EXPORT_FILE_NAME);
    let mut temp_file =
        NamedTempFile::new_in(target_dir).map_err(|e| ExportError::Io(e.to_string()))?;
    temp_file
        .write_all(&buffer)
        .map_err(|e| ExportError::Io(e.to_string()))?;
    temp_file
        .persist(&final_path)
        .map_err(|e| ExportError::Io(e.to_string()))?;
    Ok(final_path)
}
