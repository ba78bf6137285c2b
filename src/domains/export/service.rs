use crate::auth::Session;
use crate::domains::analytics::types::AggregatedSubmission;
use crate::domains::export::types::ExportSummary;
use crate::domains::export::writer::write_csv;
use crate::domains::permission::Permission;
use crate::errors::{DomainError, ServiceError, ServiceResult};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::task;

/// Trait defining the export operation
#[async_trait]
pub trait ExportService: Send + Sync {
    /// Writes `Donations.csv` into `target_dir` from the rows exactly as
    /// handed over: the caller's current filter and sort order are
    /// preserved, nothing is re-fetched.
    async fn export_submissions(
        &self,
        rows: Vec<AggregatedSubmission>,
        target_dir: PathBuf,
        session: &Session,
    ) -> ServiceResult<ExportSummary>;
}

/// Implementation of the export service
#[derive(Clone, Default)]
pub struct ExportServiceImpl;

impl ExportServiceImpl {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ExportService for ExportServiceImpl {
    async fn export_submissions(
        &self,
        rows: Vec<AggregatedSubmission>,
        target_dir: PathBuf,
        session: &Session,
    ) -> ServiceResult<ExportSummary> {
        session.authorize(Permission::ExportSubmissions)?;

        let rows_written = rows.len();
        let path = task::spawn_blocking(move || write_csv(&rows, &target_dir))
            .await
            .map_err(|e| {
                ServiceError::Domain(DomainError::Internal(format!("Export task failed: {}", e)))
            })??;

        log::info!(
            "Exported {} submissions to {} for {}",
            rows_written,
            path.display(),
            session.member_email
        );
        Ok(ExportSummary {
            file_path: path.to_string_lossy().into_owned(),
            rows_written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::permission::MemberRole;
    use crate::domains::submission::types::DonationDetail;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn rows() -> Vec<AggregatedSubmission> {
        vec![AggregatedSubmission {
            id: Uuid::new_v4(),
            name: "Asha".to_string(),
            city: "Guntur".to_string(),
            gothra: "Kashyapa".to_string(),
            phone_number: "9876543210".to_string(),
            recorded_at: None,
            member_email: "puja@example.com".to_string(),
            member_name: "Puja Committee".to_string(),
            collected_by: None,
            detail: DonationDetail::Cash { amount: dec!(100) },
        }]
    }

    #[tokio::test]
    async fn test_export_writes_file_and_reports_count() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(
            "puja@example.com",
            "Puja Committee",
            None,
            MemberRole::Member,
        );

        let summary = ExportServiceImpl::new()
            .export_submissions(rows(), dir.path().to_path_buf(), &session)
            .await
            .unwrap();
        assert_eq!(summary.rows_written, 1);
        assert!(summary.file_path.ends_with("Donations.csv"));
        assert!(std::path::Path::new(&summary.file_path).exists());
    }
}
