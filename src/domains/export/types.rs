use crate::domains::analytics::types::AggregatedSubmission;
use crate::errors::{DomainError, ServiceError};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use thiserror::Error;

/// Errors raised while materializing an export file.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("CSV error: {0}")]
    Csv(String),
}

impl From<ExportError> for ServiceError {
    fn from(err: ExportError) -> Self {
        ServiceError::Domain(DomainError::Internal(err.to_string()))
    }
}

/// Ordering applied to a projected list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    AmountDesc,
    AmountAsc,
    DateDesc,
}

/// The list-view filters. `text` is matched as a substring against donor
/// name and city (case-insensitive), the phone number as typed, and the
/// collector tag when the record carries one. Dates bound whole calendar
/// days, inclusive on both ends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionFilter {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
}

impl SubmissionFilter {
    pub fn matches(&self, record: &AggregatedSubmission) -> bool {
        if !self.matches_text(record) {
            return false;
        }
        // Records without a timestamp always pass the date filter; hiding
        // them would make old rows unfindable.
        let Some(recorded_at) = record.recorded_at else {
            return true;
        };
        if let Some(from) = self.date_from {
            if let Some(start) = from.and_hms_opt(0, 0, 0) {
                if recorded_at.naive_utc() < start {
                    return false;
                }
            }
        }
        if let Some(to) = self.date_to {
            if let Some(end) = to.and_hms_milli_opt(23, 59, 59, 999) {
                if recorded_at.naive_utc() > end {
                    return false;
                }
            }
        }
        true
    }

    fn matches_text(&self, record: &AggregatedSubmission) -> bool {
        if self.text.is_empty() {
            return true;
        }
        let needle = self.text.to_lowercase();
        record.name.to_lowercase().contains(&needle)
            || record.city.to_lowercase().contains(&needle)
            || record.phone_number.contains(&self.text)
            || record
                .collected_by
                .as_deref()
                .is_some_and(|tag| tag.to_lowercase().contains(&needle))
    }
}

/// Filter and order a record set the way the list view displays it.
/// Returns the rows plus the cash total over the filtered set; in-kind
/// records contribute nothing to the total but sort as amount zero.
pub fn project(
    submissions: &[AggregatedSubmission],
    filter: &SubmissionFilter,
    sort: SortMode,
) -> (Vec<AggregatedSubmission>, Decimal) {
    let mut rows: Vec<AggregatedSubmission> = submissions
        .iter()
        .filter(|record| filter.matches(record))
        .cloned()
        .collect();

    match sort {
        SortMode::AmountDesc => {
            rows.sort_by_key(|record| Reverse(record.amount().unwrap_or(Decimal::ZERO)))
        }
        SortMode::AmountAsc => {
            rows.sort_by_key(|record| record.amount().unwrap_or(Decimal::ZERO))
        }
        SortMode::DateDesc => rows.sort_by_key(|record| {
            Reverse(record.recorded_at.map(|ts| ts.timestamp_millis()).unwrap_or(0))
        }),
    }

    let total_amount = rows.iter().filter_map(AggregatedSubmission::amount).sum();
    (rows, total_amount)
}

/// Result of a completed export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub file_path: String,
    pub rows_written: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::submission::types::DonationDetail;
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn record(
        name: &str,
        city: &str,
        phone: &str,
        recorded_at: Option<DateTime<Utc>>,
        detail: DonationDetail,
    ) -> AggregatedSubmission {
        AggregatedSubmission {
            id: Uuid::new_v4(),
            name: name.to_string(),
            city: city.to_string(),
            gothra: "Kashyapa".to_string(),
            phone_number: phone.to_string(),
            recorded_at,
            member_email: "puja@example.com".to_string(),
            member_name: "Puja Committee".to_string(),
            collected_by: None,
            detail,
        }
    }

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    fn sample() -> Vec<AggregatedSubmission> {
        vec![
            record(
                "Asha",
                "Guntur",
                "9876543210",
                Some(ts(2025, 6, 1, 10, 0, 0)),
                DonationDetail::Cash { amount: dec!(100) },
            ),
            record(
                "Ravi",
                "Tenali",
                "9000000000",
                Some(ts(2025, 6, 2, 23, 59, 59)),
                DonationDetail::Cash { amount: dec!(50) },
            ),
            record(
                "Sita",
                "Ongole",
                "9111111111",
                None,
                DonationDetail::InKind {
                    description: "Rice bags".to_string(),
                },
            ),
        ]
    }

    #[test]
    fn test_text_filter_matches_name_city_phone() {
        let filter = SubmissionFilter {
            text: "guntur".to_string(),
            ..Default::default()
        };
        assert!(filter.matches(&sample()[0]));
        assert!(!filter.matches(&sample()[1]));

        let by_phone = SubmissionFilter {
            text: "90000".to_string(),
            ..Default::default()
        };
        assert!(by_phone.matches(&sample()[1]));
    }

    #[test]
    fn test_text_filter_matches_collector_tag() {
        let mut tagged = sample()[0].clone();
        tagged.collected_by = Some("Durga Prasad".to_string());
        let filter = SubmissionFilter {
            text: "durga".to_string(),
            ..Default::default()
        };
        assert!(filter.matches(&tagged));
        assert!(!filter.matches(&sample()[0]));
    }

    #[test]
    fn test_date_range_is_inclusive_to_end_of_day() {
        let filter = SubmissionFilter {
            text: String::new(),
            date_from: NaiveDate::from_ymd_opt(2025, 6, 2),
            date_to: NaiveDate::from_ymd_opt(2025, 6, 2),
        };
        // 23:59:59 on the end day is still inside the range.
        assert!(filter.matches(&sample()[1]));
        // The previous day is not.
        assert!(!filter.matches(&sample()[0]));
        // Records without a timestamp always pass.
        assert!(filter.matches(&sample()[2]));

        // The bound is millisecond-precise: the last instant of the end
        // day is in, one millisecond later is out.
        let last_ms = NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_milli_opt(23, 59, 59, 999)
            .unwrap()
            .and_utc();
        let at_boundary = record(
            "Edge",
            "Guntur",
            "9222222222",
            Some(last_ms),
            DonationDetail::Cash { amount: dec!(1) },
        );
        assert!(filter.matches(&at_boundary));
        let mut past = at_boundary.clone();
        past.recorded_at = Some(last_ms + chrono::Duration::milliseconds(1));
        assert!(!filter.matches(&past));
    }

    #[test]
    fn test_amount_sort_places_in_kind_at_zero() {
        let (desc, total) = project(&sample(), &SubmissionFilter::default(), SortMode::AmountDesc);
        let names: Vec<&str> = desc.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Asha", "Ravi", "Sita"]);
        assert_eq!(total, dec!(150));

        let (asc, _) = project(&sample(), &SubmissionFilter::default(), SortMode::AmountAsc);
        let names: Vec<&str> = asc.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Sita", "Ravi", "Asha"]);
    }

    #[test]
    fn test_date_sort_puts_missing_timestamps_last() {
        let (rows, _) = project(&sample(), &SubmissionFilter::default(), SortMode::DateDesc);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Ravi", "Asha", "Sita"]);
    }

    #[test]
    fn test_total_reflects_filtered_set_only() {
        let filter = SubmissionFilter {
            text: "Asha".to_string(),
            ..Default::default()
        };
        let (rows, total) = project(&sample(), &filter, SortMode::AmountDesc);
        assert_eq!(rows.len(), 1);
        assert_eq!(total, dec!(100));
    }

    #[test]
    fn test_sort_mode_wire_values() {
        assert_eq!(
            serde_json::to_value(SortMode::AmountDesc).unwrap(),
            "amount_desc"
        );
        assert_eq!(
            serde_json::from_value::<SortMode>(serde_json::Value::String("date_desc".into()))
                .unwrap(),
            SortMode::DateDesc
        );
    }
}
