use crate::domains::analytics::types::AggregatedSubmission;
use crate::domains::submission::types::DonationDetail;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Trait for types that can be exported to CSV
pub trait CsvRecord: Serialize {
    /// Get CSV headers for this type
    fn headers() -> Vec<&'static str>;

    /// Convert to CSV row
    fn to_csv(&self) -> Vec<String>;
}

/// Dates in the export file are day-granular; spreadsheet users compare
/// them against the receipt date, not a clock.
pub fn csv_date_to_string(dt: &Option<DateTime<Utc>>) -> String {
    dt.map(|dt| dt.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

impl CsvRecord for AggregatedSubmission {
    fn headers() -> Vec<&'static str> {
        vec![
            "Name",
            "City",
            "Donation Type",
            "Amount",
            "Items",
            "Phone Number",
            "Date",
            "Collected By",
        ]
    }

    fn to_csv(&self) -> Vec<String> {
        // Amount and Items are mutually exclusive columns; the empty one
        // tells the spreadsheet reader which kind the row is.
        let (amount, items) = match &self.detail {
            DonationDetail::Cash { amount } => (amount.to_string(), String::new()),
            DonationDetail::InKind { description } => (String::new(), description.clone()),
        };
        vec![
            self.name.clone(),
            self.city.clone(),
            self.detail.kind().as_str().to_string(),
            amount,
            items,
            self.phone_number.clone(),
            csv_date_to_string(&self.recorded_at),
            self.collector_label().to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn cash_record() -> AggregatedSubmission {
        AggregatedSubmission {
            id: Uuid::new_v4(),
            name: "Asha".to_string(),
            city: "Guntur".to_string(),
            gothra: "Kashyapa".to_string(),
            phone_number: "9876543210".to_string(),
            recorded_at: Some(Utc.with_ymd_and_hms(2025, 6, 3, 18, 45, 0).unwrap()),
            member_email: "puja@example.com".to_string(),
            member_name: "Puja Committee".to_string(),
            collected_by: None,
            detail: DonationDetail::Cash { amount: dec!(500.00) },
        }
    }

    #[test]
    fn test_cash_row_cells() {
        let row = cash_record().to_csv();
        assert_eq!(
            row,
            vec![
                "Asha",
                "Guntur",
                "amount",
                "500.00",
                "",
                "9876543210",
                "03/06/2025",
                "Puja Committee",
            ]
        );
    }

    #[test]
    fn test_in_kind_row_swaps_amount_for_items() {
        let mut record = cash_record();
        record.detail = DonationDetail::InKind {
            description: "Rice bags".to_string(),
        };
        record.recorded_at = None;
        record.collected_by = Some("Durga Prasad".to_string());

        let row = record.to_csv();
        assert_eq!(row[2], "inKind");
        assert_eq!(row[3], "");
        assert_eq!(row[4], "Rice bags");
        assert_eq!(row[6], "N/A");
        assert_eq!(row[7], "Durga Prasad");
    }

    #[test]
    fn test_headers_match_row_width() {
        assert_eq!(
            AggregatedSubmission::headers().len(),
            cash_record().to_csv().len()
        );
    }
}
