use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::types::DonationKind;
use crate::validation::{is_valid_donor_phone, Validate, ValidationBuilder};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// The variant-specific part of a donation.
///
/// On the wire this flattens into the submission object as a `type` tag
/// plus either an `amount` or a `description` field, matching what the
/// host app stores and renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DonationDetail {
    #[serde(rename = "amount")]
    Cash { amount: Decimal },
    #[serde(rename = "inKind")]
    InKind { description: String },
}

impl DonationDetail {
    pub fn kind(&self) -> DonationKind {
        match self {
            DonationDetail::Cash { .. } => DonationKind::Cash,
            DonationDetail::InKind { .. } => DonationKind::InKind,
        }
    }

    /// Cash amount, `None` for in-kind donations.
    pub fn amount(&self) -> Option<Decimal> {
        match self {
            DonationDetail::Cash { amount } => Some(*amount),
            DonationDetail::InKind { .. } => None,
        }
    }

    /// Item description, `None` for cash donations.
    pub fn description(&self) -> Option<&str> {
        match self {
            DonationDetail::Cash { .. } => None,
            DonationDetail::InKind { description } => Some(description.as_str()),
        }
    }
}

/// A recorded donation, cash or in-kind.
///
/// `recorded_at` is optional because rows written by older builds of the
/// host app carry no timestamp. Downstream code must tolerate `None`
/// rather than dropping such rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub gothra: String,
    pub phone_number: String,
    pub recorded_at: Option<DateTime<Utc>>,
    pub member_email: String,
    pub member_name: String,
    #[serde(flatten)]
    pub detail: DonationDetail,
}

impl Submission {
    pub fn kind(&self) -> DonationKind {
        self.detail.kind()
    }
}

/// A validated donation ready to persist. Member attribution comes from
/// the session at write time, never from the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubmission {
    pub name: String,
    pub city: String,
    pub gothra: String,
    pub phone_number: String,
    #[serde(flatten)]
    pub detail: DonationDetail,
}

impl Validate for NewSubmission {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("name", Some(self.name.clone()))
            .required()
            .min_length(1)
            .validate()?;
        ValidationBuilder::new("city", Some(self.city.clone()))
            .required()
            .min_length(1)
            .validate()?;
        ValidationBuilder::new("gothra", Some(self.gothra.clone()))
            .required()
            .min_length(1)
            .validate()?;
        ValidationBuilder::new("phone_number", Some(self.phone_number.clone()))
            .required()
            .donor_phone()
            .validate()?;
        match &self.detail {
            DonationDetail::Cash { amount } => {
                if amount.is_sign_negative() {
                    return Err(DomainError::Validation(ValidationError::invalid_value(
                        "amount",
                        "must not be negative",
                    )));
                }
            }
            DonationDetail::InKind { description } => {
                ValidationBuilder::new("description", Some(description.clone()))
                    .required()
                    .min_length(1)
                    .validate()?;
            }
        }
        Ok(())
    }
}

/// Donor-side corrections to an existing submission. The donation kind
/// itself is immutable; an update carrying the wrong variant's field is
/// rejected against the stored record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSubmission {
    pub name: String,
    pub city: String,
    pub gothra: String,
    pub phone_number: String,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
}

impl UpdateSubmission {
    /// Checks the update against the stored record's kind and returns the
    /// variant payload to write.
    pub fn detail_for(&self, kind: DonationKind) -> DomainResult<DonationDetail> {
        match kind {
            DonationKind::Cash => {
                if self.description.is_some() {
                    return Err(DomainError::Validation(ValidationError::invalid_value(
                        "description",
                        "cannot be set on a cash donation",
                    )));
                }
                let amount = self.amount.ok_or_else(|| {
                    DomainError::Validation(ValidationError::required("amount"))
                })?;
                if amount.is_sign_negative() {
                    return Err(DomainError::Validation(ValidationError::invalid_value(
                        "amount",
                        "must not be negative",
                    )));
                }
                Ok(DonationDetail::Cash { amount })
            }
            DonationKind::InKind => {
                if self.amount.is_some() {
                    return Err(DomainError::Validation(ValidationError::invalid_value(
                        "amount",
                        "cannot be set on an in-kind donation",
                    )));
                }
                let description = self
                    .description
                    .clone()
                    .ok_or_else(|| DomainError::Validation(ValidationError::required("description")))?;
                if description.is_empty() {
                    return Err(DomainError::Validation(ValidationError::min_length(
                        "description",
                        1,
                    )));
                }
                Ok(DonationDetail::InKind { description })
            }
        }
    }
}

impl Validate for UpdateSubmission {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("name", Some(self.name.clone()))
            .required()
            .min_length(1)
            .validate()?;
        ValidationBuilder::new("city", Some(self.city.clone()))
            .required()
            .min_length(1)
            .validate()?;
        ValidationBuilder::new("gothra", Some(self.gothra.clone()))
            .required()
            .min_length(1)
            .validate()?;
        if !is_valid_donor_phone(&self.phone_number) {
            return Err(DomainError::Validation(ValidationError::format(
                "phone_number",
                "must be a 10-digit phone number",
            )));
        }
        Ok(())
    }
}

/// Database row for the `cash_submissions` table.
#[derive(Debug, Clone, FromRow)]
pub struct CashSubmissionRow {
    pub id: String,
    pub member_email: String,
    pub donor_name: String,
    pub city: String,
    pub gothra: String,
    pub phone_number: String,
    pub amount: String,
    pub recorded_at: Option<String>,
    pub member_name: String,
}

impl CashSubmissionRow {
    pub fn into_entity(self) -> DomainResult<Submission> {
        let amount = Decimal::from_str(&self.amount).map_err(|_| {
            DomainError::Internal(format!(
                "Invalid amount in cash_submissions {}: {}",
                self.id, self.amount
            ))
        })?;
        row_into_entity(
            self.id,
            self.donor_name,
            self.city,
            self.gothra,
            self.phone_number,
            self.recorded_at,
            self.member_email,
            self.member_name,
            DonationDetail::Cash { amount },
        )
    }
}

/// Database row for the `in_kind_donations` table.
#[derive(Debug, Clone, FromRow)]
pub struct InKindDonationRow {
    pub id: String,
    pub member_email: String,
    pub donor_name: String,
    pub city: String,
    pub gothra: String,
    pub phone_number: String,
    pub description: String,
    pub recorded_at: Option<String>,
    pub member_name: String,
}

impl InKindDonationRow {
    pub fn into_entity(self) -> DomainResult<Submission> {
        row_into_entity(
            self.id,
            self.donor_name,
            self.city,
            self.gothra,
            self.phone_number,
            self.recorded_at,
            self.member_email,
            self.member_name,
            DonationDetail::InKind {
                description: self.description,
            },
        )
    }
}

#[allow(clippy::too_many_arguments)]
fn row_into_entity(
    id: String,
    donor_name: String,
    city: String,
    gothra: String,
    phone_number: String,
    recorded_at: Option<String>,
    member_email: String,
    member_name: String,
    detail: DonationDetail,
) -> DomainResult<Submission> {
    let parsed_id = Uuid::parse_str(&id).map_err(|_| DomainError::InvalidUuid(id.clone()))?;
    let recorded_at = match recorded_at {
        Some(ts) => Some(
            DateTime::parse_from_rfc3339(&ts)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| {
                    DomainError::Internal(format!("Invalid recorded_at in submission {}: {}", id, ts))
                })?,
        ),
        None => None,
    };
    Ok(Submission {
        id: parsed_id,
        name: donor_name,
        city,
        gothra,
        phone_number,
        recorded_at,
        member_email,
        member_name,
        detail,
    })
}

/// Submission shape handed across the FFI boundary, with RFC 3339
/// timestamps instead of chrono types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub gothra: String,
    pub phone_number: String,
    pub recorded_at: Option<String>,
    pub member_email: String,
    pub member_name: String,
    #[serde(flatten)]
    pub detail: DonationDetail,
}

impl From<Submission> for SubmissionResponse {
    fn from(submission: Submission) -> Self {
        Self {
            id: submission.id,
            name: submission.name,
            city: submission.city,
            gothra: submission.gothra,
            phone_number: submission.phone_number,
            recorded_at: submission.recorded_at.map(|dt| dt.to_rfc3339()),
            member_email: submission.member_email,
            member_name: submission.member_name,
            detail: submission.detail,
        }
    }
}

/// A freshly recorded donation plus the WhatsApp receipt link for it.
#[derive(Debug, Clone, Serialize)]
pub struct RecordedDonation {
    pub submission: SubmissionResponse,
    pub receipt_link: String,
}
