use crate::domains::submission::types::{DonationDetail, NewSubmission, RecordedDonation};
use crate::errors::ValidationError;
use crate::types::DonationKind;
use crate::validation::is_valid_donor_phone;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Raw donation form fields as the host app collects them. Everything is
/// a string until review; the amount is only parsed at save time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub gothra: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub donation_type: DonationKind,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub description: String,
}

impl DraftForm {
    /// Gate for the Draft -> Confirmation transition.
    ///
    /// One banner message per failure, not per-field errors. Fields are
    /// checked for emptiness without trimming, matching the host app's
    /// long-standing behavior.
    pub fn validate_for_review(&self) -> Result<(), ValidationError> {
        if self.name.is_empty()
            || self.city.is_empty()
            || self.gothra.is_empty()
            || self.phone_number.is_empty()
        {
            return Err(ValidationError::message("Please fill in all fields"));
        }
        if !is_valid_donor_phone(&self.phone_number) {
            return Err(ValidationError::message(
                "Please enter a valid 10-digit phone number.",
            ));
        }
        let missing_detail = match self.donation_type {
            DonationKind::Cash => self.amount.is_empty(),
            DonationKind::InKind => self.description.is_empty(),
        };
        if missing_detail {
            return Err(ValidationError::message(
                "Please enter an amount or item description.",
            ));
        }
        Ok(())
    }

    /// Parses the cash amount entered in the form. Not meaningful for
    /// in-kind drafts.
    pub fn parse_amount(&self) -> Result<Decimal, ValidationError> {
        let amount = Decimal::from_str(self.amount.trim())
            .map_err(|_| ValidationError::message("Please enter a valid amount"))?;
        if amount.is_sign_negative() {
            return Err(ValidationError::message("Please enter a valid amount"));
        }
        Ok(amount)
    }

    /// The amount line shown on the review screen for cash drafts.
    pub fn amount_label(&self) -> Result<String, ValidationError> {
        Ok(format!("₹{:.2}", self.parse_amount()?))
    }

    /// Converts a reviewed draft into a persistable submission.
    pub fn to_new_submission(&self) -> Result<NewSubmission, ValidationError> {
        self.validate_for_review()?;
        let detail = match self.donation_type {
            DonationKind::Cash => DonationDetail::Cash {
                amount: self.parse_amount()?,
            },
            DonationKind::InKind => DonationDetail::InKind {
                description: self.description.clone(),
            },
        };
        Ok(NewSubmission {
            name: self.name.clone(),
            city: self.city.clone(),
            gothra: self.gothra.clone(),
            phone_number: self.phone_number.clone(),
            detail,
        })
    }
}

/// The donation entry flow: Draft -> Confirmation -> Saved.
///
/// Confirmation is read-only; the only ways out are `back()` to the exact
/// prior draft or a successful save. A failed save leaves the entry in
/// Confirmation so the member can retry.
#[derive(Debug, Clone)]
pub enum DonationEntry {
    Draft(DraftForm),
    Confirmation(DraftForm),
    Saved(RecordedDonation),
}

impl Default for DonationEntry {
    fn default() -> Self {
        Self::new()
    }
}

impl DonationEntry {
    pub fn new() -> Self {
        DonationEntry::Draft(DraftForm::default())
    }

    /// The editable form, present only while drafting.
    pub fn form_mut(&mut self) -> Option<&mut DraftForm> {
        match self {
            DonationEntry::Draft(form) => Some(form),
            _ => None,
        }
    }

    /// Moves a valid draft to the review screen. On validation failure the
    /// draft is left untouched and the banner message is returned.
    pub fn review(&mut self) -> Result<(), ValidationError> {
        match self {
            DonationEntry::Draft(form) => {
                form.validate_for_review()?;
                let form = std::mem::take(form);
                *self = DonationEntry::Confirmation(form);
                Ok(())
            }
            DonationEntry::Confirmation(_) => Ok(()),
            DonationEntry::Saved(_) => Err(ValidationError::entity(
                "Donation already saved; start a new entry",
            )),
        }
    }

    /// Returns from review to editing, restoring the prior field values.
    pub fn back(&mut self) {
        if let DonationEntry::Confirmation(form) = self {
            let form = std::mem::take(form);
            *self = DonationEntry::Draft(form);
        }
    }

    /// The reviewed form awaiting save, if any.
    pub fn confirmed(&self) -> Option<&DraftForm> {
        match self {
            DonationEntry::Confirmation(form) => Some(form),
            _ => None,
        }
    }

    /// Marks the reviewed donation as persisted.
    pub fn complete(&mut self, recorded: RecordedDonation) -> Result<(), ValidationError> {
        match self {
            DonationEntry::Confirmation(_) => {
                *self = DonationEntry::Saved(recorded);
                Ok(())
            }
            _ => Err(ValidationError::entity("No reviewed donation to save")),
        }
    }

    /// "Make Another Donation": discard everything and start fresh.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_cash_form() -> DraftForm {
        DraftForm {
            name: "Asha".to_string(),
            city: "Guntur".to_string(),
            gothra: "Kashyapa".to_string(),
            phone_number: "9876543210".to_string(),
            donation_type: DonationKind::Cash,
            amount: "500.00".to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_review_rejects_missing_fields_with_single_banner() {
        let mut entry = DonationEntry::new();
        entry.form_mut().unwrap().name = "Asha".to_string();
        let err = entry.review().unwrap_err();
        assert_eq!(err.to_string(), "Please fill in all fields");
        // A failed review leaves the draft editable and untouched.
        assert_eq!(entry.form_mut().unwrap().name, "Asha");
    }

    #[test]
    fn test_review_rejects_short_phone() {
        let mut entry = DonationEntry::Draft(DraftForm {
            phone_number: "98765".to_string(),
            ..filled_cash_form()
        });
        let err = entry.review().unwrap_err();
        assert_eq!(err.to_string(), "Please enter a valid 10-digit phone number.");
    }

    #[test]
    fn test_review_requires_amount_or_description() {
        let mut entry = DonationEntry::Draft(DraftForm {
            amount: String::new(),
            ..filled_cash_form()
        });
        let err = entry.review().unwrap_err();
        assert_eq!(err.to_string(), "Please enter an amount or item description.");
    }

    #[test]
    fn test_review_and_back_preserve_field_values() {
        let form = filled_cash_form();
        let mut entry = DonationEntry::Draft(form.clone());

        entry.review().unwrap();
        assert_eq!(entry.confirmed(), Some(&form));

        entry.back();
        assert_eq!(entry.form_mut().map(|f| f.clone()), Some(form));
    }

    #[test]
    fn test_confirmation_amount_label() {
        let form = filled_cash_form();
        assert_eq!(form.amount_label().unwrap(), "₹500.00");

        let whole = DraftForm {
            amount: "500".to_string(),
            ..filled_cash_form()
        };
        assert_eq!(whole.amount_label().unwrap(), "₹500.00");
    }

    #[test]
    fn test_parse_amount_rejects_garbage_and_negatives() {
        let bad = DraftForm {
            amount: "50x".to_string(),
            ..filled_cash_form()
        };
        assert_eq!(
            bad.parse_amount().unwrap_err().to_string(),
            "Please enter a valid amount"
        );

        let negative = DraftForm {
            amount: "-10".to_string(),
            ..filled_cash_form()
        };
        assert!(negative.parse_amount().is_err());
    }

    #[test]
    fn test_reset_returns_to_fresh_draft() {
        let mut entry = DonationEntry::Draft(filled_cash_form());
        entry.review().unwrap();
        entry.reset();
        assert_eq!(entry.form_mut().map(|f| f.clone()), Some(DraftForm::default()));
    }
}
