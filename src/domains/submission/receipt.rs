use crate::domains::submission::types::{DonationDetail, Submission};
use urlencoding::encode;

/// Links embedded in every receipt. These point at the temple's public
/// albums and channels; update them here when the committee rotates one.
pub const TEMPLE_PHOTOS_URL: &str = "https://photos.app.goo.gl/jpfuv7hbrtG67gsM9";
pub const WHATSAPP_GROUP_URL: &str = "https://chat.whatsapp.com/GPoVeARo8FIJDmz08V1oWO";
pub const INVITATION_PDF_URL: &str =
    "https://drive.google.com/file/d/1QmEHulIQZRqumZ-tVAYJ4UjUB9yQJDzG/view?usp=sharing";
pub const MAPS_LOCATION_URL: &str = "https://maps.app.goo.gl/5NKoQcKA87QVDXm37";

/// Fills the temple's Telugu acknowledgement template with donor and
/// collector details. `collector_mobile` is the recording member's own
/// number; a member with no number on file renders as empty parentheses.
pub fn build_receipt_message(submission: &Submission, collector_mobile: Option<&str>) -> String {
    let donation_line = match &submission.detail {
        DonationDetail::Cash { amount } => format!("💰 *చందా మొత్తము:* ₹{:.2}", amount),
        DonationDetail::InKind { description } => format!("🎁 *వస్తువులు:* {}", description),
    };
    format!(
        "✨ *శ్రీ మత్ పర్వత వర్ధని సమేత శ్రీ రామలింగేశ్వర స్వామి వారి దేవస్థానం* ✨
🏛 *నాగెళ్లముడుపు-523371*

━━━━━━━━━━━━━━━━━━━━━━━━

📋 *చందా వివరములు:*

📛 *పేరు:* {name}
🏙️ *ఊరు:* {city}
🕉️ *గోత్రం:* {gothra}
{donation_line}
📱 *ఫోన్ నెంబర్:* {phone}
👤 *చందా స్వీకరించిన వారు:* {collector} ({mobile})

━━━━━━━━━━━━━━━━━━━━━━━━

📸 *దేవస్థానం నందు జరిగిన ఉత్సవాలు, వేడుకలు వీక్షించుటకు:*
{photos}

🛕 *దేవస్థానం ఉత్సవాల తాజా ఫోటోలు,మరియు అప్డేట్స్ కోసం వాట్సాప్ గ్రూప్‌లో చేరండి:*
{group}

📄 *ఆహ్వాన పత్రిక PDF లింక్:*
{pdf}

📍 *దేవస్థానం గూగుల్ మ్యాప్స్ లొకేషన్:*
{maps}

━━━━━━━━━━━━━━━━━━━━━━━━

🙏 *Thank you for your generous donation!* 🙏

📞 *నిత్య పూజల వివరములకు సంప్రదించగలరు:*
*కూనపులి శ్యామల దుర్గా ప్రసాద్* 📱 9949844807

ᵈᵉᵛᵉˡᵒᵖᵉᵈ ᵇʸ ᵐᵛˢᵃᵇʰⁱˢʰᵉᵏ⁹⁶@ᵍᵐᵃⁱˡ.ᶜᵒᵐ",
        name = submission.name,
        city = submission.city,
        gothra = submission.gothra,
        donation_line = donation_line,
        phone = submission.phone_number,
        collector = submission.member_name,
        mobile = collector_mobile.unwrap_or(""),
        photos = TEMPLE_PHOTOS_URL,
        group = WHATSAPP_GROUP_URL,
        pdf = INVITATION_PDF_URL,
        maps = MAPS_LOCATION_URL,
    )
}

/// The shareable link: `https://wa.me/91<donor phone>` with the filled
/// template URL-encoded into the `text` parameter.
pub fn build_receipt_link(submission: &Submission, collector_mobile: Option<&str>) -> String {
    let message = build_receipt_message(submission, collector_mobile);
    format!(
        "https://wa.me/91{}?text={}",
        submission.phone_number,
        encode(&message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn cash_submission() -> Submission {
        Submission {
            id: Uuid::new_v4(),
            name: "Asha".to_string(),
            city: "Guntur".to_string(),
            gothra: "Kashyapa".to_string(),
            phone_number: "9876543210".to_string(),
            recorded_at: Some(Utc::now()),
            member_email: "puja@example.com".to_string(),
            member_name: "Puja Committee".to_string(),
            detail: DonationDetail::Cash { amount: dec!(500.00) },
        }
    }

    #[test]
    fn test_cash_receipt_link_targets_donor_number() {
        let link = build_receipt_link(&cash_submission(), Some("9949844807"));
        assert!(link.starts_with("https://wa.me/919876543210?text="));
        assert!(link.contains("500.00"));
    }

    #[test]
    fn test_message_carries_donor_and_collector_details() {
        let message = build_receipt_message(&cash_submission(), Some("9949844807"));
        assert!(message.contains("₹500.00"));
        assert!(message.contains("Asha"));
        assert!(message.contains("Puja Committee (9949844807)"));
        assert!(message.contains("దేవస్థానం"));
        assert!(message.contains(TEMPLE_PHOTOS_URL));
        assert!(message.contains(MAPS_LOCATION_URL));
    }

    #[test]
    fn test_missing_collector_mobile_renders_empty_parens() {
        let message = build_receipt_message(&cash_submission(), None);
        assert!(message.contains("Puja Committee ()"));
    }

    #[test]
    fn test_in_kind_receipt_lists_items_without_amount() {
        let mut submission = cash_submission();
        submission.detail = DonationDetail::InKind {
            description: "Rice bags".to_string(),
        };
        let message = build_receipt_message(&submission, None);
        assert!(message.contains("Rice bags"));
        assert!(!message.contains("₹"));

        let link = build_receipt_link(&submission, None);
        assert!(link.contains("Rice%20bags"));
    }
}
