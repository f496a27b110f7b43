//! The business-profile record and the summarizer contract that feeds it.

use serde::{Deserialize, Serialize};

/// Canonical "no value found" sentinel used by every record field.
pub const ABSENCE_MARKER: &str = "None";

/// Judgment fields returned by the summarization collaborator, verbatim.
///
/// Nothing here is trusted; the merge step re-validates every field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SummaryFields {
    pub description: String,
    pub client_base: String,
    pub owner_demographic: String,
    pub products_and_services: String,
    pub hours_of_operation: String,
    pub license_numbers: String,
    pub methods_of_payment: String,
    pub service_area: String,
    pub refund_and_exchange_policy: String,
}

/// Final output of one profile run.
///
/// Every field is a formatted (possibly multi-line) string or
/// [`ABSENCE_MARKER`]; no field is ever empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessProfileRecord {
    pub url: String,
    pub time_taken: String,
    pub description: String,
    pub client_base: String,
    pub owner_demographic: String,
    pub products_and_services: String,
    pub hours_of_operation: String,
    pub addresses: String,
    pub phone_numbers: String,
    pub email_addresses: String,
    pub social_media_urls: String,
    pub license_numbers: String,
    pub methods_of_payment: String,
    pub bbb_seal: String,
    pub service_area: String,
    pub refund_and_exchange_policy: String,
    pub lead_form: String,
    pub lead_form_title: String,
    pub lead_form_url: String,
}

impl BusinessProfileRecord {
    /// A record for `url` with every other field set to the absence marker.
    #[must_use]
    pub fn absent(url: impl Into<String>) -> Self {
        let none = || ABSENCE_MARKER.to_string();
        Self {
            url: url.into(),
            time_taken: none(),
            description: none(),
            client_base: none(),
            owner_demographic: none(),
            products_and_services: none(),
            hours_of_operation: none(),
            addresses: none(),
            phone_numbers: none(),
            email_addresses: none(),
            social_media_urls: none(),
            license_numbers: none(),
            methods_of_payment: none(),
            bbb_seal: none(),
            service_area: none(),
            refund_and_exchange_policy: none(),
            lead_form: none(),
            lead_form_title: none(),
            lead_form_url: none(),
        }
    }
}

/// Returns `value` or the absence marker when it is blank.
#[must_use]
pub fn or_absent(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| ABSENCE_MARKER.to_string())
}

/// Formats a duration as "M minute(s) S second(s)".
#[must_use]
pub fn format_elapsed(elapsed: std::time::Duration) -> String {
    let total = elapsed.as_secs();
    let mins = total / 60;
    let secs = total % 60;
    let plural = |n: u64| if n == 1 { "" } else { "s" };
    format!(
        "{mins} minute{} {secs} second{}",
        plural(mins),
        plural(secs)
    )
}
