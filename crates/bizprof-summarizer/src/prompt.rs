//! Prompt text for the summarization calls and decoding of the replies.

use std::fmt::Write as _;

use bizprof_core::{SummaryFields, Vocabulary};
use serde_json::Value;

/// Corpus characters sent in one request; the tail beyond this is dropped.
pub const MAX_CORPUS_CHARS: usize = 60_000;

pub const REPAIR_SYSTEM_PROMPT: &str =
    "Return ONLY valid JSON with the exact keys requested. No commentary.";

const DESCRIPTION_TEMPLATE: &str = "[Company Name] provides [products/services offered], including [specific details about products/services]. The company assists clients with [details on the service process].";

/// Keys the model must return, all strings.
const SUMMARY_KEYS: [&str; 9] = [
    "description",
    "clientBase",
    "ownerDemographic",
    "productsAndServices",
    "hoursOfOperation",
    "licenseNumbers",
    "methodsOfPayment",
    "serviceArea",
    "refundAndExchangePolicy",
];

/// System prompt for the judgment-field call, with the approved lists taken
/// from the vocabulary.
#[must_use]
pub fn system_prompt(vocabulary: &Vocabulary) -> String {
    let max = vocabulary.description_max_chars();
    let mut out = String::from(
        "You are a BBB representative enhancing a BBB Business Profile.\n\n\
         INFORMATION SOURCE:\nUse ONLY the provided website content.\n\n\
         EXCLUSIONS:\n\
         - Do not reference other businesses in the industry.\n\
         - Exclude owner names, locations, hours of operation, and time in business unless a field asks for them.\n\
         - Avoid the characters * [ ].\n\
         - Do NOT include links to any websites.\n\n\
         DO NOT INCLUDE:\n\
         - The text \"Business Description\" or any variation.\n\
         - Promotional language of any kind, including these words and phrases: ",
    );
    out.push_str(&vocabulary.banned_phrases().join(", "));
    out.push_str(
        ".\n- Any wording implying trust, endorsement, or popularity.\n\n\
         GENERAL GUIDELINES:\n",
    );
    let _ = writeln!(
        out,
        "- Business Description: factual only, no advertising claims, no history, <={max} characters."
    );
    out.push_str(
        "- If a requested field cannot be satisfied from the website content, return \"None\".\n\n",
    );
    let _ = write!(out, "BUSINESS DESCRIPTION TEMPLATE:\n\"{DESCRIPTION_TEMPLATE}\"\n\n");
    let _ = write!(
        out,
        "CLIENT BASE:\n- Return exactly one of: {}.\n\n",
        vocabulary.client_base_allowed().join(", ")
    );
    out.push_str(
        "PRODUCTS & SERVICES:\n\
         - Comma-separated categories, each item 1-4 words, each word capitalized. No bullets, no service areas. If none, \"None\".\n\n\
         HOURS OF OPERATION:\n\
         - MUST list all seven days in the exact format:\n\
         Monday: 09:00 AM - 05:00 PM\n...\nSunday: Closed\n\
         - If the site does not provide all seven days, return \"None\". NEVER invent or infer.\n\n",
    );
    let _ = write!(
        out,
        "OWNER DEMOGRAPHIC:\n- Return an exact match from this list or \"None\": {}.\n\n",
        vocabulary.owner_demographics().join(", ")
    );
    out.push_str(
        "LICENSE NUMBER(S):\n\
         - For each license found, return exactly:\n\
         License Number: <value or None>\n\
         Issuing Authority: <value or None>\n\
         License Type: <value or None>\n\
         Status: <value or None>\n\
         Expiration Date: <value or None>\n\
         - Blank line between each license. If none, \"None\".\n\n",
    );
    let _ = write!(
        out,
        "METHODS OF PAYMENT:\n- Comma-separated, from this approved list only:\n{}\n- If none, \"None\".\n\n",
        vocabulary.payment_methods().join(", ")
    );
    out.push_str(
        "SERVICE AREA:\n- Geographic areas explicitly listed on the site. If none, \"None\".\n\n\
         REFUND AND EXCHANGE POLICY:\n- Extract policy text if present. If none, \"None\".\n\n\
         OUTPUT:\nReturn strict JSON with keys (all strings):\n",
    );
    for key in SUMMARY_KEYS {
        out.push_str(key);
        out.push('\n');
    }
    out.push_str("Return ONLY JSON.");
    out
}

#[must_use]
pub fn user_prompt(url: &str, corpus: &str) -> String {
    let clipped = match corpus.char_indices().nth(MAX_CORPUS_CHARS) {
        Some((idx, _)) => &corpus[..idx],
        None => corpus,
    };
    format!("Website URL: {url}\n\nWEBSITE CONTENT (verbatim):\n{clipped}\n")
}

#[must_use]
pub fn repair_prompt(raw_reply: &str) -> String {
    format!("Convert to valid JSON:\n{raw_reply}")
}

/// System prompt for the description rewrite call.
#[must_use]
pub fn description_rewrite_prompt(max_chars: usize) -> String {
    format!(
        "Return ONLY the following text, <={max_chars} chars, neutral tone, no promotional words, no links:\nTemplate: \"{DESCRIPTION_TEMPLATE}\""
    )
}

/// The trailing JSON object of a reply, with any code fence removed.
fn json_candidate(raw: &str) -> &str {
    let trimmed = raw.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map_or(trimmed, str::trim);
    match unfenced.find('{') {
        Some(start) if unfenced.ends_with('}') => &unfenced[start..],
        _ => unfenced,
    }
}

/// Coerces a reply value into text: strings verbatim, lists comma-joined,
/// null and missing keys empty.
fn text_of(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| text_of(Some(v)))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Decodes the judgment fields from a model reply. Returns `None` when the
/// reply is not a JSON object.
#[must_use]
pub fn parse_summary(raw: &str) -> Option<SummaryFields> {
    let value: Value = serde_json::from_str(json_candidate(raw)).ok()?;
    let object = value.as_object()?;
    let field = |key: &str| text_of(object.get(key));
    Some(SummaryFields {
        description: field("description"),
        client_base: field("clientBase"),
        owner_demographic: field("ownerDemographic"),
        products_and_services: field("productsAndServices"),
        hours_of_operation: field("hoursOfOperation"),
        license_numbers: field("licenseNumbers"),
        methods_of_payment: field("methodsOfPayment"),
        service_area: field("serviceArea"),
        refund_and_exchange_policy: field("refundAndExchangePolicy"),
    })
}
