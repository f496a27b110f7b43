//! Structured-Data Harvester for schema.org JSON-LD blocks.
//!
//! Decoded values are narrowed into a small set of typed records; anything
//! that does not fit one of them is ignored.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::extract::hours::{canonical_clock, DayHours, Weekday};

static CONCATENATED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\}\s*\{").expect("valid regex"));

/// A street address with every required component present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostalAddress {
    pub street: String,
    pub locality: String,
    pub region: String,
    pub postal_code: String,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataRecord {
    Telephone(String),
    Address(PostalAddress),
    /// One `OpeningHoursSpecification`, possibly covering several days.
    OpeningHours(Vec<(Weekday, DayHours)>),
    RelatedProfile(String),
}

/// Run-scoped collection of structured records, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct StructuredMetadata {
    records: Vec<MetadataRecord>,
}

impl StructuredMetadata {
    pub fn extend(&mut self, other: StructuredMetadata) {
        self.records.extend(other.records);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[MetadataRecord] {
        &self.records
    }

    pub fn telephones(&self) -> impl Iterator<Item = &str> {
        self.records.iter().filter_map(|r| match r {
            MetadataRecord::Telephone(t) => Some(t.as_str()),
            _ => None,
        })
    }

    pub fn addresses(&self) -> impl Iterator<Item = &PostalAddress> {
        self.records.iter().filter_map(|r| match r {
            MetadataRecord::Address(a) => Some(a),
            _ => None,
        })
    }

    pub fn opening_hours(&self) -> impl Iterator<Item = &(Weekday, DayHours)> {
        self.records
            .iter()
            .filter_map(|r| match r {
                MetadataRecord::OpeningHours(days) => Some(days.iter()),
                _ => None,
            })
            .flatten()
    }

    pub fn related_profiles(&self) -> impl Iterator<Item = &str> {
        self.records.iter().filter_map(|r| match r {
            MetadataRecord::RelatedProfile(u) => Some(u.as_str()),
            _ => None,
        })
    }
}

/// Decodes every block and accumulates the records found. Malformed blocks
/// are skipped.
#[must_use]
pub fn harvest<S: AsRef<str>>(blocks: &[S]) -> StructuredMetadata {
    let mut metadata = StructuredMetadata::default();
    for block in blocks {
        let Some(value) = decode_block(block.as_ref()) else {
            tracing::debug!("skipping undecodable ld+json block");
            continue;
        };
        let mut nodes = Vec::new();
        collect_nodes(&value, &mut nodes);
        for node in nodes {
            read_node(node, &mut metadata.records);
        }
    }
    metadata
}

fn decode_block(raw: &str) -> Option<Value> {
    let trimmed = raw.trim().trim_end_matches(';');
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }
    // Some CMS plugins emit several objects back to back in one block.
    if !CONCATENATED_RE.is_match(trimmed) {
        return None;
    }
    let joined = CONCATENATED_RE.replace_all(trimmed, "},{");
    serde_json::from_str::<Value>(&format!("[{joined}]")).ok()
}

/// Flattens arrays, `@graph` containers, and nested objects into a list of
/// candidate nodes.
fn collect_nodes<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_nodes(item, out);
            }
        }
        Value::Object(map) => {
            out.push(value);
            for (key, child) in map {
                // Addresses and hours specifications are read from their parent.
                if matches!(key.as_str(), "address" | "openingHoursSpecification") {
                    continue;
                }
                if child.is_object() || child.is_array() {
                    collect_nodes(child, out);
                }
            }
        }
        _ => {}
    }
}

fn read_node(node: &Value, records: &mut Vec<MetadataRecord>) {
    for phone in strings(node.get("telephone")) {
        records.push(MetadataRecord::Telephone(phone));
    }

    if let Some(address) = node.get("address") {
        for item in objects(address) {
            if let Some(parsed) = postal_address(item) {
                records.push(MetadataRecord::Address(parsed));
            }
        }
    }

    if let Some(spec) = node.get("openingHoursSpecification") {
        for item in objects(spec) {
            if let Some(days) = hours_specification(item) {
                records.push(MetadataRecord::OpeningHours(days));
            }
        }
    }

    for url in strings(node.get("sameAs")) {
        records.push(MetadataRecord::RelatedProfile(url));
    }
}

/// Non-empty strings from a string-or-array field.
fn strings(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Vec::new()
            } else {
                vec![trimmed.to_string()]
            }
        }
        Some(Value::Array(items)) => items.iter().flat_map(|v| strings(Some(v))).collect(),
        _ => Vec::new(),
    }
}

fn objects(value: &Value) -> Vec<&Value> {
    match value {
        Value::Object(_) => vec![value],
        Value::Array(items) => items.iter().filter(|v| v.is_object()).collect(),
        _ => Vec::new(),
    }
}

fn text_field(node: &Value, key: &str) -> Option<String> {
    let text = match node.get(key)? {
        Value::String(s) => s.split_whitespace().collect::<Vec<_>>().join(" "),
        Value::Number(n) => n.to_string(),
        Value::Object(inner) => inner.get("name")?.as_str()?.trim().to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn postal_address(node: &Value) -> Option<PostalAddress> {
    Some(PostalAddress {
        street: text_field(node, "streetAddress")?,
        locality: text_field(node, "addressLocality")?,
        region: text_field(node, "addressRegion")?,
        postal_code: text_field(node, "postalCode")?,
        country: text_field(node, "addressCountry"),
    })
}

fn hours_specification(node: &Value) -> Option<Vec<(Weekday, DayHours)>> {
    let days: Vec<Weekday> = strings(node.get("dayOfWeek"))
        .iter()
        .filter_map(|d| Weekday::parse(d))
        .collect();
    if days.is_empty() {
        return None;
    }

    let opens = text_field(node, "opens")?;
    let closes = text_field(node, "closes")?;
    let hours = if opens.eq_ignore_ascii_case("closed")
        || closes.eq_ignore_ascii_case("closed")
        || (is_midnight(&opens) && is_midnight(&closes))
    {
        DayHours::Closed
    } else {
        DayHours::Open {
            opens: canonical_clock(&opens)?,
            closes: canonical_clock(&closes)?,
        }
    };

    Some(days.into_iter().map(|d| (d, hours.clone())).collect())
}

fn is_midnight(token: &str) -> bool {
    matches!(token.trim(), "00:00" | "00:00:00")
}
