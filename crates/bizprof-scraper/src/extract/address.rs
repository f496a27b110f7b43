//! US postal addresses from page text, plus formatting of structured ones.

use std::sync::LazyLock;

use regex::Regex;

use crate::jsonld::PostalAddress;

const STREET_TYPES: &str = "street|st|avenue|ave|road|rd|boulevard|blvd|drive|dr|lane|ln|way|court|ct|place|pl|parkway|pkwy|highway|hwy|circle|cir|terrace|ter|trail|trl|square|sq|plaza|plz|pike|route|rte|turnpike|tpke|alley|aly|loop|crossing|xing|expressway|expy|freeway|fwy|center|ctr|path|pass|cove|cv|broadway";

/// Long and short spellings folded to one form for comparison.
const STREET_ABBREVIATIONS: &[(&str, &str)] = &[
    ("street", "st"),
    ("avenue", "ave"),
    ("road", "rd"),
    ("boulevard", "blvd"),
    ("drive", "dr"),
    ("lane", "ln"),
    ("court", "ct"),
    ("place", "pl"),
    ("parkway", "pkwy"),
    ("highway", "hwy"),
    ("circle", "cir"),
    ("terrace", "ter"),
    ("trail", "trl"),
    ("square", "sq"),
    ("plaza", "plz"),
    ("route", "rte"),
    ("turnpike", "tpke"),
    ("alley", "aly"),
    ("crossing", "xing"),
    ("expressway", "expy"),
    ("freeway", "fwy"),
    ("center", "ctr"),
    ("cove", "cv"),
    ("suite", "ste"),
    ("north", "n"),
    ("south", "s"),
    ("east", "e"),
    ("west", "w"),
];

static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    let street = format!(
        r"(?P<street>\d{{1,6}}[A-Za-z]?[ \t]+(?:[^\s,]*[A-Za-z][^\s,]*[ \t]+){{1,5}}?(?i:{STREET_TYPES})\b\.?(?:[ \t]+(?i:north|south|east|west|ne|nw|se|sw|n|s|e|w)\b\.?)?)"
    );
    let unit = r"(?:,?[ \t]*(?P<unit>(?i:suite|ste|unit|apt|bldg|building|floor|fl)\b\.?[ \t]*#?[ \t]*[A-Za-z0-9\-]+|#[ \t]*[A-Za-z0-9\-]+))?";
    let separator = r"[ \t]*[,\n][ \t]*\n?[ \t]*";
    let city = r"(?P<city>[A-Za-z][A-Za-z.'\-]*(?:[ \t]+[A-Za-z][A-Za-z.'\-]*){0,3})";
    let region = r"[ \t]*(?:,[ \t]*|[ \t]+)(?P<state>[A-Z]{2})[ \t]+(?P<zip>\d{5}(?:-\d{4})?)\b";
    Regex::new(&format!(r"\b{street}{unit}{separator}{city}{region}")).expect("valid regex")
});

static HOUSE_NUMBER_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*(\d{1,6})[ \t]*\n[ \t]*").expect("valid regex"));

static UNIT_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[ \t]*\n[ \t]*((?:suite|ste|unit|apt)\b\.?|#[ \t]*\d)").expect("valid regex")
});

static COMMA_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",[ \t]*\n[ \t]*").expect("valid regex"));

static PO_BOX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bp\.?\s*o\.?\s*box\b|\bpost\s+office\b|\bpo\s+box\b").expect("valid regex")
});

static NAV_WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:home|menu|copyright|login|cart|call|phone|email|fax|hours)\b|©")
        .expect("valid regex")
});

/// Spaced-out street words such as `S t r e e t` produced by letter-spaced markup.
static SPACED_WORDS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    ["Street", "Avenue", "Road", "Drive", "Boulevard", "Suite"]
        .into_iter()
        .map(|word| {
            let spaced = word
                .chars()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(r"[ \t]+");
            let re = Regex::new(&format!(r"(?i)\b{spaced}\b")).expect("valid regex");
            (re, word)
        })
        .collect()
});

/// Rejoins street components split across lines before matching.
#[must_use]
pub fn normalize_address_text(text: &str) -> String {
    let mut out = text.replace('|', " ").replace('\r', "");
    out = HOUSE_NUMBER_LINE_RE.replace_all(&out, "$1 ").into_owned();
    out = UNIT_LINE_RE.replace_all(&out, " $1").into_owned();
    out = COMMA_BREAK_RE.replace_all(&out, ", ").into_owned();
    for (re, word) in SPACED_WORDS.iter() {
        out = re.replace_all(&out, *word).into_owned();
    }
    out
}

/// How far before a match to look for a PO box marker.
const PO_BOX_LOOKBACK: usize = 12;

fn preceding(text: &str, start: usize, width: usize) -> &str {
    let mut from = start.saturating_sub(width);
    while !text.is_char_boundary(from) {
        from -= 1;
    }
    &text[from..start]
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A formatted three-line address with its comparison key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressCandidate {
    pub formatted: String,
    pub key: String,
}

/// Comparison key: lower-case alphanumerics of the street line with common
/// abbreviations folded, plus the five-digit ZIP.
#[must_use]
pub fn address_key(street: &str, zip: &str) -> String {
    let tokens: Vec<String> = street
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| {
            STREET_ABBREVIATIONS
                .iter()
                .find(|(long, _)| *long == t)
                .map_or_else(|| t.to_string(), |(_, short)| (*short).to_string())
        })
        .collect();
    let zip5: String = zip.chars().take(5).collect();
    format!("{}|{zip5}", tokens.join(" "))
}

fn format_block(street: &str, city: &str, state: &str, zip: &str, country: &str) -> String {
    format!("{street}\n{city}, {state} {zip}\n{country}")
}

/// Every complete address matched in `text`, in first-seen order.
#[must_use]
pub fn extract_addresses(text: &str) -> Vec<AddressCandidate> {
    let normalized = normalize_address_text(text);
    let mut out: Vec<AddressCandidate> = Vec::new();
    for caps in ADDRESS_RE.captures_iter(&normalized) {
        let (Some(whole), Some(street), Some(city), Some(state), Some(zip)) = (
            caps.get(0),
            caps.name("street"),
            caps.name("city"),
            caps.name("state"),
            caps.name("zip"),
        ) else {
            continue;
        };
        let raw = whole.as_str();
        let lead_in = preceding(&normalized, whole.start(), PO_BOX_LOOKBACK);
        if PO_BOX_RE.is_match(raw)
            || PO_BOX_RE.is_match(lead_in)
            || raw.contains('@')
            || NAV_WORD_RE.is_match(street.as_str())
        {
            continue;
        }

        let mut street_line = collapse(street.as_str());
        if let Some(unit) = caps.name("unit") {
            street_line.push_str(", ");
            street_line.push_str(&collapse(unit.as_str()));
        }
        let key = address_key(&street_line, zip.as_str());
        if out.iter().any(|c| c.key == key) {
            continue;
        }
        out.push(AddressCandidate {
            formatted: format_block(
                &street_line,
                &title_case(city.as_str()),
                state.as_str(),
                zip.as_str(),
                "USA",
            ),
            key,
        });
    }
    out
}

/// Formats a harvested structured address into the same three-line block.
#[must_use]
pub fn format_structured(address: &PostalAddress) -> AddressCandidate {
    let country = match address.country.as_deref().map(str::trim) {
        None | Some("") => "USA".to_string(),
        Some(c)
            if ["us", "usa", "united states", "united states of america"]
                .contains(&c.to_lowercase().as_str()) =>
        {
            "USA".to_string()
        }
        Some(c) => c.to_string(),
    };
    let street = collapse(&address.street);
    AddressCandidate {
        formatted: format_block(
            &street,
            &title_case(&address.locality),
            &address.region.trim().to_uppercase(),
            address.postal_code.trim(),
            &country,
        ),
        key: address_key(&street, &address.postal_code),
    }
}

#[cfg(test)]
#[path = "address_test.rs"]
mod tests;
