//! Opening-hours extraction and strict seven-day normalization.
//!
//! A result is produced only when every weekday resolves to explicit hours
//! or an explicit "Closed". Missing days are never inferred.

use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::jsonld::StructuredMetadata;

const DAY_FULL: &str = "monday|tuesday|wednesday|thursday|friday|saturday|sunday";
const DAY_ANY: &str = r"mon(?:day)?|tue(?:s(?:day)?)?|wed(?:nesday)?|thu(?:r(?:s(?:day)?)?)?|fri(?:day)?|sat(?:urday)?|sun(?:day)?";
const TIME: &str = r"(?:\d{1,2}(?::\d{2}){0,2}\s*(?:[ap]\.?\s?m\b\.?)?|noon|midnight)";
const SEP: &str = r"\s*(?:-|–|—|to|until|till)\s*";

fn value_pattern() -> String {
    format!(r"(?:(?P<closed>closed)|(?P<open>{TIME}){SEP}(?P<close>{TIME}))")
}

static EXPLICIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?P<day>{DAY_FULL})s?\b\s*[:\-–—]?\s*{}",
        value_pattern()
    ))
    .expect("valid regex")
});

static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?P<from>{DAY_ANY})\b\.?\s*(?:-|–|—|to|through|thru)\s*(?P<to>{DAY_ANY})\b\.?\s*:?\s*{}",
        value_pattern()
    ))
    .expect("valid regex")
});

static LIST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?P<days>(?:{DAY_ANY})\b\.?(?:\s*(?:,|&|and|/)\s*(?:{DAY_ANY})\b\.?)*)\s*:?\s*{}",
        value_pattern()
    ))
    .expect("valid regex")
});

static GROUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?P<group>weekdays|weekends|daily|every\s*day|7\s*days(?:\s*a\s*week)?)\b\s*:?\s*{}",
        value_pattern()
    ))
    .expect("valid regex")
});

static CLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d{1,2})(?::(\d{2}))?(?::\d{2})?\s*(?:([ap])\.?\s?m\.?)?$")
        .expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    /// Parses a day name, a common abbreviation, or a schema.org day URL.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let last = token.trim().rsplit('/').next().unwrap_or_default();
        let lowered = last.trim_end_matches('.').to_ascii_lowercase();
        let day = match lowered.as_str() {
            "monday" | "mon" | "mo" => Weekday::Monday,
            "tuesday" | "tue" | "tues" | "tu" => Weekday::Tuesday,
            "wednesday" | "wed" | "we" => Weekday::Wednesday,
            "thursday" | "thu" | "thur" | "thurs" | "th" => Weekday::Thursday,
            "friday" | "fri" | "fr" => Weekday::Friday,
            "saturday" | "sat" | "sa" => Weekday::Saturday,
            "sunday" | "sun" | "su" => Weekday::Sunday,
            _ => return None,
        };
        Some(day)
    }
}

/// One day's resolved hours in canonical clock form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayHours {
    Open { opens: String, closes: String },
    Closed,
}

impl fmt::Display for DayHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayHours::Open { opens, closes } => write!(f, "{opens} - {closes}"),
            DayHours::Closed => f.write_str("Closed"),
        }
    }
}

/// Day slots filled first-seen-wins.
#[derive(Debug, Clone, Default)]
struct WeekHours {
    days: [Option<DayHours>; 7],
}

impl WeekHours {
    fn set_if_absent(&mut self, day: Weekday, hours: DayHours) {
        let slot = &mut self.days[day.index()];
        if slot.is_none() {
            *slot = Some(hours);
        }
    }

    fn render(&self) -> Option<String> {
        let mut lines = Vec::with_capacity(7);
        for day in Weekday::ALL {
            let hours = self.days[day.index()].as_ref()?;
            lines.push(format!("{}: {hours}", day.name()));
        }
        Some(lines.join("\n"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

#[derive(Debug, Clone, Copy)]
struct ClockTime {
    hour: u32,
    minute: u32,
    meridiem: Option<Meridiem>,
    has_minutes: bool,
}

fn parse_clock(token: &str) -> Option<ClockTime> {
    let t = token.trim().to_ascii_lowercase();
    match t.as_str() {
        "noon" => {
            return Some(ClockTime {
                hour: 12,
                minute: 0,
                meridiem: Some(Meridiem::Pm),
                has_minutes: true,
            })
        }
        "midnight" => {
            return Some(ClockTime {
                hour: 12,
                minute: 0,
                meridiem: Some(Meridiem::Am),
                has_minutes: true,
            })
        }
        _ => {}
    }
    let caps = CLOCK_RE.captures(&t)?;
    let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u32 = caps
        .get(2)
        .map_or(Ok(0), |m| m.as_str().parse())
        .ok()?;
    let meridiem = caps.get(3).map(|m| {
        if m.as_str() == "a" {
            Meridiem::Am
        } else {
            Meridiem::Pm
        }
    });
    if minute > 59 {
        return None;
    }
    Some(ClockTime {
        hour,
        minute,
        meridiem,
        has_minutes: caps.get(2).is_some(),
    })
}

fn to_24h(time: ClockTime, meridiem: Meridiem) -> Option<u32> {
    if !(1..=12).contains(&time.hour) {
        return None;
    }
    Some(match meridiem {
        Meridiem::Am => time.hour % 12,
        Meridiem::Pm => time.hour % 12 + 12,
    })
}

/// Formats a 24-hour time as `hh:MM AM`.
fn format_clock(hour24: u32, minute: u32) -> String {
    let suffix = if hour24 >= 12 { "PM" } else { "AM" };
    let hour12 = match hour24 % 12 {
        0 => 12,
        h => h,
    };
    format!("{hour12:02}:{minute:02} {suffix}")
}

/// Normalizes a single time token (`17:00`, `17:00:00`, `5 PM`) to clock form.
pub(crate) fn canonical_clock(token: &str) -> Option<String> {
    let time = parse_clock(token)?;
    let hour24 = match time.meridiem {
        Some(m) => to_24h(time, m)?,
        None if time.hour <= 23 => time.hour,
        None => return None,
    };
    Some(format_clock(hour24, time.minute))
}

/// Resolves an open/close pair, inferring a missing meridiem from the other
/// side. Bare numbers without a meridiem on either side are accepted only as
/// `HH:MM` pairs.
fn resolve_range(open: ClockTime, close: ClockTime) -> Option<DayHours> {
    let (open_m, close_m) = match (open.meridiem, close.meridiem) {
        (Some(a), Some(b)) => (a, b),
        (None, Some(b)) => (infer_open(open.hour, close.hour, b), b),
        (Some(a), None) => (a, infer_close(open.hour, close.hour, a)),
        (None, None) => {
            if !(open.has_minutes && close.has_minutes) || open.hour > 23 || close.hour > 23 {
                return None;
            }
            return Some(DayHours::Open {
                opens: format_clock(open.hour, open.minute),
                closes: format_clock(close.hour, close.minute),
            });
        }
    };
    Some(DayHours::Open {
        opens: format_clock(to_24h(open, open_m)?, open.minute),
        closes: format_clock(to_24h(close, close_m)?, close.minute),
    })
}

fn infer_open(open_hour: u32, close_hour: u32, close_m: Meridiem) -> Meridiem {
    let earlier = open_hour % 12 < close_hour % 12;
    match (close_m, earlier) {
        (Meridiem::Pm, true) | (Meridiem::Am, false) => Meridiem::Pm,
        (Meridiem::Pm, false) | (Meridiem::Am, true) => Meridiem::Am,
    }
}

fn infer_close(open_hour: u32, close_hour: u32, open_m: Meridiem) -> Meridiem {
    let later = close_hour % 12 > open_hour % 12;
    match (open_m, later) {
        (Meridiem::Am, true) | (Meridiem::Pm, false) => Meridiem::Am,
        (Meridiem::Am, false) | (Meridiem::Pm, true) => Meridiem::Pm,
    }
}

fn value_from(caps: &Captures<'_>) -> Option<DayHours> {
    if caps.name("closed").is_some() {
        return Some(DayHours::Closed);
    }
    let open = parse_clock(caps.name("open")?.as_str())?;
    let close = parse_clock(caps.name("close")?.as_str())?;
    resolve_range(open, close)
}

fn day_span(from: Weekday, to: Weekday) -> Vec<Weekday> {
    let start = from.index();
    let end = to.index();
    let len = if end >= start { end - start + 1 } else { end + 8 - start };
    (0..len).map(|i| Weekday::ALL[(start + i) % 7]).collect()
}

fn group_days(group: &str) -> Vec<Weekday> {
    let lowered = group.to_ascii_lowercase();
    if lowered.starts_with("weekdays") {
        Weekday::ALL[..5].to_vec()
    } else if lowered.starts_with("weekends") {
        Weekday::ALL[5..].to_vec()
    } else {
        Weekday::ALL.to_vec()
    }
}

/// Parses free text into the canonical seven-line block.
///
/// Explicit `Weekday: value` statements win over day-range shorthand, which
/// wins over list and group shorthand. Returns `None` unless all seven days
/// resolve.
#[must_use]
pub fn normalize_hours_text(text: &str) -> Option<String> {
    let mut week = WeekHours::default();

    for caps in EXPLICIT_RE.captures_iter(text) {
        let (Some(day), Some(hours)) = (
            caps.name("day").and_then(|m| Weekday::parse(m.as_str())),
            value_from(&caps),
        ) else {
            continue;
        };
        week.set_if_absent(day, hours);
    }

    for caps in RANGE_RE.captures_iter(text) {
        let (Some(from), Some(to), Some(hours)) = (
            caps.name("from").and_then(|m| Weekday::parse(m.as_str())),
            caps.name("to").and_then(|m| Weekday::parse(m.as_str())),
            value_from(&caps),
        ) else {
            continue;
        };
        for day in day_span(from, to) {
            week.set_if_absent(day, hours.clone());
        }
    }

    for caps in LIST_RE.captures_iter(text) {
        let (Some(days), Some(hours)) = (caps.name("days"), value_from(&caps)) else {
            continue;
        };
        for day in days
            .as_str()
            .split(|c: char| !c.is_ascii_alphabetic())
            .filter_map(Weekday::parse)
        {
            week.set_if_absent(day, hours.clone());
        }
    }

    for caps in GROUP_RE.captures_iter(text) {
        let (Some(group), Some(hours)) = (caps.name("group"), value_from(&caps)) else {
            continue;
        };
        for day in group_days(group.as_str()) {
            week.set_if_absent(day, hours.clone());
        }
    }

    week.render()
}

/// Builds the canonical block from structured entries, first entry per day
/// winning. `None` unless all seven days are present.
#[must_use]
pub fn hours_from_structured<'a, I>(entries: I) -> Option<String>
where
    I: IntoIterator<Item = &'a (Weekday, DayHours)>,
{
    let mut week = WeekHours::default();
    for (day, hours) in entries {
        week.set_if_absent(*day, hours.clone());
    }
    week.render()
}

/// Structured seven-day hours first, then the corpus text.
#[must_use]
pub fn extract_hours(metadata: &StructuredMetadata, corpus: &str) -> Option<String> {
    hours_from_structured(metadata.opening_hours()).or_else(|| normalize_hours_text(corpus))
}

#[cfg(test)]
#[path = "hours_test.rs"]
mod tests;
