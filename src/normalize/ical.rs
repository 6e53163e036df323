//! Block-structured calendar text (iCalendar).
//!
//! Records open with `BEGIN:<NAME>` and close with `END:<NAME>`; inside
//! them every line is `KEY[;PARAM=V...]:VALUE`. Only four properties of
//! a `VEVENT` matter: `SUMMARY`, `DTSTART`, `DTEND` and `RRULE`.
//! Everything else (UID, ORGANIZER, ATTENDEE, DESCRIPTION, LOCATION,
//! STATUS, SEQUENCE, timestamps, nested `VALARM`s, `VTIMEZONE`
//! definitions) is structurally accepted and ignored.
//!
//! # Reference
//! RFC 5545, Sections 3.1 (content lines) and 3.6.1 (VEVENT)

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use super::{collect_occurrences, RawEvent};
use crate::error::JudgeError;
use crate::models::CalendarEvent;
use crate::time::parse_ical_instant;

/// A parsed content line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Property<'a> {
    /// Upper-cased property name.
    pub(crate) name: String,
    /// `(NAME, value)` parameter pairs, names upper-cased, quotes removed.
    pub(crate) params: Vec<(String, String)>,
    /// Raw value.
    pub(crate) value: &'a str,
}

impl Property<'_> {
    /// Looks up a parameter value by name.
    pub(crate) fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Splits a content line into name, parameters and value.
///
/// Colons and semicolons inside double-quoted parameter values do not
/// split. Returns `None` for lines without a `:` separator.
pub(crate) fn parse_property(line: &str) -> Option<Property<'_>> {
    let mut in_quotes = false;
    let mut colon = None;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ':' if !in_quotes => {
                colon = Some(i);
                break;
            }
            _ => {}
        }
    }
    let colon = colon?;
    let (head, value) = (&line[..colon], &line[colon + 1..]);

    let mut parts = split_unquoted(head, ';').into_iter();
    let name = parts.next()?.trim().to_ascii_uppercase();
    if name.is_empty() {
        return None;
    }
    let params = parts
        .filter_map(|p| {
            let (k, v) = p.split_once('=')?;
            Some((k.trim().to_ascii_uppercase(), v.trim().trim_matches('"').to_string()))
        })
        .collect();

    Some(Property {
        name,
        params,
        value,
    })
}

fn split_unquoted(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut last = 0;
    for (i, c) in s.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == sep && !in_quotes {
            parts.push(&s[last..i]);
            last = i + 1;
        }
    }
    parts.push(&s[last..]);
    parts
}

/// Unfolds continuation lines (leading space or tab) and normalizes
/// line endings.
///
/// An indented line that itself reads as a content line (upper-case
/// name followed by `:` or `;`) starts a new line instead, so
/// calendars indented as a whole still parse.
pub(crate) fn unfold_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in text.replace("\r\n", "\n").split('\n') {
        match raw.strip_prefix(' ').or_else(|| raw.strip_prefix('\t')) {
            Some(rest) if !lines.is_empty() && !is_content_line(rest.trim_start()) => {
                if let Some(prev) = lines.last_mut() {
                    prev.push_str(rest);
                }
            }
            _ => lines.push(raw.to_string()),
        }
    }
    lines
}

fn is_content_line(line: &str) -> bool {
    let name_len = line
        .bytes()
        .take_while(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || *b == b'-')
        .count();
    name_len > 0
        && line.as_bytes()[0].is_ascii_uppercase()
        && matches!(line.as_bytes().get(name_len), Some(b':' | b';'))
}

/// A date-time property value with its optional `TZID`.
#[derive(Debug, Clone, Default)]
struct TimeValue {
    value: String,
    tzid: Option<String>,
}

impl TimeValue {
    fn resolve(&self) -> Result<DateTime<Utc>, JudgeError> {
        let tz = self.tzid.as_deref().and_then(|name| match name.parse::<Tz>() {
            Ok(tz) => Some(tz),
            Err(_) => {
                warn!(tzid = name, "unknown TZID, reading wall clock as UTC");
                None
            }
        });
        parse_ical_instant(&self.value, tz)
    }
}

#[derive(Debug, Default)]
struct PendingEvent {
    summary: Option<String>,
    start: Option<TimeValue>,
    end: Option<TimeValue>,
    rrule: Option<String>,
}

impl PendingEvent {
    fn record(&mut self, prop: &Property<'_>) {
        let time_value = || TimeValue {
            value: prop.value.trim().to_string(),
            tzid: prop.param("TZID").map(str::to_string),
        };
        match prop.name.as_str() {
            "SUMMARY" => self.summary = Some(unescape_text(prop.value)),
            "DTSTART" => self.start = Some(time_value()),
            "DTEND" => self.end = Some(time_value()),
            "RRULE" => self.rrule = Some(prop.value.trim().to_string()),
            _ => {}
        }
    }

    fn finish(self) -> Result<RawEvent, JudgeError> {
        let title = self.summary.unwrap_or_else(|| "Untitled".to_string());
        let start = self
            .start
            .ok_or_else(|| JudgeError::MissingField("DTSTART".to_string()))?
            .resolve()?;
        let end = self
            .end
            .ok_or_else(|| JudgeError::MissingField("DTEND".to_string()))?
            .resolve()?;
        Ok(RawEvent {
            title,
            start,
            end,
            rrule: self.rrule.filter(|r| !r.is_empty()),
        })
    }
}

fn unescape_text(value: &str) -> String {
    value
        .replace("\\n", "\n")
        .replace("\\N", "\n")
        .replace("\\,", ",")
        .replace("\\;", ";")
        .replace("\\\\", "\\")
}

/// Reads every `VEVENT` from calendar text, skipping unusable records.
pub(crate) fn parse_events(text: &str) -> Vec<RawEvent> {
    let mut events = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut pending: Option<PendingEvent> = None;

    for line in unfold_lines(text) {
        let line = line.trim();
        let Some(prop) = parse_property(line) else {
            continue;
        };

        match prop.name.as_str() {
            "BEGIN" => {
                let component = prop.value.trim().to_ascii_uppercase();
                if component == "VEVENT" {
                    pending = Some(PendingEvent::default());
                }
                stack.push(component);
            }
            "END" => {
                let component = prop.value.trim().to_ascii_uppercase();
                // Tolerate unbalanced markers: unwind to the matching BEGIN.
                if let Some(pos) = stack.iter().rposition(|c| *c == component) {
                    stack.truncate(pos);
                }
                if component == "VEVENT" {
                    if let Some(event) = pending.take() {
                        match event.finish() {
                            Ok(raw) => events.push(raw),
                            Err(e) => warn!(error = %e, "skipping calendar record"),
                        }
                    }
                }
            }
            _ => {
                if stack.last().map(String::as_str) == Some("VEVENT") {
                    if let Some(event) = pending.as_mut() {
                        event.record(&prop);
                    }
                }
            }
        }
    }

    events
}

/// Normalizes block-structured calendar text into occurrences within
/// `[window_start, window_end]`.
///
/// Never fails: unusable records are skipped and a malformed RRULE
/// degrades to the single base occurrence.
pub fn normalize_ical(
    text: &str,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<CalendarEvent> {
    let raw = parse_events(text);
    let events = collect_occurrences(&raw, window_start, window_end);
    debug!(records = raw.len(), occurrences = events.len(), "normalized calendar text");
    events
}
