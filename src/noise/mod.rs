//! Noise synthesizer.
//!
//! Turns a clean calendar fixture into one that looks like real
//! provider output (UIDs, timestamps, attendees, alarms, local-time
//! `TZID` values with `VTIMEZONE` definitions) while keeping every
//! event's title, start and end recoverable by the normalizer.
//!
//! # Determinism
//!
//! All randomness comes from one caller-supplied generator. Per event,
//! draws happen in this order:
//!
//! | # | Draw | Range |
//! |---|------|-------|
//! | 1 | UID bytes | 16 bytes |
//! | 2 | created month, day, hour, minute | 1-9, 1-15, 8-18, 0-59 |
//! | 3 | modified hour, minute | 8-18, 0-59 |
//! | 4 | sequence | 0-3 |
//! | 5 | timezone coin, then zone if heads | [`NoiseProfile::timezone_rate`] |
//! | 6 | description coin, then choice if heads | [`NoiseProfile::description_rate`] |
//! | 7 | location coin, then choice if heads | [`NoiseProfile::location_rate`] |
//! | 8 | organizer coin, then choice if heads | [`NoiseProfile::organizer_rate`] |
//! | 9 | attendee count, then address + status each | 0-[`NoiseProfile::max_attendees`] |
//! | 10 | alarm coin, then trigger minutes if heads | [`NoiseProfile::alarm_rate`] |
//!
//! The zone is drawn on heads even for recurring events (which are never
//! rewritten), so the stream position never depends on event content.
//!
//! # Usage
//!
//! ```
//! use u_schedule_judge::noise::add_realistic_noise;
//!
//! let clean = "BEGIN:VCALENDAR\nVERSION:2.0\nBEGIN:VEVENT\nSUMMARY:Standup\n\
//!              DTSTART:20250120T090000Z\nDTEND:20250120T091500Z\nEND:VEVENT\nEND:VCALENDAR";
//! let noisy = add_realistic_noise(clean, 42);
//! assert_eq!(noisy, add_realistic_noise(clean, 42));
//! assert!(noisy.contains("UID:"));
//! ```

pub mod fixtures;
mod profile;

pub use profile::NoiseProfile;

use std::collections::BTreeSet;

use chrono::{NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::normalize::{parse_property, unfold_lines};
use fixtures::{
    display_name, vtimezone_block, ALARM_MINUTES, ATTENDEES, DESCRIPTIONS, HEADER_LINES,
    LOCATIONS, PARTSTATS, TIMEZONES,
};

/// Adds provider noise with the default profile and a seeded generator.
///
/// Same fixture and seed always give byte-identical output.
pub fn add_realistic_noise(ical: &str, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    synthesize_noise(ical, &NoiseProfile::default(), &mut rng)
}

/// Adds provider noise drawing from `rng`.
pub fn synthesize_noise<R: Rng>(ical: &str, profile: &NoiseProfile, rng: &mut R) -> String {
    let mut output: Vec<String> = Vec::new();
    let mut used_zones: BTreeSet<&'static str> = BTreeSet::new();
    let mut event_lines: Option<Vec<String>> = None;
    let mut event_count = 0usize;

    for line in unfold_lines(ical) {
        let line = line.trim();

        if let Some(lines) = event_lines.as_mut() {
            if line == "END:VEVENT" {
                let noisy = noisify_event(lines, profile, rng, &mut used_zones);
                output.extend(noisy);
                event_lines = None;
                event_count += 1;
            } else {
                lines.push(line.to_string());
            }
            continue;
        }

        match line {
            "BEGIN:VCALENDAR" => {
                output.push(line.to_string());
                output.extend(HEADER_LINES.iter().map(|l| l.to_string()));
            }
            "VERSION:2.0" => {}
            "BEGIN:VEVENT" => event_lines = Some(Vec::new()),
            "END:VCALENDAR" => {
                for tzid in &used_zones {
                    if let Some(block) = vtimezone_block(tzid) {
                        output.extend(block.lines().map(str::to_string));
                    }
                }
                output.push(line.to_string());
            }
            _ => output.push(line.to_string()),
        }
    }

    debug!(events = event_count, zones = used_zones.len(), "synthesized calendar noise");
    output.join("\n")
}

fn noisify_event<R: Rng>(
    lines: &[String],
    profile: &NoiseProfile,
    rng: &mut R,
    used_zones: &mut BTreeSet<&'static str>,
) -> Vec<String> {
    let mut out = vec!["BEGIN:VEVENT".to_string()];

    let mut uid_bytes = [0u8; 16];
    rng.fill(&mut uid_bytes);
    let uid = uuid::Builder::from_random_bytes(uid_bytes).into_uuid();
    out.push(format!("UID:{}@google.com", uid.hyphenated()));

    let (month, day, hour, minute): (u32, u32, u32, u32) = (
        rng.random_range(1..=9),
        rng.random_range(1..=15),
        rng.random_range(8..=18),
        rng.random_range(0..=59),
    );
    out.push(format!("CREATED:2025{month:02}{day:02}T{hour:02}{minute:02}00Z"));
    let (hour, minute): (u32, u32) = (rng.random_range(8..=18), rng.random_range(0..=59));
    out.push(format!("LAST-MODIFIED:20250115T{hour:02}{minute:02}00Z"));
    out.push(format!("SEQUENCE:{}", rng.random_range(0..=3u32)));
    out.push("STATUS:CONFIRMED".to_string());
    out.push("TRANSP:OPAQUE".to_string());

    let zone = if rng.random::<f64>() < profile.timezone_rate {
        TIMEZONES.choose(rng).copied()
    } else {
        None
    };
    let recurring = lines
        .iter()
        .any(|l| parse_property(l).is_some_and(|p| p.name == "RRULE"));
    let zone = zone.filter(|_| !recurring);

    for line in lines {
        let rewritten = zone.and_then(|tz| rewrite_local(line, tz));
        match rewritten {
            Some(local) => {
                if let Some(tz) = zone {
                    used_zones.insert(tz.name());
                }
                out.push(local);
            }
            None => out.push(line.clone()),
        }
    }

    if rng.random::<f64>() < profile.description_rate {
        if let Some(desc) = DESCRIPTIONS.choose(rng).filter(|d| !d.is_empty()) {
            out.push(format!("DESCRIPTION:{desc}"));
        }
    }
    if rng.random::<f64>() < profile.location_rate {
        if let Some(loc) = LOCATIONS.choose(rng).filter(|l| !l.is_empty()) {
            out.push(format!("LOCATION:{loc}"));
        }
    }
    if rng.random::<f64>() < profile.organizer_rate {
        if let Some(addr) = ATTENDEES.choose(rng) {
            out.push(format!("ORGANIZER;CN={}:mailto:{addr}", display_name(addr)));
        }
    }

    let attendees = rng.random_range(0..=profile.max_attendees);
    for _ in 0..attendees {
        let addr = ATTENDEES.choose(rng);
        let status = PARTSTATS.choose(rng);
        if let (Some(addr), Some(status)) = (addr, status) {
            out.push(format!(
                "ATTENDEE;CUTYPE=INDIVIDUAL;ROLE=REQ-PARTICIPANT;PARTSTAT={status};CN={};X-NUM-GUESTS=0:mailto:{addr}",
                display_name(addr)
            ));
        }
    }

    if rng.random::<f64>() < profile.alarm_rate {
        if let Some(minutes) = ALARM_MINUTES.choose(rng) {
            out.push("BEGIN:VALARM".to_string());
            out.push("ACTION:DISPLAY".to_string());
            out.push(format!("TRIGGER:-PT{minutes}M"));
            out.push("DESCRIPTION:Reminder".to_string());
            out.push("END:VALARM".to_string());
        }
    }

    out.push("END:VEVENT".to_string());
    out
}

/// Rewrites a UTC `DTSTART:`/`DTEND:` line into `TZID` local form.
///
/// Returns `None` when the line is not a UTC start/end, or when the
/// local wall clock is ambiguous in `tz` (it would not resolve back to
/// the same instant).
fn rewrite_local(line: &str, tz: Tz) -> Option<String> {
    let (key, value) = line.split_once(':')?;
    if key != "DTSTART" && key != "DTEND" {
        return None;
    }
    let utc = NaiveDateTime::parse_from_str(value.strip_suffix('Z')?, "%Y%m%dT%H%M%S")
        .ok()?
        .and_utc();
    let local = utc.with_timezone(&tz).naive_local();
    let roundtrip = tz.from_local_datetime(&local).single()?;
    if roundtrip != utc {
        return None;
    }
    Some(format!("{key};TZID={}:{}", tz.name(), local.format("%Y%m%dT%H%M%S")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CalendarEvent;
    use crate::normalize::normalize_ical;
    use chrono::{DateTime, Utc};

    const FIXTURE: &str = "BEGIN:VCALENDAR\r\n\
        VERSION:2.0\r\n\
        BEGIN:VEVENT\r\n\
        SUMMARY:Team Standup\r\n\
        DTSTART:20250113T140000Z\r\n\
        DTEND:20250113T141500Z\r\n\
        RRULE:FREQ=DAILY;BYDAY=MO,TU,WE,TH,FR\r\n\
        END:VEVENT\r\n\
        BEGIN:VEVENT\r\n\
        SUMMARY:Design Review\r\n\
        DTSTART:20250121T150000Z\r\n\
        DTEND:20250121T160000Z\r\n\
        END:VEVENT\r\n\
        BEGIN:VEVENT\r\n\
        SUMMARY:1:1 with Manager\r\n\
        DTSTART:20250122T180000Z\r\n\
        DTEND:20250122T183000Z\r\n\
        END:VEVENT\r\n\
        BEGIN:VEVENT\r\n\
        SUMMARY:Sprint Planning\r\n\
        DTSTART:20250123T160000Z\r\n\
        DTEND:20250123T173000Z\r\n\
        END:VEVENT\r\n\
        BEGIN:VEVENT\r\n\
        SUMMARY:Lunch\r\n\
        DTSTART:20250124T170000Z\r\n\
        DTEND:20250124T180000Z\r\n\
        END:VEVENT\r\n\
        END:VCALENDAR\r\n";

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc.with_ymd_and_hms(2025, 1, 20, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 24, 23, 59, 59).unwrap(),
        )
    }

    fn triples(events: &[CalendarEvent]) -> Vec<(String, DateTime<Utc>, DateTime<Utc>)> {
        let mut t: Vec<_> = events
            .iter()
            .map(|e| (e.title.clone(), e.start, e.end))
            .collect();
        t.sort();
        t
    }

    fn always_local() -> NoiseProfile {
        NoiseProfile::default().with_timezone_rate(1.0)
    }

    #[test]
    fn test_same_seed_identical() {
        assert_eq!(add_realistic_noise(FIXTURE, 42), add_realistic_noise(FIXTURE, 42));
        assert_eq!(add_realistic_noise(FIXTURE, 7), add_realistic_noise(FIXTURE, 7));
    }

    #[test]
    fn test_different_seed_same_schedule() {
        let (ws, we) = window();
        let clean = triples(&normalize_ical(FIXTURE, ws, we));
        assert_eq!(clean.len(), 9);

        let a = add_realistic_noise(FIXTURE, 42);
        let b = add_realistic_noise(FIXTURE, 43);
        assert_ne!(a, b);
        assert_eq!(triples(&normalize_ical(&a, ws, we)), clean);
        assert_eq!(triples(&normalize_ical(&b, ws, we)), clean);
    }

    #[test]
    fn test_indented_fixture() {
        let (ws, we) = window();
        let indented: String = FIXTURE.lines().map(|l| format!("    {l}\n")).collect();
        let noisy = add_realistic_noise(&indented, 42);
        assert_eq!(noisy, add_realistic_noise(FIXTURE, 42));
        assert_eq!(
            triples(&normalize_ical(&noisy, ws, we)),
            triples(&normalize_ical(FIXTURE, ws, we))
        );
    }

    #[test]
    fn test_local_rewrite_preserves_instants() {
        let (ws, we) = window();
        let clean = triples(&normalize_ical(FIXTURE, ws, we));
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let noisy = synthesize_noise(FIXTURE, &always_local(), &mut rng);
            assert!(noisy.contains(";TZID="), "seed {seed}");
            assert_eq!(triples(&normalize_ical(&noisy, ws, we)), clean, "seed {seed}");
        }
    }

    #[test]
    fn test_recurring_never_rewritten() {
        let recurring = "BEGIN:VCALENDAR\nVERSION:2.0\nBEGIN:VEVENT\nSUMMARY:Standup\n\
            DTSTART:20250113T140000Z\nDTEND:20250113T141500Z\nRRULE:FREQ=DAILY\n\
            END:VEVENT\nEND:VCALENDAR";
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let noisy = synthesize_noise(recurring, &always_local(), &mut rng);
            assert!(noisy.contains("DTSTART:20250113T140000Z"), "seed {seed}");
            assert!(noisy.contains("DTEND:20250113T141500Z"), "seed {seed}");
            assert!(!noisy.contains("TZID="), "seed {seed}");
            assert!(!noisy.contains("BEGIN:VTIMEZONE"), "seed {seed}");
        }
    }

    #[test]
    fn test_vtimezone_once_after_events() {
        for seed in 0..16 {
            let mut rng = StdRng::seed_from_u64(seed);
            let noisy = synthesize_noise(FIXTURE, &always_local(), &mut rng);
            let lines: Vec<&str> = noisy.lines().collect();

            let referenced: BTreeSet<&str> = lines
                .iter()
                .filter_map(|l| parse_property(l))
                .filter(|p| p.name == "DTSTART" || p.name == "DTEND")
                .filter_map(|p| p.param("TZID").map(str::to_string))
                .map(|tz| {
                    TIMEZONES
                        .iter()
                        .map(|t| t.name())
                        .find(|n| *n == tz)
                        .unwrap()
                })
                .collect();
            assert!(!referenced.is_empty());

            let last_event = lines.iter().rposition(|l| *l == "END:VEVENT").unwrap();
            let end_cal = lines.iter().rposition(|l| *l == "END:VCALENDAR").unwrap();
            for tz in &referenced {
                let defs: Vec<usize> = lines
                    .iter()
                    .enumerate()
                    .filter(|(_, l)| **l == format!("TZID:{tz}"))
                    .map(|(i, _)| i)
                    .collect();
                assert_eq!(defs.len(), 1, "seed {seed} zone {tz}");
                assert!(defs[0] > last_event && defs[0] < end_cal);
            }
            let blocks = lines.iter().filter(|l| **l == "BEGIN:VTIMEZONE").count();
            assert_eq!(blocks, referenced.len());
        }
    }

    #[test]
    fn test_header_and_fields() {
        let noisy = add_realistic_noise(FIXTURE, 42);
        let lines: Vec<&str> = noisy.lines().collect();
        assert_eq!(lines[0], "BEGIN:VCALENDAR");
        assert_eq!(lines[1], HEADER_LINES[0]);
        assert_eq!(lines.iter().filter(|l| **l == "VERSION:2.0").count(), 1);
        assert_eq!(lines.iter().filter(|l| l.starts_with("UID:")).count(), 5);
        assert_eq!(lines.iter().filter(|l| **l == "STATUS:CONFIRMED").count(), 5);
        assert!(!noisy.contains('\r'));
        assert_eq!(*lines.last().unwrap(), "END:VCALENDAR");
    }

    #[test]
    fn test_ambiguous_local_time_kept_utc() {
        // 2025-11-02 01:30 happens twice in New York
        let line = "DTSTART:20251102T053000Z";
        assert!(rewrite_local(line, chrono_tz::America::New_York).is_none());
        assert_eq!(
            rewrite_local(line, chrono_tz::Europe::London).as_deref(),
            Some("DTSTART;TZID=Europe/London:20251102T053000")
        );
        assert!(rewrite_local("DTSTART;VALUE=DATE:20250120", chrono_tz::Europe::London).is_none());
        assert!(rewrite_local("SUMMARY:DTSTART", chrono_tz::Europe::London).is_none());
    }

    #[test]
    fn test_winter_offsets() {
        let line = "DTEND:20250120T090000Z";
        assert_eq!(
            rewrite_local(line, chrono_tz::America::Chicago).as_deref(),
            Some("DTEND;TZID=America/Chicago:20250120T030000")
        );
        assert_eq!(
            rewrite_local(line, chrono_tz::America::Los_Angeles).as_deref(),
            Some("DTEND;TZID=America/Los_Angeles:20250120T010000")
        );
    }
}
