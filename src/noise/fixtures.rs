//! Vocabularies for synthesized provider fields.
//!
//! Empty strings are legal entries: drawing one suppresses the field.

use chrono_tz::Tz;

/// Zones an event may be rewritten into.
pub const TIMEZONES: [Tz; 4] = [
    chrono_tz::America::New_York,
    chrono_tz::America::Chicago,
    chrono_tz::America::Los_Angeles,
    chrono_tz::Europe::London,
];

/// Attendee and organizer addresses.
pub const ATTENDEES: [&str; 8] = [
    "alice@company.com",
    "bob@company.com",
    "charlie@company.com",
    "diana@company.com",
    "eve@company.com",
    "frank@company.com",
    "grace@company.com",
    "heidi@company.com",
];

/// Event descriptions.
pub const DESCRIPTIONS: [&str; 7] = [
    "Weekly sync to align on priorities and blockers.",
    "Please review the attached agenda before the meeting.",
    "Zoom link: https://zoom.us/j/123456789\\nDial-in: +1-555-0100",
    "Conference Room B - 3rd Floor",
    "Action items from last week will be reviewed.",
    "Bring your laptop for the live demo portion.",
    "",
];

/// Event locations.
pub const LOCATIONS: [&str; 7] = [
    "Conference Room A",
    "Conference Room B",
    "Zoom",
    "Google Meet",
    "Room 301",
    "Main Boardroom",
    "",
];

/// Attendee participation statuses.
pub const PARTSTATS: [&str; 3] = ["ACCEPTED", "TENTATIVE", "NEEDS-ACTION"];

/// Reminder lead times in minutes.
pub const ALARM_MINUTES: [u32; 4] = [5, 10, 15, 30];

/// Calendar-level lines that replace the fixture's `VERSION`.
pub const HEADER_LINES: [&str; 6] = [
    "PRODID:-//Google Inc//Google Calendar 70.9054//EN",
    "VERSION:2.0",
    "CALSCALE:GREGORIAN",
    "METHOD:PUBLISH",
    "X-WR-CALNAME:Work Calendar",
    "X-WR-TIMEZONE:America/New_York",
];

/// `VTIMEZONE` definition for one of [`TIMEZONES`], by zone name.
pub fn vtimezone_block(tzid: &str) -> Option<&'static str> {
    match tzid {
        "America/New_York" => Some(concat!(
            "BEGIN:VTIMEZONE\nTZID:America/New_York\n",
            "BEGIN:STANDARD\nDTSTART:19701101T020000\nRRULE:FREQ=YEARLY;BYMONTH=11;BYDAY=1SU\n",
            "TZOFFSETFROM:-0400\nTZOFFSETTO:-0500\nTZNAME:EST\nEND:STANDARD\n",
            "BEGIN:DAYLIGHT\nDTSTART:19700308T020000\nRRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=2SU\n",
            "TZOFFSETFROM:-0500\nTZOFFSETTO:-0400\nTZNAME:EDT\nEND:DAYLIGHT\n",
            "END:VTIMEZONE",
        )),
        "America/Chicago" => Some(concat!(
            "BEGIN:VTIMEZONE\nTZID:America/Chicago\n",
            "BEGIN:STANDARD\nDTSTART:19701101T020000\nRRULE:FREQ=YEARLY;BYMONTH=11;BYDAY=1SU\n",
            "TZOFFSETFROM:-0500\nTZOFFSETTO:-0600\nTZNAME:CST\nEND:STANDARD\n",
            "BEGIN:DAYLIGHT\nDTSTART:19700308T020000\nRRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=2SU\n",
            "TZOFFSETFROM:-0600\nTZOFFSETTO:-0500\nTZNAME:CDT\nEND:DAYLIGHT\n",
            "END:VTIMEZONE",
        )),
        "America/Los_Angeles" => Some(concat!(
            "BEGIN:VTIMEZONE\nTZID:America/Los_Angeles\n",
            "BEGIN:STANDARD\nDTSTART:19701101T020000\nRRULE:FREQ=YEARLY;BYMONTH=11;BYDAY=1SU\n",
            "TZOFFSETFROM:-0700\nTZOFFSETTO:-0800\nTZNAME:PST\nEND:STANDARD\n",
            "BEGIN:DAYLIGHT\nDTSTART:19700308T020000\nRRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=2SU\n",
            "TZOFFSETFROM:-0800\nTZOFFSETTO:-0700\nTZNAME:PDT\nEND:DAYLIGHT\n",
            "END:VTIMEZONE",
        )),
        "Europe/London" => Some(concat!(
            "BEGIN:VTIMEZONE\nTZID:Europe/London\n",
            "BEGIN:STANDARD\nDTSTART:19701025T020000\nRRULE:FREQ=YEARLY;BYMONTH=10;BYDAY=-1SU\n",
            "TZOFFSETFROM:+0100\nTZOFFSETTO:+0000\nTZNAME:GMT\nEND:STANDARD\n",
            "BEGIN:DAYLIGHT\nDTSTART:19700329T010000\nRRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=-1SU\n",
            "TZOFFSETFROM:+0000\nTZOFFSETTO:+0100\nTZNAME:BST\nEND:DAYLIGHT\n",
            "END:VTIMEZONE",
        )),
        _ => None,
    }
}

/// Display name for an address: `alice@company.com` -> `Alice`.
pub fn display_name(address: &str) -> String {
    let local = address.split('@').next().unwrap_or(address);
    let mut chars = local.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_zone_has_definition() {
        for tz in TIMEZONES {
            let block = vtimezone_block(tz.name()).unwrap();
            assert!(block.starts_with("BEGIN:VTIMEZONE"));
            assert!(block.contains(&format!("TZID:{}", tz.name())));
            assert!(block.ends_with("END:VTIMEZONE"));
        }
        assert!(vtimezone_block("Asia/Tokyo").is_none());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("alice@company.com"), "Alice");
        assert_eq!(display_name("heidi"), "Heidi");
    }
}
