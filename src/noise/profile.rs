//! Field presence probabilities.

use serde::{Deserialize, Serialize};

/// Probabilities governing which synthesized fields an event receives.
///
/// # Example
/// ```
/// use u_schedule_judge::noise::NoiseProfile;
///
/// let profile = NoiseProfile::default().with_timezone_rate(1.0);
/// assert_eq!(profile.timezone_rate, 1.0);
/// assert_eq!(profile.alarm_rate, 0.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseProfile {
    /// Chance a non-recurring event is rewritten into local wall-clock form.
    pub timezone_rate: f64,
    /// Chance of drawing a `DESCRIPTION`.
    pub description_rate: f64,
    /// Chance of drawing a `LOCATION`.
    pub location_rate: f64,
    /// Chance of an `ORGANIZER`.
    pub organizer_rate: f64,
    /// Chance of a `VALARM` reminder.
    pub alarm_rate: f64,
    /// Upper bound (inclusive) on attendees per event.
    pub max_attendees: usize,
}

impl Default for NoiseProfile {
    fn default() -> Self {
        Self {
            timezone_rate: 0.3,
            description_rate: 0.6,
            location_rate: 0.5,
            organizer_rate: 0.4,
            alarm_rate: 0.5,
            max_attendees: 3,
        }
    }
}

impl NoiseProfile {
    /// Profile that adds provider fields but never rewrites timezones.
    pub fn utc_only() -> Self {
        Self::default().with_timezone_rate(0.0)
    }

    /// Sets the probability of rewriting an event into local time.
    pub fn with_timezone_rate(mut self, rate: f64) -> Self {
        self.timezone_rate = rate;
        self
    }

    /// Sets the probability of adding a description.
    pub fn with_description_rate(mut self, rate: f64) -> Self {
        self.description_rate = rate;
        self
    }

    /// Sets the probability of adding a location.
    pub fn with_location_rate(mut self, rate: f64) -> Self {
        self.location_rate = rate;
        self
    }

    /// Sets the probability of adding an organizer.
    pub fn with_organizer_rate(mut self, rate: f64) -> Self {
        self.organizer_rate = rate;
        self
    }

    /// Sets the probability of adding a reminder.
    pub fn with_alarm_rate(mut self, rate: f64) -> Self {
        self.alarm_rate = rate;
        self
    }

    /// Sets the largest attendee count drawn per event.
    pub fn with_max_attendees(mut self, max: usize) -> Self {
        self.max_attendees = max;
        self
    }
}
