//! Daily routine: wake/sleep window and meal times.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ValidationError};
use crate::interval::{at_local, TimeInterval};

/// Routine as entered by the user or stored in config. Every field is a
/// `HH:MM` string; missing fields make the routine unusable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineInput {
    #[serde(default)]
    pub wake_time: Option<String>,
    #[serde(default)]
    pub sleep_time: Option<String>,
    #[serde(default)]
    pub meal_times: Vec<String>,
}

/// Typed daily routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routine {
    pub wake_time: NaiveTime,
    pub sleep_time: NaiveTime,
    /// Ordered meal start times; each meal blocks a fixed window.
    pub meal_times: Vec<NaiveTime>,
}

/// Parse a `HH:MM` wall-clock time.
pub fn parse_hhmm(field: &str, value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|e| ValidationError::invalid(field, format!("'{value}' is not HH:MM ({e})")))
}

impl Routine {
    pub fn new(wake_time: NaiveTime, sleep_time: NaiveTime, meal_times: Vec<NaiveTime>) -> Self {
        Self {
            wake_time,
            sleep_time,
            meal_times,
        }
    }

    /// Whether sleep falls on the day after wake (e.g. 08:00 → 01:00).
    pub fn wraps_midnight(&self) -> bool {
        self.sleep_time <= self.wake_time
    }

    /// Wake-to-sleep window for the routine day starting on `date`.
    pub fn day_window(&self, date: NaiveDate, zone: &FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
        let day_start = at_local(zone, date, self.wake_time);
        let mut day_end = at_local(zone, date, self.sleep_time);
        if day_end <= day_start {
            day_end += Duration::days(1);
        }
        (day_start, day_end)
    }

    /// Meal windows on `date`, each `meal_length` long.
    pub fn meal_windows(
        &self,
        date: NaiveDate,
        zone: &FixedOffset,
        meal_length: Duration,
    ) -> Vec<TimeInterval> {
        self.meal_times
            .iter()
            .filter_map(|t| {
                let start = at_local(zone, date, *t);
                TimeInterval::new(start, start + meal_length).ok()
            })
            .collect()
    }

    /// Back to the serializable form.
    pub fn to_input(&self) -> RoutineInput {
        RoutineInput {
            wake_time: Some(self.wake_time.format("%H:%M").to_string()),
            sleep_time: Some(self.sleep_time.format("%H:%M").to_string()),
            meal_times: self
                .meal_times
                .iter()
                .map(|t| t.format("%H:%M").to_string())
                .collect(),
        }
    }
}

impl TryFrom<&RoutineInput> for Routine {
    type Error = ConfigError;

    fn try_from(input: &RoutineInput) -> Result<Self, Self::Error> {
        let wake = input
            .wake_time
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ConfigError::RoutineMissing("wake_time".into()))?;
        let sleep = input
            .sleep_time
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ConfigError::RoutineMissing("sleep_time".into()))?;

        let invalid = |key: &str, e: ValidationError| ConfigError::InvalidValue {
            key: format!("routine.{key}"),
            message: e.to_string(),
        };

        let wake_time = parse_hhmm("wake_time", wake).map_err(|e| invalid("wake_time", e))?;
        let sleep_time = parse_hhmm("sleep_time", sleep).map_err(|e| invalid("sleep_time", e))?;
        let mut meal_times = input
            .meal_times
            .iter()
            .map(|m| parse_hhmm("meal_times", m).map_err(|e| invalid("meal_times", e)))
            .collect::<Result<Vec<_>, _>>()?;
        meal_times.sort();

        Ok(Routine::new(wake_time, sleep_time, meal_times))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(s: &str) -> NaiveTime {
        parse_hhmm("test", s).unwrap()
    }

    fn input(wake: Option<&str>, sleep: Option<&str>, meals: &[&str]) -> RoutineInput {
        RoutineInput {
            wake_time: wake.map(String::from),
            sleep_time: sleep.map(String::from),
            meal_times: meals.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_parse_routine_input() {
        let routine = Routine::try_from(&input(Some("07:30"), Some("23:00"), &["18:00", "12:00"])).unwrap();
        assert_eq!(routine.wake_time, t("07:30"));
        assert_eq!(routine.sleep_time, t("23:00"));
        assert_eq!(routine.meal_times, vec![t("12:00"), t("18:00")]);
        assert!(!routine.wraps_midnight());
    }

    #[test]
    fn test_missing_fields_are_config_errors() {
        let err = Routine::try_from(&input(None, Some("23:00"), &[])).unwrap_err();
        assert!(matches!(err, ConfigError::RoutineMissing(ref f) if f == "wake_time"));

        let err = Routine::try_from(&input(Some("08:00"), Some(""), &[])).unwrap_err();
        assert!(matches!(err, ConfigError::RoutineMissing(ref f) if f == "sleep_time"));
    }

    #[test]
    fn test_malformed_time_rejected() {
        let err = Routine::try_from(&input(Some("8am"), Some("23:00"), &[])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert!(parse_hhmm("x", "24:00").is_err());
    }

    #[test]
    fn test_overnight_window_wraps() {
        let zone = FixedOffset::east_opt(0).unwrap();
        let routine = Routine::new(t("09:00"), t("01:00"), vec![]);
        assert!(routine.wraps_midnight());

        let date = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let (start, end) = routine.day_window(date, &zone);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 3, 11, 1, 0, 0).unwrap());
    }

    #[test]
    fn test_meal_windows_are_one_hour() {
        let zone = FixedOffset::east_opt(0).unwrap();
        let routine = Routine::new(t("08:00"), t("22:00"), vec![t("12:00"), t("19:00")]);
        let date = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let meals = routine.meal_windows(date, &zone, Duration::minutes(60));
        assert_eq!(meals.len(), 2);
        assert_eq!(meals[0].start, Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap());
        assert_eq!(meals[0].duration(), Duration::hours(1));
    }

    #[test]
    fn test_to_input_round_trips() {
        let routine = Routine::new(t("06:45"), t("22:15"), vec![t("12:30")]);
        let back = Routine::try_from(&routine.to_input()).unwrap();
        assert_eq!(back, routine);
    }
}
