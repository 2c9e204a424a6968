use std::fmt;

use thiserror::Error;

/// Shifts the clinic works when nothing else is configured: morning and afternoon, lunch in between.
pub const DEFAULT_SHIFTS: [(&str, &str); 2] = [("09:00", "12:00"), ("14:00", "17:00")];

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Minutes between two consecutive slot labels within a shift.
pub const DEFAULT_SLOT_MINUTES: u32 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlotError {
    #[error("invalid time label '{0}', expected HH:MM")]
    InvalidLabel(String),

    #[error("slot labels must be strictly ascending ('{0}' follows '{1}')")]
    OutOfOrder(String, String),

    #[error("invalid shift '{0}', expected HH:MM-HH:MM")]
    InvalidShift(String),

    #[error("slot length must be positive")]
    ZeroStep,

    #[error("slot length of {0} minutes exceeds a day")]
    StepTooLong(u32),

    #[error("at least one slot is required")]
    Empty,
}

/// Parses a time string (HH:MM) to minutes since midnight
pub fn parse_time_to_minutes(time_str: &str) -> Option<u32> {
    let (hours, minutes) = time_str.split_once(':')?;
    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if hours >= 24 || minutes >= 60 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Formats minutes since midnight to time string (HH:MM)
pub fn minutes_to_time_string(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    format!("{:02}:{:02}", hours % 24, mins)
}

/// Calculates the labels of one shift: `start`, `start + step`, ... while strictly before `end`.
pub fn calculate_time_slots(start_time: &str, end_time: &str, step: u32) -> Result<Vec<String>, SlotError> {
    if step == 0 {
        return Err(SlotError::ZeroStep);
    }
    if step > MINUTES_PER_DAY {
        return Err(SlotError::StepTooLong(step));
    }
    let start = parse_time_to_minutes(start_time).ok_or_else(|| SlotError::InvalidLabel(start_time.to_string()))?;
    let end = parse_time_to_minutes(end_time).ok_or_else(|| SlotError::InvalidLabel(end_time.to_string()))?;

    let mut slots = Vec::new();
    let mut current = start;
    while current < end {
        slots.push(minutes_to_time_string(current));
        match current.checked_add(step) {
            Some(next) => current = next,
            None => break,
        }
    }
    Ok(slots)
}

/// Parses a shift list such as `09:00-12:00,14:00-17:00`.
pub fn parse_shifts(value: &str) -> Result<Vec<(String, String)>, SlotError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.split_once('-')
                .map(|(start, end)| (start.trim().to_string(), end.trim().to_string()))
                .ok_or_else(|| SlotError::InvalidShift(part.to_string()))
        })
        .collect()
}

/// The ordered, immutable list of time-of-day labels that make up the columns of the agenda.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlots {
    labels: Vec<String>,
}

impl TimeSlots {
    /// Validates explicit labels. Each must be zero-padded `HH:MM` and the list strictly ascending.
    pub fn new<I, S>(labels: I) -> Result<Self, SlotError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(SlotError::Empty);
        }

        let mut previous: Option<(u32, &str)> = None;
        for label in &labels {
            let minutes = parse_time_to_minutes(label).ok_or_else(|| SlotError::InvalidLabel(label.clone()))?;
            if let Some((prev_minutes, prev_label)) = previous {
                if minutes <= prev_minutes {
                    return Err(SlotError::OutOfOrder(label.clone(), prev_label.to_string()));
                }
            }
            previous = Some((minutes, label));
        }

        Ok(Self { labels })
    }

    /// Builds the labels of several shifts, in order.
    pub fn from_shifts<S: AsRef<str>>(shifts: &[(S, S)], step: u32) -> Result<Self, SlotError> {
        let mut labels = Vec::new();
        for (start, end) in shifts {
            labels.extend(calculate_time_slots(start.as_ref(), end.as_ref(), step)?);
        }
        Self::new(labels)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for TimeSlots {
    fn default() -> Self {
        let labels = DEFAULT_SHIFTS
            .iter()
            .flat_map(|(start, end)| {
                calculate_time_slots(start, end, DEFAULT_SLOT_MINUTES).unwrap_or_default()
            })
            .collect();
        Self { labels }
    }
}

impl fmt::Display for TimeSlots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.labels.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_slots_are_two_shifts_of_six() {
        let slots = TimeSlots::default();
        assert_eq!(
            slots.labels(),
            [
                "09:00", "09:30", "10:00", "10:30", "11:00", "11:30",
                "14:00", "14:30", "15:00", "15:30", "16:00", "16:30",
            ]
        );
        assert!(!slots.contains("12:00"));
        assert!(!slots.contains("13:30"));
    }

    #[test]
    fn parse_time_rejects_loose_formats() {
        assert_eq!(parse_time_to_minutes("09:30"), Some(570));
        assert_eq!(parse_time_to_minutes("9:30"), None);
        assert_eq!(parse_time_to_minutes("24:00"), None);
        assert_eq!(parse_time_to_minutes("10:60"), None);
        assert_eq!(parse_time_to_minutes("1030"), None);
    }

    #[test]
    fn shift_excludes_its_end() {
        let slots = calculate_time_slots("14:00", "15:00", 30).unwrap();
        assert_eq!(slots, vec!["14:00", "14:30"]);
    }

    #[test]
    fn zero_step_is_rejected() {
        assert_eq!(calculate_time_slots("09:00", "10:00", 0), Err(SlotError::ZeroStep));
    }

    #[test]
    fn step_longer_than_a_day_is_rejected() {
        assert_eq!(
            calculate_time_slots("09:00", "10:00", u32::MAX),
            Err(SlotError::StepTooLong(u32::MAX))
        );
        assert_eq!(calculate_time_slots("09:00", "10:00", 24 * 60).unwrap(), vec!["09:00"]);
    }

    #[test]
    fn labels_must_ascend() {
        let err = TimeSlots::new(["09:30", "09:00"]).unwrap_err();
        assert_eq!(err, SlotError::OutOfOrder("09:00".into(), "09:30".into()));
        assert_eq!(TimeSlots::new(Vec::<String>::new()), Err(SlotError::Empty));
        assert!(matches!(TimeSlots::new(["9:00"]), Err(SlotError::InvalidLabel(_))));
    }

    #[test]
    fn shifts_parse_from_config_string() {
        let shifts = parse_shifts("08:00-10:00, 13:00-14:00").unwrap();
        let slots = TimeSlots::from_shifts(&shifts, 60).unwrap();
        assert_eq!(slots.labels(), ["08:00", "09:00", "13:00"]);
        assert!(matches!(parse_shifts("08:00"), Err(SlotError::InvalidShift(_))));
    }

    #[test]
    fn overlapping_shifts_are_rejected() {
        let shifts = parse_shifts("09:00-11:00,10:00-12:00").unwrap();
        assert!(matches!(
            TimeSlots::from_shifts(&shifts, 30),
            Err(SlotError::OutOfOrder(_, _))
        ));
    }
}
