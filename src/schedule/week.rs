use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use super::slot_utils::TimeSlots;

/// Seven consecutive calendar days starting at an anchor date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekWindow {
    start: NaiveDate,
}

impl WeekWindow {
    pub fn new(start: NaiveDate) -> Self {
        Self { start }
    }

    /// The window starting on the Sunday on or before `date`.
    pub fn containing(date: NaiveDate) -> Self {
        let back = u64::from(date.weekday().num_days_from_sunday());
        Self::new(date.checked_sub_days(Days::new(back)).unwrap_or(date))
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Days past the last representable date repeat `NaiveDate::MAX`.
    pub fn days(&self) -> [NaiveDate; 7] {
        std::array::from_fn(|i| {
            self.start
                .checked_add_days(Days::new(i as u64))
                .unwrap_or(NaiveDate::MAX)
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.days().contains(&date)
    }

    /// The following week, or this one when it would run past the calendar's end.
    #[must_use]
    pub fn next(self) -> Self {
        match self.start.checked_add_days(Days::new(13)) {
            Some(_) => Self::new(self.start + Days::new(7)),
            None => self,
        }
    }

    /// The preceding week, or this one at the calendar's start.
    #[must_use]
    pub fn previous(self) -> Self {
        self.start
            .checked_sub_days(Days::new(7))
            .map(Self::new)
            .unwrap_or(self)
    }
}

/// The (day, slot) cells displayed for one week.
#[derive(Debug, Clone)]
pub struct SlotGrid {
    days: [NaiveDate; 7],
    slots: TimeSlots,
}

impl SlotGrid {
    pub fn days(&self) -> &[NaiveDate; 7] {
        &self.days
    }

    pub fn slots(&self) -> &TimeSlots {
        &self.slots
    }

    /// Every (day, slot) pair, day by day.
    pub fn cells(&self) -> impl Iterator<Item = (NaiveDate, &str)> + '_ {
        self.days
            .iter()
            .flat_map(move |day| self.slots.iter().map(move |slot| (*day, slot)))
    }
}

pub fn build_grid(week_start: NaiveDate, slots: &TimeSlots) -> SlotGrid {
    SlotGrid {
        days: WeekWindow::new(week_start).days(),
        slots: slots.clone(),
    }
}
