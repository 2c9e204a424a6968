use chrono::NaiveDate;
use serde::Serialize;

use crate::models::Appointment;

/// One slot row of a day's agenda.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRow {
    pub time: String,
    pub appointments: Vec<Appointment>,
    pub is_empty: bool,
}

/// Agenda of a single day
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    pub day: NaiveDate,
    pub rows: Vec<SlotRow>,
    pub unplaced: Vec<String>, // ids on this day whose time matches no slot
}

impl DaySchedule {
    pub fn row(&self, time: &str) -> Option<&SlotRow> {
        self.rows.iter().find(|row| row.time == time)
    }

    pub fn booked(&self) -> usize {
        self.rows.iter().map(|row| row.appointments.len()).sum()
    }
}
