use chrono::{FixedOffset, NaiveDate};

use crate::models::Appointment;

use super::slot_utils::TimeSlots;
use super::types::{DaySchedule, SlotRow};

/// Calendar day of an appointment as seen from the clinic.
pub fn local_day(appointment: &Appointment, offset: &FixedOffset) -> NaiveDate {
    appointment.date.with_timezone(offset).date_naive()
}

/// `HH:MM` of an appointment as seen from the clinic.
pub fn time_of_day(appointment: &Appointment, offset: &FixedOffset) -> String {
    appointment.date.with_timezone(offset).format("%H:%M").to_string()
}

fn occupies(appointment: &Appointment, day: NaiveDate, slot: &str, offset: &FixedOffset) -> bool {
    local_day(appointment, offset) == day && time_of_day(appointment, offset) == slot
}

/// Appointments sitting in the `(day, slot)` cell, in collection order.
///
/// Matching is exact on the formatted time: an appointment at 09:05 is not in the 09:00 cell.
/// Several appointments may share a cell; nothing here prevents double booking.
pub fn appointments_in_cell<'a>(
    appointments: &'a [Appointment],
    day: NaiveDate,
    slot: &str,
    offset: &FixedOffset,
) -> Vec<&'a Appointment> {
    appointments
        .iter()
        .filter(|apt| occupies(apt, day, slot, offset))
        .collect()
}

/// Builds one row per configured slot for `day`.
pub fn day_schedule(
    appointments: &[Appointment],
    day: NaiveDate,
    slots: &TimeSlots,
    offset: &FixedOffset,
) -> DaySchedule {
    let rows = slots
        .iter()
        .map(|slot| {
            let matched: Vec<Appointment> = appointments_in_cell(appointments, day, slot, offset)
                .into_iter()
                .cloned()
                .collect();
            SlotRow {
                time: slot.to_string(),
                is_empty: matched.is_empty(),
                appointments: matched,
            }
        })
        .collect();

    let unplaced = appointments
        .iter()
        .filter(|apt| local_day(apt, offset) == day && !slots.contains(&time_of_day(apt, offset)))
        .map(|apt| apt.id.clone())
        .collect();

    DaySchedule { day, rows, unplaced }
}
