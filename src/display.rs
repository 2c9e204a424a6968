use std::path::Path;

use chrono::NaiveDate;
use csv::WriterBuilder;

use crate::models::Appointment;
use crate::schedule::{DaySchedule, WeekWindow};

/// `Pet - Client (service)`, preferring the related records over the copied names.
pub fn format_appointment_label(appointment: &Appointment) -> String {
    let pet = appointment
        .pet
        .as_ref()
        .map(|p| p.name.as_str())
        .unwrap_or(appointment.pet_name.as_str());
    let client = appointment
        .client
        .as_ref()
        .map(|c| c.name.as_str())
        .unwrap_or(appointment.client_name.as_str());

    match (pet.is_empty(), client.is_empty()) {
        (true, _) => format!("Pet ({})", appointment.service),
        (false, true) => format!("{} ({})", pet, appointment.service),
        (false, false) => format!("{} - {} ({})", pet, client, appointment.service),
    }
}

/// One line per day of the week, marking the selected one.
pub fn format_week_header(week: &WeekWindow, selected: NaiveDate) -> String {
    week.days()
        .iter()
        .map(|day| {
            let label = day.format("%a %d/%m").to_string();
            if *day == selected {
                format!("[{label}]")
            } else {
                label
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn print_day_schedule(week: &WeekWindow, schedule: &DaySchedule) {
    println!("\n{}", format_week_header(week, schedule.day));
    println!("\n=== {} ===", schedule.day.format("%A, %d/%m/%Y"));
    println!("Appointments: {}", schedule.booked());

    for row in &schedule.rows {
        if row.is_empty {
            println!("  {} -> [FREE]", row.time);
            continue;
        }
        for appointment in &row.appointments {
            println!("  {} -> {} (ID: {})", row.time, format_appointment_label(appointment), appointment.id);
        }
    }

    if !schedule.unplaced.is_empty() {
        println!("⚠️  Off-grid appointments ({}): {}", schedule.unplaced.len(), schedule.unplaced.join(", "));
    }
}

/// Writes the day grid as CSV, one record per appointment and one per free slot.
pub fn write_schedule_csv(schedule: &DaySchedule, path: &Path) -> Result<(), csv::Error> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record(["day", "time", "status", "appointment_id", "pet", "client", "service"])?;

    let day = schedule.day.format("%Y-%m-%d").to_string();
    for row in &schedule.rows {
        if row.is_empty {
            wtr.write_record([day.as_str(), row.time.as_str(), "FREE", "", "", "", ""])?;
            continue;
        }
        for apt in &row.appointments {
            let client = apt.client.as_ref().map(|c| c.name.as_str()).unwrap_or(apt.client_name.as_str());
            wtr.write_record([
                day.as_str(),
                row.time.as_str(),
                "BOOKED",
                apt.id.as_str(),
                apt.pet_name.as_str(),
                client,
                apt.service.as_str(),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
