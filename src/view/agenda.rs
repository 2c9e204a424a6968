use std::time::Duration;

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use log::{error, info};

use crate::api::ClinicApi;
use crate::models::{Appointment, NewAppointment};
use crate::schedule::matcher::{appointments_in_cell, day_schedule, local_day};
use crate::schedule::{build_grid, DaySchedule, SlotGrid, TimeSlots, WeekWindow};

use super::notification::{Notification, NotificationKind, Notifier};
use super::{AppointmentDraft, ViewError};

/// State behind the appointments screen.
///
/// The appointment list is only ever replaced by a full reload from the API; a failed
/// mutation leaves it exactly as it was.
pub struct ScheduleView<A> {
    api: A,
    slots: TimeSlots,
    offset: FixedOffset,
    week: WeekWindow,
    selected_day: NaiveDate,
    appointments: Vec<Appointment>,
    notifier: Notifier,
}

impl<A: ClinicApi> ScheduleView<A> {
    /// Opens on the week containing `today`, with `today` selected.
    pub fn new(api: A, slots: TimeSlots, offset: FixedOffset, today: NaiveDate) -> Self {
        Self {
            api,
            slots,
            offset,
            week: WeekWindow::containing(today),
            selected_day: today,
            appointments: Vec::new(),
            notifier: Notifier::default(),
        }
    }

    #[must_use]
    pub fn with_notification_ttl(mut self, ttl: Duration) -> Self {
        self.notifier = Notifier::new(ttl);
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn slots(&self) -> &TimeSlots {
        &self.slots
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn week(&self) -> WeekWindow {
        self.week
    }

    pub fn grid(&self) -> SlotGrid {
        build_grid(self.week.start(), &self.slots)
    }

    pub fn next_week(&mut self) {
        self.week = self.week.next();
    }

    pub fn previous_week(&mut self) {
        self.week = self.week.previous();
    }

    pub fn selected_day(&self) -> NaiveDate {
        self.selected_day
    }

    pub fn select_day(&mut self, day: NaiveDate) {
        self.selected_day = day;
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn cell(&self, day: NaiveDate, slot: &str) -> Vec<&Appointment> {
        appointments_in_cell(&self.appointments, day, slot, &self.offset)
    }

    /// Rows of the selected day.
    pub fn day_schedule(&self) -> DaySchedule {
        day_schedule(&self.appointments, self.selected_day, &self.slots, &self.offset)
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notifier.current()
    }

    /// Replaces the loaded appointments with the server's list.
    pub async fn reload(&mut self) -> Result<(), ViewError> {
        match self.api.list_appointments().await {
            Ok(appointments) => {
                self.appointments = appointments;
                Ok(())
            }
            Err(e) => {
                error!("loading appointments failed: {e}");
                self.notifier.show("Could not load appointments.", NotificationKind::Error);
                Err(e.into())
            }
        }
    }

    /// Books the draft. Occupied slots are not checked; double booking is allowed.
    pub async fn create(&mut self, draft: AppointmentDraft) -> Result<(), ViewError> {
        let outcome = self.send_create(draft).await;
        self.finish(outcome, "Appointment created.", "Could not create the appointment. Please try again.")
    }

    /// Moves a loaded appointment to another slot of the same day and/or changes its service.
    pub async fn update(&mut self, id: &str, time: &str, service: &str) -> Result<(), ViewError> {
        let existing = self
            .appointments
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| ViewError::UnknownAppointment(id.to_string()));
        let outcome = match existing {
            Ok(existing) => self.send_update(existing, time, service).await,
            Err(e) => Err(e),
        };
        self.finish(outcome, "Appointment updated.", "Could not update the appointment. Please try again.")
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), ViewError> {
        let outcome = match self.api.delete_appointment(id).await {
            Ok(()) => {
                info!("deleted appointment {id}");
                self.refresh().await
            }
            Err(e) => Err(e.into()),
        };
        self.finish(outcome, "Appointment deleted.", "Could not delete the appointment. Please try again.")
    }

    async fn send_create(&mut self, draft: AppointmentDraft) -> Result<(), ViewError> {
        let date = self.timestamp(draft.day, &draft.time)?;
        let new = NewAppointment {
            date,
            client_id: draft.client.id,
            pet_id: draft.pet.id,
            pet_name: draft.pet.name.clone(),
            // The screen has always filled the client name from the pet; kept as-is.
            client_name: draft.pet.name,
            service: draft.service,
        };
        let created = self.api.create_appointment(&new).await?;
        info!("created appointment {} at {}", created.id, created.date);
        self.refresh().await
    }

    async fn send_update(&mut self, existing: Appointment, time: &str, service: &str) -> Result<(), ViewError> {
        let day = local_day(&existing, &self.offset);
        let date = self.timestamp(day, time)?;
        let updated = Appointment {
            date,
            service: service.to_string(),
            ..existing
        };
        self.api.update_appointment(&updated).await?;
        info!("updated appointment {} to {}", updated.id, updated.date);
        self.refresh().await
    }

    async fn refresh(&mut self) -> Result<(), ViewError> {
        self.appointments = self.api.list_appointments().await?;
        Ok(())
    }

    fn finish(&mut self, outcome: Result<(), ViewError>, success: &str, failure: &str) -> Result<(), ViewError> {
        match &outcome {
            Ok(()) => self.notifier.show(success, NotificationKind::Success),
            Err(e) => {
                error!("{failure} ({e})");
                self.notifier.show(failure, NotificationKind::Error);
            }
        }
        outcome
    }

    /// UTC instant of `time` on `day` at the clinic.
    fn timestamp(&self, day: NaiveDate, time: &str) -> Result<chrono::DateTime<Utc>, ViewError> {
        if !self.slots.contains(time) {
            return Err(ViewError::UnknownSlot(time.to_string()));
        }
        let time = NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| ViewError::UnknownSlot(time.to_string()))?;
        NaiveDateTime::new(day, time)
            .and_local_timezone(self.offset)
            .single()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| ViewError::UnknownSlot(time.format("%H:%M").to_string()))
    }
}
