//! Client-side state of the appointments screen: the week grid, the loaded
//! appointments, the new-appointment form lookup and transient notifications.

pub mod agenda;
pub mod lookup;
pub mod notification;

#[cfg(test)]
pub(crate) mod testing;

use chrono::NaiveDate;
use thiserror::Error;

use crate::error::ClientError;
use crate::models::{Client, Pet};

pub use agenda::ScheduleView;
pub use lookup::{ClientLookup, MIN_QUERY_LEN};
pub use notification::{Notification, NotificationKind, Notifier};

#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Api(#[from] ClientError),

    #[error("no {0} selected")]
    MissingSelection(&'static str),

    #[error("appointment {0} is not loaded")]
    UnknownAppointment(String),

    #[error("'{0}' is not one of the clinic's time slots")]
    UnknownSlot(String),
}

/// Everything the new-appointment form collects before submitting.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentDraft {
    pub day: NaiveDate,
    pub time: String,
    pub client: Client,
    pub pet: Pet,
    pub service: String,
}
