pub mod http;

use async_trait::async_trait;

use crate::error::ClientError;
use crate::models::{Appointment, Client, NewAppointment, Pet};

pub use http::HttpClinicApi;

/// The endpoints the scheduling view depends on.
#[async_trait]
pub trait ClinicApi: Send + Sync {
    async fn list_appointments(&self) -> Result<Vec<Appointment>, ClientError>;

    async fn create_appointment(&self, appointment: &NewAppointment) -> Result<Appointment, ClientError>;

    /// Sends the whole appointment; the server applies `date` and `service`.
    async fn update_appointment(&self, appointment: &Appointment) -> Result<Appointment, ClientError>;

    async fn delete_appointment(&self, id: &str) -> Result<(), ClientError>;

    /// Case-insensitive partial match on the client name.
    async fn search_clients(&self, name: &str) -> Result<Vec<Client>, ClientError>;

    async fn client_pets(&self, client_id: &str) -> Result<Vec<Pet>, ClientError>;
}
