use chrono::NaiveDate;
use log::error;

use crate::api::ClinicApi;
use crate::error::ClientError;
use crate::models::{Client, Pet};

use super::{AppointmentDraft, ViewError};

/// Queries shorter than this never reach the server.
pub const MIN_QUERY_LEN: usize = 2;

/// Client search followed by the dependent pet list, feeding the new-appointment form.
///
/// The pet stage stays empty until a client has been chosen.
#[derive(Debug, Clone, Default)]
pub struct ClientLookup {
    query: String,
    suggestions: Vec<Client>,
    client: Option<Client>,
    pets: Vec<Pet>,
    pet: Option<Pet>,
}

impl ClientLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn suggestions(&self) -> &[Client] {
        &self.suggestions
    }

    pub fn client(&self) -> Option<&Client> {
        self.client.as_ref()
    }

    pub fn pets(&self) -> &[Pet] {
        &self.pets
    }

    pub fn pet(&self) -> Option<&Pet> {
        self.pet.as_ref()
    }

    /// Updates the query and refreshes suggestions once it is long enough.
    pub async fn search<A>(&mut self, api: &A, query: &str) -> Result<(), ClientError>
    where
        A: ClinicApi + ?Sized,
    {
        self.query = query.to_string();
        if query.chars().count() < MIN_QUERY_LEN {
            self.suggestions.clear();
            return Ok(());
        }

        match api.search_clients(query).await {
            Ok(found) => {
                self.suggestions = found;
                Ok(())
            }
            Err(e) => {
                error!("client search for '{query}' failed: {e}");
                Err(e)
            }
        }
    }

    /// Chooses a client and loads its pets. Any previous pet choice is dropped.
    pub async fn select_client<A>(&mut self, api: &A, client: Client) -> Result<(), ClientError>
    where
        A: ClinicApi + ?Sized,
    {
        self.query = client.name.clone();
        self.suggestions.clear();
        self.pets.clear();
        self.pet = None;

        let client_id = client.id.clone();
        self.client = Some(client);

        match api.client_pets(&client_id).await {
            Ok(pets) => {
                self.pets = pets;
                Ok(())
            }
            Err(e) => {
                error!("loading pets of client {client_id} failed: {e}");
                Err(e)
            }
        }
    }

    /// Picks one of the loaded pets; an unknown id clears the choice.
    pub fn select_pet(&mut self, pet_id: &str) -> Option<&Pet> {
        self.pet = self.pets.iter().find(|p| p.id == pet_id).cloned();
        self.pet.as_ref()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Required-field gate for the new-appointment form.
    pub fn draft(&self, day: NaiveDate, time: &str, service: &str) -> Result<AppointmentDraft, ViewError> {
        let client = self.client.clone().ok_or(ViewError::MissingSelection("client"))?;
        let pet = self.pet.clone().ok_or(ViewError::MissingSelection("pet"))?;
        if service.trim().is_empty() {
            return Err(ViewError::MissingSelection("service"));
        }
        Ok(AppointmentDraft {
            day,
            time: time.to_string(),
            client,
            pet,
            service: service.to_string(),
        })
    }
}
