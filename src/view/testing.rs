use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::ClinicApi;
use crate::error::ClientError;
use crate::models::{Appointment, Client, NewAppointment, Pet};

#[derive(Default)]
struct FakeState {
    clients: Vec<Client>,
    pets: Vec<Pet>,
    appointments: Vec<Appointment>,
    next_id: u32,
    fail_next: Option<String>,
    stall_creates: bool,
    fail_lists: bool,
    search_calls: usize,
    list_calls: usize,
    created: Vec<NewAppointment>,
    updated: Vec<Appointment>,
}

/// In-memory stand-in for the clinic API.
#[derive(Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

fn client(id: &str, name: &str) -> Client {
    Client {
        id: id.into(),
        name: name.into(),
        email: String::new(),
        phone: String::new(),
        tax_id: String::new(),
        street: String::new(),
        complement: None,
        city: String::new(),
        pets: Vec::new(),
    }
}

fn pet(id: &str, name: &str, owner: &str) -> Pet {
    Pet {
        id: id.into(),
        name: name.into(),
        species: "dog".into(),
        breed: String::new(),
        age: Some(3),
        owner_id: owner.into(),
    }
}

impl FakeApi {
    /// Ana Souza (Rex, Mia) and Mariana Lima (Thor).
    pub fn with_sample_clinic() -> Self {
        let api = Self::default();
        {
            let mut state = api.state.lock().unwrap();
            state.clients = vec![client("c1", "Ana Souza"), client("c2", "Mariana Lima")];
            state.pets = vec![pet("p1", "Rex", "c1"), pet("p2", "Mia", "c1"), pet("p3", "Thor", "c2")];
        }
        api
    }

    pub fn seed(&self, appointment: Appointment) {
        self.state.lock().unwrap().appointments.push(appointment);
    }

    pub fn fail_next(&self, message: &str) {
        self.state.lock().unwrap().fail_next = Some(message.to_string());
    }

    pub fn fail_lists(&self, fail: bool) {
        self.state.lock().unwrap().fail_lists = fail;
    }

    pub fn stall_creates(&self) {
        self.state.lock().unwrap().stall_creates = true;
    }

    pub fn search_calls(&self) -> usize {
        self.state.lock().unwrap().search_calls
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }

    pub fn created(&self) -> Vec<NewAppointment> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn updated(&self) -> Vec<Appointment> {
        self.state.lock().unwrap().updated.clone()
    }

    pub fn stored(&self) -> Vec<Appointment> {
        self.state.lock().unwrap().appointments.clone()
    }

    fn check_failure(state: &mut FakeState) -> Result<(), ClientError> {
        match state.fail_next.take() {
            Some(message) => Err(ClientError::Status { status: 500, message }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ClinicApi for FakeApi {
    async fn list_appointments(&self) -> Result<Vec<Appointment>, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        Self::check_failure(&mut state)?;
        if state.fail_lists {
            return Err(ClientError::Status {
                status: 503,
                message: "unavailable".into(),
            });
        }
        Ok(state.appointments.clone())
    }

    async fn create_appointment(&self, new: &NewAppointment) -> Result<Appointment, ClientError> {
        let stall = self.state.lock().unwrap().stall_creates;
        if stall {
            std::future::pending::<()>().await;
        }

        let mut state = self.state.lock().unwrap();
        Self::check_failure(&mut state)?;
        state.next_id += 1;
        let appointment = Appointment {
            id: format!("apt-{}", state.next_id),
            date: new.date,
            service: new.service.clone(),
            pet_name: new.pet_name.clone(),
            client_name: new.client_name.clone(),
            pet_id: new.pet_id.clone(),
            client_id: new.client_id.clone(),
            client: None,
            pet: None,
        };
        state.created.push(new.clone());
        state.appointments.push(appointment.clone());
        Ok(appointment)
    }

    async fn update_appointment(&self, appointment: &Appointment) -> Result<Appointment, ClientError> {
        let mut state = self.state.lock().unwrap();
        Self::check_failure(&mut state)?;
        state.updated.push(appointment.clone());
        let stored = state
            .appointments
            .iter_mut()
            .find(|a| a.id == appointment.id)
            .ok_or_else(|| ClientError::Status {
                status: 404,
                message: "appointment not found".into(),
            })?;
        stored.date = appointment.date;
        stored.service = appointment.service.clone();
        Ok(stored.clone())
    }

    async fn delete_appointment(&self, id: &str) -> Result<(), ClientError> {
        let mut state = self.state.lock().unwrap();
        Self::check_failure(&mut state)?;
        let before = state.appointments.len();
        state.appointments.retain(|a| a.id != id);
        if state.appointments.len() == before {
            return Err(ClientError::Status {
                status: 404,
                message: "appointment not found".into(),
            });
        }
        Ok(())
    }

    async fn search_clients(&self, name: &str) -> Result<Vec<Client>, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.search_calls += 1;
        Self::check_failure(&mut state)?;
        let needle = name.to_lowercase();
        Ok(state
            .clients
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn client_pets(&self, client_id: &str) -> Result<Vec<Pet>, ClientError> {
        let mut state = self.state.lock().unwrap();
        Self::check_failure(&mut state)?;
        Ok(state.pets.iter().filter(|p| p.owner_id == client_id).cloned().collect())
    }
}
