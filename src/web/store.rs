use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{
    Appointment, Client, ClientInput, MedicalRecord, NewAppointment, NewMedicalRecord, Pet, PetInput, RegisterUser,
    Role, UpdateMedicalRecord, UpdateUser, User,
};

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

/// In-memory tables of the clinic. Every list keeps insertion order.
#[derive(Debug, Default)]
pub struct Store {
    clients: Vec<Client>,
    pets: Vec<Pet>,
    appointments: Vec<Appointment>,
    users: Vec<StoredUser>,
    records: Vec<MedicalRecord>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    // Clients

    pub fn create_client(&mut self, input: ClientInput) -> Client {
        let client = Client {
            id: new_id(),
            name: input.name,
            email: input.email,
            phone: input.phone,
            tax_id: input.tax_id,
            street: input.street,
            complement: input.complement,
            city: input.city,
            pets: Vec::new(),
        };
        self.clients.push(client.clone());
        client
    }

    pub fn client(&self, id: &str) -> Result<&Client, ApiError> {
        self.clients.iter().find(|c| c.id == id).ok_or(ApiError::NotFound("client"))
    }

    /// Clients whose name contains `name`, ignoring case, each with its pets.
    pub fn search_clients(&self, name: Option<&str>) -> Vec<Client> {
        let needle = name.map(str::to_lowercase);
        self.clients
            .iter()
            .filter(|c| match &needle {
                Some(needle) => c.name.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .map(|c| Client {
                pets: self.client_pets(&c.id),
                ..c.clone()
            })
            .collect()
    }

    pub fn update_client(&mut self, id: &str, input: ClientInput) -> Result<Client, ApiError> {
        let client = self
            .clients
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(ApiError::NotFound("client"))?;
        client.name = input.name;
        client.email = input.email;
        client.phone = input.phone;
        client.tax_id = input.tax_id;
        client.street = input.street;
        client.complement = input.complement;
        client.city = input.city;
        Ok(client.clone())
    }

    /// Removes the client together with its pets and appointments.
    pub fn delete_client(&mut self, id: &str) -> Result<(), ApiError> {
        self.client(id)?;
        self.clients.retain(|c| c.id != id);
        self.pets.retain(|p| p.owner_id != id);
        self.appointments.retain(|a| a.client_id != id);
        Ok(())
    }

    // Pets

    pub fn add_pet(&mut self, client_id: &str, input: PetInput) -> Result<Pet, ApiError> {
        self.client(client_id)?;
        let pet = Pet {
            id: new_id(),
            name: input.name,
            species: input.species,
            breed: input.breed,
            age: input.age,
            owner_id: client_id.to_string(),
        };
        self.pets.push(pet.clone());
        Ok(pet)
    }

    pub fn pet(&self, id: &str) -> Result<&Pet, ApiError> {
        self.pets.iter().find(|p| p.id == id).ok_or(ApiError::NotFound("pet"))
    }

    pub fn client_pets(&self, client_id: &str) -> Vec<Pet> {
        self.pets.iter().filter(|p| p.owner_id == client_id).cloned().collect()
    }

    pub fn update_pet(&mut self, client_id: &str, pet_id: &str, input: PetInput) -> Result<Pet, ApiError> {
        self.client(client_id)?;
        let pet = self
            .pets
            .iter_mut()
            .find(|p| p.id == pet_id && p.owner_id == client_id)
            .ok_or(ApiError::NotFound("pet"))?;
        pet.name = input.name;
        pet.species = input.species;
        pet.breed = input.breed;
        pet.age = input.age;
        Ok(pet.clone())
    }

    /// Removes the pet and its appointments.
    pub fn delete_pet(&mut self, client_id: &str, pet_id: &str) -> Result<(), ApiError> {
        self.client(client_id)?;
        if !self.pets.iter().any(|p| p.id == pet_id && p.owner_id == client_id) {
            return Err(ApiError::NotFound("pet"));
        }
        self.pets.retain(|p| p.id != pet_id);
        self.appointments.retain(|a| a.pet_id != pet_id);
        Ok(())
    }

    // Appointments

    fn with_relations(&self, appointment: &Appointment) -> Appointment {
        Appointment {
            client: self.client(&appointment.client_id).ok().cloned(),
            pet: self.pet(&appointment.pet_id).ok().cloned(),
            ..appointment.clone()
        }
    }

    pub fn list_appointments(&self) -> Vec<Appointment> {
        self.appointments.iter().map(|a| self.with_relations(a)).collect()
    }

    /// Stores the appointment as sent; the display names are taken from the request.
    pub fn create_appointment(&mut self, new: NewAppointment) -> Result<Appointment, ApiError> {
        self.client(&new.client_id)?;
        self.pet(&new.pet_id)?;
        let appointment = Appointment {
            id: new_id(),
            date: new.date,
            service: new.service,
            pet_name: new.pet_name,
            client_name: new.client_name,
            pet_id: new.pet_id,
            client_id: new.client_id,
            client: None,
            pet: None,
        };
        self.appointments.push(appointment.clone());
        Ok(self.with_relations(&appointment))
    }

    /// Only the date and the service of an appointment can change.
    pub fn update_appointment(&mut self, id: &str, date: DateTime<Utc>, service: String) -> Result<Appointment, ApiError> {
        let appointment = self
            .appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(ApiError::NotFound("appointment"))?;
        appointment.date = date;
        appointment.service = service;
        let updated = appointment.clone();
        Ok(self.with_relations(&updated))
    }

    pub fn delete_appointment(&mut self, id: &str) -> Result<(), ApiError> {
        let before = self.appointments.len();
        self.appointments.retain(|a| a.id != id);
        if self.appointments.len() == before {
            return Err(ApiError::NotFound("appointment"));
        }
        Ok(())
    }

    // Users

    pub fn insert_user(&mut self, input: RegisterUser, password_hash: String) -> Result<User, ApiError> {
        if self.users.iter().any(|u| u.user.email.eq_ignore_ascii_case(&input.email)) {
            return Err(ApiError::Conflict(format!("email {} is already registered", input.email)));
        }
        let user = User {
            id: new_id(),
            name: input.name,
            email: input.email,
            role: input.role,
            license_number: license_for(input.role, input.license_number),
            created_at: Utc::now(),
        };
        self.users.push(StoredUser {
            user: user.clone(),
            password_hash,
        });
        Ok(user)
    }

    pub fn user(&self, id: &str) -> Result<&User, ApiError> {
        self.users
            .iter()
            .map(|u| &u.user)
            .find(|u| u.id == id)
            .ok_or(ApiError::NotFound("user"))
    }

    /// The user and stored hash for `email`, if registered.
    pub fn credentials(&self, email: &str) -> Option<(&User, &str)> {
        self.users
            .iter()
            .find(|u| u.user.email.eq_ignore_ascii_case(email))
            .map(|u| (&u.user, u.password_hash.as_str()))
    }

    pub fn list_users(&self) -> Vec<User> {
        self.users.iter().map(|u| u.user.clone()).collect()
    }

    pub fn update_user(&mut self, id: &str, input: UpdateUser) -> Result<User, ApiError> {
        if self
            .users
            .iter()
            .any(|u| u.user.id != id && u.user.email.eq_ignore_ascii_case(&input.email))
        {
            return Err(ApiError::Conflict(format!("email {} is already registered", input.email)));
        }
        let stored = self
            .users
            .iter_mut()
            .find(|u| u.user.id == id)
            .ok_or(ApiError::NotFound("user"))?;
        stored.user.name = input.name;
        stored.user.email = input.email;
        stored.user.role = input.role;
        stored.user.license_number = license_for(input.role, input.license_number);
        Ok(stored.user.clone())
    }

    pub fn delete_user(&mut self, id: &str) -> Result<(), ApiError> {
        self.user(id)?;
        self.users.retain(|u| u.user.id != id);
        Ok(())
    }

    // Medical records

    pub fn create_record(&mut self, new: NewMedicalRecord) -> Result<MedicalRecord, ApiError> {
        let (pet, vet) = match (self.pet(&new.pet_id), self.user(&new.vet_id)) {
            (Ok(pet), Ok(vet)) => (pet.clone(), vet.clone()),
            _ => return Err(ApiError::NotFound("pet or veterinarian")),
        };
        let owner = self.client(&pet.owner_id)?.clone();
        let record = MedicalRecord {
            id: new_id(),
            date: new.date,
            kind: new.kind,
            description: new.description,
            pet_id: pet.id,
            pet_name: pet.name,
            owner_id: owner.id,
            owner_name: owner.name,
            vet_id: vet.id,
            vet_name: vet.name,
        };
        self.records.push(record.clone());
        Ok(record)
    }

    pub fn list_records(&self) -> Vec<MedicalRecord> {
        self.records.clone()
    }

    pub fn update_record(&mut self, id: &str, input: UpdateMedicalRecord) -> Result<MedicalRecord, ApiError> {
        let vet = match self.user(&input.vet_id) {
            Ok(vet) if vet.role == Role::Veterinarian => vet.clone(),
            _ => {
                return Err(ApiError::BadRequest(
                    "only users with the VETERINARIAN role can be assigned to a record".to_string(),
                ))
            }
        };
        let (pet, owner) = match (self.pet(&input.pet_id), self.client(&input.owner_id)) {
            (Ok(pet), Ok(owner)) => (pet.clone(), owner.clone()),
            _ => return Err(ApiError::NotFound("pet or client")),
        };
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(ApiError::NotFound("medical record"))?;
        record.pet_id = pet.id;
        record.pet_name = pet.name;
        record.owner_id = owner.id;
        record.owner_name = owner.name;
        record.vet_id = vet.id;
        record.vet_name = vet.name;
        record.kind = input.kind;
        record.description = input.description;
        Ok(record.clone())
    }

    pub fn delete_record(&mut self, id: &str) -> Result<MedicalRecord, ApiError> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(ApiError::NotFound("medical record"))?;
        Ok(self.records.remove(index))
    }
}

/// Only veterinarians carry a license number.
fn license_for(role: Role, license: Option<String>) -> Option<String> {
    match role {
        Role::Veterinarian => license.filter(|l| !l.trim().is_empty()),
        _ => None,
    }
}
