use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub tax_id: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub complement: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pets: Vec<Pet>,
}

/// Client fields accepted on create and update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInput {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub tax_id: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub complement: Option<String>,
    #[serde(default)]
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub species: String,
    #[serde(default)]
    pub breed: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub owner_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetInput {
    pub name: String,
    #[serde(default)]
    pub species: String,
    #[serde(default)]
    pub breed: String,
    #[serde(default)]
    pub age: Option<u32>,
}

/// A booked visit. `pet_name` and `client_name` are copies kept for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub date: DateTime<Utc>,
    pub service: String,
    #[serde(default)]
    pub pet_name: String,
    #[serde(default)]
    pub client_name: String,
    pub pet_id: String,
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<Client>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet: Option<Pet>,
}

/// Body of `POST /appointments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub date: DateTime<Utc>,
    pub client_id: String,
    pub pet_id: String,
    pub pet_name: String,
    pub client_name: String,
    pub service: String,
}

/// Services offered at the front desk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    RoutineCheckup,
    BathAndGrooming,
    Vaccination,
}

impl Service {
    pub const ALL: [Service; 3] = [Service::RoutineCheckup, Service::BathAndGrooming, Service::Vaccination];

    pub fn as_str(&self) -> &'static str {
        match self {
            Service::RoutineCheckup => "Consulta de Rotina",
            Service::BathAndGrooming => "Banho e Tosa",
            Service::Vaccination => "Vacinação",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Service::ALL
            .into_iter()
            .find(|service| service.as_str().eq_ignore_ascii_case(wanted))
            .or(match wanted.to_ascii_lowercase().as_str() {
                "checkup" | "routine" => Some(Service::RoutineCheckup),
                "grooming" | "bath" => Some(Service::BathAndGrooming),
                "vaccination" | "vaccine" => Some(Service::Vaccination),
                _ => None,
            })
            .ok_or_else(|| format!("unknown service '{wanted}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Veterinarian,
    Attendant,
    Groomer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "ADMIN",
            Role::Veterinarian => "VETERINARIAN",
            Role::Attendant => "ATTENDANT",
            Role::Groomer => "GROOMER",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub license_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub license_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub license_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    pub id: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub pet_id: String,
    pub pet_name: String,
    pub owner_id: String,
    pub owner_name: String,
    pub vet_id: String,
    pub vet_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMedicalRecord {
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub pet_id: String,
    pub vet_id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMedicalRecord {
    pub pet_id: String,
    pub owner_id: String,
    pub vet_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
}
