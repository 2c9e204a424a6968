//! Clinic REST API: clients, pets, appointments, staff users, medical records
//! and a read-only schedule endpoint, all over an in-memory store.

pub mod appointments;
pub mod auth;
pub mod clients;
pub mod records;
pub mod schedule;
pub mod store;
pub mod users;

use std::net::TcpListener;
use std::sync::Mutex;

use actix_web::{dev::Server, middleware, web, App, HttpServer};
use chrono::FixedOffset;
use log::info;

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{RegisterUser, Role};
use crate::schedule::TimeSlots;

use self::auth::{hash_password, Sessions};
use self::store::Store;

pub struct AppState {
    pub store: Mutex<Store>,
    pub sessions: Mutex<Sessions>,
    pub slots: TimeSlots,
    pub offset: FixedOffset,
}

impl AppState {
    /// Fresh state with the configured administrator account already registered.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let mut store = Store::new();
        let admin = RegisterUser {
            name: "Administrator".to_string(),
            email: config.admin_email.clone(),
            password: config.admin_password.clone(),
            role: Role::Admin,
            license_number: None,
        };
        let hash = hash_password(&admin.password)?;
        store.insert_user(admin, hash)?;
        info!("seeded administrator {}", config.admin_email);

        Ok(Self {
            store: Mutex::new(store),
            sessions: Mutex::new(Sessions::new(config.session_ttl)),
            slots: config.slots.clone(),
            offset: config.utc_offset,
        })
    }
}

/// Registers every route of the API.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(schedule::configure)
        .configure(clients::configure)
        .configure(appointments::configure)
        .configure(users::configure)
        .configure(records::configure);
}

/// Builds the server on an already bound listener; the caller decides when to await it.
pub fn build_server(state: web::Data<AppState>, listener: TcpListener) -> std::io::Result<Server> {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .listen(listener)?
    .run();
    Ok(server)
}

pub async fn start_server(config: &Config) -> std::io::Result<()> {
    let state = AppState::new(config).map_err(|e| std::io::Error::other(e.to_string()))?;
    let listener = TcpListener::bind((config.bind_addr.as_str(), config.port))?;
    info!("clinic API listening on http://{}", listener.local_addr()?);
    build_server(web::Data::new(state), listener)?.await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Appointment, Client, LoginResponse, Pet, User};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::json;

    fn test_state() -> web::Data<AppState> {
        web::Data::new(AppState::new(&Config::default()).unwrap())
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(App::new().app_data($state.clone()).configure(configure)).await
        };
    }

    macro_rules! admin_token {
        ($app:expr) => {{
            let req = test::TestRequest::post()
                .uri("/users/login")
                .set_json(json!({"email": "admin@clinic.local", "password": "admin123"}))
                .to_request();
            let login: LoginResponse = test::call_and_read_body_json(&$app, req).await;
            assert_eq!(login.role, Role::Admin);
            login.token
        }};
    }

    #[actix_web::test]
    async fn client_pet_and_appointment_flow() {
        let state = test_state();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/clients")
            .set_json(json!({"name": "Ana Souza", "email": "ana@example.com", "city": "Recife"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let ana: Client = test::read_body_json(resp).await;

        let req = test::TestRequest::post()
            .uri(&format!("/clients/{}/pets", ana.id))
            .set_json(json!({"name": "Rex", "species": "dog", "age": 4}))
            .to_request();
        let rex: Pet = test::call_and_read_body_json(&app, req).await;
        assert_eq!(rex.owner_id, ana.id);

        let req = test::TestRequest::get().uri("/clients?name=souz").to_request();
        let found: Vec<Client> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].pets[0].name, "Rex");

        let req = test::TestRequest::post()
            .uri("/appointments")
            .set_json(json!({
                "date": "2024-01-08T09:00:00Z",
                "clientId": ana.id,
                "petId": rex.id,
                "petName": "Rex",
                "clientName": "Rex",
                "service": "Consulta de Rotina"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let booked: Appointment = test::read_body_json(resp).await;
        assert_eq!(booked.pet.as_ref().unwrap().name, "Rex");

        let req = test::TestRequest::get().uri("/schedule?day=2024-01-08").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["weekStart"], "2024-01-07");
        assert_eq!(body["schedule"]["rows"][0]["time"], "09:00");
        assert_eq!(body["schedule"]["rows"][0]["appointments"][0]["id"], booked.id.as_str());
        assert_eq!(body["schedule"]["rows"][1]["isEmpty"], true);

        let req = test::TestRequest::delete()
            .uri(&format!("/appointments/{}", booked.id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::delete()
            .uri(&format!("/appointments/{}", booked.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "appointment not found");
    }

    #[actix_web::test]
    async fn update_applies_only_date_and_service() {
        let state = test_state();
        let (client, pet, appointment) = {
            let mut store = state.store.lock().unwrap();
            let client = store.create_client(crate::models::ClientInput {
                name: "Ana".into(),
                ..Default::default()
            });
            let pet = store
                .add_pet(
                    &client.id,
                    crate::models::PetInput {
                        name: "Mia".into(),
                        ..Default::default()
                    },
                )
                .unwrap();
            let appointment = store
                .create_appointment(crate::models::NewAppointment {
                    date: "2024-01-08T09:00:00Z".parse().unwrap(),
                    client_id: client.id.clone(),
                    pet_id: pet.id.clone(),
                    pet_name: "Mia".into(),
                    client_name: "Mia".into(),
                    service: "Vacinação".into(),
                })
                .unwrap();
            (client, pet, appointment)
        };
        let app = app!(state);

        let mut sent = appointment.clone();
        sent.date = "2024-01-08T14:30:00Z".parse().unwrap();
        sent.service = "Banho e Tosa".into();
        sent.pet_name = "Tampered".into();
        let req = test::TestRequest::put()
            .uri(&format!("/appointments/{}", appointment.id))
            .set_json(&sent)
            .to_request();
        let updated: Appointment = test::call_and_read_body_json(&app, req).await;

        assert_eq!(updated.service, "Banho e Tosa");
        assert_eq!(updated.date, sent.date);
        assert_eq!(updated.pet_name, "Mia");
        assert_eq!(updated.client_id, client.id);
        assert_eq!(updated.pet_id, pet.id);

        let req = test::TestRequest::put()
            .uri("/appointments/missing")
            .set_json(&sent)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn unknown_pet_cannot_be_booked() {
        let state = test_state();
        let app = app!(state);
        let req = test::TestRequest::post()
            .uri("/appointments")
            .set_json(json!({
                "date": "2024-01-08T09:00:00Z",
                "clientId": "ghost",
                "petId": "ghost",
                "petName": "x",
                "clientName": "x",
                "service": "Vacinação"
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn user_routes_require_an_admin_token() {
        let state = test_state();
        let app = app!(state);

        let req = test::TestRequest::get().uri("/users").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/users")
            .insert_header(("Authorization", "Bearer made-up"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let token = admin_token!(app);
        let req = test::TestRequest::post()
            .uri("/users/register")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(json!({
                "name": "Bia",
                "email": "bia@clinic.local",
                "password": "tosa",
                "role": "GROOMER",
                "licenseNumber": "CRMV-9"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let bia: User = test::read_body_json(resp).await;
        assert_eq!(bia.license_number, None);

        let req = test::TestRequest::post()
            .uri("/users/login")
            .set_json(json!({"email": "bia@clinic.local", "password": "tosa"}))
            .to_request();
        let login: LoginResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(login.role, Role::Groomer);

        let req = test::TestRequest::get()
            .uri("/users")
            .insert_header(("Authorization", format!("Bearer {}", login.token)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri("/users")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let users: Vec<User> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(users.len(), 2);
    }

    #[actix_web::test]
    async fn login_rejects_bad_credentials() {
        let state = test_state();
        let app = app!(state);
        for body in [
            json!({"email": "admin@clinic.local", "password": "nope"}),
            json!({"email": "nobody@clinic.local", "password": "admin123"}),
        ] {
            let req = test::TestRequest::post().uri("/users/login").set_json(body).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[actix_web::test]
    async fn duplicate_registration_conflicts() {
        let state = test_state();
        let app = app!(state);
        let token = admin_token!(app);
        let req = test::TestRequest::post()
            .uri("/users/register")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(json!({
                "name": "Other admin",
                "email": "admin@clinic.local",
                "password": "x",
                "role": "ADMIN"
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn schedule_rejects_malformed_day() {
        let state = test_state();
        let app = app!(state);
        let req = test::TestRequest::get().uri("/schedule?day=08/01/2024").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn index_serves_the_agenda_page() {
        let state = test_state();
        let app = app!(state);
        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let body = test::read_body(resp).await;
        assert!(std::str::from_utf8(&body).unwrap().contains("/schedule"));
    }
}
