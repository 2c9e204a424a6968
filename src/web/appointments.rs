use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use log::info;
use serde::Deserialize;

use crate::error::ApiError;
use crate::models::NewAppointment;

use super::AppState;

/// Body of `PUT /appointments/{id}`. Clients send the whole appointment; only these fields are applied.
#[derive(Deserialize)]
pub struct AppointmentChange {
    date: DateTime<Utc>,
    service: String,
}

pub async fn list_appointments(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let appointments = state.store.lock().unwrap().list_appointments();
    Ok(HttpResponse::Ok().json(appointments))
}

pub async fn create_appointment(
    body: web::Json<NewAppointment>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    if body.service.trim().is_empty() {
        return Err(ApiError::BadRequest("service is required".to_string()));
    }
    let appointment = state.store.lock().unwrap().create_appointment(body.into_inner())?;
    info!(
        "booked {} for {} at {}",
        appointment.service, appointment.pet_name, appointment.date
    );
    Ok(HttpResponse::Created().json(appointment))
}

pub async fn update_appointment(
    id: web::Path<String>,
    body: web::Json<AppointmentChange>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let AppointmentChange { date, service } = body.into_inner();
    let appointment = state.store.lock().unwrap().update_appointment(&id, date, service)?;
    Ok(HttpResponse::Ok().json(appointment))
}

pub async fn delete_appointment(id: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    state.store.lock().unwrap().delete_appointment(&id)?;
    info!("cancelled appointment {id}");
    Ok(HttpResponse::NoContent().finish())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/appointments")
            .route(web::get().to(list_appointments))
            .route(web::post().to(create_appointment)),
    )
    .service(
        web::resource("/appointments/{id}")
            .route(web::put().to(update_appointment))
            .route(web::delete().to(delete_appointment)),
    );
}
