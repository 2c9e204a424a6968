use actix_web::{web, HttpResponse};

use crate::error::ApiError;
use crate::models::{NewMedicalRecord, UpdateMedicalRecord};

use super::AppState;

pub async fn list_records(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let records = state.store.lock().unwrap().list_records();
    Ok(HttpResponse::Ok().json(records))
}

pub async fn create_record(body: web::Json<NewMedicalRecord>, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let record = state.store.lock().unwrap().create_record(body.into_inner())?;
    Ok(HttpResponse::Created().json(record))
}

pub async fn update_record(
    id: web::Path<String>,
    body: web::Json<UpdateMedicalRecord>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let record = state.store.lock().unwrap().update_record(&id, body.into_inner())?;
    Ok(HttpResponse::Ok().json(record))
}

/// Answers with the removed record.
pub async fn delete_record(id: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let record = state.store.lock().unwrap().delete_record(&id)?;
    Ok(HttpResponse::Ok().json(record))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/medical-records")
            .route(web::get().to(list_records))
            .route(web::post().to(create_record)),
    )
    .service(
        web::resource("/medical-records/{id}")
            .route(web::put().to(update_record))
            .route(web::delete().to(delete_record)),
    );
}
