use actix_web::{web, HttpResponse};
use log::info;
use serde::Deserialize;

use crate::error::ApiError;
use crate::models::{ClientInput, PetInput};

use super::AppState;

#[derive(Deserialize)]
pub struct SearchQuery {
    name: Option<String>,
}

fn require_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::BadRequest("name is required".to_string()));
    }
    Ok(())
}

pub async fn list_clients(query: web::Query<SearchQuery>, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let store = state.store.lock().unwrap();
    let name = query.name.as_deref().filter(|n| !n.is_empty());
    Ok(HttpResponse::Ok().json(store.search_clients(name)))
}

pub async fn create_client(body: web::Json<ClientInput>, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    require_name(&body.name)?;
    let client = state.store.lock().unwrap().create_client(body.into_inner());
    info!("registered client {} ({})", client.name, client.id);
    Ok(HttpResponse::Created().json(client))
}

pub async fn update_client(
    id: web::Path<String>,
    body: web::Json<ClientInput>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    require_name(&body.name)?;
    let client = state.store.lock().unwrap().update_client(&id, body.into_inner())?;
    Ok(HttpResponse::Ok().json(client))
}

pub async fn delete_client(id: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    state.store.lock().unwrap().delete_client(&id)?;
    info!("removed client {id} with its pets and appointments");
    Ok(HttpResponse::NoContent().finish())
}

pub async fn list_pets(client_id: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let pets = state.store.lock().unwrap().client_pets(&client_id);
    Ok(HttpResponse::Ok().json(pets))
}

pub async fn add_pet(
    client_id: web::Path<String>,
    body: web::Json<PetInput>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    require_name(&body.name)?;
    let pet = state.store.lock().unwrap().add_pet(&client_id, body.into_inner())?;
    Ok(HttpResponse::Created().json(pet))
}

pub async fn update_pet(
    path: web::Path<(String, String)>,
    body: web::Json<PetInput>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    require_name(&body.name)?;
    let (client_id, pet_id) = path.into_inner();
    let pet = state
        .store
        .lock()
        .unwrap()
        .update_pet(&client_id, &pet_id, body.into_inner())?;
    Ok(HttpResponse::Ok().json(pet))
}

pub async fn delete_pet(path: web::Path<(String, String)>, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let (client_id, pet_id) = path.into_inner();
    state.store.lock().unwrap().delete_pet(&client_id, &pet_id)?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/clients")
            .route(web::get().to(list_clients))
            .route(web::post().to(create_client)),
    )
    .service(
        web::resource("/clients/{id}")
            .route(web::put().to(update_client))
            .route(web::delete().to(delete_client)),
    )
    .service(
        web::resource("/clients/{id}/pets")
            .route(web::get().to(list_pets))
            .route(web::post().to(add_pet)),
    )
    .service(
        web::resource("/clients/{id}/pets/{pet_id}")
            .route(web::put().to(update_pet))
            .route(web::delete().to(delete_pet)),
    );
}
