use actix_web::{web, HttpResponse};
use chrono::Utc;
use log::{info, warn};

use crate::error::ApiError;
use crate::models::{LoginRequest, LoginResponse, RegisterUser, Role, UpdateUser};

use super::auth::{hash_password, verify_password, Caller};
use super::AppState;

pub async fn login(body: web::Json<LoginRequest>, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let (user_id, role, hash) = {
        let store = state.store.lock().unwrap();
        match store.credentials(&body.email) {
            Some((user, hash)) => (user.id.clone(), user.role, hash.to_string()),
            None => {
                warn!("login attempt for unknown email {}", body.email);
                return Err(ApiError::InvalidCredentials);
            }
        }
    };

    if !verify_password(&body.password, &hash) {
        warn!("wrong password for {}", body.email);
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.sessions.lock().unwrap().issue(&user_id, role, Utc::now());
    Ok(HttpResponse::Ok().json(LoginResponse { token, role }))
}

pub async fn register(
    caller: Caller,
    body: web::Json<RegisterUser>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    caller.require(Role::Admin)?;
    let input = body.into_inner();
    if input.email.trim().is_empty() || input.password.is_empty() {
        return Err(ApiError::BadRequest("email and password are required".to_string()));
    }
    let hash = hash_password(&input.password)?;
    let user = state.store.lock().unwrap().insert_user(input, hash)?;
    info!("registered {} user {}", user.role, user.email);
    Ok(HttpResponse::Created().json(user))
}

pub async fn list_users(caller: Caller, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    caller.require(Role::Admin)?;
    let users = state.store.lock().unwrap().list_users();
    Ok(HttpResponse::Ok().json(users))
}

pub async fn update_user(
    caller: Caller,
    id: web::Path<String>,
    body: web::Json<UpdateUser>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    caller.require(Role::Admin)?;
    let user = state.store.lock().unwrap().update_user(&id, body.into_inner())?;
    Ok(HttpResponse::Ok().json(user))
}

pub async fn delete_user(caller: Caller, id: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    caller.require(Role::Admin)?;
    state.store.lock().unwrap().delete_user(&id)?;
    state.sessions.lock().unwrap().revoke_user(&id);
    info!("deleted user {id}");
    Ok(HttpResponse::NoContent().finish())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/users/login", web::post().to(login))
        .route("/users/register", web::post().to(register))
        .route("/users", web::get().to(list_users))
        .service(
            web::resource("/users/{id}")
                .route(web::put().to(update_user))
                .route(web::delete().to(delete_user)),
        );
}
