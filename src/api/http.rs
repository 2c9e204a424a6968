use async_trait::async_trait;
use log::debug;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::auth::AuthContext;
use crate::error::ClientError;
use crate::models::{Appointment, Client, LoginRequest, LoginResponse, NewAppointment, Pet};

use super::ClinicApi;

/// Talks to the clinic REST API over HTTP.
#[derive(Debug, Clone)]
pub struct HttpClinicApi {
    client: reqwest::Client,
    base_url: String,
    auth: AuthContext,
}

impl HttpClinicApi {
    pub fn new(base_url: impl Into<String>, auth: AuthContext) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        }
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.auth.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        debug!("clinic API answered {status}: {body}");
        Err(ClientError::from_body(status.as_u16(), &body))
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        Ok(self.send(request).await?.json().await?)
    }

    /// Exchanges credentials for a session token and records it in the shared auth context.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self
            .json(self.client.post(self.url("/users/login")).json(&body))
            .await?;
        self.auth.login(response.token.clone(), response.role);
        Ok(response)
    }

    pub fn logout(&self) {
        self.auth.logout();
    }
}

#[async_trait]
impl ClinicApi for HttpClinicApi {
    async fn list_appointments(&self) -> Result<Vec<Appointment>, ClientError> {
        self.json(self.client.get(self.url("/appointments"))).await
    }

    async fn create_appointment(&self, appointment: &NewAppointment) -> Result<Appointment, ClientError> {
        self.json(self.client.post(self.url("/appointments")).json(appointment))
            .await
    }

    async fn update_appointment(&self, appointment: &Appointment) -> Result<Appointment, ClientError> {
        let path = format!("/appointments/{}", appointment.id);
        self.json(self.client.put(self.url(&path)).json(appointment)).await
    }

    async fn delete_appointment(&self, id: &str) -> Result<(), ClientError> {
        let path = format!("/appointments/{id}");
        self.send(self.client.delete(self.url(&path))).await?;
        Ok(())
    }

    async fn search_clients(&self, name: &str) -> Result<Vec<Client>, ClientError> {
        self.json(self.client.get(self.url("/clients")).query(&[("name", name)]))
            .await
    }

    async fn client_pets(&self, client_id: &str) -> Result<Vec<Pet>, ClientError> {
        let path = format!("/clients/{client_id}/pets");
        self.json(self.client.get(self.url(&path))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn appointment_json(id: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "date": "2024-01-08T09:00:00Z",
            "service": "Consulta de Rotina",
            "petName": "Rex",
            "clientName": "Rex",
            "petId": "p1",
            "clientId": "c1",
            "client": {"id": "c1", "name": "Ana"},
            "pet": {"id": "p1", "name": "Rex", "ownerId": "c1"}
        })
    }

    #[tokio::test]
    async fn lists_appointments() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/appointments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([appointment_json("a1")])))
            .mount(&server)
            .await;

        let api = HttpClinicApi::new(server.uri(), AuthContext::new());
        let list = api.list_appointments().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].client.as_ref().unwrap().name, "Ana");
    }

    #[tokio::test]
    async fn search_sends_name_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/clients"))
            .and(query_param("name", "an"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{"id": "c1", "name": "Ana"}])))
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpClinicApi::new(format!("{}/", server.uri()), AuthContext::new());
        let clients = api.search_clients("an").await.unwrap();
        assert_eq!(clients[0].id, "c1");
    }

    #[tokio::test]
    async fn server_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/appointments/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({"message": "appointment not found"})))
            .mount(&server)
            .await;

        let api = HttpClinicApi::new(server.uri(), AuthContext::new());
        match api.delete_appointment("missing").await {
            Err(ClientError::Status { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "appointment not found");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn login_stores_token_and_sends_it_afterwards() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/login"))
            .and(body_partial_json(serde_json::json!({"email": "admin@clinic.local"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "t0k", "role": "ADMIN"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/clients/c1/pets"))
            .and(header("authorization", "Bearer t0k"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let auth = AuthContext::new();
        let api = HttpClinicApi::new(server.uri(), auth.clone());
        let login = api.login("admin@clinic.local", "admin123").await.unwrap();
        assert_eq!(login.role, Role::Admin);
        assert_eq!(auth.token().as_deref(), Some("t0k"));

        assert!(api.client_pets("c1").await.unwrap().is_empty());

        api.logout();
        assert_eq!(auth.token(), None);
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let api = HttpClinicApi::new("http://127.0.0.1:9", AuthContext::new());
        assert!(matches!(api.list_appointments().await, Err(ClientError::Transport(_))));
    }
}
