use std::sync::{Arc, RwLock};

use thiserror::Error;

use crate::models::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Anonymous,
    Authenticated { token: String, role: Role },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("login required")]
    LoginRequired,

    #[error("access denied: {required} role required")]
    AccessDenied { required: Role },
}

/// Login state shared by whoever is handed a clone of it.
///
/// Transitions only happen through [`AuthContext::login`] and [`AuthContext::logout`].
#[derive(Debug, Clone)]
pub struct AuthContext {
    session: Arc<RwLock<Session>>,
}

impl Default for AuthContext {
    fn default() -> Self {
        Self {
            session: Arc::new(RwLock::new(Session::Anonymous)),
        }
    }
}

impl AuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(&self, token: String, role: Role) {
        *self.session.write().unwrap() = Session::Authenticated { token, role };
    }

    pub fn logout(&self) {
        *self.session.write().unwrap() = Session::Anonymous;
    }

    pub fn session(&self) -> Session {
        self.session.read().unwrap().clone()
    }

    pub fn token(&self) -> Option<String> {
        match &*self.session.read().unwrap() {
            Session::Authenticated { token, .. } => Some(token.clone()),
            Session::Anonymous => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        match &*self.session.read().unwrap() {
            Session::Authenticated { role, .. } => Some(*role),
            Session::Anonymous => None,
        }
    }

    /// Gate for role-restricted screens.
    pub fn require_role(&self, required: Role) -> Result<(), AuthError> {
        match self.role() {
            None => Err(AuthError::LoginRequired),
            Some(role) if role == required => Ok(()),
            Some(_) => Err(AuthError::AccessDenied { required }),
        }
    }
}
