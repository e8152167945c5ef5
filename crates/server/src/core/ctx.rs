use crate::core::error::{Error, Result};
use crate::core::models::{Role, Session};
use axum::{extract::FromRequestParts, http::request::Parts};

/// Request context for an authenticated caller, installed by the auth middleware.
#[derive(Clone, Debug)]
pub struct Ctx {
    user_id: String,
    email: String,
    role: Option<Role>,
    is_admin: bool,
}

impl Ctx {
    pub fn new(user_id: String, email: String, role: Option<Role>, is_admin: bool) -> Self {
        Self {
            user_id,
            email,
            role,
            is_admin,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Callers may read their own records; admins may read anyone's.
    pub fn can_read(&self, user_id: &str) -> bool {
        self.is_admin || self.user_id == user_id
    }

    pub fn to_session(&self) -> Session {
        Session {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            role: self.role,
            is_admin: self.is_admin,
            token: None,
        }
    }
}

impl<S> FromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<Ctx>()
            .cloned()
            .ok_or(Error::AuthFailCtxNotInRequestExt)
    }
}
