//! Operator access check used by the driver before restock, report and collect.

use std::env;

use thiserror::Error;

/// Secret used when `VEND_OPERATOR_SECRET` is unset.
pub const DEFAULT_OPERATOR_SECRET: &str = "admin";

pub const OPERATOR_SECRET_ENV: &str = "VEND_OPERATOR_SECRET";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("operator access denied for '{0}'")]
pub struct AccessDenied(pub String);

/// Shared-secret gate. Lives outside the engine, which has no notion of users.
#[derive(Debug, Clone)]
pub struct OperatorGate {
    secret: String,
}

impl OperatorGate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(env::var(OPERATOR_SECRET_ENV).unwrap_or_else(|_| DEFAULT_OPERATOR_SECRET.into()))
    }

    pub fn check(&self, action: &str, provided: Option<&str>) -> Result<(), AccessDenied> {
        match provided {
            Some(secret) if secret == self.secret => Ok(()),
            _ => Err(AccessDenied(action.to_string())),
        }
    }
}

impl Default for OperatorGate {
    fn default() -> Self {
        Self::new(DEFAULT_OPERATOR_SECRET)
    }
}
