//! Caller identity, as verified by the external auth gateway.
//!
//! The gateway terminates authentication and attaches the verified account id
//! (and role) as request headers; this service trusts them and never sees
//! credentials.

use axum::http::{HeaderName, HeaderValue};
use axum_extra::headers::{Error as HeaderError, Header};

static ACCOUNT_ID_HEADER: HeaderName = HeaderName::from_static("account-id");
static ACCOUNT_ROLE_HEADER: HeaderName = HeaderName::from_static("account-role");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Player,
    Admin,
}

/// Identity attached to every request by the middleware.
#[derive(Clone, Debug)]
pub struct Identity {
    pub account_id: String,
    pub role: Role,
}

/// `TypedHeader` for the gateway-verified account id.
#[derive(Debug)]
pub(crate) struct AccountIdHeader(pub String);

impl Header for AccountIdHeader {
    fn name() -> &'static HeaderName {
        &ACCOUNT_ID_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, HeaderError>
    where
        Self: Sized,
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(HeaderError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(HeaderError::invalid());
        };
        let value = value.trim();
        if value.is_empty() {
            return Err(HeaderError::invalid());
        }

        Ok(AccountIdHeader(value.to_string()))
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        match HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode account-id header"),
        }
    }
}

/// `TypedHeader` for the optional gateway-verified role.
#[derive(Debug)]
pub(crate) struct AccountRoleHeader(pub Role);

impl Header for AccountRoleHeader {
    fn name() -> &'static HeaderName {
        &ACCOUNT_ROLE_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, HeaderError>
    where
        Self: Sized,
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(HeaderError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(HeaderError::invalid());
        };

        match value.trim().to_ascii_lowercase().as_str() {
            "player" => Ok(AccountRoleHeader(Role::Player)),
            "admin" => Ok(AccountRoleHeader(Role::Admin)),
            _ => Err(HeaderError::invalid()),
        }
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        let raw = match self.0 {
            Role::Player => "player",
            Role::Admin => "admin",
        };
        values.extend(std::iter::once(HeaderValue::from_static(raw)));
    }
}
