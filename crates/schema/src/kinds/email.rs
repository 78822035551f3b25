//! `Email` and its option-free fast counterpart `FastEmail`.
//!
//! Both trim and lower-case the input before checking its syntax and return
//! the normalized address. The registry builds `FastEmail` whenever `Email`
//! is declared without options.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::optional_outcome;
use crate::error::ValidationError;
use crate::kind::{Kind, Outcome};
use crate::node::Children;
use crate::options::{Options, type_name};

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).expect("email regex is valid")
});

/// Longest address accepted, per RFC 5321.
const MAX_EMAIL_LEN: usize = 254;

/// Email address, honouring `opt`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Email;

/// Email address without option handling; absent data is always an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct FastEmail;

impl Kind for Email {
    fn check(
        &self,
        options: &Options,
        _children: &Children,
        data: Option<&Value>,
        key: &str,
    ) -> Result<Outcome, ValidationError> {
        if let Some(outcome) = optional_outcome(options, data, key)? {
            return Ok(outcome);
        }
        normalize(data, key).map(Outcome::Accepted)
    }
}

impl Kind for FastEmail {
    fn check(
        &self,
        _options: &Options,
        _children: &Children,
        data: Option<&Value>,
        key: &str,
    ) -> Result<Outcome, ValidationError> {
        normalize(data, key).map(Outcome::Accepted)
    }
}

fn normalize(data: Option<&Value>, key: &str) -> Result<Value, ValidationError> {
    let Some(Value::String(raw)) = data else {
        return Err(ValidationError::type_mismatch(
            key.to_owned(),
            "Email (string)",
            type_name(data),
        ));
    };

    let address = raw.trim().to_lowercase();
    if address.len() > MAX_EMAIL_LEN || !EMAIL_REGEX.is_match(&address) {
        return Err(ValidationError::constraint(
            key.to_owned(),
            "email",
            format!("Invalid Email: {address}"),
        ));
    }
    Ok(Value::String(address))
}
