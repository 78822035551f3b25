//! `String`: text values with normalization and content rules.
//!
//! Normalization runs first (`trim`, then `lowercase` / `uppercase`) and every
//! rule is checked against the normalized text, which is also what the node
//! returns. Length is counted in Unicode scalar values.
//!
//! `pattern` sources are compiled once and kept in a bounded LRU cache owned
//! by the kind, so every node sharing the kind reuses the compiled regex.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use regex::Regex;
use serde_json::Value;

use super::{LengthRules, optional_outcome};
use crate::error::ValidationError;
use crate::kind::{Kind, Outcome};
use crate::node::Children;
use crate::options::{Options, OptionsExt, type_name};

/// Default number of compiled patterns kept per kind.
const DEFAULT_PATTERN_CAPACITY: u64 = 256;

/// Accepts JSON strings.
pub struct StringKind {
    patterns: moka::sync::Cache<String, Regex>,
    compiled: AtomicU64,
}

impl StringKind {
    /// Creates the kind with the default pattern cache capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_pattern_capacity(DEFAULT_PATTERN_CAPACITY)
    }

    /// Creates the kind keeping at most `capacity` compiled patterns.
    #[must_use]
    pub fn with_pattern_capacity(capacity: u64) -> Self {
        Self {
            patterns: moka::sync::Cache::builder().max_capacity(capacity).build(),
            compiled: AtomicU64::new(0),
        }
    }

    /// Number of regex compilations performed so far.
    pub fn compiled_patterns(&self) -> u64 {
        self.compiled.load(Ordering::Relaxed)
    }

    fn pattern(&self, source: &str, key: &str) -> Result<Regex, ValidationError> {
        self.patterns
            .try_get_with(source.to_owned(), || {
                self.compiled.fetch_add(1, Ordering::Relaxed);
                Regex::new(source)
            })
            .map_err(|_: Arc<regex::Error>| {
                ValidationError::invalid_option(key.to_owned(), "pattern", "a valid regex")
            })
    }
}

impl Default for StringKind {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StringKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringKind")
            .field("cached_patterns", &self.patterns.entry_count())
            .field("compiled", &self.compiled_patterns())
            .finish()
    }
}

#[derive(Debug)]
struct Rules<'a> {
    length: LengthRules,
    pattern: Option<Regex>,
    allowed: Option<&'a [Value]>,
    trim: bool,
    lowercase: bool,
    uppercase: bool,
}

impl<'a> Rules<'a> {
    fn from_options(
        kind: &StringKind,
        options: &'a Options,
        key: &str,
    ) -> Result<Self, ValidationError> {
        let pattern = options
            .str_opt("pattern", key)?
            .map(|source| kind.pattern(source, key))
            .transpose()?;

        Ok(Self {
            length: LengthRules::from_options(options, key)?,
            pattern,
            allowed: options.array_opt("enum", key)?,
            trim: options.flag("trim", key)?,
            lowercase: options.flag("lowercase", key)?,
            uppercase: options.flag("uppercase", key)?,
        })
    }

    fn normalize(&self, text: &str) -> String {
        let text = if self.trim { text.trim() } else { text };
        if self.uppercase {
            text.to_uppercase()
        } else if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_owned()
        }
    }

    fn check(&self, text: &str, key: &str) -> Result<(), ValidationError> {
        self.length.check(text.chars().count(), key)?;

        if let Some(pattern) = &self.pattern
            && !pattern.is_match(text)
        {
            return Err(ValidationError::constraint(
                key.to_owned(),
                "pattern",
                format!("String does not match pattern {}", pattern.as_str()),
            )
            .with_param("pattern", pattern.as_str().to_owned()));
        }

        if let Some(allowed) = self.allowed
            && !allowed.iter().any(|item| item.as_str() == Some(text))
        {
            return Err(ValidationError::constraint(
                key.to_owned(),
                "enum",
                format!("String must be one of {}", Value::Array(allowed.to_vec())),
            ));
        }
        Ok(())
    }
}

impl Kind for StringKind {
    fn check_options(&self, options: &Options) -> Result<(), ValidationError> {
        Rules::from_options(self, options, "").map(drop)
    }

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
        match data {
            Some(Value::String(text)) => {
                let rules = Rules::from_options(self, options, key)?;
                let text = rules.normalize(text);
                rules.check(&text, key)?;
                Ok(Outcome::Accepted(Value::String(text)))
            }
            other => Err(ValidationError::type_mismatch(
                key.to_owned(),
                "String",
                type_name(other),
            )),
        }
    }
}
