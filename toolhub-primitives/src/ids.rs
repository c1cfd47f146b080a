//! Provider and action identifier types.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

const SEPARATOR: char = ':';

/// Identifier of a registered action provider.
///
/// Derived from the provider name unless explicitly overridden, so rebuilding
/// a registry from the same providers always yields the same identifiers.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    /// Creates an identifier from an explicit value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProviderId`] when the value is empty, contains
    /// whitespace, or contains the `:` separator reserved for action ids.
    pub fn new(id: impl Into<String>) -> Result<Self, Error> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::InvalidProviderId {
                id,
                reason: "provider id cannot be empty".into(),
            });
        }
        if id.chars().any(char::is_whitespace) {
            return Err(Error::InvalidProviderId {
                id,
                reason: "provider id cannot contain whitespace".into(),
            });
        }
        if id.contains(SEPARATOR) {
            return Err(Error::InvalidProviderId {
                id,
                reason: format!("provider id cannot contain `{SEPARATOR}`"),
            });
        }
        Ok(Self(id))
    }

    /// Derives the identifier from a provider display name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProviderId`] when the name contains no
    /// alphanumeric characters.
    pub fn from_name(name: &str) -> Result<Self, Error> {
        Self::new(slugify(name))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProviderId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Globally unique identifier of an action, `"{provider}:{action}"`.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    /// Derives the identifier for an action owned by `provider`.
    ///
    /// This is a pure function of its inputs: the same provider id and action
    /// name always produce the same identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidActionId`] when the action name is blank.
    pub fn derive(provider: &ProviderId, action_name: &str) -> Result<Self, Error> {
        let action_name = action_name.trim();
        if action_name.is_empty() {
            return Err(Error::InvalidActionId {
                id: format!("{provider}{SEPARATOR}"),
                reason: "action name cannot be empty".into(),
            });
        }
        Ok(Self(format!("{provider}{SEPARATOR}{action_name}")))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the provider portion of the identifier.
    #[must_use]
    pub fn provider_part(&self) -> &str {
        self.0
            .split_once(SEPARATOR)
            .map_or(self.0.as_str(), |(provider, _)| provider)
    }

    /// Returns the action portion of the identifier.
    #[must_use]
    pub fn action_part(&self) -> &str {
        self.0
            .split_once(SEPARATOR)
            .map_or(self.0.as_str(), |(_, action)| action)
    }
}

impl Display for ActionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ActionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((provider, action)) = s.split_once(SEPARATOR) else {
            return Err(Error::InvalidActionId {
                id: s.to_owned(),
                reason: format!("missing `{SEPARATOR}` separator"),
            });
        };
        let provider = ProviderId::new(provider).map_err(|err| Error::InvalidActionId {
            id: s.to_owned(),
            reason: err.to_string(),
        })?;
        Self::derive(&provider, action)
    }
}

/// Lower-cases `input` and collapses every run of non-alphanumeric characters
/// into a single `-`, trimming leading and trailing separators.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
