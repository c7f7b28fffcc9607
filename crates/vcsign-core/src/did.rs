use std::fmt;

use crate::error::CoreError;

/// Return the controller DID of a key identifier (everything before `#`).
///
/// `did:web:example.com#key-1` → `did:web:example.com`. Identifiers without a
/// fragment are returned unchanged.
pub fn get_controller(key_id: &str) -> &str {
    key_id.split('#').next().unwrap_or(key_id)
}

/// A parsed DID URL: `did:<method>:<method-specific-id>[#fragment]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DidUrl {
    method: String,
    method_specific_id: String,
    fragment: Option<String>,
}

impl DidUrl {
    /// Parse a DID or DID URL.
    ///
    /// The method must be non-empty lowercase alphanumeric and the
    /// method-specific id must be non-empty. Paths and queries are not
    /// supported.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let rest = input
            .strip_prefix("did:")
            .ok_or_else(|| CoreError::InvalidDid(format!("missing did: scheme in {input:?}")))?;

        let (did_part, fragment) = match rest.split_once('#') {
            Some((d, f)) => (d, Some(f)),
            None => (rest, None),
        };

        let (method, msid) = did_part
            .split_once(':')
            .ok_or_else(|| CoreError::InvalidDid(format!("missing method in {input:?}")))?;

        if method.is_empty()
            || !method
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(CoreError::InvalidDid(format!(
                "invalid method {method:?} in {input:?}"
            )));
        }
        if msid.is_empty() {
            return Err(CoreError::InvalidDid(format!(
                "empty method-specific id in {input:?}"
            )));
        }
        if msid.contains(['/', '?']) {
            return Err(CoreError::InvalidDid(format!(
                "paths and queries are not supported: {input:?}"
            )));
        }
        if let Some(f) = fragment {
            if f.is_empty() {
                return Err(CoreError::InvalidDid(format!("empty fragment in {input:?}")));
            }
        }

        Ok(Self {
            method: method.to_string(),
            method_specific_id: msid.to_string(),
            fragment: fragment.map(str::to_string),
        })
    }

    /// Whether `input` looks like a DID URL (starts with the `did:` scheme).
    pub fn is_did(input: &str) -> bool {
        input.starts_with("did:")
    }

    /// The DID method name (e.g. `key`, `web`).
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn method_specific_id(&self) -> &str {
        &self.method_specific_id
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// The DID without fragment, i.e. the controller.
    pub fn did(&self) -> String {
        format!("did:{}:{}", self.method, self.method_specific_id)
    }
}

impl fmt::Display for DidUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "did:{}:{}", self.method, self.method_specific_id)?;
        if let Some(ref frag) = self.fragment {
            write!(f, "#{frag}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for DidUrl {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
