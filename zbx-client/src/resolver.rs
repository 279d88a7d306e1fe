//! Name-to-id resolution for host groups and templates
//!
//! Many API calls want numeric ids where people think in names. `resolve`
//! turns a mixed list of names and ids into ids:
//!
//! - an all-digit token is taken to be an id already and passed through
//!   without a network call
//! - anything else is looked up with a `<kind>.get` filtered on the exact
//!   name, and the first match's id is used
//! - a name with no match fails the whole batch with `Error::NotFound`
//!
//! Output order follows input order and duplicates are kept.
//!
//! # Known Ambiguities
//!
//! A group literally named "42" cannot be resolved by name; "42" is always
//! read as an id. When a name filter returns several records the first one
//! wins and a warning is logged.

use crate::client::{InvokeOptions, ZabbixClient};
use serde_json::{Map, Value};
use std::fmt;
use zbx_core::{Error, Result};

/// What kind of object a name refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolveKind {
    /// Host group, looked up by `name`
    Group,
    /// Template, looked up by technical `host` name
    Template,
}

impl ResolveKind {
    /// API method used for the lookup
    pub fn method(&self) -> &'static str {
        match self {
            ResolveKind::Group => "hostgroup.get",
            ResolveKind::Template => "template.get",
        }
    }

    /// Field holding the record id
    pub fn id_field(&self) -> &'static str {
        match self {
            ResolveKind::Group => "groupid",
            ResolveKind::Template => "templateid",
        }
    }

    /// Field the name filter applies to
    pub fn name_field(&self) -> &'static str {
        match self {
            ResolveKind::Group => "name",
            ResolveKind::Template => "host",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ResolveKind::Group => "group",
            ResolveKind::Template => "template",
        }
    }
}

impl fmt::Display for ResolveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// True for a non-empty string of ASCII digits
pub fn is_numeric_id(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

impl ZabbixClient {
    /// Resolve names and ids of `kind` into ids, preserving order
    ///
    /// # Errors
    ///
    /// `Error::NotFound` for the first name without a match; no partial
    /// result is returned. Errors from the lookup calls propagate unchanged.
    pub async fn resolve<S: AsRef<str>>(&self, kind: ResolveKind, tokens: &[S]) -> Result<Vec<String>> {
        let mut ids = Vec::with_capacity(tokens.len());
        for token in tokens {
            let token = token.as_ref();
            if is_numeric_id(token) {
                self.record_resolution(kind, "passthrough");
                ids.push(token.to_string());
                continue;
            }
            ids.push(self.lookup_id(kind, token).await?);
        }
        Ok(ids)
    }

    /// Resolve host group names or ids
    pub async fn resolve_groups<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Vec<String>> {
        self.resolve(ResolveKind::Group, tokens).await
    }

    /// Resolve template names or ids
    pub async fn resolve_templates<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Vec<String>> {
        self.resolve(ResolveKind::Template, tokens).await
    }

    async fn lookup_id(&self, kind: ResolveKind, name: &str) -> Result<String> {
        let mut filter = Map::new();
        filter.insert(
            kind.name_field().to_string(),
            Value::Array(vec![Value::String(name.to_string())]),
        );
        let params = serde_json::json!({
            "output": [kind.id_field(), kind.name_field()],
            "filter": filter,
        });

        let result = self.invoke(kind.method(), params, InvokeOptions::strict()).await?;
        let records = result.as_array().ok_or_else(|| {
            Error::InvalidResponse(format!("{} did not return a list", kind.method()))
        })?;

        let Some(first) = records.first() else {
            self.record_resolution(kind, "not_found");
            tracing::debug!(%kind, name, "No match");
            return Err(Error::NotFound {
                kind: kind.to_string(),
                token: name.to_string(),
            });
        };

        if records.len() > 1 {
            tracing::warn!(%kind, name, matches = records.len(), "Name is ambiguous, using first match");
        }

        let id = match first.get(kind.id_field()) {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => {
                return Err(Error::InvalidResponse(format!(
                    "{} record without {}",
                    kind.method(),
                    kind.id_field()
                )))
            }
        };

        self.record_resolution(kind, "resolved");
        tracing::debug!(%kind, name, id = %id, "Resolved");
        Ok(id)
    }

    fn record_resolution(&self, kind: ResolveKind, outcome: &str) {
        if let Some(ref m) = self.metrics {
            m.record_resolution(kind.label(), outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_id() {
        assert!(is_numeric_id("10"));
        assert!(is_numeric_id("0"));
        assert!(is_numeric_id("00123"));
        assert!(!is_numeric_id(""));
        assert!(!is_numeric_id("Linux servers"));
        assert!(!is_numeric_id("12a"));
        assert!(!is_numeric_id("-5"));
        assert!(!is_numeric_id(" 10"));
        assert!(!is_numeric_id("١٢")); // non-ASCII digits
    }

    #[test]
    fn test_kind_lookup_fields() {
        assert_eq!(ResolveKind::Group.method(), "hostgroup.get");
        assert_eq!(ResolveKind::Group.id_field(), "groupid");
        assert_eq!(ResolveKind::Group.name_field(), "name");
        assert_eq!(ResolveKind::Template.method(), "template.get");
        assert_eq!(ResolveKind::Template.id_field(), "templateid");
        assert_eq!(ResolveKind::Template.name_field(), "host");
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ResolveKind::Group.to_string(), "group");
        assert_eq!(ResolveKind::Template.to_string(), "template");
    }
}
