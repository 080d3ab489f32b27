use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::Oid;
use crate::error::{PredataError, Result};

static SAFE_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("identifier pattern is valid"));

/// Quote an identifier unless it only contains `[A-Za-z0-9_]`.
///
/// Embedded double quotes are doubled inside the quoted form.
pub fn quote_ident(name: &str) -> String {
    if is_safe_identifier(name) {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

fn is_safe_identifier(name: &str) -> bool {
    SAFE_IDENTIFIER.is_match(name)
}

/// Inverse of [`quote_ident`].
pub fn unquote_ident(input: &str) -> Result<String> {
    let invalid = || PredataError::InvalidIdentifier {
        input: input.to_string(),
    };

    if let Some(rest) = input.strip_prefix('"') {
        let inner = rest.strip_suffix('"').ok_or_else(invalid)?;
        let mut name = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '"' {
                // a lone quote would have ended the identifier early
                if chars.next() != Some('"') {
                    return Err(invalid());
                }
            }
            name.push(c);
        }
        if name.is_empty() {
            return Err(invalid());
        }
        Ok(name)
    } else if is_safe_identifier(input) {
        Ok(input.to_string())
    } else {
        Err(invalid())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Schema {
    pub oid: Oid,
    pub name: String,
}

impl Schema {
    pub fn new(oid: Oid, name: impl Into<String>) -> Self {
        Self {
            oid,
            name: name.into(),
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&quote_ident(&self.name))
    }
}

impl FromStr for Schema {
    type Err = PredataError;

    /// Parsed schemas carry no OID.
    fn from_str(s: &str) -> Result<Self> {
        Ok(Schema::new(0, unquote_ident(s)?))
    }
}

/// Minimal identity of a relation: enough to name and order it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Relation {
    pub schema_oid: Oid,
    pub oid: Oid,
    pub schema: String,
    pub name: String,
}

impl Relation {
    pub fn new(schema_oid: Oid, oid: Oid, schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema_oid,
            oid,
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Schema-qualified, quoted name.
    pub fn fqn(&self) -> String {
        make_fqn(&self.schema, &self.name)
    }
}

pub(crate) fn make_fqn(schema: &str, name: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(name))
}

/// Schemas owning at least one of `relations`, ordered by name.
pub fn get_unique_schemas(schemas: &[Schema], relations: &[Relation]) -> Vec<Schema> {
    let owning: HashSet<Oid> = relations.iter().map(|rel| rel.schema_oid).collect();

    let mut unique: Vec<Schema> = schemas
        .iter()
        .filter(|schema| owning.contains(&schema.oid))
        .cloned()
        .collect();
    unique.sort_by(|a, b| a.name.cmp(&b.name));
    unique
}
