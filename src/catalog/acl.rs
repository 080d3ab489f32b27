//! Privilege grants parsed from catalog `aclitem` text.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::identifier::quote_ident;
use super::objects::ObjectType;
use super::FactMap;
use crate::error::{PredataError, Result};

/// `grantee=privileges/grantor`, where a quoted grantee may contain `=` and `/`.
static ACL_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?P<grantee>"(?:[^"]|"")*"|[^"=]*)=(?P<privileges>[A-Za-z*]*)/(?P<grantor>.*)$"#)
        .expect("ACL item pattern is valid")
});

const GRANT_OPTION_MARKER: char = '*';

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Privilege {
    Select,
    Insert,
    Update,
    Delete,
    Truncate,
    References,
    Trigger,
    Execute,
    Usage,
    Create,
    Temporary,
    Connect,
}

impl Privilege {
    /// Canonical rendering order.
    pub const ALL: [Privilege; 12] = [
        Privilege::Select,
        Privilege::Insert,
        Privilege::Update,
        Privilege::Delete,
        Privilege::Truncate,
        Privilege::References,
        Privilege::Trigger,
        Privilege::Execute,
        Privilege::Usage,
        Privilege::Create,
        Privilege::Temporary,
        Privilege::Connect,
    ];

    pub fn from_acl_char(c: char) -> Option<Self> {
        match c {
            'r' => Some(Privilege::Select),
            'a' => Some(Privilege::Insert),
            'w' => Some(Privilege::Update),
            'd' => Some(Privilege::Delete),
            'D' => Some(Privilege::Truncate),
            'x' => Some(Privilege::References),
            't' => Some(Privilege::Trigger),
            'X' => Some(Privilege::Execute),
            'U' => Some(Privilege::Usage),
            'C' => Some(Privilege::Create),
            'T' => Some(Privilege::Temporary),
            'c' => Some(Privilege::Connect),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Privilege::Select => "SELECT",
            Privilege::Insert => "INSERT",
            Privilege::Update => "UPDATE",
            Privilege::Delete => "DELETE",
            Privilege::Truncate => "TRUNCATE",
            Privilege::References => "REFERENCES",
            Privilege::Trigger => "TRIGGER",
            Privilege::Execute => "EXECUTE",
            Privilege::Usage => "USAGE",
            Privilege::Create => "CREATE",
            Privilege::Temporary => "TEMPORARY",
            Privilege::Connect => "CONNECT",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// The privileges that make up `ALL` for an object type.
pub fn privileges_for(object_type: ObjectType) -> &'static [Privilege] {
    use Privilege::*;

    match object_type {
        ObjectType::Table | ObjectType::View | ObjectType::ForeignTable => {
            &[Select, Insert, Update, Delete, Truncate, References, Trigger]
        }
        ObjectType::Sequence => &[Select, Update, Usage],
        ObjectType::Function => &[Execute],
        ObjectType::Schema => &[Usage, Create],
        ObjectType::Database => &[Create, Temporary, Connect],
        ObjectType::Tablespace => &[Create],
        ObjectType::Type
        | ObjectType::Domain
        | ObjectType::Language
        | ObjectType::ForeignDataWrapper
        | ObjectType::ForeignServer => &[Usage],
        ObjectType::Protocol => &[Select, Insert],
        ObjectType::Column => &[Select, Insert, Update, References],
        ObjectType::Constraint => &Privilege::ALL,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivilegeFlags {
    pub granted: bool,
    pub with_grant_option: bool,
}

impl PrivilegeFlags {
    /// A grant-option flag implies the privilege itself.
    pub fn held(&self) -> bool {
        self.granted || self.with_grant_option
    }
}

/// One grantee's privileges on one object. An empty grantee is PUBLIC.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acl {
    pub grantee: String,
    flags: [PrivilegeFlags; 12],
}

impl Acl {
    pub fn new(grantee: impl Into<String>) -> Self {
        Self {
            grantee: grantee.into(),
            flags: Default::default(),
        }
    }

    pub fn public() -> Self {
        Self::new("")
    }

    pub fn with(mut self, privilege: Privilege) -> Self {
        self.grant(privilege);
        self
    }

    pub fn with_grant_option(mut self, privilege: Privilege) -> Self {
        self.grant_with_option(privilege);
        self
    }

    pub fn grant(&mut self, privilege: Privilege) {
        self.flags[privilege.index()].granted = true;
    }

    pub fn grant_with_option(&mut self, privilege: Privilege) {
        self.flags[privilege.index()].with_grant_option = true;
    }

    pub fn revoke(&mut self, privilege: Privilege) {
        self.flags[privilege.index()] = PrivilegeFlags::default();
    }

    pub fn flags(&self, privilege: Privilege) -> PrivilegeFlags {
        self.flags[privilege.index()]
    }

    pub fn holds(&self, privilege: Privilege) -> bool {
        self.flags(privilege).held()
    }

    /// Held privileges in canonical order.
    pub fn held_privileges(&self) -> Vec<Privilege> {
        Privilege::ALL.into_iter().filter(|p| self.holds(*p)).collect()
    }

    pub fn holds_all(&self, object_type: ObjectType) -> bool {
        privileges_for(object_type).iter().all(|p| self.holds(*p))
    }

    /// True when every held privilege carries the grant option.
    pub fn all_with_grant_option(&self) -> bool {
        let held = self.held_privileges();
        !held.is_empty() && held.iter().all(|p| self.flags(*p).with_grant_option)
    }

    pub fn is_public(&self) -> bool {
        self.grantee.is_empty()
    }

    /// Grantee as it appears in GRANT/REVOKE statements.
    pub fn grantee_sql(&self) -> String {
        if self.is_public() {
            "PUBLIC".to_string()
        } else {
            quote_ident(&self.grantee)
        }
    }
}

/// Parse one `aclitem` string. An empty string means default privileges and
/// yields `None`.
pub fn parse_acl(acl: &str) -> Result<Option<Acl>> {
    if acl.is_empty() {
        return Ok(None);
    }

    let captures = ACL_ITEM.captures(acl).ok_or_else(|| PredataError::InvalidAcl {
        input: acl.to_string(),
        message: "expected grantee=privileges/grantor".to_string(),
    })?;

    let grantee = parse_grantee(&captures["grantee"]).ok_or_else(|| PredataError::InvalidAcl {
        input: acl.to_string(),
        message: "malformed quoted grantee".to_string(),
    })?;

    let mut result = Acl::new(grantee);
    let mut chars = captures["privileges"].chars().peekable();
    while let Some(c) = chars.next() {
        let Some(privilege) = Privilege::from_acl_char(c) else {
            continue;
        };
        if chars.peek() == Some(&GRANT_OPTION_MARKER) {
            chars.next();
            result.grant_with_option(privilege);
        } else {
            result.grant(privilege);
        }
    }

    Ok(Some(result))
}

fn parse_grantee(raw: &str) -> Option<String> {
    match raw.strip_prefix('"') {
        Some(rest) => {
            let inner = rest.strip_suffix('"')?;
            if inner.is_empty() {
                return None;
            }
            Some(inner.replace("\"\"", "\""))
        }
        None => Some(raw.to_string()),
    }
}

/// Complete metadata bundle for one object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectMetadata {
    pub owner: String,
    pub comment: String,
    pub privileges: Vec<Acl>,
    pub security_label_provider: String,
    pub security_label: String,
}

impl ObjectMetadata {
    pub fn is_empty(&self) -> bool {
        self.owner.is_empty()
            && self.comment.is_empty()
            && self.privileges.is_empty()
            && !self.has_security_label()
    }

    pub fn has_security_label(&self) -> bool {
        !self.security_label_provider.is_empty() && !self.security_label.is_empty()
    }

    /// Only the comment; constraints are neither owned nor privileged.
    pub fn comment_only(&self) -> Self {
        Self {
            comment: self.comment.clone(),
            ..Self::default()
        }
    }
}

pub type MetadataMap = FactMap<ObjectMetadata>;
