use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::identifier::{make_fqn, Relation};
use super::Oid;
use crate::error::PredataError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Table,
    ForeignTable,
    View,
    Sequence,
    Function,
    Type,
    Domain,
    Schema,
    Database,
    Tablespace,
    Language,
    Constraint,
    Column,
    ForeignDataWrapper,
    ForeignServer,
    Protocol,
}

impl ObjectType {
    /// Type keyword used in GRANT and REVOKE. Views, sequences and foreign
    /// tables are granted on without one.
    pub fn privilege_keyword(&self) -> Option<String> {
        match self {
            ObjectType::View | ObjectType::Sequence | ObjectType::ForeignTable => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectType::Table => write!(f, "TABLE"),
            ObjectType::ForeignTable => write!(f, "FOREIGN TABLE"),
            ObjectType::View => write!(f, "VIEW"),
            ObjectType::Sequence => write!(f, "SEQUENCE"),
            ObjectType::Function => write!(f, "FUNCTION"),
            ObjectType::Type => write!(f, "TYPE"),
            ObjectType::Domain => write!(f, "DOMAIN"),
            ObjectType::Schema => write!(f, "SCHEMA"),
            ObjectType::Database => write!(f, "DATABASE"),
            ObjectType::Tablespace => write!(f, "TABLESPACE"),
            ObjectType::Language => write!(f, "LANGUAGE"),
            ObjectType::Constraint => write!(f, "CONSTRAINT"),
            ObjectType::Column => write!(f, "COLUMN"),
            ObjectType::ForeignDataWrapper => write!(f, "FOREIGN DATA WRAPPER"),
            ObjectType::ForeignServer => write!(f, "FOREIGN SERVER"),
            ObjectType::Protocol => write!(f, "PROTOCOL"),
        }
    }
}

impl FromStr for ObjectType {
    type Err = PredataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['_', '-'], " ");
        let object_type = match normalized.as_str() {
            "TABLE" => ObjectType::Table,
            "FOREIGN TABLE" => ObjectType::ForeignTable,
            "VIEW" => ObjectType::View,
            "SEQUENCE" => ObjectType::Sequence,
            "FUNCTION" => ObjectType::Function,
            "TYPE" => ObjectType::Type,
            "DOMAIN" => ObjectType::Domain,
            "SCHEMA" => ObjectType::Schema,
            "DATABASE" => ObjectType::Database,
            "TABLESPACE" => ObjectType::Tablespace,
            "LANGUAGE" => ObjectType::Language,
            "CONSTRAINT" => ObjectType::Constraint,
            "COLUMN" => ObjectType::Column,
            "FOREIGN DATA WRAPPER" => ObjectType::ForeignDataWrapper,
            "FOREIGN SERVER" => ObjectType::ForeignServer,
            "PROTOCOL" => ObjectType::Protocol,
            _ => {
                return Err(PredataError::UnsupportedVariant {
                    kind: "object type".to_string(),
                    name: s.to_string(),
                })
            }
        };
        Ok(object_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Function {
    pub oid: Oid,
    pub schema: String,
    pub name: String,
    pub body: String,
    /// Full argument list used in CREATE FUNCTION.
    pub arguments: String,
    /// Identity arguments used when referring to the function.
    pub ident_args: String,
    pub result_type: String,
    pub language: String,
}

impl Function {
    pub fn fqn(&self) -> String {
        make_fqn(&self.schema, &self.name)
    }

    /// `schema.name(identity args)`, the name COMMENT and GRANT refer to.
    pub fn signature(&self) -> String {
        format!("{}({})", self.fqn(), self.ident_args)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseType {
    pub input: String,
    pub output: String,
    pub receive: String,
    pub send: String,
    pub internal_length: Option<i32>,
    pub alignment: String,
    pub storage: String,
    pub default_val: String,
    pub element: String,
    pub delimiter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompositeAttribute {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl CompositeAttribute {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainType {
    pub base_type: String,
    pub default_val: String,
    pub collation: String,
    pub not_null: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeKind {
    Base(BaseType),
    Composite { attributes: Vec<CompositeAttribute> },
    Domain(DomainType),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Type {
    pub oid: Oid,
    pub schema: String,
    pub name: String,
    pub kind: TypeKind,
}

impl Type {
    pub fn fqn(&self) -> String {
        make_fqn(&self.schema, &self.name)
    }

    pub fn object_type(&self) -> ObjectType {
        match self.kind {
            TypeKind::Domain(_) => ObjectType::Domain,
            TypeKind::Base(_) | TypeKind::Composite { .. } => ObjectType::Type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConstraintType {
    #[serde(rename = "u")]
    Unique,
    #[serde(rename = "p")]
    PrimaryKey,
    #[serde(rename = "f")]
    ForeignKey,
    #[default]
    #[serde(rename = "c")]
    Check,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraint {
    pub oid: Oid,
    pub name: String,
    pub con_type: ConstraintType,
    /// Rendered clause, e.g. `UNIQUE (i)`.
    pub con_def: String,
    /// Rendered name of the owning table or domain.
    pub owning_object: String,
    pub is_domain_constraint: bool,
    pub is_partition_parent: bool,
}

impl Constraint {
    pub fn is_foreign_key(&self) -> bool {
        self.con_type == ConstraintType::ForeignKey
    }
}

/// The closed set of objects that share one dependency order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sortable {
    Function(Function),
    Type(Type),
    Table(Relation),
}

impl Sortable {
    pub fn oid(&self) -> Oid {
        match self {
            Sortable::Function(function) => function.oid,
            Sortable::Type(type_) => type_.oid,
            Sortable::Table(relation) => relation.oid,
        }
    }

    pub fn fqn(&self) -> String {
        match self {
            Sortable::Function(function) => function.fqn(),
            Sortable::Type(type_) => type_.fqn(),
            Sortable::Table(relation) => relation.fqn(),
        }
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            Sortable::Function(_) => ObjectType::Function,
            Sortable::Type(type_) => type_.object_type(),
            Sortable::Table(_) => ObjectType::Table,
        }
    }
}

impl From<Function> for Sortable {
    fn from(function: Function) -> Self {
        Sortable::Function(function)
    }
}

impl From<Type> for Sortable {
    fn from(type_: Type) -> Self {
        Sortable::Type(type_)
    }
}

impl From<Relation> for Sortable {
    fn from(relation: Relation) -> Self {
        Sortable::Table(relation)
    }
}
