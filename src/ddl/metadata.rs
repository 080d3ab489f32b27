//! COMMENT, OWNER, privilege and security label statements for named objects.

use std::fmt;

use super::writer::{Spacing, SqlWriter};
use crate::catalog::{privileges_for, quote_ident, Acl, ObjectMetadata, ObjectType};
use crate::error::Result;

/// Quote a string literal, doubling embedded single quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Emit the metadata blocks for one object with the usual spacing.
pub fn print_object_metadata<W: fmt::Write>(
    writer: &mut SqlWriter<W>,
    metadata: &ObjectMetadata,
    name: &str,
    object_type: ObjectType,
) -> Result<()> {
    print_object_metadata_with(writer, metadata, name, object_type, Spacing::Double)
}

/// Emit comment, owner, privileges and security label in that order, each
/// as its own block. Absent parts produce no output.
pub fn print_object_metadata_with<W: fmt::Write>(
    writer: &mut SqlWriter<W>,
    metadata: &ObjectMetadata,
    name: &str,
    object_type: ObjectType,
    spacing: Spacing,
) -> Result<()> {
    if !metadata.comment.is_empty() {
        writer.block(
            spacing,
            &format!("COMMENT ON {} {} IS {};", object_type, name, quote_literal(&metadata.comment)),
        )?;
    }

    if !metadata.owner.is_empty() {
        writer.block(
            spacing,
            &format!("ALTER {} {} OWNER TO {};", object_type, name, quote_ident(&metadata.owner)),
        )?;
    }

    if !metadata.privileges.is_empty() {
        let target = privilege_target(object_type, name);
        writer.block(
            spacing,
            &privilege_statements(&target, "", object_type, &metadata.owner, &metadata.privileges),
        )?;
    }

    if metadata.has_security_label() {
        writer.block(
            spacing,
            &security_label_statement(
                &metadata.security_label_provider,
                &format!("{} {}", object_type, name),
                &metadata.security_label,
            ),
        )?;
    }

    Ok(())
}

/// Comment for a constraint, which is addressed through its owner.
pub fn print_constraint_comment<W: fmt::Write>(
    writer: &mut SqlWriter<W>,
    metadata: &ObjectMetadata,
    constraint_name: &str,
    owning_object: &str,
) -> Result<()> {
    if metadata.comment.is_empty() {
        return Ok(());
    }
    writer.block(
        Spacing::Double,
        &format!(
            "COMMENT ON CONSTRAINT {} ON {} IS {};",
            constraint_name,
            owning_object,
            quote_literal(&metadata.comment)
        ),
    )
}

/// Object clause of GRANT and REVOKE: `TABLE public.t`, or the bare name for
/// types that take no keyword.
pub fn privilege_target(object_type: ObjectType, name: &str) -> String {
    match object_type.privilege_keyword() {
        Some(keyword) => format!("{} {}", keyword, name),
        None => name.to_string(),
    }
}

/// REVOKE/GRANT lines for one object, newline separated.
///
/// `columns` is empty for whole objects and ` (col)` for column grants; the
/// privilege set that counts as ALL comes from `all_set`.
pub fn privilege_statements(
    target: &str,
    columns: &str,
    all_set: ObjectType,
    owner: &str,
    privileges: &[Acl],
) -> String {
    let mut lines = vec![format!("REVOKE ALL{} ON {} FROM PUBLIC;", columns, target)];

    if !owner.is_empty() {
        let owner_sql = quote_ident(owner);
        let owner_reduced = privileges
            .iter()
            .any(|acl| !acl.is_public() && acl.grantee_sql() == owner_sql && !acl.holds_all(all_set));
        if owner_reduced {
            lines.push(format!("REVOKE ALL{} ON {} FROM {};", columns, target, owner_sql));
        }
    }

    lines.extend(
        privileges
            .iter()
            .filter_map(|acl| grant_statement(acl, target, columns, all_set)),
    );
    lines.join("\n")
}

fn grant_statement(acl: &Acl, target: &str, columns: &str, all_set: ObjectType) -> Option<String> {
    let applicable = privileges_for(all_set);
    let held: Vec<_> = acl
        .held_privileges()
        .into_iter()
        .filter(|privilege| applicable.contains(privilege))
        .collect();
    if held.is_empty() {
        return None;
    }

    let keywords = if acl.holds_all(all_set) {
        "ALL".to_string()
    } else {
        held.iter().map(|p| p.keyword()).collect::<Vec<_>>().join(",")
    };
    let with_grant_option = held.iter().all(|p| acl.flags(*p).with_grant_option);

    Some(format!(
        "GRANT {}{} ON {} TO {}{};",
        keywords,
        columns,
        target,
        acl.grantee_sql(),
        if with_grant_option { " WITH GRANT OPTION" } else { "" }
    ))
}

pub fn security_label_statement(provider: &str, object: &str, label: &str) -> String {
    format!(
        "SECURITY LABEL FOR {} ON {} IS {};",
        provider,
        object,
        quote_literal(label)
    )
}
