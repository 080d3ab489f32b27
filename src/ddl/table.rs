//! CREATE TABLE for regular, external and foreign tables, plus the
//! follow-up statements that cannot be expressed inside it.

use std::fmt;

use tracing::debug;

use super::metadata::{
    print_object_metadata, privilege_statements, privilege_target, quote_literal,
    security_label_statement,
};
use super::writer::{Spacing, SqlWriter};
use crate::catalog::{
    ColumnDefinition, ExternalTableDefinition, ForeignTableDefinition, ObjectMetadata, ObjectType,
    Table,
};
use crate::error::Result;

/// Emit the table, its metadata and its post-create statements.
pub fn print_create_table_statement<W: fmt::Write>(
    writer: &mut SqlWriter<W>,
    table: &Table,
    metadata: &ObjectMetadata,
) -> Result<()> {
    let fqn = table.fqn();
    debug!(table = %fqn, "Writing table");

    let statement = match (&table.def.ext_table_def, &table.def.foreign_def) {
        (Some(external), _) => external_table_statement(table, external),
        (None, Some(foreign)) => foreign_table_statement(table, foreign),
        (None, None) => regular_table_statement(table),
    };
    writer.block(Spacing::Double, &statement)?;
    if !table.def.part_template_def.is_empty() {
        writer.block(Spacing::Double, &format!("{};", table.def.part_template_def.trim()))?;
    }

    print_object_metadata(writer, metadata, &fqn, table.object_type())?;
    print_post_create_table_statements(writer, table, metadata)
}

fn regular_table_statement(table: &Table) -> String {
    let def = &table.def;
    let unlogged = if def.is_unlogged { "UNLOGGED " } else { "" };
    let mut statement = format!("CREATE {}TABLE {} ", unlogged, table.fqn());

    if def.table_type.is_empty() {
        statement.push_str(&column_list(&def.column_defs));
    } else {
        statement.push_str(&format!("OF {}", def.table_type));
    }
    if !def.inherits.is_empty() {
        statement.push_str(&format!(" INHERITS ({})", def.inherits.join(", ")));
    }
    if !def.storage_opts.is_empty() {
        statement.push_str(&format!(" WITH ({})", def.storage_opts));
    }
    if !def.tablespace.is_empty() {
        statement.push_str(&format!(" TABLESPACE {}", def.tablespace));
    }
    if !def.dist_policy.is_empty() {
        statement.push_str(&format!(" {}", def.dist_policy));
    }
    if !def.part_def.is_empty() {
        statement.push_str(&format!(" {}", def.part_def.trim()));
    }
    statement.push(';');
    statement
}

fn external_table_statement(table: &Table, external: &ExternalTableDefinition) -> String {
    let direction = if external.writable { "WRITABLE" } else { "READABLE" };
    let web = if external.web { " WEB" } else { "" };
    let mut statement = format!(
        "CREATE {} EXTERNAL{} TABLE {} {} ",
        direction,
        web,
        table.fqn(),
        column_list(&table.def.column_defs)
    );

    if !external.command.is_empty() {
        statement.push_str(&format!("EXECUTE {}", quote_literal(&external.command)));
        statement.push_str(external.on_clause());
    } else if !external.locations.is_empty() {
        let locations: Vec<String> = external.locations.iter().map(|l| quote_literal(l)).collect();
        statement.push_str(&format!("LOCATION (\n\t{}\n)", locations.join(",\n\t")));
        if external.exec_location == "MASTER_ONLY" {
            statement.push_str(" ON MASTER");
        }
    }

    statement.push_str(&format!("\nFORMAT '{}'", external.format_keyword()));
    if !external.format_opts.is_empty() {
        statement.push_str(&format!(" ({})", external.format_opts));
    }
    if !external.encoding.is_empty() {
        statement.push_str(&format!("\nENCODING {}", quote_literal(&external.encoding)));
    }

    if external.writable {
        if !table.def.dist_policy.is_empty() {
            statement.push_str(&format!("\n{}", table.def.dist_policy));
        }
    } else {
        if external.log_errors {
            statement.push_str("\nLOG ERRORS");
        }
        if let Some(limit) = external.reject_limit {
            let unit = if external.reject_limit_percent { "PERCENT" } else { "ROWS" };
            statement.push_str(&format!("\nSEGMENT REJECT LIMIT {} {}", limit, unit));
        }
    }
    statement.push(';');
    statement
}

fn foreign_table_statement(table: &Table, foreign: &ForeignTableDefinition) -> String {
    let mut statement = format!(
        "CREATE FOREIGN TABLE {} {} SERVER {}",
        table.fqn(),
        column_list(&table.def.column_defs),
        foreign.server
    );
    if !foreign.options.is_empty() {
        statement.push_str(&format!(" OPTIONS ({})", foreign.options));
    }
    statement.push(';');
    statement
}

/// `(\n\tcol,\n\tcol\n)`; no columns renders `(\n)`.
fn column_list(columns: &[ColumnDefinition]) -> String {
    let mut list = String::from("(\n");
    let lines: Vec<String> = columns.iter().map(|column| format!("\t{}", column_text(column))).collect();
    if !lines.is_empty() {
        list.push_str(&lines.join(",\n"));
        list.push('\n');
    }
    list.push(')');
    list
}

pub fn column_text(column: &ColumnDefinition) -> String {
    let mut text = format!("{} {}", column.name, column.type_name);
    if !column.fdw_options.is_empty() {
        text.push_str(&format!(" OPTIONS ({})", column.fdw_options));
    }
    if !column.collation.is_empty() {
        text.push_str(&format!(" COLLATE {}", column.collation));
    }
    if column.has_default && !column.default_val.is_empty() {
        text.push_str(&format!(" DEFAULT {}", column.default_val));
    }
    if column.not_null {
        text.push_str(" NOT NULL");
    }
    if !column.encoding.is_empty() {
        text.push_str(&format!(" ENCODING ({})", column.encoding));
    }
    text
}

/// Statements that must follow CREATE TABLE, each written as its own block.
pub fn print_post_create_table_statements<W: fmt::Write>(
    writer: &mut SqlWriter<W>,
    table: &Table,
    metadata: &ObjectMetadata,
) -> Result<()> {
    for statement in post_create_statements(table, metadata) {
        writer.block(Spacing::Double, &statement)?;
    }
    Ok(())
}

fn post_create_statements(table: &Table, metadata: &ObjectMetadata) -> Vec<String> {
    let fqn = table.fqn();
    let object_type = table.object_type();
    let alter_only = format!("ALTER {} ONLY {}", object_type, fqn);
    let columns = &table.def.column_defs;
    let mut statements = Vec::new();

    for column in columns {
        if let Some(target) = column.stat_target.filter(|target| *target >= 0) {
            statements.push(format!(
                "{} ALTER COLUMN {} SET STATISTICS {};",
                alter_only, column.name, target
            ));
        }
        if let Some(storage) = column.storage_type {
            statements.push(format!(
                "{} ALTER COLUMN {} SET STORAGE {};",
                alter_only, column.name, storage
            ));
        }
        if !column.options.is_empty() {
            statements.push(format!(
                "{} ALTER COLUMN {} SET ({});",
                alter_only, column.name, column.options
            ));
        }
    }

    if object_type == ObjectType::Table && !table.def.is_external() {
        if let Some(clause) = table.def.replica_identity.and_then(|identity| identity.clause()) {
            statements.push(format!("ALTER TABLE {} REPLICA IDENTITY {};", fqn, clause));
        }
    }

    for column in columns.iter().filter(|column| !column.comment.is_empty()) {
        statements.push(format!(
            "COMMENT ON COLUMN {}.{} IS {};",
            fqn,
            column.name,
            quote_literal(&column.comment)
        ));
    }

    for column in columns.iter().filter(|column| column.has_security_label()) {
        statements.push(security_label_statement(
            &column.security_label_provider,
            &format!("COLUMN {}.{}", fqn, column.name),
            &column.security_label,
        ));
    }

    let target = privilege_target(object_type, &fqn);
    for column in columns.iter().filter(|column| !column.privileges.is_empty()) {
        statements.push(privilege_statements(
            &target,
            &format!(" ({})", column.name),
            ObjectType::Column,
            &metadata.owner,
            &column.privileges,
        ));
    }

    for altered in &table.def.partition_altered_schemas {
        statements.push(format!(
            "ALTER TABLE {}.{} SET SCHEMA {};",
            altered.old_schema, altered.name, altered.new_schema
        ));
    }

    statements
}

impl ExternalTableDefinition {
    /// FORMAT keyword; single-letter catalog codes are expanded.
    pub fn format_keyword(&self) -> &str {
        match self.format_type.as_str() {
            "a" => "avro",
            "b" => "custom",
            "c" => "csv",
            "p" => "parquet",
            "t" | "" => "text",
            other => other,
        }
    }

    /// Segment placement suffix for an EXECUTE clause.
    fn on_clause(&self) -> &str {
        let (kind, _) = self
            .exec_location
            .split_once(':')
            .unwrap_or((self.exec_location.as_str(), ""));
        match kind {
            "MASTER_ONLY" => " ON MASTER",
            "PER_HOST" => " ON HOST",
            _ => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        Acl, AlteredPartitionRelation, Privilege, Relation, ReplicaIdentity, StorageType,
        TableDefinition,
    };
    use indoc::indoc;

    fn table(def: TableDefinition) -> Table {
        Table::new(Relation::new(2200, 10, "public", "tablename"), def)
    }

    fn render(table: &Table, metadata: &ObjectMetadata) -> String {
        let mut writer = SqlWriter::default();
        print_create_table_statement(&mut writer, table, metadata).unwrap();
        writer.into_inner()
    }

    fn column(num: i32, name: &str, type_name: &str) -> ColumnDefinition {
        ColumnDefinition::new(10, num, name, type_name)
    }

    #[test]
    fn test_empty_table() {
        let table = table(TableDefinition {
            dist_policy: "DISTRIBUTED RANDOMLY".to_string(),
            ..Default::default()
        });
        assert_eq!(
            render(&table, &ObjectMetadata::default()),
            "\n\nCREATE TABLE public.tablename (\n) DISTRIBUTED RANDOMLY;\n"
        );
    }

    #[test]
    fn test_table_with_every_clause() {
        let mut i = column(1, "i", "integer");
        i.not_null = true;
        i.has_default = true;
        i.default_val = "42".to_string();
        i.encoding = "compresstype=zlib".to_string();
        let mut t = column(2, "t", "text");
        t.collation = "public.\"C\"".to_string();

        let table = table(TableDefinition {
            dist_policy: "DISTRIBUTED BY (i)".to_string(),
            column_defs: vec![i, t],
            is_unlogged: true,
            inherits: vec!["public.parent".to_string()],
            storage_opts: "appendonly=true".to_string(),
            tablespace: "fast".to_string(),
            ..Default::default()
        });

        let expected = indoc! {"


            CREATE UNLOGGED TABLE public.tablename (
            \ti integer DEFAULT 42 NOT NULL ENCODING (compresstype=zlib),
            \tt text COLLATE public.\"C\"
            ) INHERITS (public.parent) WITH (appendonly=true) TABLESPACE fast DISTRIBUTED BY (i);
        "};
        assert_eq!(render(&table, &ObjectMetadata::default()), expected);
    }

    #[test]
    fn test_typed_and_partitioned_table() {
        let typed = table(TableDefinition {
            table_type: "public.some_type".to_string(),
            dist_policy: "DISTRIBUTED RANDOMLY".to_string(),
            ..Default::default()
        });
        assert_eq!(
            render(&typed, &ObjectMetadata::default()),
            "\n\nCREATE TABLE public.tablename OF public.some_type DISTRIBUTED RANDOMLY;\n"
        );

        let partitioned = table(TableDefinition {
            dist_policy: "DISTRIBUTED RANDOMLY".to_string(),
            column_defs: vec![column(1, "region", "text")],
            part_def: "PARTITION BY LIST(region) \n(PARTITION usa VALUES('usa'))".to_string(),
            part_template_def: "ALTER TABLE public.tablename SET SUBPARTITION TEMPLATE (SUBPARTITION a VALUES('a'))"
                .to_string(),
            ..Default::default()
        });
        let output = render(&partitioned, &ObjectMetadata::default());
        assert!(output.contains(
            ") DISTRIBUTED RANDOMLY PARTITION BY LIST(region) \n(PARTITION usa VALUES('usa'));\n"
        ));
        assert!(output.ends_with(
            "\n\nALTER TABLE public.tablename SET SUBPARTITION TEMPLATE (SUBPARTITION a VALUES('a'));\n"
        ));
    }

    #[test]
    fn test_external_tables() {
        let readable = table(TableDefinition {
            column_defs: vec![column(1, "i", "integer")],
            ext_table_def: Some(ExternalTableDefinition {
                oid: 10,
                locations: vec!["file://host/a.txt".to_string(), "file://host/b.txt".to_string()],
                format_type: "t".to_string(),
                format_opts: "delimiter '|'".to_string(),
                encoding: "UTF8".to_string(),
                log_errors: true,
                reject_limit: Some(10),
                ..Default::default()
            }),
            ..Default::default()
        });
        let expected = indoc! {"


            CREATE READABLE EXTERNAL TABLE public.tablename (
            \ti integer
            ) LOCATION (
            \t'file://host/a.txt',
            \t'file://host/b.txt'
            )
            FORMAT 'text' (delimiter '|')
            ENCODING 'UTF8'
            LOG ERRORS
            SEGMENT REJECT LIMIT 10 ROWS;
        "};
        assert_eq!(render(&readable, &ObjectMetadata::default()), expected);
        assert!(readable.skip_data_backup());

        let writable_web = table(TableDefinition {
            dist_policy: "DISTRIBUTED RANDOMLY".to_string(),
            ext_table_def: Some(ExternalTableDefinition {
                oid: 10,
                writable: true,
                web: true,
                command: "cat > /tmp/out's".to_string(),
                exec_location: "MASTER_ONLY".to_string(),
                format_type: "c".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert_eq!(
            render(&writable_web, &ObjectMetadata::default()),
            "\n\nCREATE WRITABLE EXTERNAL WEB TABLE public.tablename (\n) EXECUTE 'cat > /tmp/out''s' ON MASTER\n\
             FORMAT 'csv'\nDISTRIBUTED RANDOMLY;\n"
        );
    }

    #[test]
    fn test_foreign_table_uses_foreign_metadata_type() {
        let mut i = column(1, "i", "integer");
        i.fdw_options = "column_name 'id'".to_string();
        let foreign = table(TableDefinition {
            column_defs: vec![i],
            foreign_def: Some(ForeignTableDefinition {
                oid: 10,
                options: "delimiter ','".to_string(),
                server: "sc".to_string(),
            }),
            ..Default::default()
        });
        let metadata = ObjectMetadata {
            owner: "testrole".to_string(),
            privileges: vec![Acl::new("reader").with(Privilege::Select)],
            ..Default::default()
        };

        let expected = indoc! {"


            CREATE FOREIGN TABLE public.tablename (
            \ti integer OPTIONS (column_name 'id')
            ) SERVER sc OPTIONS (delimiter ',');


            ALTER FOREIGN TABLE public.tablename OWNER TO testrole;


            REVOKE ALL ON public.tablename FROM PUBLIC;
            GRANT SELECT ON public.tablename TO reader;
        "};
        assert_eq!(render(&foreign, &metadata), expected);
    }

    #[test]
    fn test_post_create_statements_order() {
        let mut i = column(1, "i", "integer");
        i.storage_type = Some(StorageType::External);
        i.comment = "It's a column".to_string();
        i.security_label_provider = "dummy".to_string();
        i.security_label = "classified".to_string();
        i.privileges = vec![Acl::new("testrole").with(Privilege::Select)];
        let mut j = column(2, "j", "text");
        j.stat_target = Some(100);

        let table = table(TableDefinition {
            dist_policy: "DISTRIBUTED RANDOMLY".to_string(),
            column_defs: vec![i, j],
            replica_identity: Some(ReplicaIdentity::Full),
            partition_altered_schemas: vec![AlteredPartitionRelation {
                old_schema: "public".to_string(),
                new_schema: "archive".to_string(),
                name: "tablename_1_prt_old".to_string(),
            }],
            ..Default::default()
        });
        let metadata = ObjectMetadata {
            owner: "testrole".to_string(),
            ..Default::default()
        };

        let expected = indoc! {"


            CREATE TABLE public.tablename (
            \ti integer,
            \tj text
            ) DISTRIBUTED RANDOMLY;


            ALTER TABLE public.tablename OWNER TO testrole;


            ALTER TABLE ONLY public.tablename ALTER COLUMN i SET STORAGE EXTERNAL;


            ALTER TABLE ONLY public.tablename ALTER COLUMN j SET STATISTICS 100;


            ALTER TABLE public.tablename REPLICA IDENTITY FULL;


            COMMENT ON COLUMN public.tablename.i IS 'It''s a column';


            SECURITY LABEL FOR dummy ON COLUMN public.tablename.i IS 'classified';


            REVOKE ALL (i) ON TABLE public.tablename FROM PUBLIC;
            REVOKE ALL (i) ON TABLE public.tablename FROM testrole;
            GRANT SELECT (i) ON TABLE public.tablename TO testrole;


            ALTER TABLE public.tablename_1_prt_old SET SCHEMA archive;
        "};
        assert_eq!(render(&table, &metadata), expected);
    }

    #[test]
    fn test_replica_identity_default_and_index_emit_nothing() {
        for identity in [ReplicaIdentity::Default, ReplicaIdentity::Index] {
            let table = table(TableDefinition {
                replica_identity: Some(identity),
                ..Default::default()
            });
            assert!(!render(&table, &ObjectMetadata::default()).contains("REPLICA IDENTITY"));
        }
    }
}
