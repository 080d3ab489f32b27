mod common;

use common::{
    default_acl_for_type, default_acl_for_type_with_grant, default_metadata_map, render_to_string,
};
use indoc::indoc;
use predata::catalog::{get_unique_schemas, Acl, MetadataMap, ObjectMetadata, ObjectType, Privilege, Relation, Schema};
use predata::ddl::{print_create_schema_statements, print_object_metadata};

fn has_all_privileges() -> Acl {
    default_acl_for_type("anothertestrole", ObjectType::Table)
}

fn has_most_privileges() -> Acl {
    let mut acl = default_acl_for_type("testrole", ObjectType::Table);
    acl.revoke(Privilege::Trigger);
    acl
}

fn has_single_privilege() -> Acl {
    Acl::public().with(Privilege::Trigger)
}

fn privileges() -> Vec<Acl> {
    vec![has_all_privileges(), has_most_privileges(), has_single_privilege()]
}

fn render(metadata: &ObjectMetadata) -> String {
    render_to_string(|writer| print_object_metadata(writer, metadata, "public.tablename", ObjectType::Table))
}

#[test]
fn test_table_comment() {
    let metadata = ObjectMetadata {
        comment: "This is a table comment.".to_string(),
        ..Default::default()
    };
    assert_eq!(
        render(&metadata),
        "\n\nCOMMENT ON TABLE public.tablename IS 'This is a table comment.';\n"
    );
}

#[test]
fn test_table_owner() {
    let metadata = ObjectMetadata {
        owner: "testrole".to_string(),
        ..Default::default()
    };
    assert_eq!(render(&metadata), "\n\nALTER TABLE public.tablename OWNER TO testrole;\n");
}

#[test]
fn test_revoke_and_grant_block() {
    let metadata = ObjectMetadata {
        privileges: privileges(),
        ..Default::default()
    };
    let expected = indoc! {"


        REVOKE ALL ON TABLE public.tablename FROM PUBLIC;
        GRANT ALL ON TABLE public.tablename TO anothertestrole;
        GRANT SELECT,INSERT,UPDATE,DELETE,TRUNCATE,REFERENCES ON TABLE public.tablename TO testrole;
        GRANT TRIGGER ON TABLE public.tablename TO PUBLIC;
    "};
    assert_eq!(render(&metadata), expected);
}

#[test]
fn test_revoke_and_grant_block_with_grant_option() {
    let mut most = default_acl_for_type_with_grant("testrole", ObjectType::Table);
    most.revoke(Privilege::Trigger);
    let metadata = ObjectMetadata {
        privileges: vec![
            default_acl_for_type_with_grant("anothertestrole", ObjectType::Table),
            most,
            Acl::public().with_grant_option(Privilege::Trigger),
        ],
        ..Default::default()
    };
    let expected = indoc! {"


        REVOKE ALL ON TABLE public.tablename FROM PUBLIC;
        GRANT ALL ON TABLE public.tablename TO anothertestrole WITH GRANT OPTION;
        GRANT SELECT,INSERT,UPDATE,DELETE,TRUNCATE,REFERENCES ON TABLE public.tablename TO testrole WITH GRANT OPTION;
        GRANT TRIGGER ON TABLE public.tablename TO PUBLIC WITH GRANT OPTION;
    "};
    assert_eq!(render(&metadata), expected);
}

#[test]
fn test_mixed_grant_options() {
    let mut most = default_acl_for_type_with_grant("testrole", ObjectType::Table);
    most.revoke(Privilege::Trigger);
    let metadata = ObjectMetadata {
        privileges: vec![has_all_privileges(), most],
        ..Default::default()
    };
    let expected = indoc! {"


        REVOKE ALL ON TABLE public.tablename FROM PUBLIC;
        GRANT ALL ON TABLE public.tablename TO anothertestrole;
        GRANT SELECT,INSERT,UPDATE,DELETE,TRUNCATE,REFERENCES ON TABLE public.tablename TO testrole WITH GRANT OPTION;
    "};
    assert_eq!(render(&metadata), expected);
}

#[test]
fn test_owner_with_reduced_privileges_is_revoked() {
    let metadata = ObjectMetadata {
        privileges: privileges(),
        owner: "testrole".to_string(),
        comment: "This is a table comment.".to_string(),
        ..Default::default()
    };
    let expected = indoc! {"


        COMMENT ON TABLE public.tablename IS 'This is a table comment.';


        ALTER TABLE public.tablename OWNER TO testrole;


        REVOKE ALL ON TABLE public.tablename FROM PUBLIC;
        REVOKE ALL ON TABLE public.tablename FROM testrole;
        GRANT ALL ON TABLE public.tablename TO anothertestrole;
        GRANT SELECT,INSERT,UPDATE,DELETE,TRUNCATE,REFERENCES ON TABLE public.tablename TO testrole;
        GRANT TRIGGER ON TABLE public.tablename TO PUBLIC;
    "};
    assert_eq!(render(&metadata), expected);
}

#[test]
fn test_comment_and_privileges_without_owner() {
    let metadata = ObjectMetadata {
        privileges: privileges(),
        comment: "This is a table comment.".to_string(),
        ..Default::default()
    };
    let output = render(&metadata);
    assert!(output.starts_with("\n\nCOMMENT ON TABLE public.tablename IS 'This is a table comment.';\n\n\nREVOKE ALL"));
    assert!(!output.contains("FROM testrole"));
}

#[test]
fn test_basic_schema() {
    let output = render_to_string(|writer| {
        print_create_schema_statements(writer, &[Schema::new(0, "schemaname")], &MetadataMap::new())
    });
    assert_eq!(output, "\n\nCREATE SCHEMA schemaname;");
}

#[test]
fn test_schema_with_privileges_owner_and_comment() {
    let metadata = default_metadata_map(ObjectType::Schema, true, true, true);
    let output = render_to_string(|writer| {
        print_create_schema_statements(writer, &[Schema::new(1, "schemaname")], &metadata)
    });
    let expected = indoc! {"


        CREATE SCHEMA schemaname;

        COMMENT ON SCHEMA schemaname IS 'This is a schema comment.';


        ALTER SCHEMA schemaname OWNER TO testrole;


        REVOKE ALL ON SCHEMA schemaname FROM PUBLIC;
        GRANT ALL ON SCHEMA schemaname TO testrole;
    "};
    assert_eq!(output, expected);
}

#[test]
fn test_unique_schemas_follow_relations() {
    let schema_other = Schema::new(2, "otherschema");
    let schema_public = Schema::new(1, "public");
    let schemas = vec![schema_other.clone(), schema_public.clone()];

    let in_public = vec![Relation::new(1, 0, "public", "foo"), Relation::new(1, 0, "public", "bar")];
    assert_eq!(get_unique_schemas(&schemas, &in_public), vec![schema_public.clone()]);

    let mut both = in_public;
    both.push(Relation::new(2, 0, "otherschema", "foo"));
    assert_eq!(get_unique_schemas(&schemas, &both), vec![schema_other, schema_public]);

    assert!(get_unique_schemas(&schemas, &[]).is_empty());
}
