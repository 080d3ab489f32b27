use std::fs;

use indoc::indoc;
use predata::{
    dependency_graph, render_predata, CatalogFacts, CatalogSnapshot, PredataError, RenderOptions,
    SqlWriter,
};
use tempfile::tempdir;

const SNAPSHOT: &str = r#"{
    "schemas": [
        {"oid": 2200, "name": "public"},
        {"oid": 16384, "name": "sales"},
        {"oid": 16385, "name": "archive"}
    ],
    "relations": [{"schema_oid": 16384, "oid": 100, "schema": "sales", "name": "orders"}],
    "columns": {
        "100": [
            {"num": 2, "name": "amount", "type": "sales.money"},
            {"num": 1, "name": "id", "type": "integer", "not_null": true}
        ]
    },
    "distribution_policies": {"100": "DISTRIBUTED BY (id)"},
    "altered_schemas": {
        "100": [{"old_schema": "sales", "new_schema": "archive", "name": "orders_1_prt_2019"}]
    },
    "metadata": {
        "16384": {"owner": "admin"},
        "100": {"owner": "admin", "privileges": ["admin=arwdDxt/admin", "reader=r/admin"]},
        "200": {"comment": "Money amounts"}
    },
    "constraints": [
        {"oid": 300, "name": "orders_pkey", "con_type": "p", "con_def": "PRIMARY KEY (id)", "owning_object": "sales.orders"},
        {"oid": 301, "name": "positive", "con_type": "c", "con_def": "CHECK (VALUE > 0)", "owning_object": "sales.money", "is_domain_constraint": true}
    ],
    "objects": [
        {"kind": "type", "oid": 200, "schema": "sales", "name": "money", "type": "d", "base_type": "numeric"},
        {"kind": "table", "schema_oid": 16384, "oid": 100, "schema": "sales", "name": "orders"}
    ]
}"#;

fn load_facts() -> CatalogFacts {
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    fs::write(&path, SNAPSHOT).unwrap();
    CatalogSnapshot::load(&path).unwrap().into_facts().unwrap()
}

#[test]
fn test_full_pipeline_from_snapshot_file() {
    let facts = load_facts();
    let mut writer = SqlWriter::default();
    let summary = render_predata(&facts, &mut writer, &RenderOptions::default()).unwrap();

    let expected = indoc! {"


        CREATE SCHEMA archive;

        CREATE SCHEMA sales;

        ALTER SCHEMA sales OWNER TO admin;


        CREATE DOMAIN sales.money AS numeric
        \tCONSTRAINT positive CHECK (VALUE > 0);


        COMMENT ON DOMAIN sales.money IS 'Money amounts';


        CREATE TABLE sales.orders (
        \tid integer NOT NULL,
        \tamount sales.money
        ) DISTRIBUTED BY (id);


        ALTER TABLE sales.orders OWNER TO admin;


        REVOKE ALL ON TABLE sales.orders FROM PUBLIC;
        GRANT ALL ON TABLE sales.orders TO admin;
        GRANT SELECT ON TABLE sales.orders TO reader;


        ALTER TABLE sales.orders_1_prt_2019 SET SCHEMA archive;


        ALTER TABLE ONLY sales.orders ADD CONSTRAINT orders_pkey PRIMARY KEY (id);
    "};
    assert_eq!(writer.as_str(), expected);

    assert_eq!(summary.schemas, 2);
    assert_eq!(summary.types, 1);
    assert_eq!(summary.tables, 1);
    assert_eq!(summary.constraints, 1);
    assert_eq!(summary.blocks, 10);
}

#[test]
fn test_out_of_order_sequence_is_rejected_before_output() {
    let mut facts = load_facts();
    facts.objects.reverse();

    let mut writer = SqlWriter::default();
    let err = render_predata(&facts, &mut writer, &RenderOptions::default()).unwrap_err();
    match err {
        PredataError::DependencyOrder { object, dependency } => {
            assert_eq!(object, "sales.orders");
            assert_eq!(dependency, "sales.money");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(writer.as_str().is_empty());

    let options = RenderOptions {
        validate_order: false,
        ..Default::default()
    };
    render_predata(&facts, &mut writer, &options).unwrap();
    let output = writer.as_str();
    assert!(output.find("CREATE TABLE").unwrap() < output.find("CREATE DOMAIN").unwrap());
}

#[test]
fn test_dependency_graph_export() {
    let graph = dependency_graph(&load_facts());
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);

    let dot = graph.to_graphviz();
    assert!(dot.starts_with("digraph dependency_graph {"));
    assert!(dot.contains("\"0::sales.money\" -> \"1::sales.orders\" [style=solid];"));
}

#[test]
fn test_unreadable_snapshot() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    fs::write(&path, "{\"objects\": [{\"kind\": \"view\"}]}").unwrap();

    let err = CatalogSnapshot::load(&path).unwrap_err();
    assert!(matches!(err, PredataError::SnapshotLoad { .. }));

    let err = CatalogSnapshot::load(dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, PredataError::FileRead { .. }));
}
