//! Library-level tests for lineage construction and graph views.

use lineage_graph::config::LineageConfig;
use lineage_graph::graph::{field_rows, find_cycles, GraphModel, GraphView};
use lineage_graph::lineage::{build_graph, LineageBuilder, RecordLocation, Severity};
use lineage_graph::reader::{builder_for, MappingReader};
use lineage_graph::record::MappingRecord;

fn build_csv(csv: &str) -> (GraphModel, lineage_graph::lineage::BuildReport) {
    let config = LineageConfig::default();
    let mut builder = builder_for(&config);
    let mut reader = MappingReader::new(csv.as_bytes(), &config).unwrap();
    reader.read_into(&mut builder).unwrap();
    builder.finish()
}

#[test]
fn test_every_table_appears_once() {
    let (model, _) = build_csv(
        "target_table,target_field,source_table,source_field\n\
         B,f1,A,f1\n\
         C,f2,B,f1\n\
         A,f0,C,f2\n\
         C,f3,\"A, B\",f1\n",
    );

    let ids: Vec<&str> = model.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["B", "A", "C"]);
}

#[test]
fn test_field_lists_stay_aligned() {
    let (model, _) = build_csv(
        "target_table,target_field,source_table,source_field\n\
         T1,a,S1,x\n\
         T1,,S1,y\n\
         T1,c,,\n\
         S1,x,RAW,x_raw\n\
         S1,,,\n",
    );

    for node in &model.nodes {
        assert_eq!(node.columns.len(), node.columns_source.len(), "{}", node.id);
    }

    let t1 = model.node("T1").unwrap();
    assert_eq!(t1.columns, vec!["a", "", "c"]);
    assert_eq!(t1.columns_source, vec!["x", "y", ""]);

    // x was a placeholder from T1's mappings and is now mapped from RAW
    let s1 = model.node("S1").unwrap();
    assert_eq!(s1.columns, vec!["x", "y"]);
    assert_eq!(s1.columns_source, vec!["x_raw", ""]);
}

#[test]
fn test_edges_merge_per_pair() {
    let (model, _) = build_csv(
        "target_table,target_field,source_table,source_field\n\
         T1,a,S1,x\n\
         T2,b,S1,x\n\
         T1,c,S1,x\n\
         T1,d,S1,\n",
    );

    assert_eq!(model.edges.len(), 2);
    assert_eq!(model.edges[0].source, "S1");
    assert_eq!(model.edges[0].target, "T1");
    assert_eq!(model.edges[0].columns, vec!["x", "x"]);
    assert_eq!(model.edges[1].columns, vec!["x"]);
}

#[test]
fn test_layers_fixed_when_table_is_created() {
    let records = vec![
        MappingRecord::new("T2").target_field("b").source("T1", "a"),
        MappingRecord::new("T1").target_field("a").layer("silver"),
        MappingRecord::new("U").target_field("u"),
        MappingRecord::new("U").target_field("v").layer("gold").sub_layer("late"),
        MappingRecord::new("V").target_field("v").layer("bronze"),
        MappingRecord::new("V").target_field("w").layer("gold").sub_layer("core"),
    ];
    let (model, _) = build_graph(&records);

    // T1 was created from a source reference
    let t1 = model.node("T1").unwrap();
    assert_eq!(t1.layer, None);
    assert_eq!(t1.sub_layer, None);

    let u = model.node("U").unwrap();
    assert_eq!(u.layer, None);
    assert_eq!(u.sub_layer, None);

    let v = model.node("V").unwrap();
    assert_eq!(v.layer.as_deref(), Some("bronze"));
    assert_eq!(v.sub_layer, None);
}

#[test]
fn test_builder_reports_locations() {
    let mut builder = LineageBuilder::new();
    let location = RecordLocation {
        file: Some("finance.csv".to_string()),
        line: Some(7),
    };
    builder.push(&MappingRecord::default(), &location);
    builder.push(
        &MappingRecord::new("T1").source(" , ", "x").target_field("a"),
        &RecordLocation::line(8),
    );

    let (model, report) = builder.finish();
    assert_eq!(report.records_read, 2);
    assert_eq!(report.records_skipped, 1);
    assert_eq!(report.warning_count, 1);
    assert_eq!(report.diagnostics[0].severity, Severity::Error);
    assert!(report.diagnostics[0].to_string().starts_with("ERROR [finance.csv:7]"));
    assert_eq!(report.diagnostics[1].severity, Severity::Warning);
    assert!(report.diagnostics[1].to_string().starts_with("WARNING [line 8]"));
    assert_eq!(model.nodes.len(), 1);
}

#[test]
fn test_identical_input_identical_json() {
    let csv = "target_table,target_field,source_table,source_field,layer\n\
               T1,a,\"S2, S1\",x,gold\n\
               T2,b,T1,a,\n";

    let (first, _) = build_csv(csv);
    let (second, _) = build_csv(csv);

    assert_eq!(first.to_json_pretty().unwrap(), second.to_json_pretty().unwrap());
    assert_eq!(first.fingerprint().unwrap(), second.fingerprint().unwrap());
}

#[test]
fn test_model_roundtrip_through_json() {
    let (model, _) = build_csv(
        "target_table,target_field,source_table,source_field\nT1,a,S1,x\n",
    );
    let parsed: GraphModel = serde_json::from_str(&model.to_json_pretty().unwrap()).unwrap();
    assert_eq!(parsed, model);
}

#[test]
fn test_view_over_built_model() {
    let (model, _) = build_csv(
        "target_table,target_field,source_table,source_field,layer,sub_layer\n\
         stg,a,raw,a,silver,staging\n\
         mart,a,stg,a,gold,marts\n\
         raw,a,mart,a,bronze,landing\n",
    );

    let view = GraphView::from_model(&model);
    // raw was first referenced as a source, so its own row sets no layer
    assert_eq!(model.node("raw").unwrap().layer, None);
    assert_eq!(view.layers(), vec!["gold", "silver"]);
    assert_eq!(view.sub_layers(), vec!["marts", "staging"]);

    let cycles = find_cycles(&view);
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].tables, vec!["stg", "raw", "mart"]);

    let mut focused = GraphView::from_model(&model);
    focused.focus_table("unknown", true, true, None);
    assert!(focused.is_empty());

    let rows = field_rows(model.node("stg").unwrap());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].field, "a");
    assert_eq!(rows[0].source_field, "a");
}
