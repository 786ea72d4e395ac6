use cxnet_core::{
    Engine, ValidateOptions, VisualPropertyName as N, VisualPropertyValue as V, export_to_cx2, validate,
};
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
}

fn list_fixture_cx2_files(root: &Path) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = std::fs::read_dir(root)
        .map(|entries| {
            entries
                .flatten()
                .map(|e| e.path())
                .filter(|p| p.extension().is_some_and(|e| e == "cx2"))
                .collect()
        })
        .unwrap_or_default();
    out.sort();
    out
}

fn read_json(path: &Path) -> Value {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("invalid JSON {}: {e}", path.display()))
}

fn load(name: &str) -> Value {
    read_json(&fixtures_root().join(name))
}

/// What a golden file pins down: error kinds and paths (warnings are free to change), whether
/// the import goes through, and the resulting element counts.
fn summarize(engine: &Engine, doc: &Value) -> Value {
    let report = engine.validate_value(doc);
    let errors: Vec<Value> = report
        .errors
        .iter()
        .map(|e| json!({"kind": e.kind, "path": e.path}))
        .collect();

    let mut out = Map::new();
    out.insert("isValid".into(), json!(report.is_valid));
    out.insert("errors".into(), Value::Array(errors));
    match engine.import_value(doc) {
        Ok(imported) => {
            out.insert("imported".into(), json!(true));
            out.insert("nodes".into(), json!(imported.bundle.network.node_count()));
            out.insert("edges".into(), json!(imported.bundle.network.edge_count()));
        }
        Err(_) => {
            out.insert("imported".into(), json!(false));
        }
    }
    Value::Object(out)
}

#[test]
fn fixtures_match_golden_summaries() {
    let fixtures = list_fixture_cx2_files(&fixtures_root());
    assert!(
        !fixtures.is_empty(),
        "no fixtures found under {}",
        fixtures_root().display()
    );

    let engine = Engine::new();
    for path in fixtures {
        let summary = summarize(&engine, &read_json(&path));
        let golden = read_json(&path.with_extension("golden.json"));
        assert_eq!(summary, golden, "summary mismatch for {}", path.display());
    }
}

#[test]
fn importable_fixtures_export_strictly_valid_documents() {
    let engine = Engine::new();
    for path in list_fixture_cx2_files(&fixtures_root()) {
        let Ok(imported) = engine.import_value(&read_json(&path)) else {
            continue;
        };
        let exported = export_to_cx2(&imported.bundle);
        let report = validate(&exported, &ValidateOptions::strict());
        // Suspect cells are exported as-is, so only their attribute errors may remain.
        let blocking: Vec<_> = report
            .errors
            .iter()
            .filter(|e| e.path.first().map(String::as_str) != Some("nodes"))
            .collect();
        assert!(blocking.is_empty(), "{}: {blocking:?}", path.display());
    }
}

#[test]
fn styled_fixture_resolves_expected_values() {
    let bundle = Engine::new().import_value(&load("styled.cx2")).unwrap().bundle;
    let view = &bundle.view;
    let node = |id: &str, name: N| view.node_value(id, name).cloned();
    let edge = |id: &str, name: N| view.edge_value(id, name).cloned();

    assert_eq!(node("1", N::NodeLabel), Some(V::string("EGFR")));
    assert_eq!(node("1", N::NodeBackgroundColor), Some(V::string("#56B4E9")));
    assert_eq!(node("3", N::NodeBackgroundColor), Some(V::string("#F0E442")));
    assert_eq!(node("4", N::NodeBackgroundColor), Some(V::string("#CC79A7")));

    assert_eq!(node("1", N::NodeWidth), Some(V::Number(30.0)));
    assert_eq!(node("2", N::NodeWidth), Some(V::Number(60.0)));
    // nodeSizeLocked ties height to width.
    assert_eq!(node("2", N::NodeHeight), Some(V::Number(60.0)));
    assert_eq!(node("2", N::NodeBorderWidth), Some(V::Number(4.0)));
    assert_eq!(node("1", N::NodeBorderWidth), Some(V::Number(1.0)));
    assert_eq!(node("4", N::NodeShape), Some(V::string("ellipse")));

    assert_eq!(edge("e12", N::EdgeLineColor), Some(V::string("#D55E00")));
    assert_eq!(edge("e12", N::EdgeSourceArrowColor), Some(V::string("#D55E00")));
    assert_eq!(edge("e10", N::EdgeTargetArrowColor), Some(V::string("#999999")));
    assert_eq!(edge("e10", N::EdgeWidth), Some(V::Number(2.0)));

    assert_eq!(
        view.values.get(&N::NetworkBackgroundColor),
        Some(&V::string("#FAFAFA"))
    );
    assert_eq!(bundle.network_attributes.name(), Some("signalling"));
    assert_eq!(view.node_views["4"].y, 20.0);
}

#[test]
fn styled_fixture_survives_a_round_trip() {
    let engine = Engine::new();
    let first = engine.import_value(&load("styled.cx2")).unwrap().bundle;
    let second = engine
        .import_value(&engine.export(&first))
        .unwrap()
        .bundle;

    assert_eq!(first.node_table.rows, second.node_table.rows);
    assert_eq!(first.edge_table.rows, second.edge_table.rows);
    assert_eq!(first.visual_style, second.visual_style);
    for (id, view) in &first.view.node_views {
        assert_eq!(view, &second.view.node_views[id]);
    }
    for (id, view) in &first.view.edge_views {
        assert_eq!(view, &second.view.edge_views[id]);
    }
}
