use crate::mapping::{ContinuousMapping, ControlPoint, DiscreteMapping};
use crate::validate::IssueKind;
use crate::value::MapKey;
use crate::*;
use indexmap::IndexMap;
use serde_json::json;

#[test]
fn minimal_network_imports_two_nodes_and_one_edge() {
    let doc = json!([
        {"CXVersion": "2.0"},
        {"nodes": [{"id": 1}, {"id": 2}]},
        {"edges": [{"id": 10, "s": 1, "t": 2}]},
        {"status": [{"success": true}]},
    ]);
    let report = validate(&doc, &ValidateOptions::default());
    assert!(report.is_valid);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);

    let imported = import_cx2(&doc, &ValidateOptions::default()).unwrap();
    let network = &imported.bundle.network;
    assert_eq!(network.node_count(), 2);
    assert_eq!(network.edge_count(), 1);
    assert_eq!(network.edges()[0].id, "e10");
    // Generated ids are UUIDs shared by every model.
    assert!(uuid::Uuid::parse_str(&network.id).is_ok());
    assert_eq!(imported.bundle.view.id, network.id);
    assert_eq!(imported.bundle.node_table.network_id, network.id);
}

#[test]
fn bypass_on_missing_node_is_a_reference_error() {
    let doc = json!([
        {"CXVersion": "2.0"},
        {"nodes": [{"id": 1}, {"id": 2}]},
        {"nodeBypasses": [{"id": 3, "v": {"NODE_WIDTH": 100}}]},
        {"status": [{"success": true}]},
    ]);
    let report = validate(&doc, &ValidateOptions::default());
    assert!(!report.is_valid);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].kind, IssueKind::Reference);
    assert_eq!(report.errors[0].path, vec!["nodeBypasses", "index 0"]);

    assert!(matches!(
        import_cx2(&doc, &ValidateOptions::default()),
        Err(Error::InvalidDocument { .. })
    ));
}

#[test]
fn discrete_mapping_falls_back_to_its_default() {
    let mut vp_value_map = IndexMap::new();
    vp_value_map.insert(MapKey::String("gene".into()), VisualPropertyValue::string("#FF0000"));
    vp_value_map.insert(MapKey::String("protein".into()), VisualPropertyValue::string("#00FF00"));
    let mut style = VisualStyle::default();
    style.set_mapping(
        VisualPropertyName::NodeBackgroundColor,
        MappingFunction::Discrete(DiscreteMapping {
            attribute: "type".into(),
            attribute_type: None,
            vp_value_map,
            default_value: VisualPropertyValue::string("#CCCCCC"),
        }),
    );

    let mut table = Table::new("net");
    table.set_value("1", "type", AttributeValue::String("rna".into()));
    table.set_value("2", "type", AttributeValue::String("protein".into()));
    let vp = style.get(VisualPropertyName::NodeBackgroundColor);

    assert_eq!(
        resolve_value(vp, "1", table.row("1")).unwrap(),
        VisualPropertyValue::string("#CCCCCC")
    );
    assert_eq!(
        resolve_value(vp, "2", table.row("2")).unwrap(),
        VisualPropertyValue::string("#00FF00")
    );
}

#[test]
fn continuous_mapping_interpolates_between_min_and_max() {
    let mapping = ContinuousMapping::from_points(
        "score",
        vec![
            ControlPoint::new(0.0, VisualPropertyValue::Number(1.0)),
            ControlPoint::new(100.0, VisualPropertyValue::Number(50.0)),
        ],
    )
    .unwrap();
    let mut style = VisualStyle::default();
    style.set_mapping(VisualPropertyName::NodeWidth, MappingFunction::Continuous(mapping));

    let mut table = Table::new("net");
    table.set_value("1", "score", AttributeValue::Integer(50));
    assert_eq!(
        resolve_value(style.get(VisualPropertyName::NodeWidth), "1", table.row("1")).unwrap(),
        VisualPropertyValue::Number(25.5)
    );
}

#[test]
fn non_integer_value_for_integer_attribute_is_reported() {
    let doc = json!([
        {"CXVersion": "2.0"},
        {"attributeDeclarations": [{"nodes": {"score": {"d": "integer"}}}]},
        {"nodes": [{"id": 1, "v": {"score": 1.5}}, {"id": 2, "v": {"score": 2}}]},
        {"status": [{"success": true}]},
    ]);
    let report = validate(&doc, &ValidateOptions::default());
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].kind, IssueKind::Attribute);
    assert_eq!(report.errors[0].path, vec!["nodes", "index 0", "score"]);

    let imported = import_cx2(&doc, &ValidateOptions::default()).unwrap();
    assert!(imported.bundle.node_table.is_suspect("1", "score"));
    assert!(!imported.bundle.node_table.is_suspect("2", "score"));
}

#[test]
fn bypass_wins_over_mapping_and_row_content() {
    let mut style = VisualStyle::default();
    style.set_mapping(
        VisualPropertyName::NodeLabel,
        MappingFunction::Passthrough(mapping::PassthroughMapping {
            attribute: "name".into(),
            attribute_type: None,
        }),
    );
    style
        .set_bypass(VisualPropertyName::NodeLabel, ["1"], VisualPropertyValue::string("pinned"))
        .unwrap();
    let mut table = Table::new("net");
    table.set_value("1", "name", AttributeValue::String("A".into()));
    let vp = style.get(VisualPropertyName::NodeLabel);
    for row in [table.row("1"), None] {
        assert_eq!(resolve_value(vp, "1", row).unwrap(), VisualPropertyValue::string("pinned"));
    }
}
