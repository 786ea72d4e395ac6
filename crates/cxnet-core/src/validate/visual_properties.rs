use super::{IssueKind, ValidationReport, index_segment};
use crate::cx2::{Cx2Document, DeclaredAttribute, EDGE_BYPASSES, NODE_BYPASSES, VISUAL_PROPERTIES};
use crate::mapping::MappingType;
use crate::value::AttributeType;
use crate::visual_style::cx2::vp_value_from_cx;
use crate::visual_style::{VisualPropertyGroup, VisualPropertyName};
use indexmap::IndexMap;
use serde_json::{Map, Value};

const KIND: IssueKind = IssueKind::VisualProperty;

fn group_name(group: VisualPropertyGroup) -> &'static str {
    match group {
        VisualPropertyGroup::Node => "node",
        VisualPropertyGroup::Edge => "edge",
        VisualPropertyGroup::Network => "network",
    }
}

/// Resolves a CX2 property name, warning on unknown names and on names from the wrong group.
fn lookup(
    report: &mut ValidationReport,
    path: &[String],
    cx_name: &str,
    group: VisualPropertyGroup,
) -> Option<VisualPropertyName> {
    let Some(name) = VisualPropertyName::from_cx_name(cx_name) else {
        report.warning(KIND, path.to_vec(), format!("unknown visual property {cx_name:?}"));
        return None;
    };
    if name.group() != group {
        report.warning(
            KIND,
            path.to_vec(),
            format!(
                "{cx_name} is a {} property used in {} scope",
                group_name(name.group()),
                group_name(group)
            ),
        );
        return None;
    }
    Some(name)
}

fn check_value(report: &mut ValidationReport, path: Vec<String>, name: VisualPropertyName, value: &Value) {
    if vp_value_from_cx(name.value_type(), value).is_none() {
        report.error(
            KIND,
            path,
            format!("{value} is not a valid value for {}", name.cx_name()),
        );
    }
}

fn check_property_map(
    report: &mut ValidationReport,
    base: &[String],
    values: &Map<String, Value>,
    group: VisualPropertyGroup,
) {
    for (cx_name, value) in values {
        let mut path = base.to_vec();
        path.push(cx_name.clone());
        if let Some(name) = lookup(report, &path, cx_name, group) {
            check_value(report, path, name, value);
        }
    }
}

fn declared_type(
    declarations: &IndexMap<String, DeclaredAttribute>,
    attribute: &str,
) -> Option<Option<AttributeType>> {
    let (_, decl) = declarations
        .iter()
        .find(|(name, decl)| name.as_str() == attribute || decl.a.as_deref() == Some(attribute))?;
    Some(match decl.d.as_deref() {
        None => Some(AttributeType::String),
        Some(tag) => AttributeType::parse(tag),
    })
}

fn check_mapping(
    report: &mut ValidationReport,
    declarations: &IndexMap<String, DeclaredAttribute>,
    path: Vec<String>,
    name: VisualPropertyName,
    mapping: &Value,
) {
    let Some(mapping_type) = mapping.get("type").and_then(Value::as_str) else {
        report.error(KIND, path, "mapping has no type");
        return;
    };
    let mapping_type = match MappingType::parse(mapping_type) {
        Ok(t) => t,
        Err(err) => {
            report.error(KIND, path, err.to_string());
            return;
        }
    };
    let Some(definition) = mapping.get("definition").and_then(Value::as_object) else {
        report.error(KIND, path, "mapping has no definition object");
        return;
    };
    let Some(attribute) = definition.get("attribute").and_then(Value::as_str) else {
        report.error(KIND, path, "mapping definition has no attribute");
        return;
    };

    let entries = definition.get("map");
    match mapping_type {
        MappingType::Passthrough => {}
        MappingType::Discrete => {
            let Some(entries) = entries.and_then(Value::as_array) else {
                report.error(KIND, path, "discrete mapping needs a map array");
                return;
            };
            for (i, entry) in entries.iter().enumerate() {
                let mut entry_path = path.clone();
                entry_path.extend(["map".to_string(), index_segment(i)]);
                match (entry.get("v"), entry.get("vp")) {
                    (Some(_), Some(vp)) => check_value(report, entry_path, name, vp),
                    _ => report.error(KIND, entry_path, "discrete entry needs v and vp"),
                }
            }
        }
        MappingType::Continuous => {
            match declared_type(declarations, attribute) {
                Some(Some(ty)) if ty.is_numeric() => {}
                Some(Some(ty)) => report.error(
                    KIND,
                    path.clone(),
                    format!("continuous mapping on non-numeric attribute {attribute:?} ({ty})"),
                ),
                // Unknown declared type is reported by the attribute pass.
                Some(None) => {}
                None => report.warning(
                    KIND,
                    path.clone(),
                    format!("continuous mapping attribute {attribute:?} is not declared"),
                ),
            }
            let Some(entries) = entries.and_then(Value::as_array) else {
                report.error(KIND, path, "continuous mapping needs a map array");
                return;
            };
            if entries.is_empty() {
                report.error(KIND, path.clone(), "continuous mapping has no intervals");
            }
            for (i, interval) in entries.iter().enumerate() {
                let mut interval_path = path.clone();
                interval_path.extend(["map".to_string(), index_segment(i)]);
                let bound = |key: &str| interval.get(key).filter(|v| !v.is_null());
                let (min, max) = (bound("min"), bound("max"));
                if min.is_none() && max.is_none() {
                    report.error(KIND, interval_path.clone(), "interval has neither min nor max");
                }
                for (key, vp_key) in [("min", "minVPValue"), ("max", "maxVPValue")] {
                    let Some(edge) = bound(key) else {
                        continue;
                    };
                    if !edge.is_number() {
                        report.error(KIND, interval_path.clone(), format!("interval {key} must be numeric"));
                    }
                    match interval.get(vp_key) {
                        Some(vp) => check_value(report, interval_path.clone(), name, vp),
                        None => report.error(KIND, interval_path.clone(), format!("interval is missing {vp_key}")),
                    }
                }
            }
        }
    }
}

/// Checks `visualProperties` and the node/edge bypass aspects against the property catalogue.
pub fn check_visual_properties(doc: &Cx2Document) -> ValidationReport {
    let mut report = ValidationReport::new();

    if let Some(vps) = doc.find_aspect(VISUAL_PROPERTIES).and_then(|a| a.first()) {
        let base = issue_path![VISUAL_PROPERTIES, index_segment(0)];
        if let Some(defaults) = vps.get("default").and_then(Value::as_object) {
            for (key, group) in [
                ("node", VisualPropertyGroup::Node),
                ("edge", VisualPropertyGroup::Edge),
                ("network", VisualPropertyGroup::Network),
            ] {
                if let Some(values) = defaults.get(key).and_then(Value::as_object) {
                    let mut path = base.clone();
                    path.extend(["default".to_string(), key.to_string()]);
                    check_property_map(&mut report, &path, values, group);
                }
            }
        }
        let declarations = doc.attribute_declarations();
        for (key, scope, group) in [
            ("nodeMapping", &declarations.nodes, VisualPropertyGroup::Node),
            ("edgeMapping", &declarations.edges, VisualPropertyGroup::Edge),
        ] {
            let Some(mappings) = vps.get(key).and_then(Value::as_object) else {
                continue;
            };
            for (cx_name, mapping) in mappings {
                let mut path = base.clone();
                path.extend([key.to_string(), cx_name.clone()]);
                if let Some(name) = lookup(&mut report, &path, cx_name, group) {
                    check_mapping(&mut report, scope, path, name, mapping);
                }
            }
        }
    }

    for (tag, group) in [
        (NODE_BYPASSES, VisualPropertyGroup::Node),
        (EDGE_BYPASSES, VisualPropertyGroup::Edge),
    ] {
        for (i, bypass) in doc.aspect_elements(tag).enumerate() {
            let path = issue_path![tag, index_segment(i), "v"];
            match bypass.get("v").and_then(Value::as_object) {
                Some(values) => check_property_map(&mut report, &path, values, group),
                None => report.error(KIND, path, "bypass needs a v object"),
            }
        }
    }
    report
}
