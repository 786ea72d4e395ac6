//! Conversions between CX2 visual-property encodings and the internal value/mapping types.

use super::{VisualPropertyGroup, VisualPropertyName, VisualStyle};
use crate::cx2::{Cx2Mapping, Cx2VisualProperties};
use crate::mapping::{
    ContinuousMapping, ControlPoint, DiscreteMapping, MappingError, MappingFunction, MappingType,
    PassthroughMapping,
};
use crate::value::{
    AttributeType, FontFace, LabelPosition, MapKey, VisualPropertyValue, VisualPropertyValueType,
    is_valid_vp_value,
};
use indexmap::IndexMap;
use serde_json::{Map, Value, json};

fn str_field(obj: &Map<String, Value>, key: &str, default: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

/// Decodes a CX2 value for a property of type `ty`; `None` if it is not a legal value.
pub fn vp_value_from_cx(ty: VisualPropertyValueType, value: &Value) -> Option<VisualPropertyValue> {
    use VisualPropertyValueType as T;

    let decoded = match (ty, value) {
        (T::Number, Value::Number(n)) => VisualPropertyValue::Number(n.as_f64()?),
        (T::Boolean, Value::Bool(b)) => VisualPropertyValue::Boolean(*b),
        (T::Font, Value::Object(obj)) => VisualPropertyValue::Font(FontFace {
            family: str_field(obj, "FONT_FAMILY", "sans-serif"),
            style: str_field(obj, "FONT_STYLE", "normal"),
            weight: str_field(obj, "FONT_WEIGHT", "normal"),
            name: obj
                .get("FONT_NAME")
                .and_then(Value::as_str)
                .map(str::to_string),
        }),
        (T::Font, Value::String(family)) => VisualPropertyValue::Font(FontFace {
            family: family.clone(),
            ..FontFace::default()
        }),
        (T::LabelPosition, Value::Object(obj)) => {
            let margin = |key: &str| obj.get(key).and_then(Value::as_f64).unwrap_or(0.0);
            VisualPropertyValue::LabelPosition(LabelPosition {
                horizontal_align: str_field(obj, "HORIZONTAL_ALIGN", "center"),
                vertical_align: str_field(obj, "VERTICAL_ALIGN", "center"),
                horizontal_anchor: str_field(obj, "HORIZONTAL_ANCHOR", "center"),
                vertical_anchor: str_field(obj, "VERTICAL_ANCHOR", "center"),
                justification: str_field(obj, "JUSTIFICATION", "center"),
                margin_x: margin("MARGIN_X"),
                margin_y: margin("MARGIN_Y"),
            })
        }
        (
            T::Color
            | T::NodeShape
            | T::LineStyle
            | T::EdgeArrowShape
            | T::HorizontalAlign
            | T::VerticalAlign
            | T::Visibility
            | T::String,
            Value::String(s),
        ) => VisualPropertyValue::String(s.clone()),
        _ => return None,
    };
    is_valid_vp_value(&decoded, ty).then_some(decoded)
}

pub fn vp_value_to_cx(value: &VisualPropertyValue) -> Value {
    match value {
        VisualPropertyValue::Number(n) => json!(n),
        VisualPropertyValue::Boolean(b) => json!(b),
        VisualPropertyValue::String(s) => json!(s),
        VisualPropertyValue::Font(font) => {
            let mut obj = Map::new();
            obj.insert("FONT_FAMILY".into(), json!(font.family));
            obj.insert("FONT_STYLE".into(), json!(font.style));
            obj.insert("FONT_WEIGHT".into(), json!(font.weight));
            if let Some(name) = &font.name {
                obj.insert("FONT_NAME".into(), json!(name));
            }
            Value::Object(obj)
        }
        VisualPropertyValue::LabelPosition(pos) => json!({
            "HORIZONTAL_ALIGN": pos.horizontal_align,
            "VERTICAL_ALIGN": pos.vertical_align,
            "HORIZONTAL_ANCHOR": pos.horizontal_anchor,
            "VERTICAL_ANCHOR": pos.vertical_anchor,
            "JUSTIFICATION": pos.justification,
            "MARGIN_X": pos.margin_x,
            "MARGIN_Y": pos.margin_y,
        }),
    }
}

/// Decodes one CX2 mapping for `name`.
///
/// Unknown mapping types are an error. Individual map entries that do not decode are skipped;
/// the validator reports them.
pub fn mapping_from_cx(
    name: VisualPropertyName,
    mapping: &Cx2Mapping,
    vp_default: &VisualPropertyValue,
) -> Result<MappingFunction, MappingError> {
    let mapping_type = MappingType::parse(&mapping.mapping_type)?;
    let def = &mapping.definition;
    let Some(attribute) = def.get("attribute").and_then(Value::as_str) else {
        return Err(MappingError::Malformed {
            mapping_type,
            attribute: String::new(),
            message: format!("{} mapping has no attribute", name.cx_name()),
        });
    };
    let attribute = attribute.to_string();
    let attribute_type = def
        .get("type")
        .and_then(Value::as_str)
        .and_then(AttributeType::parse);
    let entries = def
        .get("map")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let ty = name.value_type();

    match mapping_type {
        MappingType::Passthrough => Ok(MappingFunction::Passthrough(PassthroughMapping {
            attribute,
            attribute_type,
        })),
        MappingType::Discrete => {
            let mut vp_value_map = IndexMap::new();
            for entry in entries {
                let key = entry.get("v").and_then(MapKey::from_json);
                let vp = entry.get("vp").and_then(|vp| vp_value_from_cx(ty, vp));
                match (key, vp) {
                    (Some(key), Some(vp)) => {
                        vp_value_map.insert(key, vp);
                    }
                    _ => tracing::debug!(property = name.cx_name(), %entry, "skipping discrete entry"),
                }
            }
            Ok(MappingFunction::Discrete(DiscreteMapping {
                attribute,
                attribute_type,
                vp_value_map,
                default_value: vp_default.clone(),
            }))
        }
        MappingType::Continuous => {
            continuous_from_cx(ty, attribute, attribute_type, entries).map(MappingFunction::Continuous)
        }
    }
}

fn push_unique(points: &mut Vec<ControlPoint>, cp: ControlPoint) {
    if !points.iter().any(|p| p.value == cp.value) {
        points.push(cp);
    }
}

fn continuous_from_cx(
    ty: VisualPropertyValueType,
    attribute: String,
    attribute_type: Option<AttributeType>,
    intervals: &[Value],
) -> Result<ContinuousMapping, MappingError> {
    let mut points: Vec<ControlPoint> = Vec::new();
    let mut one_sided: Vec<ControlPoint> = Vec::new();
    let mut lt_min = None;
    let mut gt_max = None;

    for interval in intervals {
        let num = |key: &str| interval.get(key).and_then(Value::as_f64);
        let vp = |key: &str| interval.get(key).and_then(|v| vp_value_from_cx(ty, v));
        let flag = |key: &str| interval.get(key).and_then(Value::as_bool).unwrap_or(true);

        match (num("min"), num("max")) {
            (Some(min), Some(max)) => {
                if let Some(min_vp) = vp("minVPValue") {
                    push_unique(&mut points, ControlPoint {
                        value: min,
                        vp_value: min_vp,
                        inclusive: flag("includeMin"),
                    });
                }
                if let Some(max_vp) = vp("maxVPValue") {
                    push_unique(&mut points, ControlPoint {
                        value: max,
                        vp_value: max_vp,
                        inclusive: flag("includeMax"),
                    });
                }
            }
            (None, Some(max)) => {
                if let Some(max_vp) = vp("maxVPValue") {
                    lt_min = Some(max_vp.clone());
                    one_sided.push(ControlPoint {
                        value: max,
                        vp_value: max_vp,
                        inclusive: flag("includeMax"),
                    });
                }
            }
            (Some(min), None) => {
                if let Some(min_vp) = vp("minVPValue") {
                    gt_max = Some(min_vp.clone());
                    one_sided.push(ControlPoint {
                        value: min,
                        vp_value: min_vp,
                        inclusive: flag("includeMin"),
                    });
                }
            }
            (None, None) => {
                tracing::debug!(%attribute, %interval, "skipping continuous interval without bounds");
            }
        }
    }

    // Threshold-only mappings (`< v` / `> v`) still need an interpolation anchor.
    if points.is_empty() {
        for cp in one_sided {
            push_unique(&mut points, cp);
        }
    }

    let mut mapping = ContinuousMapping::from_points(attribute, points)?;
    mapping.attribute_type = attribute_type;
    mapping.lt_min_vp_value = lt_min;
    mapping.gt_max_vp_value = gt_max;
    Ok(mapping)
}

pub fn mapping_to_cx(mapping: &MappingFunction) -> Cx2Mapping {
    let mut definition = Map::new();
    definition.insert("attribute".into(), json!(mapping.attribute()));

    let attribute_type = match mapping {
        MappingFunction::Passthrough(m) => m.attribute_type,
        MappingFunction::Discrete(m) => m.attribute_type,
        MappingFunction::Continuous(m) => m.attribute_type,
    };
    if let Some(ty) = attribute_type {
        definition.insert("type".into(), json!(ty.as_str()));
    }

    match mapping {
        MappingFunction::Passthrough(_) => {}
        MappingFunction::Discrete(m) => {
            let map: Vec<Value> = m
                .vp_value_map
                .iter()
                .map(|(k, vp)| json!({ "v": k.to_json(), "vp": vp_value_to_cx(vp) }))
                .collect();
            definition.insert("map".into(), Value::Array(map));
        }
        MappingFunction::Continuous(m) => {
            definition.insert("map".into(), Value::Array(continuous_intervals(m)));
        }
    }

    Cx2Mapping {
        mapping_type: mapping.mapping_type().cx_name().to_string(),
        definition,
    }
}

fn continuous_intervals(m: &ContinuousMapping) -> Vec<Value> {
    let points = m.points();
    let lt = m.lt_min_vp_value.as_ref().unwrap_or(&m.min.vp_value);
    let gt = m.gt_max_vp_value.as_ref().unwrap_or(&m.max.vp_value);

    let mut out = Vec::with_capacity(points.len() + 2);
    out.push(json!({
        "max": m.min.value,
        "maxVPValue": vp_value_to_cx(lt),
        "includeMin": false,
        "includeMax": m.min.inclusive,
    }));
    if let [only] = points.as_slice() {
        out.push(json!({
            "min": only.value,
            "max": only.value,
            "minVPValue": vp_value_to_cx(&only.vp_value),
            "maxVPValue": vp_value_to_cx(&only.vp_value),
            "includeMin": only.inclusive,
            "includeMax": only.inclusive,
        }));
    }
    for pair in points.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        out.push(json!({
            "min": lo.value,
            "max": hi.value,
            "minVPValue": vp_value_to_cx(&lo.vp_value),
            "maxVPValue": vp_value_to_cx(&hi.vp_value),
            "includeMin": lo.inclusive,
            "includeMax": hi.inclusive,
        }));
    }
    out.push(json!({
        "min": m.max.value,
        "minVPValue": vp_value_to_cx(gt),
        "includeMin": m.max.inclusive,
        "includeMax": false,
    }));
    out
}

/// Builds a visual style from the `visualProperties` aspect.
///
/// Defaults apply first so discrete mappings inherit the decoded default as their fallback.
/// Unknown property names, properties listed under another group's section, and undecodable
/// values are skipped (the validator reports them).
pub fn visual_style_from_cx(vps: &Cx2VisualProperties) -> Result<VisualStyle, MappingError> {
    let mut style = VisualStyle::default();

    for (group, defaults) in [
        (VisualPropertyGroup::Node, &vps.default.node),
        (VisualPropertyGroup::Edge, &vps.default.edge),
        (VisualPropertyGroup::Network, &vps.default.network),
    ] {
        for (cx_name, raw) in defaults {
            let Some(name) = VisualPropertyName::from_cx_name(cx_name).filter(|n| n.group() == group)
            else {
                tracing::debug!(property = %cx_name, ?group, "ignoring unknown or out-of-scope default");
                continue;
            };
            match vp_value_from_cx(name.value_type(), raw) {
                Some(value) => style.get_mut(name).default_value = value,
                None => tracing::warn!(property = %cx_name, %raw, "ignoring invalid default value"),
            }
        }
    }

    for (group, mappings) in [
        (VisualPropertyGroup::Node, &vps.node_mapping),
        (VisualPropertyGroup::Edge, &vps.edge_mapping),
    ] {
        for (cx_name, raw) in mappings {
            let Some(name) = VisualPropertyName::from_cx_name(cx_name).filter(|n| n.group() == group)
            else {
                tracing::debug!(property = %cx_name, ?group, "ignoring mapping on unknown or out-of-scope property");
                continue;
            };
            let vp = style.get_mut(name);
            match mapping_from_cx(name, raw, &vp.default_value) {
                Ok(mapping) => vp.mapping = Some(mapping),
                Err(err @ MappingError::UnsupportedType { .. }) => return Err(err),
                Err(err) => tracing::warn!(property = %cx_name, %err, "dropping mapping"),
            }
        }
    }

    Ok(style)
}

/// Inverse of [`visual_style_from_cx`].
pub fn visual_style_to_cx(style: &VisualStyle) -> Cx2VisualProperties {
    let mut out = Cx2VisualProperties::default();
    for vp in style.iter() {
        let cx_name = vp.name.cx_name().to_string();
        let default = vp_value_to_cx(&vp.default_value);
        match vp.group {
            VisualPropertyGroup::Node => {
                out.default.node.insert(cx_name.clone(), default);
                if let Some(mapping) = &vp.mapping {
                    out.node_mapping.insert(cx_name, mapping_to_cx(mapping));
                }
            }
            VisualPropertyGroup::Edge => {
                out.default.edge.insert(cx_name.clone(), default);
                if let Some(mapping) = &vp.mapping {
                    out.edge_mapping.insert(cx_name, mapping_to_cx(mapping));
                }
            }
            VisualPropertyGroup::Network => {
                out.default.network.insert(cx_name, default);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cx_mapping(value: Value) -> Cx2Mapping {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn decodes_composite_values() {
        let pos = vp_value_from_cx(
            VisualPropertyValueType::LabelPosition,
            &json!({ "HORIZONTAL_ALIGN": "left", "VERTICAL_ALIGN": "top", "MARGIN_X": 2 }),
        )
        .unwrap();
        let VisualPropertyValue::LabelPosition(pos) = &pos else {
            panic!("expected label position");
        };
        assert_eq!(pos.horizontal_align, "left");
        assert_eq!(pos.vertical_anchor, "center");
        assert_eq!(pos.margin_x, 2.0);

        let font = vp_value_from_cx(
            VisualPropertyValueType::Font,
            &json!({ "FONT_FAMILY": "serif", "FONT_STYLE": "italic", "FONT_WEIGHT": "bold" }),
        )
        .unwrap();
        assert_eq!(
            vp_value_to_cx(&font),
            json!({ "FONT_FAMILY": "serif", "FONT_STYLE": "italic", "FONT_WEIGHT": "bold" })
        );
    }

    #[test]
    fn rejects_values_outside_the_type() {
        assert!(vp_value_from_cx(VisualPropertyValueType::Color, &json!("blue")).is_none());
        assert!(vp_value_from_cx(VisualPropertyValueType::Number, &json!("12")).is_none());
        assert!(vp_value_from_cx(VisualPropertyValueType::NodeShape, &json!("blob")).is_none());
    }

    #[test]
    fn continuous_intervals_decode_to_control_points() {
        let raw = cx_mapping(json!({
            "type": "CONTINUOUS",
            "definition": {
                "attribute": "score",
                "type": "double",
                "map": [
                    { "max": 0, "maxVPValue": 5, "includeMax": true, "includeMin": false },
                    { "min": 0, "max": 50, "minVPValue": 10, "maxVPValue": 20, "includeMin": true, "includeMax": true },
                    { "min": 50, "max": 100, "minVPValue": 20, "maxVPValue": 60, "includeMin": true, "includeMax": true },
                    { "min": 100, "minVPValue": 80, "includeMin": false, "includeMax": false }
                ]
            }
        }));
        let MappingFunction::Continuous(m) =
            mapping_from_cx(VisualPropertyName::NodeWidth, &raw, &VisualPropertyValue::Number(1.0))
                .unwrap()
        else {
            panic!("expected continuous");
        };
        let values: Vec<f64> = m.control_points.iter().map(|cp| cp.value).collect();
        assert_eq!(values, vec![0.0, 50.0, 100.0]);
        assert_eq!(m.min.value, 0.0);
        assert_eq!(m.max.value, 100.0);
        assert_eq!(m.lt_min_vp_value, Some(VisualPropertyValue::Number(5.0)));
        assert_eq!(m.gt_max_vp_value, Some(VisualPropertyValue::Number(80.0)));
        assert_eq!(m.attribute_type, Some(AttributeType::Double));
        assert_eq!(m.resolve(75.0).unwrap(), VisualPropertyValue::Number(40.0));
    }

    #[test]
    fn continuous_encoding_survives_a_round_trip() {
        let raw = cx_mapping(json!({
            "type": "CONTINUOUS",
            "definition": {
                "attribute": "score",
                "map": [
                    { "max": 1, "maxVPValue": "#000000", "includeMax": true, "includeMin": false },
                    { "min": 1, "max": 9, "minVPValue": "#000000", "maxVPValue": "#FFFFFF", "includeMin": true, "includeMax": true },
                    { "min": 9, "minVPValue": "#FFFFFF", "includeMin": true, "includeMax": false }
                ]
            }
        }));
        let name = VisualPropertyName::NodeBackgroundColor;
        let default = name.default_value();
        let first = mapping_from_cx(name, &raw, &default).unwrap();
        let second = mapping_from_cx(name, &mapping_to_cx(&first), &default).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn discrete_mapping_keeps_key_kinds() {
        let raw = cx_mapping(json!({
            "type": "DISCRETE",
            "definition": {
                "attribute": "rank",
                "map": [
                    { "v": 1, "vp": "ellipse" },
                    { "v": "1", "vp": "diamond" },
                    { "v": 2, "vp": "not-a-shape" }
                ]
            }
        }));
        let name = VisualPropertyName::NodeShape;
        let MappingFunction::Discrete(m) = mapping_from_cx(name, &raw, &name.default_value()).unwrap()
        else {
            panic!("expected discrete");
        };
        assert_eq!(m.vp_value_map.len(), 2);
        assert_eq!(
            m.vp_value_map.get(&MapKey::Integer(1)),
            Some(&VisualPropertyValue::string("ellipse"))
        );
        assert_eq!(m.default_value, name.default_value());

        let back = mapping_to_cx(&MappingFunction::Discrete(m));
        assert_eq!(back.definition["map"][0], json!({ "v": 1, "vp": "ellipse" }));
        assert_eq!(back.definition["map"][1], json!({ "v": "1", "vp": "diamond" }));
    }

    #[test]
    fn unknown_mapping_type_is_fatal_for_style_building() {
        let vps: Cx2VisualProperties = serde_json::from_value(json!({
            "default": { "node": {}, "edge": {}, "network": {} },
            "nodeMapping": {
                "NODE_WIDTH": { "type": "LOGARITHMIC", "definition": { "attribute": "x" } }
            }
        }))
        .unwrap();
        assert!(matches!(
            visual_style_from_cx(&vps),
            Err(MappingError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn style_defaults_and_mappings_decode() {
        let vps: Cx2VisualProperties = serde_json::from_value(json!({
            "default": {
                "node": { "NODE_WIDTH": 40, "NODE_BACKGROUND_COLOR": "#112233", "NODE_MYSTERY": 1 },
                "edge": { "EDGE_WIDTH": 3 },
                "network": { "NETWORK_BACKGROUND_COLOR": "#000000" }
            },
            "nodeMapping": {
                "NODE_LABEL": { "type": "PASSTHROUGH", "definition": { "attribute": "name" } }
            },
            "edgeMapping": {}
        }))
        .unwrap();
        let style = visual_style_from_cx(&vps).unwrap();
        assert_eq!(
            style.get(VisualPropertyName::NodeWidth).default_value,
            VisualPropertyValue::Number(40.0)
        );
        assert_eq!(
            style.get(VisualPropertyName::NetworkBackgroundColor).default_value,
            VisualPropertyValue::string("#000000")
        );
        assert!(style.get(VisualPropertyName::NodeLabel).mapping.is_some());

        let back = visual_style_to_cx(&style);
        assert_eq!(back.default.node["NODE_WIDTH"], json!(40.0));
        assert!(back.node_mapping.contains_key("NODE_LABEL"));
        assert!(back.edge_mapping.is_empty());
    }

    #[test]
    fn properties_under_the_wrong_group_are_ignored() {
        let vps: Cx2VisualProperties = serde_json::from_value(json!({
            "default": {
                "node": { "EDGE_WIDTH": 9, "NODE_WIDTH": 12 },
                "edge": { "EDGE_WIDTH": 3 },
                "network": {}
            },
            "nodeMapping": {
                "EDGE_LABEL": { "type": "PASSTHROUGH", "definition": { "attribute": "name" } }
            },
            "edgeMapping": {}
        }))
        .unwrap();
        let style = visual_style_from_cx(&vps).unwrap();
        assert_eq!(
            style.get(VisualPropertyName::EdgeWidth).default_value,
            VisualPropertyValue::Number(3.0)
        );
        assert_eq!(
            style.get(VisualPropertyName::NodeWidth).default_value,
            VisualPropertyValue::Number(12.0)
        );
        assert!(style.get(VisualPropertyName::EdgeLabel).mapping.is_none());

        let back = visual_style_to_cx(&style);
        assert!(!back.default.node.contains_key("EDGE_WIDTH"));
        assert_eq!(back.default.edge["EDGE_WIDTH"], json!(3.0));
    }
}
