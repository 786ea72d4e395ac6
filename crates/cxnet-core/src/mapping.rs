//! Mapping functions: how a row's attribute value becomes a visual property value.
//!
//! Resolution order for one element is bypass, then mapping, then the property default
//! (see [`resolve_value`]).

use crate::color;
use crate::table::Row;
use crate::value::{AttributeType, AttributeValue, MapKey, VisualPropertyValue};
use crate::visual_style::VisualProperty;
use indexmap::IndexMap;
use serde::Serialize;
use std::mem::discriminant;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MappingError {
    #[error("Unsupported mapping type: {mapping_type}")]
    UnsupportedType { mapping_type: String },

    #[error("Cannot interpolate {attribute} between {from:?} and {to:?}")]
    IncompatibleControlPoints {
        attribute: String,
        from: VisualPropertyValue,
        to: VisualPropertyValue,
    },

    #[error("Malformed {mapping_type} mapping on {attribute}: {message}")]
    Malformed {
        mapping_type: MappingType,
        attribute: String,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MappingType {
    Passthrough,
    Discrete,
    Continuous,
}

impl MappingType {
    /// Accepts the CX2 spelling (`PASSTHROUGH`) as well as lowercase.
    pub fn parse(tag: &str) -> Result<Self, MappingError> {
        match tag.to_ascii_uppercase().as_str() {
            "PASSTHROUGH" => Ok(Self::Passthrough),
            "DISCRETE" => Ok(Self::Discrete),
            "CONTINUOUS" => Ok(Self::Continuous),
            _ => Err(MappingError::UnsupportedType {
                mapping_type: tag.to_string(),
            }),
        }
    }

    pub fn cx_name(self) -> &'static str {
        match self {
            Self::Passthrough => "PASSTHROUGH",
            Self::Discrete => "DISCRETE",
            Self::Continuous => "CONTINUOUS",
        }
    }
}

impl std::fmt::Display for MappingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.cx_name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassthroughMapping {
    pub attribute: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_type: Option<AttributeType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscreteMapping {
    pub attribute: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_type: Option<AttributeType>,
    pub vp_value_map: IndexMap<MapKey, VisualPropertyValue>,
    /// Fallback for attribute values missing from `vp_value_map`.
    pub default_value: VisualPropertyValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlPoint {
    pub value: f64,
    pub vp_value: VisualPropertyValue,
    pub inclusive: bool,
}

impl ControlPoint {
    pub fn new(value: f64, vp_value: VisualPropertyValue) -> Self {
        Self {
            value,
            vp_value,
            inclusive: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinuousMapping {
    pub attribute: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_type: Option<AttributeType>,
    pub min: ControlPoint,
    pub max: ControlPoint,
    /// Sorted ascending by `value`.
    pub control_points: Vec<ControlPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt_min_vp_value: Option<VisualPropertyValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt_max_vp_value: Option<VisualPropertyValue>,
}

impl ContinuousMapping {
    /// Builds a mapping from unordered control points; `min`/`max` become the outermost points.
    pub fn from_points(
        attribute: impl Into<String>,
        mut control_points: Vec<ControlPoint>,
    ) -> Result<Self, MappingError> {
        let attribute = attribute.into();
        control_points.sort_by(|a, b| a.value.total_cmp(&b.value));
        let (Some(min), Some(max)) = (control_points.first(), control_points.last()) else {
            return Err(MappingError::Malformed {
                mapping_type: MappingType::Continuous,
                attribute,
                message: "no control points".to_string(),
            });
        };
        let (min, max) = (min.clone(), max.clone());
        Ok(Self {
            attribute,
            attribute_type: None,
            min,
            max,
            control_points,
            lt_min_vp_value: None,
            gt_max_vp_value: None,
        })
    }

    /// The interpolation chain `[min] ++ control_points ++ [max]` with repeated values dropped.
    ///
    /// Fewer than two control points means the chain is just `min` and `max`.
    pub fn points(&self) -> Vec<&ControlPoint> {
        let mut out = Vec::with_capacity(self.control_points.len() + 2);
        out.push(&self.min);
        if self.control_points.len() >= 2 {
            for cp in &self.control_points {
                if out.last().is_some_and(|last| cp.value > last.value) {
                    out.push(cp);
                }
            }
        }
        if out.last().is_some_and(|last| self.max.value > last.value) {
            out.push(&self.max);
        }
        out
    }

    pub fn resolve(&self, x: f64) -> Result<VisualPropertyValue, MappingError> {
        if x < self.min.value {
            return Ok(self
                .lt_min_vp_value
                .clone()
                .unwrap_or_else(|| self.min.vp_value.clone()));
        }
        if x > self.max.value {
            return Ok(self
                .gt_max_vp_value
                .clone()
                .unwrap_or_else(|| self.max.vp_value.clone()));
        }

        let points = self.points();
        let i = points.partition_point(|p| p.value <= x);
        if i == 0 {
            return Ok(points[0].vp_value.clone());
        }
        let lo = points[i - 1];
        if lo.value == x || i == points.len() {
            return Ok(lo.vp_value.clone());
        }
        let hi = points[i];
        let t = (x - lo.value) / (hi.value - lo.value);
        interpolate(&self.attribute, &lo.vp_value, &hi.vp_value, t)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MappingFunction {
    Passthrough(PassthroughMapping),
    Discrete(DiscreteMapping),
    Continuous(ContinuousMapping),
}

impl MappingFunction {
    pub fn attribute(&self) -> &str {
        match self {
            Self::Passthrough(m) => &m.attribute,
            Self::Discrete(m) => &m.attribute,
            Self::Continuous(m) => &m.attribute,
        }
    }

    pub fn mapping_type(&self) -> MappingType {
        match self {
            Self::Passthrough(_) => MappingType::Passthrough,
            Self::Discrete(_) => MappingType::Discrete,
            Self::Continuous(_) => MappingType::Continuous,
        }
    }

    /// Maps a present, non-null attribute value.
    ///
    /// `fallback` is returned when a continuous mapping meets a non-numeric value.
    pub fn apply(
        &self,
        value: &AttributeValue,
        fallback: &VisualPropertyValue,
    ) -> Result<VisualPropertyValue, MappingError> {
        match self {
            Self::Passthrough(_) => Ok(VisualPropertyValue::from_attribute(value)),
            Self::Discrete(m) => Ok(value
                .map_key()
                .and_then(|key| m.vp_value_map.get(&key))
                .unwrap_or(&m.default_value)
                .clone()),
            Self::Continuous(m) => match value.as_f64().filter(|x| x.is_finite()) {
                Some(x) => m.resolve(x),
                None => Ok(fallback.clone()),
            },
        }
    }
}

/// Resolves one property for one element: bypass, then mapping, then default.
///
/// A missing row, a missing attribute, or a `null` attribute all fall through to the property
/// default without consulting the mapping.
pub fn resolve_value(
    vp: &VisualProperty,
    element_id: &str,
    row: Option<&Row>,
) -> Result<VisualPropertyValue, MappingError> {
    if let Some(bypass) = vp.bypass_map.get(element_id) {
        return Ok(bypass.clone());
    }
    let Some(mapping) = &vp.mapping else {
        return Ok(vp.default_value.clone());
    };
    match row.and_then(|r| r.get(mapping.attribute())) {
        Some(value) => mapping.apply(value, &vp.default_value),
        None => Ok(vp.default_value.clone()),
    }
}

fn interpolate(
    attribute: &str,
    from: &VisualPropertyValue,
    to: &VisualPropertyValue,
    t: f64,
) -> Result<VisualPropertyValue, MappingError> {
    use VisualPropertyValue as V;

    match (from, to) {
        (V::Number(a), V::Number(b)) => Ok(V::Number(a + (b - a) * t)),
        (V::String(a), V::String(b)) => Ok(match color::interpolate_hex(a, b, t) {
            Some(c) => V::String(c),
            // Enumerated values (shapes, line styles) step at the lower point.
            None => from.clone(),
        }),
        (a, b) if discriminant(a) == discriminant(b) => Ok(a.clone()),
        _ => Err(MappingError::IncompatibleControlPoints {
            attribute: attribute.to_string(),
            from: from.clone(),
            to: to.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visual_style::{VisualPropertyName, VisualStyle};

    fn num(v: f64) -> VisualPropertyValue {
        VisualPropertyValue::Number(v)
    }

    fn row(pairs: &[(&str, AttributeValue)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn width_mapping(min: (f64, f64), max: (f64, f64)) -> ContinuousMapping {
        ContinuousMapping::from_points(
            "score",
            vec![ControlPoint::new(min.0, num(min.1)), ControlPoint::new(max.0, num(max.1))],
        )
        .unwrap()
    }

    #[test]
    fn continuous_midpoint_interpolates_linearly() {
        let mut m = width_mapping((0.0, 1.0), (100.0, 50.0));
        m.control_points.clear();
        assert_eq!(m.resolve(50.0).unwrap(), num(25.5));
        assert_eq!(m.resolve(0.0).unwrap(), num(1.0));
        assert_eq!(m.resolve(100.0).unwrap(), num(50.0));
    }

    #[test]
    fn continuous_out_of_range_uses_overrides_then_bounds() {
        let mut m = width_mapping((0.0, 1.0), (100.0, 50.0));
        assert_eq!(m.resolve(-1.0).unwrap(), num(1.0));
        assert_eq!(m.resolve(101.0).unwrap(), num(50.0));
        m.lt_min_vp_value = Some(num(-5.0));
        m.gt_max_vp_value = Some(num(500.0));
        assert_eq!(m.resolve(-1.0).unwrap(), num(-5.0));
        assert_eq!(m.resolve(101.0).unwrap(), num(500.0));
    }

    #[test]
    fn continuous_is_monotonic_between_points() {
        let m = ContinuousMapping::from_points(
            "score",
            vec![
                ControlPoint::new(0.0, num(10.0)),
                ControlPoint::new(10.0, num(20.0)),
                ControlPoint::new(20.0, num(60.0)),
            ],
        )
        .unwrap();
        let mut prev = f64::MIN;
        for step in 0..=40 {
            let x = step as f64 * 0.5;
            let v = m.resolve(x).unwrap().as_f64().unwrap();
            assert!((10.0..=60.0).contains(&v));
            assert!(v >= prev, "not monotonic at {x}");
            prev = v;
        }
        assert_eq!(m.resolve(10.0).unwrap(), num(20.0));
        assert_eq!(m.resolve(15.0).unwrap(), num(40.0));
    }

    #[test]
    fn continuous_colors_interpolate_per_channel() {
        let m = ContinuousMapping::from_points(
            "score",
            vec![
                ControlPoint::new(0.0, VisualPropertyValue::string("#000000")),
                ControlPoint::new(1.0, VisualPropertyValue::string("#FFFFFF")),
            ],
        )
        .unwrap();
        assert_eq!(m.resolve(0.5).unwrap(), VisualPropertyValue::string("#808080"));
    }

    #[test]
    fn continuous_enumerated_values_step() {
        let m = ContinuousMapping::from_points(
            "score",
            vec![
                ControlPoint::new(0.0, VisualPropertyValue::string("ellipse")),
                ControlPoint::new(1.0, VisualPropertyValue::string("diamond")),
            ],
        )
        .unwrap();
        assert_eq!(m.resolve(0.9).unwrap(), VisualPropertyValue::string("ellipse"));
        assert_eq!(m.resolve(1.0).unwrap(), VisualPropertyValue::string("diamond"));
    }

    #[test]
    fn continuous_rejects_mixed_kinds() {
        let m = ContinuousMapping::from_points(
            "score",
            vec![
                ControlPoint::new(0.0, num(1.0)),
                ControlPoint::new(1.0, VisualPropertyValue::string("#FFFFFF")),
            ],
        )
        .unwrap();
        assert!(matches!(
            m.resolve(0.5),
            Err(MappingError::IncompatibleControlPoints { .. })
        ));
    }

    #[test]
    fn from_points_requires_a_point() {
        assert!(ContinuousMapping::from_points("score", vec![]).is_err());
    }

    #[test]
    fn discrete_falls_back_to_mapping_default() {
        let mut vp_value_map = IndexMap::new();
        vp_value_map.insert(
            MapKey::String("gene".into()),
            VisualPropertyValue::string("#FF0000"),
        );
        vp_value_map.insert(
            MapKey::String("protein".into()),
            VisualPropertyValue::string("#00FF00"),
        );
        let mapping = MappingFunction::Discrete(DiscreteMapping {
            attribute: "type".into(),
            attribute_type: Some(AttributeType::String),
            vp_value_map,
            default_value: VisualPropertyValue::string("#CCCCCC"),
        });
        let fallback = VisualPropertyValue::string("#FFFFFF");
        assert_eq!(
            mapping
                .apply(&AttributeValue::String("rna".into()), &fallback)
                .unwrap(),
            VisualPropertyValue::string("#CCCCCC")
        );
        assert_eq!(
            mapping
                .apply(&AttributeValue::String("gene".into()), &fallback)
                .unwrap(),
            VisualPropertyValue::string("#FF0000")
        );
    }

    #[test]
    fn bypass_wins_over_mapping_and_row() {
        let mut style = VisualStyle::default();
        let vp = style.get_mut(VisualPropertyName::NodeWidth);
        vp.mapping = Some(MappingFunction::Passthrough(PassthroughMapping {
            attribute: "w".into(),
            attribute_type: None,
        }));
        vp.bypass_map.insert("1".into(), num(100.0));

        let r = row(&[("w", AttributeValue::Double(7.0))]);
        let vp = style.get(VisualPropertyName::NodeWidth);
        assert_eq!(resolve_value(vp, "1", Some(&r)).unwrap(), num(100.0));
        assert_eq!(resolve_value(vp, "1", None).unwrap(), num(100.0));
        assert_eq!(resolve_value(vp, "2", Some(&r)).unwrap(), num(7.0));
    }

    #[test]
    fn missing_attribute_falls_through_to_default() {
        let mut style = VisualStyle::default();
        let vp = style.get_mut(VisualPropertyName::NodeWidth);
        vp.mapping = Some(MappingFunction::Continuous(width_mapping(
            (0.0, 1.0),
            (1.0, 2.0),
        )));
        let default = vp.default_value.clone();
        let vp = style.get(VisualPropertyName::NodeWidth);
        let r = row(&[("other", AttributeValue::Double(0.5))]);
        assert_eq!(resolve_value(vp, "1", Some(&r)).unwrap(), default);
        let text = row(&[("score", AttributeValue::String("high".into()))]);
        assert_eq!(resolve_value(vp, "1", Some(&text)).unwrap(), default);
    }

    #[test]
    fn mapping_type_parse_rejects_unknown() {
        assert_eq!(MappingType::parse("DISCRETE").unwrap(), MappingType::Discrete);
        assert_eq!(
            MappingType::parse("continuous").unwrap(),
            MappingType::Continuous
        );
        assert_eq!(
            MappingType::parse("LOGARITHMIC"),
            Err(MappingError::UnsupportedType {
                mapping_type: "LOGARITHMIC".into()
            })
        );
    }
}
