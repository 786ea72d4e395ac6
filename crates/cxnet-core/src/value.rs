//! Attribute and visual-property value types.
//!
//! CX2 declares attribute types with short string tags (`"string"`, `"list_of_double"`, ...).
//! Attribute values arrive as JSON and are checked against those tags with
//! [`is_valid_data_type`]; visual property values are checked with [`is_valid_vp_value`].

use crate::color;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Integer,
    Double,
    Boolean,
    Long,
    ListOfString,
    ListOfDouble,
    ListOfInteger,
    ListOfBoolean,
    ListOfLong,
}

impl AttributeType {
    pub const ALL: [AttributeType; 10] = [
        AttributeType::String,
        AttributeType::Integer,
        AttributeType::Double,
        AttributeType::Boolean,
        AttributeType::Long,
        AttributeType::ListOfString,
        AttributeType::ListOfDouble,
        AttributeType::ListOfInteger,
        AttributeType::ListOfBoolean,
        AttributeType::ListOfLong,
    ];

    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AttributeType::String => "string",
            AttributeType::Integer => "integer",
            AttributeType::Double => "double",
            AttributeType::Boolean => "boolean",
            AttributeType::Long => "long",
            AttributeType::ListOfString => "list_of_string",
            AttributeType::ListOfDouble => "list_of_double",
            AttributeType::ListOfInteger => "list_of_integer",
            AttributeType::ListOfBoolean => "list_of_boolean",
            AttributeType::ListOfLong => "list_of_long",
        }
    }

    pub fn is_list(self) -> bool {
        self.element_type() != self
    }

    /// Numeric scalar types are the only ones continuous mappings accept.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            AttributeType::Integer | AttributeType::Double | AttributeType::Long
        )
    }

    /// The scalar type of list elements; scalars return themselves.
    pub fn element_type(self) -> AttributeType {
        match self {
            AttributeType::ListOfString => AttributeType::String,
            AttributeType::ListOfDouble => AttributeType::Double,
            AttributeType::ListOfInteger => AttributeType::Integer,
            AttributeType::ListOfBoolean => AttributeType::Boolean,
            AttributeType::ListOfLong => AttributeType::Long,
            scalar => scalar,
        }
    }

    /// The narrowest type holding values of both `self` and `other`, when one exists.
    ///
    /// Integers widen to long and to double; list types widen element-wise.
    pub fn widen(self, other: AttributeType) -> Option<AttributeType> {
        use AttributeType::*;
        if self == other {
            return Some(self);
        }
        if self.is_list() != other.is_list() {
            return None;
        }
        let widened = match (self.element_type(), other.element_type()) {
            (a, b) if a == b => a,
            (Integer, Long) | (Long, Integer) => Long,
            (Integer | Long, Double) | (Double, Integer | Long) => Double,
            _ => return None,
        };
        Some(if self.is_list() { widened.list_of() } else { widened })
    }

    fn list_of(self) -> AttributeType {
        match self {
            AttributeType::String => AttributeType::ListOfString,
            AttributeType::Double => AttributeType::ListOfDouble,
            AttributeType::Integer => AttributeType::ListOfInteger,
            AttributeType::Boolean => AttributeType::ListOfBoolean,
            AttributeType::Long => AttributeType::ListOfLong,
            list => list,
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_integral_number(value: &Value) -> bool {
    match value {
        Value::Number(n) => {
            n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
        }
        _ => false,
    }
}

/// Returns `true` when `value` conforms to the declared attribute type.
///
/// `null` is accepted for every type. Integral floats (`2.0`) are accepted for `integer`/`long`,
/// matching how JSON producers commonly encode whole numbers.
pub fn is_valid_data_type(value: &Value, ty: AttributeType) -> bool {
    if value.is_null() {
        return true;
    }
    match ty {
        AttributeType::String => value.is_string(),
        AttributeType::Integer | AttributeType::Long => is_integral_number(value),
        AttributeType::Double => value.is_number(),
        AttributeType::Boolean => value.is_boolean(),
        list => match value {
            Value::Array(items) => items
                .iter()
                .all(|item| is_valid_data_type(item, list.element_type())),
            _ => false,
        },
    }
}

/// A typed attribute value held in table rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    List(Vec<AttributeValue>),
}

impl AttributeValue {
    /// Converts a JSON value; `null` and objects have no attribute representation.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null | Value::Object(_) => None,
            Value::Bool(b) => Some(Self::Boolean(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Self::Integer(i)),
                None => n.as_f64().map(Self::Double),
            },
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Array(items) => Some(Self::List(
                items.iter().filter_map(Self::from_json).collect(),
            )),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Boolean(b) => Value::Bool(*b),
            Self::Integer(i) => Value::from(*i),
            Self::Double(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::String(s) => Value::String(s.clone()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
        }
    }

    /// Coerces numeric encodings to the declared type (`1` for a `double` column becomes `1.0`,
    /// `2.0` for an `integer` column becomes `2`). Values of other shapes are returned unchanged.
    pub fn coerce(self, ty: AttributeType) -> Self {
        match (self, ty.element_type()) {
            (Self::List(items), _) if ty.is_list() => {
                Self::List(items.into_iter().map(|v| v.coerce(ty.element_type())).collect())
            }
            (Self::Integer(i), AttributeType::Double) => Self::Double(i as f64),
            (Self::Double(f), AttributeType::Integer | AttributeType::Long)
                if f.fract() == 0.0 && f.is_finite() =>
            {
                Self::Integer(f as i64)
            }
            (v, _) => v,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Double(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Best-effort type inference for attributes that appear without a declaration.
    pub fn infer_type(&self) -> AttributeType {
        match self {
            Self::Boolean(_) => AttributeType::Boolean,
            Self::Integer(_) => AttributeType::Integer,
            Self::Double(_) => AttributeType::Double,
            Self::String(_) => AttributeType::String,
            Self::List(items) => items
                .first()
                .map(|first| first.infer_type().list_of())
                .unwrap_or(AttributeType::ListOfString),
        }
    }

    /// Normalized lookup key for discrete mappings; lists have none.
    pub fn map_key(&self) -> Option<MapKey> {
        match self {
            Self::Boolean(b) => Some(MapKey::Boolean(*b)),
            Self::Integer(i) => Some(MapKey::Integer(*i)),
            Self::Double(f) => Some(MapKey::from_f64(*f)),
            Self::String(s) => Some(MapKey::String(s.clone())),
            Self::List(_) => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::String(s) => f.write_str(s),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

/// Hashable form of a scalar attribute value.
///
/// Numbers with an integral value normalize to [`MapKey::Integer`] so `1` and `1.0` hit the same
/// discrete-mapping entry, while the string `"1"` stays distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    String(String),
    Integer(i64),
    Float(u64),
    Boolean(bool),
}

impl MapKey {
    pub fn from_f64(f: f64) -> Self {
        if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
            MapKey::Integer(f as i64)
        } else {
            MapKey::Float(f.to_bits())
        }
    }

    pub fn from_json(value: &Value) -> Option<Self> {
        AttributeValue::from_json(value).and_then(|v| v.map_key())
    }

    pub fn to_json(&self) -> Value {
        match self {
            MapKey::String(s) => Value::String(s.clone()),
            MapKey::Integer(i) => Value::from(*i),
            MapKey::Float(bits) => serde_json::Number::from_f64(f64::from_bits(*bits))
                .map(Value::Number)
                .unwrap_or(Value::Null),
            MapKey::Boolean(b) => Value::Bool(*b),
        }
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::String(s) => f.write_str(s),
            MapKey::Integer(i) => write!(f, "{i}"),
            MapKey::Float(bits) => write!(f, "{}", f64::from_bits(*bits)),
            MapKey::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl Serialize for MapKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VisualPropertyValueType {
    Color,
    NodeShape,
    LineStyle,
    EdgeArrowShape,
    Font,
    HorizontalAlign,
    VerticalAlign,
    Visibility,
    Number,
    Boolean,
    String,
    LabelPosition,
}

pub const NODE_SHAPES: &[&str] = &[
    "ellipse",
    "rectangle",
    "round-rectangle",
    "triangle",
    "round-triangle",
    "diamond",
    "round-diamond",
    "hexagon",
    "round-hexagon",
    "octagon",
    "round-octagon",
    "parallelogram",
    "vee",
];

pub const LINE_STYLES: &[&str] = &["solid", "dotted", "dashed", "double"];

pub const ARROW_SHAPES: &[&str] = &[
    "none",
    "triangle",
    "triangle-tee",
    "circle-triangle",
    "triangle-cross",
    "triangle-backcurve",
    "vee",
    "tee",
    "square",
    "circle",
    "diamond",
    "chevron",
];

pub const HORIZONTAL_ALIGNS: &[&str] = &["left", "center", "right"];
pub const VERTICAL_ALIGNS: &[&str] = &["top", "center", "bottom"];
pub const VISIBILITIES: &[&str] = &["element", "none"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontFace {
    pub family: String,
    pub style: String,
    pub weight: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Default for FontFace {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            style: "normal".to_string(),
            weight: "normal".to_string(),
            name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelPosition {
    pub horizontal_align: String,
    pub vertical_align: String,
    pub horizontal_anchor: String,
    pub vertical_anchor: String,
    pub justification: String,
    pub margin_x: f64,
    pub margin_y: f64,
}

impl Default for LabelPosition {
    fn default() -> Self {
        Self {
            horizontal_align: "center".to_string(),
            vertical_align: "center".to_string(),
            horizontal_anchor: "center".to_string(),
            vertical_anchor: "center".to_string(),
            justification: "center".to_string(),
            margin_x: 0.0,
            margin_y: 0.0,
        }
    }
}

impl LabelPosition {
    fn is_valid(&self) -> bool {
        HORIZONTAL_ALIGNS.contains(&self.horizontal_align.as_str())
            && HORIZONTAL_ALIGNS.contains(&self.horizontal_anchor.as_str())
            && HORIZONTAL_ALIGNS.contains(&self.justification.as_str())
            && VERTICAL_ALIGNS.contains(&self.vertical_align.as_str())
            && VERTICAL_ALIGNS.contains(&self.vertical_anchor.as_str())
            && self.margin_x.is_finite()
            && self.margin_y.is_finite()
    }
}

/// A resolved (or default / bypass / mapped) visual property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VisualPropertyValue {
    Number(f64),
    Boolean(bool),
    String(String),
    Font(FontFace),
    LabelPosition(LabelPosition),
}

impl VisualPropertyValue {
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Passthrough conversion: scalars keep their kind, lists are joined with `,`.
    pub fn from_attribute(value: &AttributeValue) -> Self {
        match value {
            AttributeValue::Boolean(b) => Self::Boolean(*b),
            AttributeValue::Integer(i) => Self::Number(*i as f64),
            AttributeValue::Double(f) => Self::Number(*f),
            AttributeValue::String(s) => Self::String(s.clone()),
            list @ AttributeValue::List(_) => Self::String(list.to_string()),
        }
    }
}

/// Returns `true` when `value` is a legal value for a property of type `ty`.
pub fn is_valid_vp_value(value: &VisualPropertyValue, ty: VisualPropertyValueType) -> bool {
    use VisualPropertyValueType as T;

    let one_of = |allowed: &[&str]| value.as_str().is_some_and(|s| allowed.contains(&s));
    match ty {
        T::Color => value.as_str().is_some_and(|s| color::parse_hex(s).is_some()),
        T::NodeShape => one_of(NODE_SHAPES),
        T::LineStyle => one_of(LINE_STYLES),
        T::EdgeArrowShape => one_of(ARROW_SHAPES),
        T::HorizontalAlign => one_of(HORIZONTAL_ALIGNS),
        T::VerticalAlign => one_of(VERTICAL_ALIGNS),
        T::Visibility => one_of(VISIBILITIES),
        T::Font => matches!(value, VisualPropertyValue::Font(_)),
        T::Number => value.as_f64().is_some_and(f64::is_finite),
        T::Boolean => matches!(value, VisualPropertyValue::Boolean(_)),
        T::String => matches!(value, VisualPropertyValue::String(_)),
        T::LabelPosition => match value {
            VisualPropertyValue::LabelPosition(pos) => pos.is_valid(),
            _ => false,
        },
    }
}
