//! The closed set of visual properties and the internal ↔ CX2 name table.

use crate::value::{FontFace, LabelPosition, VisualPropertyValue, VisualPropertyValueType};
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualPropertyGroup {
    Node,
    Edge,
    Network,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualPropertyInfo {
    pub name: VisualPropertyName,
    pub internal: &'static str,
    pub cx: &'static str,
    pub group: VisualPropertyGroup,
    pub display_name: &'static str,
    pub value_type: VisualPropertyValueType,
}

macro_rules! visual_property_catalogue {
    ($($variant:ident => $internal:literal, $cx:literal, $group:ident, $display:literal, $ty:ident;)*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum VisualPropertyName {
            $($variant,)*
        }

        impl VisualPropertyName {
            pub const ALL: &'static [VisualPropertyName] = &[$(VisualPropertyName::$variant,)*];
        }

        /// Indexed by `VisualPropertyName as usize`.
        pub static CX2_NAME_TABLE: &[VisualPropertyInfo] = &[
            $(VisualPropertyInfo {
                name: VisualPropertyName::$variant,
                internal: $internal,
                cx: $cx,
                group: VisualPropertyGroup::$group,
                display_name: $display,
                value_type: VisualPropertyValueType::$ty,
            },)*
        ];
    };
}

visual_property_catalogue! {
    NodeShape => "nodeShape", "NODE_SHAPE", Node, "Shape", NodeShape;
    NodeBackgroundColor => "nodeBackgroundColor", "NODE_BACKGROUND_COLOR", Node, "Fill Color", Color;
    NodeBackgroundOpacity => "nodeBackgroundOpacity", "NODE_BACKGROUND_OPACITY", Node, "Opacity", Number;
    NodeWidth => "nodeWidth", "NODE_WIDTH", Node, "Width", Number;
    NodeHeight => "nodeHeight", "NODE_HEIGHT", Node, "Height", Number;
    NodeBorderColor => "nodeBorderColor", "NODE_BORDER_COLOR", Node, "Border Color", Color;
    NodeBorderWidth => "nodeBorderWidth", "NODE_BORDER_WIDTH", Node, "Border Width", Number;
    NodeBorderOpacity => "nodeBorderOpacity", "NODE_BORDER_OPACITY", Node, "Border Opacity", Number;
    NodeBorderLineType => "nodeBorderLineType", "NODE_BORDER_STYLE", Node, "Border Line Type", LineStyle;
    NodeLabel => "nodeLabel", "NODE_LABEL", Node, "Label", String;
    NodeLabelColor => "nodeLabelColor", "NODE_LABEL_COLOR", Node, "Label Color", Color;
    NodeLabelFontSize => "nodeLabelFontSize", "NODE_LABEL_FONT_SIZE", Node, "Label Font Size", Number;
    NodeLabelFontFace => "nodeLabelFontFace", "NODE_LABEL_FONT_FACE", Node, "Label Font", Font;
    NodeLabelPosition => "nodeLabelPosition", "NODE_LABEL_POSITION", Node, "Label Position", LabelPosition;
    NodeLabelOpacity => "nodeLabelOpacity", "NODE_LABEL_OPACITY", Node, "Label Opacity", Number;
    NodeLabelRotation => "nodeLabelRotation", "NODE_LABEL_ROTATION", Node, "Label Rotation", Number;
    NodeLabelMaxWidth => "nodeLabelMaxWidth", "NODE_LABEL_MAX_WIDTH", Node, "Label Max Width", Number;
    NodeVisibility => "nodeVisibility", "NODE_VISIBILITY", Node, "Visibility", Visibility;
    NodeSelectedPaint => "nodeSelectedPaint", "NODE_SELECTED_PAINT", Node, "Selected Color", Color;
    NodeZOrder => "nodeZOrder", "NODE_Z_LOCATION", Node, "Z Order", Number;
    EdgeLineColor => "edgeLineColor", "EDGE_LINE_COLOR", Edge, "Line Color", Color;
    EdgeLineType => "edgeLineType", "EDGE_LINE_STYLE", Edge, "Line Type", LineStyle;
    EdgeOpacity => "edgeOpacity", "EDGE_OPACITY", Edge, "Opacity", Number;
    EdgeWidth => "edgeWidth", "EDGE_WIDTH", Edge, "Width", Number;
    EdgeSourceArrowShape => "edgeSourceArrowShape", "EDGE_SOURCE_ARROW_SHAPE", Edge, "Source Arrow Shape", EdgeArrowShape;
    EdgeSourceArrowColor => "edgeSourceArrowColor", "EDGE_SOURCE_ARROW_COLOR", Edge, "Source Arrow Color", Color;
    EdgeTargetArrowShape => "edgeTargetArrowShape", "EDGE_TARGET_ARROW_SHAPE", Edge, "Target Arrow Shape", EdgeArrowShape;
    EdgeTargetArrowColor => "edgeTargetArrowColor", "EDGE_TARGET_ARROW_COLOR", Edge, "Target Arrow Color", Color;
    EdgeLabel => "edgeLabel", "EDGE_LABEL", Edge, "Label", String;
    EdgeLabelColor => "edgeLabelColor", "EDGE_LABEL_COLOR", Edge, "Label Color", Color;
    EdgeLabelFontSize => "edgeLabelFontSize", "EDGE_LABEL_FONT_SIZE", Edge, "Label Font Size", Number;
    EdgeLabelFontFace => "edgeLabelFontFace", "EDGE_LABEL_FONT_FACE", Edge, "Label Font", Font;
    EdgeLabelOpacity => "edgeLabelOpacity", "EDGE_LABEL_OPACITY", Edge, "Label Opacity", Number;
    EdgeLabelRotation => "edgeLabelRotation", "EDGE_LABEL_ROTATION", Edge, "Label Rotation", Number;
    EdgeLabelMaxWidth => "edgeLabelMaxWidth", "EDGE_LABEL_MAX_WIDTH", Edge, "Label Max Width", Number;
    EdgeVisibility => "edgeVisibility", "EDGE_VISIBILITY", Edge, "Visibility", Visibility;
    EdgeSelectedPaint => "edgeSelectedPaint", "EDGE_SELECTED_PAINT", Edge, "Selected Color", Color;
    EdgeZOrder => "edgeZOrder", "EDGE_Z_LOCATION", Edge, "Z Order", Number;
    NetworkBackgroundColor => "networkBackgroundColor", "NETWORK_BACKGROUND_COLOR", Network, "Background Color", Color;
}

impl VisualPropertyName {
    pub fn info(self) -> &'static VisualPropertyInfo {
        &CX2_NAME_TABLE[self as usize]
    }

    pub fn as_str(self) -> &'static str {
        self.info().internal
    }

    pub fn cx_name(self) -> &'static str {
        self.info().cx
    }

    pub fn group(self) -> VisualPropertyGroup {
        self.info().group
    }

    pub fn value_type(self) -> VisualPropertyValueType {
        self.info().value_type
    }

    pub fn from_cx_name(name: &str) -> Option<Self> {
        CX2_NAME_TABLE
            .iter()
            .find(|info| info.cx == name)
            .map(|info| info.name)
    }

    pub fn in_group(group: VisualPropertyGroup) -> impl Iterator<Item = VisualPropertyName> {
        Self::ALL.iter().copied().filter(move |n| n.group() == group)
    }

    pub fn default_value(self) -> VisualPropertyValue {
        use VisualPropertyName as N;
        use VisualPropertyValue as V;

        match self {
            N::NodeShape => V::string("round-rectangle"),
            N::NodeBackgroundColor => V::string("#89D0F5"),
            N::NodeWidth => V::Number(75.0),
            N::NodeHeight => V::Number(35.0),
            N::NodeBorderColor => V::string("#CCCCCC"),
            N::NodeBorderWidth => V::Number(1.0),
            N::NodeBorderLineType | N::EdgeLineType => V::string("solid"),
            N::NodeLabel | N::EdgeLabel => V::string(""),
            N::NodeLabelColor | N::EdgeLabelColor => V::string("#000000"),
            N::NodeLabelFontSize => V::Number(12.0),
            N::EdgeLabelFontSize => V::Number(10.0),
            N::NodeLabelFontFace | N::EdgeLabelFontFace => V::Font(FontFace::default()),
            N::NodeLabelPosition => V::LabelPosition(LabelPosition::default()),
            N::NodeBackgroundOpacity
            | N::NodeBorderOpacity
            | N::NodeLabelOpacity
            | N::EdgeOpacity
            | N::EdgeLabelOpacity => V::Number(1.0),
            N::NodeLabelRotation | N::EdgeLabelRotation => V::Number(0.0),
            N::NodeLabelMaxWidth | N::EdgeLabelMaxWidth => V::Number(200.0),
            N::NodeVisibility | N::EdgeVisibility => V::string("element"),
            N::NodeSelectedPaint => V::string("#FFFF00"),
            N::EdgeSelectedPaint => V::string("#FF0000"),
            N::NodeZOrder | N::EdgeZOrder => V::Number(0.0),
            N::EdgeLineColor => V::string("#848484"),
            N::EdgeWidth => V::Number(2.0),
            N::EdgeSourceArrowShape | N::EdgeTargetArrowShape => V::string("none"),
            N::EdgeSourceArrowColor | N::EdgeTargetArrowColor => V::string("#000000"),
            N::NetworkBackgroundColor => V::string("#FFFFFF"),
        }
    }
}

impl std::fmt::Display for VisualPropertyName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for VisualPropertyName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
