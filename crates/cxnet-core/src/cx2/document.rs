use super::aspects::*;
use crate::{Error, Result};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// One top-level entry of a CX2 document.
#[derive(Debug, Clone, PartialEq)]
pub enum Cx2Entry {
    /// The `{CXVersion, hasFragments?}` object at index 0.
    Preamble(Map<String, Value>),
    /// A single-key object whose value is an array.
    Aspect { tag: String, elements: Vec<Value> },
    /// Anything else; kept so validation can point at it.
    Malformed(Value),
}

/// A CX2 document parsed once into ordered entries plus a `tag -> entry positions` index.
///
/// Aspects may be split into several fragments with the same tag; [`Cx2Document::aspect_elements`]
/// concatenates them in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cx2Document {
    entries: Vec<Cx2Entry>,
    index: IndexMap<String, Vec<usize>>,
}

impl Cx2Document {
    /// Parses any JSON array. Entries that do not match the aspect shape become
    /// [`Cx2Entry::Malformed`] instead of failing the whole parse.
    pub fn parse(value: &Value) -> Result<Self> {
        let Value::Array(items) = value else {
            return Err(Error::NotAnArray);
        };

        let mut entries = Vec::with_capacity(items.len());
        let mut index: IndexMap<String, Vec<usize>> = IndexMap::new();
        for (pos, item) in items.iter().enumerate() {
            let entry = classify_entry(pos, item);
            if let Cx2Entry::Aspect { tag, .. } = &entry {
                index.entry(tag.clone()).or_default().push(pos);
            }
            entries.push(entry);
        }
        Ok(Self { entries, index })
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::parse(&value)
    }

    pub fn entries(&self) -> &[Cx2Entry] {
        &self.entries
    }

    pub fn preamble(&self) -> Option<&Map<String, Value>> {
        match self.entries.first() {
            Some(Cx2Entry::Preamble(p)) => Some(p),
            _ => None,
        }
    }

    pub fn version(&self) -> Option<&str> {
        self.preamble()?.get("CXVersion")?.as_str()
    }

    pub fn has_aspect(&self, tag: &str) -> bool {
        self.index.contains_key(tag)
    }

    /// Aspect tags in order of first appearance.
    pub fn aspect_tags(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Returns the elements of the first aspect owning `tag`.
    pub fn find_aspect(&self, tag: &str) -> Option<&[Value]> {
        let first = *self.index.get(tag)?.first()?;
        match &self.entries[first] {
            Cx2Entry::Aspect { elements, .. } => Some(elements.as_slice()),
            _ => None,
        }
    }

    /// All elements carried under `tag`, across fragments.
    pub fn aspect_elements(&self, tag: &str) -> impl Iterator<Item = &Value> {
        self.index
            .get(tag)
            .into_iter()
            .flatten()
            .filter_map(|&pos| match &self.entries[pos] {
                Cx2Entry::Aspect { elements, .. } => Some(elements.iter()),
                _ => None,
            })
            .flatten()
    }

    pub fn aspect_len(&self, tag: &str) -> usize {
        self.aspect_elements(tag).count()
    }

    fn typed<T: DeserializeOwned>(&self, tag: &str) -> Vec<T> {
        self.aspect_elements(tag)
            .enumerate()
            .filter_map(|(i, element)| match T::deserialize(element) {
                Ok(v) => Some(v),
                Err(err) => {
                    tracing::debug!(aspect = tag, index = i, %err, "skipping malformed element");
                    None
                }
            })
            .collect()
    }

    pub fn nodes(&self) -> Vec<Cx2Node> {
        self.typed(NODES)
    }

    pub fn edges(&self) -> Vec<Cx2Edge> {
        self.typed(EDGES)
    }

    /// Network attributes merged into one map (CX2 carries them as a one-element aspect).
    pub fn network_attributes(&self) -> Map<String, Value> {
        let mut out = Map::new();
        for element in self.aspect_elements(NETWORK_ATTRIBUTES) {
            if let Value::Object(obj) = element {
                out.extend(obj.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
        out
    }

    pub fn attribute_declarations(&self) -> AttributeDeclarations {
        self.typed::<AttributeDeclarations>(ATTRIBUTE_DECLARATIONS)
            .into_iter()
            .next()
            .unwrap_or_default()
    }

    pub fn visual_properties(&self) -> Cx2VisualProperties {
        self.typed::<Cx2VisualProperties>(VISUAL_PROPERTIES)
            .into_iter()
            .next()
            .unwrap_or_default()
    }

    pub fn node_bypasses(&self) -> Vec<Cx2Bypass> {
        self.typed(NODE_BYPASSES)
    }

    pub fn edge_bypasses(&self) -> Vec<Cx2Bypass> {
        self.typed(EDGE_BYPASSES)
    }

    pub fn metadata(&self) -> Vec<Cx2MetaData> {
        self.typed(METADATA)
    }

    pub fn visual_editor_properties(&self) -> Cx2VisualEditorProperties {
        self.typed::<Cx2VisualEditorProperties>(VISUAL_EDITOR_PROPERTIES)
            .into_iter()
            .next()
            .unwrap_or_default()
    }

    pub fn status(&self) -> Vec<Cx2Status> {
        self.typed(STATUS)
    }

    /// Aspects without a typed model here, in document order, fragments kept separate.
    pub fn opaque_aspects(&self) -> Vec<(String, Vec<Value>)> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                Cx2Entry::Aspect { tag, elements } if !KNOWN_ASPECTS.contains(&tag.as_str()) => {
                    Some((tag.clone(), elements.clone()))
                }
                _ => None,
            })
            .collect()
    }
}

fn classify_entry(pos: usize, item: &Value) -> Cx2Entry {
    let Value::Object(obj) = item else {
        return Cx2Entry::Malformed(item.clone());
    };
    if pos == 0 && obj.contains_key("CXVersion") {
        return Cx2Entry::Preamble(obj.clone());
    }
    if obj.len() != 1 {
        return Cx2Entry::Malformed(item.clone());
    }
    match obj.iter().next() {
        Some((tag, Value::Array(elements))) => Cx2Entry::Aspect {
            tag: tag.clone(),
            elements: elements.clone(),
        },
        _ => Cx2Entry::Malformed(item.clone()),
    }
}
