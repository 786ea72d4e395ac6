//! Visual style: one [`VisualProperty`] per member of the closed [`VisualPropertyName`] set.

mod catalogue;
pub mod cx2;

pub use catalogue::{CX2_NAME_TABLE, VisualPropertyGroup, VisualPropertyInfo, VisualPropertyName};

use crate::mapping::MappingFunction;
use crate::value::{VisualPropertyValue, VisualPropertyValueType, is_valid_vp_value};
use crate::{Error, Result};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualProperty {
    pub name: VisualPropertyName,
    pub group: VisualPropertyGroup,
    pub display_name: &'static str,
    #[serde(rename = "type")]
    pub value_type: VisualPropertyValueType,
    pub default_value: VisualPropertyValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping: Option<MappingFunction>,
    pub bypass_map: IndexMap<String, VisualPropertyValue>,
}

impl VisualProperty {
    pub fn new(name: VisualPropertyName) -> Self {
        let info = name.info();
        Self {
            name,
            group: info.group,
            display_name: info.display_name,
            value_type: info.value_type,
            default_value: name.default_value(),
            mapping: None,
            bypass_map: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisualStyle {
    // Indexed by `VisualPropertyName as usize`; always complete.
    properties: Vec<VisualProperty>,
}

impl Default for VisualStyle {
    fn default() -> Self {
        Self {
            properties: VisualPropertyName::ALL
                .iter()
                .copied()
                .map(VisualProperty::new)
                .collect(),
        }
    }
}

impl VisualStyle {
    pub fn get(&self, name: VisualPropertyName) -> &VisualProperty {
        &self.properties[name as usize]
    }

    pub fn get_mut(&mut self, name: VisualPropertyName) -> &mut VisualProperty {
        &mut self.properties[name as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &VisualProperty> {
        self.properties.iter()
    }

    pub fn in_group(&self, group: VisualPropertyGroup) -> impl Iterator<Item = &VisualProperty> {
        self.properties.iter().filter(move |vp| vp.group == group)
    }

    fn check_value(name: VisualPropertyName, value: &VisualPropertyValue) -> Result<()> {
        if is_valid_vp_value(value, name.value_type()) {
            Ok(())
        } else {
            Err(Error::InvalidVisualPropertyValue {
                name: name.as_str().to_string(),
                value: value.clone(),
            })
        }
    }

    pub fn set_default(&mut self, name: VisualPropertyName, value: VisualPropertyValue) -> Result<()> {
        Self::check_value(name, &value)?;
        self.get_mut(name).default_value = value;
        Ok(())
    }

    /// Sets the same bypass value on every listed element.
    ///
    /// Callers are responsible for passing ids of existing elements of the property's group.
    pub fn set_bypass<'a>(
        &mut self,
        name: VisualPropertyName,
        element_ids: impl IntoIterator<Item = &'a str>,
        value: VisualPropertyValue,
    ) -> Result<()> {
        Self::check_value(name, &value)?;
        let vp = self.get_mut(name);
        for id in element_ids {
            vp.bypass_map.insert(id.to_string(), value.clone());
        }
        Ok(())
    }

    pub fn delete_bypass<'a>(
        &mut self,
        name: VisualPropertyName,
        element_ids: impl IntoIterator<Item = &'a str>,
    ) {
        let vp = self.get_mut(name);
        for id in element_ids {
            vp.bypass_map.shift_remove(id);
        }
    }

    pub fn set_mapping(&mut self, name: VisualPropertyName, mapping: MappingFunction) {
        self.get_mut(name).mapping = Some(mapping);
    }

    pub fn remove_mapping(&mut self, name: VisualPropertyName) -> Option<MappingFunction> {
        self.get_mut(name).mapping.take()
    }

    /// Drops bypasses of deleted elements from every property in `group`.
    pub fn forget_elements(&mut self, group: VisualPropertyGroup, element_ids: &[String]) {
        for vp in self.properties.iter_mut().filter(|vp| vp.group == group) {
            for id in element_ids {
                vp.bypass_map.shift_remove(id);
            }
        }
    }
}

impl Serialize for VisualStyle {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.properties.len()))?;
        for vp in &self.properties {
            map.serialize_entry(vp.name.as_str(), vp)?;
        }
        map.end()
    }
}
