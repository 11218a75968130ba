use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::content::{MapDocument, Texture};

use super::math::Vec2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComponentError {
    #[error("component not found with id: {id}")]
    NotFound { id: String },
}

/// The kinds of value a component slot can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Vec2,
    F32,
    I32,
    Bool,
    Str,
    Texture,
    Map,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Vec2 => "vec2",
            ValueKind::F32 => "f32",
            ValueKind::I32 => "i32",
            ValueKind::Bool => "bool",
            ValueKind::Str => "str",
            ValueKind::Texture => "texture",
            ValueKind::Map => "map",
        };
        f.write_str(name)
    }
}

/// A tagged slot value. Reads through the typed accessors warn on a kind
/// mismatch and fall back to a numeric conversion where one exists.
#[derive(Debug, Clone)]
pub enum ComponentValue {
    Vec2(Vec2),
    F32(f32),
    I32(i32),
    Bool(bool),
    Str(String),
    Texture(Texture),
    Map(Arc<MapDocument>),
}

impl ComponentValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            ComponentValue::Vec2(_) => ValueKind::Vec2,
            ComponentValue::F32(_) => ValueKind::F32,
            ComponentValue::I32(_) => ValueKind::I32,
            ComponentValue::Bool(_) => ValueKind::Bool,
            ComponentValue::Str(_) => ValueKind::Str,
            ComponentValue::Texture(_) => ValueKind::Texture,
            ComponentValue::Map(_) => ValueKind::Map,
        }
    }
}

/// A named, typed state slot owned by exactly one entity.
#[derive(Debug, Clone)]
pub struct Component {
    id: String,
    value: ComponentValue,
}

impl Component {
    pub fn new(id: impl Into<String>, value: ComponentValue) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn value(&self) -> &ComponentValue {
        &self.value
    }

    /// Replaces the stored value and its recorded kind together.
    pub fn set(&mut self, value: ComponentValue) {
        self.value = value;
    }

    pub fn as_vec2(&self) -> Option<Vec2> {
        match &self.value {
            ComponentValue::Vec2(v) => Some(*v),
            other => {
                self.warn_mismatch(ValueKind::Vec2, other.kind());
                None
            }
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match &self.value {
            ComponentValue::F32(v) => Some(*v),
            ComponentValue::I32(v) => {
                self.warn_mismatch(ValueKind::F32, ValueKind::I32);
                Some(*v as f32)
            }
            other => {
                self.warn_mismatch(ValueKind::F32, other.kind());
                None
            }
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match &self.value {
            ComponentValue::I32(v) => Some(*v),
            ComponentValue::F32(v) => {
                self.warn_mismatch(ValueKind::I32, ValueKind::F32);
                Some(*v as i32)
            }
            other => {
                self.warn_mismatch(ValueKind::I32, other.kind());
                None
            }
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match &self.value {
            ComponentValue::Bool(v) => Some(*v),
            other => {
                self.warn_mismatch(ValueKind::Bool, other.kind());
                None
            }
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            ComponentValue::Str(v) => Some(v.as_str()),
            other => {
                self.warn_mismatch(ValueKind::Str, other.kind());
                None
            }
        }
    }

    pub fn as_texture(&self) -> Option<&Texture> {
        match &self.value {
            ComponentValue::Texture(v) => Some(v),
            other => {
                self.warn_mismatch(ValueKind::Texture, other.kind());
                None
            }
        }
    }

    pub fn as_map(&self) -> Option<&Arc<MapDocument>> {
        match &self.value {
            ComponentValue::Map(v) => Some(v),
            other => {
                self.warn_mismatch(ValueKind::Map, other.kind());
                None
            }
        }
    }

    fn warn_mismatch(&self, requested: ValueKind, stored: ValueKind) {
        warn!(
            component = self.id.as_str(),
            %requested,
            %stored,
            "component value read as mismatched kind"
        );
    }
}

/// The components of one entity. Ids are unique within the set; lookup is
/// first-match over insertion order.
#[derive(Debug, Clone, Default)]
pub struct ComponentSet {
    components: Vec<Component>,
}

impl ComponentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a component, replacing the value of an existing component
    /// with the same id rather than adding a duplicate.
    pub fn insert(&mut self, component: Component) {
        if let Some(existing) = self
            .components
            .iter_mut()
            .find(|c| c.id() == component.id())
        {
            existing.set(component.value);
        } else {
            self.components.push(component);
        }
    }

    pub fn get(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| c.id() == id)
    }

    pub fn require(&self, id: &str) -> Result<&Component, ComponentError> {
        self.get(id).ok_or_else(|| ComponentError::NotFound {
            id: id.to_string(),
        })
    }

    pub fn set(&mut self, id: &str, value: ComponentValue) {
        match self.get_mut(id) {
            Some(component) => component.set(value),
            None => self.components.push(Component::new(id, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_value_and_kind() {
        let mut component = Component::new("speed", ComponentValue::F32(200.0));
        assert_eq!(component.value().kind(), ValueKind::F32);

        component.set(ComponentValue::I32(5));
        assert_eq!(component.value().kind(), ValueKind::I32);
        assert_eq!(component.as_i32(), Some(5));
    }

    #[test]
    fn mismatched_numeric_read_warns_but_converts() {
        let component = Component::new("speed", ComponentValue::F32(3.9));

        // Kind mismatch is a warning condition, never a panic.
        assert_eq!(component.as_i32(), Some(3));
    }

    #[test]
    fn mismatched_non_numeric_read_returns_none() {
        let component = Component::new("position", ComponentValue::Vec2(Vec2::new(1.0, 2.0)));

        assert_eq!(component.as_f32(), None);
        assert_eq!(component.as_str(), None);
    }

    #[test]
    fn insert_replaces_existing_id_instead_of_duplicating() {
        let mut set = ComponentSet::new();
        set.insert(Component::new("position", ComponentValue::Vec2(Vec2::ZERO)));
        set.insert(Component::new(
            "position",
            ComponentValue::Vec2(Vec2::new(4.0, 5.0)),
        ));

        assert_eq!(set.len(), 1);
        assert_eq!(
            set.get("position").and_then(Component::as_vec2),
            Some(Vec2::new(4.0, 5.0))
        );
    }

    #[test]
    fn require_reports_missing_component() {
        let set = ComponentSet::new();

        assert!(matches!(
            set.require("font"),
            Err(ComponentError::NotFound { id }) if id == "font"
        ));
    }
}
