use std::any::Any;
use std::time::Duration;

use tracing::warn;

use crate::content::{ContentError, ResourceLoader};

use super::animation::AnimationState;
use super::component::{Component, ComponentSet, ComponentValue};
use super::input::InputSnapshot;
use super::math::{RectF, SizeF, Vec2};
use super::rendering::SpriteBatch;

pub const POSITION_COMPONENT: &str = "position";

/// Broad construction-time classification; never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Unknown,
    Display,
    Animation,
    Camera,
    Hud,
}

/// Draw ordering key. Variants are declared back-to-front; the derived
/// ordering is the draw ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DrawLayer {
    Base,
    Map,
    Actor0,
    Actor1,
    Actor2,
    Ui,
}

/// What an entity participates in. Computed once at construction and
/// recorded by the owning store, so per-frame dispatch never re-tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub content_loadable: bool,
    pub updatable: bool,
    pub drawable: bool,
}

impl Capabilities {
    pub const fn drawable_only() -> Self {
        Self {
            content_loadable: false,
            updatable: false,
            drawable: true,
        }
    }

    pub const fn all() -> Self {
        Self {
            content_loadable: true,
            updatable: true,
            drawable: true,
        }
    }
}

/// A scene-owned game object. The capability methods have inert defaults;
/// implementors override the ones their `capabilities()` advertise.
pub trait GameEntity: Any {
    fn id(&self) -> &str;

    fn kind(&self) -> EntityKind;

    fn capabilities(&self) -> Capabilities;

    fn components(&self) -> &ComponentSet;

    fn components_mut(&mut self) -> &mut ComponentSet;

    fn load_content(&mut self, _loader: &mut dyn ResourceLoader) -> Result<(), ContentError> {
        Ok(())
    }

    fn unload_content(&mut self) {}

    fn update(&mut self, _dt: Duration, _input: &InputSnapshot) {}

    fn draw(&self, _batch: &mut SpriteBatch<'_>) {}

    /// World-space AABB centered on the position component, sized by the
    /// current resource's pixel dimensions.
    fn bounding_rect(&self) -> RectF {
        RectF::default()
    }

    fn layer(&self) -> DrawLayer {
        DrawLayer::Base
    }

    /// Opting out of the scene's generic draw pass; the scene draws this
    /// entity itself from its own draw routine.
    fn custom_renderer(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

pub(crate) fn entity_position(components: &ComponentSet) -> Vec2 {
    components
        .get(POSITION_COMPONENT)
        .and_then(Component::as_vec2)
        .unwrap_or(Vec2::ZERO)
}

/// A static sprite: one texture, drawn centered on the position component.
pub struct DisplayEntity {
    id: String,
    components: ComponentSet,
    texture_key: String,
    layer: DrawLayer,
}

impl DisplayEntity {
    pub fn new(
        id: impl Into<String>,
        texture_key: impl Into<String>,
        position: Vec2,
        layer: DrawLayer,
    ) -> Self {
        let mut components = ComponentSet::new();
        components.insert(Component::new(POSITION_COMPONENT, ComponentValue::Vec2(position)));
        Self {
            id: id.into(),
            components,
            texture_key: texture_key.into(),
            layer,
        }
    }

    pub fn texture_key(&self) -> &str {
        &self.texture_key
    }

    pub fn position(&self) -> Vec2 {
        entity_position(&self.components)
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.components
            .set(POSITION_COMPONENT, ComponentValue::Vec2(position));
    }

    fn texture_size(&self) -> SizeF {
        self.components
            .get(&self.texture_key)
            .and_then(Component::as_texture)
            .map(|texture| texture.size())
            .unwrap_or_default()
    }
}

impl GameEntity for DisplayEntity {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Display
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            content_loadable: true,
            updatable: false,
            drawable: true,
        }
    }

    fn components(&self) -> &ComponentSet {
        &self.components
    }

    fn components_mut(&mut self) -> &mut ComponentSet {
        &mut self.components
    }

    fn load_content(&mut self, loader: &mut dyn ResourceLoader) -> Result<(), ContentError> {
        let texture = loader.load_texture(&self.texture_key)?;
        self.components.insert(Component::new(
            self.texture_key.clone(),
            ComponentValue::Texture(texture),
        ));
        Ok(())
    }

    fn draw(&self, batch: &mut SpriteBatch<'_>) {
        let Some(texture) = self
            .components
            .get(&self.texture_key)
            .and_then(Component::as_texture)
        else {
            warn!(entity = self.id.as_str(), texture = self.texture_key.as_str(), "draw skipped, texture not loaded");
            return;
        };
        let bounds = self.bounding_rect();
        batch.draw_texture(texture, Vec2::new(bounds.x, bounds.y), None);
    }

    fn bounding_rect(&self) -> RectF {
        RectF::centered_at(self.position(), self.texture_size())
    }

    fn layer(&self) -> DrawLayer {
        self.layer
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A sprite-sheet entity driven by an animation state machine. The sheet's
/// frame count is derived at content load from sheet width over frame width.
pub struct AnimatedDisplayEntity {
    id: String,
    components: ComponentSet,
    texture_key: String,
    layer: DrawLayer,
    animation: AnimationState,
}

impl AnimatedDisplayEntity {
    pub fn new(
        id: impl Into<String>,
        texture_key: impl Into<String>,
        position: Vec2,
        layer: DrawLayer,
        frame_size: SizeF,
    ) -> Self {
        let mut components = ComponentSet::new();
        components.insert(Component::new(POSITION_COMPONENT, ComponentValue::Vec2(position)));
        Self {
            id: id.into(),
            components,
            texture_key: texture_key.into(),
            layer,
            animation: AnimationState::new(frame_size),
        }
    }

    pub fn texture_key(&self) -> &str {
        &self.texture_key
    }

    pub fn position(&self) -> Vec2 {
        entity_position(&self.components)
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.components
            .set(POSITION_COMPONENT, ComponentValue::Vec2(position));
    }

    pub fn animation(&self) -> &AnimationState {
        &self.animation
    }

    pub fn animation_mut(&mut self) -> &mut AnimationState {
        &mut self.animation
    }
}

impl GameEntity for AnimatedDisplayEntity {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Animation
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::all()
    }

    fn components(&self) -> &ComponentSet {
        &self.components
    }

    fn components_mut(&mut self) -> &mut ComponentSet {
        &mut self.components
    }

    fn load_content(&mut self, loader: &mut dyn ResourceLoader) -> Result<(), ContentError> {
        let texture = loader.load_texture(&self.texture_key)?;
        let frame_width = self.animation.def().frame_size.width;
        if frame_width > 0.0 {
            let frame_count = (texture.width() as f32 / frame_width).floor() as u32;
            self.animation.def_mut().frame_count = frame_count.max(1);
        }
        self.components.insert(Component::new(
            self.texture_key.clone(),
            ComponentValue::Texture(texture),
        ));
        Ok(())
    }

    fn update(&mut self, dt: Duration, _input: &InputSnapshot) {
        self.animation.advance(dt);
    }

    fn draw(&self, batch: &mut SpriteBatch<'_>) {
        let Some(texture) = self
            .components
            .get(&self.texture_key)
            .and_then(Component::as_texture)
        else {
            warn!(entity = self.id.as_str(), texture = self.texture_key.as_str(), "draw skipped, texture not loaded");
            return;
        };
        let bounds = self.bounding_rect();
        batch.draw_texture(
            texture,
            Vec2::new(bounds.x, bounds.y),
            Some(self.animation.source_rect()),
        );
    }

    fn bounding_rect(&self) -> RectF {
        RectF::centered_at(self.position(), self.animation.def().frame_size)
    }

    fn layer(&self) -> DrawLayer {
        self.layer
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_layers_order_back_to_front() {
        assert!(DrawLayer::Base < DrawLayer::Map);
        assert!(DrawLayer::Map < DrawLayer::Actor0);
        assert!(DrawLayer::Actor2 < DrawLayer::Ui);
    }

    #[test]
    fn display_entity_bounds_center_on_position() {
        let mut entity = DisplayEntity::new(
            "logo",
            "logo.png",
            Vec2::new(100.0, 50.0),
            DrawLayer::Ui,
        );
        entity.components_mut().insert(Component::new(
            "logo.png",
            ComponentValue::Texture(crate::content::Texture::from_rgba8(
                4,
                2,
                vec![0; 4 * 2 * 4],
            )),
        ));

        assert_eq!(entity.bounding_rect(), RectF::new(98.0, 49.0, 4.0, 2.0));
    }

    #[test]
    fn animated_entity_bounds_use_frame_size_not_sheet_size() {
        let entity = AnimatedDisplayEntity::new(
            "hero",
            "hero.png",
            Vec2::new(32.0, 32.0),
            DrawLayer::Actor1,
            SizeF::new(16.0, 16.0),
        );

        assert_eq!(entity.bounding_rect(), RectF::new(24.0, 24.0, 16.0, 16.0));
    }

    #[test]
    fn animated_entity_update_advances_its_animation() {
        let mut entity = AnimatedDisplayEntity::new(
            "hero",
            "hero.png",
            Vec2::ZERO,
            DrawLayer::Actor1,
            SizeF::new(16.0, 16.0),
        );
        entity.animation_mut().def_mut().frame_count = 4;
        entity.animation_mut().def_mut().frame_duration = Duration::from_millis(100);
        entity.animation_mut().play(true, false);

        entity.update(Duration::from_millis(100), &InputSnapshot::empty());

        assert_eq!(entity.animation().current_frame(), 1);
    }
}
