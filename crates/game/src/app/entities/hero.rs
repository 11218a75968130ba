use std::any::Any;
use std::time::Duration;

use engine::{
    AnimationRow, AnimationState, Capabilities, Component, ComponentSet, ComponentValue,
    ContentError, DrawLayer, EntityKind, GameEntity, InputAction, InputSnapshot, RectF,
    ResourceLoader, SizeF, SpriteBatch, Vec2, POSITION_COMPONENT,
};
use tracing::warn;

pub(crate) const HERO_ENTITY_ID: &str = "hero";
pub(crate) const SPEED_COMPONENT: &str = "speed";

const HERO_TEXTURE: &str = "sprites/hero.png";
const HERO_FRAME_SIZE: SizeF = SizeF {
    width: 32.0,
    height: 32.0,
};
const HERO_FRAME_DURATION: Duration = Duration::from_millis(150);

/// The player character: a four-direction walking sprite driven directly by
/// the input snapshot. Walk speed lives in the `speed` component so other
/// systems can read and tune it.
pub(crate) struct Hero {
    components: ComponentSet,
    animation: AnimationState,
}

impl Hero {
    pub(crate) fn new(position: Vec2, speed: f32) -> Self {
        let mut components = ComponentSet::new();
        components.insert(Component::new(
            POSITION_COMPONENT,
            ComponentValue::Vec2(position),
        ));
        components.insert(Component::new(SPEED_COMPONENT, ComponentValue::F32(speed)));

        let mut animation = AnimationState::new(HERO_FRAME_SIZE);
        animation.def_mut().frame_duration = HERO_FRAME_DURATION;
        Self {
            components,
            animation,
        }
    }

    pub(crate) fn position(&self) -> Vec2 {
        self.components
            .get(POSITION_COMPONENT)
            .and_then(Component::as_vec2)
            .unwrap_or(Vec2::ZERO)
    }

    pub(crate) fn set_position(&mut self, position: Vec2) {
        self.components
            .set(POSITION_COMPONENT, ComponentValue::Vec2(position));
    }

    fn speed(&self) -> f32 {
        self.components
            .get(SPEED_COMPONENT)
            .and_then(Component::as_f32)
            .unwrap_or(0.0)
    }
}

impl GameEntity for Hero {
    fn id(&self) -> &str {
        HERO_ENTITY_ID
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
        let texture = loader.load_texture(HERO_TEXTURE)?;
        let frame_count = (texture.width() as f32 / HERO_FRAME_SIZE.width).floor() as u32;
        self.animation.def_mut().frame_count = frame_count.max(1);
        self.components.insert(Component::new(
            HERO_TEXTURE,
            ComponentValue::Texture(texture),
        ));
        Ok(())
    }

    fn update(&mut self, dt: Duration, input: &InputSnapshot) {
        let direction = movement_direction(input);
        if direction == Vec2::ZERO {
            if self.animation.playing() {
                self.animation.stop();
            }
        } else {
            let delta = direction * (self.speed() * dt.as_secs_f32());
            self.set_position(self.position() + delta);
            if let Some(row) = row_for_direction(direction) {
                self.animation.set_row(row);
            }
            if !self.animation.playing() {
                self.animation.play(true, false);
            }
        }
        self.animation.advance(dt);
    }

    fn draw(&self, batch: &mut SpriteBatch<'_>) {
        let Some(texture) = self
            .components
            .get(HERO_TEXTURE)
            .and_then(Component::as_texture)
        else {
            warn!(entity = HERO_ENTITY_ID, "draw skipped, texture not loaded");
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
        RectF::centered_at(self.position(), HERO_FRAME_SIZE)
    }

    fn layer(&self) -> DrawLayer {
        DrawLayer::Actor1
    }

    // The gameplay scene draws the hero itself, between the map's
    // background and foreground passes.
    fn custom_renderer(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn movement_direction(input: &InputSnapshot) -> Vec2 {
    let mut direction = Vec2::ZERO;
    if input.is_down(InputAction::MoveRight) {
        direction.x += 1.0;
    }
    if input.is_down(InputAction::MoveLeft) {
        direction.x -= 1.0;
    }
    if input.is_down(InputAction::MoveDown) {
        direction.y += 1.0;
    }
    if input.is_down(InputAction::MoveUp) {
        direction.y -= 1.0;
    }

    let length_sq = direction.x * direction.x + direction.y * direction.y;
    if length_sq > 0.0 {
        direction * length_sq.sqrt().recip()
    } else {
        Vec2::ZERO
    }
}

/// Facing from a movement direction; horizontal wins on diagonals so the
/// sprite strafes rather than flickering between rows.
fn row_for_direction(direction: Vec2) -> Option<AnimationRow> {
    if direction.x < 0.0 {
        Some(AnimationRow::WalkLeft)
    } else if direction.x > 0.0 {
        Some(AnimationRow::WalkRight)
    } else if direction.y < 0.0 {
        Some(AnimationRow::WalkUp)
    } else if direction.y > 0.0 {
        Some(AnimationRow::WalkDown)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input_with(actions: &[InputAction]) -> InputSnapshot {
        let mut snapshot = InputSnapshot::empty();
        for action in actions {
            snapshot = snapshot.with_action_down(*action, true);
        }
        snapshot
    }

    #[test]
    fn walks_at_speed_times_dt() {
        let mut hero = Hero::new(Vec2::new(100.0, 100.0), 160.0);

        hero.update(
            Duration::from_millis(500),
            &input_with(&[InputAction::MoveRight]),
        );

        let position = hero.position();
        assert!((position.x - 180.0).abs() < 1e-3);
        assert!((position.y - 100.0).abs() < 1e-3);
    }

    #[test]
    fn diagonal_movement_is_normalized() {
        let mut hero = Hero::new(Vec2::ZERO, 100.0);

        hero.update(
            Duration::from_secs(1),
            &input_with(&[InputAction::MoveRight, InputAction::MoveDown]),
        );

        let position = hero.position();
        let distance = (position.x * position.x + position.y * position.y).sqrt();
        assert!((distance - 100.0).abs() < 1e-3);
    }

    #[test]
    fn opposite_keys_cancel_and_halt_the_walk_cycle() {
        let mut hero = Hero::new(Vec2::ZERO, 100.0);
        hero.update(
            Duration::from_millis(16),
            &input_with(&[InputAction::MoveLeft]),
        );
        assert!(hero.animation.playing());

        hero.update(
            Duration::from_millis(16),
            &input_with(&[InputAction::MoveLeft, InputAction::MoveRight]),
        );

        assert!((hero.position().x + 100.0 * 0.016).abs() < 1e-3);
        assert!(!hero.animation.playing());
        assert_eq!(hero.animation.current_frame(), 0);
    }

    #[test]
    fn facing_follows_movement_immediately() {
        let mut hero = Hero::new(Vec2::ZERO, 100.0);

        hero.update(
            Duration::from_millis(16),
            &input_with(&[InputAction::MoveUp]),
        );
        assert_eq!(hero.animation.row(), AnimationRow::WalkUp);

        hero.update(
            Duration::from_millis(16),
            &input_with(&[InputAction::MoveLeft, InputAction::MoveUp]),
        );
        assert_eq!(hero.animation.row(), AnimationRow::WalkLeft);
    }

    #[test]
    fn idle_hero_rewinds_to_the_standing_frame() {
        let mut hero = Hero::new(Vec2::ZERO, 100.0);
        hero.animation.def_mut().frame_count = 4;
        hero.update(
            Duration::from_millis(150),
            &input_with(&[InputAction::MoveDown]),
        );
        hero.update(
            Duration::from_millis(150),
            &input_with(&[InputAction::MoveDown]),
        );
        assert!(hero.animation.current_frame() > 0);

        hero.update(Duration::from_millis(16), &InputSnapshot::empty());
        assert_eq!(hero.animation.current_frame(), 0);
    }
}
