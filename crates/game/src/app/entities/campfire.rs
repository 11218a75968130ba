use std::time::Duration;

use engine::{AnimatedDisplayEntity, DrawLayer, SizeF, Vec2};

pub(crate) const CAMPFIRE_ID_PREFIX: &str = "campfire";

const CAMPFIRE_TEXTURE: &str = "sprites/campfire.png";
pub(crate) const CAMPFIRE_FRAME_SIZE: SizeF = SizeF {
    width: 32.0,
    height: 32.0,
};
const CAMPFIRE_FRAME_DURATION: Duration = Duration::from_millis(120);

/// Decorative flame recreated from map objects on every map (re)load. The
/// animation runs forward to the last frame, reverses back to the first and
/// repeats for as long as the entity exists.
pub(crate) fn campfire(index: usize, position: Vec2) -> AnimatedDisplayEntity {
    let mut entity = AnimatedDisplayEntity::new(
        format!("{CAMPFIRE_ID_PREFIX}_{index}"),
        CAMPFIRE_TEXTURE,
        position,
        DrawLayer::Actor0,
        CAMPFIRE_FRAME_SIZE,
    );
    entity.animation_mut().def_mut().frame_duration = CAMPFIRE_FRAME_DURATION;
    entity.animation_mut().play(true, true);
    entity
}
