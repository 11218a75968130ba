mod campfire;
mod fps_counter;
mod hero;
mod logo;
mod map;

pub(crate) use campfire::{campfire, CAMPFIRE_FRAME_SIZE, CAMPFIRE_ID_PREFIX};
pub(crate) use fps_counter::{FpsCounter, FPS_COUNTER_ID};
pub(crate) use hero::{Hero, HERO_ENTITY_ID};
pub(crate) use logo::{logo, LOGO_ENTITY_ID};
pub(crate) use map::{MapEntity, MAP_ENTITY_ID};
