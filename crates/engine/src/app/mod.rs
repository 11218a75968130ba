mod animation;
mod camera;
mod component;
mod entity;
mod game;
mod input;
mod loop_runner;
mod math;
mod registry;
mod rendering;
mod scene;

pub use animation::{AnimationDef, AnimationDirection, AnimationRow, AnimationState};
pub use camera::{Camera, CAMERA_ZOOM_MAX, CAMERA_ZOOM_MIN, CAMERA_ZOOM_STEP};
pub use component::{Component, ComponentError, ComponentSet, ComponentValue, ValueKind};
pub use entity::{
    AnimatedDisplayEntity, Capabilities, DisplayEntity, DrawLayer, EntityKind, GameEntity,
    POSITION_COMPONENT,
};
pub use game::Game;
pub use input::{InputAction, InputSnapshot};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use math::{RectF, SizeF, Transform2, Vec2};
pub use registry::{Registry, RegistryError};
pub use rendering::{Renderer, SpriteBatch};
pub use scene::{
    DisplayMetrics, EntityStore, Scene, SceneCommand, SceneContext, SceneCore, SceneError,
    ScenePhase,
};
