use std::time::Duration;

use thiserror::Error;

use crate::content::{ContentError, ResourceLoader};

use super::camera::Camera;
use super::component::ComponentError;
use super::entity::{Capabilities, GameEntity};
use super::input::InputSnapshot;
use super::math::{SizeF, Vec2};
use super::rendering::SpriteBatch;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("entity not found in scene: {id}")]
    EntityNotFound { id: String },
    #[error("scene '{scene}' has no map entity")]
    MapNotFound { scene: String },
    #[error(transparent)]
    Component(#[from] ComponentError),
    #[error(transparent)]
    Content(#[from] ContentError),
}

/// Scene lifecycle. Active/inactive is tracked separately; this records
/// which one-shot transitions have run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenePhase {
    Uninitialized,
    Initialized,
    ContentLoaded,
    ContentUnloaded,
}

/// Size of the current display surface, for centering UI and sizing
/// cameras at scene construction time.
#[derive(Debug, Clone, Copy)]
pub struct DisplayMetrics {
    pub width: u32,
    pub height: u32,
}

impl DisplayMetrics {
    pub fn size(&self) -> SizeF {
        SizeF::new(self.width as f32, self.height as f32)
    }

    pub fn center(&self) -> Vec2 {
        self.size().half()
    }
}

/// Everything a scene needs from its host, passed explicitly instead of
/// resolved from a global.
pub struct SceneContext<'a> {
    pub loader: &'a mut dyn ResourceLoader,
    pub metrics: DisplayMetrics,
}

/// Deferred scene-set mutations. Scenes return these from `update`; the
/// orchestrator applies them after the update pass so the scene list never
/// changes mid-iteration.
pub enum SceneCommand {
    AddScene { scene: Box<dyn Scene>, active: bool },
    RemoveScene { id: String },
    SetSceneActive { id: String, active: bool },
    ToggleSceneActive { id: String },
}

struct EntityEntry {
    /// Snapshot of `entity.capabilities()` taken at insert; dispatch reads
    /// this instead of re-asking the entity every frame.
    capabilities: Capabilities,
    entity: Box<dyn GameEntity>,
}

/// Ordered entity arena. Find-by-id (first match) and insertion-ordered
/// iteration are two views over the same storage; ids may repeat for
/// families of transient entities (campfire_0, campfire_1).
#[derive(Default)]
pub struct EntityStore {
    entries: Vec<EntityEntry>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: Box<dyn GameEntity>) {
        self.entries.push(EntityEntry {
            capabilities: entity.capabilities(),
            entity,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&dyn GameEntity> {
        self.entries
            .iter()
            .find(|entry| entry.entity.id() == id)
            .map(|entry| entry.entity.as_ref())
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Box<dyn GameEntity>> {
        self.entries
            .iter_mut()
            .find(|entry| entry.entity.id() == id)
            .map(|entry| &mut entry.entity)
    }

    pub fn require(&self, id: &str) -> Result<&dyn GameEntity, SceneError> {
        self.get(id).ok_or_else(|| SceneError::EntityNotFound {
            id: id.to_string(),
        })
    }

    /// Typed view of a stored entity.
    pub fn get_as<T: GameEntity>(&self, id: &str) -> Option<&T> {
        self.get(id).and_then(|entity| entity.as_any().downcast_ref())
    }

    pub fn get_as_mut<T: GameEntity>(&mut self, id: &str) -> Option<&mut T> {
        self.get_mut(id)
            .and_then(|entity| entity.as_any_mut().downcast_mut())
    }

    pub fn remove(&mut self, id: &str) -> Option<Box<dyn GameEntity>> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.entity.id() == id)?;
        Some(self.entries.remove(index).entity)
    }

    /// Drops every entity the predicate rejects; used to clear transient
    /// families (all campfires) on map reload.
    pub fn retain(&mut self, mut keep: impl FnMut(&dyn GameEntity) -> bool) {
        self.entries.retain(|entry| keep(entry.entity.as_ref()));
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn GameEntity> {
        self.entries.iter().map(|entry| entry.entity.as_ref())
    }

    pub(crate) fn load_all_content(
        &mut self,
        loader: &mut dyn ResourceLoader,
    ) -> Result<(), ContentError> {
        for entry in &mut self.entries {
            if entry.capabilities.content_loadable {
                entry.entity.load_content(loader)?;
            }
        }
        Ok(())
    }

    pub(crate) fn unload_all_content(&mut self) {
        for entry in &mut self.entries {
            if entry.capabilities.content_loadable {
                entry.entity.unload_content();
            }
        }
    }

    pub(crate) fn update_all(&mut self, dt: Duration, input: &InputSnapshot) {
        for entry in &mut self.entries {
            if entry.capabilities.updatable {
                entry.entity.update(dt, input);
            }
        }
    }

    /// Indices of the generic draw pass, layer-ascending with insertion
    /// order preserved on ties. Custom renderers are excluded; the owning
    /// scene sequences those itself.
    pub fn draw_order(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| {
                entry.capabilities.drawable && !entry.entity.custom_renderer()
            })
            .map(|(index, _)| index)
            .collect();
        indices.sort_by_key(|&index| self.entries[index].entity.layer());
        indices
    }

    pub(crate) fn draw_default_pass(&self, batch: &mut SpriteBatch<'_>) {
        for index in self.draw_order() {
            self.entries[index].entity.draw(batch);
        }
    }
}

/// The state every scene shares: id, lifecycle phase, active flag, the
/// entity store and an optional camera.
pub struct SceneCore {
    id: String,
    active: bool,
    phase: ScenePhase,
    entities: EntityStore,
    camera: Option<Camera>,
}

impl SceneCore {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            active: false,
            phase: ScenePhase::Uninitialized,
            entities: EntityStore::new(),
            camera: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn phase(&self) -> ScenePhase {
        self.phase
    }

    pub fn entities(&self) -> &EntityStore {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut EntityStore {
        &mut self.entities
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.camera.as_mut()
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = Some(camera);
    }

    pub fn mark_initialized(&mut self) {
        self.phase = ScenePhase::Initialized;
    }

    /// Resolves content for every content-loadable entity currently
    /// present. Safe to re-invoke after entities are added later (a new
    /// map); already-loaded entities replace their resource components
    /// rather than duplicating them.
    pub fn load_all_content(&mut self, ctx: &mut SceneContext<'_>) -> Result<(), SceneError> {
        self.entities.load_all_content(ctx.loader)?;
        self.phase = ScenePhase::ContentLoaded;
        Ok(())
    }

    pub fn unload_all_content(&mut self) {
        self.entities.unload_all_content();
        self.phase = ScenePhase::ContentUnloaded;
    }

    /// Generic update dispatch: updatable entities first, then the camera
    /// consumes the input snapshot.
    pub fn update_entities(&mut self, dt: Duration, input: &InputSnapshot) {
        self.entities.update_all(dt, input);
        if let Some(camera) = self.camera.as_mut() {
            camera.update(input);
        }
    }

    /// Generic draw dispatch: one batch scope bracketed by the camera
    /// transform when the scene has one.
    pub fn draw_default_pass(&self, batch: &mut SpriteBatch<'_>) {
        let transform = self.camera.as_ref().map(Camera::transform);
        batch.begin(transform);
        self.entities.draw_default_pass(batch);
        batch.end();
    }
}

/// A collection of entities with its own lifecycle and dispatch. The
/// defaulted methods are the generic paths; scenes with manual compositing
/// override `draw` and sequence their custom renderers around
/// `draw_default_pass`.
pub trait Scene {
    fn core(&self) -> &SceneCore;

    fn core_mut(&mut self) -> &mut SceneCore;

    fn id(&self) -> &str {
        self.core().id()
    }

    /// Populates the initial entity set. Called exactly once, before
    /// `load_content`.
    fn initialize(&mut self, ctx: &mut SceneContext<'_>) -> Result<(), SceneError>;

    fn load_content(&mut self, ctx: &mut SceneContext<'_>) -> Result<(), SceneError> {
        self.core_mut().load_all_content(ctx)
    }

    fn update(
        &mut self,
        dt: Duration,
        input: &InputSnapshot,
        _ctx: &mut SceneContext<'_>,
    ) -> Vec<SceneCommand> {
        if !self.core().active() {
            return Vec::new();
        }
        self.core_mut().update_entities(dt, input);
        Vec::new()
    }

    fn draw(&mut self, batch: &mut SpriteBatch<'_>) {
        if !self.core().active() {
            return;
        }
        self.core().draw_default_pass(batch);
    }

    fn unload_content(&mut self) {
        self.core_mut().unload_all_content();
    }
}
