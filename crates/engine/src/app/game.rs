use std::time::Duration;

use tracing::{error, info, warn};

use super::input::InputSnapshot;
use super::rendering::SpriteBatch;
use super::scene::{Scene, SceneCommand, SceneContext, SceneError};

/// Scene orchestrator. Scenes are kept in registration order and addressed
/// by id; update and draw dispatch both walk that order.
#[derive(Default)]
pub struct Game {
    scenes: Vec<Box<dyn Scene>>,
    exit_requested: bool,
}

impl Game {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    pub fn scene(&self, id: &str) -> Option<&dyn Scene> {
        self.scenes
            .iter()
            .find(|scene| scene.id() == id)
            .map(Box::as_ref)
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    /// Runs the scene through initialize and content load, then records it
    /// with the requested active flag. A failure aborts the addition
    /// gracefully: the error is returned, the running scene set is
    /// untouched, and the frame loop keeps going.
    pub fn add_scene(
        &mut self,
        mut scene: Box<dyn Scene>,
        active: bool,
        ctx: &mut SceneContext<'_>,
    ) -> Result<(), SceneError> {
        if let Some(index) = self.scenes.iter().position(|s| s.id() == scene.id()) {
            warn!(scene = scene.id(), "scene id already present; replacing");
            let mut old = self.scenes.remove(index);
            old.unload_content();
        }

        scene.initialize(ctx)?;
        scene.core_mut().mark_initialized();
        scene.load_content(ctx)?;
        scene.core_mut().set_active(active);
        info!(
            scene = scene.id(),
            active,
            entity_count = scene.core().entities().len(),
            "scene added"
        );
        self.scenes.push(scene);
        Ok(())
    }

    /// Unloads and discards a scene. Removing the last scene requests
    /// process exit.
    pub fn remove_scene(&mut self, id: &str) -> bool {
        let Some(index) = self.scenes.iter().position(|scene| scene.id() == id) else {
            warn!(scene = id, "remove requested for unknown scene");
            return false;
        };
        let mut scene = self.scenes.remove(index);
        scene.unload_content();
        info!(scene = id, remaining = self.scenes.len(), "scene removed");

        if self.scenes.is_empty() {
            info!("last scene removed; exiting");
            self.exit_requested = true;
        }
        true
    }

    pub fn set_scene_active(&mut self, id: &str, active: bool) {
        match self.scenes.iter_mut().find(|scene| scene.id() == id) {
            Some(scene) => scene.core_mut().set_active(active),
            None => warn!(scene = id, "activation change for unknown scene"),
        }
    }

    /// Flips the active flag without touching the scene's content.
    pub fn toggle_scene_active(&mut self, id: &str) {
        match self.scenes.iter_mut().find(|scene| scene.id() == id) {
            Some(scene) => {
                let next = !scene.core().active();
                scene.core_mut().set_active(next);
            }
            None => warn!(scene = id, "toggle for unknown scene"),
        }
    }

    /// One update pass: dispatch to every scene (each gates on its own
    /// active flag), then apply the commands they returned. Deferring the
    /// commands keeps the scene list stable during iteration.
    pub fn update(&mut self, dt: Duration, input: &InputSnapshot, ctx: &mut SceneContext<'_>) {
        let mut commands = Vec::new();
        for scene in &mut self.scenes {
            commands.extend(scene.update(dt, input, ctx));
        }
        self.apply_commands(commands, ctx);
    }

    pub fn draw(&mut self, batch: &mut SpriteBatch<'_>) {
        for scene in &mut self.scenes {
            scene.draw(batch);
        }
    }

    fn apply_commands(&mut self, commands: Vec<SceneCommand>, ctx: &mut SceneContext<'_>) {
        for command in commands {
            match command {
                SceneCommand::AddScene { scene, active } => {
                    let id = scene.id().to_string();
                    if let Err(err) = self.add_scene(scene, active, ctx) {
                        error!(scene = id.as_str(), error = %err, "scene add aborted");
                    }
                }
                SceneCommand::RemoveScene { id } => {
                    self.remove_scene(&id);
                }
                SceneCommand::SetSceneActive { id, active } => {
                    self.set_scene_active(&id, active);
                }
                SceneCommand::ToggleSceneActive { id } => {
                    self.toggle_scene_active(&id);
                }
            }
        }
    }
}
