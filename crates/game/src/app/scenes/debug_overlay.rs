use std::time::Duration;

use engine::{InputSnapshot, Scene, SceneCommand, SceneContext, SceneCore, SceneError};
use tracing::info;

use super::super::entities::FpsCounter;

pub(crate) const DEBUG_OVERLAY_SCENE_ID: &str = "debug_overlay";

/// HUD scene toggled with the backquote key. Unlike other scenes it watches
/// input while inactive, since the toggle is what wakes it up; everything
/// else stays gated on the active flag.
pub(crate) struct DebugOverlayScene {
    core: SceneCore,
}

impl DebugOverlayScene {
    pub(crate) fn new() -> Self {
        Self {
            core: SceneCore::new(DEBUG_OVERLAY_SCENE_ID),
        }
    }
}

impl Scene for DebugOverlayScene {
    fn core(&self) -> &SceneCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SceneCore {
        &mut self.core
    }

    fn initialize(&mut self, _ctx: &mut SceneContext<'_>) -> Result<(), SceneError> {
        self.core.entities_mut().insert(Box::new(FpsCounter::new()));
        Ok(())
    }

    fn update(
        &mut self,
        dt: Duration,
        input: &InputSnapshot,
        _ctx: &mut SceneContext<'_>,
    ) -> Vec<SceneCommand> {
        if input.overlay_toggle_pressed() {
            let visible = !self.core.active();
            self.core.set_active(visible);
            info!(visible, "debug overlay toggled");
        }
        if !self.core.active() {
            return Vec::new();
        }
        self.core.update_entities(dt, input);
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use engine::{DisplayMetrics, FsResourceLoader};
    use tempfile::TempDir;

    use super::super::super::entities::FPS_COUNTER_ID;
    use super::*;

    fn with_scene<R>(body: impl FnOnce(&mut DebugOverlayScene, &mut SceneContext<'_>) -> R) -> R {
        let temp = TempDir::new().expect("temp");
        let mut loader = FsResourceLoader::new(temp.path());
        let mut ctx = SceneContext {
            loader: &mut loader,
            metrics: DisplayMetrics {
                width: 800,
                height: 600,
            },
        };
        let mut scene = DebugOverlayScene::new();
        scene.initialize(&mut ctx).expect("initialize");
        body(&mut scene, &mut ctx)
    }

    #[test]
    fn toggle_wakes_the_overlay_even_while_inactive() {
        with_scene(|scene, ctx| {
            assert!(!scene.core().active());

            let toggle = InputSnapshot::empty().with_overlay_toggle_pressed(true);
            scene.update(Duration::from_millis(16), &toggle, ctx);
            assert!(scene.core().active());

            scene.update(Duration::from_millis(16), &toggle, ctx);
            assert!(!scene.core().active());
        });
    }

    #[test]
    fn counter_only_ticks_while_visible() {
        with_scene(|scene, ctx| {
            let quiet = InputSnapshot::empty();
            for _ in 0..70 {
                scene.update(Duration::from_millis(16), &quiet, ctx);
            }
            let counter = scene
                .core()
                .entities()
                .get_as::<FpsCounter>(FPS_COUNTER_ID)
                .expect("counter");
            assert_eq!(counter.fps(), 0.0);

            scene.update(
                Duration::from_millis(16),
                &InputSnapshot::empty().with_overlay_toggle_pressed(true),
                ctx,
            );
            for _ in 0..70 {
                scene.update(Duration::from_millis(16), &quiet, ctx);
            }
            let counter = scene
                .core()
                .entities()
                .get_as::<FpsCounter>(FPS_COUNTER_ID)
                .expect("counter");
            assert!(counter.fps() > 0.0);
        });
    }
}
