use std::time::Duration;

use engine::{
    InputAction, InputSnapshot, Scene, SceneCommand, SceneContext, SceneCore, SceneError,
};
use tracing::info;

use super::super::config::GameConfig;
use super::super::entities::logo;
use super::gameplay::GameplayScene;

pub(crate) const MAIN_MENU_SCENE_ID: &str = "main_menu";

/// Title screen. Confirm hands off to a fresh gameplay scene and goes
/// dormant; cancel removes the menu, which exits the game when nothing else
/// is running.
pub(crate) struct MainMenuScene {
    core: SceneCore,
    config: GameConfig,
}

impl MainMenuScene {
    pub(crate) fn new(config: GameConfig) -> Self {
        Self {
            core: SceneCore::new(MAIN_MENU_SCENE_ID),
            config,
        }
    }
}

impl Scene for MainMenuScene {
    fn core(&self) -> &SceneCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SceneCore {
        &mut self.core
    }

    fn initialize(&mut self, ctx: &mut SceneContext<'_>) -> Result<(), SceneError> {
        self.core.entities_mut().insert(Box::new(logo(&ctx.metrics)));
        Ok(())
    }

    fn update(
        &mut self,
        dt: Duration,
        input: &InputSnapshot,
        _ctx: &mut SceneContext<'_>,
    ) -> Vec<SceneCommand> {
        if !self.core.active() {
            return Vec::new();
        }
        self.core.update_entities(dt, input);

        if input.is_down(InputAction::Confirm) {
            info!("starting gameplay from menu");
            return vec![
                SceneCommand::AddScene {
                    scene: Box::new(GameplayScene::new(self.config.clone())),
                    active: true,
                },
                SceneCommand::SetSceneActive {
                    id: MAIN_MENU_SCENE_ID.to_string(),
                    active: false,
                },
            ];
        }
        if input.is_down(InputAction::Cancel) {
            info!("menu dismissed");
            return vec![SceneCommand::RemoveScene {
                id: MAIN_MENU_SCENE_ID.to_string(),
            }];
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use engine::{DisplayMetrics, FsResourceLoader};
    use tempfile::TempDir;

    use super::super::super::entities::LOGO_ENTITY_ID;
    use super::super::GAMEPLAY_SCENE_ID;
    use super::*;

    fn with_scene<R>(body: impl FnOnce(&mut MainMenuScene, &mut SceneContext<'_>) -> R) -> R {
        let temp = TempDir::new().expect("temp");
        let mut loader = FsResourceLoader::new(temp.path());
        let mut ctx = SceneContext {
            loader: &mut loader,
            metrics: DisplayMetrics {
                width: 800,
                height: 600,
            },
        };
        let mut scene = MainMenuScene::new(GameConfig::default());
        scene.initialize(&mut ctx).expect("initialize");
        scene.core_mut().set_active(true);
        body(&mut scene, &mut ctx)
    }

    #[test]
    fn initialize_adds_the_logo() {
        with_scene(|scene, _ctx| {
            assert!(scene.core().entities().get(LOGO_ENTITY_ID).is_some());
        });
    }

    #[test]
    fn confirm_starts_gameplay_and_deactivates_the_menu() {
        with_scene(|scene, ctx| {
            let input = InputSnapshot::empty().with_action_down(InputAction::Confirm, true);

            let commands = scene.update(Duration::from_millis(16), &input, ctx);

            assert_eq!(commands.len(), 2);
            assert!(matches!(
                &commands[0],
                SceneCommand::AddScene { scene, active: true } if scene.id() == GAMEPLAY_SCENE_ID
            ));
            assert!(matches!(
                &commands[1],
                SceneCommand::SetSceneActive { id, active: false } if id == MAIN_MENU_SCENE_ID
            ));
        });
    }

    #[test]
    fn cancel_removes_the_menu() {
        with_scene(|scene, ctx| {
            let input = InputSnapshot::empty().with_action_down(InputAction::Cancel, true);

            let commands = scene.update(Duration::from_millis(16), &input, ctx);

            assert!(matches!(
                &commands[..],
                [SceneCommand::RemoveScene { id }] if id == MAIN_MENU_SCENE_ID
            ));
        });
    }

    #[test]
    fn inactive_menu_emits_nothing() {
        with_scene(|scene, ctx| {
            scene.core_mut().set_active(false);
            let input = InputSnapshot::empty().with_action_down(InputAction::Confirm, true);

            assert!(scene.update(Duration::from_millis(16), &input, ctx).is_empty());
        });
    }
}
