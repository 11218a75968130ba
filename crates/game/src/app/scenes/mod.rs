mod debug_overlay;
mod gameplay;
mod main_menu;

pub(crate) use debug_overlay::DebugOverlayScene;
pub(crate) use gameplay::{GameplayScene, GAMEPLAY_SCENE_ID};
pub(crate) use main_menu::{MainMenuScene, MAIN_MENU_SCENE_ID};
