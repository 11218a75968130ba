use engine::{
    resolve_app_paths, AppError, FsResourceLoader, LoopConfig, Registry, ResourceLoader,
    StartupError,
};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::{ConfigError, GameConfig};
use super::scenes::{DebugOverlayScene, MainMenuScene};

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    App(#[from] AppError),
}

pub(crate) fn run() -> Result<(), BootstrapError> {
    init_tracing();
    info!("=== Overworld Startup ===");

    let paths = resolve_app_paths()?;
    let config = GameConfig::load(&paths.assets_dir.join("config.json"))?;
    info!(
        root = %paths.root.display(),
        map = config.starting_map.as_str(),
        "configuration resolved"
    );

    let mut registry = Registry::new();
    registry.register::<Box<dyn ResourceLoader>>(Box::new(FsResourceLoader::new(
        paths.assets_dir.clone(),
    )));

    let loop_config = LoopConfig {
        window_title: config.window_title.clone(),
        window_width: config.window_width,
        window_height: config.window_height,
        target_tps: config.target_tps,
        ..LoopConfig::default()
    };

    engine::run_app(loop_config, registry, move |game, ctx| {
        game.add_scene(Box::new(MainMenuScene::new(config)), true, ctx)?;
        game.add_scene(Box::new(DebugOverlayScene::new()), false, ctx)?;
        Ok(())
    })?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
