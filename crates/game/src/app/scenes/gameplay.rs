use std::sync::Arc;
use std::time::Duration;

use engine::{
    Camera, GameEntity, InputAction, InputSnapshot, MapDocument, RectF, Scene, SceneCommand,
    SceneContext, SceneCore, SceneError, SpriteBatch, Vec2,
};
use tracing::{error, info, warn};

use super::super::config::GameConfig;
use super::super::entities::{
    campfire, Hero, MapEntity, CAMPFIRE_FRAME_SIZE, CAMPFIRE_ID_PREFIX, HERO_ENTITY_ID,
    MAP_ENTITY_ID,
};
use super::MAIN_MENU_SCENE_ID;

pub(crate) const GAMEPLAY_SCENE_ID: &str = "gameplay";

/// Object layer and property conventions shared by all maps.
const TRIGGER_LAYER: &str = "triggers";
const TYPE_PROPERTY: &str = "type";
const DOOR_TYPE: &str = "door";
const SPAWN_TYPE: &str = "spawnPoint";
const CAMPFIRE_TYPE: &str = "campfire";
const TARGET_MAP_PROPERTY: &str = "targetMap";
const TARGET_SPAWN_PROPERTY: &str = "targetSpawnPoint";

/// The playing field: tile map, hero, campfires and a hero-following camera.
/// Walking into a door trigger swaps the map in place and respawns the
/// transient decorations from the new map's objects.
pub(crate) struct GameplayScene {
    core: SceneCore,
    config: GameConfig,
}

impl GameplayScene {
    pub(crate) fn new(config: GameConfig) -> Self {
        Self {
            core: SceneCore::new(GAMEPLAY_SCENE_ID),
            config,
        }
    }

    fn document(&self) -> Option<Arc<MapDocument>> {
        self.core
            .entities()
            .get_as::<MapEntity>(MAP_ENTITY_ID)
            .and_then(|map| map.document().cloned())
    }

    /// Drops every campfire and recreates one per matching map object.
    fn rebuild_campfires(&mut self) {
        let positions: Vec<Vec2> = self
            .document()
            .and_then(|doc| {
                doc.object_layer(TRIGGER_LAYER).map(|objects| {
                    objects
                        .iter()
                        .filter(|object| object.property(TYPE_PROPERTY) == Some(CAMPFIRE_TYPE))
                        .map(|object| object.position + CAMPFIRE_FRAME_SIZE.half())
                        .collect()
                })
            })
            .unwrap_or_default();

        let entities = self.core.entities_mut();
        entities.retain(|entity| !entity.id().starts_with(CAMPFIRE_ID_PREFIX));
        for (index, position) in positions.into_iter().enumerate() {
            entities.insert(Box::new(campfire(index, position)));
        }
    }

    fn switch_map(
        &mut self,
        target_map: &str,
        spawn_name: &str,
        ctx: &mut SceneContext<'_>,
    ) -> Result<(), SceneError> {
        {
            let map = self
                .core
                .entities_mut()
                .get_as_mut::<MapEntity>(MAP_ENTITY_ID)
                .ok_or_else(|| SceneError::MapNotFound {
                    scene: GAMEPLAY_SCENE_ID.to_string(),
                })?;
            map.set_source(target_map);
        }
        self.core.load_all_content(ctx)?;

        let hero_half = self
            .core
            .entities()
            .get(HERO_ENTITY_ID)
            .map(|hero| hero.bounding_rect())
            .map(|bounds| Vec2::new(bounds.width * 0.5, bounds.height * 0.5))
            .unwrap_or(Vec2::ZERO);
        // Object coordinates anchor at the box corner, so the hero's center
        // lands at the trigger position plus half its own box.
        let spawn_center = self
            .document()
            .and_then(|doc| spawn_position(&doc, spawn_name))
            .map(|position| position + hero_half);
        match spawn_center {
            Some(center) => {
                if let Some(hero) = self
                    .core
                    .entities_mut()
                    .get_as_mut::<Hero>(HERO_ENTITY_ID)
                {
                    hero.set_position(center);
                }
            }
            None => warn!(
                map = target_map,
                spawn = spawn_name,
                "spawn point not found, hero keeps its position"
            ),
        }

        self.rebuild_campfires();
        self.core.load_all_content(ctx)?;
        info!(map = target_map, spawn = spawn_name, "map switched");
        Ok(())
    }

    fn follow_hero_with_camera(&mut self) {
        let Some(hero_position) = self
            .core
            .entities()
            .get_as::<Hero>(HERO_ENTITY_ID)
            .map(Hero::position)
        else {
            return;
        };
        let Some(map_size) = self.document().map(|doc| doc.size_in_pixels()) else {
            return;
        };
        let Some(camera) = self.core.camera_mut() else {
            return;
        };

        let half_visible = Vec2::new(
            camera.viewport().width / (2.0 * camera.zoom()),
            camera.viewport().height / (2.0 * camera.zoom()),
        );
        camera.set_position(Vec2::new(
            clamp_camera_axis(hero_position.x, half_visible.x, map_size.width),
            clamp_camera_axis(hero_position.y, half_visible.y, map_size.height),
        ));
    }
}

impl Scene for GameplayScene {
    fn core(&self) -> &SceneCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SceneCore {
        &mut self.core
    }

    fn initialize(&mut self, ctx: &mut SceneContext<'_>) -> Result<(), SceneError> {
        let spawn = Vec2::new(self.config.spawn_point.x, self.config.spawn_point.y);
        self.core.set_camera(Camera::new(ctx.metrics.size(), spawn));

        let entities = self.core.entities_mut();
        entities.insert(Box::new(MapEntity::new(self.config.starting_map.clone())));
        entities.insert(Box::new(Hero::new(spawn, self.config.hero_speed)));
        Ok(())
    }

    fn load_content(&mut self, ctx: &mut SceneContext<'_>) -> Result<(), SceneError> {
        self.core.load_all_content(ctx)?;
        self.rebuild_campfires();
        self.core.load_all_content(ctx)?;
        Ok(())
    }

    fn update(
        &mut self,
        dt: Duration,
        input: &InputSnapshot,
        ctx: &mut SceneContext<'_>,
    ) -> Vec<SceneCommand> {
        if !self.core.active() {
            return Vec::new();
        }
        if input.is_down(InputAction::Quit) {
            info!("leaving gameplay for the menu");
            return vec![
                SceneCommand::RemoveScene {
                    id: GAMEPLAY_SCENE_ID.to_string(),
                },
                SceneCommand::SetSceneActive {
                    id: MAIN_MENU_SCENE_ID.to_string(),
                    active: true,
                },
            ];
        }

        self.core.update_entities(dt, input);

        let door_hit = self.document().and_then(|doc| {
            let hero_bounds = self
                .core
                .entities()
                .get(HERO_ENTITY_ID)
                .map(|hero| hero.bounding_rect())?;
            door_target(&doc, hero_bounds)
        });
        if let Some((target_map, spawn_name)) = door_hit {
            if let Err(err) = self.switch_map(&target_map, &spawn_name, ctx) {
                error!(map = target_map.as_str(), error = %err, "map switch failed");
            }
        }

        self.follow_hero_with_camera();
        Vec::new()
    }

    fn draw(&mut self, batch: &mut SpriteBatch<'_>) {
        if !self.core.active() {
            return;
        }
        let transform = self.core.camera().map(Camera::transform);
        batch.begin(transform);

        let entities = self.core.entities();
        if let Some(map) = entities.get_as::<MapEntity>(MAP_ENTITY_ID) {
            for index in map.background_layers() {
                map.draw_layer(index, batch);
            }
        }

        let ordered: Vec<&dyn GameEntity> = entities.iter().collect();
        for index in entities.draw_order() {
            ordered[index].draw(batch);
        }
        if let Some(hero) = entities.get(HERO_ENTITY_ID) {
            hero.draw(batch);
        }

        if let Some(map) = entities.get_as::<MapEntity>(MAP_ENTITY_ID) {
            for index in map.foreground_layers() {
                map.draw_layer(index, batch);
            }
        }
        batch.end();
    }
}

/// The door trigger the hero currently overlaps, as (target map, spawn
/// point name).
fn door_target(doc: &MapDocument, hero_bounds: RectF) -> Option<(String, String)> {
    let triggers = doc.object_layer(TRIGGER_LAYER)?;
    triggers
        .iter()
        .filter(|object| object.property(TYPE_PROPERTY) == Some(DOOR_TYPE))
        .find(|object| object.bounds().intersects(&hero_bounds))
        .and_then(|door| {
            let target_map = door.property(TARGET_MAP_PROPERTY)?;
            let spawn_name = door.property(TARGET_SPAWN_PROPERTY)?;
            Some((target_map.to_string(), spawn_name.to_string()))
        })
}

fn spawn_position(doc: &MapDocument, name: &str) -> Option<Vec2> {
    doc.object_layer(TRIGGER_LAYER)?
        .iter()
        .filter(|object| object.property(TYPE_PROPERTY) == Some(SPAWN_TYPE))
        .find(|object| object.name == name)
        .map(|object| object.position)
}

/// Keeps the camera center inside `[half_visible, extent - half_visible]`;
/// maps smaller than the view sit centered.
fn clamp_camera_axis(target: f32, half_visible: f32, extent: f32) -> f32 {
    if extent <= half_visible * 2.0 {
        extent * 0.5
    } else {
        target.clamp(half_visible, extent - half_visible)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use engine::{DisplayMetrics, FsResourceLoader};
    use tempfile::TempDir;

    use super::super::super::config::SpawnPoint;
    use super::*;

    const VILLAGE_TMX: &str = r#"<map width="4" height="4" tilewidth="8" tileheight="8">
  <tileset firstgid="1" name="terrain" tilewidth="8" tileheight="8" columns="1">
    <image source="terrain.png" width="8" height="8"/>
  </tileset>
  <layer name="ground" width="4" height="4">
    <data encoding="csv">1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1</data>
  </layer>
  <objectgroup name="triggers">
    <object id="1" name="east_door" x="96" y="96" width="16" height="16">
      <properties>
        <property name="type" value="door"/>
        <property name="targetMap" value="cave.tmx"/>
        <property name="targetSpawnPoint" value="entry"/>
      </properties>
    </object>
    <object id="2" name="fire" x="40" y="40">
      <properties><property name="type" value="campfire"/></properties>
    </object>
  </objectgroup>
</map>"#;

    const CAVE_TMX: &str = r#"<map width="4" height="4" tilewidth="8" tileheight="8">
  <tileset firstgid="1" name="terrain" tilewidth="8" tileheight="8" columns="1">
    <image source="terrain.png" width="8" height="8"/>
  </tileset>
  <layer name="ground" width="4" height="4">
    <data encoding="csv">1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1</data>
  </layer>
  <objectgroup name="triggers">
    <object id="1" name="entry" x="64" y="80">
      <properties><property name="type" value="spawnPoint"/></properties>
    </object>
  </objectgroup>
</map>"#;

    fn write_png(path: &Path, width: u32, height: u32) {
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba([90, 90, 90, 255]));
        image.save(path).expect("save png");
    }

    fn write_assets(root: &Path) {
        fs::write(root.join("village.tmx"), VILLAGE_TMX).expect("write village");
        fs::write(root.join("cave.tmx"), CAVE_TMX).expect("write cave");
        write_png(&root.join("terrain.png"), 8, 8);
        fs::create_dir_all(root.join("sprites")).expect("sprites dir");
        // 4-column hero sheet, 4 facing rows; 2-frame campfire sheet.
        write_png(&root.join("sprites/hero.png"), 128, 128);
        write_png(&root.join("sprites/campfire.png"), 64, 32);
    }

    fn test_config() -> GameConfig {
        GameConfig {
            starting_map: "village.tmx".to_string(),
            spawn_point: SpawnPoint { x: 16.0, y: 16.0 },
            ..GameConfig::default()
        }
    }

    fn loaded_scene(temp: &TempDir) -> (GameplayScene, FsResourceLoader) {
        write_assets(temp.path());
        let mut loader = FsResourceLoader::new(temp.path());
        let mut scene = GameplayScene::new(test_config());
        {
            let mut ctx = SceneContext {
                loader: &mut loader,
                metrics: DisplayMetrics {
                    width: 800,
                    height: 600,
                },
            };
            scene.initialize(&mut ctx).expect("initialize");
            scene.core_mut().mark_initialized();
            scene.load_content(&mut ctx).expect("load");
        }
        scene.core_mut().set_active(true);
        (scene, loader)
    }

    #[test]
    fn load_builds_map_hero_and_campfires_from_objects() {
        let temp = TempDir::new().expect("temp");
        let (scene, _loader) = loaded_scene(&temp);

        let entities = scene.core().entities();
        assert!(entities.get(MAP_ENTITY_ID).is_some());
        assert!(entities.get(HERO_ENTITY_ID).is_some());

        let fire = entities.get("campfire_0").expect("campfire");
        // Object at (40, 40), offset by half the 32px flame box.
        assert_eq!(fire.bounding_rect().center(), Vec2::new(56.0, 56.0));
    }

    #[test]
    fn map_and_hero_skip_the_generic_draw_pass() {
        let temp = TempDir::new().expect("temp");
        let (scene, _loader) = loaded_scene(&temp);

        let entities = scene.core().entities();
        let ordered: Vec<&dyn GameEntity> = entities.iter().collect();
        let generic: Vec<&str> = entities
            .draw_order()
            .into_iter()
            .map(|index| ordered[index].id())
            .collect();

        // The scene sequences both itself, around the campfire pass.
        assert!(generic.contains(&"campfire_0"));
        assert!(!generic.contains(&MAP_ENTITY_ID));
        assert!(!generic.contains(&HERO_ENTITY_ID));
    }

    #[test]
    fn walking_into_a_door_switches_map_and_respawns_the_hero() {
        let temp = TempDir::new().expect("temp");
        let (mut scene, mut loader) = loaded_scene(&temp);
        let mut ctx = SceneContext {
            loader: &mut loader,
            metrics: DisplayMetrics {
                width: 800,
                height: 600,
            },
        };

        scene
            .core_mut()
            .entities_mut()
            .get_as_mut::<Hero>(HERO_ENTITY_ID)
            .expect("hero")
            .set_position(Vec2::new(100.0, 100.0));
        scene.update(Duration::from_millis(16), &InputSnapshot::empty(), &mut ctx);

        let entities = scene.core().entities();
        let map = entities.get_as::<MapEntity>(MAP_ENTITY_ID).expect("map");
        assert_eq!(map.source(), "cave.tmx");

        // Spawn object at (64, 80): the hero's center lands at the trigger
        // position plus half its 32px box.
        let hero = entities.get_as::<Hero>(HERO_ENTITY_ID).expect("hero");
        assert_eq!(hero.position(), Vec2::new(80.0, 96.0));
        assert_eq!(hero.bounding_rect().center(), Vec2::new(80.0, 96.0));

        // The cave has no campfire objects, so the village flame is gone.
        assert!(entities.get("campfire_0").is_none());
    }

    #[test]
    fn camera_centers_on_maps_smaller_than_the_view() {
        let temp = TempDir::new().expect("temp");
        let (mut scene, mut loader) = loaded_scene(&temp);
        let mut ctx = SceneContext {
            loader: &mut loader,
            metrics: DisplayMetrics {
                width: 800,
                height: 600,
            },
        };

        scene.update(Duration::from_millis(16), &InputSnapshot::empty(), &mut ctx);

        let camera = scene.core().camera().expect("camera");
        assert_eq!(camera.position(), Vec2::new(16.0, 16.0));
    }

    #[test]
    fn quit_returns_to_the_menu() {
        let temp = TempDir::new().expect("temp");
        let (mut scene, mut loader) = loaded_scene(&temp);
        let mut ctx = SceneContext {
            loader: &mut loader,
            metrics: DisplayMetrics {
                width: 800,
                height: 600,
            },
        };
        let input = InputSnapshot::empty().with_action_down(InputAction::Quit, true);

        let commands = scene.update(Duration::from_millis(16), &input, &mut ctx);

        assert!(matches!(
            &commands[..],
            [
                SceneCommand::RemoveScene { id: removed },
                SceneCommand::SetSceneActive { id: menu, active: true },
            ] if removed == GAMEPLAY_SCENE_ID && menu == MAIN_MENU_SCENE_ID
        ));
    }

    #[test]
    fn camera_tracks_inside_the_map_and_pins_at_the_edges() {
        // zoom 1, viewport 800 wide: a 1000px map clamps the center to
        // [400, 600]; 600 tall viewport on 1000px clamps to [300, 700].
        assert_eq!(clamp_camera_axis(100.0, 400.0, 1000.0), 400.0);
        assert_eq!(clamp_camera_axis(500.0, 400.0, 1000.0), 500.0);
        assert_eq!(clamp_camera_axis(950.0, 400.0, 1000.0), 600.0);
        assert_eq!(clamp_camera_axis(950.0, 300.0, 1000.0), 700.0);
        assert_eq!(clamp_camera_axis(100.0, 400.0, 640.0), 320.0);
    }
}
