use std::any::Any;
use std::time::Duration;

use engine::{
    Capabilities, ComponentSet, DrawLayer, EntityKind, GameEntity, InputSnapshot, SpriteBatch,
    Vec2,
};

pub(crate) const FPS_COUNTER_ID: &str = "fps_counter";

const SAMPLE_WINDOW: Duration = Duration::from_secs(1);
const TEXT_COLOR: [u8; 4] = [255, 255, 160, 255];
const TEXT_MARGIN: f32 = 4.0;

/// Tick-rate readout for the debug overlay. Counts update dispatches over a
/// one second window; under the fixed-timestep loop that equals the
/// simulation rate.
#[derive(Default)]
pub(crate) struct FpsCounter {
    components: ComponentSet,
    elapsed: Duration,
    ticks: u32,
    displayed_fps: f32,
}

impl FpsCounter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fps(&self) -> f32 {
        self.displayed_fps
    }
}

impl GameEntity for FpsCounter {
    fn id(&self) -> &str {
        FPS_COUNTER_ID
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Hud
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            content_loadable: false,
            updatable: true,
            drawable: true,
        }
    }

    fn components(&self) -> &ComponentSet {
        &self.components
    }

    fn components_mut(&mut self) -> &mut ComponentSet {
        &mut self.components
    }

    fn update(&mut self, dt: Duration, _input: &InputSnapshot) {
        self.elapsed += dt;
        self.ticks += 1;
        if self.elapsed >= SAMPLE_WINDOW {
            self.displayed_fps = self.ticks as f32 / self.elapsed.as_secs_f32();
            self.elapsed = Duration::ZERO;
            self.ticks = 0;
        }
    }

    fn draw(&self, batch: &mut SpriteBatch<'_>) {
        let text = format!("FPS {:.0}", self.displayed_fps);
        batch.draw_text(&text, Vec2::new(TEXT_MARGIN, TEXT_MARGIN), TEXT_COLOR);
    }

    fn layer(&self) -> DrawLayer {
        DrawLayer::Ui
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_settles_on_the_tick_rate_after_one_window() {
        let mut counter = FpsCounter::new();
        let input = InputSnapshot::empty();

        for _ in 0..60 {
            counter.update(Duration::from_millis(16), &input);
        }
        assert_eq!(counter.fps(), 0.0);

        for _ in 0..3 {
            counter.update(Duration::from_millis(16), &input);
        }
        assert!((counter.fps() - 62.5).abs() < 0.5);
    }
}
