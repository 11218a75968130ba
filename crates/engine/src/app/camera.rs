use super::input::InputSnapshot;
use super::math::{RectF, SizeF, Transform2, Vec2};

pub const CAMERA_ZOOM_MIN: f32 = 0.35;
pub const CAMERA_ZOOM_MAX: f32 = 2.0;
pub const CAMERA_ZOOM_STEP: f32 = 0.05;

/// World-to-screen camera. `transform` and `visible_area` are pure
/// functions of position, zoom and viewport and are recomputed on every
/// mutation; they are never set directly.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec2,
    zoom: f32,
    viewport: SizeF,
    transform: Transform2,
    visible_area: RectF,
}

impl Camera {
    pub fn new(viewport: SizeF, position: Vec2) -> Self {
        let mut camera = Self {
            position,
            zoom: 1.0,
            viewport,
            transform: Transform2::IDENTITY,
            visible_area: RectF::default(),
        };
        camera.recompute();
        camera
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.recompute();
    }

    /// Pans by a delta. Edge clamping against map bounds is the owning
    /// scene's responsibility; the camera stays map-agnostic.
    pub fn move_by(&mut self, delta: Vec2) {
        self.position += delta;
        self.recompute();
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn adjust_zoom(&mut self, amount: f32) {
        self.zoom = clamp_zoom(self.zoom + amount);
        self.recompute();
    }

    pub fn apply_zoom_steps(&mut self, steps: i32) {
        if steps == 0 {
            return;
        }
        self.adjust_zoom(steps as f32 * CAMERA_ZOOM_STEP);
    }

    pub fn viewport(&self) -> SizeF {
        self.viewport
    }

    /// Screen-center-anchored world-to-screen transform:
    /// translate(-position) * scale(zoom) * translate(+half-viewport).
    pub fn transform(&self) -> Transform2 {
        self.transform
    }

    /// The world-space rectangle currently visible through the camera.
    pub fn visible_area(&self) -> RectF {
        self.visible_area
    }

    /// Per-tick refresh: adopt the current display surface size and any
    /// discrete zoom steps, then rederive the transform and visible area.
    pub fn update(&mut self, input: &InputSnapshot) {
        let (width, height) = input.window_size();
        if width > 0 && height > 0 {
            self.viewport = SizeF::new(width as f32, height as f32);
        }
        self.apply_zoom_steps(input.zoom_delta_steps());
        self.recompute();
    }

    fn recompute(&mut self) {
        let half = self.viewport.half();
        self.transform = Transform2 {
            scale: self.zoom,
            translation: half - self.position * self.zoom,
        };

        let inverse = self.transform.inverse();
        let corners = [
            inverse.apply(Vec2::ZERO),
            inverse.apply(Vec2::new(self.viewport.width, 0.0)),
            inverse.apply(Vec2::new(0.0, self.viewport.height)),
            inverse.apply(Vec2::new(self.viewport.width, self.viewport.height)),
        ];
        let mut min = corners[0];
        let mut max = corners[0];
        for corner in &corners[1..] {
            min.x = min.x.min(corner.x);
            min.y = min.y.min(corner.y);
            max.x = max.x.max(corner.x);
            max.y = max.y.max(corner.y);
        }
        self.visible_area = RectF::new(min.x, min.y, max.x - min.x, max.y - min.y);
    }
}

fn clamp_zoom(zoom: f32) -> f32 {
    if !zoom.is_finite() {
        return 1.0;
    }
    zoom.clamp(CAMERA_ZOOM_MIN, CAMERA_ZOOM_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-3,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn world_position_under_camera_maps_to_screen_center() {
        let camera = Camera::new(SizeF::new(800.0, 600.0), Vec2::new(500.0, 300.0));

        let screen = camera.transform().apply(Vec2::new(500.0, 300.0));
        assert_close(screen.x, 400.0);
        assert_close(screen.y, 300.0);
    }

    #[test]
    fn visible_area_matches_viewport_at_unit_zoom() {
        let camera = Camera::new(SizeF::new(800.0, 600.0), Vec2::new(400.0, 300.0));

        let area = camera.visible_area();
        assert_close(area.x, 0.0);
        assert_close(area.y, 0.0);
        assert_close(area.width, 800.0);
        assert_close(area.height, 600.0);
    }

    #[test]
    fn visible_area_grows_when_zoomed_out() {
        let mut camera = Camera::new(SizeF::new(800.0, 600.0), Vec2::new(400.0, 300.0));
        camera.adjust_zoom(-0.5);

        let area = camera.visible_area();
        assert_close(area.width, 1600.0);
        assert_close(area.height, 1200.0);
    }

    #[test]
    fn repeated_zoom_steps_stay_within_bounds() {
        let mut camera = Camera::new(SizeF::new(800.0, 600.0), Vec2::ZERO);

        for _ in 0..100 {
            camera.apply_zoom_steps(1);
        }
        assert_close(camera.zoom(), CAMERA_ZOOM_MAX);

        for _ in 0..100 {
            camera.apply_zoom_steps(-1);
        }
        assert_close(camera.zoom(), CAMERA_ZOOM_MIN);
    }

    #[test]
    fn update_adopts_window_size_and_scroll_steps() {
        let mut camera = Camera::new(SizeF::new(800.0, 600.0), Vec2::ZERO);
        let input = InputSnapshot::empty()
            .with_window_size((1024, 768))
            .with_zoom_delta_steps(2);

        camera.update(&input);

        assert_eq!(camera.viewport(), SizeF::new(1024.0, 768.0));
        assert_close(camera.zoom(), 1.1);
    }

    #[test]
    fn pan_is_unclamped() {
        let mut camera = Camera::new(SizeF::new(800.0, 600.0), Vec2::ZERO);

        camera.move_by(Vec2::new(-5000.0, 40.0));

        assert_eq!(camera.position(), Vec2::new(-5000.0, 40.0));
    }
}
