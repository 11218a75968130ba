use engine::{DisplayEntity, DisplayMetrics, DrawLayer};

pub(crate) const LOGO_ENTITY_ID: &str = "logo";

const LOGO_TEXTURE: &str = "sprites/logo.png";

/// Title image for the main menu, centered on the display surface.
pub(crate) fn logo(metrics: &DisplayMetrics) -> DisplayEntity {
    DisplayEntity::new(LOGO_ENTITY_ID, LOGO_TEXTURE, metrics.center(), DrawLayer::Ui)
}
