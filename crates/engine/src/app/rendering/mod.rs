mod batch;
mod glyphs;
mod renderer;

pub use batch::SpriteBatch;
pub use renderer::Renderer;
