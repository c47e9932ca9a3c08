// Drawing surface trait for the SLAM scene
use crate::domain::scene::Scene;
use crate::error::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

pub trait RenderSurface: Send {
    /// Current size of the container the surface fills
    fn size(&self) -> SurfaceSize;

    /// Acquire the drawing context; called once when the scene is mounted
    fn acquire_context(&mut self) -> Result<()>;

    fn has_context(&self) -> bool;

    fn resize(&mut self, size: SurfaceSize);

    /// Draw one frame of the scene
    fn present(&mut self, scene: &Scene) -> Result<()>;

    fn release_context(&mut self);
}
