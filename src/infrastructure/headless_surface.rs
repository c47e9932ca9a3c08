// Headless render surface - keeps a frame record instead of drawing pixels
use crate::application::render_surface::{RenderSurface, SurfaceSize};
use crate::domain::scene::{Scene, SceneSummary};
use crate::error::{Result, TelemetryError};

#[derive(Debug)]
pub struct HeadlessSurface {
    size: SurfaceSize,
    context: bool,
    frames_presented: u64,
    last_frame: Option<SceneSummary>,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: SurfaceSize { width, height },
            context: false,
            frames_presented: 0,
            last_frame: None,
        }
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn last_frame(&self) -> Option<&SceneSummary> {
        self.last_frame.as_ref()
    }
}

impl RenderSurface for HeadlessSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn acquire_context(&mut self) -> Result<()> {
        if self.context {
            return Err(TelemetryError::Surface(
                "drawing context already acquired".to_string(),
            ));
        }
        self.context = true;
        tracing::debug!("Acquired {}x{} drawing context", self.size.width, self.size.height);
        Ok(())
    }

    fn has_context(&self) -> bool {
        self.context
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    fn present(&mut self, scene: &Scene) -> Result<()> {
        if !self.context {
            return Err(TelemetryError::Surface(
                "present called without a drawing context".to_string(),
            ));
        }
        self.frames_presented += 1;
        self.last_frame = Some(scene.summary(self.frames_presented));
        Ok(())
    }

    fn release_context(&mut self) {
        if self.context {
            tracing::debug!("Released drawing context after {} frames", self.frames_presented);
        }
        self.context = false;
    }
}
