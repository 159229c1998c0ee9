use tracing::debug;

use crate::low_level::Tensor;

/// Displays one observation channel per tick.
pub trait Renderer {
    fn render(&mut self, frame: &Tensor, overlay: &str) -> anyhow::Result<()>;
}

pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _frame: &Tensor, _overlay: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Reports frames through `tracing` instead of drawing them.
#[derive(Default)]
pub struct LogRenderer {
    frames: u64,
}

impl LogRenderer {
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for LogRenderer {
    fn render(&mut self, frame: &Tensor, overlay: &str) -> anyhow::Result<()> {
        self.frames += 1;
        debug!(
            frame = self.frames,
            shape = ?frame.shape(),
            mean = frame.mean().unwrap_or(0.0),
            overlay,
            "render"
        );
        Ok(())
    }
}
