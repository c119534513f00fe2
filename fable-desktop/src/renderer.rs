use fable_core::backend::Renderer;
use fable_core::stage::{Stage, Viewport};

/// 没有窗口时的渲染器：定期把舞台摘要写进日志
pub struct LogRenderer {
    viewport: Viewport,
    frame: u64,
    report_every: u64,
}

impl LogRenderer {
    pub fn new(width: f32, height: f32, report_every: u64) -> Self {
        Self {
            viewport: Viewport { width, height },
            frame: 0,
            report_every: report_every.max(1),
        }
    }
}

impl Renderer for LogRenderer {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn draw(&mut self, stage: &Stage) {
        self.frame += 1;
        if self.frame % self.report_every != 0 {
            return;
        }

        log::info!("Frame {}: {} sprite(s) on stage", self.frame, stage.drawables().count());
        for (id, s) in stage.drawables() {
            log::debug!(
                "  {:?} '{}' pos=({:.1}, {:.1}) scale=({:.2}, {:.2}) rot={:.2} alpha={:.2}{}",
                id, s.texture, s.pos.x, s.pos.y, s.scale.x, s.scale.y, s.rotation, s.alpha,
                if s.interactive { " [touch]" } else { "" },
            );
        }
    }
}
