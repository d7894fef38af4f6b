//! The uniform contract every dashboard widget satisfies, and the concrete
//! enum the compositor schedules over.

use chrono::{DateTime, Utc};
use core_geometry::Rect;
use core_panel::WaveformMode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("{widget} failed to render: {source}")]
    Transient {
        widget: &'static str,
        source: anyhow::Error,
    },
    #[error("{widget} produced a raster of size {actual}, expected {expected}")]
    SizeMismatch {
        widget: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// The operations every widget must implement. `render` may block on
/// network I/O; the compositor calls it sequentially, never concurrently
/// with another widget's `render`.
pub trait WidgetKind {
    fn name(&self) -> &'static str;

    /// Fixed bounding rectangle within the screen, set at construction.
    fn bounds(&self) -> Rect;

    /// The next UTC instant this widget wants to be rendered.
    fn next_deadline(&self) -> DateTime<Utc>;

    /// Produce (or leave unchanged) the cached raster. A widget that
    /// decides no update is needed may return `Ok(())` without touching
    /// its raster.
    fn render(&mut self) -> Result<(), WidgetError>;

    /// The cached raster, stable between `render` calls. Length must
    /// always equal `bounds().width() * bounds().height()`.
    fn raster(&self) -> &[u8];

    /// Preferred waveform mode for the raster currently cached.
    fn waveform_mode(&self) -> WaveformMode;

    /// Compositor signals the raster has been consumed; widget advances
    /// its deadline. Must never move `next_deadline` backwards.
    fn redraw_finished(&mut self);

    /// Compositor demands a render on the very next tick.
    fn force_redraw(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_geometry::Rect;

    struct CountingWidget {
        bounds: Rect,
        deadline: DateTime<Utc>,
        raster: Vec<u8>,
        renders: u32,
    }

    impl WidgetKind for CountingWidget {
        fn name(&self) -> &'static str {
            "counting"
        }
        fn bounds(&self) -> Rect {
            self.bounds
        }
        fn next_deadline(&self) -> DateTime<Utc> {
            self.deadline
        }
        fn render(&mut self) -> Result<(), WidgetError> {
            self.renders += 1;
            self.raster.fill(self.renders as u8);
            Ok(())
        }
        fn raster(&self) -> &[u8] {
            &self.raster
        }
        fn waveform_mode(&self) -> WaveformMode {
            WaveformMode::Fast
        }
        fn redraw_finished(&mut self) {
            self.deadline += chrono::Duration::seconds(1);
        }
        fn force_redraw(&mut self) {
            self.deadline = Utc::now() - chrono::Duration::seconds(1);
        }
    }

    #[test]
    fn deadline_advances_monotonically() {
        let mut w = CountingWidget {
            bounds: Rect::new(0, 0, 2, 2),
            deadline: Utc::now(),
            raster: vec![0; 4],
            renders: 0,
        };
        let first = w.next_deadline();
        w.render().unwrap();
        w.redraw_finished();
        assert!(w.next_deadline() > first);
    }

    #[test]
    fn force_redraw_pulls_deadline_into_the_past() {
        let mut w = CountingWidget {
            bounds: Rect::new(0, 0, 2, 2),
            deadline: Utc::now() + chrono::Duration::hours(1),
            raster: vec![0; 4],
            renders: 0,
        };
        w.force_redraw();
        assert!(w.next_deadline() <= Utc::now());
    }
}
