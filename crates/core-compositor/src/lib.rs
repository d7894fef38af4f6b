//! Owns the screen-sized framebuffer and the widget collection, and
//! computes which widgets are due, invokes them, and blits their rasters
//! into the framebuffer.

use chrono::{DateTime, Utc};
use core_geometry::Rect;
use core_panel::WaveformMode;
use core_widget::{WidgetError, WidgetKind};

/// Aggregated failures from one or more widgets in the pending set. The
/// compositor still makes progress for widgets that succeeded; this error
/// only reports what went wrong for the others.
#[derive(Debug)]
pub struct CompositeErrors(pub Vec<WidgetError>);

impl std::fmt::Display for CompositeErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} widget(s) failed to render: ", self.0.len())?;
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CompositeErrors {}

pub struct Compositor {
    screen_width: u32,
    screen_height: u32,
    framebuffer: Vec<u8>,
    widgets: Vec<Box<dyn WidgetKind>>,
    cached_deadline: Option<DateTime<Utc>>,
    pending_set: Vec<usize>,
}

impl Compositor {
    /// `start_black` selects the initial fill colour of the framebuffer
    /// before any widget has rendered; it has no effect beyond that first
    /// frame, since the first diff pass always forces a full submission.
    pub fn new(
        screen_width: u32,
        screen_height: u32,
        widgets: Vec<Box<dyn WidgetKind>>,
        start_black: bool,
    ) -> Self {
        for w in &widgets {
            assert!(
                w.bounds().is_contained_in(Rect::full(screen_width, screen_height)),
                "widget {} bounds {:?} exceed the {screen_width}x{screen_height} screen",
                w.name(),
                w.bounds(),
            );
        }
        let fill = if start_black { 0x00 } else { 0xFF };
        Self {
            screen_width,
            screen_height,
            framebuffer: vec![fill; screen_width as usize * screen_height as usize],
            widgets,
            cached_deadline: None,
            pending_set: Vec::new(),
        }
    }

    pub fn screen_size(&self) -> (u32, u32) {
        (self.screen_width, self.screen_height)
    }

    pub fn framebuffer(&self) -> &[u8] {
        &self.framebuffer
    }

    fn refresh_pending_set(&mut self) {
        let min = self.widgets.iter().map(|w| w.next_deadline()).min();
        self.cached_deadline = min;
        self.pending_set = match min {
            None => Vec::new(),
            Some(min) => self
                .widgets
                .iter()
                .enumerate()
                .filter(|(_, w)| w.next_deadline() == min)
                .map(|(i, _)| i)
                .collect(),
        };
    }

    /// The earliest deadline across all widgets, recomputing the pending
    /// set if it is stale. Returns `None` if there are no widgets.
    pub fn next_deadline(&mut self) -> Option<DateTime<Utc>> {
        if self.cached_deadline.is_none() {
            self.refresh_pending_set();
        }
        self.cached_deadline
    }

    /// Render every widget in the pending set and blit successes into the
    /// framebuffer. Widgets whose `render` fails keep their previous pixels
    /// and are reported in the returned error.
    pub fn render(&mut self) -> Result<(), CompositeErrors> {
        if self.cached_deadline.is_none() {
            self.refresh_pending_set();
        }
        let mut errors = Vec::new();
        for &idx in &self.pending_set {
            let widget = &mut self.widgets[idx];
            match widget.render() {
                Ok(()) => {
                    let bounds = widget.bounds();
                    let raster = widget.raster();
                    blit(
                        &mut self.framebuffer,
                        self.screen_width,
                        bounds,
                        raster,
                        widget.name(),
                    );
                }
                Err(e) => {
                    tracing::warn!(target: "widget", widget = widget.name(), error = %e, "render failed, keeping previous raster");
                    errors.push(e);
                }
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(CompositeErrors(errors))
        }
    }

    /// Aggregate waveform preference over the pending set: Init > HighQuality
    /// > Fast. Defaults to Fast if the pending set is empty.
    pub fn waveform_mode(&self) -> WaveformMode {
        core_panel::waveform::aggregate(
            self.pending_set.iter().map(|&i| self.widgets[i].waveform_mode()),
        )
    }

    /// Signal every pending widget that its raster was consumed, then
    /// invalidate the cached deadline so the next call recomputes it.
    pub fn redraw_finished(&mut self) {
        for &idx in &self.pending_set {
            self.widgets[idx].redraw_finished();
        }
        self.cached_deadline = None;
    }

    /// Clear the framebuffer to white and force every widget to redraw on
    /// the next tick.
    pub fn force_redraw(&mut self) {
        self.framebuffer.fill(0xFF);
        for w in &mut self.widgets {
            w.force_redraw();
        }
        self.cached_deadline = None;
    }

    /// Force a single named widget to redraw on the next tick, without
    /// disturbing the others. Used for the calendar's special-days flag.
    pub fn force_redraw_named(&mut self, name: &str) {
        for w in &mut self.widgets {
            if w.name() == name {
                w.force_redraw();
            }
        }
        self.cached_deadline = None;
    }
}

fn blit(
    framebuffer: &mut [u8],
    screen_width: u32,
    bounds: Rect,
    raster: &[u8],
    widget_name: &'static str,
) {
    let w = bounds.width() as usize;
    let h = bounds.height() as usize;
    debug_assert_eq!(
        raster.len(),
        w * h,
        "{widget_name} raster length does not match its declared bounds"
    );
    for row in 0..h {
        let dst_start = screen_width as usize * (bounds.min_y as usize + row) + bounds.min_x as usize;
        let src_start = row * w;
        framebuffer[dst_start..dst_start + w].copy_from_slice(&raster[src_start..src_start + w]);
    }
}
