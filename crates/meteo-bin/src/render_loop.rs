//! The top-level render loop: sleep until the earliest widget deadline,
//! composite, diff, align, pack, and submit to the panel. Single-threaded
//! and cooperative — nothing else touches the panel or the framebuffer
//! while a tick is in flight.

use chrono::{DateTime, Local, NaiveDate, Utc};
use core_compositor::Compositor;
use core_config::flags::CommandFlags;
use core_diff::DiffDetector;
use core_geometry::Rect;
use core_panel::{PanelDriver, WaveformMode};
use std::borrow::Cow;

pub struct RenderLoop<D: PanelDriver> {
    panel: D,
    compositor: Compositor,
    diff: DiffDetector,
    flags: CommandFlags,
    force_full_redraw: bool,
    last_rendered_date: NaiveDate,
    screen_width: u32,
    screen_height: u32,
}

impl<D: PanelDriver> RenderLoop<D> {
    pub fn new(panel: D, compositor: Compositor, flags: CommandFlags) -> Self {
        let (screen_width, screen_height) = compositor.screen_size();
        Self {
            panel,
            compositor,
            diff: DiffDetector::new(screen_width, screen_height),
            flags,
            force_full_redraw: true,
            last_rendered_date: Local::now().date_naive(),
            screen_width,
            screen_height,
        }
    }

    /// Runs forever; returns only on a fatal hardware/geometry error.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            self.tick().await?;
        }
    }

    /// One full iteration of steps 1-15. Widget-render failures are logged
    /// and absorbed; panel, codec, and diff failures are fatal.
    pub async fn tick(&mut self) -> anyhow::Result<()> {
        self.sleep_until_due().await;

        // Step 2: redraw-all command.
        if self.flags.take_redraw_all() {
            self.panel.clear(WaveformMode::Init).map_err(anyhow::Error::from)?;
            self.compositor.force_redraw();
            // The panel is now physically white; force the *next* tick's
            // recomposite (which will diff identical to white) to still
            // submit a full-screen high-quality frame instead of being
            // swallowed by an empty diff.
            self.force_full_redraw = true;
            return Ok(());
        }

        // Calendar-only redraw: the web UI publishes a new special-days
        // list and flips this flag independently of redraw_all. Polled
        // alongside it since both are consumed before compositing.
        if self.flags.take_calendar_redraw() {
            self.compositor.force_redraw_named("calendar");
        }

        // Step 3-4: render due widgets, capture their aggregate waveform.
        if let Err(errors) = self.compositor.render() {
            tracing::warn!(target: "render.loop", %errors, "widget render failures this tick");
        }
        let mut waveform = self.compositor.waveform_mode();

        // Step 5.
        self.compositor.redraw_finished();

        // Step 6-7.
        let mut dirty = self
            .diff
            .single_pass(self.compositor.framebuffer())
            .map_err(anyhow::Error::from)?;
        if dirty.is_empty() {
            return Ok(());
        }

        // Step 8: midnight rollover forces one full high-quality submission.
        let today = Local::now().date_naive();
        if today != self.last_rendered_date {
            self.last_rendered_date = today;
            waveform = WaveformMode::HighQuality;
            dirty = Rect::full(self.screen_width, self.screen_height);
        }

        // Step 9: first-frame / commanded full redraw.
        if self.force_full_redraw {
            waveform = WaveformMode::HighQuality;
            dirty = Rect::full(self.screen_width, self.screen_height);
            self.force_full_redraw = false;
        }

        // Step 10: simple-refresh command.
        if self.flags.take_simple_refresh() {
            self.panel.clear(WaveformMode::Init).map_err(anyhow::Error::from)?;
            waveform = WaveformMode::HighQuality;
            dirty = Rect::full(self.screen_width, self.screen_height);
        }

        self.submit(dirty, waveform)
    }

    async fn sleep_until_due(&mut self) {
        if let Some(deadline) = self.compositor.next_deadline() {
            let remaining = deadline - Utc::now();
            if let Ok(std_dur) = remaining.to_std() {
                tokio::time::sleep(std_dur).await;
            }
        }
    }

    fn submit(&mut self, dirty: Rect, waveform: WaveformMode) -> anyhow::Result<()> {
        // Step 11.
        let dirty = dirty.align_x4(self.screen_width);

        // Step 12-13.
        let full_screen = dirty.covers(self.screen_width, self.screen_height);
        let source: Cow<[u8]> = if full_screen {
            Cow::Borrowed(self.compositor.framebuffer())
        } else {
            Cow::Owned(
                core_raster::cut_rect(
                    self.compositor.framebuffer(),
                    self.screen_width,
                    self.screen_height,
                    dirty,
                )
                .map_err(anyhow::Error::from)?,
            )
        };
        let packed = core_raster::pack_4bpp(&source, dirty.width(), dirty.height(), true)
            .map_err(anyhow::Error::from)?;

        // Step 14: mirror to panel coordinates.
        let panel_rect = dirty.mirror_x(self.screen_width);

        // Step 15.
        self.panel
            .write_area(panel_rect, &packed, waveform)
            .map_err(anyhow::Error::from)?;

        tracing::debug!(
            target: "render.loop",
            min_x = dirty.min_x, min_y = dirty.min_y, max_x = dirty.max_x, max_y = dirty.max_y,
            waveform = ?waveform,
            "submitted frame"
        );
        Ok(())
    }

    /// Grants the composition root access to the compositor for out-of-band
    /// wiring (e.g. `force_redraw_named` when special days change).
    pub fn compositor_mut(&mut self) -> &mut Compositor {
        &mut self.compositor
    }

    pub fn command_flags(&self) -> &CommandFlags {
        &self.flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_panel::{PanelError, PanelInfo};
    use core_widget::{WidgetError, WidgetKind};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct FakePanel {
        submissions: Arc<Mutex<Vec<(Rect, WaveformMode)>>>,
        clears: Arc<Mutex<Vec<WaveformMode>>>,
    }

    impl PanelDriver for FakePanel {
        fn info(&self) -> PanelInfo {
            PanelInfo {
                width: 8,
                height: 4,
                image_memory_address: 0,
            }
        }
        fn clear(&mut self, mode: WaveformMode) -> Result<(), PanelError> {
            self.clears.lock().unwrap().push(mode);
            Ok(())
        }
        fn write_area(&mut self, rect: Rect, _packed: &[u8], mode: WaveformMode) -> Result<(), PanelError> {
            self.submissions.lock().unwrap().push((rect, mode));
            Ok(())
        }
    }

    struct StaticWidget {
        name: &'static str,
        bounds: Rect,
        raster: Vec<u8>,
        deadline: DateTime<Utc>,
        mode: WaveformMode,
    }

    impl WidgetKind for StaticWidget {
        fn name(&self) -> &'static str {
            self.name
        }
        fn bounds(&self) -> Rect {
            self.bounds
        }
        fn next_deadline(&self) -> DateTime<Utc> {
            self.deadline
        }
        fn render(&mut self) -> Result<(), WidgetError> {
            Ok(())
        }
        fn raster(&self) -> &[u8] {
            &self.raster
        }
        fn waveform_mode(&self) -> WaveformMode {
            self.mode
        }
        fn redraw_finished(&mut self) {
            self.deadline += chrono::Duration::hours(1);
        }
        fn force_redraw(&mut self) {
            // Pinned to the epoch rather than `Utc::now()` so that forcing
            // two widgets in the same tick still leaves their deadlines
            // exactly equal, regardless of how much real time elapses
            // between the two `force_redraw` calls.
            self.deadline = DateTime::<Utc>::UNIX_EPOCH;
        }
    }

    fn make_loop() -> RenderLoop<FakePanel> {
        let widget = Box::new(StaticWidget {
            name: "static",
            bounds: Rect::new(0, 0, 8, 4),
            raster: vec![0x11; 32],
            deadline: Utc::now(),
            mode: WaveformMode::Fast,
        });
        let compositor = Compositor::new(8, 4, vec![widget], false);
        RenderLoop::new(FakePanel::default(), compositor, CommandFlags::new())
    }

    #[tokio::test]
    async fn first_tick_submits_full_screen_high_quality() {
        let mut rl = make_loop();
        let panel = rl.panel.clone();
        rl.tick().await.unwrap();
        let submissions = panel.submissions.lock().unwrap();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].0, Rect::full(8, 4));
        assert_eq!(submissions[0].1, WaveformMode::HighQuality);
    }

    #[tokio::test]
    async fn unchanged_frame_after_first_tick_submits_nothing() {
        let mut rl = make_loop();
        let panel = rl.panel.clone();
        rl.tick().await.unwrap();
        // widget covers the whole screen and renders the same content every
        // time; forcing it due again should recomposite an identical
        // framebuffer, so the diff is empty and nothing is resubmitted.
        rl.compositor_mut().force_redraw();
        rl.tick().await.unwrap();
        let submissions = panel.submissions.lock().unwrap();
        assert_eq!(submissions.len(), 1);
    }

    #[tokio::test]
    async fn redraw_all_flag_clears_panel_and_forces_recomposite() {
        let mut rl = make_loop();
        let panel = rl.panel.clone();

        // Consume the bootstrap full-screen submission first so the
        // command-flag behavior below isn't conflated with it.
        rl.tick().await.unwrap();
        panel.submissions.lock().unwrap().clear();

        rl.command_flags().set_redraw_all();
        rl.tick().await.unwrap();
        assert_eq!(panel.clears.lock().unwrap().len(), 1);
        assert_eq!(panel.clears.lock().unwrap()[0], WaveformMode::Init);
        // the redraw_all tick itself only clears and recomposites; no
        // write_area submission happens until the following tick
        assert!(panel.submissions.lock().unwrap().is_empty());

        // The widget always renders identical content, so the recomposited
        // framebuffer diffs empty against the one submitted just before the
        // clear. Without re-arming `force_full_redraw`, this tick would be
        // swallowed silently, leaving the freshly-cleared white panel blank.
        rl.tick().await.unwrap();
        let submissions = panel.submissions.lock().unwrap();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].0, Rect::full(8, 4));
        assert_eq!(submissions[0].1, WaveformMode::HighQuality);
    }

    #[tokio::test]
    async fn calendar_redraw_flag_forces_only_the_calendar_widget_due() {
        let due_soon = Box::new(StaticWidget {
            name: "static",
            bounds: Rect::new(0, 0, 8, 2),
            raster: vec![0x11; 16],
            deadline: Utc::now(),
            mode: WaveformMode::Fast,
        });
        let calendar = Box::new(StaticWidget {
            name: "calendar",
            bounds: Rect::new(0, 2, 8, 4),
            raster: vec![0x22; 16],
            deadline: Utc::now() + chrono::Duration::hours(6),
            mode: WaveformMode::HighQuality,
        });
        let compositor = Compositor::new(8, 4, vec![due_soon, calendar], false);
        let mut rl = RenderLoop::new(FakePanel::default(), compositor, CommandFlags::new());
        let panel = rl.panel.clone();

        rl.command_flags().set_calendar_redraw();
        rl.tick().await.unwrap();

        // forcing the calendar widget makes it (and only it) the earliest
        // deadline this tick, so its region is the one actually repainted;
        // the first tick's full-screen submission still fires regardless.
        assert_eq!(panel.submissions.lock().unwrap().len(), 1);
        assert_eq!(&rl.compositor.framebuffer()[16..32], &[0x22; 16]);
    }
}
