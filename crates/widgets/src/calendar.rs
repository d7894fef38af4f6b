//! Month calendar with special-day highlighting, redrawn once per local
//! midnight (plus on-demand via the `calendar_redraw` command flag, wired
//! by the binary's composition root through `Compositor::force_redraw_named`).

use crate::collaborators::HtmlRenderer;
use crate::util::render_via_html;
use chrono::{DateTime, Duration, Local, Utc};
use core_config::SpecialDay;
use core_geometry::Rect;
use core_panel::WaveformMode;
use core_widget::{WidgetError, WidgetKind};

pub struct CalendarWidget {
    bounds: Rect,
    special_days: Vec<SpecialDay>,
    renderer: Box<dyn HtmlRenderer>,
    raster: Vec<u8>,
    next_deadline: DateTime<Utc>,
}

impl CalendarWidget {
    pub fn new(bounds: Rect, special_days: Vec<SpecialDay>, renderer: Box<dyn HtmlRenderer>) -> Self {
        let area = (bounds.width() * bounds.height()) as usize;
        Self {
            bounds,
            special_days,
            renderer,
            raster: vec![0xFF; area],
            next_deadline: Utc::now(),
        }
    }

    /// Replaces the special-days list (the web UI publishes a fresh one);
    /// does not itself schedule a redraw — pair with `force_redraw`.
    pub fn set_special_days(&mut self, special_days: Vec<SpecialDay>) {
        self.special_days = special_days;
    }
}

impl WidgetKind for CalendarWidget {
    fn name(&self) -> &'static str {
        "calendar"
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn next_deadline(&self) -> DateTime<Utc> {
        self.next_deadline
    }

    fn render(&mut self) -> Result<(), WidgetError> {
        let today = Local::now().date_naive();
        let mut html = format!("<div class=\"calendar\">{today}</div>");
        for day in &self.special_days {
            html.push_str(&format!(
                "<div class=\"special-day\">{}: {} ({}-{})</div>",
                day.id, day.display_text, day.start_date, day.end_date
            ));
        }
        self.raster = render_via_html(
            self.renderer.as_ref(),
            &html,
            self.bounds.width(),
            self.bounds.height(),
            self.name(),
        )?;
        Ok(())
    }

    fn raster(&self) -> &[u8] {
        &self.raster
    }

    fn waveform_mode(&self) -> WaveformMode {
        WaveformMode::HighQuality
    }

    fn redraw_finished(&mut self) {
        let tomorrow_midnight = (Local::now().date_naive() + Duration::days(1))
            .and_hms_opt(0, 0, 0)
            .and_then(|naive| naive.and_local_timezone(Local).single())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc::now() + Duration::days(1));
        self.next_deadline = tomorrow_midnight;
    }

    fn force_redraw(&mut self) {
        self.next_deadline = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubRenderer;
    impl HtmlRenderer for StubRenderer {
        fn render(&self, html: &str, width: u32, height: u32) -> anyhow::Result<Vec<u8>> {
            let fill = if html.contains("special-day") { 0x88 } else { 0x99 };
            Ok(vec![fill; (width * height) as usize])
        }
    }

    fn special_day() -> SpecialDay {
        SpecialDay {
            index: 0,
            id: "christmas".into(),
            display_text: "Christmas".into(),
            kind: "holiday".into(),
            start_date: "2026-12-25".into(),
            end_date: "2026-12-25".into(),
            is_public_holiday: true,
            is_school_holiday: false,
        }
    }

    #[test]
    fn render_includes_special_days_in_content() {
        let mut w = CalendarWidget::new(Rect::new(0, 0, 2, 2), vec![special_day()], Box::new(StubRenderer));
        w.render().unwrap();
        assert!(w.raster().iter().all(|&b| b == 0x88));
    }

    #[test]
    fn set_special_days_replaces_list_for_next_render() {
        let mut w = CalendarWidget::new(Rect::new(0, 0, 2, 2), vec![], Box::new(StubRenderer));
        w.render().unwrap();
        assert!(w.raster().iter().all(|&b| b == 0x99));
        w.set_special_days(vec![special_day()]);
        w.render().unwrap();
        assert!(w.raster().iter().all(|&b| b == 0x88));
    }

    #[test]
    fn waveform_preference_is_high_quality() {
        let w = CalendarWidget::new(Rect::new(0, 0, 2, 2), vec![], Box::new(StubRenderer));
        assert_eq!(w.waveform_mode(), WaveformMode::HighQuality);
    }
}
