//! Multi-hour weather forecast strip, refreshed every 3 hours on an
//! hour-aligned boundary.

use crate::collaborators::{HtmlRenderer, WeatherClient};
use crate::util::render_via_html;
use chrono::{DateTime, Duration, Timelike, Utc};
use core_geometry::Rect;
use core_panel::WaveformMode;
use core_widget::{WidgetError, WidgetKind};

pub struct ForecastWidget {
    bounds: Rect,
    weather: Box<dyn WeatherClient>,
    renderer: Box<dyn HtmlRenderer>,
    raster: Vec<u8>,
    next_deadline: DateTime<Utc>,
}

impl ForecastWidget {
    pub fn new(bounds: Rect, weather: Box<dyn WeatherClient>, renderer: Box<dyn HtmlRenderer>) -> Self {
        let area = (bounds.width() * bounds.height()) as usize;
        Self {
            bounds,
            weather,
            renderer,
            raster: vec![0xFF; area],
            next_deadline: Utc::now(),
        }
    }
}

impl WidgetKind for ForecastWidget {
    fn name(&self) -> &'static str {
        "forecast"
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn next_deadline(&self) -> DateTime<Utc> {
        self.next_deadline
    }

    fn render(&mut self) -> Result<(), WidgetError> {
        let name = self.name();
        let points = self.weather.forecast().map_err(|source| {
            tracing::warn!(target: "widgets", widget = name, %source, "forecast fetch failed");
            WidgetError::Transient { widget: name, source }
        })?;
        if points.is_empty() {
            // Upstream returned no data; keep the previous raster rather
            // than blanking a widget that was showing something useful.
            return Ok(());
        }
        let html: String = points
            .iter()
            .map(|p| format!("<span>+{}h {:.0}C</span>", p.hours_from_now, p.temperature_celsius))
            .collect();
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
        WaveformMode::Fast
    }

    fn redraw_finished(&mut self) {
        let now = Utc::now();
        let truncated = now
            .date_naive()
            .and_hms_opt(now.hour(), 0, 0)
            .and_then(|naive| naive.and_local_timezone(chrono::Utc).single())
            .unwrap_or(now);
        self.next_deadline = truncated + Duration::hours(3);
    }

    fn force_redraw(&mut self) {
        self.next_deadline = Utc::now();
    }
}
