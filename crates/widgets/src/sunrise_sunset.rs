//! Sunrise/sunset indicator, recomputed once per local calendar day from
//! the station's configured coordinates.

use crate::collaborators::{DaylightCalculator, HtmlRenderer};
use crate::util::render_via_html;
use chrono::{DateTime, Duration, Local, Utc};
use core_geometry::Rect;
use core_panel::WaveformMode;
use core_widget::{WidgetError, WidgetKind};

pub struct SunriseSunsetWidget {
    bounds: Rect,
    calculator: Box<dyn DaylightCalculator>,
    latitude: f64,
    longitude: f64,
    renderer: Box<dyn HtmlRenderer>,
    raster: Vec<u8>,
    next_deadline: DateTime<Utc>,
}

impl SunriseSunsetWidget {
    pub fn new(
        bounds: Rect,
        calculator: Box<dyn DaylightCalculator>,
        latitude: f64,
        longitude: f64,
        renderer: Box<dyn HtmlRenderer>,
    ) -> Self {
        let area = (bounds.width() * bounds.height()) as usize;
        Self {
            bounds,
            calculator,
            latitude,
            longitude,
            renderer,
            raster: vec![0xFF; area],
            next_deadline: Utc::now(),
        }
    }
}

impl WidgetKind for SunriseSunsetWidget {
    fn name(&self) -> &'static str {
        "sunrise_sunset"
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn next_deadline(&self) -> DateTime<Utc> {
        self.next_deadline
    }

    fn render(&mut self) -> Result<(), WidgetError> {
        let today = Local::now().date_naive();
        let name = self.name();
        let (sunrise_min, sunset_min) = self
            .calculator
            .sunrise_sunset(today, self.latitude, self.longitude)
            .map_err(|source| {
                tracing::warn!(target: "widgets", widget = name, %source, "daylight calculation failed");
                WidgetError::Transient { widget: name, source }
            })?;
        let html = format!(
            "<div class=\"daylight\">up {:02}:{:02} down {:02}:{:02}</div>",
            sunrise_min / 60,
            sunrise_min % 60,
            sunset_min / 60,
            sunset_min % 60,
        );
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
