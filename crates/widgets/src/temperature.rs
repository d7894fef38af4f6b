//! Indoor/outdoor temperature and humidity panel, on a randomised
//! 200-400s cadence — tighter than pressure's, since comfort readings are
//! expected to be noticed sooner.

use crate::collaborators::{HtmlRenderer, SensorClient};
use crate::util::render_via_html;
use chrono::{DateTime, Duration, Utc};
use core_geometry::Rect;
use core_panel::WaveformMode;
use core_widget::{WidgetError, WidgetKind};
use rand::Rng;

const MIN_INTERVAL_SECS: i64 = 200;
const MAX_INTERVAL_SECS: i64 = 400;

pub struct SensorEntityIds {
    pub internal_temperature: String,
    pub external_temperature: String,
    pub internal_humidity: String,
    pub external_humidity: String,
}

pub struct TemperatureWidget {
    bounds: Rect,
    sensor: Box<dyn SensorClient>,
    entities: SensorEntityIds,
    renderer: Box<dyn HtmlRenderer>,
    raster: Vec<u8>,
    next_deadline: DateTime<Utc>,
}

impl TemperatureWidget {
    pub fn new(
        bounds: Rect,
        sensor: Box<dyn SensorClient>,
        entities: SensorEntityIds,
        renderer: Box<dyn HtmlRenderer>,
    ) -> Self {
        let area = (bounds.width() * bounds.height()) as usize;
        Self {
            bounds,
            sensor,
            entities,
            renderer,
            raster: vec![0xFF; area],
            next_deadline: Utc::now(),
        }
    }
}

impl WidgetKind for TemperatureWidget {
    fn name(&self) -> &'static str {
        "temperature"
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn next_deadline(&self) -> DateTime<Utc> {
        self.next_deadline
    }

    fn render(&mut self) -> Result<(), WidgetError> {
        let name = self.name();
        let wrap = |r: anyhow::Result<f64>| {
            r.map_err(|source| {
                tracing::warn!(target: "widgets", widget = name, %source, "sensor read failed");
                WidgetError::Transient {
                    widget: name,
                    source,
                }
            })
        };
        let int_t = wrap(self.sensor.read(&self.entities.internal_temperature))?;
        let ext_t = wrap(self.sensor.read(&self.entities.external_temperature))?;
        let int_h = wrap(self.sensor.read(&self.entities.internal_humidity))?;
        let ext_h = wrap(self.sensor.read(&self.entities.external_humidity))?;

        let html = format!(
            "<div class=\"temperature\">in {int_t:.1}C/{int_h:.0}% out {ext_t:.1}C/{ext_h:.0}%</div>"
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
        let jitter = rand::thread_rng().gen_range(MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS);
        self.next_deadline = Utc::now() + Duration::seconds(jitter);
    }

    fn force_redraw(&mut self) {
        self.next_deadline = Utc::now();
    }
}
