//! Barometric pressure gauge, redrawn on a randomised 1800-2000s cadence so
//! its sensor poll doesn't synchronise with every other widget's.

use crate::collaborators::{HtmlRenderer, SensorClient};
use crate::util::render_via_html;
use chrono::{DateTime, Duration, Utc};
use core_geometry::Rect;
use core_panel::WaveformMode;
use core_widget::{WidgetError, WidgetKind};
use rand::Rng;

const MIN_INTERVAL_SECS: i64 = 1800;
const MAX_INTERVAL_SECS: i64 = 2000;

pub struct PressureWidget {
    bounds: Rect,
    sensor: Box<dyn SensorClient>,
    sensor_entity_id: String,
    renderer: Box<dyn HtmlRenderer>,
    raster: Vec<u8>,
    next_deadline: DateTime<Utc>,
}

impl PressureWidget {
    pub fn new(
        bounds: Rect,
        sensor: Box<dyn SensorClient>,
        sensor_entity_id: String,
        renderer: Box<dyn HtmlRenderer>,
    ) -> Self {
        let area = (bounds.width() * bounds.height()) as usize;
        Self {
            bounds,
            sensor,
            sensor_entity_id,
            renderer,
            raster: vec![0xFF; area],
            next_deadline: Utc::now(),
        }
    }
}

impl WidgetKind for PressureWidget {
    fn name(&self) -> &'static str {
        "pressure"
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn next_deadline(&self) -> DateTime<Utc> {
        self.next_deadline
    }

    fn render(&mut self) -> Result<(), WidgetError> {
        let name = self.name();
        let hpa = self
            .sensor
            .read(&self.sensor_entity_id)
            .map_err(|source| {
                tracing::warn!(target: "widgets", widget = name, %source, "sensor read failed");
                WidgetError::Transient { widget: name, source }
            })?;
        let html = format!("<div class=\"pressure\">{hpa:.1} hPa</div>");
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FixedSensor(f64);
    impl SensorClient for FixedSensor {
        fn read(&self, _entity_id: &str) -> anyhow::Result<f64> {
            Ok(self.0)
        }
    }

    struct FailingSensor;
    impl SensorClient for FailingSensor {
        fn read(&self, _entity_id: &str) -> anyhow::Result<f64> {
            anyhow::bail!("sensor unreachable")
        }
    }

    struct StubRenderer {
        fill: u8,
        called: AtomicBool,
    }
    impl HtmlRenderer for StubRenderer {
        fn render(&self, _html: &str, width: u32, height: u32) -> anyhow::Result<Vec<u8>> {
            self.called.store(true, Ordering::SeqCst);
            Ok(vec![self.fill; (width * height) as usize])
        }
    }

    #[test]
    fn render_updates_raster_from_sensor() {
        let mut w = PressureWidget::new(
            Rect::new(0, 0, 4, 4),
            Box::new(FixedSensor(1013.2)),
            "sensor.pressure".into(),
            Box::new(StubRenderer { fill: 0x55, called: AtomicBool::new(false) }),
        );
        w.render().unwrap();
        assert!(w.raster().iter().all(|&b| b == 0x55));
    }

    #[test]
    fn sensor_failure_is_transient_and_keeps_previous_raster() {
        let mut w = PressureWidget::new(
            Rect::new(0, 0, 4, 4),
            Box::new(FailingSensor),
            "sensor.pressure".into(),
            Box::new(StubRenderer { fill: 0x55, called: AtomicBool::new(false) }),
        );
        let before = w.raster().to_vec();
        let err = w.render().unwrap_err();
        assert!(matches!(err, WidgetError::Transient { .. }));
        assert_eq!(w.raster(), before.as_slice());
    }

    #[test]
    fn redraw_finished_schedules_within_jitter_window() {
        let mut w = PressureWidget::new(
            Rect::new(0, 0, 4, 4),
            Box::new(FixedSensor(1013.2)),
            "sensor.pressure".into(),
            Box::new(StubRenderer { fill: 0x55, called: AtomicBool::new(false) }),
        );
        let before = Utc::now();
        w.redraw_finished();
        let delta = (w.next_deadline() - before).num_seconds();
        assert!((MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS + 1).contains(&delta));
    }
}
