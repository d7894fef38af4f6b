//! Placeholder implementations of the out-of-scope collaborators (HTTP
//! sensor/weather clients, HTML rendering, astronomical computation, and
//! clock glyph assets). Swapping these for real implementations does not
//! touch the render core.

use chrono::NaiveDate;
use widgets::collaborators::{DaylightCalculator, DigitGlyphs, ForecastPoint, HtmlRenderer, SensorClient, WeatherClient};

pub struct BlankHtmlRenderer;

impl HtmlRenderer for BlankHtmlRenderer {
    fn render(&self, _html: &str, width: u32, height: u32) -> anyhow::Result<Vec<u8>> {
        Ok(vec![0xFF; (width * height) as usize])
    }
}

pub struct UnconfiguredSensor;

impl SensorClient for UnconfiguredSensor {
    fn read(&self, entity_id: &str) -> anyhow::Result<f64> {
        anyhow::bail!("no Home Assistant client configured; cannot read '{entity_id}'")
    }
}

pub struct UnconfiguredWeather;

impl WeatherClient for UnconfiguredWeather {
    fn forecast(&self) -> anyhow::Result<Vec<ForecastPoint>> {
        Ok(Vec::new())
    }
}

pub struct NoopDaylight;

impl DaylightCalculator for NoopDaylight {
    fn sunrise_sunset(&self, _date: NaiveDate, _latitude: f64, _longitude: f64) -> anyhow::Result<(u32, u32)> {
        Ok((0, 0))
    }
}

/// Solid-fill digit glyphs; every digit pair and the colon render as an
/// evenly-gray 241x237 / 120x237 block respectively, matching the physical
/// station's asset dimensions without shipping the PNGs themselves.
pub struct SolidDigitGlyphs {
    digit: Vec<u8>,
    colon: Vec<u8>,
}

impl SolidDigitGlyphs {
    pub fn new() -> Self {
        Self {
            digit: vec![0x00; 241 * 237],
            colon: vec![0x00; 120 * 237],
        }
    }
}

impl Default for SolidDigitGlyphs {
    fn default() -> Self {
        Self::new()
    }
}

impl DigitGlyphs for SolidDigitGlyphs {
    fn digit(&self, _n: u8) -> (&[u8], (u32, u32)) {
        (&self.digit, (241, 237))
    }

    fn colon(&self) -> (&[u8], (u32, u32)) {
        (&self.colon, (120, 237))
    }
}
