//! Traits standing in for the out-of-scope collaborators each widget
//! delegates content generation to: HTML-to-raster rendering, sensor and
//! weather HTTP clients, astronomical computation, and digit glyph assets.
//! This crate only owns cadence, caching, and the protocol glue around
//! them.

use anyhow::Result;
use chrono::NaiveDate;

/// Renders an HTML fragment to a `width x height` grayscale raster
/// (16-shade invariant). The implementation (headless browser, whatever)
/// lives outside this crate.
pub trait HtmlRenderer: Send {
    fn render(&self, html: &str, width: u32, height: u32) -> Result<Vec<u8>>;
}

/// A single numeric/environmental reading from the home automation hub.
pub trait SensorClient: Send {
    fn read(&self, entity_id: &str) -> Result<f64>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ForecastPoint {
    pub hours_from_now: u32,
    pub temperature_celsius: f64,
    pub condition: ForecastCondition,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ForecastCondition {
    #[default]
    Clear,
    Clouds,
    Rain,
    Snow,
}

/// Fetches an hourly forecast window from the weather API.
pub trait WeatherClient: Send {
    fn forecast(&self) -> Result<Vec<ForecastPoint>>;
}

/// Computes sunrise/sunset for a given calendar date and coordinates.
pub trait DaylightCalculator: Send {
    /// Returns (sunrise, sunset) as minutes since local midnight.
    fn sunrise_sunset(&self, date: NaiveDate, latitude: f64, longitude: f64) -> Result<(u32, u32)>;
}

/// Pre-rasterised digit glyphs (0-59) and a colon separator, used by the
/// clock widget. Stands in for the original's PNG asset loading.
pub trait DigitGlyphs: Send {
    /// Grayscale raster for digit pair `n` (00-59), and its (width, height).
    fn digit(&self, n: u8) -> (&[u8], (u32, u32));
    fn colon(&self) -> (&[u8], (u32, u32));
}
