//! Configuration loading and parsing.
//!
//! Parses the station's TOML config file (or an override path supplied by
//! the binary) into [`Config`]. Unknown fields are ignored and missing
//! sections fall back to field-level defaults (`#[serde(default)]`) so the
//! station still boots — showing at least the clock — when sensor or
//! weather settings are absent or malformed. A read or parse failure is
//! never fatal at startup; it falls back to [`Config::default`].

use anyhow::Result;
use core_geometry::Rect;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

#[derive(Debug, Deserialize, Clone)]
pub struct HomeAssistantSettings {
    #[serde(default)]
    pub server_protocol: String,
    #[serde(default)]
    pub server_address: String,
    #[serde(default)]
    pub server_port: u16,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub internal_temperature_sensor: String,
    #[serde(default)]
    pub external_temperature_sensor: String,
    #[serde(default)]
    pub internal_humidity_sensor: String,
    #[serde(default)]
    pub external_humidity_sensor: String,
    #[serde(default)]
    pub pressure_sensor: String,
}

impl Default for HomeAssistantSettings {
    fn default() -> Self {
        Self {
            server_protocol: "http".to_string(),
            server_address: String::new(),
            server_port: 8123,
            token: String::new(),
            internal_temperature_sensor: String::new(),
            external_temperature_sensor: String::new(),
            internal_humidity_sensor: String::new(),
            external_humidity_sensor: String::new(),
            pressure_sensor: String::new(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct OpenWeatherMapSettings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub post_code: String,
    #[serde(default)]
    pub country_code: String,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct DaylightSettings {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

impl Default for DaylightSettings {
    fn default() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SpecialDay {
    pub index: u32,
    pub id: String,
    pub display_text: String,
    pub kind: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub is_public_holiday: bool,
    #[serde(default)]
    pub is_school_holiday: bool,
}

/// Plain rectangle DTO so this crate doesn't force a serde dependency on
/// `core-geometry`; converted into `core_geometry::Rect` after parsing.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct RectConfig {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl From<RectConfig> for Rect {
    fn from(r: RectConfig) -> Self {
        Rect::new(r.min_x, r.min_y, r.max_x, r.max_y)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScreenLayout {
    pub clock: RectConfig,
    pub temperature: RectConfig,
    pub pressure: RectConfig,
    pub sunrise_sunset: RectConfig,
    pub calendar: RectConfig,
    pub forecast: RectConfig,
}

impl Default for ScreenLayout {
    /// The layout shipped on the physical station's 1872x1404 panel.
    fn default() -> Self {
        Self {
            clock: RectConfig { min_x: 0, min_y: 0, max_x: 963, max_y: 237 },
            temperature: RectConfig { min_x: 1000, min_y: 0, max_x: 1850, max_y: 481 },
            pressure: RectConfig { min_x: 1000, min_y: 500, max_x: 1450, max_y: 900 },
            sunrise_sunset: RectConfig { min_x: 1450, min_y: 500, max_x: 1870, max_y: 900 },
            calendar: RectConfig { min_x: 0, min_y: 280, max_x: 962, max_y: 1400 },
            forecast: RectConfig { min_x: 1000, min_y: 900, max_x: 1871, max_y: 1400 },
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub vcom_millivolts: i32,
    #[serde(default)]
    pub home_assistant: HomeAssistantSettings,
    #[serde(default)]
    pub open_weather_map: OpenWeatherMapSettings,
    #[serde(default)]
    pub daylight: DaylightSettings,
    #[serde(default)]
    pub special_days: Vec<SpecialDay>,
    #[serde(default)]
    pub screen_layout: ScreenLayout,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>,
    pub file: ConfigFile,
}

/// Best-effort config path following platform conventions (XDG / AppData).
pub fn discover() -> PathBuf {
    let local = PathBuf::from("meteo-station.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("meteo-station").join("config.toml");
    }
    PathBuf::from("meteo-station.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    if let Ok(content) = fs::read_to_string(&path) {
        match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => {
                info!(target: "config", path = %path.display(), "loaded configuration");
                Ok(Config {
                    raw: Some(content),
                    file,
                })
            }
            Err(e) => {
                warn!(target: "config", path = %path.display(), error = %e, "failed to parse configuration, falling back to defaults");
                Ok(Config::default())
            }
        }
    } else {
        warn!(target: "config", path = %path.display(), "configuration file not found, falling back to defaults");
        Ok(Config::default())
    }
}

impl Config {
    /// Validates the configured screen layout against the panel's reported
    /// dimensions. Each widget rectangle must fit entirely on the panel.
    pub fn validate_screen_layout(&self, panel_width: u32, panel_height: u32) -> Result<()> {
        let screen = Rect::full(panel_width, panel_height);
        let layout = &self.file.screen_layout;
        for (name, rect) in [
            ("clock", layout.clock),
            ("temperature", layout.temperature),
            ("pressure", layout.pressure),
            ("sunrise_sunset", layout.sunrise_sunset),
            ("calendar", layout.calendar),
            ("forecast", layout.forecast),
        ] {
            let rect: Rect = rect.into();
            if !rect.is_contained_in(screen) {
                anyhow::bail!(
                    "configured '{name}' rectangle {rect:?} does not fit a {panel_width}x{panel_height} panel"
                );
            }
        }
        Ok(())
    }
}

/// Command flags mutated by the (out-of-scope) web UI and polled by the
/// render loop at well-defined points.
pub mod flags {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct Inner {
        redraw_all: AtomicBool,
        simple_refresh: AtomicBool,
        calendar_redraw: AtomicBool,
    }

    /// Cheaply cloneable handle shared between the web UI and the render
    /// loop. Each flag is take-and-clear: observers reset it after acting.
    #[derive(Debug, Clone, Default)]
    pub struct CommandFlags(Arc<Inner>);

    impl CommandFlags {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_redraw_all(&self) {
            self.0.redraw_all.store(true, Ordering::SeqCst);
        }

        pub fn take_redraw_all(&self) -> bool {
            self.0.redraw_all.swap(false, Ordering::SeqCst)
        }

        pub fn set_simple_refresh(&self) {
            self.0.simple_refresh.store(true, Ordering::SeqCst);
        }

        pub fn take_simple_refresh(&self) -> bool {
            self.0.simple_refresh.swap(false, Ordering::SeqCst)
        }

        pub fn set_calendar_redraw(&self) {
            self.0.calendar_redraw.store(true, Ordering::SeqCst);
        }

        pub fn take_calendar_redraw(&self) -> bool {
            self.0.calendar_redraw.swap(false, Ordering::SeqCst)
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert_eq!(cfg.file.vcom_millivolts, 0);
        assert_eq!(cfg.file.home_assistant.server_port, 8123);
    }

    #[test]
    fn parses_home_assistant_and_vcom() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            r#"
            vcom_millivolts = -1530
            [home_assistant]
            server_address = "hass.local"
            server_port = 8123
            token = "secret"
            "#,
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file.vcom_millivolts, -1530);
        assert_eq!(cfg.file.home_assistant.server_address, "hass.local");
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "not = [valid toml").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file.vcom_millivolts, 0);
    }

    #[test]
    fn default_screen_layout_fits_the_physical_panel() {
        let cfg = Config::default();
        cfg.validate_screen_layout(1872, 1404).unwrap();
    }

    #[test]
    fn screen_layout_rejects_oversized_rectangle() {
        let mut cfg = Config::default();
        cfg.file.screen_layout.clock.max_x = 5000;
        let err = cfg.validate_screen_layout(1872, 1404).unwrap_err();
        assert!(err.to_string().contains("clock"));
    }

    #[test]
    fn parses_special_days() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            r#"
            [[special_days]]
            index = 0
            id = "christmas"
            display_text = "Christmas"
            kind = "holiday"
            start_date = "2026-12-25"
            end_date = "2026-12-25"
            is_public_holiday = true
            "#,
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file.special_days.len(), 1);
        assert!(cfg.file.special_days[0].is_public_holiday);
    }
}
