//! Placeholder panel driver. The real IT8951 SPI transport is out of
//! scope for this crate (see the panel driver contract in
//! `core_panel::PanelDriver`); this implementation logs what it would
//! have sent and is useful for development off real hardware.

use core_geometry::Rect;
use core_panel::{PanelDriver, PanelError, PanelInfo, WaveformMode};

pub struct LoggingPanel {
    info: PanelInfo,
}

impl LoggingPanel {
    /// `vcom_millivolts` is accepted to mirror the real driver's
    /// initialization contract, even though this stand-in ignores it.
    pub fn init(vcom_millivolts: i32, width: u32, height: u32) -> Self {
        tracing::info!(target: "panel", vcom_millivolts, width, height, "initializing placeholder panel driver");
        Self {
            info: PanelInfo {
                width,
                height,
                image_memory_address: 0,
            },
        }
    }
}

impl PanelDriver for LoggingPanel {
    fn info(&self) -> PanelInfo {
        self.info
    }

    fn clear(&mut self, mode: WaveformMode) -> Result<(), PanelError> {
        tracing::debug!(target: "panel", ?mode, "clear");
        Ok(())
    }

    fn write_area(&mut self, rect: Rect, packed: &[u8], mode: WaveformMode) -> Result<(), PanelError> {
        tracing::debug!(
            target: "panel",
            min_x = rect.min_x, min_y = rect.min_y, max_x = rect.max_x, max_y = rect.max_y,
            bytes = packed.len(),
            ?mode,
            "write_area"
        );
        Ok(())
    }
}
