//! Panel driver contract: the opaque boundary between the render core and
//! the IT8951 SPI implementation.
//!
//! The real SPI transport lives outside this crate; [`PanelDriver`] is the
//! capability the render loop depends on, and [`EpdGuard`] is the RAII
//! lifecycle wrapper that guarantees the panel is left cleared and
//! powered down on drop, mirroring how a terminal backend restores the
//! screen on exit.

use core_geometry::Rect;
use thiserror::Error;

pub mod waveform;
pub use waveform::WaveformMode;

#[derive(Debug, Error)]
pub enum PanelError {
    #[error("panel hardware I/O failed: {0}")]
    Hardware(String),
    #[error("rectangle {rect:?} does not fit a {width}x{height} panel")]
    OutOfBounds {
        rect: Rect,
        width: u32,
        height: u32,
    },
}

/// Static facts about the attached panel, reported once at init time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelInfo {
    pub width: u32,
    pub height: u32,
    pub image_memory_address: u32,
}

/// The capability the render core depends on. Implementations own the SPI
/// transport; this crate never speaks to hardware directly.
pub trait PanelDriver {
    fn info(&self) -> PanelInfo;

    /// Full-screen refresh to white using the given waveform.
    fn clear(&mut self, mode: WaveformMode) -> Result<(), PanelError>;

    /// Submit a packed 4bpp rectangle (already mirrored to panel
    /// coordinates) using the given waveform.
    fn write_area(
        &mut self,
        rect: Rect,
        packed: &[u8],
        mode: WaveformMode,
    ) -> Result<(), PanelError>;
}

/// RAII guard ensuring the panel is cleared and left in a safe state even
/// if the caller early-returns or panics, the way a terminal backend
/// restores cooked mode on drop.
pub struct EpdGuard<'a, D: PanelDriver> {
    driver: &'a mut D,
    active: bool,
}

impl<'a, D: PanelDriver> EpdGuard<'a, D> {
    pub fn new(driver: &'a mut D) -> Self {
        Self {
            driver,
            active: true,
        }
    }

    pub fn driver(&mut self) -> &mut D {
        self.driver
    }
}

impl<'a, D: PanelDriver> Drop for EpdGuard<'a, D> {
    fn drop(&mut self) {
        if self.active {
            if let Err(err) = self.driver.clear(WaveformMode::Init) {
                tracing::error!(target: "panel", %err, "failed to clear panel on shutdown");
            }
            self.active = false;
        }
    }
}

/// A guard forwards the driver contract transparently, so callers can hand
/// the guard itself to anything that only needs a `PanelDriver` (the render
/// loop) while still getting the on-drop safety net.
impl<'a, D: PanelDriver> PanelDriver for EpdGuard<'a, D> {
    fn info(&self) -> PanelInfo {
        self.driver.info()
    }

    fn clear(&mut self, mode: WaveformMode) -> Result<(), PanelError> {
        self.driver.clear(mode)
    }

    fn write_area(
        &mut self,
        rect: Rect,
        packed: &[u8],
        mode: WaveformMode,
    ) -> Result<(), PanelError> {
        self.driver.write_area(rect, packed, mode)
    }
}
