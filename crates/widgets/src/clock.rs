//! Second-accurate digital clock, redrawing only the digit pair(s) that
//! actually changed on the current tick.

use crate::collaborators::DigitGlyphs;
use crate::util::draw_image;
use chrono::{DateTime, Duration, Timelike, Utc};
use core_geometry::Rect;
use core_panel::WaveformMode;
use core_widget::{WidgetError, WidgetKind};

pub struct ClockWidget {
    bounds: Rect,
    glyphs: Box<dyn DigitGlyphs>,
    raster: Vec<u8>,
    next_deadline: DateTime<Utc>,
    // unrealistic sentinel values force a full draw on the very first render
    hour: u32,
    minute: u32,
    second: u32,
}

impl ClockWidget {
    pub fn new(bounds: Rect, glyphs: Box<dyn DigitGlyphs>) -> Self {
        let area = (bounds.width() * bounds.height()) as usize;
        let mut raster = vec![0xFFu8; area];
        let (colon, colon_size) = glyphs.colon();
        let (_, digit_size) = glyphs.digit(0);
        draw_image(&mut raster, bounds.width(), digit_size.0, 0, colon, colon_size.0, colon_size.1);
        draw_image(
            &mut raster,
            bounds.width(),
            digit_size.0 * 2 + colon_size.0,
            0,
            colon,
            colon_size.0,
            colon_size.1,
        );
        Self {
            bounds,
            glyphs,
            raster,
            next_deadline: Utc::now(),
            hour: 70,
            minute: 70,
            second: 70,
        }
    }

    fn draw_digit_pair(&mut self, x_offset: u32, value: u32) {
        let width = self.bounds.width();
        let (raster, (w, h)) = self.glyphs.digit(value as u8);
        draw_image(&mut self.raster, width, x_offset, 0, raster, w, h);
    }
}

impl WidgetKind for ClockWidget {
    fn name(&self) -> &'static str {
        "clock"
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn next_deadline(&self) -> DateTime<Utc> {
        self.next_deadline
    }

    fn render(&mut self) -> Result<(), WidgetError> {
        let now = Utc::now();
        let hour = now.hour();
        let minute = now.minute();
        let second = now.second();

        let (_, (digit_w, _)) = self.glyphs.digit(0);
        let (_, (colon_w, _)) = self.glyphs.colon();

        if self.hour != hour {
            self.draw_digit_pair(0, hour);
        }
        if self.minute != minute {
            self.draw_digit_pair(digit_w + colon_w, minute);
        }
        if self.second != second {
            self.draw_digit_pair(digit_w * 2 + colon_w * 2, second);
        }
        self.hour = hour;
        self.minute = minute;
        self.second = second;
        Ok(())
    }

    fn raster(&self) -> &[u8] {
        &self.raster
    }

    fn waveform_mode(&self) -> WaveformMode {
        WaveformMode::Fast
    }

    fn redraw_finished(&mut self) {
        let now = Utc::now().duration_trunc(Duration::seconds(1)).unwrap_or_else(|_| Utc::now());
        self.next_deadline = now + Duration::seconds(1);
    }

    fn force_redraw(&mut self) {
        self.next_deadline = Utc::now();
    }
}

trait DurationTrunc {
    fn duration_trunc(self, d: Duration) -> Result<DateTime<Utc>, ()>;
}

impl DurationTrunc for DateTime<Utc> {
    fn duration_trunc(self, d: Duration) -> Result<DateTime<Utc>, ()> {
        let secs = d.num_seconds().max(1);
        let ts = self.timestamp();
        let truncated = ts - ts.rem_euclid(secs);
        DateTime::from_timestamp(truncated, 0).ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeGlyphs;

    impl DigitGlyphs for FakeGlyphs {
        fn digit(&self, n: u8) -> (&[u8], (u32, u32)) {
            // deterministic buffer of the right size; content value tags n
            let _ = n;
            (&DIGIT_RASTER, (4, 2))
        }
        fn colon(&self) -> (&[u8], (u32, u32)) {
            (&COLON_RASTER, (2, 2))
        }
    }

    static DIGIT_RASTER: [u8; 8] = [0x11; 8];
    static COLON_RASTER: [u8; 4] = [0x22; 4];

    fn bounds() -> Rect {
        // width = 4 + 2 + 4 + 2 + 4 = 16, height = 2
        Rect::new(0, 0, 16, 2)
    }

    #[test]
    fn first_render_draws_all_three_digit_pairs() {
        let mut w = ClockWidget::new(bounds(), Box::new(FakeGlyphs));
        w.render().unwrap();
        // all three digit slots should now contain the digit raster value
        assert_eq!(w.raster()[0], 0x11);
        assert_eq!(w.raster()[6], 0x11);
        assert_eq!(w.raster()[12], 0x11);
    }

    #[test]
    fn deadline_advances_to_next_second_boundary() {
        let mut w = ClockWidget::new(bounds(), Box::new(FakeGlyphs));
        w.render().unwrap();
        let before = Utc::now();
        w.redraw_finished();
        assert!(w.next_deadline() > before - Duration::seconds(1));
        assert!(w.next_deadline() <= before + Duration::seconds(2));
    }

    #[test]
    fn force_redraw_sets_deadline_to_now() {
        let mut w = ClockWidget::new(bounds(), Box::new(FakeGlyphs));
        w.redraw_finished();
        let far_future = w.next_deadline();
        w.force_redraw();
        assert!(w.next_deadline() < far_future);
    }
}
