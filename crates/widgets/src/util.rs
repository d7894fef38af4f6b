//! Small raster-composition helpers shared across widgets: pasting glyphs
//! or sub-images into a cached raster, and wrapping the injected HTML
//! renderer collaborator with the widget-error conversion widgets need.

use crate::collaborators::HtmlRenderer;
use core_widget::WidgetError;

/// Render `html` through the injected collaborator and convert any failure
/// into a [`WidgetError::Transient`] tagged with the calling widget's name.
pub fn render_via_html(
    renderer: &dyn HtmlRenderer,
    html: &str,
    width: u32,
    height: u32,
    widget_name: &'static str,
) -> Result<Vec<u8>, WidgetError> {
    renderer.render(html, width, height).map_err(|source| {
        tracing::warn!(target: "widgets", widget = widget_name, %source, "html render failed");
        WidgetError::Transient {
            widget: widget_name,
            source,
        }
    })
}

/// Paste `src` (a `src_w x src_h` grayscale buffer) into `dst` (a
/// `dst_w`-wide grayscale buffer) at pixel offset `(x, y)`.
pub fn draw_image(dst: &mut [u8], dst_w: u32, x: u32, y: u32, src: &[u8], src_w: u32, src_h: u32) {
    for row in 0..src_h {
        let dst_start = (dst_w * (y + row) + x) as usize;
        let src_start = (src_w * row) as usize;
        let len = src_w as usize;
        dst[dst_start..dst_start + len].copy_from_slice(&src[src_start..src_start + len]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_image_pastes_at_offset() {
        let mut dst = vec![0xFFu8; 16]; // 4x4
        let src = vec![0x11u8; 4]; // 2x2
        draw_image(&mut dst, 4, 1, 1, &src, 2, 2);
        assert_eq!(dst[4 + 1], 0x11);
        assert_eq!(dst[4 + 2], 0x11);
        assert_eq!(dst[8 + 1], 0x11);
        assert_eq!(dst[8 + 2], 0x11);
        assert_eq!(dst[0], 0xFF);
    }
}
