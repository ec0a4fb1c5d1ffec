//! Weekly chart rasterization.
//!
//! Renders the 7-day aggregation into a PNG bar chart. The artifact is
//! intentionally plain (baseline, gridlines, one bar per day); the exact
//! dates and counts always travel next to it in the response, so clients
//! that want labels have the numbers.

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use repwise_core::DayTotal;
use std::io::Cursor;
use thiserror::Error;

/// Errors from chart rendering.
#[derive(Debug, Error)]
pub enum ChartError {
    /// PNG encoding failed.
    #[error("chart encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Renders a week of day totals into an image artifact.
pub trait ChartRenderer: Send + Sync {
    /// Produce PNG bytes for the given week.
    fn render(&self, week: &[DayTotal]) -> Result<Vec<u8>, ChartError>;
}

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const AXIS_COLOR: Rgba<u8> = Rgba([60, 60, 60, 255]);
const GRID_COLOR: Rgba<u8> = Rgba([225, 225, 225, 255]);
const BAR_COLOR: Rgba<u8> = Rgba([55, 120, 235, 255]);

/// Plain bar chart renderer.
#[derive(Debug, Clone, Copy)]
pub struct BarChartRenderer {
    width: u32,
    height: u32,
}

impl BarChartRenderer {
    /// Renderer with explicit canvas dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(100),
            height: height.max(60),
        }
    }
}

impl Default for BarChartRenderer {
    fn default() -> Self {
        Self::new(700, 360)
    }
}

const MARGIN_LEFT: u32 = 40;
const MARGIN_RIGHT: u32 = 20;
const MARGIN_TOP: u32 = 20;
const MARGIN_BOTTOM: u32 = 30;

impl ChartRenderer for BarChartRenderer {
    fn render(&self, week: &[DayTotal]) -> Result<Vec<u8>, ChartError> {
        let mut img = RgbaImage::from_pixel(self.width, self.height, BACKGROUND);

        let plot_left = MARGIN_LEFT;
        let plot_right = self.width.saturating_sub(MARGIN_RIGHT);
        let plot_top = MARGIN_TOP;
        let plot_bottom = self.height.saturating_sub(MARGIN_BOTTOM);
        let plot_width = plot_right.saturating_sub(plot_left);
        let plot_height = plot_bottom.saturating_sub(plot_top);

        // Quarter-height gridlines.
        for quarter in 1..=3 {
            let y = plot_bottom - plot_height * quarter / 4;
            fill_rect(&mut img, plot_left, y, plot_width, 1, GRID_COLOR);
        }

        // Bars, scaled against the busiest day.
        let max_count = week.iter().map(|d| d.count).max().unwrap_or(0).max(1);
        let buckets = week.len().max(1) as u32;
        let slot = plot_width / buckets;
        let bar_width = (slot * 7 / 10).max(1);

        for (i, day) in week.iter().enumerate() {
            let bar_height = (u64::from(day.count) * u64::from(plot_height)
                / u64::from(max_count)) as u32;
            if bar_height == 0 {
                continue;
            }
            let x = plot_left + slot * i as u32 + (slot - bar_width) / 2;
            let y = plot_bottom - bar_height;
            fill_rect(&mut img, x, y, bar_width, bar_height, BAR_COLOR);
        }

        // Axes over the bars so the baseline stays crisp.
        fill_rect(&mut img, plot_left, plot_bottom, plot_width, 2, AXIS_COLOR);
        fill_rect(&mut img, plot_left, plot_top, 2, plot_height + 2, AXIS_COLOR);

        // Day ticks under the baseline.
        for i in 0..buckets {
            let x = plot_left + slot * i + slot / 2;
            fill_rect(&mut img, x, plot_bottom + 2, 2, 5, AXIS_COLOR);
        }

        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img).write_to(&mut bytes, ImageFormat::Png)?;
        Ok(bytes.into_inner())
    }
}

fn fill_rect(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
    for py in y..y.saturating_add(h).min(img.height()) {
        for px in x..x.saturating_add(w).min(img.width()) {
            img.put_pixel(px, py, color);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
