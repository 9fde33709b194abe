// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Meme image composition.
//!
//! Draws, in order, onto the unmodified base photo:
//! 1. A stat block in the top-left corner
//! 2. The word-wrapped caption, centered and bottom-anchored
//! 3. The attribution label in the bottom-right corner
//!
//! and encodes the result as JPEG. Every piece of text is outlined in a dark
//! color first and filled in a light color second so it stays readable on
//! any photo. Text rendering goes through [`TextRasterizer`], so the same
//! layout runs against a real font or a test double.

use crate::models::NormalizedActivity;
use ab_glyph::{Font, FontVec, PxScale};
use image::codecs::jpeg::JpegEncoder;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::path::Path;
use std::sync::Arc;

/// Text fill color.
pub const FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);
/// Outline color, drawn under the fill.
pub const STROKE: Rgba<u8> = Rgba([0, 0, 0, 255]);
/// Strava orange.
pub const BRAND: Rgba<u8> = Rgba([252, 76, 2, 255]);

pub const ATTRIBUTION: &str = "Powered by Strava";

/// Measures and draws text onto a canvas.
pub trait TextRasterizer: Send + Sync {
    /// Width and height in pixels of `text` at `size` px.
    fn measure(&self, text: &str, size: f32) -> (u32, u32);

    /// Draw `text` with its top-left corner at (`x`, `y`).
    fn draw(&self, canvas: &mut RgbaImage, text: &str, x: i32, y: i32, size: f32, color: Rgba<u8>);
}

/// [`TextRasterizer`] backed by a TrueType/OpenType font.
pub struct FontRasterizer {
    font: FontVec,
}

impl FontRasterizer {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ComposeError> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| ComposeError::Font(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(data)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, ComposeError> {
        let font = FontVec::try_from_vec(data).map_err(|e| ComposeError::Font(e.to_string()))?;
        Ok(Self { font })
    }

    /// Drop characters the font has no glyph for (emoji icons in most fonts)
    /// instead of drawing them as boxes.
    fn renderable(&self, text: &str) -> String {
        let kept: String = text
            .chars()
            .filter(|c| c.is_whitespace() || self.font.glyph_id(*c).0 != 0)
            .collect();
        kept.trim().to_string()
    }
}

impl TextRasterizer for FontRasterizer {
    fn measure(&self, text: &str, size: f32) -> (u32, u32) {
        text_size(PxScale::from(size), &self.font, &self.renderable(text))
    }

    fn draw(&self, canvas: &mut RgbaImage, text: &str, x: i32, y: i32, size: f32, color: Rgba<u8>) {
        let text = self.renderable(text);
        if !text.is_empty() {
            draw_text_mut(canvas, color, x, y, PxScale::from(size), &self.font, &text);
        }
    }
}

/// Fixed layout constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub caption_size: f32,
    pub caption_line_height: u32,
    /// Horizontal space kept free around a caption line (both sides together)
    pub caption_margin: u32,
    /// Gap between the last caption line and the bottom edge
    pub caption_bottom_margin: u32,
    pub caption_stroke: i32,
    pub stat_size: f32,
    pub stat_line_height: u32,
    pub stat_origin: (i32, i32),
    pub stat_stroke: i32,
    pub attribution_size: f32,
    pub attribution_margin: u32,
    pub jpeg_quality: u8,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            caption_size: 48.0,
            caption_line_height: 60,
            caption_margin: 40,
            caption_bottom_margin: 44,
            caption_stroke: 3,
            stat_size: 28.0,
            stat_line_height: 34,
            stat_origin: (20, 20),
            stat_stroke: 2,
            attribution_size: 18.0,
            attribution_margin: 10,
            jpeg_quality: 92,
        }
    }
}

/// Composition errors. All of them are fatal to a run.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("failed to decode photo: {0}")]
    Decode(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("failed to load font: {0}")]
    Font(String),
}

/// Composes memes from a photo, a caption and activity stats.
#[derive(Clone)]
pub struct ImageComposer {
    text: Arc<dyn TextRasterizer>,
    caption_text: Arc<dyn TextRasterizer>,
    layout: Layout,
}

impl ImageComposer {
    /// `text` renders the stats and attribution, `caption_text` (usually a
    /// bold face) renders the caption.
    pub fn new(
        text: Arc<dyn TextRasterizer>,
        caption_text: Arc<dyn TextRasterizer>,
        layout: Layout,
    ) -> Self {
        Self {
            text,
            caption_text,
            layout,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Compose a meme and return the encoded JPEG.
    pub fn compose(
        &self,
        photo: &[u8],
        caption: &str,
        activity: &NormalizedActivity,
    ) -> Result<Vec<u8>, ComposeError> {
        let base = image::load_from_memory(photo).map_err(|e| ComposeError::Decode(e.to_string()))?;
        let mut canvas = base.to_rgba8();

        self.draw_stats(&mut canvas, activity);
        self.draw_caption(&mut canvas, caption);
        self.draw_attribution(&mut canvas);

        encode_jpeg(canvas, self.layout.jpeg_quality)
    }

    fn draw_stats(&self, canvas: &mut RgbaImage, activity: &NormalizedActivity) {
        let (x, y0) = self.layout.stat_origin;
        for (i, line) in stat_lines(activity).iter().enumerate() {
            let y = y0 + (i as u32 * self.layout.stat_line_height) as i32;
            draw_outlined(
                self.text.as_ref(),
                canvas,
                line,
                (x, y),
                self.layout.stat_size,
                FILL,
                self.layout.stat_stroke,
            );
        }
    }

    fn draw_caption(&self, canvas: &mut RgbaImage, caption: &str) {
        let (width, height) = canvas.dimensions();
        let size = self.layout.caption_size;
        let lines = wrap_caption(caption, width.saturating_sub(self.layout.caption_margin), |s| {
            self.caption_text.measure(s, size).0
        });

        for (line, pos) in lines.iter().zip(self.caption_positions(width, height, &lines)) {
            draw_outlined(
                self.caption_text.as_ref(),
                canvas,
                line,
                pos,
                size,
                FILL,
                self.layout.caption_stroke,
            );
        }
    }

    /// Top-left corner of each caption line: horizontally centered, the
    /// block ending `caption_bottom_margin` above the bottom edge.
    fn caption_positions(&self, width: u32, height: u32, lines: &[String]) -> Vec<(i32, i32)> {
        let line_height = self.layout.caption_line_height as i64;
        let block_top = height as i64
            - line_height * lines.len() as i64
            - self.layout.caption_bottom_margin as i64;

        lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let (w, _) = self.caption_text.measure(line, self.layout.caption_size);
                let x = (width as i64 - w as i64) / 2;
                let y = block_top + i as i64 * line_height;
                (x as i32, y as i32)
            })
            .collect()
    }

    fn draw_attribution(&self, canvas: &mut RgbaImage) {
        let (width, height) = canvas.dimensions();
        let (w, h) = self.text.measure(ATTRIBUTION, self.layout.attribution_size);
        let margin = self.layout.attribution_margin as i64;
        let x = width as i64 - w as i64 - margin;
        let y = height as i64 - h as i64 - margin;
        draw_outlined(
            self.text.as_ref(),
            canvas,
            ATTRIBUTION,
            (x as i32, y as i32),
            self.layout.attribution_size,
            BRAND,
            1,
        );
    }
}

/// Draw the dark outline by stamping the text at every offset within
/// `stroke` pixels, then the fill on top. Reversing the order buries the
/// fill under the outline.
fn draw_outlined(
    text: &dyn TextRasterizer,
    canvas: &mut RgbaImage,
    line: &str,
    (x, y): (i32, i32),
    size: f32,
    fill: Rgba<u8>,
    stroke: i32,
) {
    for dy in -stroke..=stroke {
        for dx in -stroke..=stroke {
            if dx != 0 || dy != 0 {
                text.draw(canvas, line, x + dx, y + dy, size, STROKE);
            }
        }
    }
    text.draw(canvas, line, x, y, size, fill);
}

/// Greedy word wrap.
///
/// Words are appended to the current line while the measured width stays
/// under `max_width`; the word that would overflow starts the next line.
/// A word wider than `max_width` gets a line of its own and is never split.
/// An empty caption yields no lines.
pub fn wrap_caption(caption: &str, max_width: u32, measure: impl Fn(&str) -> u32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut words = caption.split_whitespace();
    let Some(first) = words.next() else {
        return lines;
    };

    let mut current = first.to_string();
    for word in words {
        let candidate = format!("{} {}", current, word);
        if measure(&candidate) < max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    lines.push(current);
    lines
}

/// Stat block lines, top to bottom.
pub fn stat_lines(activity: &NormalizedActivity) -> Vec<String> {
    vec![
        format!(
            "{} {}",
            activity_icon(&activity.activity_type),
            activity.activity_type
        ),
        format!("Distance: {} km", activity.distance_label()),
        format!("Time: {}", activity.duration),
        format!("Avg Speed: {} km/h", activity.avg_speed_label()),
    ]
}

/// Icon shown next to the activity type.
pub fn activity_icon(activity_type: &str) -> &'static str {
    match activity_type {
        "Run" | "TrailRun" | "VirtualRun" => "🏃",
        "Ride" | "GravelRide" | "MountainBikeRide" | "EBikeRide" | "EMountainBikeRide"
        | "VirtualRide" | "Velomobile" => "🚴",
        "Swim" => "🏊",
        "Walk" => "🚶",
        "Hike" => "🥾",
        "AlpineSki" | "BackcountrySki" | "NordicSki" => "⛷",
        "Snowboard" => "🏂",
        "Rowing" | "VirtualRow" | "Kayaking" | "Canoeing" | "StandUpPaddling" => "🚣",
        "WeightTraining" | "Crossfit" => "🏋",
        "Yoga" | "Pilates" => "🧘",
        "RockClimbing" => "🧗",
        _ => "🦆",
    }
}

fn encode_jpeg(canvas: RgbaImage, quality: u8) -> Result<Vec<u8>, ComposeError> {
    let rgb = image::DynamicImage::ImageRgba8(canvas).into_rgb8();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .encode_image(&rgb)
        .map_err(|e| ComposeError::Encode(e.to_string()))?;
    Ok(bytes)
}
