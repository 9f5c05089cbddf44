use super::palette::coolwarm;
use super::{draw_centered_text, BLACK, GRID_GRAY, WHITE};
use ab_glyph::{FontRef, PxScale};
use image::{imageops, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

pub const WIDTH: u32 = 1000;
pub const HEIGHT: u32 = 600;

const MARGIN_LEFT: f32 = 100.0;
const MARGIN_RIGHT: f32 = 40.0;
const MARGIN_TOP: f32 = 70.0;
const MARGIN_BOTTOM: f32 = 90.0;
const TICK_COUNT: usize = 5;

/// 縦軸の表示範囲（0を必ず含む）
#[derive(Debug, Clone, Copy, PartialEq)]
struct AxisRange {
    min: f64,
    max: f64,
}

impl AxisRange {
    fn from_values(values: &[f64]) -> Self {
        let min = values.iter().copied().fold(0.0_f64, f64::min);
        let max = values.iter().copied().fold(0.0_f64, f64::max);
        if min == max {
            return Self { min: 0.0, max: 1.0 };
        }
        let pad = (max - min) * 0.1;
        Self {
            min: if min < 0.0 { min - pad } else { 0.0 },
            max: if max > 0.0 { max + pad } else { 0.0 },
        }
    }

    fn span(&self) -> f64 {
        self.max - self.min
    }
}

struct PlotArea {
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
    range: AxisRange,
}

impl PlotArea {
    fn y_of(&self, value: f64) -> f32 {
        let ratio = ((value - self.range.min) / self.range.span()) as f32;
        self.bottom - ratio * (self.bottom - self.top)
    }

    fn width(&self) -> f32 {
        self.right - self.left
    }
}

/// 感情ラベルごとの平均スコアを棒グラフに描画
pub fn draw_bar_chart(averages: &[(String, f64)], topic: &str, font: &FontRef<'static>) -> RgbImage {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, WHITE);
    let values: Vec<f64> = averages.iter().map(|(_, v)| *v).collect();
    let area = PlotArea {
        left: MARGIN_LEFT,
        right: WIDTH as f32 - MARGIN_RIGHT,
        top: MARGIN_TOP,
        bottom: HEIGHT as f32 - MARGIN_BOTTOM,
        range: AxisRange::from_values(&values),
    };

    draw_grid(&mut img, &area, font);
    draw_bars(&mut img, &area, averages, font);
    draw_axes(&mut img, &area);

    let title = format!("Sentiment Scores for the Reddit Posts on \"{}\"", topic);
    draw_centered_text(&mut img, BLACK, WIDTH as f32 / 2.0, 20, PxScale::from(26.0), font, &title);
    draw_centered_text(
        &mut img,
        BLACK,
        (area.left + area.right) / 2.0,
        HEIGHT as i32 - 40,
        PxScale::from(22.0),
        font,
        "Sentiment",
    );
    draw_y_label(&mut img, &area, font, "Average Score");

    img
}

/// 目盛りごとの破線グリッドと目盛りラベル
fn draw_grid(img: &mut RgbImage, area: &PlotArea, font: &FontRef<'static>) {
    let scale = PxScale::from(16.0);
    for i in 0..=TICK_COUNT {
        let value = area.range.min + area.range.span() * i as f64 / TICK_COUNT as f64;
        let y = area.y_of(value);
        draw_dashed_hline(img, area.left, area.right, y, GRID_GRAY);

        let label = format!("{:.2}", value);
        let (w, h) = text_size(scale, font, &label);
        draw_text_mut(
            img,
            BLACK,
            (area.left - 8.0) as i32 - w as i32,
            y as i32 - h as i32 / 2,
            scale,
            font,
            &label,
        );
    }
}

fn draw_bars(img: &mut RgbImage, area: &PlotArea, averages: &[(String, f64)], font: &FontRef<'static>) {
    if averages.is_empty() {
        return;
    }

    let colors = coolwarm(averages.len());
    let slot = area.width() / averages.len() as f32;
    let bar_width = slot * 0.6;
    let zero_y = area.y_of(0.0);
    let value_scale = PxScale::from(18.0);
    let label_scale = PxScale::from(18.0);

    for (i, ((label, value), color)) in averages.iter().zip(colors).enumerate() {
        let center = area.left + slot * (i as f32 + 0.5);
        let value_y = area.y_of(*value);
        let (top, bottom) = if value_y < zero_y {
            (value_y, zero_y)
        } else {
            (zero_y, value_y)
        };
        let height = (bottom - top).round().max(1.0) as u32;
        draw_filled_rect_mut(
            img,
            Rect::at((center - bar_width / 2.0) as i32, top.round() as i32)
                .of_size(bar_width as u32, height),
            color,
        );

        // 棒の先端に値を表示（負の値は棒の下側）
        let text = format!("{:.2}", value);
        let (_, h) = text_size(value_scale, font, &text);
        let text_y = if *value >= 0.0 {
            top as i32 - h as i32 - 6
        } else {
            bottom as i32 + 6
        };
        draw_centered_text(img, BLACK, center, text_y, value_scale, font, &text);

        draw_centered_text(img, BLACK, center, area.bottom as i32 + 10, label_scale, font, label);
    }
}

fn draw_axes(img: &mut RgbImage, area: &PlotArea) {
    draw_line_segment_mut(img, (area.left, area.top), (area.left, area.bottom), BLACK);
    draw_line_segment_mut(img, (area.left, area.bottom), (area.right, area.bottom), BLACK);
    let zero_y = area.y_of(0.0);
    draw_line_segment_mut(img, (area.left, zero_y), (area.right, zero_y), BLACK);
}

fn draw_dashed_hline(img: &mut RgbImage, from: f32, to: f32, y: f32, color: Rgb<u8>) {
    const DASH: f32 = 6.0;
    const GAP: f32 = 4.0;
    let mut x = from;
    while x < to {
        let end = (x + DASH).min(to);
        draw_line_segment_mut(img, (x, y), (end, y), color);
        x += DASH + GAP;
    }
}

/// 縦軸ラベルは横書きで描いてから90度回転して重ねる
fn draw_y_label(img: &mut RgbImage, area: &PlotArea, font: &FontRef<'static>, text: &str) {
    let scale = PxScale::from(22.0);
    let (w, h) = text_size(scale, font, text);
    let mut label = RgbImage::from_pixel(w + 4, h + 8, WHITE);
    draw_text_mut(&mut label, BLACK, 2, 2, scale, font, text);
    let rotated = imageops::rotate270(&label);

    let x = 10;
    let y = ((area.top + area.bottom) / 2.0) as i64 - rotated.height() as i64 / 2;
    imageops::overlay(img, &rotated, x, y);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_range_includes_zero() {
        let range = AxisRange::from_values(&[0.5, 0.25]);
        assert_eq!(range.min, 0.0);
        assert!(range.max > 0.5);

        let range = AxisRange::from_values(&[0.4, -0.6]);
        assert!(range.min < -0.6);
        assert!(range.max > 0.4);
    }

    #[test]
    fn test_axis_range_for_empty_input() {
        assert_eq!(AxisRange::from_values(&[]), AxisRange { min: 0.0, max: 1.0 });
    }

    #[test]
    fn test_y_of_maps_range_to_plot() {
        let area = PlotArea {
            left: 0.0,
            right: 100.0,
            top: 0.0,
            bottom: 100.0,
            range: AxisRange { min: -1.0, max: 1.0 },
        };
        assert_eq!(area.y_of(1.0), 0.0);
        assert_eq!(area.y_of(0.0), 50.0);
        assert_eq!(area.y_of(-1.0), 100.0);
    }
}
