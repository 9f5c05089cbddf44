use super::palette::viridis;
use super::WHITE;
use ab_glyph::{FontRef, PxScale};
use image::RgbImage;
use imageproc::drawing::{draw_text_mut, text_size};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

pub const WIDTH: u32 = 800;
pub const HEIGHT: u32 = 400;

/// 描画する単語の上限
pub const MAX_WORDS: usize = 200;

const MAX_FONT_SIZE: f32 = 90.0;
const MIN_FONT_SIZE: f32 = 10.0;
/// 頻度比をフォントサイズに反映する度合い
const RELATIVE_SCALING: f32 = 0.5;
const SHRINK_STEP: f32 = 0.8;
const WORD_PADDING: i32 = 2;

static NON_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z\s]").unwrap());

/// 英小文字と空白以外を取り除いて単語に分割
///
/// ```text
/// "Hello, World! 123" -> ["hello", "world"]
/// ```
pub fn tokenize_words(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_LETTER
        .replace_all(&lowered, "")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// 出現頻度の高い順（同数はアルファベット順）に上位の単語を返す
pub fn word_frequencies(words: &[String], limit: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for word in words {
        *counts.entry(word.as_str()).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(word, count)| (word.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

#[derive(Debug, Clone, Copy)]
struct Placed {
    x: i32,
    y: i32,
    w: i32,
    h: i32,
}

impl Placed {
    fn overlaps(&self, other: &Placed) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }

    fn inside(&self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.y >= 0 && self.x + self.w <= width && self.y + self.h <= height
    }
}

/// 中心から螺旋状に探索し、既存の単語と重ならない位置を返す
fn find_position(w: i32, h: i32, placed: &[Placed]) -> Option<Placed> {
    let (cx, cy) = (WIDTH as f32 / 2.0, HEIGHT as f32 / 2.0);
    let max_radius = (cx * cx + cy * cy).sqrt();
    let mut t = 0.0_f32;

    loop {
        let radius = 1.5 * t;
        if radius > max_radius {
            return None;
        }
        let candidate = Placed {
            x: (cx + radius * t.cos()) as i32 - w / 2,
            y: (cy + radius * t.sin()) as i32 - h / 2,
            w,
            h,
        };
        if candidate.inside(WIDTH as i32, HEIGHT as i32)
            && !placed.iter().any(|p| p.overlaps(&candidate))
        {
            return Some(candidate);
        }
        t += 0.1;
    }
}

/// 単語の頻度からワードクラウドを描画
///
/// 収まらない単語はフォントを縮小して再試行し、最小サイズでも置けなければ省く。
pub fn draw_word_cloud(frequencies: &[(String, usize)], font: &FontRef<'static>) -> RgbImage {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, WHITE);
    let Some(max_count) = frequencies.first().map(|(_, c)| *c as f32) else {
        return img;
    };

    let mut placed: Vec<Placed> = Vec::with_capacity(frequencies.len());
    let mut font_size = MAX_FONT_SIZE;

    for (word, count) in frequencies {
        let relative = *count as f32 / max_count;
        // 前の単語より大きくはしない
        font_size = font_size.min(MAX_FONT_SIZE * (RELATIVE_SCALING * relative + (1.0 - RELATIVE_SCALING)));

        let mut size = font_size;
        while size >= MIN_FONT_SIZE {
            let scale = PxScale::from(size);
            let (w, h) = text_size(scale, font, word);
            let (w, h) = (w as i32 + WORD_PADDING * 2, h as i32 + WORD_PADDING * 2);

            if let Some(slot) = find_position(w, h, &placed) {
                draw_text_mut(
                    &mut img,
                    viridis(relative),
                    slot.x + WORD_PADDING,
                    slot.y + WORD_PADDING,
                    scale,
                    font,
                    word,
                );
                placed.push(slot);
                break;
            }
            size *= SHRINK_STEP;
        }
        font_size = size.max(MIN_FONT_SIZE);
    }

    img
}
