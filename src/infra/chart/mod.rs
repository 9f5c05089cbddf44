pub mod bar;
pub mod cloud;
pub mod palette;

use crate::domain::post::model::SentimentResult;
use crate::infra::storage::file::write_file;
use crate::types::{InfraError, InfraResult};
use ab_glyph::{FontRef, PxScale};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::io::Cursor;
use std::path::{Path, PathBuf};

pub const BAR_CHART_FILE: &str = "sentiment_bar_chart.png";
pub const WORD_CLOUD_FILE: &str = "word_cloud.png";

/// 描画に使う埋め込みフォント
static FONT_BYTES: &[u8] = include_bytes!("../../../assets/fonts/DejaVuSans.ttf");

pub(crate) const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub(crate) const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub(crate) const GRID_GRAY: Rgb<u8> = Rgb([190, 190, 190]);

/// base64エンコード済みのPNG画像2枚
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartImages {
    pub bar_chart: String,
    pub word_cloud: String,
}

/// 感情ラベルごとの平均スコア（最初に現れた順）
pub fn average_scores_by_sentiment(results: &[SentimentResult]) -> Vec<(String, f64)> {
    let mut groups: Vec<(String, f64, usize)> = Vec::new();
    for result in results {
        let label = result.sentiment.as_str();
        match groups.iter_mut().find(|(l, _, _)| l == label) {
            Some((_, sum, count)) => {
                *sum += result.score;
                *count += 1;
            }
            None => groups.push((label.to_string(), result.score, 1)),
        }
    }

    groups
        .into_iter()
        .map(|(label, sum, count)| (label, sum / count as f64))
        .collect()
}

/// 棒グラフとワードクラウドを描画してファイルに保存する
#[derive(Clone)]
pub struct ChartRenderer {
    font: FontRef<'static>,
    images_dir: PathBuf,
}

impl ChartRenderer {
    pub fn new(images_dir: impl Into<PathBuf>) -> InfraResult<Self> {
        let font = FontRef::try_from_slice(FONT_BYTES)
            .map_err(|e| InfraError::image(format!("フォントの読み込みに失敗: {}", e)))?;
        Ok(Self {
            font,
            images_dir: images_dir.into(),
        })
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// 2枚の画像を描画し、保存したうえでbase64文字列を返す
    ///
    /// CPU負荷が高いため、非同期コンテキストからは `spawn_blocking` 経由で呼ぶこと。
    pub fn render(&self, results: &[SentimentResult], topic: &str) -> InfraResult<ChartImages> {
        let averages = average_scores_by_sentiment(results);
        let bar = bar::draw_bar_chart(&averages, topic, &self.font);

        let joined = results
            .iter()
            .map(|r| r.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let words = cloud::tokenize_words(&joined);
        let frequencies = cloud::word_frequencies(&words, cloud::MAX_WORDS);
        let word_cloud = cloud::draw_word_cloud(&frequencies, &self.font);

        Ok(ChartImages {
            bar_chart: self.save_png(&bar, BAR_CHART_FILE)?,
            word_cloud: self.save_png(&word_cloud, WORD_CLOUD_FILE)?,
        })
    }

    fn save_png(&self, img: &RgbImage, file_name: &str) -> InfraResult<String> {
        let bytes = encode_png(img)?;
        write_file(&self.images_dir.join(file_name), &bytes)?;
        Ok(STANDARD.encode(&bytes))
    }
}

fn encode_png(img: &RgbImage) -> InfraResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| InfraError::image(format!("PNGエンコードに失敗: {}", e)))?;
    Ok(buf.into_inner())
}

/// x座標を中心にしてテキストを描画
pub(crate) fn draw_centered_text(
    img: &mut RgbImage,
    color: Rgb<u8>,
    center_x: f32,
    y: i32,
    scale: PxScale,
    font: &FontRef<'static>,
    text: &str,
) {
    let (w, _) = text_size(scale, font, text);
    let x = (center_x - w as f32 / 2.0).round() as i32;
    draw_text_mut(img, color, x, y, scale, font, text);
}
