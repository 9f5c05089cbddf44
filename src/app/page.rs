use crate::domain::post::model::SentimentResult;
use crate::infra::chart::ChartImages;
use anyhow::{Context, Result};
use serde::Serialize;

const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html");

/// 結果テーブルの1行
#[derive(Debug, Clone, Serialize)]
pub struct ResultRow {
    pub title: String,
    pub content: String,
    pub sentiment: String,
    /// 小数4桁に整形したスコア
    pub score: String,
}

impl From<&SentimentResult> for ResultRow {
    fn from(result: &SentimentResult) -> Self {
        Self {
            title: result.title.clone(),
            content: result.content.clone(),
            sentiment: result.sentiment.to_string(),
            score: format!("{:.4}", result.score),
        }
    }
}

/// テンプレートに渡す表示用データ
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub has_topic: bool,
    pub topic: String,
    pub num_records: u32,
    pub has_results: bool,
    pub results: Vec<ResultRow>,
    pub bar_chart_b64: String,
    pub word_cloud_b64: String,
}

impl PageView {
    /// 入力フォームのみの初期画面
    pub fn index(default_num_records: u32) -> Self {
        Self {
            has_topic: false,
            topic: String::new(),
            num_records: default_num_records,
            has_results: false,
            results: Vec::new(),
            bar_chart_b64: String::new(),
            word_cloud_b64: String::new(),
        }
    }

    /// 分析結果とグラフを含む画面
    pub fn analyzed(topic: &str, num_records: u32, results: &[SentimentResult], images: ChartImages) -> Self {
        Self {
            has_topic: true,
            topic: topic.to_string(),
            num_records,
            has_results: !results.is_empty(),
            results: results.iter().map(ResultRow::from).collect(),
            bar_chart_b64: images.bar_chart,
            word_cloud_b64: images.word_cloud,
        }
    }
}

/// コンパイル済みのページテンプレート
pub struct PageTemplate {
    template: mustache::Template,
}

impl PageTemplate {
    pub fn new() -> Result<Self> {
        let template = mustache::compile_str(INDEX_TEMPLATE).context("ページテンプレートのコンパイルに失敗")?;
        Ok(Self { template })
    }

    pub fn render(&self, view: &PageView) -> Result<String> {
        self.template
            .render_to_string(view)
            .context("ページの描画に失敗")
    }
}
