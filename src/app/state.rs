use crate::app::page::PageTemplate;
use crate::domain::post::repository::PostRepository;
use crate::domain::sentiment::SentimentScorer;
use crate::infra::api::reddit::PostSource;
use crate::infra::cache::ResponseCache;
use crate::infra::chart::ChartRenderer;
use std::path::PathBuf;
use std::sync::Arc;

/// ハンドラー間で共有する依存関係
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn PostRepository>,
    pub source: Arc<dyn PostSource>,
    pub scorer: Arc<dyn SentimentScorer>,
    pub cache: Arc<dyn ResponseCache>,
    pub renderer: ChartRenderer,
    pub page: Arc<PageTemplate>,
    pub static_dir: PathBuf,
}
