use anyhow::Context;
use kimochi::app::page::PageTemplate;
use kimochi::app::{create_router, AppState};
use kimochi::domain::post::repository::PgPostRepository;
use kimochi::domain::sentiment::VaderScorer;
use kimochi::infra::api::reddit::RedditClient;
use kimochi::infra::cache::build_cache;
use kimochi::infra::chart::ChartRenderer;
use kimochi::infra::config::AppConfig;
use kimochi::infra::db::setup_database;
use kimochi::infra::logger::init_tracing;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 環境変数を読み込み（.envファイルがあれば使用）
    let _ = dotenvy::dotenv();
    init_tracing()?;

    let config = AppConfig::from_env().context("設定の読み込みに失敗")?;
    let pool = setup_database(&config.database_url).await?;
    let cache = build_cache(&config.cache).await?;

    let state = AppState {
        repository: Arc::new(PgPostRepository::new(pool)),
        source: Arc::new(RedditClient::new(config.reddit.clone())?),
        scorer: Arc::new(VaderScorer::new()),
        cache,
        renderer: ChartRenderer::new(&config.images_dir)?,
        page: Arc::new(PageTemplate::new()?),
        static_dir: config.static_dir.clone(),
    };

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("{} へのバインドに失敗", config.bind_addr))?;
    tracing::info!("サーバーを起動しました: http://{}", config.bind_addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("サーバーの実行中にエラーが発生")?;

    tracing::info!("サーバーを停止しました");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("シャットダウンシグナルの待機に失敗: {}", e);
    }
}
