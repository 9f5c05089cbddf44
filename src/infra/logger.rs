use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// グローバルなtracingサブスクライバーを初期化
///
/// ログレベルは環境変数 RUST_LOG から読み込み、未設定なら info。
/// .env の内容を反映させるには、先に `dotenvy::dotenv()` を呼ぶこと。
pub fn init_tracing() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_file(false)
        .with_line_number(false);

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracingサブスクライバーの初期化に失敗: {}", e))?;

    Ok(())
}
