// region:    --- Imports
use auction_market::config::Config;
use auction_market::database::DatabaseManager;
use auction_market::handlers;
use auction_market::scheduler::AuctionScheduler;
use auction_market::store::{MemoryStore, PostgresStore, SharedStore};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::time::Duration;
use tracing::{error, info, warn};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    let config = Config::from_env()?;

    // 저장소 선택: DATABASE_URL 이 있으면 Postgres, 없으면 메모리
    let store: SharedStore = match config.database_url.as_deref() {
        Some(database_url) => {
            let db_manager = Arc::new(DatabaseManager::connect(database_url, &config).await?);
            if let Err(e) = db_manager.initialize_database().await {
                error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
                return Err(e.into());
            }
            info!("{:<12} --> 데이터베이스 초기화 성공", "Main");
            Arc::new(PostgresStore::new(db_manager))
        }
        None => {
            warn!(
                "{:<12} --> DATABASE_URL 이 없어 메모리 저장소로 실행합니다",
                "Main"
            );
            MemoryStore::new_shared()
        }
    };

    // 경매 상태 스케줄러
    let scheduler = AuctionScheduler::new(
        Arc::clone(&store),
        Duration::from_millis(config.scheduler_interval_ms),
    );
    scheduler.start();

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, handlers::routes(store).into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
        return Err(err.into());
    }
    Ok(())
}
// endregion: --- Main
