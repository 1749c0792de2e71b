//! Server mode
//!
//! 打开存储、注册 stats 路由并启动 HTTP 服务。

use actix_web::{App, HttpServer, middleware::Compress, web};
use anyhow::Result;
use tracing::{info, warn};

use crate::api::stats_routes;
use crate::config::AppConfig;
use crate::services::HitStatsService;
use crate::storage::StorageFactory;

/// 运行 HTTP 服务
///
/// 调用前需先初始化日志系统。
pub async fn run_server(config: AppConfig) -> Result<()> {
    let start = chrono::Utc::now();

    let storage = StorageFactory::create(&config.database).await.map_err(|e| {
        tracing::error!("Server startup failed: {}", e);
        e
    })?;
    info!("Using storage backend: {}", storage.get_backend_name());

    let service = web::Data::new(HitStatsService::new(storage));
    let app_config = web::Data::new(config.clone());

    let bind_address = format!("{}:{}", config.server.host, config.server.port);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .app_data(app_config.clone())
            .wrap(Compress::default())
            .service(stats_routes())
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .bind(&bind_address)?;

    warn!(
        "Starting server at http://{} (startup took {} ms)",
        bind_address,
        chrono::Utc::now()
            .signed_duration_since(start)
            .num_milliseconds()
    );

    server.run().await?;
    warn!("Server stopped");
    Ok(())
}
