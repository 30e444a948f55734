#[tokio::main]
async fn main() {
    factura_observability::init();

    let config = factura_api::config::ServiceConfig::from_env();

    let app = match factura_api::app::build_app(&config) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!("failed to build application: {e}");
            std::process::exit(1);
        }
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {e}", config.bind_addr));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
