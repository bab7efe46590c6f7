use mock_server::ListShape;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mock_server=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let shape = match std::env::var("MOCK_LIST_SHAPE") {
        Ok(value) => value.parse().unwrap_or_else(|e: String| {
            tracing::warn!("{e}, serving bare lists");
            ListShape::Bare
        }),
        Err(_) => ListShape::Bare,
    };

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(?shape, "listening on {addr}");
    mock_server::run_with(listener, shape).await
}
