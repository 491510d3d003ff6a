use application::service::{
    CreateReservationService, DeleteReservationService, GetReservationService,
    UpdateReservationService,
};
use driver::database::{MemoryDatabase, PostgresDatabase};
use error_stack::ResultExt;
use kernel::KernelError;
use tokio::net::TcpListener;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::config::{Backend, ServerConfig};
use crate::error::StackTrace;
use crate::handler::{AppModule, Database};

mod config;
mod controller;
mod error;
mod handler;
mod identity;
mod request;
mod response;
mod route;
mod seed;

#[tokio::main]
async fn main() -> Result<(), StackTrace> {
    let config = ServerConfig::load()?;

    let appender = tracing_appender::rolling::daily(config.log_dir(), "debug.log");
    let (non_blocking_appender, _guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_filter(tracing_subscriber::EnvFilter::new(
                    std::env::var("RUST_LOG").unwrap_or_else(|_| {
                        "driver=debug,server=debug,application=debug,tower_http=debug,sqlx=info"
                            .into()
                    }),
                ))
                .with_filter(tracing_subscriber::filter::LevelFilter::DEBUG),
        )
        .with(
            tracing_subscriber::fmt::Layer::default()
                .with_writer(non_blocking_appender)
                .with_ansi(false)
                .with_filter(tracing_subscriber::filter::LevelFilter::DEBUG),
        )
        .init();

    match config.backend() {
        Backend::Postgres => serve(&config, PostgresDatabase::new().await?).await,
        Backend::Memory => {
            tracing::warn!("Running on the in-memory store, nothing will be persisted");
            let database = MemoryDatabase::new();
            match config.cars_file() {
                Some(path) => seed::seed_cars(&database, &seed::load_cars(path)?).await?,
                None => tracing::warn!("No cars file configured, every reservation will fail"),
            }
            serve(&config, database).await
        }
    }
}

async fn serve<D>(config: &ServerConfig, database: D) -> Result<(), StackTrace>
where
    D: Database
        + GetReservationService<D::Transaction>
        + CreateReservationService<D::Transaction>
        + UpdateReservationService<D::Transaction>
        + DeleteReservationService<D::Transaction>,
{
    let router = route::router(AppModule::new(database)).layer(route::cors(config.cors_origins()));

    let tcp = TcpListener::bind(config.addr())
        .await
        .change_context_lazy(|| KernelError::Internal)
        .attach_printable_lazy(|| "Failed to listen tcp")?;
    tracing::info!(addr = %config.addr(), "Listening");

    axum::serve(tcp, router.into_make_service())
        .await
        .change_context_lazy(|| KernelError::Internal)?;

    Ok(())
}
