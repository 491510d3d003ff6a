use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::HeaderValue;
use error_stack::{Report, ResultExt};
use kernel::KernelError;

const SERVER_ADDR: &str = "SERVER_ADDR";
const LOG_DIR: &str = "LOG_DIR";
const DATABASE_BACKEND: &str = "DATABASE_BACKEND";
const CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";
const MEMORY_CARS_FILE: &str = "MEMORY_CARS_FILE";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Backend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    addr: SocketAddr,
    log_dir: PathBuf,
    backend: Backend,
    cors_origins: Vec<HeaderValue>,
    cars_file: Option<PathBuf>,
}

impl ServerConfig {
    /// Reads the process environment, honoring a `.env` file.
    pub fn load() -> error_stack::Result<Self, KernelError> {
        let addr = var(SERVER_ADDR)
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse::<SocketAddr>()
            .change_context_lazy(|| KernelError::Internal)
            .attach_printable_lazy(|| format!("{SERVER_ADDR} is not a socket address"))?;
        let log_dir = var(LOG_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./logs/"));
        let backend = parse_backend(var(DATABASE_BACKEND).as_deref())?;
        let cors_origins = parse_origins(var(CORS_ALLOWED_ORIGINS).as_deref())?;
        let cars_file = var(MEMORY_CARS_FILE).map(PathBuf::from);
        Ok(Self {
            addr,
            log_dir,
            backend,
            cors_origins,
            cars_file,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn log_dir(&self) -> &PathBuf {
        &self.log_dir
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Origins allowed to call the API from a browser. Empty denies every cross-origin caller.
    pub fn cors_origins(&self) -> &[HeaderValue] {
        &self.cors_origins
    }

    /// JSON list of cars loaded into the in-memory store at start-up.
    pub fn cars_file(&self) -> Option<&PathBuf> {
        self.cars_file.as_ref()
    }
}

fn var(key: &str) -> Option<String> {
    dotenvy::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_backend(value: Option<&str>) -> error_stack::Result<Backend, KernelError> {
    match value.map(str::trim) {
        None => Ok(Backend::Postgres),
        Some(value) if value.eq_ignore_ascii_case("postgres") => Ok(Backend::Postgres),
        Some(value) if value.eq_ignore_ascii_case("memory") => Ok(Backend::Memory),
        Some(other) => Err(Report::new(KernelError::Internal).attach_printable(format!(
            "Unknown {DATABASE_BACKEND} `{other}`, expected `postgres` or `memory`"
        ))),
    }
}

fn parse_origins(value: Option<&str>) -> error_stack::Result<Vec<HeaderValue>, KernelError> {
    value
        .into_iter()
        .flat_map(|origins| origins.split(','))
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin)
                .change_context_lazy(|| KernelError::Internal)
                .attach_printable_lazy(|| {
                    format!("{CORS_ALLOWED_ORIGINS} contains an invalid origin `{origin}`")
                })
        })
        .collect()
}
