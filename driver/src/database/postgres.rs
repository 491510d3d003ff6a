use std::ops::{Deref, DerefMut};

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, Pool, Postgres};

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::interface::query::{DependOnCarQuery, DependOnReservationQuery};
use kernel::interface::update::{DependOnCarModifier, DependOnReservationModifier};
use kernel::KernelError;

use crate::env;
use crate::error::ConvertError;

pub use self::{car::*, reservation::*};

mod car;
mod reservation;

const POSTGRES_URL: &str = "POSTGRES_URL";
const POSTGRES_MAX_CONNECTIONS: &str = "POSTGRES_MAX_CONNECTIONS";

pub struct PostgresDatabase {
    pool: Pool<Postgres>,
}

impl PostgresDatabase {
    /// Connects using `POSTGRES_URL` and applies pending migrations.
    pub async fn new() -> error_stack::Result<Self, KernelError> {
        let url = env(POSTGRES_URL)?;
        let max_connections = env(POSTGRES_MAX_CONNECTIONS)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(5);
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(&url)
            .await
            .convert_error()?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .convert_error()?;
        tracing::info!(max_connections, "Connected to PostgreSQL");
        Ok(Self { pool })
    }
}

impl Clone for PostgresDatabase {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
        }
    }
}

#[async_trait::async_trait]
impl DatabaseConnection<PostgresTransaction> for PostgresDatabase {
    async fn transact(&self) -> error_stack::Result<PostgresTransaction, KernelError> {
        let mut transaction = self.pool.begin().await.convert_error()?;
        // language=postgresql
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *transaction)
            .await
            .convert_error()?;
        Ok(PostgresTransaction(transaction))
    }
}

pub struct PostgresTransaction(sqlx::Transaction<'static, Postgres>);

#[async_trait::async_trait]
impl Transaction for PostgresTransaction {
    async fn commit(self) -> error_stack::Result<(), KernelError> {
        self.0.commit().await.convert_error()
    }

    async fn roll_back(self) -> error_stack::Result<(), KernelError> {
        self.0.rollback().await.convert_error()
    }
}

impl Deref for PostgresTransaction {
    type Target = PgConnection;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for PostgresTransaction {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl DependOnCarQuery<PostgresTransaction> for PostgresDatabase {
    type CarQuery = PostgresCarRepository;
    fn car_query(&self) -> &Self::CarQuery {
        &PostgresCarRepository
    }
}

impl DependOnCarModifier<PostgresTransaction> for PostgresDatabase {
    type CarModifier = PostgresCarRepository;
    fn car_modifier(&self) -> &Self::CarModifier {
        &PostgresCarRepository
    }
}

impl DependOnReservationQuery<PostgresTransaction> for PostgresDatabase {
    type ReservationQuery = PostgresReservationRepository;
    fn reservation_query(&self) -> &Self::ReservationQuery {
        &PostgresReservationRepository
    }
}

impl DependOnReservationModifier<PostgresTransaction> for PostgresDatabase {
    type ReservationModifier = PostgresReservationRepository;
    fn reservation_modifier(&self) -> &Self::ReservationModifier {
        &PostgresReservationRepository
    }
}
