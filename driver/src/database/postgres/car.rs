use sqlx::PgConnection;
use uuid::Uuid;

use kernel::interface::query::CarQuery;
use kernel::interface::update::CarModifier;
use kernel::prelude::entity::{
    Car, CarBrand, CarId, CarIsAutomatic, CarIsPublish, CarModel, CarPlateNumber, CarPricePerDay,
    CarYear,
};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresCarRepository;

#[async_trait::async_trait]
impl CarQuery<PostgresTransaction> for PostgresCarRepository {
    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &CarId,
    ) -> error_stack::Result<Option<Car>, KernelError> {
        PgCarInternal::find_by_id(con, id).await
    }
}

#[async_trait::async_trait]
impl CarModifier<PostgresTransaction> for PostgresCarRepository {
    async fn create(
        &self,
        con: &mut PostgresTransaction,
        car: &Car,
    ) -> error_stack::Result<(), KernelError> {
        PgCarInternal::create(con, car).await
    }

    async fn withdraw(
        &self,
        con: &mut PostgresTransaction,
        id: &CarId,
    ) -> error_stack::Result<bool, KernelError> {
        PgCarInternal::withdraw(con, id).await
    }
}

#[derive(sqlx::FromRow)]
struct CarRow {
    id: Uuid,
    plate_number: String,
    brand: String,
    car_model: String,
    year: i32,
    is_automatic: bool,
    price_per_day: f64,
    is_publish: bool,
}

impl From<CarRow> for Car {
    fn from(row: CarRow) -> Self {
        Car::new(
            CarId::new(row.id),
            CarPlateNumber::new(row.plate_number),
            CarBrand::new(row.brand),
            CarModel::new(row.car_model),
            CarYear::new(row.year),
            CarIsAutomatic::new(row.is_automatic),
            CarPricePerDay::new(row.price_per_day),
            CarIsPublish::new(row.is_publish),
        )
    }
}

pub(in crate::database) struct PgCarInternal;

impl PgCarInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &CarId,
    ) -> error_stack::Result<Option<Car>, KernelError> {
        let row = sqlx::query_as::<_, CarRow>(
            // language=postgresql
            r#"
            SELECT id, plate_number, brand, car_model, year, is_automatic, price_per_day, is_publish
            FROM cars
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Car::from))
    }

    async fn create(con: &mut PgConnection, car: &Car) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO cars (
                id, plate_number, brand, car_model, year, is_automatic, price_per_day, is_publish
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(car.id().as_ref())
        .bind(car.plate_number().as_ref())
        .bind(car.brand().as_ref())
        .bind(car.model().as_ref())
        .bind(car.year().as_ref())
        .bind(car.is_automatic().as_ref())
        .bind(car.price_per_day().as_ref())
        .bind(car.is_publish().as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn withdraw(
        con: &mut PgConnection,
        id: &CarId,
    ) -> error_stack::Result<bool, KernelError> {
        // language=postgresql
        let result = sqlx::query(
            r#"
            UPDATE cars
            SET is_publish = FALSE
            WHERE id = $1 AND is_publish = TRUE
            "#,
        )
        .bind(id.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(result.rows_affected() == 1)
    }
}
