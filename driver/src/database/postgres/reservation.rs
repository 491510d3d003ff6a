use error_stack::{Report, ResultExt};
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::PgConnection;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use kernel::interface::query::ReservationQuery;
use kernel::interface::update::ReservationModifier;
use kernel::prelude::entity::{
    CarId, CreatedAt, Reservation, ReservationDetail, ReservationFilter, ReservationId,
    ReservationPeriod, ReservationSortKey, SelectLimit, SelectOffset, SortOrder, UserId,
};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresReservationRepository;

#[async_trait::async_trait]
impl ReservationQuery<PostgresTransaction> for PostgresReservationRepository {
    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &ReservationId,
    ) -> error_stack::Result<Option<Reservation>, KernelError> {
        PgReservationInternal::find_by_id(con, id).await
    }

    async fn find_by_id_and_user_id(
        &self,
        con: &mut PostgresTransaction,
        id: &ReservationId,
        user_id: &UserId,
    ) -> error_stack::Result<Option<Reservation>, KernelError> {
        PgReservationInternal::find_by_id_and_user_id(con, id, user_id).await
    }

    async fn find_overlapping(
        &self,
        con: &mut PostgresTransaction,
        user_id: &UserId,
        period: &ReservationPeriod,
        exclude: Option<&ReservationId>,
    ) -> error_stack::Result<Vec<Reservation>, KernelError> {
        PgReservationInternal::find_overlapping(con, user_id, period, exclude).await
    }

    async fn find_all(
        &self,
        con: &mut PostgresTransaction,
        filter: &ReservationFilter,
        sort: &ReservationSortKey,
        order: &SortOrder,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<Reservation>, KernelError> {
        PgReservationInternal::find_all(con, filter, sort, order, limit, offset).await
    }

    async fn count(
        &self,
        con: &mut PostgresTransaction,
        filter: &ReservationFilter,
    ) -> error_stack::Result<i64, KernelError> {
        PgReservationInternal::count(con, filter).await
    }
}

#[async_trait::async_trait]
impl ReservationModifier<PostgresTransaction> for PostgresReservationRepository {
    async fn create(
        &self,
        con: &mut PostgresTransaction,
        reservation: &Reservation,
    ) -> error_stack::Result<(), KernelError> {
        PgReservationInternal::create(con, reservation).await
    }

    async fn update(
        &self,
        con: &mut PostgresTransaction,
        reservation: &Reservation,
    ) -> error_stack::Result<u64, KernelError> {
        PgReservationInternal::update(con, reservation).await
    }

    async fn delete(
        &self,
        con: &mut PostgresTransaction,
        id: &ReservationId,
    ) -> error_stack::Result<u64, KernelError> {
        PgReservationInternal::delete(con, id).await
    }
}

#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: Uuid,
    car_id: Uuid,
    user_id: Uuid,
    start_date: Date,
    end_date: Date,
    detail: Json<Map<String, Value>>,
    created_at: OffsetDateTime,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = Report<KernelError>;
    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        let period = ReservationPeriod::new(row.start_date, row.end_date)
            .attach_printable_lazy(|| format!("Stored reservation {} is corrupted", row.id))?;
        Ok(Reservation::new(
            ReservationId::new(row.id),
            CarId::new(row.car_id),
            UserId::new(row.user_id),
            period,
            ReservationDetail::new(row.detail.0),
            CreatedAt::new(row.created_at),
        ))
    }
}

fn into_reservations(
    rows: Vec<ReservationRow>,
) -> error_stack::Result<Vec<Reservation>, KernelError> {
    rows.into_iter().map(Reservation::try_from).collect()
}

fn sort_column(sort: &ReservationSortKey) -> &'static str {
    match sort {
        ReservationSortKey::StartDate => "start_date",
        ReservationSortKey::EndDate => "end_date",
        ReservationSortKey::CreatedAt => "created_at",
    }
}

fn sort_direction(order: &SortOrder) -> &'static str {
    match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    }
}

pub(in crate::database) struct PgReservationInternal;

impl PgReservationInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &ReservationId,
    ) -> error_stack::Result<Option<Reservation>, KernelError> {
        let row = sqlx::query_as::<_, ReservationRow>(
            // language=postgresql
            r#"
            SELECT id, car_id, user_id, start_date, end_date, detail, created_at
            FROM reservations
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        row.map(Reservation::try_from).transpose()
    }

    async fn find_by_id_and_user_id(
        con: &mut PgConnection,
        id: &ReservationId,
        user_id: &UserId,
    ) -> error_stack::Result<Option<Reservation>, KernelError> {
        let row = sqlx::query_as::<_, ReservationRow>(
            // language=postgresql
            r#"
            SELECT id, car_id, user_id, start_date, end_date, detail, created_at
            FROM reservations
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id.as_ref())
        .bind(user_id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        row.map(Reservation::try_from).transpose()
    }

    async fn find_overlapping(
        con: &mut PgConnection,
        user_id: &UserId,
        period: &ReservationPeriod,
        exclude: Option<&ReservationId>,
    ) -> error_stack::Result<Vec<Reservation>, KernelError> {
        let rows = sqlx::query_as::<_, ReservationRow>(
            // language=postgresql
            r#"
            SELECT id, car_id, user_id, start_date, end_date, detail, created_at
            FROM reservations
            WHERE user_id = $1
              AND start_date <= $3
              AND end_date >= $2
              AND ($4::uuid IS NULL OR id <> $4)
            "#,
        )
        .bind(user_id.as_ref())
        .bind(period.start_date())
        .bind(period.end_date())
        .bind(exclude.map(|id| *id.as_ref()))
        .fetch_all(con)
        .await
        .convert_error()?;
        into_reservations(rows)
    }

    async fn find_all(
        con: &mut PgConnection,
        filter: &ReservationFilter,
        sort: &ReservationSortKey,
        order: &SortOrder,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<Reservation>, KernelError> {
        let column = sort_column(sort);
        let direction = sort_direction(order);
        // language=postgresql
        let sql = format!(
            r#"
            SELECT id, car_id, user_id, start_date, end_date, detail, created_at
            FROM reservations
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::uuid IS NULL OR car_id = $2)
            ORDER BY {column} {direction}, id {direction}
            LIMIT $3 OFFSET $4
            "#
        );
        let rows = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(filter.user_id().map(|id| *id.as_ref()))
            .bind(filter.car_id().map(|id| *id.as_ref()))
            .bind(limit.as_ref())
            .bind(offset.as_ref())
            .fetch_all(con)
            .await
            .convert_error()?;
        into_reservations(rows)
    }

    async fn count(
        con: &mut PgConnection,
        filter: &ReservationFilter,
    ) -> error_stack::Result<i64, KernelError> {
        sqlx::query_scalar::<_, i64>(
            // language=postgresql
            r#"
            SELECT COUNT(*)
            FROM reservations
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::uuid IS NULL OR car_id = $2)
            "#,
        )
        .bind(filter.user_id().map(|id| *id.as_ref()))
        .bind(filter.car_id().map(|id| *id.as_ref()))
        .fetch_one(con)
        .await
        .convert_error()
    }

    async fn create(
        con: &mut PgConnection,
        reservation: &Reservation,
    ) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO reservations (id, car_id, user_id, start_date, end_date, detail, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(reservation.id().as_ref())
        .bind(reservation.car_id().as_ref())
        .bind(reservation.user_id().as_ref())
        .bind(reservation.period().start_date())
        .bind(reservation.period().end_date())
        .bind(Json(reservation.detail().as_ref()))
        .bind(reservation.created_at().as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn update(
        con: &mut PgConnection,
        reservation: &Reservation,
    ) -> error_stack::Result<u64, KernelError> {
        // language=postgresql
        let result = sqlx::query(
            r#"
            UPDATE reservations
            SET car_id = $2, start_date = $3, end_date = $4, detail = $5
            WHERE id = $1
            "#,
        )
        .bind(reservation.id().as_ref())
        .bind(reservation.car_id().as_ref())
        .bind(reservation.period().start_date())
        .bind(reservation.period().end_date())
        .bind(Json(reservation.detail().as_ref()))
        .execute(con)
        .await
        .convert_error()?;
        Ok(result.rows_affected())
    }

    async fn delete(
        con: &mut PgConnection,
        id: &ReservationId,
    ) -> error_stack::Result<u64, KernelError> {
        // language=postgresql
        let result = sqlx::query(
            r#"
            DELETE FROM reservations
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;
    use time::macros::date;
    use uuid::Uuid;

    use kernel::interface::database::DatabaseConnection;
    use kernel::interface::query::ReservationQuery;
    use kernel::interface::update::{CarModifier, ReservationModifier};
    use kernel::prelude::entity::{
        Car, CarBrand, CarId, CarIsAutomatic, CarIsPublish, CarModel, CarPlateNumber,
        CarPricePerDay, CarYear, CreatedAt, Reservation, ReservationDetail, ReservationFilter,
        ReservationId, ReservationPeriod, ReservationSortKey, SelectLimit, SelectOffset, SortOrder,
        UserId,
    };
    use kernel::KernelError;

    use crate::database::postgres::{
        PostgresCarRepository, PostgresDatabase, PostgresReservationRepository,
    };

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn reservation_lifecycle() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        let mut connection = db.transact().await?;

        let car_id = CarId::new(Uuid::new_v4());
        let car = Car::new(
            car_id.clone(),
            CarPlateNumber::new("35 TST 01"),
            CarBrand::new("Fiat"),
            CarModel::new("Egea"),
            CarYear::new(2022),
            CarIsAutomatic::new(false),
            CarPricePerDay::new(149.5),
            CarIsPublish::new(true),
        );
        PostgresCarRepository.create(&mut connection, &car).await?;

        let user_id = UserId::new(Uuid::new_v4());
        let id = ReservationId::new(Uuid::new_v4());
        let reservation = Reservation::new(
            id.clone(),
            car_id.clone(),
            user_id.clone(),
            ReservationPeriod::new(date!(2024 - 06 - 01), date!(2024 - 06 - 05))?,
            ReservationDetail::new(json!({ "note": "airport" }).as_object().cloned().unwrap()),
            CreatedAt::now(),
        );
        PostgresReservationRepository
            .create(&mut connection, &reservation)
            .await?;

        let found = PostgresReservationRepository
            .find_by_id(&mut connection, &id)
            .await?;
        assert_eq!(found, Some(reservation.clone()));

        let stranger = UserId::new(Uuid::new_v4());
        let hidden = PostgresReservationRepository
            .find_by_id_and_user_id(&mut connection, &id, &stranger)
            .await?;
        assert!(hidden.is_none());

        let touching = ReservationPeriod::new(date!(2024 - 06 - 05), date!(2024 - 06 - 07))?;
        let overlapping = PostgresReservationRepository
            .find_overlapping(&mut connection, &user_id, &touching, None)
            .await?;
        assert_eq!(overlapping, vec![reservation.clone()]);
        let overlapping = PostgresReservationRepository
            .find_overlapping(&mut connection, &user_id, &touching, Some(&id))
            .await?;
        assert!(overlapping.is_empty());

        let filter = ReservationFilter::new(Some(user_id.clone()), None);
        let listed = PostgresReservationRepository
            .find_all(
                &mut connection,
                &filter,
                &ReservationSortKey::StartDate,
                &SortOrder::Asc,
                &SelectLimit::default(),
                &SelectOffset::new(0),
            )
            .await?;
        assert_eq!(listed, vec![reservation.clone()]);
        let total = PostgresReservationRepository
            .count(&mut connection, &filter)
            .await?;
        assert_eq!(total, 1);

        let moved = Reservation::new(
            id.clone(),
            car_id,
            user_id,
            ReservationPeriod::new(date!(2024 - 06 - 02), date!(2024 - 06 - 03))?,
            reservation.detail().clone(),
            reservation.created_at().clone(),
        );
        let matched = PostgresReservationRepository
            .update(&mut connection, &moved)
            .await?;
        assert_eq!(matched, 1);
        let found = PostgresReservationRepository
            .find_by_id(&mut connection, &id)
            .await?;
        assert_eq!(found, Some(moved));

        let deleted = PostgresReservationRepository
            .delete(&mut connection, &id)
            .await?;
        assert_eq!(deleted, 1);
        let deleted = PostgresReservationRepository
            .delete(&mut connection, &id)
            .await?;
        assert_eq!(deleted, 0);
        Ok(())
    }
}
