use error_stack::Report;
use uuid::Uuid;

use kernel::interface::database::{
    DatabaseConnection, DependOnDatabaseConnection, Transaction,
};
use kernel::interface::query::{
    CarQuery, DependOnCarQuery, DependOnReservationQuery, ReservationQuery,
};
use kernel::interface::update::{
    CarModifier, DependOnCarModifier, DependOnReservationModifier, ReservationModifier,
};
use kernel::prelude::entity::{
    CarId, CreatedAt, DestructReservation, Reservation, ReservationDetail, ReservationFilter,
    ReservationId, ReservationPeriod, SelectLimit, SelectPage, UserId,
};
use kernel::KernelError;

use crate::transfer::{
    CreateReservationDto, DeleteReservationDto, DeletedReservationDto, GetReservationDto,
    ListDetailsDto, ListReservationsDto, PagesDto, ReservationDto, ReservationListDto,
    UpdateReservationDto, UpdatedReservationDto,
};

#[async_trait::async_trait]
pub trait GetReservationService<Connection: Transaction + Send>:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection<Connection>
    + DependOnReservationQuery<Connection>
{
    async fn list_reservations(
        &self,
        dto: ListReservationsDto,
    ) -> error_stack::Result<ReservationListDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let filter = ReservationFilter::new(
            dto.user_id.map(UserId::new),
            dto.car_id.map(CarId::new),
        );
        let limit = dto.limit.map(SelectLimit::new).unwrap_or_default();
        let page = dto.page.map(SelectPage::new).unwrap_or_default();
        let offset = page.offset(&limit);

        let reservations = self
            .reservation_query()
            .find_all(&mut connection, &filter, &dto.sort, &dto.order, &limit, &offset)
            .await?;
        let total_records = self.reservation_query().count(&mut connection, &filter).await?;
        connection.commit().await?;

        let (page, limit) = (*page.as_ref(), *limit.as_ref());
        Ok(ReservationListDto {
            reservations: reservations.into_iter().map(ReservationDto::from).collect(),
            details: ListDetailsDto {
                user_id: dto.user_id,
                car_id: dto.car_id,
                sort: dto.sort,
                order: dto.order,
                page,
                limit,
                skip: *offset.as_ref(),
                pages: PagesDto::new(page, limit, total_records),
                total_records,
            },
        })
    }

    /// Privileged callers see any reservation and get `None` for unknown ids.
    /// Everyone else only sees their own and gets [`KernelError::NotFound`] otherwise.
    async fn get_reservation(
        &self,
        dto: GetReservationDto,
    ) -> error_stack::Result<Option<ReservationDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let id = ReservationId::new(dto.id);

        let reservation = if dto.identity.is_privileged() {
            self.reservation_query()
                .find_by_id(&mut connection, &id)
                .await?
        } else {
            let user_id = dto.identity.user_id();
            let reservation = self
                .reservation_query()
                .find_by_id_and_user_id(&mut connection, &id, user_id)
                .await?
                .ok_or_else(|| {
                    Report::new(KernelError::NotFound).attach_printable(format!(
                        "Reservation {} is not visible to user {}",
                        dto.id,
                        user_id.as_ref()
                    ))
                })?;
            Some(reservation)
        };
        connection.commit().await?;

        Ok(reservation.map(ReservationDto::from))
    }
}

impl<Connection: Transaction + Send, T> GetReservationService<Connection> for T where
    T: DependOnDatabaseConnection<Connection> + DependOnReservationQuery<Connection>
{
}

#[async_trait::async_trait]
pub trait CreateReservationService<Connection: Transaction + Send>:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection<Connection>
    + DependOnCarQuery<Connection>
    + DependOnCarModifier<Connection>
    + DependOnReservationQuery<Connection>
    + DependOnReservationModifier<Connection>
{
    async fn create_reservation(
        &self,
        dto: CreateReservationDto,
    ) -> error_stack::Result<ReservationDto, KernelError> {
        let period = ReservationPeriod::new(dto.start_date, dto.end_date)?;
        let car_id = CarId::new(dto.car_id);
        let user_id = dto.identity.user_id().clone();

        let mut connection = self.database_connection().transact().await?;

        ensure_available(self.car_query(), &mut connection, &car_id).await?;
        ensure_no_conflict(
            self.reservation_query(),
            &mut connection,
            &user_id,
            &period,
            None,
        )
        .await?;

        let reservation = Reservation::new(
            ReservationId::new(Uuid::new_v4()),
            car_id.clone(),
            user_id,
            period,
            ReservationDetail::new(dto.detail),
            CreatedAt::now(),
        );
        self.reservation_modifier()
            .create(&mut connection, &reservation)
            .await?;
        withdraw(self.car_modifier(), &mut connection, &car_id).await?;

        connection.commit().await?;
        tracing::info!(
            reservation = %reservation.id().as_ref(),
            car = %car_id.as_ref(),
            "Reservation created"
        );

        Ok(ReservationDto::from(reservation))
    }
}

impl<Connection: Transaction + Send, T> CreateReservationService<Connection> for T where
    T: DependOnDatabaseConnection<Connection>
        + DependOnCarQuery<Connection>
        + DependOnCarModifier<Connection>
        + DependOnReservationQuery<Connection>
        + DependOnReservationModifier<Connection>
{
}

#[async_trait::async_trait]
pub trait UpdateReservationService<Connection: Transaction + Send>:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection<Connection>
    + DependOnCarQuery<Connection>
    + DependOnCarModifier<Connection>
    + DependOnReservationQuery<Connection>
    + DependOnReservationModifier<Connection>
{
    /// Applies a partial update and re-runs the checks creation performs for whatever changed.
    /// Moving to another car withdraws it and leaves the previous car withdrawn as well.
    async fn update_reservation(
        &self,
        dto: UpdateReservationDto,
    ) -> error_stack::Result<UpdatedReservationDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let id = ReservationId::new(dto.id);

        let current = self
            .reservation_query()
            .find_by_id(&mut connection, &id)
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::NotFound)
                    .attach_printable(format!("Reservation {} does not exist", dto.id))
            })?;

        let period = ReservationPeriod::new(
            dto.start_date.unwrap_or(*current.period().start_date()),
            dto.end_date.unwrap_or(*current.period().end_date()),
        )?;
        let moved_to = dto
            .car_id
            .map(CarId::new)
            .filter(|car_id| car_id != current.car_id());

        if let Some(car_id) = &moved_to {
            ensure_available(self.car_query(), &mut connection, car_id).await?;
        }
        if &period != current.period() {
            ensure_no_conflict(
                self.reservation_query(),
                &mut connection,
                current.user_id(),
                &period,
                Some(&id),
            )
            .await?;
        }

        let mut detail = current.detail().clone();
        if let Some(patch) = dto.detail {
            detail.merge(patch);
        }
        let DestructReservation {
            id: _,
            car_id,
            user_id,
            period: _,
            detail: _,
            created_at,
        } = current.clone().into_destruct();
        let updated = Reservation::new(
            id.clone(),
            moved_to.clone().unwrap_or(car_id),
            user_id,
            period,
            detail,
            created_at,
        );

        let matched_count = self
            .reservation_modifier()
            .update(&mut connection, &updated)
            .await?;
        if let Some(car_id) = &moved_to {
            withdraw(self.car_modifier(), &mut connection, car_id).await?;
        }
        let refreshed = self
            .reservation_query()
            .find_by_id(&mut connection, &id)
            .await?;
        connection.commit().await?;

        let modified_count = match &refreshed {
            Some(refreshed) if refreshed != &current => matched_count,
            _ => 0,
        };
        tracing::info!(
            reservation = %dto.id,
            matched_count,
            modified_count,
            "Reservation updated"
        );

        Ok(UpdatedReservationDto {
            matched_count,
            modified_count,
            reservation: refreshed.map(ReservationDto::from),
        })
    }
}

impl<Connection: Transaction + Send, T> UpdateReservationService<Connection> for T where
    T: DependOnDatabaseConnection<Connection>
        + DependOnCarQuery<Connection>
        + DependOnCarModifier<Connection>
        + DependOnReservationQuery<Connection>
        + DependOnReservationModifier<Connection>
{
}

#[async_trait::async_trait]
pub trait DeleteReservationService<Connection: Transaction + Send>:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection<Connection>
    + DependOnReservationModifier<Connection>
{
    /// The car stays withdrawn after its reservation is removed.
    async fn delete_reservation(
        &self,
        dto: DeleteReservationDto,
    ) -> error_stack::Result<DeletedReservationDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let deleted_count = self
            .reservation_modifier()
            .delete(&mut connection, &ReservationId::new(dto.id))
            .await?;
        connection.commit().await?;

        if deleted_count == 0 {
            tracing::debug!(reservation = %dto.id, "Nothing to delete");
        }
        Ok(DeletedReservationDto { deleted_count })
    }
}

impl<Connection: Transaction + Send, T> DeleteReservationService<Connection> for T where
    T: DependOnDatabaseConnection<Connection> + DependOnReservationModifier<Connection>
{
}

async fn ensure_available<Connection, Q>(
    query: &Q,
    con: &mut Connection,
    car_id: &CarId,
) -> error_stack::Result<(), KernelError>
where
    Connection: Transaction + Send,
    Q: CarQuery<Connection>,
{
    let available = query
        .find_by_id(con, car_id)
        .await?
        .is_some_and(|car| car.is_available());
    if !available {
        return Err(Report::new(KernelError::NotAvailable)
            .attach_printable(format!("Car {} is missing or unpublished", car_id.as_ref())));
    }
    Ok(())
}

async fn ensure_no_conflict<Connection, Q>(
    query: &Q,
    con: &mut Connection,
    user_id: &UserId,
    period: &ReservationPeriod,
    exclude: Option<&ReservationId>,
) -> error_stack::Result<(), KernelError>
where
    Connection: Transaction + Send,
    Q: ReservationQuery<Connection>,
{
    let conflicts = query
        .find_overlapping(con, user_id, period, exclude)
        .await?;
    if !conflicts.is_empty() {
        return Err(Report::new(KernelError::DateConflict).attach_printable(format!(
            "User {} already holds {} overlapping reservation(s)",
            user_id.as_ref(),
            conflicts.len()
        )));
    }
    Ok(())
}

async fn withdraw<Connection, M>(
    modifier: &M,
    con: &mut Connection,
    car_id: &CarId,
) -> error_stack::Result<(), KernelError>
where
    Connection: Transaction + Send,
    M: CarModifier<Connection>,
{
    if !modifier.withdraw(con, car_id).await? {
        return Err(Report::new(KernelError::NotAvailable).attach_printable(format!(
            "Car {} was withdrawn by another reservation",
            car_id.as_ref()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use serde_json::{json, Map, Value};
    use time::macros::date;
    use time::Date;
    use uuid::Uuid;

    use driver::database::MemoryDatabase;
    use kernel::interface::database::{DatabaseConnection, Transaction};
    use kernel::interface::query::{CarQuery, DependOnCarQuery};
    use kernel::interface::update::{CarModifier, DependOnCarModifier};
    use kernel::prelude::entity::{
        Car, CarBrand, CarId, CarIsAutomatic, CarIsPublish, CarModel, CarPlateNumber,
        CarPricePerDay, CarYear, Identity, ReservationSortKey, SortOrder, UserId,
    };
    use kernel::KernelError;

    use crate::service::{
        CreateReservationService, DeleteReservationService, GetReservationService,
        UpdateReservationService,
    };
    use crate::transfer::{
        CreateReservationDto, DeleteReservationDto, GetReservationDto, ListReservationsDto,
        UpdateReservationDto,
    };

    async fn seed_car(
        db: &MemoryDatabase,
        is_publish: bool,
    ) -> error_stack::Result<Uuid, KernelError> {
        let id = Uuid::new_v4();
        let car = Car::new(
            CarId::new(id),
            CarPlateNumber::new("34 ABC 123"),
            CarBrand::new("Toyota"),
            CarModel::new("Corolla"),
            CarYear::new(2021),
            CarIsAutomatic::new(false),
            CarPricePerDay::new(189.99),
            CarIsPublish::new(is_publish),
        );
        let mut con = db.transact().await?;
        db.car_modifier().create(&mut con, &car).await?;
        con.commit().await?;
        Ok(id)
    }

    async fn is_published(db: &MemoryDatabase, id: Uuid) -> error_stack::Result<bool, KernelError> {
        let mut con = db.transact().await?;
        let car = db.car_query().find_by_id(&mut con, &CarId::new(id)).await?;
        Ok(car.map(|car| car.is_available()).unwrap_or(false))
    }

    fn user(is_admin: bool, is_staff: bool) -> Identity {
        Identity::new(UserId::new(Uuid::new_v4()), is_admin, is_staff)
    }

    fn create_dto(
        car_id: Uuid,
        start: Date,
        end: Date,
        identity: &Identity,
    ) -> CreateReservationDto {
        CreateReservationDto {
            car_id,
            start_date: start,
            end_date: end,
            detail: Map::new(),
            identity: identity.clone(),
        }
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn create_withdraws_car() -> error_stack::Result<(), KernelError> {
        let db = MemoryDatabase::new();
        let car = seed_car(&db, true).await?;
        let identity = user(false, false);

        let mut dto = create_dto(car, date!(2024 - 01 - 01), date!(2024 - 01 - 05), &identity);
        dto.detail = object(json!({ "note": "child seat" }));
        let created = db.create_reservation(dto).await?;

        assert_eq!(created.car_id, car);
        assert_eq!(&created.user_id, identity.user_id().as_ref());
        assert_eq!(created.detail, object(json!({ "note": "child seat" })));
        assert!(!is_published(&db, car).await?);
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_unavailable_car() -> error_stack::Result<(), KernelError> {
        let db = MemoryDatabase::new();
        let hidden = seed_car(&db, false).await?;
        let identity = user(false, false);

        let error = db
            .create_reservation(create_dto(
                hidden,
                date!(2024 - 01 - 01),
                date!(2024 - 01 - 02),
                &identity,
            ))
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::NotAvailable);

        let error = db
            .create_reservation(create_dto(
                Uuid::new_v4(),
                date!(2024 - 01 - 01),
                date!(2024 - 01 - 02),
                &identity,
            ))
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::NotAvailable);
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_inverted_period() -> error_stack::Result<(), KernelError> {
        let db = MemoryDatabase::new();
        let car = seed_car(&db, true).await?;
        let identity = user(false, false);

        let error = db
            .create_reservation(create_dto(
                car,
                date!(2024 - 01 - 05),
                date!(2024 - 01 - 01),
                &identity,
            ))
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::Validation);
        assert!(is_published(&db, car).await?);
        Ok(())
    }

    #[tokio::test]
    async fn overlap_is_scoped_per_user() -> error_stack::Result<(), KernelError> {
        let db = MemoryDatabase::new();
        let (car1, car2, car3, car4) = (
            seed_car(&db, true).await?,
            seed_car(&db, true).await?,
            seed_car(&db, true).await?,
            seed_car(&db, true).await?,
        );
        let u1 = user(false, false);
        let u2 = user(false, false);

        db.create_reservation(create_dto(car1, date!(2024 - 01 - 01), date!(2024 - 01 - 05), &u1))
            .await?;

        let error = db
            .create_reservation(create_dto(car2, date!(2024 - 01 - 04), date!(2024 - 01 - 08), &u1))
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::DateConflict);
        assert!(is_published(&db, car2).await?);

        // Touching boundaries overlap.
        let error = db
            .create_reservation(create_dto(car3, date!(2024 - 01 - 05), date!(2024 - 01 - 06), &u1))
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::DateConflict);

        db.create_reservation(create_dto(car4, date!(2024 - 01 - 04), date!(2024 - 01 - 08), &u2))
            .await?;
        db.create_reservation(create_dto(car3, date!(2024 - 01 - 06), date!(2024 - 01 - 09), &u1))
            .await?;
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_creates_withdraw_once() -> error_stack::Result<(), KernelError> {
        let db = MemoryDatabase::new();
        let car = seed_car(&db, true).await?;
        let (u1, u2) = (user(false, false), user(false, false));

        let (first, second) = tokio::join!(
            db.create_reservation(create_dto(
                car,
                date!(2024 - 03 - 01),
                date!(2024 - 03 - 02),
                &u1,
            )),
            db.create_reservation(create_dto(
                car,
                date!(2024 - 03 - 01),
                date!(2024 - 03 - 02),
                &u2,
            )),
        );
        let failures: Vec<_> = [first, second]
            .into_iter()
            .filter_map(Result::err)
            .collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].current_context(), &KernelError::NotAvailable);
        Ok(())
    }

    #[tokio::test]
    async fn read_is_scoped_to_owner() -> error_stack::Result<(), KernelError> {
        let db = MemoryDatabase::new();
        let car = seed_car(&db, true).await?;
        let owner = user(false, false);
        let stranger = user(false, false);
        let created = db
            .create_reservation(create_dto(
                car,
                date!(2024 - 02 - 01),
                date!(2024 - 02 - 03),
                &owner,
            ))
            .await?;

        let found = db
            .get_reservation(GetReservationDto { id: created.id, identity: owner.clone() })
            .await?;
        assert_eq!(found, Some(created.clone()));

        let error = db
            .get_reservation(GetReservationDto { id: created.id, identity: stranger })
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::NotFound);

        let error = db
            .get_reservation(GetReservationDto { id: Uuid::new_v4(), identity: owner })
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::NotFound);

        let staff = user(false, true);
        let found = db
            .get_reservation(GetReservationDto { id: created.id, identity: staff.clone() })
            .await?;
        assert_eq!(found, Some(created));

        let missing = db
            .get_reservation(GetReservationDto { id: Uuid::new_v4(), identity: staff })
            .await?;
        assert_eq!(missing, None);
        Ok(())
    }

    #[tokio::test]
    async fn update_rechecks_and_reports_counts() -> error_stack::Result<(), KernelError> {
        let db = MemoryDatabase::new();
        let (car1, car2, car3) = (
            seed_car(&db, true).await?,
            seed_car(&db, true).await?,
            seed_car(&db, true).await?,
        );
        let owner = user(false, false);
        let first = db
            .create_reservation(create_dto(
                car1,
                date!(2024 - 01 - 01),
                date!(2024 - 01 - 05),
                &owner,
            ))
            .await?;
        let second = db
            .create_reservation(create_dto(
                car2,
                date!(2024 - 01 - 10),
                date!(2024 - 01 - 12),
                &owner,
            ))
            .await?;

        let patch = |id| UpdateReservationDto {
            id,
            car_id: None,
            start_date: None,
            end_date: None,
            detail: None,
        };

        // Overlap with the owner's other reservation.
        let error = db
            .update_reservation(UpdateReservationDto {
                start_date: Some(date!(2024 - 01 - 04)),
                ..patch(second.id)
            })
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::DateConflict);

        // Inverted period after merging.
        let error = db
            .update_reservation(UpdateReservationDto {
                end_date: Some(date!(2023 - 12 - 31)),
                ..patch(first.id)
            })
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::Validation);

        // Moving onto a withdrawn car.
        let error = db
            .update_reservation(UpdateReservationDto {
                car_id: Some(car2),
                ..patch(first.id)
            })
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::NotAvailable);

        // Shrinking its own period does not conflict with itself.
        let updated = db
            .update_reservation(UpdateReservationDto {
                car_id: Some(car3),
                end_date: Some(date!(2024 - 01 - 03)),
                detail: Some(object(json!({ "note": "late pickup" }))),
                ..patch(first.id)
            })
            .await?;
        assert_eq!(updated.matched_count, 1);
        assert_eq!(updated.modified_count, 1);
        let refreshed = updated.reservation.unwrap();
        assert_eq!(refreshed.car_id, car3);
        assert_eq!(refreshed.end_date, date!(2024 - 01 - 03));
        assert_eq!(refreshed.detail, object(json!({ "note": "late pickup" })));
        assert!(!is_published(&db, car3).await?);
        // The car it moved away from is not released.
        assert!(!is_published(&db, car1).await?);

        let unchanged = db.update_reservation(patch(first.id)).await?;
        assert_eq!(unchanged.matched_count, 1);
        assert_eq!(unchanged.modified_count, 0);

        let error = db.update_reservation(patch(Uuid::new_v4())).await.unwrap_err();
        assert_eq!(error.current_context(), &KernelError::NotFound);
        Ok(())
    }

    #[tokio::test]
    async fn delete_keeps_car_withdrawn() -> error_stack::Result<(), KernelError> {
        let db = MemoryDatabase::new();
        let car = seed_car(&db, true).await?;
        let owner = user(false, false);
        let created = db
            .create_reservation(create_dto(
                car,
                date!(2024 - 01 - 01),
                date!(2024 - 01 - 02),
                &owner,
            ))
            .await?;

        let deleted = db.delete_reservation(DeleteReservationDto { id: created.id }).await?;
        assert_eq!(deleted.deleted_count, 1);
        assert!(!is_published(&db, car).await?);

        let deleted = db.delete_reservation(DeleteReservationDto { id: created.id }).await?;
        assert_eq!(deleted.deleted_count, 0);
        Ok(())
    }

    #[tokio::test]
    async fn list_paginates() -> error_stack::Result<(), KernelError> {
        let db = MemoryDatabase::new();
        let owner = user(false, false);
        let other = user(false, false);
        for day in 1..=5u8 {
            let car = seed_car(&db, true).await?;
            let start = Date::from_calendar_date(2024, time::Month::May, day * 2).unwrap();
            db.create_reservation(create_dto(car, start, start, &owner)).await?;
        }
        let car = seed_car(&db, true).await?;
        db.create_reservation(create_dto(car, date!(2024 - 05 - 01), date!(2024 - 05 - 01), &other))
            .await?;

        let listed = db
            .list_reservations(ListReservationsDto {
                user_id: Some(*owner.user_id().as_ref()),
                car_id: None,
                sort: ReservationSortKey::StartDate,
                order: SortOrder::Asc,
                page: Some(2),
                limit: Some(2),
            })
            .await?;
        let starts: Vec<_> = listed.reservations.iter().map(|r| r.start_date).collect();
        assert_eq!(starts, vec![date!(2024 - 05 - 06), date!(2024 - 05 - 08)]);
        assert_eq!(listed.details.total_records, 5);
        assert_eq!(listed.details.skip, 2);
        assert_eq!(listed.details.pages.previous, Some(1));
        assert_eq!(listed.details.pages.next, Some(3));
        assert_eq!(listed.details.pages.total, 3);

        let everything = db
            .list_reservations(ListReservationsDto {
                user_id: None,
                car_id: None,
                sort: ReservationSortKey::default(),
                order: SortOrder::default(),
                page: None,
                limit: None,
            })
            .await?;
        assert_eq!(everything.reservations.len(), 6);
        assert_eq!(everything.details.limit, 30);
        assert_eq!(everything.details.page, 1);
        Ok(())
    }
}
