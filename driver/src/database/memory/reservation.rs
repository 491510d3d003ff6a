use std::cmp::Ordering;

use kernel::interface::query::ReservationQuery;
use kernel::interface::update::ReservationModifier;
use kernel::prelude::entity::{
    Reservation, ReservationFilter, ReservationId, ReservationPeriod, ReservationSortKey,
    SelectLimit, SelectOffset, SortOrder, UserId,
};
use kernel::KernelError;

use crate::database::memory::MemoryTransaction;

pub struct MemoryReservationRepository;

#[async_trait::async_trait]
impl ReservationQuery<MemoryTransaction> for MemoryReservationRepository {
    async fn find_by_id(
        &self,
        con: &mut MemoryTransaction,
        id: &ReservationId,
    ) -> error_stack::Result<Option<Reservation>, KernelError> {
        Ok(con
            .reservations
            .iter()
            .find(|reservation| reservation.id() == id)
            .cloned())
    }

    async fn find_by_id_and_user_id(
        &self,
        con: &mut MemoryTransaction,
        id: &ReservationId,
        user_id: &UserId,
    ) -> error_stack::Result<Option<Reservation>, KernelError> {
        Ok(con
            .reservations
            .iter()
            .find(|reservation| reservation.id() == id && reservation.user_id() == user_id)
            .cloned())
    }

    async fn find_overlapping(
        &self,
        con: &mut MemoryTransaction,
        user_id: &UserId,
        period: &ReservationPeriod,
        exclude: Option<&ReservationId>,
    ) -> error_stack::Result<Vec<Reservation>, KernelError> {
        Ok(con
            .reservations
            .iter()
            .filter(|reservation| reservation.user_id() == user_id)
            .filter(|reservation| Some(reservation.id()) != exclude)
            .filter(|reservation| reservation.period().overlaps(period))
            .cloned()
            .collect())
    }

    async fn find_all(
        &self,
        con: &mut MemoryTransaction,
        filter: &ReservationFilter,
        sort: &ReservationSortKey,
        order: &SortOrder,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<Reservation>, KernelError> {
        let mut matched = con
            .reservations
            .iter()
            .filter(|reservation| filter.matches(reservation))
            .cloned()
            .collect::<Vec<_>>();
        matched.sort_by(|a, b| {
            let ordering = compare(a, b, sort).then_with(|| a.id().as_ref().cmp(b.id().as_ref()));
            match order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let skip = usize::try_from(*offset.as_ref()).unwrap_or(0);
        let take = usize::try_from(*limit.as_ref()).unwrap_or(0);
        Ok(matched.into_iter().skip(skip).take(take).collect())
    }

    async fn count(
        &self,
        con: &mut MemoryTransaction,
        filter: &ReservationFilter,
    ) -> error_stack::Result<i64, KernelError> {
        let count = con
            .reservations
            .iter()
            .filter(|reservation| filter.matches(reservation))
            .count();
        Ok(count as i64)
    }
}

fn compare(a: &Reservation, b: &Reservation, sort: &ReservationSortKey) -> Ordering {
    match sort {
        ReservationSortKey::StartDate => a.period().start_date().cmp(b.period().start_date()),
        ReservationSortKey::EndDate => a.period().end_date().cmp(b.period().end_date()),
        ReservationSortKey::CreatedAt => a.created_at().as_ref().cmp(b.created_at().as_ref()),
    }
}

#[async_trait::async_trait]
impl ReservationModifier<MemoryTransaction> for MemoryReservationRepository {
    async fn create(
        &self,
        con: &mut MemoryTransaction,
        reservation: &Reservation,
    ) -> error_stack::Result<(), KernelError> {
        con.reservations.push(reservation.clone());
        Ok(())
    }

    async fn update(
        &self,
        con: &mut MemoryTransaction,
        reservation: &Reservation,
    ) -> error_stack::Result<u64, KernelError> {
        match con
            .reservations
            .iter_mut()
            .find(|stored| stored.id() == reservation.id())
        {
            Some(stored) => {
                *stored = reservation.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(
        &self,
        con: &mut MemoryTransaction,
        id: &ReservationId,
    ) -> error_stack::Result<u64, KernelError> {
        let before = con.reservations.len();
        con.reservations.retain(|reservation| reservation.id() != id);
        Ok((before - con.reservations.len()) as u64)
    }
}

#[cfg(test)]
mod test {
    use serde_json::Map;
    use time::macros::date;
    use time::Date;
    use uuid::Uuid;

    use kernel::interface::database::DatabaseConnection;
    use kernel::interface::query::ReservationQuery;
    use kernel::interface::update::ReservationModifier;
    use kernel::prelude::entity::{
        CarId, CreatedAt, Reservation, ReservationDetail, ReservationFilter, ReservationId,
        ReservationPeriod, ReservationSortKey, SelectLimit, SelectOffset, SortOrder, UserId,
    };
    use kernel::KernelError;

    use crate::database::memory::{MemoryDatabase, MemoryReservationRepository};

    fn reservation(user_id: &UserId, start: Date, end: Date) -> Reservation {
        Reservation::new(
            ReservationId::new(Uuid::new_v4()),
            CarId::new(Uuid::new_v4()),
            user_id.clone(),
            ReservationPeriod::new(start, end).unwrap(),
            ReservationDetail::new(Map::new()),
            CreatedAt::now(),
        )
    }

    #[tokio::test]
    async fn overlap_excludes_itself() -> error_stack::Result<(), KernelError> {
        let db = MemoryDatabase::new();
        let mut connection = db.transact().await?;
        let user_id = UserId::new(Uuid::new_v4());
        let stored = reservation(&user_id, date!(2024 - 01 - 01), date!(2024 - 01 - 05));
        MemoryReservationRepository
            .create(&mut connection, &stored)
            .await?;

        let period = ReservationPeriod::new(date!(2024 - 01 - 05), date!(2024 - 01 - 09))?;
        let found = MemoryReservationRepository
            .find_overlapping(&mut connection, &user_id, &period, None)
            .await?;
        assert_eq!(found, vec![stored.clone()]);

        let found = MemoryReservationRepository
            .find_overlapping(&mut connection, &user_id, &period, Some(stored.id()))
            .await?;
        assert!(found.is_empty());

        let other = UserId::new(Uuid::new_v4());
        let found = MemoryReservationRepository
            .find_overlapping(&mut connection, &other, &period, None)
            .await?;
        assert!(found.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn find_all_sorts_and_pages() -> error_stack::Result<(), KernelError> {
        let db = MemoryDatabase::new();
        let mut connection = db.transact().await?;
        let user_id = UserId::new(Uuid::new_v4());
        let early = reservation(&user_id, date!(2024 - 01 - 01), date!(2024 - 01 - 02));
        let middle = reservation(&user_id, date!(2024 - 02 - 01), date!(2024 - 02 - 02));
        let late = reservation(&user_id, date!(2024 - 03 - 01), date!(2024 - 03 - 02));
        for stored in [&middle, &late, &early] {
            MemoryReservationRepository
                .create(&mut connection, stored)
                .await?;
        }

        let filter = ReservationFilter::default();
        let found = MemoryReservationRepository
            .find_all(
                &mut connection,
                &filter,
                &ReservationSortKey::StartDate,
                &SortOrder::Desc,
                &SelectLimit::new(2),
                &SelectOffset::new(1),
            )
            .await?;
        assert_eq!(found, vec![middle, early]);

        let count = MemoryReservationRepository
            .count(&mut connection, &filter)
            .await?;
        assert_eq!(count, 3);
        Ok(())
    }

    #[tokio::test]
    async fn update_and_delete_report_counts() -> error_stack::Result<(), KernelError> {
        let db = MemoryDatabase::new();
        let mut connection = db.transact().await?;
        let user_id = UserId::new(Uuid::new_v4());
        let stored = reservation(&user_id, date!(2024 - 01 - 01), date!(2024 - 01 - 02));

        let matched = MemoryReservationRepository
            .update(&mut connection, &stored)
            .await?;
        assert_eq!(matched, 0);

        MemoryReservationRepository
            .create(&mut connection, &stored)
            .await?;
        let matched = MemoryReservationRepository
            .update(&mut connection, &stored)
            .await?;
        assert_eq!(matched, 1);

        let deleted = MemoryReservationRepository
            .delete(&mut connection, stored.id())
            .await?;
        assert_eq!(deleted, 1);
        let deleted = MemoryReservationRepository
            .delete(&mut connection, stored.id())
            .await?;
        assert_eq!(deleted, 0);
        Ok(())
    }
}
