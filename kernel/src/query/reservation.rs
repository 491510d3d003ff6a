use crate::database::Transaction;
use crate::entity::{
    Reservation, ReservationFilter, ReservationId, ReservationPeriod, ReservationSortKey,
    SelectLimit, SelectOffset, SortOrder, UserId,
};
use crate::KernelError;

#[async_trait::async_trait]
pub trait ReservationQuery<Connection: Transaction>: Sync + Send + 'static {
    async fn find_by_id(
        &self,
        con: &mut Connection,
        id: &ReservationId,
    ) -> error_stack::Result<Option<Reservation>, KernelError>;

    async fn find_by_id_and_user_id(
        &self,
        con: &mut Connection,
        id: &ReservationId,
        user_id: &UserId,
    ) -> error_stack::Result<Option<Reservation>, KernelError>;

    /// Reservations of `user_id` whose period overlaps `period`, skipping `exclude`.
    async fn find_overlapping(
        &self,
        con: &mut Connection,
        user_id: &UserId,
        period: &ReservationPeriod,
        exclude: Option<&ReservationId>,
    ) -> error_stack::Result<Vec<Reservation>, KernelError>;

    async fn find_all(
        &self,
        con: &mut Connection,
        filter: &ReservationFilter,
        sort: &ReservationSortKey,
        order: &SortOrder,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<Reservation>, KernelError>;

    async fn count(
        &self,
        con: &mut Connection,
        filter: &ReservationFilter,
    ) -> error_stack::Result<i64, KernelError>;
}

pub trait DependOnReservationQuery<Connection: Transaction>: Sync + Send + 'static {
    type ReservationQuery: ReservationQuery<Connection>;
    fn reservation_query(&self) -> &Self::ReservationQuery;
}
