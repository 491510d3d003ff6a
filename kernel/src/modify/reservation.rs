use crate::database::Transaction;
use crate::entity::{Reservation, ReservationId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait ReservationModifier<Connection: Transaction>: 'static + Sync + Send {
    async fn create(
        &self,
        con: &mut Connection,
        reservation: &Reservation,
    ) -> error_stack::Result<(), KernelError>;

    /// Returns the number of matched records.
    async fn update(
        &self,
        con: &mut Connection,
        reservation: &Reservation,
    ) -> error_stack::Result<u64, KernelError>;

    /// Returns the number of deleted records.
    async fn delete(
        &self,
        con: &mut Connection,
        id: &ReservationId,
    ) -> error_stack::Result<u64, KernelError>;
}

pub trait DependOnReservationModifier<Connection: Transaction>: 'static + Sync + Send {
    type ReservationModifier: ReservationModifier<Connection>;
    fn reservation_modifier(&self) -> &Self::ReservationModifier;
}
