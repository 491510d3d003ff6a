use crate::database::Transaction;
use crate::entity::{Car, CarId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait CarModifier<Connection: Transaction>: 'static + Sync + Send {
    async fn create(&self, con: &mut Connection, car: &Car)
        -> error_stack::Result<(), KernelError>;

    /// Flips `is_publish` from true to false. Returns false when the car was missing or
    /// already unpublished, so concurrent withdrawals cannot both succeed.
    async fn withdraw(
        &self,
        con: &mut Connection,
        id: &CarId,
    ) -> error_stack::Result<bool, KernelError>;
}

pub trait DependOnCarModifier<Connection: Transaction>: 'static + Sync + Send {
    type CarModifier: CarModifier<Connection>;
    fn car_modifier(&self) -> &Self::CarModifier;
}
