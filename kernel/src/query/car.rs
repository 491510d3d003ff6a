use crate::database::Transaction;
use crate::entity::{Car, CarId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait CarQuery<Connection: Transaction>: Sync + Send + 'static {
    /// Implementations lock the row until the transaction ends.
    async fn find_by_id(
        &self,
        con: &mut Connection,
        id: &CarId,
    ) -> error_stack::Result<Option<Car>, KernelError>;
}

pub trait DependOnCarQuery<Connection: Transaction>: Sync + Send + 'static {
    type CarQuery: CarQuery<Connection>;
    fn car_query(&self) -> &Self::CarQuery;
}
