use kernel::interface::query::CarQuery;
use kernel::interface::update::CarModifier;
use kernel::prelude::entity::{Car, CarId, CarIsPublish};
use kernel::KernelError;

use crate::database::memory::MemoryTransaction;

pub struct MemoryCarRepository;

#[async_trait::async_trait]
impl CarQuery<MemoryTransaction> for MemoryCarRepository {
    async fn find_by_id(
        &self,
        con: &mut MemoryTransaction,
        id: &CarId,
    ) -> error_stack::Result<Option<Car>, KernelError> {
        Ok(con.cars.get(id).cloned())
    }
}

#[async_trait::async_trait]
impl CarModifier<MemoryTransaction> for MemoryCarRepository {
    async fn create(
        &self,
        con: &mut MemoryTransaction,
        car: &Car,
    ) -> error_stack::Result<(), KernelError> {
        con.cars.insert(car.id().clone(), car.clone());
        Ok(())
    }

    async fn withdraw(
        &self,
        con: &mut MemoryTransaction,
        id: &CarId,
    ) -> error_stack::Result<bool, KernelError> {
        match con.cars.get_mut(id) {
            Some(car) if car.is_available() => {
                car.substitute(|car| *car.is_publish = CarIsPublish::new(false));
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
