use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::interface::query::{DependOnCarQuery, DependOnReservationQuery};
use kernel::interface::update::{DependOnCarModifier, DependOnReservationModifier};
use kernel::prelude::entity::{Car, CarId, Reservation};
use kernel::KernelError;

pub use self::{car::*, reservation::*};

mod car;
mod reservation;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub(in crate::database) cars: HashMap<CarId, Car>,
    pub(in crate::database) reservations: Vec<Reservation>,
}

/// In-process store. Transactions hold the whole store exclusively, so they run one at a time.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    store: Arc<Mutex<MemoryStore>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DatabaseConnection<MemoryTransaction> for MemoryDatabase {
    async fn transact(&self) -> error_stack::Result<MemoryTransaction, KernelError> {
        let committed = Arc::clone(&self.store).lock_owned().await;
        let staged = committed.clone();
        Ok(MemoryTransaction { committed, staged })
    }
}

/// Changes are made on a private copy and published on commit.
pub struct MemoryTransaction {
    committed: OwnedMutexGuard<MemoryStore>,
    staged: MemoryStore,
}

#[async_trait::async_trait]
impl Transaction for MemoryTransaction {
    async fn commit(self) -> error_stack::Result<(), KernelError> {
        let Self {
            mut committed,
            staged,
        } = self;
        *committed = staged;
        Ok(())
    }

    async fn roll_back(self) -> error_stack::Result<(), KernelError> {
        Ok(())
    }
}

impl Deref for MemoryTransaction {
    type Target = MemoryStore;
    fn deref(&self) -> &Self::Target {
        &self.staged
    }
}

impl DerefMut for MemoryTransaction {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.staged
    }
}

impl DependOnCarQuery<MemoryTransaction> for MemoryDatabase {
    type CarQuery = MemoryCarRepository;
    fn car_query(&self) -> &Self::CarQuery {
        &MemoryCarRepository
    }
}

impl DependOnCarModifier<MemoryTransaction> for MemoryDatabase {
    type CarModifier = MemoryCarRepository;
    fn car_modifier(&self) -> &Self::CarModifier {
        &MemoryCarRepository
    }
}

impl DependOnReservationQuery<MemoryTransaction> for MemoryDatabase {
    type ReservationQuery = MemoryReservationRepository;
    fn reservation_query(&self) -> &Self::ReservationQuery {
        &MemoryReservationRepository
    }
}

impl DependOnReservationModifier<MemoryTransaction> for MemoryDatabase {
    type ReservationModifier = MemoryReservationRepository;
    fn reservation_modifier(&self) -> &Self::ReservationModifier {
        &MemoryReservationRepository
    }
}
