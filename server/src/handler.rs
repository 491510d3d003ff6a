use std::ops::Deref;
use std::sync::Arc;

use driver::database::{
    MemoryDatabase, MemoryTransaction, PostgresDatabase, PostgresTransaction,
};
use kernel::interface::database::Transaction;

/// A storage backend the server can run on.
pub trait Database: 'static + Sync + Send {
    type Transaction: Transaction;
}

impl Database for PostgresDatabase {
    type Transaction = PostgresTransaction;
}

impl Database for MemoryDatabase {
    type Transaction = MemoryTransaction;
}

pub struct AppModule<D>(Arc<Handler<D>>);

impl<D: Database> AppModule<D> {
    pub fn new(database: D) -> Self {
        Self(Arc::new(Handler::new(database)))
    }
}

impl<D> Clone for AppModule<D> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<D> Deref for AppModule<D> {
    type Target = Handler<D>;
    fn deref(&self) -> &Self::Target {
        Deref::deref(&self.0)
    }
}

pub struct Handler<D> {
    database: D,
}

impl<D> Handler<D> {
    pub fn new(database: D) -> Self {
        Self { database }
    }

    pub fn database(&self) -> &D {
        &self.database
    }
}
