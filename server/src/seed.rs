use std::path::Path;

use error_stack::ResultExt;
use serde::Deserialize;
use uuid::Uuid;

use driver::database::MemoryDatabase;
use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::interface::update::{CarModifier, DependOnCarModifier};
use kernel::prelude::entity::{
    Car, CarBrand, CarId, CarIsAutomatic, CarIsPublish, CarModel, CarPlateNumber, CarPricePerDay,
    CarYear,
};
use kernel::KernelError;

/// One entry of the cars file read by the in-memory backend.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CarSeed {
    #[serde(default = "Uuid::new_v4")]
    id: Uuid,
    plate_number: String,
    brand: String,
    car_model: String,
    year: i32,
    is_automatic: bool,
    price_per_day: f64,
    #[serde(default = "published")]
    is_publish: bool,
}

fn published() -> bool {
    true
}

impl From<CarSeed> for Car {
    fn from(seed: CarSeed) -> Self {
        Car::new(
            CarId::new(seed.id),
            CarPlateNumber::new(seed.plate_number),
            CarBrand::new(seed.brand),
            CarModel::new(seed.car_model),
            CarYear::new(seed.year),
            CarIsAutomatic::new(seed.is_automatic),
            CarPricePerDay::new(seed.price_per_day),
            CarIsPublish::new(seed.is_publish),
        )
    }
}

fn parse_cars(json: &str) -> error_stack::Result<Vec<Car>, KernelError> {
    let seeds: Vec<CarSeed> = serde_json::from_str(json)
        .change_context_lazy(|| KernelError::Internal)
        .attach_printable_lazy(|| "Cars file is not a list of cars")?;
    Ok(seeds.into_iter().map(Car::from).collect())
}

pub fn load_cars(path: &Path) -> error_stack::Result<Vec<Car>, KernelError> {
    let json = std::fs::read_to_string(path)
        .change_context_lazy(|| KernelError::Internal)
        .attach_printable_lazy(|| format!("Failed to read {}", path.display()))?;
    parse_cars(&json)
}

pub async fn seed_cars(
    database: &MemoryDatabase,
    cars: &[Car],
) -> error_stack::Result<(), KernelError> {
    let mut connection = database.transact().await?;
    for car in cars {
        database.car_modifier().create(&mut connection, car).await?;
    }
    connection.commit().await?;
    tracing::info!(count = cars.len(), "Seeded cars into the in-memory store");
    Ok(())
}
