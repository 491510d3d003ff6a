mod brand;
mod id;
mod is_automatic;
mod is_publish;
mod model;
mod plate_number;
mod price;
mod year;

pub use self::{
    brand::*, id::*, is_automatic::*, is_publish::*, model::*, plate_number::*, price::*, year::*,
};
use destructure::{Destructure, Mutation};
use vodca::References;

#[derive(Debug, Clone, PartialEq, References, Destructure, Mutation)]
pub struct Car {
    id: CarId,
    plate_number: CarPlateNumber,
    brand: CarBrand,
    model: CarModel,
    year: CarYear,
    is_automatic: CarIsAutomatic,
    price_per_day: CarPricePerDay,
    is_publish: CarIsPublish,
}

impl Car {
    pub fn new(
        id: CarId,
        plate_number: CarPlateNumber,
        brand: CarBrand,
        model: CarModel,
        year: CarYear,
        is_automatic: CarIsAutomatic,
        price_per_day: CarPricePerDay,
        is_publish: CarIsPublish,
    ) -> Self {
        Self {
            id,
            plate_number,
            brand,
            model,
            year,
            is_automatic,
            price_per_day,
            is_publish,
        }
    }

    /// A published car can be reserved.
    pub fn is_available(&self) -> bool {
        *self.is_publish.as_ref()
    }
}
