use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, Fromln, AsRefln)]
pub struct CarPlateNumber(String);

impl CarPlateNumber {
    pub fn new(plate_number: impl Into<String>) -> Self {
        Self(plate_number.into())
    }
}
