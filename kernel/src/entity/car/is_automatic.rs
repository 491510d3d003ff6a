use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, Fromln, AsRefln)]
pub struct CarIsAutomatic(bool);

impl CarIsAutomatic {
    pub fn new(value: impl Into<bool>) -> Self {
        Self(value.into())
    }
}
