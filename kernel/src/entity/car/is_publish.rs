use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, Fromln, AsRefln)]
pub struct CarIsPublish(bool);

impl CarIsPublish {
    pub fn new(value: impl Into<bool>) -> Self {
        Self(value.into())
    }
}
