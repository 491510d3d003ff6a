use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use vodca::{AsRefln, Fromln};

/// Booking metadata carried verbatim from the request body.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize, Fromln, AsRefln)]
pub struct ReservationDetail(Map<String, Value>);

impl ReservationDetail {
    pub fn new(detail: impl Into<Map<String, Value>>) -> Self {
        Self(detail.into())
    }

    /// Overwrites the keys present in `patch`, leaving the others untouched.
    pub fn merge(&mut self, patch: Map<String, Value>) {
        self.0.extend(patch);
    }
}
