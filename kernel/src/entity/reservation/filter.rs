use serde::{Deserialize, Serialize};

use crate::entity::{CarId, Reservation, UserId};

/// Equality filters applied when listing reservations. `None` matches everything.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ReservationFilter {
    user_id: Option<UserId>,
    car_id: Option<CarId>,
}

impl ReservationFilter {
    pub fn new(user_id: Option<UserId>, car_id: Option<CarId>) -> Self {
        Self { user_id, car_id }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn car_id(&self) -> Option<&CarId> {
        self.car_id.as_ref()
    }

    pub fn matches(&self, reservation: &Reservation) -> bool {
        self.user_id
            .as_ref()
            .map_or(true, |user_id| reservation.user_id() == user_id)
            && self
                .car_id
                .as_ref()
                .map_or(true, |car_id| reservation.car_id() == car_id)
    }
}

#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReservationSortKey {
    StartDate,
    EndDate,
    #[default]
    CreatedAt,
}
