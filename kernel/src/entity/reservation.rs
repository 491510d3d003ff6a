mod detail;
mod filter;
mod id;
mod period;

pub use self::{detail::*, filter::*, id::*, period::*};
use crate::entity::{CarId, CreatedAt, UserId};
use destructure::Destructure;
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct Reservation {
    id: ReservationId,
    car_id: CarId,
    user_id: UserId,
    period: ReservationPeriod,
    detail: ReservationDetail,
    created_at: CreatedAt<Reservation>,
}

impl Reservation {
    pub fn new(
        id: ReservationId,
        car_id: CarId,
        user_id: UserId,
        period: ReservationPeriod,
        detail: ReservationDetail,
        created_at: CreatedAt<Reservation>,
    ) -> Self {
        Self {
            id,
            car_id,
            user_id,
            period,
            detail,
            created_at,
        }
    }
}
