use serde_json::{Map, Value};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use kernel::prelude::entity::{
    DestructReservation, Identity, Reservation, ReservationSortKey, SortOrder,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ReservationDto {
    pub id: Uuid,
    pub car_id: Uuid,
    pub user_id: Uuid,
    pub start_date: Date,
    pub end_date: Date,
    pub detail: Map<String, Value>,
    pub created_at: OffsetDateTime,
}

impl From<Reservation> for ReservationDto {
    fn from(value: Reservation) -> Self {
        let DestructReservation {
            id,
            car_id,
            user_id,
            period,
            detail,
            created_at,
        } = value.into_destruct();
        Self {
            id: id.into(),
            car_id: car_id.into(),
            user_id: user_id.into(),
            start_date: *period.start_date(),
            end_date: *period.end_date(),
            detail: detail.into(),
            created_at: *created_at.as_ref(),
        }
    }
}

pub struct ListReservationsDto {
    pub user_id: Option<Uuid>,
    pub car_id: Option<Uuid>,
    pub sort: ReservationSortKey,
    pub order: SortOrder,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct ReservationListDto {
    pub reservations: Vec<ReservationDto>,
    pub details: ListDetailsDto,
}

/// Describes how a list was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListDetailsDto {
    pub user_id: Option<Uuid>,
    pub car_id: Option<Uuid>,
    pub sort: ReservationSortKey,
    pub order: SortOrder,
    pub page: i64,
    pub limit: i64,
    pub skip: i64,
    pub pages: PagesDto,
    pub total_records: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagesDto {
    pub previous: Option<i64>,
    pub current: i64,
    pub next: Option<i64>,
    pub total: i64,
}

impl PagesDto {
    pub fn new(current: i64, limit: i64, total_records: i64) -> Self {
        let total = if total_records == 0 || limit < 1 {
            0
        } else {
            (total_records + limit - 1) / limit
        };
        Self {
            previous: (current > 1).then_some(current - 1),
            current,
            next: (current < total).then_some(current + 1),
            total,
        }
    }
}

pub struct GetReservationDto {
    pub id: Uuid,
    pub identity: Identity,
}

pub struct CreateReservationDto {
    pub car_id: Uuid,
    pub start_date: Date,
    pub end_date: Date,
    pub detail: Map<String, Value>,
    pub identity: Identity,
}

pub struct UpdateReservationDto {
    pub id: Uuid,
    pub car_id: Option<Uuid>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub detail: Option<Map<String, Value>>,
}

#[derive(Debug, Clone)]
pub struct UpdatedReservationDto {
    pub matched_count: u64,
    pub modified_count: u64,
    pub reservation: Option<ReservationDto>,
}

pub struct DeleteReservationDto {
    pub id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletedReservationDto {
    pub deleted_count: u64,
}
