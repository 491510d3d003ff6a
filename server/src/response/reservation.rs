use application::transfer::{
    DeletedReservationDto, ListDetailsDto, PagesDto, ReservationDto, ReservationListDto,
    UpdatedReservationDto,
};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kernel::prelude::entity::{ReservationSortKey, SortOrder};
use serde::Serialize;
use serde_json::{Map, Value};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::controller::Exhaust;

/// Booking metadata is flattened next to the fixed fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    id: Uuid,
    car_id: Uuid,
    user_id: Uuid,
    start_date: Date,
    end_date: Date,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    #[serde(flatten)]
    detail: Map<String, Value>,
}

impl From<ReservationDto> for ReservationResponse {
    fn from(value: ReservationDto) -> Self {
        Self {
            id: value.id,
            car_id: value.car_id,
            user_id: value.user_id,
            start_date: value.start_date,
            end_date: value.end_date,
            created_at: value.created_at,
            detail: value.detail,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    car_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct PagesResponse {
    previous: Option<i64>,
    current: i64,
    next: Option<i64>,
    total: i64,
}

impl From<PagesDto> for PagesResponse {
    fn from(value: PagesDto) -> Self {
        Self {
            previous: value.previous,
            current: value.current,
            next: value.next,
            total: value.total,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDetailsResponse {
    filter: FilterResponse,
    sort: ReservationSortKey,
    order: SortOrder,
    page: i64,
    limit: i64,
    skip: i64,
    pages: PagesResponse,
    total_records: i64,
}

impl From<ListDetailsDto> for ListDetailsResponse {
    fn from(value: ListDetailsDto) -> Self {
        Self {
            filter: FilterResponse {
                user_id: value.user_id,
                car_id: value.car_id,
            },
            sort: value.sort,
            order: value.order,
            page: value.page,
            limit: value.limit,
            skip: value.skip,
            pages: PagesResponse::from(value.pages),
            total_records: value.total_records,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReservationListResponse {
    error: bool,
    data: Vec<ReservationResponse>,
    details: ListDetailsResponse,
}

impl IntoResponse for ReservationListResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedReservationResponse {
    error: bool,
    data: ReservationResponse,
}

impl IntoResponse for CreatedReservationResponse {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self)).into_response()
    }
}

/// `data` is `null` when a privileged caller asks for an unknown id.
#[derive(Debug, Serialize)]
pub struct ReservationFoundResponse {
    error: bool,
    data: Option<ReservationResponse>,
}

impl IntoResponse for ReservationFoundResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcknowledgementResponse {
    matched_count: u64,
    modified_count: u64,
}

#[derive(Debug, Serialize)]
pub struct UpdatedReservationResponse {
    error: bool,
    data: AcknowledgementResponse,
    new: Option<ReservationResponse>,
}

impl IntoResponse for UpdatedReservationResponse {
    fn into_response(self) -> Response {
        (StatusCode::ACCEPTED, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedCountResponse {
    deleted_count: u64,
}

#[derive(Debug, Serialize)]
pub struct DeletedReservationResponse {
    error: bool,
    data: DeletedCountResponse,
}

impl IntoResponse for DeletedReservationResponse {
    fn into_response(self) -> Response {
        let status = if self.error {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::NO_CONTENT
        };
        (status, Json(self)).into_response()
    }
}

pub struct ReservationPresenter;

impl Exhaust<ReservationListDto> for ReservationPresenter {
    type To = ReservationListResponse;
    fn emit(&self, input: ReservationListDto) -> Self::To {
        ReservationListResponse {
            error: false,
            data: input
                .reservations
                .into_iter()
                .map(ReservationResponse::from)
                .collect(),
            details: ListDetailsResponse::from(input.details),
        }
    }
}

impl Exhaust<ReservationDto> for ReservationPresenter {
    type To = CreatedReservationResponse;
    fn emit(&self, input: ReservationDto) -> Self::To {
        CreatedReservationResponse {
            error: false,
            data: ReservationResponse::from(input),
        }
    }
}

impl Exhaust<Option<ReservationDto>> for ReservationPresenter {
    type To = ReservationFoundResponse;
    fn emit(&self, input: Option<ReservationDto>) -> Self::To {
        ReservationFoundResponse {
            error: false,
            data: input.map(ReservationResponse::from),
        }
    }
}

impl Exhaust<UpdatedReservationDto> for ReservationPresenter {
    type To = UpdatedReservationResponse;
    fn emit(&self, input: UpdatedReservationDto) -> Self::To {
        UpdatedReservationResponse {
            error: false,
            data: AcknowledgementResponse {
                matched_count: input.matched_count,
                modified_count: input.modified_count,
            },
            new: input.reservation.map(ReservationResponse::from),
        }
    }
}

impl Exhaust<DeletedReservationDto> for ReservationPresenter {
    type To = DeletedReservationResponse;
    fn emit(&self, input: DeletedReservationDto) -> Self::To {
        DeletedReservationResponse {
            error: input.deleted_count == 0,
            data: DeletedCountResponse {
                deleted_count: input.deleted_count,
            },
        }
    }
}
