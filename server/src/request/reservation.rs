use application::transfer::{
    CreateReservationDto, DeleteReservationDto, GetReservationDto, ListReservationsDto,
    UpdateReservationDto,
};
use error_stack::Report;
use kernel::prelude::entity::{Identity, ReservationSortKey, SortOrder};
use kernel::KernelError;
use serde::Deserialize;
use serde_json::{Map, Value};
use time::Date;
use uuid::Uuid;

use crate::controller::{Intake, TryIntake};
use crate::error::ErrorStatus;

/// Keys a client may never set through booking metadata.
const RESERVED_KEYS: [&str; 4] = ["id", "_id", "userId", "createdAt"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReservationsRequest {
    user_id: Option<Uuid>,
    car_id: Option<Uuid>,
    #[serde(default)]
    sort: ReservationSortKey,
    #[serde(default)]
    order: SortOrder,
    page: Option<i64>,
    limit: Option<i64>,
}

/// Every field besides the known ones is kept as booking metadata.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    car_id: Uuid,
    start_date: Date,
    end_date: Date,
    #[serde(flatten)]
    detail: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReservationRequest {
    car_id: Option<Uuid>,
    start_date: Option<Date>,
    end_date: Option<Date>,
    #[serde(flatten)]
    detail: Map<String, Value>,
}

#[derive(Debug)]
pub struct GetReservationRequest {
    id: String,
    identity: Identity,
}

impl GetReservationRequest {
    pub fn new(id: String, identity: Identity) -> Self {
        Self { id, identity }
    }
}

#[derive(Debug)]
pub struct DeleteReservationRequest {
    id: String,
}

impl DeleteReservationRequest {
    pub fn new(id: String) -> Self {
        Self { id }
    }
}

fn strip_reserved(mut detail: Map<String, Value>) -> Map<String, Value> {
    detail.retain(|key, _| !RESERVED_KEYS.contains(&key.as_str()));
    detail
}

/// Unknown or malformed ids are indistinguishable from missing reservations.
fn parse_id(id: &str) -> Result<Uuid, ErrorStatus> {
    Uuid::parse_str(id).map_err(|_| {
        ErrorStatus::from(
            Report::new(KernelError::NotFound)
                .attach_printable(format!("`{id}` is not a reservation id")),
        )
    })
}

pub struct ReservationTransformer;

impl Intake<ListReservationsRequest> for ReservationTransformer {
    type To = ListReservationsDto;
    fn emit(&self, input: ListReservationsRequest) -> Self::To {
        ListReservationsDto {
            user_id: input.user_id,
            car_id: input.car_id,
            sort: input.sort,
            order: input.order,
            page: input.page,
            limit: input.limit,
        }
    }
}

impl Intake<(Identity, CreateReservationRequest)> for ReservationTransformer {
    type To = CreateReservationDto;
    fn emit(&self, (identity, input): (Identity, CreateReservationRequest)) -> Self::To {
        CreateReservationDto {
            car_id: input.car_id,
            start_date: input.start_date,
            end_date: input.end_date,
            detail: strip_reserved(input.detail),
            identity,
        }
    }
}

/// A malformed id reads like an unknown one: `None` for privileged callers, not found otherwise.
impl TryIntake<GetReservationRequest> for ReservationTransformer {
    type To = Option<GetReservationDto>;
    type Error = ErrorStatus;
    fn emit(&self, input: GetReservationRequest) -> Result<Self::To, Self::Error> {
        let id = match parse_id(&input.id) {
            Ok(id) => id,
            Err(_) if input.identity.is_privileged() => return Ok(None),
            Err(error) => return Err(error),
        };
        Ok(Some(GetReservationDto {
            id,
            identity: input.identity,
        }))
    }
}

impl TryIntake<(String, UpdateReservationRequest)> for ReservationTransformer {
    type To = UpdateReservationDto;
    type Error = ErrorStatus;
    fn emit(
        &self,
        (id, input): (String, UpdateReservationRequest),
    ) -> Result<Self::To, Self::Error> {
        let detail = strip_reserved(input.detail);
        Ok(UpdateReservationDto {
            id: parse_id(&id)?,
            car_id: input.car_id,
            start_date: input.start_date,
            end_date: input.end_date,
            detail: (!detail.is_empty()).then_some(detail),
        })
    }
}

/// `None` when the id cannot name any reservation.
impl Intake<DeleteReservationRequest> for ReservationTransformer {
    type To = Option<DeleteReservationDto>;
    fn emit(&self, input: DeleteReservationRequest) -> Self::To {
        Uuid::parse_str(&input.id)
            .ok()
            .map(|id| DeleteReservationDto { id })
    }
}
