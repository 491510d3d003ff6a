use application::service::{
    CreateReservationService, DeleteReservationService, GetReservationService,
    UpdateReservationService,
};
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handler::{AppModule, Database};
use crate::identity::{IS_ADMIN, IS_STAFF, USER_ID};

pub use self::reservation::*;

mod reservation;

pub fn router<D>(module: AppModule<D>) -> Router
where
    D: Database
        + GetReservationService<D::Transaction>
        + CreateReservationService<D::Transaction>
        + UpdateReservationService<D::Transaction>
        + DeleteReservationService<D::Transaction>,
{
    Router::<AppModule<D>>::new()
        .route_reservation()
        .layer(TraceLayer::new_for_http())
        .with_state(module)
}

pub fn cors(origins: &[HeaderValue]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins.iter().cloned()))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(USER_ID),
            HeaderName::from_static(IS_ADMIN),
            HeaderName::from_static(IS_STAFF),
        ])
}
