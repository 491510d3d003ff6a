use application::service::{
    CreateReservationService, DeleteReservationService, GetReservationService,
    UpdateReservationService,
};
use application::transfer::DeletedReservationDto;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use axum_extra::extract::{Query, QueryRejection};

use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::{AppModule, Database};
use crate::identity::{Authenticated, Privileged};
use crate::request::{
    CreateReservationRequest, DeleteReservationRequest, GetReservationRequest,
    ListReservationsRequest, ReservationTransformer, UpdateReservationRequest,
};
use crate::response::ReservationPresenter;

pub trait ReservationRouter {
    fn route_reservation(self) -> Self;
}

impl<D> ReservationRouter for Router<AppModule<D>>
where
    D: Database
        + GetReservationService<D::Transaction>
        + CreateReservationService<D::Transaction>
        + UpdateReservationService<D::Transaction>
        + DeleteReservationService<D::Transaction>,
{
    fn route_reservation(self) -> Self {
        let update = |State(module): State<AppModule<D>>,
                      Privileged(_): Privileged,
                      Path(id): Path<String>,
                      body: Result<Json<UpdateReservationRequest>, JsonRejection>| async move {
            let Json(req) = body?;
            Controller::new(ReservationTransformer, ReservationPresenter)
                .try_intake((id, req))?
                .handle(|dto| async move { module.database().update_reservation(dto).await })
                .await
                .map_err(ErrorStatus::from)
        };

        self.route(
            "/reservations",
            get(
                |State(module): State<AppModule<D>>,
                 Privileged(_): Privileged,
                 query: Result<Query<ListReservationsRequest>, QueryRejection>| async move {
                    let Query(req) = query?;
                    Controller::new(ReservationTransformer, ReservationPresenter)
                        .intake(req)
                        .handle(|dto| async move { module.database().list_reservations(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            )
            .post(
                |State(module): State<AppModule<D>>,
                 Authenticated(identity): Authenticated,
                 body: Result<Json<CreateReservationRequest>, JsonRejection>| async move {
                    let Json(req) = body?;
                    Controller::new(ReservationTransformer, ReservationPresenter)
                        .intake((identity, req))
                        .handle(|dto| async move {
                            module.database().create_reservation(dto).await
                        })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/reservations/:id",
            get(
                |State(module): State<AppModule<D>>,
                 Authenticated(identity): Authenticated,
                 Path(id): Path<String>| async move {
                    Controller::new(ReservationTransformer, ReservationPresenter)
                        .try_intake(GetReservationRequest::new(id, identity))?
                        .handle(|dto| async move {
                            match dto {
                                Some(dto) => module.database().get_reservation(dto).await,
                                None => Ok(None),
                            }
                        })
                        .await
                        .map_err(ErrorStatus::from)
                },
            )
            .put(update)
            .patch(update)
            .delete(
                |State(module): State<AppModule<D>>,
                 Privileged(_): Privileged,
                 Path(id): Path<String>| async move {
                    Controller::new(ReservationTransformer, ReservationPresenter)
                        .intake(DeleteReservationRequest::new(id))
                        .handle(|dto| async move {
                            match dto {
                                Some(dto) => module.database().delete_reservation(dto).await,
                                None => Ok(DeletedReservationDto { deleted_count: 0 }),
                            }
                        })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}
