mod car;
mod common;
mod reservation;
mod user;

pub use self::{car::*, common::*, reservation::*, user::*};
