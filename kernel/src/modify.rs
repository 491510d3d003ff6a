mod car;
mod reservation;

pub use self::{car::*, reservation::*};
