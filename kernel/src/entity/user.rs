mod id;
mod identity;

pub use self::{id::*, identity::*};
