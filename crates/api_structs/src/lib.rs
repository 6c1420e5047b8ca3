mod medication;
mod response;
mod status;

pub mod dtos {
    pub use crate::medication::dtos::*;
}

pub use crate::medication::api::*;
pub use crate::response::api::*;
pub use crate::status::api::*;
