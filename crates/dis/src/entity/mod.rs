mod appearance;
mod catalog;
mod state;

pub use appearance::{Appearance, AppearanceFlags};
pub use catalog::{
    CONTAINER_SHIP_MEDIUM, CONTAINER_SHIP_SMALL, EntityCatalog, EntityTypeCode,
    ParseEntityTypeError,
};
pub use state::{AngularVelocity, Attitude, EntityState};
