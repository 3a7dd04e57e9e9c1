//! Domain layer: entities and value objects of the token lifecycle.

pub mod entities;
pub mod value_objects;
