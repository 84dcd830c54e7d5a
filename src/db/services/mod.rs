//! The `services` module encapsulates every query against the recipe tables.
//! HTTP handlers and the admin pages only talk to these services, always
//! passing the authenticated user's id so results stay scoped to its owner.

pub mod ingredient_service;
pub mod recipe_service;
pub mod tag_service;
pub mod user_service;
pub mod validation;

pub use ingredient_service::*;
pub use recipe_service::*;
pub use tag_service::*;
pub use user_service::*;
