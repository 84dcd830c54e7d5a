pub mod admin_routes;
pub mod ingredient_routes;
pub mod recipe_routes;
pub mod tag_routes;
pub mod user_routes;
