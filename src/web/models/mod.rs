use axum::extract::FromRequest;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::entities::{ingredient, tag, user};
use crate::db::services::{RecipeDetail, RecipeInput, RecipePatch, RecipeWithLinks};
use crate::web::error::AppError;

/// `axum::Json` whose rejections are reported as a 400 `AppError`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

// --- Users and authentication ---

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMeRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Public view of a user; the password hash never leaves the store.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub email: String,
    pub name: String,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        UserResponse {
            email: user.email,
            name: user.name,
        }
    }
}

// JWT Claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // email
    pub user_id: i32,
    pub exp: usize,
}

/// Struct to hold authenticated user details, to be passed as a request extension.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub email: String,
}

// --- Tags and ingredients ---

#[derive(Debug, Deserialize)]
pub struct NameRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct AssignedOnlyQuery {
    pub assigned_only: Option<String>,
}

impl AssignedOnlyQuery {
    /// Accepts integers (non-zero is true) and `true`/`false`.
    pub fn assigned_only(&self) -> Result<bool, AppError> {
        let Some(raw) = self.assigned_only.as_deref().map(str::trim) else {
            return Ok(false);
        };
        if raw.is_empty() {
            return Ok(false);
        }
        if let Ok(value) = raw.parse::<i64>() {
            return Ok(value != 0);
        }
        match raw.to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(AppError::InvalidInput(format!(
                "assigned_only must be 0 or 1, got '{raw}'"
            ))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TagResponse {
    pub id: i32,
    pub name: String,
}

impl From<tag::Model> for TagResponse {
    fn from(tag: tag::Model) -> Self {
        TagResponse { id: tag.id, name: tag.name }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct IngredientResponse {
    pub id: i32,
    pub name: String,
}

impl From<ingredient::Model> for IngredientResponse {
    fn from(ingredient: ingredient::Model) -> Self {
        IngredientResponse {
            id: ingredient.id,
            name: ingredient.name,
        }
    }
}

// --- Recipes ---

#[derive(Debug, Deserialize)]
pub struct RecipeRequest {
    #[serde(default)]
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub tags: Vec<i32>,
    #[serde(default)]
    pub ingredients: Vec<i32>,
}

impl From<RecipeRequest> for RecipeInput {
    fn from(req: RecipeRequest) -> Self {
        RecipeInput {
            title: req.title,
            time_minutes: req.time_minutes,
            price: req.price,
            link: req.link,
            tags: req.tags,
            ingredients: req.ingredients,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RecipePatchRequest {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub link: Option<String>,
    pub tags: Option<Vec<i32>>,
    pub ingredients: Option<Vec<i32>>,
}

impl From<RecipePatchRequest> for RecipePatch {
    fn from(req: RecipePatchRequest) -> Self {
        RecipePatch {
            title: req.title,
            time_minutes: req.time_minutes,
            price: req.price,
            link: req.link,
            tags: req.tags,
            ingredients: req.ingredients,
        }
    }
}

/// `?tags=1,2&ingredients=3` filter for the recipe list.
#[derive(Debug, Deserialize, Default)]
pub struct RecipeListQuery {
    pub tags: Option<String>,
    pub ingredients: Option<String>,
}

/// Parses a comma separated id list; blank segments are skipped.
pub fn parse_id_list(raw: Option<&str>, param: &str) -> Result<Vec<i32>, AppError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i32>().map_err(|_| {
                AppError::InvalidInput(format!("{param} must be a comma separated list of ids"))
            })
        })
        .collect()
}

/// Prices always carry two decimal places on the wire, e.g. `"3.00"`.
fn display_price(price: Decimal) -> Decimal {
    let mut price = price;
    price.rescale(2);
    price
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RecipeResponse {
    pub id: i32,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub tags: Vec<i32>,
    pub ingredients: Vec<i32>,
}

impl From<RecipeWithLinks> for RecipeResponse {
    fn from(item: RecipeWithLinks) -> Self {
        RecipeResponse {
            id: item.recipe.id,
            title: item.recipe.title,
            time_minutes: item.recipe.time_minutes,
            price: display_price(item.recipe.price),
            link: item.recipe.link,
            tags: item.tag_ids,
            ingredients: item.ingredient_ids,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RecipeDetailResponse {
    pub id: i32,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub tags: Vec<TagResponse>,
    pub ingredients: Vec<IngredientResponse>,
}

impl From<RecipeDetail> for RecipeDetailResponse {
    fn from(detail: RecipeDetail) -> Self {
        RecipeDetailResponse {
            id: detail.recipe.id,
            title: detail.recipe.title,
            time_minutes: detail.recipe.time_minutes,
            price: display_price(detail.recipe.price),
            link: detail.recipe.link,
            tags: detail.tags.into_iter().map(TagResponse::from).collect(),
            ingredients: detail.ingredients.into_iter().map(IngredientResponse::from).collect(),
        }
    }
}
