use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, DbErr, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
    sea_query::Query,
};
use tracing::info;

use crate::db::entities::{prelude::{RecipeIngredient, Ingredient}, recipe_ingredient, ingredient};
use crate::db::services::validation::clean_name;

#[derive(Debug, thiserror::Error)]
pub enum IngredientError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),
    #[error("Ingredient not found: {0}")]
    NotFound(i32),
    #[error("{0}")]
    InvalidName(String),
}

pub struct IngredientService;

impl IngredientService {
    /// Lists the user's ingredients by name descending; `assigned_only` keeps
    /// those used by at least one recipe, each returned once.
    pub async fn list_ingredients(
        db: &DbConn,
        user_id: i32,
        assigned_only: bool,
    ) -> Result<Vec<ingredient::Model>, IngredientError> {
        let mut query = Ingredient::find().filter(ingredient::Column::UserId.eq(user_id));

        if assigned_only {
            query = query.filter(
                ingredient::Column::Id.in_subquery(
                    Query::select()
                        .column(recipe_ingredient::Column::IngredientId)
                        .from(RecipeIngredient)
                        .to_owned(),
                ),
            );
        }

        Ok(query
            .order_by_desc(ingredient::Column::Name)
            .order_by_asc(ingredient::Column::Id)
            .all(db)
            .await?)
    }

    pub async fn create_ingredient(db: &DbConn, user_id: i32, name: &str) -> Result<ingredient::Model, IngredientError> {
        let name = clean_name(name, "name").map_err(IngredientError::InvalidName)?;

        let new_ingredient = ingredient::ActiveModel {
            user_id: Set(user_id),
            name: Set(name),
            ..Default::default()
        };
        let ingredient = new_ingredient.insert(db).await?;

        info!(user_id, ingredient_id = ingredient.id, "Created ingredient.");
        Ok(ingredient)
    }

    pub async fn get_ingredient(db: &DbConn, user_id: i32, ingredient_id: i32) -> Result<ingredient::Model, IngredientError> {
        Ingredient::find_by_id(ingredient_id)
            .filter(ingredient::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or(IngredientError::NotFound(ingredient_id))
    }

    pub async fn rename_ingredient(
        db: &DbConn,
        user_id: i32,
        ingredient_id: i32,
        name: &str,
    ) -> Result<ingredient::Model, IngredientError> {
        let name = clean_name(name, "name").map_err(IngredientError::InvalidName)?;
        let ingredient = Self::get_ingredient(db, user_id, ingredient_id).await?;

        let mut active_ingredient: ingredient::ActiveModel = ingredient.into();
        active_ingredient.name = Set(name);
        Ok(active_ingredient.update(db).await?)
    }

    /// Deletes the ingredient and removes it from every recipe.
    pub async fn delete_ingredient(db: &DbConn, user_id: i32, ingredient_id: i32) -> Result<(), IngredientError> {
        let txn = db.begin().await?;

        let ingredient = Ingredient::find_by_id(ingredient_id)
            .filter(ingredient::Column::UserId.eq(user_id))
            .one(&txn)
            .await?
            .ok_or(IngredientError::NotFound(ingredient_id))?;

        RecipeIngredient::delete_many()
            .filter(recipe_ingredient::Column::IngredientId.eq(ingredient_id))
            .exec(&txn)
            .await?;
        ingredient.delete(&txn).await?;

        txn.commit().await?;
        info!(user_id, ingredient_id, "Deleted ingredient.");
        Ok(())
    }
}
