use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbConn, DbErr, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
    sea_query::{OnConflict, Query},
};
use tracing::info;

use crate::db::entities::{
    ingredient, recipe, recipe_ingredient, recipe_tag, tag,
    prelude::{Ingredient, Recipe, RecipeIngredient, RecipeTag, Tag},
};
use crate::db::services::validation::{MAX_NAME_LEN, clean_name};

#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),
    #[error("Recipe not found: {0}")]
    NotFound(i32),
    #[error("{0}")]
    RelatedNotFound(String),
    #[error("{0}")]
    Invalid(String),
}

/// A complete recipe payload, used for create and full update.
#[derive(Debug, Clone)]
pub struct RecipeInput {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub tags: Vec<i32>,
    pub ingredients: Vec<i32>,
}

/// Partial update; `None` leaves the field untouched, `Some(vec![])` clears
/// the links.
#[derive(Debug, Clone, Default)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub link: Option<String>,
    pub tags: Option<Vec<i32>>,
    pub ingredients: Option<Vec<i32>>,
}

impl From<RecipeInput> for RecipePatch {
    fn from(input: RecipeInput) -> Self {
        RecipePatch {
            title: Some(input.title),
            time_minutes: Some(input.time_minutes),
            price: Some(input.price),
            link: Some(input.link),
            tags: Some(input.tags),
            ingredients: Some(input.ingredients),
        }
    }
}

/// Restricts a recipe listing to recipes linked to any of the given ids.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub tags: Vec<i32>,
    pub ingredients: Vec<i32>,
}

/// A recipe with the ids of its tags and ingredients, as listed.
#[derive(Debug, Clone)]
pub struct RecipeWithLinks {
    pub recipe: recipe::Model,
    pub tag_ids: Vec<i32>,
    pub ingredient_ids: Vec<i32>,
}

/// A recipe with its tags and ingredients loaded.
#[derive(Debug, Clone)]
pub struct RecipeDetail {
    pub recipe: recipe::Model,
    pub tags: Vec<tag::Model>,
    pub ingredients: Vec<ingredient::Model>,
}

/// Exclusive upper bound for a `DECIMAL(5, 2)` price.
fn max_price() -> Decimal {
    Decimal::new(100_000, 2)
}

fn validate_price(price: Decimal) -> Result<Decimal, RecipeError> {
    if price.is_sign_negative() {
        return Err(RecipeError::Invalid("price may not be negative.".to_string()));
    }
    if price.normalize().scale() > 2 {
        return Err(RecipeError::Invalid(
            "price may not have more than 2 decimal places.".to_string(),
        ));
    }
    if price >= max_price() {
        return Err(RecipeError::Invalid(
            "price may not have more than 5 digits in total.".to_string(),
        ));
    }
    Ok(price)
}

fn validate_time(time_minutes: i32) -> Result<i32, RecipeError> {
    if time_minutes < 0 {
        return Err(RecipeError::Invalid("time_minutes may not be negative.".to_string()));
    }
    Ok(time_minutes)
}

fn validate_link(link: String) -> Result<String, RecipeError> {
    let link = link.trim().to_string();
    if link.chars().count() > MAX_NAME_LEN {
        return Err(RecipeError::Invalid(format!(
            "link may not be longer than {MAX_NAME_LEN} characters."
        )));
    }
    Ok(link)
}

fn dedup_ids(mut ids: Vec<i32>) -> Vec<i32> {
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Checks every id names a tag owned by `user_id`.
async fn owned_tag_ids<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    ids: Vec<i32>,
) -> Result<Vec<i32>, RecipeError> {
    let ids = dedup_ids(ids);
    if ids.is_empty() {
        return Ok(ids);
    }
    let owned = Tag::find()
        .filter(tag::Column::UserId.eq(user_id))
        .filter(tag::Column::Id.is_in(ids.clone()))
        .count(conn)
        .await?;
    if owned != ids.len() as u64 {
        return Err(RecipeError::Invalid("tags contains an invalid tag id.".to_string()));
    }
    Ok(ids)
}

/// Checks every id names an ingredient owned by `user_id`.
async fn owned_ingredient_ids<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    ids: Vec<i32>,
) -> Result<Vec<i32>, RecipeError> {
    let ids = dedup_ids(ids);
    if ids.is_empty() {
        return Ok(ids);
    }
    let owned = Ingredient::find()
        .filter(ingredient::Column::UserId.eq(user_id))
        .filter(ingredient::Column::Id.is_in(ids.clone()))
        .count(conn)
        .await?;
    if owned != ids.len() as u64 {
        return Err(RecipeError::Invalid(
            "ingredients contains an invalid ingredient id.".to_string(),
        ));
    }
    Ok(ids)
}

async fn replace_tag_links<C: ConnectionTrait>(
    conn: &C,
    recipe_id: i32,
    tag_ids: &[i32],
) -> Result<(), DbErr> {
    RecipeTag::delete_many()
        .filter(recipe_tag::Column::RecipeId.eq(recipe_id))
        .exec(conn)
        .await?;
    if tag_ids.is_empty() {
        return Ok(());
    }
    let rows = tag_ids.iter().map(|&tag_id| recipe_tag::ActiveModel {
        recipe_id: Set(recipe_id),
        tag_id: Set(tag_id),
    });
    RecipeTag::insert_many(rows).exec_without_returning(conn).await?;
    Ok(())
}

async fn replace_ingredient_links<C: ConnectionTrait>(
    conn: &C,
    recipe_id: i32,
    ingredient_ids: &[i32],
) -> Result<(), DbErr> {
    RecipeIngredient::delete_many()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
        .exec(conn)
        .await?;
    if ingredient_ids.is_empty() {
        return Ok(());
    }
    let rows = ingredient_ids.iter().map(|&ingredient_id| recipe_ingredient::ActiveModel {
        recipe_id: Set(recipe_id),
        ingredient_id: Set(ingredient_id),
    });
    RecipeIngredient::insert_many(rows).exec_without_returning(conn).await?;
    Ok(())
}

async fn find_owned_recipe<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    recipe_id: i32,
) -> Result<recipe::Model, RecipeError> {
    Recipe::find_by_id(recipe_id)
        .filter(recipe::Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or(RecipeError::NotFound(recipe_id))
}

pub struct RecipeService;

impl RecipeService {
    /// Lists the user's recipes, most recently created first. Tag and
    /// ingredient filters are `IN (subquery)` predicates, so a recipe matching
    /// several of the requested ids appears once.
    pub async fn list_recipes(
        db: &DbConn,
        user_id: i32,
        filter: RecipeFilter,
    ) -> Result<Vec<RecipeWithLinks>, RecipeError> {
        let mut query = Recipe::find().filter(recipe::Column::UserId.eq(user_id));

        if !filter.tags.is_empty() {
            query = query.filter(
                recipe::Column::Id.in_subquery(
                    Query::select()
                        .column(recipe_tag::Column::RecipeId)
                        .from(RecipeTag)
                        .and_where(recipe_tag::Column::TagId.is_in(filter.tags))
                        .to_owned(),
                ),
            );
        }
        if !filter.ingredients.is_empty() {
            query = query.filter(
                recipe::Column::Id.in_subquery(
                    Query::select()
                        .column(recipe_ingredient::Column::RecipeId)
                        .from(RecipeIngredient)
                        .and_where(recipe_ingredient::Column::IngredientId.is_in(filter.ingredients))
                        .to_owned(),
                ),
            );
        }

        let recipes = query.order_by_desc(recipe::Column::Id).all(db).await?;
        if recipes.is_empty() {
            return Ok(Vec::new());
        }
        let recipe_ids: Vec<i32> = recipes.iter().map(|r| r.id).collect();

        let mut tags_by_recipe: HashMap<i32, Vec<i32>> = HashMap::new();
        for link in RecipeTag::find()
            .filter(recipe_tag::Column::RecipeId.is_in(recipe_ids.clone()))
            .order_by_asc(recipe_tag::Column::TagId)
            .all(db)
            .await?
        {
            tags_by_recipe.entry(link.recipe_id).or_default().push(link.tag_id);
        }

        let mut ingredients_by_recipe: HashMap<i32, Vec<i32>> = HashMap::new();
        for link in RecipeIngredient::find()
            .filter(recipe_ingredient::Column::RecipeId.is_in(recipe_ids))
            .order_by_asc(recipe_ingredient::Column::IngredientId)
            .all(db)
            .await?
        {
            ingredients_by_recipe
                .entry(link.recipe_id)
                .or_default()
                .push(link.ingredient_id);
        }

        Ok(recipes
            .into_iter()
            .map(|recipe| RecipeWithLinks {
                tag_ids: tags_by_recipe.remove(&recipe.id).unwrap_or_default(),
                ingredient_ids: ingredients_by_recipe.remove(&recipe.id).unwrap_or_default(),
                recipe,
            })
            .collect())
    }

    pub async fn get_recipe(
        db: &DbConn,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<RecipeDetail, RecipeError> {
        let recipe = find_owned_recipe(db, user_id, recipe_id).await?;
        let tags = recipe
            .find_related(Tag)
            .order_by_asc(tag::Column::Id)
            .all(db)
            .await?;
        let ingredients = recipe
            .find_related(Ingredient)
            .order_by_asc(ingredient::Column::Id)
            .all(db)
            .await?;

        Ok(RecipeDetail { recipe, tags, ingredients })
    }

    pub async fn create_recipe(
        db: &DbConn,
        user_id: i32,
        input: RecipeInput,
    ) -> Result<RecipeWithLinks, RecipeError> {
        let title = clean_name(&input.title, "title").map_err(RecipeError::Invalid)?;
        let time_minutes = validate_time(input.time_minutes)?;
        let price = validate_price(input.price)?;
        let link = validate_link(input.link)?;

        let txn = db.begin().await?;
        let tag_ids = owned_tag_ids(&txn, user_id, input.tags).await?;
        let ingredient_ids = owned_ingredient_ids(&txn, user_id, input.ingredients).await?;

        let now = Utc::now();
        let recipe = recipe::ActiveModel {
            user_id: Set(user_id),
            title: Set(title),
            time_minutes: Set(time_minutes),
            price: Set(price),
            link: Set(link),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        replace_tag_links(&txn, recipe.id, &tag_ids).await?;
        replace_ingredient_links(&txn, recipe.id, &ingredient_ids).await?;
        txn.commit().await?;

        info!(user_id, recipe_id = recipe.id, "Created recipe.");
        Ok(RecipeWithLinks { recipe, tag_ids, ingredient_ids })
    }

    /// Replaces every field and both link sets.
    pub async fn update_recipe(
        db: &DbConn,
        user_id: i32,
        recipe_id: i32,
        input: RecipeInput,
    ) -> Result<RecipeWithLinks, RecipeError> {
        Self::patch_recipe(db, user_id, recipe_id, input.into()).await
    }

    pub async fn patch_recipe(
        db: &DbConn,
        user_id: i32,
        recipe_id: i32,
        patch: RecipePatch,
    ) -> Result<RecipeWithLinks, RecipeError> {
        let txn = db.begin().await?;
        let existing = find_owned_recipe(&txn, user_id, recipe_id).await?;
        let mut active: recipe::ActiveModel = existing.into();

        if let Some(title) = patch.title {
            active.title = Set(clean_name(&title, "title").map_err(RecipeError::Invalid)?);
        }
        if let Some(time_minutes) = patch.time_minutes {
            active.time_minutes = Set(validate_time(time_minutes)?);
        }
        if let Some(price) = patch.price {
            active.price = Set(validate_price(price)?);
        }
        if let Some(link) = patch.link {
            active.link = Set(validate_link(link)?);
        }
        if let Some(tags) = patch.tags {
            let tag_ids = owned_tag_ids(&txn, user_id, tags).await?;
            replace_tag_links(&txn, recipe_id, &tag_ids).await?;
        }
        if let Some(ingredients) = patch.ingredients {
            let ingredient_ids = owned_ingredient_ids(&txn, user_id, ingredients).await?;
            replace_ingredient_links(&txn, recipe_id, &ingredient_ids).await?;
        }
        active.updated_at = Set(Utc::now());
        let recipe = active.update(&txn).await?;

        let tag_ids = RecipeTag::find()
            .filter(recipe_tag::Column::RecipeId.eq(recipe_id))
            .order_by_asc(recipe_tag::Column::TagId)
            .all(&txn)
            .await?
            .into_iter()
            .map(|link| link.tag_id)
            .collect();
        let ingredient_ids = RecipeIngredient::find()
            .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
            .order_by_asc(recipe_ingredient::Column::IngredientId)
            .all(&txn)
            .await?
            .into_iter()
            .map(|link| link.ingredient_id)
            .collect();
        txn.commit().await?;

        Ok(RecipeWithLinks { recipe, tag_ids, ingredient_ids })
    }

    pub async fn delete_recipe(db: &DbConn, user_id: i32, recipe_id: i32) -> Result<(), RecipeError> {
        let txn = db.begin().await?;
        let recipe = find_owned_recipe(&txn, user_id, recipe_id).await?;

        replace_tag_links(&txn, recipe_id, &[]).await?;
        replace_ingredient_links(&txn, recipe_id, &[]).await?;
        recipe.delete(&txn).await?;

        txn.commit().await?;
        info!(user_id, recipe_id, "Deleted recipe.");
        Ok(())
    }

    /// Attaches a tag; attaching an already attached tag is a no-op.
    pub async fn add_tag(
        db: &DbConn,
        user_id: i32,
        recipe_id: i32,
        tag_id: i32,
    ) -> Result<(), RecipeError> {
        find_owned_recipe(db, user_id, recipe_id).await?;
        Tag::find_by_id(tag_id)
            .filter(tag::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| RecipeError::RelatedNotFound(format!("Tag not found: {tag_id}")))?;

        // An existing edge is left alone, even under concurrent attaches.
        RecipeTag::insert(recipe_tag::ActiveModel {
            recipe_id: Set(recipe_id),
            tag_id: Set(tag_id),
        })
        .on_conflict(
            OnConflict::columns([recipe_tag::Column::RecipeId, recipe_tag::Column::TagId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
        Ok(())
    }

    pub async fn remove_tag(
        db: &DbConn,
        user_id: i32,
        recipe_id: i32,
        tag_id: i32,
    ) -> Result<(), RecipeError> {
        find_owned_recipe(db, user_id, recipe_id).await?;
        RecipeTag::delete_many()
            .filter(recipe_tag::Column::RecipeId.eq(recipe_id))
            .filter(recipe_tag::Column::TagId.eq(tag_id))
            .exec(db)
            .await?;
        Ok(())
    }

    /// Attaches an ingredient; attaching it twice is a no-op.
    pub async fn add_ingredient(
        db: &DbConn,
        user_id: i32,
        recipe_id: i32,
        ingredient_id: i32,
    ) -> Result<(), RecipeError> {
        find_owned_recipe(db, user_id, recipe_id).await?;
        Ingredient::find_by_id(ingredient_id)
            .filter(ingredient::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| {
                RecipeError::RelatedNotFound(format!("Ingredient not found: {ingredient_id}"))
            })?;

        RecipeIngredient::insert(recipe_ingredient::ActiveModel {
            recipe_id: Set(recipe_id),
            ingredient_id: Set(ingredient_id),
        })
        .on_conflict(
            OnConflict::columns([
                recipe_ingredient::Column::RecipeId,
                recipe_ingredient::Column::IngredientId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
        Ok(())
    }

    pub async fn remove_ingredient(
        db: &DbConn,
        user_id: i32,
        recipe_id: i32,
        ingredient_id: i32,
    ) -> Result<(), RecipeError> {
        find_owned_recipe(db, user_id, recipe_id).await?;
        RecipeIngredient::delete_many()
            .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
            .filter(recipe_ingredient::Column::IngredientId.eq(ingredient_id))
            .exec(db)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::services::{ingredient_service::IngredientService, tag_service::TagService};
    use crate::db::test_fixtures::{create_test_user, test_user_store};

    fn sample(title: &str) -> RecipeInput {
        RecipeInput {
            title: title.to_string(),
            time_minutes: 10,
            price: Decimal::new(500, 2),
            link: String::new(),
            tags: Vec::new(),
            ingredients: Vec::new(),
        }
    }

    #[test]
    fn test_validate_price_bounds() {
        assert!(validate_price(Decimal::new(300, 2)).is_ok());
        assert!(validate_price(Decimal::new(99_999, 2)).is_ok());
        assert!(validate_price(Decimal::new(3000, 3)).is_ok());
        assert!(validate_price(Decimal::new(100_000, 2)).is_err());
        assert!(validate_price(Decimal::new(3001, 3)).is_err());
        assert!(validate_price(Decimal::new(-1, 0)).is_err());
    }

    #[tokio::test]
    async fn test_create_recipe_with_tags_and_ingredients() {
        let store = test_user_store().await;
        let user = create_test_user(&store, "test@gmail.com").await;
        let db = store.db();

        let vegan = TagService::create_tag(db, user.id, "Vegan").await.unwrap();
        let dessert = TagService::create_tag(db, user.id, "Dessert").await.unwrap();
        let oats = IngredientService::create_ingredient(db, user.id, "oats").await.unwrap();

        let mut input = sample("Oat cookies");
        input.tags = vec![dessert.id, vegan.id, dessert.id];
        input.ingredients = vec![oats.id];
        let created = RecipeService::create_recipe(db, user.id, input).await.unwrap();

        let mut expected_tags = vec![vegan.id, dessert.id];
        expected_tags.sort_unstable();
        assert_eq!(created.tag_ids, expected_tags);
        assert_eq!(created.ingredient_ids, vec![oats.id]);

        let detail = RecipeService::get_recipe(db, user.id, created.recipe.id).await.unwrap();
        assert_eq!(detail.recipe.title, "Oat cookies");
        assert_eq!(detail.tags.len(), 2);
        assert_eq!(detail.ingredients, vec![oats]);
    }

    #[tokio::test]
    async fn test_create_recipe_rejects_foreign_tag() {
        let store = test_user_store().await;
        let user = create_test_user(&store, "test@gmail.com").await;
        let other = create_test_user(&store, "other@gmail.com").await;
        let db = store.db();

        let foreign = TagService::create_tag(db, other.id, "Theirs").await.unwrap();
        let mut input = sample("Stolen");
        input.tags = vec![foreign.id];

        let result = RecipeService::create_recipe(db, user.id, input).await;
        assert!(matches!(result, Err(RecipeError::Invalid(_))));
        assert!(
            RecipeService::list_recipes(db, user.id, RecipeFilter::default())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_list_recipes_scoped_and_filtered() {
        let store = test_user_store().await;
        let user = create_test_user(&store, "test@gmail.com").await;
        let other = create_test_user(&store, "other@gmail.com").await;
        let db = store.db();

        let curry = TagService::create_tag(db, user.id, "Curry").await.unwrap();
        let feta = IngredientService::create_ingredient(db, user.id, "feta").await.unwrap();

        let mut thai = sample("Thai curry");
        thai.tags = vec![curry.id];
        let thai = RecipeService::create_recipe(db, user.id, thai).await.unwrap();
        let mut salad = sample("Greek salad");
        salad.ingredients = vec![feta.id];
        let salad = RecipeService::create_recipe(db, user.id, salad).await.unwrap();
        RecipeService::create_recipe(db, user.id, sample("Fish and chips")).await.unwrap();
        RecipeService::create_recipe(db, other.id, sample("Not mine")).await.unwrap();

        let all = RecipeService::list_recipes(db, user.id, RecipeFilter::default()).await.unwrap();
        let titles: Vec<_> = all.iter().map(|r| r.recipe.title.as_str()).collect();
        assert_eq!(titles, vec!["Fish and chips", "Greek salad", "Thai curry"]);

        let by_tag = RecipeService::list_recipes(
            db,
            user.id,
            RecipeFilter { tags: vec![curry.id], ingredients: Vec::new() },
        )
        .await
        .unwrap();
        assert_eq!(by_tag.len(), 1);
        assert_eq!(by_tag[0].recipe.id, thai.recipe.id);
        assert_eq!(by_tag[0].tag_ids, vec![curry.id]);

        let by_ingredient = RecipeService::list_recipes(
            db,
            user.id,
            RecipeFilter { tags: Vec::new(), ingredients: vec![feta.id] },
        )
        .await
        .unwrap();
        assert_eq!(by_ingredient.len(), 1);
        assert_eq!(by_ingredient[0].recipe.id, salad.recipe.id);
    }

    #[tokio::test]
    async fn test_patch_recipe_only_touches_given_fields() {
        let store = test_user_store().await;
        let user = create_test_user(&store, "test@gmail.com").await;
        let db = store.db();

        let tag = TagService::create_tag(db, user.id, "Quick").await.unwrap();
        let mut input = sample("Toast");
        input.tags = vec![tag.id];
        let created = RecipeService::create_recipe(db, user.id, input).await.unwrap();

        let patched = RecipeService::patch_recipe(
            db,
            user.id,
            created.recipe.id,
            RecipePatch { title: Some("Cheese toast".to_string()), ..Default::default() },
        )
        .await
        .unwrap();
        assert_eq!(patched.recipe.title, "Cheese toast");
        assert_eq!(patched.recipe.time_minutes, 10);
        assert_eq!(patched.tag_ids, vec![tag.id]);

        let replaced = RecipeService::update_recipe(db, user.id, created.recipe.id, sample("Plain toast"))
            .await
            .unwrap();
        assert_eq!(replaced.recipe.title, "Plain toast");
        assert!(replaced.tag_ids.is_empty());
    }

    #[tokio::test]
    async fn test_add_and_remove_links_independently() {
        let store = test_user_store().await;
        let user = create_test_user(&store, "test@gmail.com").await;
        let other = create_test_user(&store, "other@gmail.com").await;
        let db = store.db();

        let recipe = RecipeService::create_recipe(db, user.id, sample("Soup")).await.unwrap();
        let tag = TagService::create_tag(db, user.id, "Winter").await.unwrap();
        let leek = IngredientService::create_ingredient(db, user.id, "leek").await.unwrap();

        RecipeService::add_tag(db, user.id, recipe.recipe.id, tag.id).await.unwrap();
        RecipeService::add_tag(db, user.id, recipe.recipe.id, tag.id).await.unwrap();
        RecipeService::add_ingredient(db, user.id, recipe.recipe.id, leek.id).await.unwrap();

        let detail = RecipeService::get_recipe(db, user.id, recipe.recipe.id).await.unwrap();
        assert_eq!(detail.tags, vec![tag.clone()]);
        assert_eq!(detail.ingredients, vec![leek.clone()]);

        RecipeService::remove_tag(db, user.id, recipe.recipe.id, tag.id).await.unwrap();
        RecipeService::remove_ingredient(db, user.id, recipe.recipe.id, leek.id).await.unwrap();
        let detail = RecipeService::get_recipe(db, user.id, recipe.recipe.id).await.unwrap();
        assert!(detail.tags.is_empty());
        assert!(detail.ingredients.is_empty());

        let foreign = RecipeService::add_tag(db, other.id, recipe.recipe.id, tag.id).await;
        assert!(matches!(foreign, Err(RecipeError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_concurrent_attaches_keep_a_single_link() {
        let store = test_user_store().await;
        let user = create_test_user(&store, "test@gmail.com").await;
        let db = store.db();

        let recipe = RecipeService::create_recipe(db, user.id, sample("Stew")).await.unwrap();
        let tag = TagService::create_tag(db, user.id, "Hearty").await.unwrap();
        let carrot = IngredientService::create_ingredient(db, user.id, "carrot").await.unwrap();

        let (first, second) = tokio::join!(
            RecipeService::add_tag(db, user.id, recipe.recipe.id, tag.id),
            RecipeService::add_tag(db, user.id, recipe.recipe.id, tag.id),
        );
        assert!(first.is_ok() && second.is_ok());

        let (first, second) = tokio::join!(
            RecipeService::add_ingredient(db, user.id, recipe.recipe.id, carrot.id),
            RecipeService::add_ingredient(db, user.id, recipe.recipe.id, carrot.id),
        );
        assert!(first.is_ok() && second.is_ok());

        let tag_links = RecipeTag::find()
            .filter(recipe_tag::Column::RecipeId.eq(recipe.recipe.id))
            .count(db)
            .await
            .unwrap();
        let ingredient_links = RecipeIngredient::find()
            .filter(recipe_ingredient::Column::RecipeId.eq(recipe.recipe.id))
            .count(db)
            .await
            .unwrap();
        assert_eq!(tag_links, 1);
        assert_eq!(ingredient_links, 1);
    }

    #[tokio::test]
    async fn test_delete_recipe_is_owner_only() {
        let store = test_user_store().await;
        let user = create_test_user(&store, "test@gmail.com").await;
        let other = create_test_user(&store, "other@gmail.com").await;
        let db = store.db();

        let recipe = RecipeService::create_recipe(db, user.id, sample("Stew")).await.unwrap();

        let denied = RecipeService::delete_recipe(db, other.id, recipe.recipe.id).await;
        assert!(matches!(denied, Err(RecipeError::NotFound(_))));

        RecipeService::delete_recipe(db, user.id, recipe.recipe.id).await.unwrap();
        let gone = RecipeService::get_recipe(db, user.id, recipe.recipe.id).await;
        assert!(matches!(gone, Err(RecipeError::NotFound(_))));
    }
}
