use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, DbErr, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
    sea_query::Query,
};
use tracing::info;

use crate::db::entities::{prelude::{RecipeTag, Tag}, recipe_tag, tag};
use crate::db::services::validation::clean_name;

#[derive(Debug, thiserror::Error)]
pub enum TagError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),
    #[error("Tag not found: {0}")]
    NotFound(i32),
    #[error("{0}")]
    InvalidName(String),
}

pub struct TagService;

impl TagService {
    /// Lists the user's tags in reverse alphabetical order (`ORDER BY name DESC`).
    ///
    /// With `assigned_only`, keeps tags referenced by at least one recipe. The
    /// filter is an `IN (subquery)` rather than a join, so a tag attached to
    /// several recipes is still returned once.
    pub async fn list_tags(
        db: &DbConn,
        user_id: i32,
        assigned_only: bool,
    ) -> Result<Vec<tag::Model>, TagError> {
        let mut query = Tag::find().filter(tag::Column::UserId.eq(user_id));

        if assigned_only {
            query = query.filter(
                tag::Column::Id.in_subquery(
                    Query::select()
                        .column(recipe_tag::Column::TagId)
                        .from(RecipeTag)
                        .to_owned(),
                ),
            );
        }

        Ok(query
            .order_by_desc(tag::Column::Name)
            .order_by_asc(tag::Column::Id)
            .all(db)
            .await?)
    }

    pub async fn create_tag(db: &DbConn, user_id: i32, name: &str) -> Result<tag::Model, TagError> {
        let name = clean_name(name, "name").map_err(TagError::InvalidName)?;

        let new_tag = tag::ActiveModel {
            user_id: Set(user_id),
            name: Set(name),
            ..Default::default()
        };
        let tag = new_tag.insert(db).await?;

        info!(user_id, tag_id = tag.id, "Created tag.");
        Ok(tag)
    }

    pub async fn get_tag(db: &DbConn, user_id: i32, tag_id: i32) -> Result<tag::Model, TagError> {
        Tag::find_by_id(tag_id)
            .filter(tag::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or(TagError::NotFound(tag_id))
    }

    pub async fn rename_tag(
        db: &DbConn,
        user_id: i32,
        tag_id: i32,
        name: &str,
    ) -> Result<tag::Model, TagError> {
        let name = clean_name(name, "name").map_err(TagError::InvalidName)?;
        let tag = Self::get_tag(db, user_id, tag_id).await?;

        let mut active_tag: tag::ActiveModel = tag.into();
        active_tag.name = Set(name);
        Ok(active_tag.update(db).await?)
    }

    /// Deletes the tag and detaches it from every recipe.
    pub async fn delete_tag(db: &DbConn, user_id: i32, tag_id: i32) -> Result<(), TagError> {
        let txn = db.begin().await?;

        let tag = Tag::find_by_id(tag_id)
            .filter(tag::Column::UserId.eq(user_id))
            .one(&txn)
            .await?
            .ok_or(TagError::NotFound(tag_id))?;

        RecipeTag::delete_many()
            .filter(recipe_tag::Column::TagId.eq(tag_id))
            .exec(&txn)
            .await?;
        tag.delete(&txn).await?;

        txn.commit().await?;
        info!(user_id, tag_id, "Deleted tag.");
        Ok(())
    }
}
