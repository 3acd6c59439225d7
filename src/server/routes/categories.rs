use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories, questions},
        Category, Page, PageParams,
    },
    server::{
        app::AppState,
        error::ResultExt,
        extractors::{ApiPath, ApiQuery},
    },
};

use super::{ApiResponse, CurrentCategory, QuestionsPage};

#[derive(Serialize)]
struct CategoriesBody {
    categories: Vec<Category>,
}

#[derive(Serialize)]
struct CategoryBody {
    category: Category,
}

async fn get_categories(State(pool): State<SqlitePool>) -> ApiResponse<Json<CategoriesBody>> {
    let categories = categories::get_all_categories(&pool).await.or_not_found()?;
    Ok(Json(CategoriesBody { categories }))
}

async fn category(
    State(pool): State<SqlitePool>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResponse<Json<CategoryBody>> {
    let category = categories::get_category(&pool, id).await.or_not_found()?;
    Ok(Json(CategoryBody { category }))
}

async fn category_questions(
    State(pool): State<SqlitePool>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResponse<Json<QuestionsPage>> {
    let page = Page::from(params);
    let category = categories::get_category(&pool, id).await.or_not_found()?;

    let questions = questions::get_questions_for_category(&pool, id, page)
        .await
        .or_not_found()?;
    let total_questions = questions::count_questions_for_category(&pool, id)
        .await
        .or_not_found()?;

    Ok(Json(QuestionsPage {
        questions,
        total_questions,
        categories: categories::get_all_categories(&pool).await.or_not_found()?,
        current_category: CurrentCategory::Selected(category),
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}", get(category))
        .route("/categories/{id}/questions", get(category_questions))
        .with_state(state)
}
