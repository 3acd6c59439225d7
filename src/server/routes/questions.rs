use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use serde_json::Value;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories, questions},
        NewQuestion, Page, PageParams, Question,
    },
    server::{
        app::AppState,
        error::{ApiError, ResultExt},
        extractors::{ApiJson, ApiPath, ApiQuery},
    },
    telemetry::QUESTION_CHANGES_CNTR,
};

use super::{ApiResponse, CurrentCategory, QuestionsPage};

/// The non-empty `search_term` of a POST /questions body. Numbers and
/// `true` are searched as text.
fn search_term(body: &Value) -> Option<String> {
    match body.get("search_term")? {
        Value::String(term) if !term.is_empty() => Some(term.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(true) => Some(true.to_string()),
        _ => None,
    }
}

/// Create fields of a POST /questions body without a search term.
#[derive(Deserialize)]
struct NewQuestionBody {
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    answer: Option<String>,
    // the front end posts select values as strings
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    difficulty: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    category_id: Option<i64>,
}

impl NewQuestionBody {
    fn into_new_question(self) -> Option<NewQuestion> {
        let question = self.question.filter(|text| !text.trim().is_empty())?;
        let answer = self.answer.filter(|text| !text.trim().is_empty())?;
        Some(NewQuestion {
            question,
            answer,
            difficulty: self.difficulty?,
            category_id: self.category_id?,
        })
    }
}

#[derive(Serialize)]
struct QuestionBody {
    question: Question,
}

#[derive(Serialize)]
struct CreatedBody {
    success_status: bool,
    new_question: Question,
    message: &'static str,
}

#[derive(Serialize)]
struct DeletedBody {
    success_status: bool,
    message: &'static str,
}

async fn list_questions(
    State(pool): State<SqlitePool>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResponse<Json<QuestionsPage>> {
    let page = Page::from(params);
    let questions = questions::get_questions(&pool, page).await.or_not_found()?;
    let total_questions = questions::count_questions(&pool).await.or_not_found()?;

    Ok(Json(QuestionsPage {
        questions,
        total_questions,
        categories: categories::get_all_categories(&pool).await.or_not_found()?,
        current_category: CurrentCategory::all(),
    }))
}

async fn post_questions(
    State(pool): State<SqlitePool>,
    ApiQuery(params): ApiQuery<PageParams>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResponse<Response> {
    if let Some(term) = search_term(&body) {
        let page = search(&pool, &term, Page::from(params)).await?;
        return Ok(Json(page).into_response());
    }

    let new_question = NewQuestionBody::deserialize(&body)
        .or_unprocessable()?
        .into_new_question()
        .ok_or(ApiError::Unprocessable)?;
    let created = create(&pool, &new_question).await?;
    Ok(Json(created).into_response())
}

async fn search(pool: &SqlitePool, term: &str, page: Page) -> ApiResponse<QuestionsPage> {
    let found = questions::search_questions(pool, term, page)
        .await
        .or_not_found()?;
    if found.total == 0 {
        tracing::info!(term, "Search matched no questions");
        return Err(ApiError::NotFound);
    }

    Ok(QuestionsPage {
        questions: found.items,
        total_questions: found.total,
        categories: categories::get_all_categories(pool).await.or_not_found()?,
        current_category: CurrentCategory::all(),
    })
}

async fn create(pool: &SqlitePool, new_question: &NewQuestion) -> ApiResponse<CreatedBody> {
    let created = questions::create_question(pool, new_question)
        .await
        .or_unprocessable()?;
    QUESTION_CHANGES_CNTR.with_label_values(&["create"]).inc();
    tracing::info!(
        id = created.id,
        category_id = created.category.id,
        "Question created"
    );

    Ok(CreatedBody {
        success_status: true,
        new_question: created,
        message: "addition operation has been done successfully",
    })
}

async fn question(
    State(pool): State<SqlitePool>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResponse<Json<QuestionBody>> {
    let question = questions::get_question_by_id(&pool, id)
        .await
        .or_not_found()?;
    Ok(Json(QuestionBody { question }))
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResponse<Json<DeletedBody>> {
    questions::get_question_by_id(&pool, id)
        .await
        .or_not_found()?;
    questions::delete_question(&pool, id)
        .await
        .or_unprocessable()?;
    QUESTION_CHANGES_CNTR.with_label_values(&["delete"]).inc();
    tracing::info!(id, "Question deleted");

    Ok(Json(DeletedBody {
        success_status: true,
        message: "deletion operation has been done successfully",
    }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(list_questions).post(post_questions))
        .route("/questions/{id}", get(question).delete(delete_question))
        .with_state(state)
}
