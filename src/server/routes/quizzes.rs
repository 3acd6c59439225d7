use std::collections::HashSet;

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories, questions},
        DbError, DbResult, Question,
    },
    quiz::{self, Candidates, Draw},
    server::{app::AppState, error::ResultExt, extractors::ApiJson},
    telemetry::QUIZ_QUESTIONS_CNTR,
};

use super::ApiResponse;

#[derive(Deserialize)]
struct QuizRequest {
    #[serde(default)]
    previous_questions_ids: Vec<i64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    quiz_category_id: Option<i64>,
}

#[derive(Serialize)]
struct QuizResponse {
    question: QuizQuestion,
}

/// Either the next question or `false` once the category is used up.
#[derive(Serialize)]
#[serde(untagged)]
enum QuizQuestion {
    Next(Question),
    Finished(bool),
}

async fn load_candidates(pool: &SqlitePool, category_id: Option<i64>) -> DbResult<Candidates> {
    if let Some(id) = category_id {
        match categories::get_category(pool, id).await {
            Ok(category) => {
                let question_ids = questions::get_question_ids_for_category(pool, category.id).await?;
                return Ok(Candidates::Category {
                    id: category.id,
                    question_ids,
                });
            }
            // unknown categories play across all of them
            Err(DbError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }
    }
    let pairs = questions::get_question_ids_by_category(pool).await?;
    Ok(Candidates::any(pairs))
}

async fn play_quiz(
    State(pool): State<SqlitePool>,
    ApiJson(request): ApiJson<QuizRequest>,
) -> ApiResponse<Json<QuizResponse>> {
    let previous: HashSet<i64> = request.previous_questions_ids.into_iter().collect();
    let candidates = load_candidates(&pool, request.quiz_category_id)
        .await
        .or_unprocessable()?;

    let draw = quiz::draw(&candidates, &previous, &mut rand::thread_rng()).or_unprocessable()?;

    let question = match draw {
        Draw::Exhausted => {
            tracing::info!(served = previous.len(), "Quiz category exhausted");
            QuizQuestion::Finished(false)
        }
        Draw::Question(id) => {
            let question = questions::get_question_by_id(&pool, id)
                .await
                .or_unprocessable()?;
            QUIZ_QUESTIONS_CNTR
                .with_label_values(&[candidates.mode()])
                .inc();
            QuizQuestion::Next(question)
        }
    };
    Ok(Json(QuizResponse { question }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(play_quiz))
        .with_state(state)
}
