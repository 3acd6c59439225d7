mod categories;
mod questions;
mod quizzes;

use serde::Serialize;

use crate::db::{Category, Question};

use super::error::ApiError;

pub use categories::category_router;
pub use questions::questions_router;
pub use quizzes::quizzes_router;

pub type ApiResponse<T> = Result<T, ApiError>;

/// Body of every paginated question listing.
#[derive(Serialize)]
pub struct QuestionsPage {
    pub questions: Vec<Question>,
    pub total_questions: i64,
    pub categories: Vec<Category>,
    pub current_category: CurrentCategory,
}

/// The category a listing is scoped to, or `""` when it spans all of them.
#[derive(Serialize)]
#[serde(untagged)]
pub enum CurrentCategory {
    Selected(Category),
    All(&'static str),
}

impl CurrentCategory {
    pub fn all() -> Self {
        CurrentCategory::All("")
    }
}
