use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use crate::db::{Category, DbError, DbResult, Page, Paginated};

/// A question with its category embedded, as served by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub difficulty: i64,
    pub category: Category,
}

impl<'r> FromRow<'r, SqliteRow> for Question {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            question: row.try_get("question")?,
            answer: row.try_get("answer")?,
            difficulty: row.try_get("difficulty")?,
            category: Category {
                id: row.try_get("category_id")?,
                kind: row.try_get("category_type")?,
            },
        })
    }
}

/// Flat `questions` row, used for CSV import and export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct QuestionRecord {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub difficulty: i64,
    pub category_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    pub difficulty: i64,
    pub category_id: i64,
}

const SELECT_QUESTIONS: &str = r#"
SELECT questions.id, questions.question, questions.answer, questions.difficulty,
       questions.category_id, categories.type AS category_type
FROM questions
JOIN categories ON questions.category_id = categories.id
"#;

pub async fn get_question_by_id(pool: &SqlitePool, id: i64) -> DbResult<Question> {
    let sql = format!("{SELECT_QUESTIONS} WHERE questions.id = ?1");
    sqlx::query_as::<_, Question>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound {
            resource: "question",
            id,
        })
}

pub async fn get_questions(pool: &SqlitePool, page: Page) -> DbResult<Vec<Question>> {
    let sql = format!("{SELECT_QUESTIONS} ORDER BY questions.id LIMIT ?1 OFFSET ?2");
    let questions = sqlx::query_as::<_, Question>(&sql)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;
    Ok(questions)
}

pub async fn count_questions(pool: &SqlitePool) -> DbResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn get_questions_for_category(
    pool: &SqlitePool,
    category_id: i64,
    page: Page,
) -> DbResult<Vec<Question>> {
    let sql = format!(
        "{SELECT_QUESTIONS} WHERE questions.category_id = ?1 ORDER BY questions.id LIMIT ?2 OFFSET ?3"
    );
    let questions = sqlx::query_as::<_, Question>(&sql)
        .bind(category_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;
    Ok(questions)
}

pub async fn count_questions_for_category(pool: &SqlitePool, category_id: i64) -> DbResult<i64> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions WHERE category_id = ?1")
            .bind(category_id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Case-insensitive substring search over question text. Case folding is
/// Unicode-aware and regex metacharacters in `term` match literally.
pub async fn search_questions(
    pool: &SqlitePool,
    term: &str,
    page: Page,
) -> DbResult<Paginated<Question>> {
    let pattern = search_pattern(term);

    let sql = format!(
        "{SELECT_QUESTIONS} WHERE questions.question REGEXP ?1 ORDER BY questions.id LIMIT ?2 OFFSET ?3"
    );
    let items = sqlx::query_as::<_, Question>(&sql)
        .bind(&pattern)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

    let total =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions WHERE question REGEXP ?1")
            .bind(&pattern)
            .fetch_one(pool)
            .await?;

    Ok(Paginated { items, total })
}

fn search_pattern(term: &str) -> String {
    format!("(?i){}", regex::escape(term))
}

/// Inserts the question and reads it back with its category before the
/// transaction commits.
pub async fn create_question(pool: &SqlitePool, new: &NewQuestion) -> DbResult<Question> {
    let mut tx = pool.begin().await?;

    // the foreign key would reject it too, but this gives a typed error
    sqlx::query_scalar::<_, i64>("SELECT id FROM categories WHERE id = ?1")
        .bind(new.category_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound {
            resource: "category",
            id: new.category_id,
        })?;

    let id = sqlx::query(
        r#"
INSERT INTO questions (question, answer, difficulty, category_id) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&new.question)
    .bind(&new.answer)
    .bind(new.difficulty)
    .bind(new.category_id)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    let sql = format!("{SELECT_QUESTIONS} WHERE questions.id = ?1");
    let question = sqlx::query_as::<_, Question>(&sql)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(question)
}

pub async fn delete_question(pool: &SqlitePool, id: i64) -> DbResult<()> {
    let mut tx = pool.begin().await?;

    let deleted = sqlx::query(
        r#"
DELETE FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if deleted == 0 {
        return Err(DbError::NotFound {
            resource: "question",
            id,
        });
    }

    tx.commit().await?;
    Ok(())
}

pub async fn get_question_ids_for_category(
    pool: &SqlitePool,
    category_id: i64,
) -> DbResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM questions WHERE category_id = ?1 ORDER BY id",
    )
    .bind(category_id)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

/// `(category_id, question_id)` for every question.
pub async fn get_question_ids_by_category(pool: &SqlitePool) -> DbResult<Vec<(i64, i64)>> {
    let pairs = sqlx::query_as::<_, (i64, i64)>(
        "SELECT category_id, id FROM questions ORDER BY category_id, id",
    )
    .fetch_all(pool)
    .await?;
    Ok(pairs)
}

pub async fn get_all_questions(pool: &SqlitePool) -> DbResult<Vec<QuestionRecord>> {
    let questions = sqlx::query_as::<_, QuestionRecord>(
        r#"
SELECT id, question, answer, difficulty, category_id
FROM questions
ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(questions)
}

pub async fn import_questions(pool: &SqlitePool, questions: Vec<QuestionRecord>) -> DbResult<()> {
    let mut tx = pool.begin().await?;
    for question in questions {
        sqlx::query(
            r#"
INSERT INTO questions (id, question, answer, difficulty, category_id) VALUES (?1, ?2, ?3, ?4, ?5)
ON CONFLICT (id) DO UPDATE SET
    question = excluded.question,
    answer = excluded.answer,
    difficulty = excluded.difficulty,
    category_id = excluded.category_id
            "#,
        )
        .bind(question.id)
        .bind(&question.question)
        .bind(&question.answer)
        .bind(question.difficulty)
        .bind(question.category_id)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::queries::categories::create_category;
    use crate::db::test_pool;

    fn new_question(text: &str, category_id: i64) -> NewQuestion {
        NewQuestion {
            question: text.to_owned(),
            answer: "answer".to_owned(),
            difficulty: 2,
            category_id,
        }
    }

    #[test]
    fn search_pattern_escapes_metacharacters() {
        assert_eq!(search_pattern("title"), "(?i)title");
        assert_eq!(search_pattern("50%? (a.b)"), r"(?i)50%\? \(a\.b\)");
    }

    #[tokio::test]
    async fn created_question_embeds_category() {
        let pool = test_pool().await;
        let category_id = create_category(&pool, "History").await.unwrap();
        let created = create_question(&pool, &new_question("Who?", category_id))
            .await
            .unwrap();

        let question = get_question_by_id(&pool, created.id).await.unwrap();
        assert_eq!(question, created);
        assert_eq!(question.question, "Who?");
        assert_eq!(question.difficulty, 2);
        assert_eq!(
            question.category,
            Category {
                id: category_id,
                kind: "History".into()
            }
        );
    }

    #[tokio::test]
    async fn unknown_category_is_rejected() {
        let pool = test_pool().await;
        let err = create_question(&pool, &new_question("Who?", 99))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::NotFound {
                resource: "category",
                ..
            }
        ));
        assert_eq!(count_questions(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn pages_are_ordered_and_bounded() {
        let pool = test_pool().await;
        let category_id = create_category(&pool, "Art").await.unwrap();
        let mut ids = Vec::new();
        for n in 0..5 {
            let question = new_question(&format!("Question {n}"), category_id);
            ids.push(create_question(&pool, &question).await.unwrap().id);
        }

        let first = get_questions(&pool, Page::new(1, 2)).await.unwrap();
        let last = get_questions_for_category(&pool, category_id, Page::new(3, 2))
            .await
            .unwrap();
        let beyond = get_questions(&pool, Page::new(4, 2)).await.unwrap();

        assert_eq!(first.iter().map(|q| q.id).collect::<Vec<_>>(), ids[..2]);
        assert_eq!(last.iter().map(|q| q.id).collect::<Vec<_>>(), ids[4..]);
        assert!(beyond.is_empty());
        assert_eq!(
            count_questions_for_category(&pool, category_id).await.unwrap(),
            5
        );
    }

    #[tokio::test]
    async fn search_ignores_case_and_treats_wildcards_literally() {
        let pool = test_pool().await;
        let category_id = create_category(&pool, "Science").await.unwrap();
        create_question(&pool, &new_question("What is the Heaviest organ?", category_id))
            .await
            .unwrap();
        create_question(&pool, &new_question("Is 50% of 10 five?", category_id))
            .await
            .unwrap();

        let found = search_questions(&pool, "HEAVIEST", Page::default())
            .await
            .unwrap();
        assert_eq!(found.total, 1);
        assert_eq!(found.items[0].question, "What is the Heaviest organ?");

        let percent = search_questions(&pool, "50%", Page::default())
            .await
            .unwrap();
        assert_eq!(percent.total, 1);

        let nothing = search_questions(&pool, "_%", Page::default()).await.unwrap();
        assert_eq!(nothing.total, 0);
        assert!(nothing.items.is_empty());

        let dot = search_questions(&pool, "s.the", Page::default()).await.unwrap();
        assert_eq!(dot.total, 0);
    }

    #[tokio::test]
    async fn search_folds_non_ascii_case() {
        let pool = test_pool().await;
        let category_id = create_category(&pool, "Geography").await.unwrap();
        create_question(&pool, &new_question("Where is ÉCOLE Polytechnique?", category_id))
            .await
            .unwrap();
        create_question(&pool, &new_question("Wie heißt die Hauptstadt?", category_id))
            .await
            .unwrap();

        let found = search_questions(&pool, "école", Page::default())
            .await
            .unwrap();
        assert_eq!(found.total, 1);
        assert_eq!(found.items[0].question, "Where is ÉCOLE Polytechnique?");

        let accented = search_questions(&pool, "WIE HEIß", Page::default())
            .await
            .unwrap();
        assert_eq!(accented.total, 1);
    }

    #[tokio::test]
    async fn delete_removes_only_that_row() {
        let pool = test_pool().await;
        let category_id = create_category(&pool, "Sports").await.unwrap();
        let keep = create_question(&pool, &new_question("Keep", category_id))
            .await
            .unwrap()
            .id;
        let gone = create_question(&pool, &new_question("Gone", category_id))
            .await
            .unwrap()
            .id;

        delete_question(&pool, gone).await.unwrap();

        assert!(get_question_by_id(&pool, keep).await.is_ok());
        assert!(matches!(
            get_question_by_id(&pool, gone).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(
            delete_question(&pool, gone).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
