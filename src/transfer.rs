//! CSV import/export of the question bank. This is how categories get in.

use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::queries::categories::{get_all_categories, import_categories};
use crate::db::queries::questions::{get_all_questions, import_questions};
use crate::db::{Category, QuestionRecord};

const CATEGORIES_FILE: &str = "categories.csv";
const QUESTIONS_FILE: &str = "questions.csv";

fn write_to(path: &Path, data: Vec<impl Serialize>) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Cannot create {}", path.display()))?;
    let mut wtr = csv::Writer::from_writer(file);
    for line in data {
        wtr.serialize(line)?;
    }
    wtr.flush()?;
    Ok(())
}

fn read_from<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let file =
        std::fs::File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut out = Vec::new();
    for record in rdr.deserialize() {
        let record: T = record.with_context(|| format!("Bad record in {}", path.display()))?;
        out.push(record);
    }
    Ok(out)
}

pub async fn export_data(pool: &SqlitePool, dir: &Path) -> anyhow::Result<()> {
    let categories = get_all_categories(pool).await?;
    let questions = get_all_questions(pool).await?;
    if !dir.exists() {
        std::fs::create_dir_all(dir)?
    }
    tracing::info!(
        categories = categories.len(),
        questions = questions.len(),
        "Exporting to {}",
        dir.display()
    );
    write_to(&dir.join(CATEGORIES_FILE), categories)?;
    write_to(&dir.join(QUESTIONS_FILE), questions)?;
    Ok(())
}

/// Categories go first so every imported question has its category.
pub async fn import_data(pool: &SqlitePool, dir: &Path) -> anyhow::Result<()> {
    let categories: Vec<Category> = read_from(&dir.join(CATEGORIES_FILE))?;
    let questions: Vec<QuestionRecord> = read_from(&dir.join(QUESTIONS_FILE))?;
    tracing::info!(
        categories = categories.len(),
        questions = questions.len(),
        "Importing from {}",
        dir.display()
    );
    import_categories(pool, categories).await?;
    import_questions(pool, questions).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::queries::{categories::create_category, questions::create_question};
    use crate::db::{test_pool, NewQuestion};

    #[tokio::test]
    async fn exported_bank_imports_into_an_empty_database() {
        let source = test_pool().await;
        let category_id = create_category(&source, "Geography").await.unwrap();
        create_question(
            &source,
            &NewQuestion {
                question: "Which is the longest river, \"Nile\" or Amazon?".into(),
                answer: "Nile".into(),
                difficulty: 3,
                category_id,
            },
        )
        .await
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        export_data(&source, dir.path()).await.unwrap();

        let target = test_pool().await;
        import_data(&target, dir.path()).await.unwrap();

        assert_eq!(
            get_all_categories(&target).await.unwrap(),
            get_all_categories(&source).await.unwrap()
        );
        assert_eq!(
            get_all_questions(&target).await.unwrap(),
            get_all_questions(&source).await.unwrap()
        );
    }

    #[tokio::test]
    async fn questions_need_their_category() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CATEGORIES_FILE), "id,type\n").unwrap();
        std::fs::write(
            dir.path().join(QUESTIONS_FILE),
            "id,question,answer,difficulty,category_id\n1,Q,A,1,5\n",
        )
        .unwrap();

        let pool = test_pool().await;
        assert!(import_data(&pool, dir.path()).await.is_err());
        assert!(get_all_questions(&pool).await.unwrap().is_empty());
    }
}
