//! Quiz question selection.
//!
//! The quiz is stateless on the server: the client sends back the ids it has
//! already been served, and every draw is taken from the questions outside
//! that list.

use std::collections::{BTreeMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;

/// Questions a draw can be made from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidates {
    /// The client asked for this category.
    Category { id: i64, question_ids: Vec<i64> },
    /// No (known) category was asked for. Question ids keyed by category id.
    Any(BTreeMap<i64, Vec<i64>>),
}

impl Candidates {
    pub fn any(pairs: impl IntoIterator<Item = (i64, i64)>) -> Self {
        let mut by_category: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
        for (category_id, question_id) in pairs {
            by_category.entry(category_id).or_default().push(question_id);
        }
        Self::Any(by_category)
    }

    pub fn mode(&self) -> &'static str {
        match self {
            Self::Category { .. } => "category",
            Self::Any(_) => "any",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Draw {
    Question(i64),
    /// Every question of the requested category has been served.
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuizError {
    #[error("category {0} has no questions")]
    EmptyCategory(i64),

    #[error("no category has an unseen question left")]
    NothingSelectable,
}

pub fn draw<R: Rng + ?Sized>(
    candidates: &Candidates,
    previous: &HashSet<i64>,
    rng: &mut R,
) -> Result<Draw, QuizError> {
    match candidates {
        Candidates::Category { id, question_ids } => {
            if question_ids.is_empty() {
                return Err(QuizError::EmptyCategory(*id));
            }
            let unseen = unseen(question_ids, previous);
            Ok(unseen
                .choose(rng)
                .map_or(Draw::Exhausted, |id| Draw::Question(*id)))
        }
        Candidates::Any(by_category) => {
            // categories are picked first so each one is equally likely,
            // however many questions it holds
            let open: Vec<Vec<i64>> = by_category
                .values()
                .map(|ids| unseen(ids, previous))
                .filter(|ids| !ids.is_empty())
                .collect();
            open.choose(rng)
                .and_then(|ids| ids.choose(rng))
                .map(|id| Draw::Question(*id))
                .ok_or(QuizError::NothingSelectable)
        }
    }
}

fn unseen(ids: &[i64], previous: &HashSet<i64>) -> Vec<i64> {
    ids.iter()
        .copied()
        .filter(|id| !previous.contains(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn category(ids: &[i64]) -> Candidates {
        Candidates::Category {
            id: 1,
            question_ids: ids.to_vec(),
        }
    }

    #[test]
    fn category_draws_never_repeat_until_exhausted() {
        let mut rng = StdRng::seed_from_u64(7);
        let candidates = category(&[3, 5, 8, 13]);
        let mut previous = HashSet::new();

        for _ in 0..4 {
            match draw(&candidates, &previous, &mut rng).unwrap() {
                Draw::Question(id) => assert!(previous.insert(id), "{id} served twice"),
                Draw::Exhausted => panic!("exhausted after {} draws", previous.len()),
            }
        }

        assert_eq!(
            draw(&candidates, &previous, &mut rng).unwrap(),
            Draw::Exhausted
        );
    }

    #[test]
    fn last_unseen_question_is_always_picked() {
        let mut rng = StdRng::seed_from_u64(1);
        let previous: HashSet<i64> = [3, 5, 13, 404].into();
        for _ in 0..20 {
            assert_eq!(
                draw(&category(&[3, 5, 8, 13]), &previous, &mut rng).unwrap(),
                Draw::Question(8)
            );
        }
    }

    #[test]
    fn empty_category_is_an_error() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            draw(&category(&[]), &HashSet::new(), &mut rng),
            Err(QuizError::EmptyCategory(1))
        );
    }

    #[test]
    fn any_mode_skips_exhausted_categories() {
        let mut rng = StdRng::seed_from_u64(42);
        let candidates = Candidates::any([(1, 10), (1, 11), (2, 20), (3, 30)]);
        let previous: HashSet<i64> = [10, 11, 30].into();

        for _ in 0..20 {
            assert_eq!(
                draw(&candidates, &previous, &mut rng).unwrap(),
                Draw::Question(20)
            );
        }
    }

    #[test]
    fn any_mode_without_unseen_questions_is_an_error() {
        let mut rng = StdRng::seed_from_u64(42);
        let candidates = Candidates::any([(1, 10), (2, 20)]);
        let previous: HashSet<i64> = [10, 20].into();

        assert_eq!(
            draw(&candidates, &previous, &mut rng),
            Err(QuizError::NothingSelectable)
        );
        assert_eq!(
            draw(&Candidates::any(Vec::new()), &HashSet::new(), &mut rng),
            Err(QuizError::NothingSelectable)
        );
    }

    #[test]
    fn grouping_keeps_questions_under_their_category() {
        let Candidates::Any(grouped) = Candidates::any([(2, 20), (1, 10), (2, 21)]) else {
            panic!("expected any-mode candidates");
        };
        assert_eq!(grouped[&1], vec![10]);
        assert_eq!(grouped[&2], vec![20, 21]);
    }
}
