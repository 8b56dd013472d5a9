//! Multi-candidate evaluation and selection for optimized titles.

mod model;

pub use model::{
    combined_score, CandidateSet, ContentEvaluation, ContentInput, ContentRow, CriterionScore,
    RubricEvaluation, SelectedCandidate,
};

use crate::judge::{JudgeService, Rubric};
use crate::verdict::content::finalize_rubric;

/// Evaluate one candidate title: a title call then a description call, in order.
pub async fn evaluate_candidate(
    judge: &JudgeService,
    input: &ContentInput,
    title: &str,
) -> ContentEvaluation {
    let title_eval = finalize_rubric(Rubric::Title, judge.rate(Rubric::Title, input, title).await);
    let description_eval = finalize_rubric(
        Rubric::Description,
        judge.rate(Rubric::Description, input, title).await,
    );
    ContentEvaluation::new(title_eval, description_eval)
}

/// Strict maximum of the selection metric; ties keep the earliest candidate.
pub fn select_best<I>(scored: I) -> Option<(String, ContentEvaluation)>
where
    I: IntoIterator<Item = (String, ContentEvaluation)>,
{
    let mut best: Option<(String, ContentEvaluation)> = None;
    for (title, evaluation) in scored {
        let replace = match &best {
            None => true,
            Some((_, current)) => evaluation.selection_metric() > current.selection_metric(),
        };
        if replace {
            best = Some((title, evaluation));
        }
    }
    best
}

/// Evaluate every candidate sequentially and keep the best one.
pub async fn select(
    judge: &JudgeService,
    input: &ContentInput,
    candidates: &CandidateSet,
) -> Option<SelectedCandidate> {
    let mut scored = Vec::with_capacity(candidates.len());
    for (idx, title) in candidates.titles().iter().enumerate() {
        let evaluation = evaluate_candidate(judge, input, title).await;
        tracing::debug!(
            candidate = idx + 1,
            of = candidates.len(),
            metric = evaluation.selection_metric(),
            "candidate evaluated"
        );
        scored.push((title.clone(), evaluation));
    }
    let (title, evaluation) = select_best(scored)?;
    Some(SelectedCandidate {
        title,
        evaluation,
        candidates_count: candidates.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(title_score: u8, description_score: u8) -> ContentEvaluation {
        let mut t = RubricEvaluation::failed(Rubric::Title, "");
        t.error = None;
        t.overall_score = title_score;
        let mut d = RubricEvaluation::failed(Rubric::Description, "");
        d.error = None;
        d.overall_score = description_score;
        ContentEvaluation::new(t, d)
    }

    #[test]
    fn strict_maximum_wins() {
        let best = select_best(vec![
            ("A".to_string(), eval(1, 1)),
            ("B".to_string(), eval(2, 2)),
            ("C".to_string(), eval(2, 1)),
        ])
        .unwrap();
        assert_eq!(best.0, "B");
        assert_eq!(best.1.selection_metric(), 6);
    }

    #[test]
    fn ties_keep_first() {
        let best = select_best(vec![
            ("A".to_string(), eval(2, 1)),
            ("B".to_string(), eval(1, 2)),
        ])
        .unwrap();
        assert_eq!(best.0, "A");
    }

    #[test]
    fn all_zero_still_selects_first() {
        let best = select_best(vec![
            ("A".to_string(), eval(0, 0)),
            ("B".to_string(), eval(0, 0)),
        ])
        .unwrap();
        assert_eq!(best.0, "A");
        assert!(select_best(Vec::new()).is_none());
    }
}
