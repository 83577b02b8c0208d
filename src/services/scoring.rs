use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::models::domain::exam_session::{AnswerValue, QuestionStatus};
use crate::models::domain::exam_result::SubjectScore;
use crate::models::domain::question::QuestionType;
use crate::models::domain::{ExamConfig, ExamResult, ExamSession, Question};

pub struct ScoringEngine;

impl ScoringEngine {
    /// Grade a frozen session against the question bank.
    ///
    /// Questions deleted since the session started are skipped silently; a
    /// tolerated inconsistency, the subject totals simply shrink.
    pub fn score(
        session: &ExamSession,
        config: &ExamConfig,
        questions: &HashMap<String, Question>,
        submitted_at: DateTime<Utc>,
    ) -> ExamResult {
        let total_questions = session.questions.len();

        let attempted = session
            .question_status
            .values()
            .filter(|status| {
                matches!(
                    status,
                    QuestionStatus::Answered | QuestionStatus::MarkedAnswered
                )
            })
            .count();

        let mut correct = 0usize;
        let mut incorrect = 0usize;
        let mut total_score = 0f64;
        let mut subject_wise_score: HashMap<String, SubjectScore> = HashMap::new();

        for question_id in &session.questions {
            let Some(question) = questions.get(question_id) else {
                continue;
            };

            let subject = subject_wise_score
                .entry(question.subject.clone())
                .or_default();
            subject.total += 1;

            let Some(answer) = session.answers.get(question_id) else {
                continue;
            };
            subject.attempted += 1;

            if Self::is_correct(question, answer) {
                correct += 1;
                subject.correct += 1;
                total_score += Self::marks_for(config, question);
            } else {
                incorrect += 1;
                total_score -= Self::negative_marks_for(config, question);
            }
        }

        let score = total_score.max(0.0);
        let percentage = if total_questions > 0 {
            (correct as f64 / total_questions as f64) * 100.0
        } else {
            0.0
        };
        let time_taken_minutes = (submitted_at - session.start_time).num_minutes();

        ExamResult::new(
            &session.user_id,
            &session.id,
            total_questions,
            attempted,
            correct,
            incorrect,
            score,
            percentage,
            subject_wise_score,
            time_taken_minutes,
            submitted_at,
        )
    }

    fn is_correct(question: &Question, answer: &AnswerValue) -> bool {
        match question.question_type {
            QuestionType::Mcq => match answer {
                AnswerValue::Text(id) => question.correct_option_ids().contains(&id.as_str()),
                _ => false,
            },
            QuestionType::Msq => {
                let submitted: HashSet<&str> = answer.as_choice_set().into_iter().collect();
                let correct: HashSet<&str> = question.correct_option_ids().into_iter().collect();
                !correct.is_empty() && submitted == correct
            }
            QuestionType::Nat => Self::nat_matches(question, answer),
        }
    }

    /// Exact floating-point comparison of the parsed values, no tolerance.
    /// "40" and "40.0" agree after the parse; anything unparseable is
    /// simply incorrect.
    fn nat_matches(question: &Question, answer: &AnswerValue) -> bool {
        let submitted = answer.as_f64();
        let expected = question.correct_answer.as_ref().and_then(|c| c.as_f64());

        matches!((submitted, expected), (Some(s), Some(e)) if s == e)
    }

    fn marks_for(config: &ExamConfig, question: &Question) -> f64 {
        config
            .marking_for(question.question_type)
            .map(|m| m.marks)
            .unwrap_or(question.marks)
    }

    fn negative_marks_for(config: &ExamConfig, question: &Question) -> f64 {
        config
            .marking_for(question.question_type)
            .map(|m| m.negative_marks)
            .unwrap_or(question.negative_marks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::exam_config::TypeMarking;
    use crate::models::domain::question::QuestionOption;
    use chrono::Duration;

    fn option(id: &str, is_correct: bool) -> QuestionOption {
        QuestionOption {
            id: id.to_string(),
            text: format!("option {}", id),
            is_correct,
        }
    }

    fn question(
        id: &str,
        question_type: QuestionType,
        subject: &str,
        options: Vec<QuestionOption>,
        correct_answer: Option<AnswerValue>,
    ) -> Question {
        Question {
            id: id.to_string(),
            question_text: format!("question {}", id),
            question_type,
            subject: subject.to_string(),
            topic: "General".to_string(),
            difficulty: "medium".to_string(),
            marks: 1.0,
            negative_marks: 0.33,
            options,
            correct_answer,
            explanation: None,
            created_by: "admin".to_string(),
            created_at: Utc::now(),
            shared_with: None,
        }
    }

    fn config() -> ExamConfig {
        ExamConfig::new(
            "Mock",
            "",
            180,
            0,
            vec!["Math".into()],
            vec![],
            vec![],
            true,
            "admin",
        )
    }

    fn session_with(
        question_ids: Vec<&str>,
        answers: Vec<(&str, AnswerValue)>,
    ) -> ExamSession {
        let mut session = ExamSession::new(
            "user-1",
            "config-1",
            question_ids.iter().map(|s| s.to_string()).collect(),
        );
        for (qid, answer) in answers {
            session.answers.insert(qid.to_string(), answer);
            session
                .question_status
                .insert(qid.to_string(), QuestionStatus::Answered);
        }
        session
    }

    fn bank(questions: Vec<Question>) -> HashMap<String, Question> {
        questions.into_iter().map(|q| (q.id.clone(), q)).collect()
    }

    #[test]
    fn mcq_correct_option_scores_marks() {
        let q = question(
            "q1",
            QuestionType::Mcq,
            "Math",
            vec![option("a", false), option("b", true)],
            None,
        );
        let session = session_with(vec!["q1"], vec![("q1", AnswerValue::Text("b".into()))]);

        let result = ScoringEngine::score(&session, &config(), &bank(vec![q]), Utc::now());

        assert_eq!(result.correct, 1);
        assert_eq!(result.incorrect, 0);
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn mcq_wrong_option_deducts_negative_marks() {
        let q = question(
            "q1",
            QuestionType::Mcq,
            "Math",
            vec![option("a", false), option("b", true)],
            None,
        );
        let q2 = question(
            "q2",
            QuestionType::Mcq,
            "Math",
            vec![option("c", true), option("d", false)],
            None,
        );
        let session = session_with(
            vec!["q1", "q2"],
            vec![
                ("q1", AnswerValue::Text("a".into())),
                ("q2", AnswerValue::Text("c".into())),
            ],
        );

        let result = ScoringEngine::score(&session, &config(), &bank(vec![q, q2]), Utc::now());

        assert_eq!(result.correct, 1);
        assert_eq!(result.incorrect, 1);
        assert!((result.score - 0.67).abs() < 1e-9);
    }

    #[test]
    fn mcq_unattempted_contributes_zero() {
        let q = question(
            "q1",
            QuestionType::Mcq,
            "Math",
            vec![option("a", false), option("b", true)],
            None,
        );
        let session = session_with(vec!["q1"], vec![]);

        let result = ScoringEngine::score(&session, &config(), &bank(vec![q]), Utc::now());

        assert_eq!(result.correct, 0);
        assert_eq!(result.incorrect, 0);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn msq_requires_exact_set_match() {
        let make = || {
            question(
                "q1",
                QuestionType::Msq,
                "Math",
                vec![option("a", true), option("b", true), option("c", false)],
                None,
            )
        };

        // exact match
        let session = session_with(
            vec!["q1"],
            vec![("q1", AnswerValue::Choices(vec!["b".into(), "a".into()]))],
        );
        let result = ScoringEngine::score(&session, &config(), &bank(vec![make()]), Utc::now());
        assert_eq!(result.correct, 1);

        // missing member
        let session = session_with(
            vec!["q1"],
            vec![("q1", AnswerValue::Choices(vec!["a".into()]))],
        );
        let result = ScoringEngine::score(&session, &config(), &bank(vec![make()]), Utc::now());
        assert_eq!(result.correct, 0);
        assert_eq!(result.incorrect, 1);

        // extra member
        let session = session_with(
            vec!["q1"],
            vec![(
                "q1",
                AnswerValue::Choices(vec!["a".into(), "b".into(), "c".into()]),
            )],
        );
        let result = ScoringEngine::score(&session, &config(), &bank(vec![make()]), Utc::now());
        assert_eq!(result.correct, 0);
    }

    #[test]
    fn msq_scalar_answer_is_coerced_to_singleton_set() {
        let q = question(
            "q1",
            QuestionType::Msq,
            "Math",
            vec![option("a", true), option("b", false)],
            None,
        );
        let session = session_with(vec!["q1"], vec![("q1", AnswerValue::Text("a".into()))]);

        let result = ScoringEngine::score(&session, &config(), &bank(vec![q]), Utc::now());
        assert_eq!(result.correct, 1);
    }

    #[test]
    fn nat_parses_both_sides_numerically() {
        let make = || {
            question(
                "q1",
                QuestionType::Nat,
                "Math",
                vec![],
                Some(AnswerValue::Number(40.0)),
            )
        };

        let session = session_with(vec!["q1"], vec![("q1", AnswerValue::Text("40".into()))]);
        let result = ScoringEngine::score(&session, &config(), &bank(vec![make()]), Utc::now());
        assert_eq!(result.correct, 1);

        let session = session_with(vec!["q1"], vec![("q1", AnswerValue::Text("40.0".into()))]);
        let result = ScoringEngine::score(&session, &config(), &bank(vec![make()]), Utc::now());
        assert_eq!(result.correct, 1);

        // unparseable input never escapes as an error
        let session = session_with(vec!["q1"], vec![("q1", AnswerValue::Text("abc".into()))]);
        let result = ScoringEngine::score(&session, &config(), &bank(vec![make()]), Utc::now());
        assert_eq!(result.correct, 0);
        assert_eq!(result.incorrect, 1);
    }

    #[test]
    fn nat_stored_answer_may_be_text() {
        let q = question(
            "q1",
            QuestionType::Nat,
            "Math",
            vec![],
            Some(AnswerValue::Text("3.14".into())),
        );
        let session = session_with(vec!["q1"], vec![("q1", AnswerValue::Number(3.14))]);

        let result = ScoringEngine::score(&session, &config(), &bank(vec![q]), Utc::now());
        assert_eq!(result.correct, 1);
    }

    #[test]
    fn score_is_clamped_at_zero() {
        let questions: Vec<Question> = (0..5)
            .map(|i| {
                let mut q = question(
                    &format!("q{}", i),
                    QuestionType::Mcq,
                    "Math",
                    vec![option(&format!("a{}", i), true), option(&format!("b{}", i), false)],
                    None,
                );
                q.negative_marks = 2.0;
                q
            })
            .collect();

        let session = session_with(
            vec!["q0", "q1", "q2", "q3", "q4"],
            (0..5)
                .map(|i| {
                    // every answer wrong
                    (
                        ["q0", "q1", "q2", "q3", "q4"][i],
                        AnswerValue::Text(format!("b{}", i)),
                    )
                })
                .collect(),
        );

        let result = ScoringEngine::score(&session, &config(), &bank(questions), Utc::now());

        assert_eq!(result.incorrect, 5);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn percentage_uses_total_questions_not_attempted() {
        let q1 = question(
            "q1",
            QuestionType::Mcq,
            "Math",
            vec![option("a", true), option("b", false)],
            None,
        );
        let q2 = question(
            "q2",
            QuestionType::Mcq,
            "Math",
            vec![option("c", true), option("d", false)],
            None,
        );
        let q3 = question(
            "q3",
            QuestionType::Mcq,
            "Math",
            vec![option("e", true), option("f", false)],
            None,
        );
        let q4 = question(
            "q4",
            QuestionType::Mcq,
            "Math",
            vec![option("g", true), option("h", false)],
            None,
        );

        // one correct out of four total, only one attempted
        let session = session_with(
            vec!["q1", "q2", "q3", "q4"],
            vec![("q1", AnswerValue::Text("a".into()))],
        );

        let result =
            ScoringEngine::score(&session, &config(), &bank(vec![q1, q2, q3, q4]), Utc::now());

        assert_eq!(result.percentage, 25.0);
    }

    #[test]
    fn deleted_questions_are_skipped_silently() {
        let q1 = question(
            "q1",
            QuestionType::Mcq,
            "Math",
            vec![option("a", true), option("b", false)],
            None,
        );

        // q2 referenced by the session but gone from the bank
        let session = session_with(
            vec!["q1", "q2"],
            vec![
                ("q1", AnswerValue::Text("a".into())),
                ("q2", AnswerValue::Text("x".into())),
            ],
        );

        let result = ScoringEngine::score(&session, &config(), &bank(vec![q1]), Utc::now());

        assert_eq!(result.correct, 1);
        assert_eq!(result.incorrect, 0);
        assert_eq!(result.total_questions, 2);
        assert_eq!(result.subject_wise_score.get("Math").unwrap().total, 1);
    }

    #[test]
    fn subject_breakdown_counts_per_subject() {
        let q1 = question(
            "q1",
            QuestionType::Mcq,
            "Math",
            vec![option("a", true), option("b", false)],
            None,
        );
        let q2 = question(
            "q2",
            QuestionType::Mcq,
            "Physics",
            vec![option("c", true), option("d", false)],
            None,
        );
        let q3 = question(
            "q3",
            QuestionType::Mcq,
            "Physics",
            vec![option("e", true), option("f", false)],
            None,
        );

        let session = session_with(
            vec!["q1", "q2", "q3"],
            vec![
                ("q1", AnswerValue::Text("a".into())),
                ("q2", AnswerValue::Text("d".into())),
            ],
        );

        let result =
            ScoringEngine::score(&session, &config(), &bank(vec![q1, q2, q3]), Utc::now());

        let math = result.subject_wise_score.get("Math").unwrap();
        assert_eq!((math.correct, math.attempted, math.total), (1, 1, 1));

        let physics = result.subject_wise_score.get("Physics").unwrap();
        assert_eq!((physics.correct, physics.attempted, physics.total), (0, 1, 2));
    }

    #[test]
    fn config_type_marking_overrides_question_marks() {
        let q = question(
            "q1",
            QuestionType::Mcq,
            "Math",
            vec![option("a", true), option("b", false)],
            None,
        );

        let mut cfg = config();
        cfg.type_marking = vec![TypeMarking {
            question_type: QuestionType::Mcq,
            marks: 2.0,
            negative_marks: 0.66,
        }];

        let session = session_with(vec!["q1"], vec![("q1", AnswerValue::Text("a".into()))]);
        let result = ScoringEngine::score(&session, &cfg, &bank(vec![q]), Utc::now());

        assert_eq!(result.score, 2.0);
    }

    #[test]
    fn elapsed_time_is_whole_minutes() {
        let q = question(
            "q1",
            QuestionType::Mcq,
            "Math",
            vec![option("a", true), option("b", false)],
            None,
        );
        let mut session = session_with(vec!["q1"], vec![]);
        let submitted_at = Utc::now();
        session.start_time = submitted_at - Duration::seconds(150);

        let result = ScoringEngine::score(&session, &config(), &bank(vec![q]), submitted_at);

        assert_eq!(result.time_taken_minutes, 2);
    }

    #[test]
    fn attempted_counts_answered_and_marked_answered_statuses() {
        let q1 = question(
            "q1",
            QuestionType::Mcq,
            "Math",
            vec![option("a", true), option("b", false)],
            None,
        );
        let q2 = question(
            "q2",
            QuestionType::Mcq,
            "Math",
            vec![option("c", true), option("d", false)],
            None,
        );
        let q3 = question(
            "q3",
            QuestionType::Mcq,
            "Math",
            vec![option("e", true), option("f", false)],
            None,
        );

        let mut session = session_with(
            vec!["q1", "q2", "q3"],
            vec![
                ("q1", AnswerValue::Text("a".into())),
                ("q2", AnswerValue::Text("c".into())),
            ],
        );
        session
            .question_status
            .insert("q2".to_string(), QuestionStatus::MarkedAnswered);
        // marked-for-review without an answer does not count as attempted
        session
            .question_status
            .insert("q3".to_string(), QuestionStatus::Marked);

        let result =
            ScoringEngine::score(&session, &config(), &bank(vec![q1, q2, q3]), Utc::now());

        assert_eq!(result.attempted, 2);
    }
}
