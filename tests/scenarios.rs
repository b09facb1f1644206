//! End-to-end grading scenarios, the way the quiz and review endpoints drive the crate.

use chrono::{DateTime, Duration, TimeZone, Utc};

use flashquiz_scoring::logging;
use flashquiz_scoring::{
    AttemptInput, Difficulty, Grader, Outcome, RecallButton, ReviewState, ScoreCause,
    ScoringConfig, ScoringError,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 2, 8, 0, 0).unwrap()
}

#[test]
fn fresh_card_perfect_recall_twice() {
    logging::init_for_tests();
    let config = ScoringConfig::default();
    let grader = Grader::new(&config);

    let first = grader.review_flashcard(&ReviewState::new(1, 100), 5, now()).unwrap();
    assert_eq!(first.times_reviewed, 1);
    assert_eq!(first.next_review_at, Some(now() + Duration::days(1)));
    assert!(first.ease_factor > 2.5);

    let later = now() + Duration::days(1);
    let second = grader.review_flashcard(&first, 5, later).unwrap();
    assert_eq!(second.times_reviewed, 2);
    assert_eq!(second.next_review_at, Some(later + Duration::days(6)));
}

#[test]
fn fresh_card_poor_recall() {
    logging::init_for_tests();
    let config = ScoringConfig::default();
    let grader = Grader::new(&config);

    let next = grader.review_flashcard(&ReviewState::new(1, 100), 1, now()).unwrap();
    assert_eq!(next.times_reviewed, 1);
    assert_eq!(next.next_review_at, Some(now() + Duration::days(1)));
    assert!(next.ease_factor < 2.5);
}

#[test]
fn button_review_round_trip_through_json() {
    let config = ScoringConfig::default();
    let state = ReviewState::new(4, 8);
    let next = flashquiz_scoring::scheduler::grade_with_button(
        &config.scheduler,
        &state,
        "Good".parse::<RecallButton>().unwrap(),
        now(),
    )
    .unwrap();

    let stored = serde_json::to_string(&next).unwrap();
    let restored: ReviewState = serde_json::from_str(&stored).unwrap();
    assert_eq!(restored, next);
    assert!(!flashquiz_scoring::scheduler::is_due(&restored, now()));
}

#[test]
fn quiz_session_moves_category_score() {
    logging::init_for_tests();
    let config = ScoringConfig::default();
    let grader = Grader::new(&config);
    let mut score = grader.new_score(12, Some(3));

    let all_right: Vec<Outcome> = (1..=5).map(|d| Outcome::new(d, true).unwrap()).collect();
    let report = grader
        .grade_session(&mut score, &all_right, ScoreCause::QuizSession { session_id: 1 }, now())
        .unwrap();
    assert!(report.update.delta > 0);

    let all_wrong: Vec<Outcome> = (1..=5).map(|d| Outcome::new(d, false).unwrap()).collect();
    let before = score.rating;
    grader
        .grade_session(&mut score, &all_wrong, ScoreCause::QuizSession { session_id: 2 }, now())
        .unwrap();
    assert!(score.rating < before);
    assert_eq!(score.history.len(), 2);
    assert!(score.history.iter().all(|h| h.change != 0));
}

#[test]
fn per_attempt_strategy_selected_from_config() {
    let config = ScoringConfig::from_json_str(
        r#"{"rating": {"strategy": "per_attempt", "max_change": 10}}"#,
    )
    .unwrap();
    let grader = Grader::new(&config);
    let mut score = grader.new_score(1, None);

    let report = grader
        .grade_session(
            &mut score,
            &[Outcome::new(5, true).unwrap()],
            ScoreCause::QuizSession { session_id: 3 },
            now(),
        )
        .unwrap();
    assert_eq!(report.strategy, "per_attempt");
    assert_eq!(report.update.delta, 10);

    let (record, _) = grader
        .grade_attempt(
            &mut score,
            AttemptInput {
                question_id: 77,
                chosen_option: "D".to_string(),
                correct: false,
                difficulty: Difficulty::new(4).unwrap(),
            },
            now(),
        )
        .unwrap();
    assert_eq!(record.delta, -10);
    assert_eq!(record.rating_after, 1000);
}

#[test]
fn invalid_inputs_are_rejected() {
    let config = ScoringConfig::default();
    let grader = Grader::new(&config);

    assert!(matches!(Outcome::new(0, true), Err(ScoringError::InvalidDifficulty(0))));
    assert!(matches!(
        grader.review_flashcard(&ReviewState::new(1, 1), 9, now()),
        Err(ScoringError::InvalidQuality(9))
    ));

    let mut score = grader.new_score(1, None);
    score.rating = -5;
    let result = grader.grade_session(
        &mut score,
        &[Outcome::new(1, true).unwrap()],
        ScoreCause::QuizSession { session_id: 4 },
        now(),
    );
    assert!(matches!(result, Err(ScoringError::NegativeRating(-5))));
    assert!(score.history.is_empty());
}
