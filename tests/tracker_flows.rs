//! End-to-end flows across the tracker modules, persisted through redb.

use codexdb::{
    CodexDB, Config, EntryDraft, NewBook, NewExercise, NewGoldEntry, NewSet, NewStudySession,
    NewTransaction, NewWorkout, ReviewGrade, TransactionKind,
};
use tempfile::tempdir;

fn tx(amount: f64, date: &str, kind: TransactionKind, category: &str) -> NewTransaction {
    NewTransaction {
        amount,
        date: date.to_string(),
        kind,
        category_id: category.into(),
        note: String::new(),
    }
}

// ============================================================================
// Treasury
// ============================================================================

#[test]
fn test_month_of_finances() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("codex.db");

    let mut db = CodexDB::open(&path, Config::default()).unwrap();
    let _ = db.add_transaction(tx(20000.0, "2024-08-01", TransactionKind::Income, "cat7")).unwrap();
    let _ = db.add_transaction(tx(3500.0, "2024-08-03", TransactionKind::Expense, "cat1")).unwrap();
    let _ = db.add_transaction(tx(1500.0, "2024-08-20", TransactionKind::Expense, "cat1")).unwrap();
    let _ = db.add_transaction(tx(900.0, "2024-09-01", TransactionKind::Expense, "cat1")).unwrap();
    let _ = db.set_budget(&"cat1".into(), 4000.0).unwrap();
    let goal = db.add_goal("Hajj", 150000.0, Some("2026-05-01")).unwrap().value;
    let _ = db.contribute_to_goal(&goal, 5000.0).unwrap();
    db.close().unwrap();

    let db = CodexDB::open(&path, Config::default()).unwrap();

    let august = db.month_summary("2024-08");
    assert_eq!(august.count, 3);
    assert_eq!(august.income, 20000.0);
    assert_eq!(august.expense, 5000.0);
    assert_eq!(august.net(), 15000.0);

    let status = db.budget_status("2024-08");
    assert_eq!(status.len(), 1);
    assert_eq!(status[0].category, "🍖 Food & Feasts");
    assert_eq!(status[0].spent, 5000.0);
    assert!(status[0].is_over());

    let goal = &db.document().treasury.goals[0];
    assert_eq!(goal.saved, 5000.0);
    assert_eq!(goal.deadline.as_deref(), Some("2026-05-01"));
    db.close().unwrap();
}

#[test]
fn test_dangling_category_resolves_to_other() {
    let dir = tempdir().unwrap();
    let mut db = CodexDB::open(dir.path().join("codex.db"), Config::default()).unwrap();

    let _ = db
        .add_transaction(tx(50.0, "2024-08-05", TransactionKind::Expense, "deleted-long-ago"))
        .unwrap();
    let category = db.document().treasury.transactions[0].category_id.clone();

    assert_eq!(db.category_label(&category), "Other");
    let slices = db.expense_breakdown("2024-08");
    assert_eq!(slices.len(), 1);
    assert_eq!(slices[0].label, "Other");
    assert_eq!(slices[0].pct, 100.0);
    db.close().unwrap();
}

#[test]
fn test_gold_vault_valuation() {
    let dir = tempdir().unwrap();
    let mut db = CodexDB::open(dir.path().join("codex.db"), Config::default()).unwrap();

    let _ = db
        .add_gold_entry(NewGoldEntry {
            grams: 10.0,
            date: "2024-02-01".into(),
            price_per_gram: 3000.0,
            note: "21k ring".into(),
        })
        .unwrap();

    // No quote yet: value unknown
    assert!(db.gold_holdings().current_value.is_none());

    let _ = db.set_manual_gold_price(3500.0).unwrap();
    let holdings = db.gold_holdings();
    assert_eq!(holdings.total_grams, 10.0);
    assert_eq!(holdings.cost_basis, 30000.0);
    assert_eq!(holdings.gram_price, Some(3500.0));
    assert_eq!(holdings.gain(), Some(5000.0));
    db.close().unwrap();
}

// ============================================================================
// Habits and gym
// ============================================================================

#[test]
fn test_habit_streak_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("codex.db");

    let mut db = CodexDB::open(&path, Config::default()).unwrap();
    let habit = db.add_habit("Quran", "📖").unwrap().value;
    for day in ["2024-12-30", "2024-12-31", "2025-01-01"] {
        let _ = db.toggle_habit(&habit, day).unwrap();
    }
    db.close().unwrap();

    let db = CodexDB::open(&path, Config::default()).unwrap();
    assert_eq!(db.habit_streak(&habit, "2025-01-01"), 3);
    db.close().unwrap();
}

#[test]
fn test_workout_with_sets_persists() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("codex.db");

    let mut db = CodexDB::open(&path, Config::default()).unwrap();
    let session = db
        .log_workout(NewWorkout {
            date: "2024-06-10".into(),
            kind: "Legs".into(),
            duration: Some(45),
            notes: String::new(),
            exercises: vec![NewExercise {
                name: "Squat".into(),
                sets: vec![NewSet {
                    reps: 5,
                    weight: 100.0,
                    note: String::new(),
                }],
            }],
        })
        .unwrap()
        .value;
    db.close().unwrap();

    let db = CodexDB::open(&path, Config::default()).unwrap();
    let stored = &db.document().gym.sessions[0];
    assert_eq!(stored.id, session);
    assert_eq!(stored.volume(), 500.0);
    db.close().unwrap();
}

// ============================================================================
// Study and journal
// ============================================================================

#[test]
fn test_study_week() {
    let dir = tempdir().unwrap();
    let mut db = CodexDB::open(dir.path().join("codex.db"), Config::default()).unwrap();

    let math = db.add_subject("Math", "#2980b9", 2.0).unwrap().value;
    for (date, minutes) in [("2024-10-01", 50), ("2024-10-05", 40), ("2024-10-07", 30)] {
        let _ = db
            .log_study_session(NewStudySession {
                date: date.into(),
                subject_id: math.clone(),
                duration_min: minutes,
                topic: "Calculus".into(),
                notes: String::new(),
            })
            .unwrap();
    }

    let week = db.weekly_study_minutes("2024-10-07").unwrap();
    assert_eq!(week.len(), 1);
    assert_eq!(week[0].minutes, 120);
    assert_eq!(week[0].goal_minutes, 120);

    let book = db
        .add_book(NewBook {
            title: "Calculus".into(),
            author: "Spivak".into(),
            total_pages: 680,
            subject_id: Some(math.clone()),
        })
        .unwrap()
        .value;
    assert!(db.update_book_progress(&book, 680).unwrap().value);

    let card = db
        .add_review_item("Derivative of sin", Some(&math), "2024-10-01")
        .unwrap()
        .value;
    assert_eq!(db.due_reviews("2024-10-02").unwrap().len(), 1);
    let next = db
        .record_review(&card, ReviewGrade::Recalled, "2024-10-02")
        .unwrap()
        .value;
    assert_eq!(next, "2024-10-04");
    assert!(db.due_reviews("2024-10-03").unwrap().is_empty());

    db.close().unwrap();
}

#[test]
fn test_journal_search_after_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("codex.db");

    let mut db = CodexDB::open(&path, Config::default()).unwrap();
    let _ = db
        .write_entry(EntryDraft {
            date: "2024-11-02".into(),
            title: "Trip".into(),
            content: "Drove to Alexandria".into(),
            mood: "happy".into(),
            tags: codexdb::journal::parse_tags("travel, family"),
        })
        .unwrap();
    db.close().unwrap();

    let db = CodexDB::open(&path, Config::default()).unwrap();
    let found = db.search_entries("family");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Trip");
    db.close().unwrap();
}
