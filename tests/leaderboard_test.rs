use color_connect::leaderboard::{
    format_date, provisional_rank, qualifies, top, FileLeaderboard, Leaderboard,
    LeaderboardError, MemoryLeaderboard, MAX_HIGH_SCORES, TOP_SCORES_TO_DISPLAY,
};

fn play_season(board: &mut dyn Leaderboard) {
    for (name, score) in [("ada", 420), ("bob", 90), ("cy", 1310), ("dee", 420)] {
        board.submit(name, score).unwrap();
    }
}

#[test]
fn both_stores_rank_the_same_way() {
    let mut memory = MemoryLeaderboard::default();
    let dir = std::env::temp_dir().join(format!("color-connect-it-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let mut file = FileLeaderboard::new(dir.join("scores.json"));

    play_season(&mut memory);
    play_season(&mut file);

    let a = memory.fetch().unwrap();
    let b = file.fetch().unwrap();
    let names = |l: &[color_connect::leaderboard::HighScoreEntry]| {
        l.iter().map(|e| e.name.clone()).collect::<Vec<_>>()
    };
    assert_eq!(names(&a), ["cy", "ada", "dee", "bob"]);
    assert_eq!(names(&a), names(&b));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn running_score_rank_and_final_qualification() {
    let mut board = MemoryLeaderboard::default();
    play_season(&mut board);
    let list = board.fetch().unwrap();

    assert_eq!(provisional_rank(&list, 0), None);
    assert_eq!(provisional_rank(&list, 50), Some(5));
    assert_eq!(provisional_rank(&list, 420), Some(2));
    assert_eq!(provisional_rank(&list, 2000), Some(1));
    assert!(qualifies(&list, 1));
    assert_eq!(top(&list).len(), TOP_SCORES_TO_DISPLAY);
}

#[test]
fn full_board_only_takes_better_scores() {
    let mut board = MemoryLeaderboard::default();
    for i in 0..MAX_HIGH_SCORES as u32 {
        board.submit("p", 100 + i).unwrap();
    }
    let list = board.fetch().unwrap();
    assert!(!qualifies(&list, 100));
    assert!(qualifies(&list, 101));

    let list = board.submit("new", 101).unwrap();
    assert_eq!(list.len(), MAX_HIGH_SCORES);
    assert_eq!(list.last().unwrap().score, 101);
    assert!(list.iter().all(|e| e.score > 100));
}

#[test]
fn rejected_submissions() {
    let mut board = MemoryLeaderboard::default();
    assert!(matches!(board.submit("", 10), Err(LeaderboardError::InvalidName)));
    assert!(matches!(board.submit("ada", 0), Err(LeaderboardError::InvalidScore)));
    assert!(board.fetch().unwrap().is_empty());
}

#[test]
fn dates_are_day_month_year() {
    assert_eq!(format_date(0), "01.01.1970");
    assert_eq!(format_date(11_016), "29.02.2000");
    assert_eq!(format_date(19_723), "01.01.2024");
}
