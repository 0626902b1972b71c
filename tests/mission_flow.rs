use survival_drill::content::{BundledContent, SqliteContentRepository, StaticContent};
use survival_drill::data::{
    IncidentType, Location, LocationCatalog, MissionFilter, Scenario, ScenarioCatalog,
    ScenarioOption, Step,
};
use survival_drill::persistence::{
    ClassId, LeaderboardEntry, PlayerId, PlayerProfile, ScoreDb, ScoreRepository,
};
use survival_drill::simulation::{EngineEvent, FinishReason, NoticeKind, Phase};
use survival_drill::systems::{MISSION_COMPLETE_LINE, TRANSIT_LINE};
use survival_drill::{EngineConfig, Game, Pacing, PlayerIntent, Snapshot};

fn flood_towns() -> LocationCatalog {
    let town = |name: &str| Location {
        name: name.to_string(),
        incident_type: IncidentType::Flood,
        lat: 41.0,
        lng: 40.5,
        population: 100_000,
        risk_label: "High".to_string(),
    };
    LocationCatalog {
        schema_version: 1,
        locations: vec![town("Rize"), town("Trabzon"), town("Artvin")],
    }
}

fn step(question: &str, deltas: &[i32]) -> Step {
    Step {
        question: question.to_string(),
        options: deltas
            .iter()
            .enumerate()
            .map(|(idx, delta)| ScenarioOption {
                text: format!("{} option {}", question, idx + 1),
                risk_delta: *delta,
                feedback: format!("{} feedback {}", question, idx + 1),
            })
            .collect(),
    }
}

fn flood_drill(steps: Vec<Step>) -> StaticContent {
    StaticContent::new(
        vec![Scenario {
            id: IncidentType::Flood,
            title: "Flood Drill".to_string(),
            intro: "The river is rising.".to_string(),
            steps,
        }],
        MissionFilter::Only(IncidentType::Flood),
    )
}

fn game_with(content: &StaticContent) -> Game {
    let config = EngineConfig::default().with_seed(21);
    Game::new(config, content, &flood_towns()).unwrap()
}

fn select(game: &mut Game, name: &str) -> Snapshot {
    game.tick(vec![PlayerIntent::SelectLocation(name.to_string())])
}

/// Select, start and answer, then let every scheduled event fire.
fn play(game: &mut Game, name: &str, option: usize) -> Snapshot {
    select(game, name);
    game.tick(vec![PlayerIntent::Start, PlayerIntent::ChooseOption(option)]);
    game.settle()
}

fn notices(snap: &Snapshot) -> Vec<(NoticeKind, String)> {
    snap.events
        .iter()
        .filter_map(|event| match event {
            EngineEvent::Notice(notice) => Some((notice.kind, notice.message.clone())),
            _ => None,
        })
        .collect()
}

fn enrolled_store() -> (ScoreDb, ClassId, PlayerId) {
    let mut db = ScoreDb::open_in_memory().unwrap();
    let class_id = db.add_class("8-C").unwrap();
    let player = db.add_student(class_id, "Ece").unwrap();
    (db, class_id, player)
}

#[test]
fn mission_is_complete_only_when_every_eligible_location_is_done() {
    let content = flood_drill(vec![step("q", &[0, 30])]);
    let mut game = game_with(&content);

    let snap = play(&mut game, "Rize", 0);
    assert_eq!(snap.progress.completed, 1);
    assert_eq!(snap.phase, Phase::Intro);
    let first_next = snap.location.clone().unwrap();
    assert_ne!(first_next, "Rize");

    game.tick(vec![PlayerIntent::Start, PlayerIntent::ChooseOption(0)]);
    let snap = game.advance(600);
    assert_eq!(snap.progress.completed, 2);
    assert_eq!(snap.progress.total, 3);
    let snap = game.settle();
    assert_eq!(snap.phase, Phase::Intro);
    assert_ne!(snap.location.as_deref(), Some(first_next.as_str()));

    game.tick(vec![PlayerIntent::Start, PlayerIntent::ChooseOption(1)]);
    let snap = game.settle();
    assert_eq!(snap.progress.completed, 3);
    assert_eq!(snap.phase, Phase::Finished);
    assert_eq!(snap.finish, Some(FinishReason::MissionComplete));
    assert_eq!(
        snap.transcript.last().map(|l| l.text.as_str()),
        Some(MISSION_COMPLETE_LINE)
    );
}

#[test]
fn completed_location_cannot_be_replayed_within_a_cycle() {
    let content = flood_drill(vec![step("q", &[0, 30])]);
    let mut game = game_with(&content);
    play(&mut game, "Rize", 0);
    game.tick(vec![PlayerIntent::Restart]);

    let snap = select(&mut game, "Rize");
    assert_eq!(snap.phase, Phase::MapIdle);
    let found = notices(&snap);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].0, NoticeKind::InvalidAction);
    assert!(found[0].1.contains("already complete"));
}

#[test]
fn steps_rotate_with_mission_progress() {
    let content = flood_drill(vec![step("first", &[0]), step("second", &[0])]);
    let mut game = game_with(&content);

    let snap = select(&mut game, "Trabzon");
    assert_eq!(snap.active_step, Some(0));
    assert_eq!(snap.question.as_deref(), Some("first"));

    game.tick(vec![PlayerIntent::Start, PlayerIntent::ChooseOption(0)]);
    let snap = game.settle();
    assert_eq!(snap.active_step, Some(1));
    assert_eq!(snap.question.as_deref(), Some("second"));

    game.tick(vec![PlayerIntent::Start, PlayerIntent::ChooseOption(0)]);
    let snap = game.settle();
    assert_eq!(snap.active_step, Some(0));
    assert_eq!(snap.progress.completed, 2);

    game.tick(vec![PlayerIntent::Start, PlayerIntent::ChooseOption(0)]);
    let snap = game.settle();
    assert_eq!(snap.phase, Phase::Finished);

    let snap = game.tick(vec![PlayerIntent::Restart]);
    assert!(snap.completed.is_empty());
    let snap = select(&mut game, "Trabzon");
    assert_eq!(snap.active_step, Some(0));
}

#[test]
fn overshooting_choice_is_fatal_and_keeps_progress_on_restart() {
    let content = flood_drill(vec![step("q", &[40, 110])]);
    let mut game = game_with(&content);
    play(&mut game, "Rize", 0);
    game.tick(vec![PlayerIntent::Restart]);

    select(&mut game, "Artvin");
    let snap = game.tick(vec![PlayerIntent::Start, PlayerIntent::ChooseOption(1)]);
    assert_eq!(snap.risk.value(), 100);
    assert_eq!(snap.phase, Phase::Playing);
    assert!(snap.options.is_empty());

    let snap = game.settle();
    assert_eq!(snap.phase, Phase::Finished);
    assert_eq!(snap.finish, Some(FinishReason::Fatal));
    assert_eq!(snap.completed, vec!["Rize".to_string()]);

    let snap = game.tick(vec![PlayerIntent::Restart]);
    assert_eq!(snap.phase, Phase::MapIdle);
    assert_eq!(snap.completed, vec!["Rize".to_string()]);
    assert!(snap.location.is_none());
}

#[test]
fn transcript_is_sequenced_on_the_virtual_clock() {
    let content = flood_drill(vec![step("q", &[0, 30])]);
    let mut game = game_with(&content);
    select(&mut game, "Rize");
    let snap = game.tick(vec![PlayerIntent::Start, PlayerIntent::ChooseOption(1)]);
    assert_eq!(snap.transcript.len(), 4);
    assert_eq!(snap.risk.value(), 30);

    let snap = game.advance(600);
    let texts: Vec<_> = snap.transcript.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts[4], "q feedback 2");
    assert!(texts[5].starts_with("Wrong decision"));

    let snap = game.advance(999);
    assert_eq!(snap.transcript.len(), 6);
    let snap = game.advance(1);
    assert_eq!(snap.transcript.last().map(|l| l.text.as_str()), Some(TRANSIT_LINE));

    let snap = game.advance(3_000);
    assert_eq!(snap.phase, Phase::Intro);
    assert_eq!(snap.risk.value(), 0);
    assert_eq!(snap.transcript.len(), 3);
}

#[test]
fn zero_pacing_reaches_the_same_state() {
    let content = flood_drill(vec![step("q", &[0, 30])]);
    let paced = {
        let mut game = game_with(&content);
        play(&mut game, "Rize", 0)
    };
    let immediate = {
        let config = EngineConfig::default()
            .with_seed(21)
            .with_pacing(Pacing::immediate());
        let mut game = Game::new(config, &content, &flood_towns()).unwrap();
        select(&mut game, "Rize");
        game.tick(vec![PlayerIntent::Start, PlayerIntent::ChooseOption(0)])
    };
    assert_eq!(paced.location, immediate.location);
    assert_eq!(paced.completed, immediate.completed);
    assert_eq!(paced.transcript, immediate.transcript);
    assert_eq!(paced.phase, immediate.phase);
}

#[test]
fn scores_follow_each_click_and_reach_the_store() {
    let (db, _, player) = enrolled_store();
    let content = flood_drill(vec![step("q", &[0, 30, 110])]);
    let mut game = game_with(&content).with_scores(Box::new(db));
    game.login(player).unwrap();

    let snap = play(&mut game, "Rize", 0);
    assert_eq!(snap.score, Some(20));
    game.tick(vec![PlayerIntent::Start, PlayerIntent::ChooseOption(1)]);
    let snap = game.settle();
    assert_eq!(snap.score, Some(10));
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, EngineEvent::ScoreChanged { score: 10, delta: -10 })));

    game.tick(vec![PlayerIntent::Start, PlayerIntent::ChooseOption(2)]);
    let snap = game.settle();
    assert_eq!(snap.finish, Some(FinishReason::Fatal));
    assert_eq!(snap.score, Some(0));

    let board = game.leaderboard().unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].name, "Ece");
    assert_eq!(board[0].score, 0);
}

struct ReadOnlyScores {
    profile: PlayerProfile,
}

impl ScoreRepository for ReadOnlyScores {
    fn get_score(&self, _player: PlayerId) -> Result<i64, Box<dyn std::error::Error>> {
        Ok(self.profile.score)
    }

    fn set_score(&mut self, _player: PlayerId, _score: i64) -> Result<(), Box<dyn std::error::Error>> {
        Err("database is read-only".into())
    }

    fn leaderboard(
        &self,
        _class_id: ClassId,
        _limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, Box<dyn std::error::Error>> {
        Ok(Vec::new())
    }

    fn player(&self, _player: PlayerId) -> Result<Option<PlayerProfile>, Box<dyn std::error::Error>> {
        Ok(Some(self.profile.clone()))
    }
}

#[test]
fn failed_score_write_is_a_notice_without_rollback() {
    let content = flood_drill(vec![step("q", &[0, 30])]);
    let store = ReadOnlyScores {
        profile: PlayerProfile {
            id: 9,
            name: "Ece".to_string(),
            class_id: 1,
            score: 100,
        },
    };
    let mut game = game_with(&content).with_scores(Box::new(store));
    game.login(9).unwrap();

    select(&mut game, "Rize");
    game.tick(vec![PlayerIntent::Start, PlayerIntent::ChooseOption(0)]);
    let snap = game.advance(600);
    assert_eq!(snap.score, Some(120));
    let found = notices(&snap);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].0, NoticeKind::Persistence);
    assert!(game.tracker().is_completed("Rize"));
}

#[test]
fn anonymous_play_still_progresses() {
    let content = flood_drill(vec![step("q", &[0])]);
    let mut game = game_with(&content);
    let snap = play(&mut game, "Artvin", 0);
    assert_eq!(snap.score, None);
    assert!(snap.completed.contains(&"Artvin".to_string()));
}

#[test]
fn content_store_drives_scenarios_and_filter() {
    let mut store = SqliteContentRepository::open_in_memory().unwrap();
    store
        .seed_from_catalog(&ScenarioCatalog::bundled().unwrap())
        .unwrap();
    store
        .set_active_mission(MissionFilter::Only(IncidentType::Wildfire))
        .unwrap();

    let mut game = Game::new(EngineConfig::default(), &store, &BundledContent).unwrap();
    let snap = select(&mut game, "Rize");
    assert!(notices(&snap)[0].1.contains("not part of the current mission"));

    let snap = game.tick(vec![PlayerIntent::Start]);
    assert_eq!(snap.phase, Phase::Intro);
    assert_eq!(snap.incident, Some(IncidentType::Wildfire));
    assert_eq!(snap.progress.total, 3);
    assert_eq!(snap.mission_label, "Wildfire Response");
}

#[test]
fn colliding_location_names_refuse_the_session() {
    let mut catalog = flood_towns();
    catalog.locations.push(catalog.locations[0].clone());
    let content = flood_drill(vec![step("q", &[0])]);
    assert!(Game::new(EngineConfig::default(), &content, &catalog).is_err());
}
