use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use survival_drill::content::{BundledContent, ContentRepository, LocationRepository, SqliteContentRepository};
use survival_drill::data::load_location_catalog;
use survival_drill::persistence::ScoreDb;
use survival_drill::simulation::{EngineEvent, Speaker};
use survival_drill::ui::render_content_dashboard;
use survival_drill::{EngineConfig, Game, PlayerIntent, Snapshot};

const COMMANDS: &str = "Commands: map | select <city> | start | choose <n> | restart | wait [ms] | settle | login <id> | logout | score | board | content | refresh | classes | class <name> | students <class_id> | student <class_id> <name> | quit";

struct Paths {
    config: Option<PathBuf>,
    content_db: Option<PathBuf>,
    locations: Option<PathBuf>,
    score_db: PathBuf,
    seed: Option<u64>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    println!("Initializing Survival Drill (Mission Console)...");
    let paths = parse_paths(env::args().collect());

    let mut config = match &paths.config {
        Some(path) => match EngineConfig::load(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Failed to load config: {}", err);
                std::process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };
    if let Some(seed) = paths.seed {
        config = config.with_seed(seed);
    }

    let content: Box<dyn ContentRepository> = match &paths.content_db {
        Some(path) => match SqliteContentRepository::open(path) {
            Ok(repo) => Box::new(repo),
            Err(err) => {
                eprintln!("Failed to open content DB ({}); using bundled scenarios", err);
                Box::new(BundledContent)
            }
        },
        None => Box::new(BundledContent),
    };
    let locations: Box<dyn LocationRepository> = match &paths.locations {
        Some(path) => match load_location_catalog(path) {
            Ok(catalog) => Box::new(catalog),
            Err(err) => {
                eprintln!("Failed to load locations: {}", err);
                std::process::exit(1);
            }
        },
        None => Box::new(BundledContent),
    };

    let mut game = match Game::new(config, content.as_ref(), locations.as_ref()) {
        Ok(game) => game,
        Err(err) => {
            eprintln!("Failed to start session: {}", err);
            std::process::exit(1);
        }
    };
    if let Some(parent) = paths.score_db.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            eprintln!("Failed to create {}: {}", parent.display(), err);
        }
    }
    match ScoreDb::open(&paths.score_db) {
        Ok(db) => game = game.with_scores(Box::new(db)),
        Err(err) => eprintln!("Score DB unavailable ({}); scores will not be saved", err),
    }
    // Separate connection for roster edits; the game owns the scoring one.
    let mut roster = ScoreDb::open(&paths.score_db).ok();

    print_map(&game.tick(Vec::new()));
    println!("{}", COMMANDS);
    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let cmd = parts.next().unwrap_or("").to_lowercase();
        let rest: Vec<&str> = parts.collect();

        match cmd.as_str() {
            "quit" | "exit" => break,
            "help" => println!("{}", COMMANDS),
            "map" => print_map(&game.tick(Vec::new())),
            "select" => {
                if rest.is_empty() {
                    println!("Usage: select <city>");
                    continue;
                }
                let snap = game.tick(vec![PlayerIntent::SelectLocation(rest.join(" "))]);
                print_events(&snap);
            }
            "start" => print_events(&game.tick(vec![PlayerIntent::Start])),
            "choose" => match rest.first().map(|raw| raw.parse::<usize>()) {
                Some(Ok(n)) if n >= 1 => {
                    print_events(&game.tick(vec![PlayerIntent::ChooseOption(n - 1)]));
                }
                _ => println!("Usage: choose <n> (1-based)"),
            },
            "restart" => print_events(&game.tick(vec![PlayerIntent::Restart])),
            "wait" => {
                let elapsed = match rest.first() {
                    Some(raw) => match raw.parse::<u64>() {
                        Ok(ms) => ms,
                        Err(_) => {
                            println!("Invalid duration: {}", raw);
                            continue;
                        }
                    },
                    None => game.config().pacing.feedback_delay_ms,
                };
                print_events(&game.advance(elapsed));
            }
            "settle" => print_events(&game.settle()),
            "login" => match rest.first().map(|raw| raw.parse::<i64>()) {
                Some(Ok(id)) => match game.login(id) {
                    Ok(profile) => println!(
                        "Welcome, {} (class {}). Score: {}",
                        profile.name, profile.class_id, profile.score
                    ),
                    Err(err) => println!("Login failed: {}", err),
                },
                _ => println!("Usage: login <student_id>"),
            },
            "logout" => match game.logout() {
                Some(profile) => println!("Goodbye, {}.", profile.name),
                None => println!("Nobody is logged in."),
            },
            "score" => match game.player() {
                Some(profile) => println!("{}: {} points", profile.name, profile.score),
                None => println!("Nobody is logged in."),
            },
            "board" => match game.leaderboard() {
                Ok(entries) if entries.is_empty() => println!("Leaderboard is empty."),
                Ok(entries) => {
                    for (rank, entry) in entries.iter().enumerate() {
                        println!("{:>2}. {:<20} {:>6}", rank + 1, entry.name, entry.score);
                    }
                }
                Err(err) => println!("Leaderboard unavailable: {}", err),
            },
            "content" => {
                print!("{}", render_content_dashboard(game.content(), game.tracker()));
            }
            "refresh" => {
                match game.refresh_content(content.as_ref(), locations.as_ref()) {
                    Ok(()) => print_map(&game.tick(Vec::new())),
                    Err(err) => println!("Refresh refused: {}", err),
                }
            }
            "classes" | "class" | "students" | "student" => match roster.as_mut() {
                Some(db) => handle_roster(db, cmd.as_str(), &rest),
                None => println!("Score DB unavailable."),
            },
            _ => println!("Unknown command. Type 'help' for the list."),
        }
    }
}

fn handle_roster(db: &mut ScoreDb, cmd: &str, rest: &[&str]) {
    match cmd {
        "classes" => match db.list_classes() {
            Ok(classes) if classes.is_empty() => println!("No classes yet."),
            Ok(classes) => {
                for class in classes {
                    println!("  {:>3}  {}", class.id, class.name);
                }
            }
            Err(err) => println!("Failed to list classes: {}", err),
        },
        "class" => match db.add_class(&rest.join(" ")) {
            Ok(id) => println!("Class created with id {}.", id),
            Err(err) => println!("Failed to create class: {}", err),
        },
        "students" => match rest.first().map(|raw| raw.parse::<i64>()) {
            Some(Ok(class_id)) => match db.list_students(class_id) {
                Ok(students) => {
                    for student in students {
                        println!("  {:>3}  {:<20} {:>6}", student.id, student.name, student.score);
                    }
                }
                Err(err) => println!("Failed to list students: {}", err),
            },
            _ => println!("Usage: students <class_id>"),
        },
        _ => match rest.split_first() {
            Some((raw, name)) => match raw.parse::<i64>() {
                Ok(class_id) => match db.add_student(class_id, &name.join(" ")) {
                    Ok(id) => println!("Student added with id {}.", id),
                    Err(err) => println!("Failed to add student: {}", err),
                },
                Err(_) => println!("Invalid class id: {}", raw),
            },
            None => println!("Usage: student <class_id> <name>"),
        },
    }
}

fn parse_paths(args: Vec<String>) -> Paths {
    let mut iter = args.iter();
    let mut paths = Paths {
        config: None,
        content_db: None,
        locations: None,
        score_db: PathBuf::from("./assets/db/scores.db"),
        seed: None,
    };
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => paths.config = iter.next().map(PathBuf::from),
            "--content-db" => paths.content_db = iter.next().map(PathBuf::from),
            "--locations" => paths.locations = iter.next().map(PathBuf::from),
            "--scores" => {
                if let Some(value) = iter.next() {
                    paths.score_db = PathBuf::from(value);
                }
            }
            "--seed" => paths.seed = iter.next().and_then(|value| value.parse().ok()),
            _ => {}
        }
    }
    paths
}

fn print_map(snap: &Snapshot) {
    println!("== {} ==", snap.mission_label);
    println!("{}", snap.briefing);
    println!(
        "Progress: {}/{}  Phase: {:?}",
        snap.progress.completed, snap.progress.total, snap.phase
    );
    if !snap.completed.is_empty() {
        println!("Completed: {}", snap.completed.join(", "));
    }
    print_events(snap);
}

fn print_events(snap: &Snapshot) {
    for event in &snap.events {
        match event {
            EngineEvent::TranscriptAppended(line) => match line.speaker {
                Speaker::Player => println!("  you> {}", line.text),
                Speaker::System => println!("  {}", line.text),
            },
            EngineEvent::StepOptionsAvailable(options) => {
                for (idx, option) in options.iter().enumerate() {
                    println!("    [{}] {}", idx + 1, option);
                }
            }
            EngineEvent::Notice(notice) => println!("! {}", notice.message),
            EngineEvent::ScoreChanged { score, delta } => {
                println!("  score {:+} -> {}", delta, score);
            }
            EngineEvent::MissionProgress { completed, total } => {
                println!("  mission progress {}/{}", completed, total);
            }
            EngineEvent::PhaseChanged(_) | EngineEvent::LocationSelected { .. } => {}
        }
    }
    if snap.location.is_some() {
        println!(
            "  [{} | risk {}% {} | t={}ms{}]",
            snap.location.as_deref().unwrap_or_default(),
            snap.risk.value(),
            snap.band.label(),
            snap.now_ms,
            match snap.score {
                Some(score) => format!(" | score {}", score),
                None => String::new(),
            }
        );
    }
}
