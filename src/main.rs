//! Humanize CLI - dry-run entry point
//!
//! Runs an action script against an in-memory driver on virtual time and
//! prints what a real device would have received.
//!
//! Usage: `humanize [actions.json] [settings.json]`

use std::env;
use std::fs;
use std::process;
use std::sync::Arc;

use humanize_engine::input::DeviceEvent;
use humanize_engine::{Action, Clock, ManualClock, MouseButton, RecordingDriver, Settings, TaskType};

fn demo_script() -> Vec<Action> {
    vec![
        Action::Move { x: 640, y: 360, duration: None },
        Action::Click { x: Some(700), y: Some(420), button: MouseButton::Left, clicks: 1, interval: None, duration: None },
        Action::TypeText { text: "Withdraw 28 lobsters".to_string(), error_correction: true, context: None },
        Action::Hotkey { keys: "ctrl+s".to_string() },
        Action::Drag { x: 900, y: 500, button: MouseButton::Left, duration: None },
        Action::Think { duration: None },
    ]
}

fn read_file(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!("Failed to read {}: {}", path, e);
            process::exit(1);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    let actions = match args.get(1) {
        Some(path) => match serde_json::from_str::<Vec<Action>>(&read_file(path)) {
            Ok(actions) => actions,
            Err(e) => {
                eprintln!("Invalid action script {}: {}", path, e);
                process::exit(1);
            }
        },
        None => demo_script(),
    };

    let settings = match args.get(2) {
        Some(path) => match Settings::from_json_strict(&read_file(path)) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        },
        None => Settings::default(),
    };

    let clock = Arc::new(ManualClock::new());
    let mut orchestrator = settings.build(RecordingDriver::at(100, 100), clock.clone());

    log::info!("Running {} actions (dry run)", actions.len());
    let success = orchestrator.execute_sequence(actions, Some(TaskType::General));
    let stats = orchestrator.end_session();
    let driver = orchestrator.into_driver();

    let moves = driver.moves().len();
    let buttons = driver
        .events()
        .iter()
        .filter(|e| matches!(e, DeviceEvent::ButtonDown(_)))
        .count();
    let keys = driver.key_downs().len();

    println!("Sequence {}", if success { "completed" } else { "stopped early" });
    println!("  Simulated time: {:.2}s", clock.now_secs());
    println!("  Pointer moves:  {}", moves);
    println!("  Button presses: {}", buttons);
    println!("  Key presses:    {}", keys);
    println!("  Typed text:     {:?}", driver.read_back());
    println!();

    match serde_json::to_string_pretty(&stats) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize statistics: {}", e),
    }

    if !success {
        process::exit(2);
    }
}
