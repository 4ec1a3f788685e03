mod settings;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use crossbeam_channel::Receiver;

use goldgesture_core::dialogue::domain::audio_player::DialogueEvent;
use goldgesture_core::dialogue::domain::cue::{Answer, Cue};
use goldgesture_core::dialogue::domain::dialogue_tree::DialogueTree;
use goldgesture_core::dialogue::domain::script::Script;
use goldgesture_core::dialogue::infrastructure::simulated_player::SimulatedPlayer;
use goldgesture_core::gesture::domain::gesture_event::GestureEvent;
use goldgesture_core::gesture::infrastructure::trace_replay::{Trace, TraceReplay};
use goldgesture_core::pipeline::game_session::GameSession;
use goldgesture_core::pipeline::gesture_pipeline::GesturePipeline;

/// Hands-free twenty questions: nod for yes, shake for no.
#[derive(Parser)]
#[command(name = "goldgesture")]
struct Cli {
    /// Gesture settings file (defaults to the user config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the standard question script as JSON.
    Script {
        /// Write to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Play a round with typed answers instead of gestures.
    Play {
        /// Answers in order, e.g. `y,n,y`.
        #[arg(long, value_delimiter = ',', required = true)]
        answers: Vec<String>,

        /// Custom script file.
        #[arg(long)]
        script: Option<PathBuf>,

        /// Simulated length of each cue in milliseconds.
        #[arg(long, default_value = "0")]
        cue_ms: u64,
    },
    /// Run a recorded detection/tracking trace through a full session.
    Replay {
        /// Trace file (JSON).
        trace: PathBuf,

        /// Custom script file.
        #[arg(long)]
        script: Option<PathBuf>,

        /// Simulated length of each cue in milliseconds.
        #[arg(long, default_value = "0")]
        cue_ms: u64,

        /// Delay between frames in milliseconds.
        #[arg(long, default_value = "33")]
        frame_ms: u64,
    },
    /// Show the effective gesture settings.
    Config {
        /// Save the effective settings to the default location.
        #[arg(long)]
        write: bool,
    },
}

/// Upper bound on waiting for a single cue to finish.
const CUE_WAIT: Duration = Duration::from_secs(30);

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config_path = cli.config;

    match cli.command {
        Command::Script { output } => run_script(output.as_deref()),
        Command::Play {
            answers,
            script,
            cue_ms,
        } => {
            let answers = parse_answers(&answers)?;
            run_play(&answers, load_script(script.as_deref())?, cue_ms)?;
            Ok(())
        }
        Command::Replay {
            trace,
            script,
            cue_ms,
            frame_ms,
        } => run_replay(
            &trace,
            config_path.as_deref(),
            load_script(script.as_deref())?,
            cue_ms,
            frame_ms,
        ),
        Command::Config { write } => run_config(config_path.as_deref(), write),
    }
}

fn run_script(output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let json = Script::standard().to_json()?;
    match output {
        Some(path) => {
            fs::write(path, json)?;
            log::info!("Script written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Returns every cue played, in order.
fn run_play(
    answers: &[Answer],
    script: Script,
    cue_ms: u64,
) -> Result<Vec<Cue>, Box<dyn std::error::Error>> {
    let (tx, rx) = crossbeam_channel::unbounded();
    let player = SimulatedPlayer::new(Duration::from_millis(cue_ms));
    let mut tree = DialogueTree::new(script, Box::new(player), tx);
    let mut played = Vec::new();

    tree.start()?;
    announce(&mut played, tree.last_cue());

    for &answer in answers {
        wait_until_idle(&mut tree, &rx, &mut played)?;
        println!("  > {}", if answer == Answer::Yes { "yes" } else { "no" });
        match answer {
            Answer::Yes => tree.on_yes()?,
            Answer::No => tree.on_no()?,
        }
        announce(&mut played, tree.last_cue());
        if tree.last_cue().is_some_and(Cue::is_terminal) {
            break;
        }
    }

    // Let the final cue finish; a finished round loops back to the intro.
    if tree.is_busy() {
        tree.handle_event(rx.recv_timeout(CUE_WAIT)?)?;
        announce(&mut played, tree.last_cue());
    }
    tree.stop();
    Ok(played)
}

fn run_replay(
    trace_path: &Path,
    config_path: Option<&Path>,
    script: Script,
    cue_ms: u64,
    frame_ms: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = settings::load(config_path)?;
    let trace = Trace::load(trace_path)?;
    let (width, height) = (trace.width, trace.height);
    let frames: Vec<_> = trace.blank_frames().collect();
    let replay = TraceReplay::new(trace);

    let pipeline = GesturePipeline::new(
        Box::new(replay.clone()),
        Box::new(replay.clone()),
        Box::new(replay),
        width,
        height,
        config,
    )?;
    let player = SimulatedPlayer::new(Duration::from_millis(cue_ms));
    let mut session = GameSession::new(pipeline, script, Box::new(player));
    session.start();

    let total = frames.len();
    let mut answered = 0usize;
    for frame in frames {
        let index = frame.index();
        let event = session.process_frame(frame);
        if event != GestureEvent::None {
            let center = session
                .pipeline()
                .tracked_center()
                .map(|c| format!(" at ({:.1}, {:.1})", c.x, c.y))
                .unwrap_or_default();
            println!("frame {index:>5}: {event}{center}");
            answered += 1;
        }
        eprint!("\rReplaying frame {}/{total}", index + 1);
        std::thread::sleep(Duration::from_millis(frame_ms));
    }
    eprintln!();
    session.pump_events();

    let dialogue = session.dialogue();
    log::info!(
        "{answered} gestures in {total} frames; affiliation {}, last cue {}",
        dialogue.affiliation(),
        dialogue
            .last_cue()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "none".into())
    );
    session.stop();
    Ok(())
}

fn run_config(config_path: Option<&Path>, write: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = settings::load(config_path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    if write {
        let path = settings::default_config_path().ok_or("could not determine config directory")?;
        config.save(&path)?;
        log::info!("Settings written to {}", path.display());
    }
    Ok(())
}

fn load_script(path: Option<&Path>) -> Result<Script, Box<dyn std::error::Error>> {
    match path {
        Some(p) => Ok(Script::from_json(&fs::read_to_string(p)?)?),
        None => Ok(Script::standard()),
    }
}

fn parse_answers(raw: &[String]) -> Result<Vec<Answer>, String> {
    raw.iter()
        .map(|a| match a.trim().to_lowercase().as_str() {
            "y" | "yes" => Ok(Answer::Yes),
            "n" | "no" => Ok(Answer::No),
            other => Err(format!("invalid answer '{other}' (expected y/n)")),
        })
        .collect()
}

/// Applies completions until the tree is waiting for an answer.
fn wait_until_idle(
    tree: &mut DialogueTree,
    rx: &Receiver<DialogueEvent>,
    played: &mut Vec<Cue>,
) -> Result<(), Box<dyn std::error::Error>> {
    while tree.is_busy() {
        tree.handle_event(rx.recv_timeout(CUE_WAIT)?)?;
        if tree.is_busy() {
            announce(played, tree.last_cue());
        }
    }
    Ok(())
}

fn announce(played: &mut Vec<Cue>, cue: Option<Cue>) {
    if let Some(cue) = cue {
        println!("[{cue}]");
        played.push(cue);
    }
}
