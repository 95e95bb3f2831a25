// Planckrs Simulator CLI
// Feeds key transitions from a script or stdin through the layer dispatcher

use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;

use planckrs_core::{
    load_keymap_path, planck_default, render_active, render_layer, ChannelTone,
    DefaultLayerStore, DispatchResult, Dispatcher, FileStore, KeyAction, KeyPos, Keymap, LayerId,
    MemoryStore, NoTone, Settings, ToneCommand, ToneSink,
};

/// Planck keyboard layer simulator
#[derive(Parser, Debug)]
#[command(name = "planckrs")]
#[command(version)]
#[command(about = "Planck keyboard layer simulator", long_about = None)]
struct Args {
    /// Keymap TOML file (the built-in Planck keymap when omitted)
    #[arg(short, long, value_name = "KEYMAP")]
    keymap: Option<PathBuf>,

    /// Settings file (default: ~/.config/planckrs/settings.toml)
    #[arg(short, long, value_name = "SETTINGS")]
    settings: Option<PathBuf>,

    /// File standing in for the EEPROM default layer slot
    #[arg(short, long, value_name = "FILE")]
    eeprom: Option<PathBuf>,

    /// Read key events from a script instead of stdin
    #[arg(long, value_name = "SCRIPT")]
    script: Option<PathBuf>,

    /// Print a layer diagram and exit; "active" draws the boot state
    #[arg(long, value_name = "LAYER")]
    show: Option<String>,

    /// Validate the keymap and exit
    #[arg(long)]
    check_keymap: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// One line of simulator input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Press(KeyPos),
    Release(KeyPos),
    Tap(KeyPos),
    Show,
    Mask,
    Music,
}

type Board = Dispatcher<Box<dyn DefaultLayerStore>, Box<dyn ToneSink>>;

/// Parse a script line. Blank lines and `#` comments yield `None`.
fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.split('#').next().unwrap_or("").trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let pos = || -> Result<KeyPos> {
        rest.parse::<KeyPos>()
            .map_err(|e| anyhow!("'{}': {}", line, e))
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "press" | "p" => Command::Press(pos()?),
        "release" | "r" => Command::Release(pos()?),
        "tap" | "t" => Command::Tap(pos()?),
        "show" => Command::Show,
        "mask" => Command::Mask,
        "music" => Command::Music,
        other => bail!("unknown command '{}'", other),
    };
    Ok(Some(command))
}

/// Look a layer up by name or index
fn layer_arg(keymap: &Keymap, name: &str) -> Result<LayerId> {
    if let Some(id) = keymap.layer_by_name(name) {
        return Ok(id);
    }
    match name.parse::<u8>() {
        Ok(index) if keymap.contains_layer(LayerId(index)) => Ok(LayerId(index)),
        _ => bail!("no layer named '{}'", name),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_settings(args: &Args) -> Result<Settings> {
    match &args.settings {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("failed to load settings from {}", path.display())),
        None => Settings::load_default().context("failed to load default settings"),
    }
}

fn load_keymap(args: &Args, settings: &Settings) -> Result<Keymap> {
    match args.keymap.as_ref().or(settings.keymap_path.as_ref()) {
        Some(path) => load_keymap_path(path)
            .with_context(|| format!("failed to load keymap from {}", path.display())),
        None => planck_default().context("built-in keymap is invalid"),
    }
}

fn open_store(args: &Args, settings: &Settings) -> Box<dyn DefaultLayerStore> {
    let path = args
        .eeprom
        .clone()
        .or_else(|| settings.storage_path.clone())
        .or_else(FileStore::default_path);
    match path {
        Some(path) => {
            log::debug!("default layer stored in {}", path.display());
            Box::new(FileStore::new(path))
        }
        None => {
            log::warn!("no data directory, default layer will not survive a restart");
            Box::new(MemoryStore::new())
        }
    }
}

/// Start the tone player, or a silent sink when audio is off
fn open_tone(settings: &Settings) -> (Box<dyn ToneSink>, Option<JoinHandle<()>>) {
    if !settings.audio_enabled {
        return (Box::new(NoTone), None);
    }

    let (sink, receiver) = ChannelTone::new(settings.queue_depth);
    let player = thread::spawn(move || play_songs(receiver));
    (Box::new(sink), Some(player))
}

fn play_songs(receiver: Receiver<ToneCommand>) {
    for command in receiver {
        match command {
            ToneCommand::Play(song) => log::info!("tone: {}", song),
            ToneCommand::StopAll => log::info!("tone: stop"),
        }
    }
}

/// Deliver input lines on a channel so the loop can watch the running flag
fn spawn_reader(script: Option<&PathBuf>) -> Result<Receiver<(usize, String)>> {
    let (sender, receiver) = mpsc::channel();
    match script {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read script {}", path.display()))?;
            thread::spawn(move || {
                for (index, line) in content.lines().enumerate() {
                    if sender.send((index + 1, line.to_string())).is_err() {
                        break;
                    }
                }
            });
        }
        None => {
            thread::spawn(move || {
                let stdin = io::stdin();
                for (index, line) in stdin.lock().lines().enumerate() {
                    let Ok(line) = line else { break };
                    if sender.send((index + 1, line)).is_err() {
                        break;
                    }
                }
            });
        }
    }
    Ok(receiver)
}

fn report(board: &Board, pos: KeyPos, action: KeyAction, result: DispatchResult) {
    match result {
        DispatchResult::Forward(keycode) => println!("{} {} -> {}", pos, action, keycode),
        DispatchResult::Consumed => {
            println!("{} {} -> layers {}", pos, action, board.active_layer_mask())
        }
    }
}

fn execute(board: &mut Board, command: Command) {
    match command {
        Command::Press(pos) => {
            let result = board.process(pos, KeyAction::Press);
            report(board, pos, KeyAction::Press, result);
        }
        Command::Release(pos) => {
            let result = board.process(pos, KeyAction::Release);
            report(board, pos, KeyAction::Release, result);
        }
        Command::Tap(pos) => {
            execute(board, Command::Press(pos));
            execute(board, Command::Release(pos));
        }
        Command::Show => print!("{}", render_active(board.keymap(), board.active_layer_mask())),
        Command::Mask => {
            let layers: Vec<String> = board
                .layer_state()
                .enabled_layers()
                .iter()
                .map(|id| board.keymap().layer_name(*id))
                .collect();
            println!("{} [{}]", board.active_layer_mask(), layers.join(", "));
        }
        Command::Music => board.music_mode_on(),
    }
}

fn run_loop(board: &mut Board, lines: &Receiver<(usize, String)>, running: &AtomicBool) {
    while running.load(Ordering::SeqCst) {
        match lines.recv_timeout(Duration::from_millis(100)) {
            Ok((number, line)) => match parse_command(&line) {
                Ok(Some(command)) => execute(board, command),
                Ok(None) => {}
                Err(e) => log::warn!("line {}: {}", number, e),
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

fn install_signal_handler(running: Arc<AtomicBool>) -> Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM]).context("failed to install signal handler")?;
    thread::spawn(move || {
        if let Some(signal) = signals.forever().next() {
            log::info!("received signal {}, shutting down", signal);
            running.store(false, Ordering::SeqCst);
        }
    });
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let settings = load_settings(&args)?;
    let keymap = load_keymap(&args, &settings)?;

    if args.check_keymap {
        println!(
            "Keymap is valid: {}x{} matrix, {} layers, default {}",
            keymap.rows(),
            keymap.cols(),
            keymap.layer_count(),
            keymap.layer_name(keymap.default_layer())
        );
        return Ok(());
    }

    let store = open_store(&args, &settings);

    if let Some(layer) = &args.show {
        if layer.eq_ignore_ascii_case("active") {
            let silent: Box<dyn ToneSink> = Box::new(NoTone);
            let board = Dispatcher::booted(keymap, store, silent);
            print!("{}", render_active(board.keymap(), board.active_layer_mask()));
        } else {
            let id = layer_arg(&keymap, layer)?;
            print!("{}", render_layer(&keymap, id));
        }
        return Ok(());
    }

    let running = Arc::new(AtomicBool::new(true));
    install_signal_handler(running.clone())?;

    let (tone, player) = open_tone(&settings);
    let mut board: Board = Dispatcher::booted(keymap, store, tone);
    let lines = spawn_reader(args.script.as_ref())?;

    run_loop(&mut board, &lines, &running);

    board.shutdown();
    drop(board);
    if let Some(player) = player {
        if player.join().is_err() {
            log::warn!("tone player panicked");
        }
    }
    Ok(())
}
