use anyhow::{Context, anyhow};
use clap::{Parser, ValueEnum};
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use sweeper_core::{
    Board, CellCount, Coord, Difficulty, GameConfig, GameSession, ManualScheduler,
};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use moves::Move;

mod moves;
mod render;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Preset {
    Beginner,
    Intermediate,
    Expert,
    Resume,
    Wall,
}

impl From<Preset> for Difficulty {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::Beginner => Difficulty::Beginner,
            Preset::Intermediate => Difficulty::Intermediate,
            Preset::Expert => Difficulty::Expert,
            Preset::Resume => Difficulty::Resume,
            Preset::Wall => Difficulty::Wall,
        }
    }
}

/// Plays a scripted minesweeper game and replays the win animation in the terminal.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Board preset, overridden by --config and the explicit size flags
    #[arg(short, long, value_enum)]
    preset: Option<Preset>,

    /// TOML file with `height`, `width` and `mines`
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    height: Option<Coord>,

    #[arg(long)]
    width: Option<Coord>,

    #[arg(long)]
    mines: Option<CellCount>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Moves to play in order, e.g. `o4,4 f0,1 lose`
    #[arg(short, long, num_args = 1.., value_delimiter = ' ')]
    moves: Vec<Move>,

    /// Solve the board after the scripted moves
    #[arg(long)]
    auto_win: bool,

    /// Animation frames to run once the game is won
    #[arg(long, default_value_t = 0)]
    frames: u32,

    /// Frame rate of the animation
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Redraw the board after every animation step
    #[arg(short, long)]
    watch: bool,

    /// Print a JSON snapshot instead of the text board
    #[arg(long)]
    json: bool,
}

impl Args {
    fn game_config(&self) -> anyhow::Result<GameConfig> {
        let mut config: GameConfig = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Could not read config {}", path.display()))?;
                toml::from_str(&text)
                    .with_context(|| format!("Could not parse config {}", path.display()))?
            }
            None => self
                .preset
                .map(|preset| Difficulty::from(preset).config())
                .unwrap_or_default(),
        };

        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(mines) = self.mines {
            config.mines = mines;
        }
        Ok(config)
    }

    fn seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_nanos() as u64)
                .unwrap_or_default()
        })
    }
}

fn init_logging(verbose: &clap_verbosity_flag::Verbosity) -> anyhow::Result<()> {
    let level: LevelFilter = verbose.log_level_filter().as_str().parse()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.verbose)?;

    let config = args.game_config()?;
    let seed = args.seed();
    log::debug!("config: {:?}, seed: {}", config, seed);

    let dirty = Rc::new(Cell::new(false));
    let board = Board::new(config, seed)
        .context("Could not create board")?
        .with_listener({
            let dirty = dirty.clone();
            move || dirty.set(true)
        });

    let scheduler = Rc::new(ManualScheduler::new());
    let mut session = GameSession::new(board, scheduler.clone());

    for &step in &args.moves {
        let changed = match step {
            Move::Open(coords) => session.open(coords)?.has_update(),
            Move::Flag(coords) => session.flag(coords)?.has_update(),
            Move::Lose => {
                session.lose();
                true
            }
        };
        log::info!("{:?}: changed={}, status={:?}", step, changed, session.board().status());
    }

    if args.auto_win {
        let outcome = session.auto_win();
        log::info!("auto win: {:?}", outcome);
    }

    if args.frames > 0 && !session.is_animating() {
        log::warn!("Game is not won, no animation to run");
    }

    let frame_time = Duration::from_secs(1) / args.fps.max(1);
    for _ in 0..args.frames {
        if scheduler.run_frame() == 0 {
            break;
        }
        if args.watch && dirty.replace(false) {
            // clear screen and home the cursor
            print!("\x1b[2J\x1b[H{}", render::render(&session.board()));
        }
        std::thread::sleep(frame_time);
    }

    if args.json {
        let snapshot = session.board().snapshot();
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", render::render(&session.board()));
    }

    Ok(())
}
