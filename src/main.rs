//! Deepcrawl - Entry Point
//!
//! Parses the command line, loads the dungeon config and either dumps the
//! generated dungeon or runs the terminal explorer.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use deepcrawl::render::Minimap;
use deepcrawl::ui::App;
use deepcrawl::{Dungeon, DungeonConfig, Game};

/// Target frames per second for the explorer loop
const TARGET_FPS: u64 = 60;
const FRAME_TIME: Duration = Duration::from_millis(1000 / TARGET_FPS);

/// Procedural dungeon generator and terminal explorer
#[derive(Parser, Debug)]
#[command(name = "deepcrawl")]
#[command(version, about = "Deepcrawl - Walk a procedural dungeon", long_about = None)]
struct Args {
    /// Generate from a fixed seed
    #[arg(long)]
    seed: Option<u64>,

    /// Load dungeon settings from a RON file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print a text map and summary, then exit
    #[arg(long)]
    dump: bool,

    /// Write the dungeon layout as JSON, then exit
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// Write the default settings as RON, then exit
    #[arg(long, value_name = "PATH")]
    write_default_config: Option<PathBuf>,
}

impl Args {
    /// Anything that runs without the terminal UI
    fn is_batch(&self) -> bool {
        self.dump || self.export.is_some() || self.write_default_config.is_some()
    }
}

fn init_logging(to_file: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    // Keep log lines off the screen while the TUI owns it
    if to_file {
        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open("deepcrawl.log")
        {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(_) => {
                builder.filter_level(log::LevelFilter::Off);
            }
        }
    }
    builder.init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(!args.is_batch());

    log::info!("Starting Deepcrawl v{}", env!("CARGO_PKG_VERSION"));

    if let Some(path) = &args.write_default_config {
        DungeonConfig::export_default(path)
            .with_context(|| format!("writing default config to {:?}", path))?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let mut config = DungeonConfig::load_or_default(args.config.as_deref()).context("loading config")?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    if args.dump || args.export.is_some() {
        let dungeon = Dungeon::new(&config).context("generating dungeon")?;
        if let Some(path) = &args.export {
            let json = serde_json::to_string_pretty(&dungeon.layout())?;
            fs::write(path, json).with_context(|| format!("writing layout to {:?}", path))?;
            println!("Wrote layout to {}", path.display());
        }
        if args.dump {
            dump(&dungeon);
        }
        return Ok(());
    }

    let mut game = Game::new(config).context("generating dungeon")?;
    run_tui(&mut game)
}

/// Print the whole dungeon as text
fn dump(dungeon: &Dungeon) {
    let stats = dungeon.stats();
    println!(
        "seed {}: {} rooms, {} corridors, {} doors, {} walls, depth {}",
        dungeon.seed().map_or_else(|| "-".into(), |s| s.to_string()),
        stats.rooms,
        stats.corridors,
        stats.doors,
        dungeon.walls().len(),
        stats.deepest
    );

    let grid = dungeon.grid();
    let Some(bounds) = grid.filled_bounds() else {
        return;
    };
    // Two cells per glyph keeps a full dungeon within a terminal
    let zoom = 2;
    let extent = bounds.end - bounds.start;
    let center = (bounds.start + bounds.end) / 2;
    let cols = (extent.x / zoom + 3) as u16;
    let rows = (extent.y / zoom + 3) as u16;
    let spawn = dungeon.transform().world_to_cell(dungeon.spawn_position());

    for line in Minimap::new(center, zoom, cols, rows).render_lines(grid, Some(spawn)) {
        println!("{}", line.trim_end());
    }
}

fn run_tui(game: &mut Game) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new();
    let result = run_loop(&mut terminal, &mut app, game);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        log::error!("Explorer exited with error: {}", e);
    }
    log::info!("Deepcrawl shut down cleanly");
    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    game: &mut Game,
) -> Result<()> {
    let mut last_frame = Instant::now();

    loop {
        let frame_start = Instant::now();
        let delta = frame_start.duration_since(last_frame);
        last_frame = frame_start;

        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                match app.handle_input(key, game) {
                    Ok(true) => return Ok(()),
                    Ok(false) => {}
                    Err(e) => log::warn!("Input handling error: {}", e),
                }
            }
        }

        game.update(delta, &app.frame_input(frame_start));

        terminal.draw(|frame| app.render(frame, game))?;

        let frame_time = frame_start.elapsed();
        if frame_time < FRAME_TIME {
            std::thread::sleep(FRAME_TIME - frame_time);
        }
    }
}
