mod ant;
mod board;
mod cleaner;
mod config;
mod rng;
mod surface;
mod world;

use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use rand::{SeedableRng, rngs::StdRng};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use config::Overrides;
use surface::PixelSurface;
use world::{RunState, World};

const DEFAULT_RESET_SECS: u64 = 90;
const POLL_TIMEOUT: Duration = Duration::from_millis(15);

struct Args {
    seed: Option<u64>,
    config_path: Option<PathBuf>,
    reset_time: Duration,
    debug: bool,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        seed: None,
        config_path: None,
        reset_time: Duration::from_secs(DEFAULT_RESET_SECS),
        debug: false,
    };
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                parsed.seed = args.get(i).and_then(|value| value.parse().ok());
            }
            "--config" => {
                i += 1;
                parsed.config_path = args.get(i).map(PathBuf::from);
            }
            "--reset-time" => {
                i += 1;
                if let Some(secs) = args.get(i).and_then(|value| value.parse().ok()) {
                    parsed.reset_time = Duration::from_secs(secs);
                }
            }
            "--debug" => parsed.debug = true,
            _ => {}
        }
        i += 1;
    }
    parsed
}

// Terminal columns are one pixel wide; half-block rendering fits two
// pixels into each row.
fn viewport_of(size: ratatui::layout::Size) -> (u32, u32) {
    (size.width as u32, size.height as u32 * 2)
}

fn render(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    surface: &PixelSurface,
    world: &World,
    debug: bool,
) -> io::Result<()> {
    terminal.draw(|f| {
        let canvas = Paragraph::new(surface.render_lines());
        f.render_widget(canvas, f.area());

        if debug {
            let mut lines: Vec<Line> = world
                .config()
                .summary()
                .into_iter()
                .map(|entry| Line::from(Span::styled(entry, Style::default().fg(Color::White))))
                .collect();
            lines.push(Line::from(Span::styled(
                format!("steps: {}", world.total_steps()),
                Style::default().fg(Color::White),
            )));
            if world.state() == RunState::Paused {
                lines.push(Line::from(Span::styled(
                    "paused",
                    Style::default().fg(Color::Yellow),
                )));
            }
            let height = (lines.len() as u16 + 2).min(f.area().height);
            let width = 28.min(f.area().width);
            let panel = Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" config ")
                    .style(Style::default().fg(Color::DarkGray)),
            );
            f.render_widget(panel, Rect::new(0, 0, width, height));
        }
    })?;
    Ok(())
}

fn main() -> io::Result<()> {
    let args = parse_args();
    let overrides = match &args.config_path {
        Some(path) => Overrides::load(path)?,
        None => Overrides::default(),
    };
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    terminal.hide_cursor()?;

    let mut last_size = terminal.size()?;
    let viewport = viewport_of(last_size);
    let mut surface = PixelSurface::new(viewport.0 as usize, viewport.1 as usize);
    let mut world = World::new(rng, overrides, viewport, args.reset_time);
    let mut debug = args.debug;

    let start = Instant::now();
    render(&mut terminal, &surface, &world, debug)?;

    loop {
        let size = terminal.size()?;
        if size != last_size {
            last_size = size;
            let viewport = viewport_of(size);
            surface = PixelSurface::new(viewport.0 as usize, viewport.1 as usize);
            world.resize(viewport);
        }

        let mut redraw = false;
        if event::poll(POLL_TIMEOUT)?
            && let Event::Key(key) = event::read()?
        {
            match key.code {
                KeyCode::Char('q') => break,
                KeyCode::Char('r') => world.begin_transition(),
                KeyCode::Char('d') => {
                    debug = !debug;
                    redraw = true;
                }
                KeyCode::Char(' ') => {
                    world.toggle_pause();
                    redraw = true;
                }
                _ => {}
            }
        }

        if world.tick(start.elapsed(), &mut surface) || redraw {
            render(&mut terminal, &surface, &world, debug)?;
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
