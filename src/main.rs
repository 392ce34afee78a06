mod app;
mod config;
mod meals;
mod session;
mod theme;
mod ui;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::App;
use config::AppConfig;
use meals::Row;
use session::{Outcome, Session};

#[derive(Parser, Debug)]
#[command(name = "mealweek")]
#[command(version = "0.1.0")]
#[command(about = "A terminal table for logging what you ate this week")]
struct Args {
    /// Initial rows as a JSON array instead of the stored week
    #[arg(long, value_name = "FILE")]
    rows: Option<PathBuf>,

    /// Print the submission as JSON instead of storing it
    #[arg(long)]
    emit: bool,

    /// Show the stored week as a markdown table
    #[arg(long)]
    show: bool,

    /// Print a one-line summary of the stored week
    #[arg(long)]
    summary: bool,

    /// Clear the stored week
    #[arg(long)]
    reset: bool,

    /// Override the store location
    #[arg(long, value_name = "FILE")]
    store: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let args = Args::parse();
    let config = AppConfig::load().unwrap_or_default();
    let store_path = match args.store.clone() {
        Some(path) => path,
        None => config.store_path()?,
    };

    // Handle CLI-only commands
    if args.reset {
        return reset_meals(store_path).await;
    }

    if args.show {
        return show_meals(store_path).await;
    }

    if args.summary {
        let session = Session::load(store_path).await?;
        println!("{}", meals::summarize_meals(&session.meals));
        return Ok(());
    }

    if args.emit {
        let rows = match &args.rows {
            Some(path) => meals::load_rows(path).await?,
            None => Session::load(store_path.clone()).await?.rows(),
        };
        let mut session = Session::forwarding(store_path);
        return match run_editor(rows, &config, &mut session)? {
            Outcome::Submitted(submission) => {
                println!("{}", serde_json::to_string(&submission)?);
                Ok(())
            }
            Outcome::Cancelled => std::process::exit(1),
        };
    }

    let mut session = Session::load(store_path).await?;
    let rows = match &args.rows {
        Some(path) => meals::load_rows(path).await?,
        None => session.rows(),
    };

    match run_editor(rows, &config, &mut session)? {
        Outcome::Submitted(_) => {
            session.save().await?;
            println!("### This week's meals are saved!\n{}", meals::format_meal_table(&session.meals));
            if config.notifications {
                if let Err(e) = notify("mealweek", "This week's meals are saved") {
                    tracing::warn!("Notification failed: {}", e);
                }
            }
        }
        Outcome::Cancelled => println!("Input cancelled."),
    }
    Ok(())
}

/// Log file under the data dir; the terminal belongs to the editor
fn log_path(data_dir: Option<PathBuf>) -> Option<PathBuf> {
    data_dir.map(|dir| dir.join("mealweek").join("mealweek.log"))
}

/// File logging, only opened when RUST_LOG asks for output
fn init_logging() {
    let file = if std::env::var_os("RUST_LOG").is_some() {
        log_path(dirs::data_dir()).and_then(|path| {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).ok()?;
            }
            std::fs::OpenOptions::new().create(true).append(true).open(path).ok()
        })
    } else {
        None
    };

    let writer = match file {
        Some(file) => BoxMakeWriter::new(Mutex::new(file)),
        None => BoxMakeWriter::new(io::sink),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

async fn show_meals(store_path: PathBuf) -> Result<()> {
    let session = Session::load(store_path).await?;
    if session.meals.is_empty() {
        println!("No meals logged yet. Run `mealweek` to fill in the week.");
    } else {
        println!("### Stored meals\n{}", meals::format_meal_table(&session.meals));
    }
    Ok(())
}

async fn reset_meals(store_path: PathBuf) -> Result<()> {
    let mut session = Session::load(store_path).await?;
    session.reset();
    session.save().await?;
    println!("Weekly meals cleared. Run `mealweek` to start over.");
    Ok(())
}

/// Run the table until the session receives cancel or submit
fn run_editor(rows: Vec<Row>, config: &AppConfig, session: &mut Session) -> Result<Outcome> {
    ui::init_theme(theme::Theme::from_config(&config.theme));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(rows, Duration::from_secs(config.timeout_secs));

    let result = run_app(&mut terminal, &mut app, session);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result?;
    Ok(session.take_outcome().unwrap_or(Outcome::Cancelled))
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    session: &mut Session,
) -> Result<()> {
    while !session.is_finished() {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key, session);
                }
            }
        }

        if !session.is_finished() {
            app.tick(session);
        }
    }
    tracing::debug!("Editor closed with {:?} (store {})", session.outcome(), session.path().display());
    Ok(())
}

fn notify(summary: &str, body: &str) -> Result<()> {
    notify_rust::Notification::new()
        .summary(summary)
        .body(body)
        .icon("accessories-text-editor")
        .show()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_stays_off_the_terminal() {
        let path = log_path(Some(PathBuf::from("/home/me/.local/share"))).unwrap();
        assert_eq!(path, PathBuf::from("/home/me/.local/share/mealweek/mealweek.log"));
        assert!(log_path(None).is_none());
    }
}
