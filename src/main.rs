use std::num::NonZeroUsize;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

mod controller;
mod domain;
mod inputter;
mod logging;
mod model;
mod ui;

use controller::Controller;
use domain::{AppConfig, DEFAULT_DATA_PATH, DEFAULT_FAVORITES_PATH, expand_path, parse_formation};
use model::{Model, Status};
use tablescout::{Category, ScoutError};
use ui::TableUI;

/// Browse a delimited table with live filters, paging and persistent favorites.
#[derive(Parser, Debug)]
#[command(name = "tablescout", version, about)]
struct Args {
    /// Delimited text file to browse (header row required).
    #[arg(value_name = "FILE", default_value = DEFAULT_DATA_PATH)]
    data: String,

    /// JSON file favorites are persisted to.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_FAVORITES_PATH)]
    favorites: String,

    /// Rows per page.
    #[arg(long, default_value_t = NonZeroUsize::new(10).unwrap_or(NonZeroUsize::MIN))]
    page_size: NonZeroUsize,

    /// Field delimiter. Detected from the header line when omitted.
    #[arg(long)]
    delimiter: Option<char>,

    /// Formation selected at start, or `none`.
    #[arg(long, default_value = "FI")]
    formation: String,

    /// Category selected at start (C1, C2 or C3).
    #[arg(long)]
    category: Option<Category>,

    /// Widest a column is rendered.
    #[arg(long, default_value_t = 30)]
    max_column_width: usize,

    /// Milliseconds to wait for a key event per frame.
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Write logs to this file. Nothing is logged without it.
    #[arg(long, value_name = "PATH")]
    log_file: Option<String>,
}

impl Args {
    fn into_config(self) -> Result<AppConfig, ScoutError> {
        let delimiter = match self.delimiter {
            None => None,
            Some(c) if c.is_ascii() => Some(c as u8),
            Some(c) => {
                return Err(ScoutError::Config(format!(
                    "delimiter '{c}' must be a single byte character"
                )));
            }
        };
        Ok(AppConfig::default()
            .data_path(expand_path(&self.data)?)
            .favorites_path(expand_path(&self.favorites)?)
            .page_size(self.page_size)
            .delimiter(delimiter)
            .default_formation(parse_formation(&self.formation)?)
            .default_category(self.category)
            .max_column_width(self.max_column_width)
            .event_poll_time(self.poll_ms))
    }
}

fn main() -> ExitCode {
    let result = run();
    ratatui::restore();
    match result {
        Err(e) => {
            error!("Exiting with error: {e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run() -> Result<(), ScoutError> {
    let args = Args::parse();
    let log_file = args
        .log_file
        .as_deref()
        .map(expand_path)
        .transpose()?;
    logging::init_logging(&args.log_level, log_file.as_deref())?;

    let cfg = args.into_config()?;
    info!("Starting tablescout with {:?}", cfg);

    let mut model = Model::init(&cfg);
    let mut ui = TableUI::new();
    let controller = Controller::new(&cfg);

    let mut terminal = ratatui::init();

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Handle events and map to a Message
        let message = controller.handle_event(&model)?;
        model.update(message)?;
    }

    info!("Bye");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tablescout::Formation;

    #[test]
    fn cli_maps_into_config() {
        let args = Args::parse_from([
            "tablescout",
            "data.csv",
            "--favorites",
            "favs.json",
            "--page-size",
            "25",
            "--delimiter",
            ";",
            "--formation",
            "none",
            "--category",
            "c2",
        ]);
        let cfg = args.into_config().unwrap();
        assert_eq!(cfg.data_path, PathBuf::from("data.csv"));
        assert_eq!(cfg.page_size.get(), 25);
        assert_eq!(cfg.delimiter, Some(b';'));
        assert_eq!(cfg.default_formation, None);
        assert_eq!(cfg.default_category, Some(Category::C2));
    }

    #[test]
    fn cli_defaults() {
        let cfg = Args::parse_from(["tablescout"]).into_config().unwrap();
        assert_eq!(cfg.default_formation, Some(Formation::Fi));
        assert_eq!(cfg.page_size.get(), 10);
        assert!(Args::try_parse_from(["tablescout", "--page-size", "0"]).is_err());
    }

    #[test]
    fn rejects_multibyte_delimiter() {
        let args = Args::parse_from(["tablescout", "x.csv", "--delimiter", "é"]);
        assert!(args.into_config().is_err());
    }
}
