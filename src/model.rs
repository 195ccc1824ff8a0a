use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use std::time::Instant;
use tracing::{error, info, trace, warn};

use tablescout::loader::{self, PendingLoad};
use tablescout::storage::JsonFileStore;
use tablescout::{
    Category, FavoritesRegistry, FilterState, Formation, QueryController, Row, ScoutError,
};

use crate::domain::{AppConfig, Message};
use crate::inputter::{InputResult, Inputter};

#[derive(Debug, PartialEq)]
pub enum Status {
    LOADING,
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    POPUP,
    CMDINPUT,
}

pub struct Model {
    config: AppConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    query: QueryController,
    pending: Option<PendingLoad>,
    selected_row: usize, // Row index inside the current page
    input: Inputter,
    editing_column: Option<String>,
    last_input: InputResult,
    clipboard: Option<Clipboard>,
    status_message: String,
    last_status_message_update: Instant,
}

impl Model {
    /// Restores favorites and starts loading the dataset in the background.
    pub fn init(config: &AppConfig) -> Self {
        let favorites =
            FavoritesRegistry::load(Box::new(JsonFileStore::new(&config.favorites_path)));

        let mut filters = FilterState::new(
            config.filterable_columns.iter().cloned(),
            config.category_column.clone(),
        );
        filters.formation = config.default_formation;
        filters.category = config.default_category;

        Self {
            config: config.clone(),
            status: Status::LOADING,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            query: QueryController::new(filters, config.page_size, favorites),
            pending: Some(loader::spawn_load(config.data_path.clone(), config.delimiter)),
            selected_row: 0,
            input: Inputter::default(),
            editing_column: None,
            last_input: InputResult::default(),
            clipboard: None,
            status_message: format!("Loading {} ...", config.data_path.display()),
            last_status_message_update: Instant::now(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn query(&self) -> &QueryController {
        &self.query
    }

    pub fn selected_row(&self) -> usize {
        self.selected_row
    }

    pub fn selected(&self) -> Option<&Row> {
        self.query.page_rows().get(self.selected_row).copied()
    }

    pub fn show_help(&self) -> bool {
        self.modus == Modus::POPUP
    }

    /// Column being edited and the current input, if a filter edit is active.
    pub fn active_input(&self) -> Option<(&str, &InputResult)> {
        self.editing_column
            .as_deref()
            .map(|column| (column, &self.last_input))
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn last_status_message_update(&self) -> Instant {
        self.last_status_message_update
    }

    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::CMDINPUT
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
    }

    fn poll_loader(&mut self) {
        let Some(result) = self.pending.as_ref().and_then(|p| p.poll()) else {
            return;
        };
        self.pending = None;
        match result {
            Ok(dataset) if dataset.is_empty() => {
                warn!("Dataset {} has no rows", self.config.data_path.display());
                self.set_status_message("No rows found, nothing to show.");
            }
            Ok(dataset) => {
                let nrows = dataset.len();
                self.query.set_dataset(dataset);
                self.status = Status::READY;
                self.selected_row = 0;
                self.set_status_message(format!(
                    "Loaded {nrows} rows, {} match the filters",
                    self.query.total_count()
                ));
            }
            // The loader already logged the failure. The view keeps showing the loading state.
            Err(e) => self.set_status_message(format!("Loading failed: {e}")),
        }
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), ScoutError> {
        self.poll_loader();

        if let Some(msg) = message {
            match self.modus {
                Modus::TABLE => match msg {
                    Message::Quit => self.quit(),
                    Message::Help => self.open_help(),
                    _ if self.status != Status::READY => {
                        trace!("Ignoring {msg:?} while loading");
                    }
                    Message::MoveUp => self.move_selection_up(),
                    Message::MoveDown => self.move_selection_down(),
                    Message::NextPage => self.navigate(QueryController::next_page),
                    Message::PrevPage => self.navigate(QueryController::previous_page),
                    Message::FirstPage => self.navigate(QueryController::first_page),
                    Message::LastPage => self.navigate(QueryController::last_page),
                    Message::ToggleFavorite => self.toggle_favorite(),
                    Message::EditFilter(idx) => self.enter_cmd_mode(idx),
                    Message::CycleFormation => {
                        let next = Formation::cycle(self.query.filter_state().formation);
                        self.query.set_formation(next);
                        self.after_filter_change();
                    }
                    Message::CycleCategory => {
                        let next = Category::cycle(self.query.filter_state().category);
                        self.query.set_category(next);
                        self.after_filter_change();
                    }
                    Message::ClearFilters => {
                        self.query.clear_filters();
                        self.after_filter_change();
                    }
                    Message::CopyRow => self.copy_row(),
                    Message::Exit | Message::RawKey(_) => (),
                },
                Modus::POPUP => match msg {
                    Message::Quit => self.quit(),
                    Message::Exit | Message::Help => self.close_help(),
                    _ => (),
                },
                Modus::CMDINPUT => match msg {
                    Message::Quit => self.quit(),
                    Message::RawKey(key) => self.raw_input(key),
                    _ => (),
                },
            }
        }
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    fn open_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
    }

    fn close_help(&mut self) {
        trace!("Close popup ...");
        self.modus = self.previous_modus;
        self.previous_modus = Modus::POPUP;
    }

    fn navigate(&mut self, step: fn(&mut QueryController)) {
        step(&mut self.query);
        self.selected_row = 0;
    }

    fn after_filter_change(&mut self) {
        self.selected_row = 0;
        let summary = self
            .query
            .filter_state()
            .describe()
            .unwrap_or_else(|| format!("{} results", self.query.total_count()));
        self.set_status_message(summary);
    }

    fn move_selection_up(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(1);
    }

    fn move_selection_down(&mut self) {
        let nrows = self.query.page_rows().len();
        if self.selected_row + 1 < nrows {
            self.selected_row += 1;
        }
    }

    fn toggle_favorite(&mut self) {
        let Some(row) = self.selected().cloned() else {
            self.set_status_message("No row selected");
            return;
        };
        let outcome = self.query.toggle_favorite(&row).map(|_| ());
        match outcome {
            Ok(()) if self.query.is_favorite(&row) => self.set_status_message("Added to favorites"),
            Ok(()) => self.set_status_message("Removed from favorites"),
            Err(e) => {
                error!("Persisting favorites failed: {e}");
                self.set_status_message(format!("Favorites not saved: {e}"));
            }
        }
    }

    fn enter_cmd_mode(&mut self, filter_idx: usize) {
        let Some(column) = self
            .query
            .filter_state()
            .text_filters()
            .get(filter_idx)
            .map(|f| f.column.clone())
        else {
            return;
        };
        trace!("Editing filter on {column} ...");
        let current = self
            .query
            .filter_state()
            .text_query(&column)
            .unwrap_or_default()
            .to_string();
        self.input.start(&current);
        self.last_input = self.input.get();
        self.editing_column = Some(column);
        self.previous_modus = self.modus;
        self.modus = Modus::CMDINPUT;
    }

    // Every keystroke re-filters so the table follows the typed text.
    fn raw_input(&mut self, key: KeyEvent) {
        let Some(column) = self.editing_column.clone() else {
            return;
        };
        let previous = self.last_input.input.clone();
        self.last_input = self.input.read(key);
        if self.last_input.input != previous {
            self.query.set_text_filter(&column, &self.last_input.input);
            self.after_filter_change();
        }
        if self.last_input.finished {
            self.editing_column = None;
            self.modus = self.previous_modus;
            self.previous_modus = Modus::CMDINPUT;
        }
    }

    fn wrap_cell_content(c: &str) -> String {
        let needs_escaping = c.contains('"');
        let needs_wrapping = c.chars().any(|c| c == ' ' || c == '\t' || c == ',');
        let mut out = String::from(c);

        if needs_escaping {
            out = out.replace('"', "\"\"");
        }
        if needs_wrapping || needs_escaping {
            out = format!("\"{out}\"");
        }
        out
    }

    fn row_as_csv(&self, row: &Row) -> String {
        self.query
            .columns()
            .iter()
            .map(|c| Model::wrap_cell_content(row.get(c).unwrap_or_default()))
            .collect::<Vec<String>>()
            .join(",")
    }

    fn copy_row(&mut self) {
        let Some(row) = self.selected().cloned() else {
            return;
        };
        let content = self.row_as_csv(&row);
        if self.clipboard.is_none() {
            match Clipboard::new() {
                Ok(cb) => self.clipboard = Some(cb),
                Err(e) => {
                    trace!("Clipboard unavailable: {:?}", e);
                    self.set_status_message("Clipboard unavailable");
                    return;
                }
            }
        }
        if let Some(cb) = self.clipboard.as_mut() {
            match cb.set_text(content) {
                Ok(_) => {
                    info!("Copied row to clipboard");
                    self.set_status_message("Copied row to clipboard");
                }
                Err(e) => {
                    trace!("Error copying to clipboard: {:?}", e);
                    self.set_status_message("Copy to clipboard failed");
                }
            }
        }
    }
}
