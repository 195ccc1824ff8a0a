use std::num::NonZeroUsize;
use std::path::PathBuf;

use derive_setters::Setters;
use ratatui::crossterm::event::KeyEvent;

use tablescout::predicate::{CATEGORY_COLUMN, FILTERABLE_COLUMNS};
use tablescout::query::DEFAULT_PAGE_SIZE;
use tablescout::{Category, FavoriteLabels, Formation, ScoutError};

pub const DEFAULT_DATA_PATH: &str = "./Liste_Destinations_2025.csv";
pub const DEFAULT_FAVORITES_PATH: &str = "~/.tablescout/favorites.json";

pub const HELP_TEXT: &str = "\
q            Quit
Up / Down    Select row
Left / Right Previous / next page (also PgUp / PgDn)
Home / End   First / last page
Space, f     Toggle favorite for the selected row
1 / 2 / 3    Edit text filter (Enter keeps, Esc reverts)
F            Cycle formation
C            Cycle category
x            Clear all filters
y            Copy selected row to clipboard
?            Show this help
Esc          Close popup";

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    ToggleFavorite,
    EditFilter(usize),
    CycleFormation,
    CycleCategory,
    ClearFilters,
    CopyRow,
    Help,
    Exit,
    RawKey(KeyEvent),
}

#[derive(Debug, Clone, Setters)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub favorites_path: PathBuf,
    pub page_size: NonZeroUsize,
    pub delimiter: Option<u8>,
    pub default_formation: Option<Formation>,
    pub default_category: Option<Category>,
    pub filterable_columns: Vec<String>,
    pub category_column: String,
    pub labels: FavoriteLabels,
    pub event_poll_time: u64,
    pub max_column_width: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            favorites_path: PathBuf::from(DEFAULT_FAVORITES_PATH),
            page_size: NonZeroUsize::new(DEFAULT_PAGE_SIZE).unwrap_or(NonZeroUsize::MIN),
            delimiter: None,
            default_formation: Some(Formation::Fi),
            default_category: None,
            filterable_columns: FILTERABLE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            category_column: CATEGORY_COLUMN.to_string(),
            labels: FavoriteLabels::default(),
            event_poll_time: 100,
            max_column_width: 30,
        }
    }
}

/// Expands `~` and environment variables in a user supplied path.
pub fn expand_path(raw: &str) -> Result<PathBuf, ScoutError> {
    shellexpand::full(raw)
        .map(|p| PathBuf::from(p.as_ref()))
        .map_err(|e| ScoutError::InvalidPath {
            path: raw.to_string(),
            reason: e.to_string(),
        })
}

/// `none` (any case) or an empty string means no formation constraint.
pub fn parse_formation(raw: &str) -> Result<Option<Formation>, ScoutError> {
    if raw.trim().is_empty() || raw.trim().eq_ignore_ascii_case("none") {
        Ok(None)
    } else {
        raw.parse().map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formation_none_disables_constraint() {
        assert_eq!(parse_formation("none").unwrap(), None);
        assert_eq!(parse_formation("").unwrap(), None);
        assert_eq!(parse_formation("fi").unwrap(), Some(Formation::Fi));
        assert!(parse_formation("bogus").is_err());
    }

    #[test]
    fn expand_path_passes_plain_paths_and_rejects_unset_vars() {
        assert_eq!(
            expand_path("data/destinations.csv").unwrap(),
            PathBuf::from("data/destinations.csv")
        );
        assert!(expand_path("$TABLESCOUT_SURELY_UNSET_VAR/x").is_err());
    }

    #[test]
    fn setters_override_defaults() {
        let cfg = AppConfig::default()
            .page_size(NonZeroUsize::new(25).unwrap())
            .default_formation(None);
        assert_eq!(cfg.page_size.get(), 25);
        assert_eq!(cfg.default_formation, None);
        assert_eq!(cfg.filterable_columns, vec!["ZONE", "PAYS", "VILLE"]);
    }
}
