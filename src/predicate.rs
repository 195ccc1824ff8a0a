//! Predicate engine: text, formation and category filters combined with AND.

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;

use crate::error::ScoutError;
use crate::store::{Dataset, Row};

/// Columns offered for free-text filtering.
pub const FILTERABLE_COLUMNS: [&str; 3] = ["ZONE", "PAYS", "VILLE"];

/// Column holding the C1/C2/C3 classification.
pub const CATEGORY_COLUMN: &str = "Category (indicative) C1/C2/C3";

/// Program track code. Selecting one requires the column of the same name to be
/// present and non-blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Formation {
    Aic,
    Bio,
    Cyb,
    Dsia,
    Ene,
    Gi,
    Inf,
    Se,
    Sei,
    Fe,
    Fg,
    Fi,
    Fr,
    Ft,
}

impl Formation {
    pub const ALL: [Formation; 14] = [
        Formation::Aic,
        Formation::Bio,
        Formation::Cyb,
        Formation::Dsia,
        Formation::Ene,
        Formation::Gi,
        Formation::Inf,
        Formation::Se,
        Formation::Sei,
        Formation::Fe,
        Formation::Fg,
        Formation::Fi,
        Formation::Fr,
        Formation::Ft,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Formation::Aic => "AIC",
            Formation::Bio => "BIO",
            Formation::Cyb => "CYB",
            Formation::Dsia => "DSIA",
            Formation::Ene => "ENE",
            Formation::Gi => "GI",
            Formation::Inf => "INF",
            Formation::Se => "SE",
            Formation::Sei => "SEI",
            Formation::Fe => "FE",
            Formation::Fg => "FG",
            Formation::Fi => "FI",
            Formation::Fr => "FR",
            Formation::Ft => "FT",
        }
    }

    /// Next selection in the cycle `None -> AIC -> ... -> FT -> None`.
    pub fn cycle(current: Option<Formation>) -> Option<Formation> {
        match current {
            None => Some(Formation::ALL[0]),
            Some(f) => {
                let idx = Formation::ALL.iter().position(|&x| x == f).unwrap_or(0);
                Formation::ALL.get(idx + 1).copied()
            }
        }
    }
}

impl fmt::Display for Formation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Formation {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        Formation::ALL
            .into_iter()
            .find(|f| f.code() == code)
            .ok_or_else(|| ScoutError::UnknownFormation(s.to_string()))
    }
}

/// Three level classification. Ordered from the coarsest (`C1`) to the
/// strictest (`C3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    C1,
    C2,
    C3,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::C1, Category::C2, Category::C3];

    pub fn code(self) -> &'static str {
        match self {
            Category::C1 => "C1",
            Category::C2 => "C2",
            Category::C3 => "C3",
        }
    }

    /// True if the uppercased `value` starts with this level or a stricter one.
    pub fn admits(self, value: &str) -> bool {
        Category::ALL
            .iter()
            .filter(|&&level| level >= self)
            .any(|level| value.starts_with(level.code()))
    }

    pub fn cycle(current: Option<Category>) -> Option<Category> {
        match current {
            None => Some(Category::C1),
            Some(Category::C1) => Some(Category::C2),
            Some(Category::C2) => Some(Category::C3),
            Some(Category::C3) => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Category {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        Category::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or_else(|| ScoutError::UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFilter {
    pub column: String,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    text_filters: Vec<TextFilter>,
    pub formation: Option<Formation>,
    pub category: Option<Category>,
    category_column: String,
}

impl Default for FilterState {
    fn default() -> Self {
        FilterState::new(FILTERABLE_COLUMNS, CATEGORY_COLUMN)
    }
}

impl FilterState {
    /// Unconstrained state over the given whitelist of text-filterable columns.
    pub fn new<I, S>(filterable_columns: I, category_column: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterState {
            text_filters: filterable_columns
                .into_iter()
                .map(|c| TextFilter {
                    column: c.into(),
                    query: String::new(),
                })
                .collect(),
            formation: None,
            category: None,
            category_column: category_column.into(),
        }
    }

    pub fn text_filters(&self) -> &[TextFilter] {
        &self.text_filters
    }

    pub fn text_query(&self, column: &str) -> Option<&str> {
        self.text_filters
            .iter()
            .find(|f| f.column == column)
            .map(|f| f.query.as_str())
    }

    /// Sets the query for `column`. Returns false if the column is not filterable.
    pub fn set_text(&mut self, column: &str, query: impl Into<String>) -> bool {
        match self.text_filters.iter_mut().find(|f| f.column == column) {
            Some(filter) => {
                filter.query = query.into();
                true
            }
            None => false,
        }
    }

    pub fn category_column(&self) -> &str {
        &self.category_column
    }

    /// Drops every constraint, keeping the column whitelist.
    pub fn clear(&mut self) {
        for f in self.text_filters.iter_mut() {
            f.query.clear();
        }
        self.formation = None;
        self.category = None;
    }

    pub fn is_unconstrained(&self) -> bool {
        self.formation.is_none()
            && self.category.is_none()
            && self.text_filters.iter().all(|f| f.query.is_empty())
    }

    /// One line summary, only when both category and formation are selected.
    pub fn describe(&self) -> Option<String> {
        match (self.category, self.formation) {
            (Some(category), Some(formation)) => Some(format!(
                "You are looking for a {category} internship in {formation} formation."
            )),
            _ => None,
        }
    }
}

fn matches_text(row: &Row, filter: &TextFilter) -> bool {
    if filter.query.is_empty() {
        return true;
    }
    row.get(&filter.column)
        .is_some_and(|v| v.to_lowercase().contains(&filter.query.to_lowercase()))
}

fn matches_formation(row: &Row, formation: Option<Formation>) -> bool {
    match formation {
        None => true,
        Some(f) => row.get(f.code()).is_some_and(|v| !v.trim().is_empty()),
    }
}

fn matches_category(row: &Row, category: Option<Category>, column: &str) -> bool {
    match category {
        None => true,
        Some(level) => match row.get(column) {
            Some(v) if !v.is_empty() => level.admits(&v.to_uppercase()),
            _ => false,
        },
    }
}

/// True if `row` satisfies every active constraint in `state`.
pub fn matches(row: &Row, state: &FilterState) -> bool {
    state.text_filters.iter().all(|f| matches_text(row, f))
        && matches_formation(row, state.formation)
        && matches_category(row, state.category, &state.category_column)
}

/// Indices of matching rows, in dataset order.
pub fn filter(dataset: &Dataset, state: &FilterState) -> Vec<usize> {
    let rows = dataset.rows();
    (0..rows.len())
        .into_par_iter()
        .filter(|&idx| matches(&rows[idx], state))
        .collect()
}
