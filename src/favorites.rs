//! Favorites registry: a set of rows deduplicated by field content.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::error::Result;
use crate::predicate::CATEGORY_COLUMN;
use crate::storage::KeyValueStore;
use crate::store::Row;

/// Storage key the favorites array lives under.
pub const FAVORITES_KEY: &str = "favorites";

/// Columns used to summarise a favorite in one line.
#[derive(Debug, Clone)]
pub struct FavoriteLabels {
    pub title_column: String,
    pub city_column: String,
    pub country_column: String,
    pub category_column: String,
}

impl Default for FavoriteLabels {
    fn default() -> Self {
        FavoriteLabels {
            title_column: "UNIVERSITE PARTENAIRE OFFRE DE SÉJOUR".to_string(),
            city_column: "VILLE".to_string(),
            country_column: "PAYS".to_string(),
            category_column: CATEGORY_COLUMN.to_string(),
        }
    }
}

/// `<university>, <city> (<country>) - <category>`, with placeholders for gaps.
pub fn favorite_label(row: &Row, labels: &FavoriteLabels) -> String {
    let part = |column: &str, fallback: &'static str| {
        row.get(column)
            .filter(|v| !v.is_empty())
            .unwrap_or(fallback)
            .to_string()
    };
    format!(
        "{}, {} ({}) - {}",
        part(&labels.title_column, "Unknown university"),
        part(&labels.city_column, "Unknown city"),
        part(&labels.country_column, "Unknown country"),
        part(&labels.category_column, "Unknown category"),
    )
}

pub struct FavoritesRegistry {
    rows: Vec<Row>,
    keys: HashSet<String>,
    store: Box<dyn KeyValueStore>,
}

impl FavoritesRegistry {
    /// Restores favorites from `store`. Missing or unreadable data yields an
    /// empty registry.
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let mut registry = FavoritesRegistry {
            rows: Vec::new(),
            keys: HashSet::new(),
            store,
        };
        let stored = match registry.store.get(FAVORITES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return registry,
            Err(e) => {
                warn!("Could not read favorites, starting empty: {e}");
                return registry;
            }
        };
        match serde_json::from_str::<Vec<Row>>(&stored) {
            Ok(rows) => {
                for row in rows {
                    registry.insert(row);
                }
                info!("Restored {} favorites", registry.rows.len());
            }
            Err(e) => warn!("Ignoring malformed favorites: {e}"),
        }
        registry
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_favorite(&self, row: &Row) -> bool {
        self.keys.contains(&row.canonical_key())
    }

    /// Removes `row` if an equal row is already a favorite, adds it otherwise,
    /// then persists the new set.
    ///
    /// The in-memory set is updated even when persisting fails.
    pub fn toggle(&mut self, row: &Row) -> Result<&[Row]> {
        let key = row.canonical_key();
        if self.keys.remove(&key) {
            self.rows.retain(|r| r.canonical_key() != key);
        } else {
            self.keys.insert(key);
            self.rows.push(row.clone());
        }
        self.save()?;
        Ok(&self.rows)
    }

    /// Writes the current set under [`FAVORITES_KEY`].
    pub fn save(&mut self) -> Result<()> {
        let payload = serde_json::to_string(&self.rows)?;
        self.store.set(FAVORITES_KEY, &payload)?;
        info!("Saved {} favorites", self.rows.len());
        Ok(())
    }

    fn insert(&mut self, row: Row) {
        if self.keys.insert(row.canonical_key()) {
            self.rows.push(row);
        }
    }
}
