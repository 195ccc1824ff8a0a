//! End to end: parse text, filter, page and persist favorites through a file store.

use std::num::NonZeroUsize;

use tablescout::predicate::CATEGORY_COLUMN;
use tablescout::storage::{JsonFileStore, KeyValueStore};
use tablescout::{
    Category, FavoritesRegistry, FilterState, Formation, QueryController, Row, store,
};

fn destinations(n: usize) -> String {
    let mut csv = format!("ZONE;PAYS;VILLE;FI;SE;{CATEGORY_COLUMN}\n");
    for i in 0..n {
        let category = ["C1 - open", "C2", "c3 (strict)"][i % 3];
        let fi = if i % 2 == 0 { "oui" } else { "  " };
        csv.push_str(&format!("Europe;Pays{i};Ville{i};{fi};;{category}\n"));
        if i % 5 == 0 {
            csv.push('\n');
        }
    }
    csv
}

fn controller(store: JsonFileStore, page_size: usize) -> QueryController {
    QueryController::new(
        FilterState::default(),
        NonZeroUsize::new(page_size).unwrap(),
        FavoritesRegistry::load(Box::new(store)),
    )
}

#[test]
fn loading_empty_and_single_row_sources() {
    let empty = store::load("").unwrap();
    assert_eq!(empty.len(), 0);
    assert!(empty.columns().is_empty());

    let single = store::load("A,B\n1,2\n").unwrap();
    assert_eq!(single.columns(), &["A", "B"]);
    assert_eq!(single.len(), 1);
}

#[test]
fn twenty_three_matches_paginate_into_three_pages() {
    let dir = tempfile::tempdir().unwrap();
    let mut qc = controller(JsonFileStore::new(dir.path().join("f.json")), 10);
    qc.set_dataset(store::load(&destinations(23)).unwrap());
    assert!(qc.is_loaded());
    assert_eq!(qc.columns().len(), 6);
    assert_eq!(qc.total_count(), 23);
    assert_eq!(qc.total_pages(), 3);
    assert_eq!(qc.page_rows().len(), 10);

    qc.go_to_page(99);
    assert_eq!(qc.current_page(), 3);
    assert_eq!(qc.page_rows().len(), 3);
    assert_eq!(qc.page_rows()[2].get("VILLE"), Some("Ville22"));

    qc.go_to_page(0);
    assert_eq!(qc.current_page(), 1);
}

#[test]
fn combined_filters_and_page_reset() {
    let dir = tempfile::tempdir().unwrap();
    let mut qc = controller(JsonFileStore::new(dir.path().join("f.json")), 2);
    qc.set_dataset(store::load(&destinations(12)).unwrap());

    qc.go_to_page(3);
    qc.set_formation(Some(Formation::Fi));
    assert_eq!(qc.current_page(), 1);
    assert_eq!(qc.total_count(), 6);

    qc.go_to_page(2);
    qc.set_category(Some(Category::C2));
    assert_eq!(qc.current_page(), 1);
    // Even rows with a C2 or C3 category: 2, 4, 8, 10.
    let villes: Vec<&str> = qc
        .page_rows()
        .iter()
        .filter_map(|r| r.get("VILLE"))
        .collect();
    assert_eq!(qc.total_count(), 4);
    assert_eq!(villes, vec!["Ville2", "Ville4"]);

    qc.set_text_filter("VILLE", "LE1");
    assert_eq!(qc.total_count(), 1);

    // The SE column exists but is blank everywhere.
    qc.clear_filters();
    qc.set_formation(Some(Formation::Se));
    assert_eq!(qc.total_count(), 0);
    assert_eq!(qc.total_pages(), 1);
    assert!(qc.page_rows().is_empty());
}

#[test]
fn category_row_matches_every_coarser_selection() {
    let c3 = Row::from_pairs([(CATEGORY_COLUMN, "C3-something")]);
    let c1 = Row::from_pairs([(CATEGORY_COLUMN, "C1-x")]);
    let mut state = FilterState::default();
    for level in Category::ALL {
        state.category = Some(level);
        assert!(tablescout::predicate::matches(&c3, &state));
        assert_eq!(
            tablescout::predicate::matches(&c1, &state),
            level == Category::C1
        );
    }
}

#[test]
fn favorites_round_trip_through_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("favorites.json");
    let dataset = store::load(&destinations(4)).unwrap();

    {
        let mut qc = controller(JsonFileStore::new(&path), 10);
        qc.set_dataset(dataset.clone());
        let row = qc.page_rows()[1].clone();
        qc.toggle_favorite(&row).unwrap();
        assert!(qc.is_favorite(&row));
    }

    // Fresh session, freshly parsed rows with the same content.
    let mut qc = controller(JsonFileStore::new(&path), 10);
    qc.set_dataset(store::load(&destinations(4)).unwrap());
    let same = qc.page_rows()[1].clone();
    assert!(qc.is_favorite(&same));
    assert_eq!(qc.favorites().len(), 1);
    assert!(!qc.is_favorite(qc.page_rows()[0]));

    qc.toggle_favorite(&same).unwrap();
    let stored = JsonFileStore::new(&path).get("favorites").unwrap().unwrap();
    assert_eq!(stored, "[]");
}

#[test]
fn unreadable_favorites_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("favorites.json");
    std::fs::write(&path, "{\"favorites\": \"[{broken\"}").unwrap();
    let qc = controller(JsonFileStore::new(&path), 10);
    assert!(qc.favorites().is_empty());
}
