//! Query engine for browsing one tabular dataset: load, filter, page and keep
//! favorites.

pub mod error;
pub mod favorites;
pub mod loader;
pub mod pager;
pub mod predicate;
pub mod query;
pub mod storage;
pub mod store;

pub use error::{Result, ScoutError};
pub use favorites::{FavoriteLabels, FavoritesRegistry, favorite_label};
pub use pager::PageView;
pub use predicate::{Category, FilterState, Formation};
pub use query::{QueryController, QueryView};
pub use store::{Dataset, Row};
