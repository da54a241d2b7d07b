mod memory_store;
mod pg_store;
mod post_store;
mod series_store;

pub use memory_store::*;
pub use pg_store::*;
pub use post_store::*;
pub use series_store::*;

use std::sync::Arc;

/// Store handles shared by every service call.
#[derive(Clone)]
pub struct Stores {
    pub series: Arc<dyn SeriesStore>,
    pub posts: Arc<dyn PostStore>,
}

impl Stores {
    #[must_use]
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self {
            series: store.clone(),
            posts: store,
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::default());
        Self {
            series: store.clone(),
            posts: store,
        }
    }
}
