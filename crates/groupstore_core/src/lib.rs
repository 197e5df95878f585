//! Group and relation persistence over SQLite.
//!
//! Groups are named, statused containers; relations link an external entity
//! (type + id) to a group. Both support CRUD, soft delete and filtered,
//! paginated listing through [`SqliteStore`].

pub mod clock;
pub mod db;
pub mod ids;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod sql;

pub use clock::{Clock, FixedClock, SystemClock, DATETIME_FORMAT, MAX_DATETIME};
pub use db::{open_db, open_db_in_memory, DbError, DbResult, ExecContext};
pub use ids::new_human_uid;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::group::{Group, GroupStatus};
pub use model::metas::{Metas, MetasError, MetasResult};
pub use model::record::Record;
pub use model::relation::Relation;
pub use query::{GroupQuery, QueryError, QueryResult, RelationQuery, SORT_ASC, SORT_DESC};
pub use repo::{
    GroupRepository, RelationRepository, RepoError, RepoResult, SqliteStore, StoreOptions,
};

/// Returns the crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
