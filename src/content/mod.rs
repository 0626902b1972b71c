pub mod repository;
pub mod session;
pub mod sqlite;

pub use repository::{BundledContent, ContentRepository, LocationRepository, StaticContent};
pub use session::{SessionContent, SessionError};
pub use sqlite::{ContentDbError, SqliteContentRepository};
