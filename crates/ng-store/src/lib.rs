pub mod debounce;
pub mod error;
pub mod kv;
pub mod project;
pub mod session;

pub use debounce::Debouncer;
pub use error::{Result, StoreError};
pub use kv::{KeyValueStore, MemoryStore, UnavailableStore};
pub use project::{DEFAULT_PROJECT_NAME, ProjectEntry, ProjectStore};
pub use session::{Session, timestamp};
