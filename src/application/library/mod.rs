mod errors;
mod library_manager;
mod persistence;

pub use errors::{InvariantViolation, LibraryError, PersistenceError, Result};
pub use library_manager::LibraryManager;
pub use persistence::{LoadPolicy, LoadReport};
