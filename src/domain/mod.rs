pub mod book;
pub mod document;
pub mod errors;
pub mod loan;
pub mod reader;
pub mod value_objects;

pub use book::Book;
pub use document::DocumentRecord;
pub use errors::*;
pub use loan::Loan;
pub use reader::Reader;
pub use value_objects::*;
