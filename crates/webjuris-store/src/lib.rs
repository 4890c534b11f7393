//! Working set: the cases one view or command operates on, held in memory,
//! and the registry of reserved case numbers.

mod book;
mod error;
mod registry;

pub use book::CaseBook;
pub use error::StoreError;
pub use registry::{NumberRegistry, NumberUse, ReservedNumber};
