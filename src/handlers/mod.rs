//! API handlers for the lendr backend

pub mod loan;
pub mod record;

pub use loan::*;
pub use record::*;
