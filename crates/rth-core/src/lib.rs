#![deny(missing_docs)]
#![doc = "Shared error taxonomy, term reader and identifier generation for the rebar test harness."]

pub mod errors;
pub mod ident;
pub mod term;

pub use errors::{ErrorInfo, HarnessError};
pub use ident::IdentGenerator;
pub use term::{consult_file, consult_str, Term};
