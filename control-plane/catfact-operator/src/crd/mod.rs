pub mod catfact;

pub use catfact::{CatFact, CatFactSpec, CatFactStatus};
