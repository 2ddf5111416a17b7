pub mod result;
pub mod runner;
pub mod spec;

pub use result::*;
pub use runner::*;
pub use spec::*;
