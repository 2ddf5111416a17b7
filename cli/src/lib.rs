pub mod cmd;
pub mod sink;
pub mod util;
