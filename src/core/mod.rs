pub mod commands;
pub mod dispatcher;

pub use dispatcher::{Dispatcher, Route};
