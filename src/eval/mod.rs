pub mod dispatcher;
pub mod readline;
pub mod symbols;
mod tokenizer;

pub use dispatcher::Dispatcher;
pub use readline::{LineEditor, LineSource, PipedInput};
pub use tokenizer::tokenize;
