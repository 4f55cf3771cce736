pub mod dump;
pub mod emit;
pub mod error;
pub mod label;
pub mod lexer;
pub mod parser;
pub mod token;

pub use emit::{assemble, Assembly};
pub use error::Error;
pub use label::Labels;
