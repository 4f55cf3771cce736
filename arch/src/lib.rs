pub mod inst;
pub mod mnemonic;
pub mod reg;

pub use inst::Inst;
pub use mnemonic::{Mnemonic, Shape};
pub use reg::Reg;
