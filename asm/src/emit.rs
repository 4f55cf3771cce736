use arch::Inst;

use crate::error::Error;
use crate::label::Labels;
use crate::parser::{Line, Pass1};

/// Everything both passes produced: the validated lines, the final
/// symbol table, and the encoded instruction stream in line order.
#[derive(Debug)]
pub struct Assembly {
    pub lines: Vec<Line>,
    pub labels: Labels,
    pub words: Vec<Inst>,
}

impl Assembly {
    /// The relocated image, most-significant byte first.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.words
            .iter()
            .flat_map(|inst| inst.to_be_bytes())
            .collect()
    }
}

/// Runs both passes over `source`. Any error leaves no output behind.
pub fn assemble(source: &str) -> Result<Assembly, Error> {
    let mut pass1 = Pass1::new();
    for line in source.lines() {
        pass1.line(line)?;
    }
    let (lines, labels) = pass1.finish()?;

    // Pass 2: resolve labels and encode, in line order.
    let mut words = Vec::new();
    for line in &lines {
        if let Some((code, pc)) = &line.code {
            words.push(code.resolve(*pc, &labels)?);
        }
    }

    Ok(Assembly {
        lines,
        labels,
        words,
    })
}
