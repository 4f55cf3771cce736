use strum::{Display, EnumString};

/// Every MR32 mnemonic, including the `.word` directive.
/// Parsing is case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Mnemonic {
    #[strum(serialize = ".word")]
    Word,
    Jr,
    Jalr,
    Add,
    Sub,
    Slt,
    Sltu,
    Beq,
    Bne,
    Lis,
    Mfhi,
    Mflo,
    Mult,
    Multu,
    Div,
    Divu,
    Sw,
    Lw,
}

/// Operand-list shape of a mnemonic, before commas and parens are
/// expanded into expected-token positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `.word (int|hex|label)`
    WordArg,
    /// `$d`
    OneReg,
    /// `$s, $t`
    TwoReg,
    /// `$d, $s, $t`
    ThreeReg,
    /// `$s, $t, (int|hex|label)`
    Branch,
    /// `$t, i($s)`
    Mem,
}

impl Mnemonic {
    pub fn shape(self) -> Shape {
        use Mnemonic::*;
        match self {
            Word => Shape::WordArg,
            Jr | Jalr | Lis | Mfhi | Mflo => Shape::OneReg,
            Mult | Multu | Div | Divu => Shape::TwoReg,
            Add | Sub | Slt | Sltu => Shape::ThreeReg,
            Beq | Bne => Shape::Branch,
            Sw | Lw => Shape::Mem,
        }
    }
}

#[test]
fn test() {
    assert_eq!(".word".parse(), Ok(Mnemonic::Word));
    assert_eq!("sltu".parse(), Ok(Mnemonic::Sltu));
    assert!("SLTU".parse::<Mnemonic>().is_err());
    assert!("hoge".parse::<Mnemonic>().is_err());
    assert_eq!(Mnemonic::Word.to_string(), ".word");
    assert_eq!(Mnemonic::Beq.shape(), Shape::Branch);
}
