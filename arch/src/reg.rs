use std::fmt;

/// A numeric MR32 register, `$0` through `$31`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reg(u8);

impl Reg {
    pub const MAX: u8 = 31;

    pub fn new(n: u8) -> Option<Self> {
        (n <= Self::MAX).then_some(Reg(n))
    }

    pub fn number(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

#[test]
fn test() {
    assert_eq!(Reg::new(31).map(Reg::number), Some(31));
    assert_eq!(Reg::new(32), None);
    assert_eq!(format!("{}", Reg::new(29).unwrap()), "$29");
}
