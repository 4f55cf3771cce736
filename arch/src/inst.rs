use crate::reg::Reg;

/// A fully resolved MR32 instruction.
///
/// Encoding is pure bit packing; operands arrive already range-checked
/// by the assembler's first pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inst {
    Word(u32),
    Jr(Reg),
    Jalr(Reg),
    Add(Reg, Reg, Reg),
    Sub(Reg, Reg, Reg),
    Slt(Reg, Reg, Reg),
    Sltu(Reg, Reg, Reg),
    Beq(Reg, Reg, i16),
    Bne(Reg, Reg, i16),
    Lis(Reg),
    Mfhi(Reg),
    Mflo(Reg),
    Mult(Reg, Reg),
    Multu(Reg, Reg),
    Div(Reg, Reg),
    Divu(Reg, Reg),
    Sw(Reg, i16, Reg),
    Lw(Reg, i16, Reg),
}

fn r(reg: Reg) -> u32 {
    reg.number() as u32
}

fn imm16(i: i16) -> u32 {
    (i as u16) as u32
}

impl Inst {
    pub fn encode(self) -> u32 {
        match self {
            Inst::Word(w) => w,
            Inst::Jr(s) => (r(s) << 21) | 8,
            Inst::Jalr(s) => (r(s) << 21) | 9,
            Inst::Add(d, s, t) => (r(d) << 11) | (r(s) << 21) | (r(t) << 16) | 32,
            Inst::Sub(d, s, t) => (r(d) << 11) | (r(s) << 21) | (r(t) << 16) | 34,
            Inst::Slt(d, s, t) => (r(d) << 11) | (r(s) << 21) | (r(t) << 16) | 42,
            Inst::Sltu(d, s, t) => (r(d) << 11) | (r(s) << 21) | (r(t) << 16) | 43,
            Inst::Beq(s, t, i) => (4 << 26) | (r(s) << 21) | (r(t) << 16) | imm16(i),
            Inst::Bne(s, t, i) => (5 << 26) | (r(s) << 21) | (r(t) << 16) | imm16(i),
            Inst::Lis(d) => (r(d) << 11) | 20,
            Inst::Mfhi(d) => (r(d) << 11) | 16,
            Inst::Mflo(d) => (r(d) << 11) | 18,
            Inst::Mult(s, t) => (r(s) << 21) | (r(t) << 16) | 24,
            Inst::Multu(s, t) => (r(s) << 21) | (r(t) << 16) | 25,
            Inst::Div(s, t) => (r(s) << 21) | (r(t) << 16) | 26,
            Inst::Divu(s, t) => (r(s) << 21) | (r(t) << 16) | 27,
            Inst::Sw(t, i, s) => (43 << 26) | (r(s) << 21) | (r(t) << 16) | imm16(i),
            Inst::Lw(t, i, s) => (35 << 26) | (r(s) << 21) | (r(t) << 16) | imm16(i),
        }
    }

    /// Inverse bit-field extraction. `.word` payloads are not
    /// distinguishable from instructions, so unknown opcode/funct
    /// combinations return `None` rather than `Word`.
    pub fn decode(word: u32) -> Option<Inst> {
        let s = Reg::new(((word >> 21) & 0x1f) as u8)?;
        let t = Reg::new(((word >> 16) & 0x1f) as u8)?;
        let d = Reg::new(((word >> 11) & 0x1f) as u8)?;
        let imm = (word & 0xffff) as u16 as i16;
        match word >> 26 {
            0 => match word & 0x3f {
                8 => Some(Inst::Jr(s)),
                9 => Some(Inst::Jalr(s)),
                16 => Some(Inst::Mfhi(d)),
                18 => Some(Inst::Mflo(d)),
                20 => Some(Inst::Lis(d)),
                24 => Some(Inst::Mult(s, t)),
                25 => Some(Inst::Multu(s, t)),
                26 => Some(Inst::Div(s, t)),
                27 => Some(Inst::Divu(s, t)),
                32 => Some(Inst::Add(d, s, t)),
                34 => Some(Inst::Sub(d, s, t)),
                42 => Some(Inst::Slt(d, s, t)),
                43 => Some(Inst::Sltu(d, s, t)),
                _ => None,
            },
            4 => Some(Inst::Beq(s, t, imm)),
            5 => Some(Inst::Bne(s, t, imm)),
            35 => Some(Inst::Lw(t, imm, s)),
            43 => Some(Inst::Sw(t, imm, s)),
            _ => None,
        }
    }

    /// Words are always emitted most-significant byte first.
    pub fn to_be_bytes(self) -> [u8; 4] {
        self.encode().to_be_bytes()
    }
}
