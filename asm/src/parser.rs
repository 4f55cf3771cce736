use arch::{Inst, Mnemonic, Reg, Shape};

use crate::error::Error;
use crate::label::{branch_disp, Labels};
use crate::lexer::LineLexer;
use crate::token::{Token, TokenKind};

// ----------------------------------------------------------------------------
// Validated lines

/// One source line after pass 1. Label definitions have already been
/// entered into the symbol table; `code` is present iff the line
/// carries an instruction, together with that instruction's pc.
#[derive(Debug, Clone)]
pub struct Line {
    pub text: String,
    pub code: Option<(Code, u32)>,
}

/// A `.word` operand: a 32-bit literal or a label resolved to its
/// absolute address in pass 2.
#[derive(Debug, Clone)]
pub enum Val {
    Literal(i64),
    Label(String),
}

/// A branch operand: an explicit displacement or a label resolved to a
/// pc-relative displacement in pass 2.
#[derive(Debug, Clone)]
pub enum Target {
    Disp(i16),
    Label(String),
}

/// A validated instruction whose label operands are still symbolic.
#[derive(Debug, Clone)]
pub enum Code {
    Word(Val),
    Jr(Reg),
    Jalr(Reg),
    Add(Reg, Reg, Reg),
    Sub(Reg, Reg, Reg),
    Slt(Reg, Reg, Reg),
    Sltu(Reg, Reg, Reg),
    Beq(Reg, Reg, Target),
    Bne(Reg, Reg, Target),
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

impl Val {
    fn resolve(&self, labels: &Labels) -> Result<u32, Error> {
        match self {
            Val::Literal(v) => Ok(*v as u32),
            Val::Label(name) => labels.get(name).ok_or_else(|| {
                Error::InternalInvariantViolation(format!(
                    "unresolved label `{name}` reached pass 2"
                ))
            }),
        }
    }
}

impl Target {
    fn resolve(&self, pc: u32, labels: &Labels) -> Result<i16, Error> {
        match self {
            Target::Disp(d) => Ok(*d),
            Target::Label(name) => {
                let target = labels.get(name).ok_or_else(|| {
                    Error::InternalInvariantViolation(format!(
                        "unresolved label `{name}` reached pass 2"
                    ))
                })?;
                i16::try_from(branch_disp(target, pc)).map_err(|_| {
                    Error::InternalInvariantViolation(format!(
                        "unchecked branch to `{name}` reached pass 2"
                    ))
                })
            }
        }
    }
}

impl Code {
    /// Pass-2 resolution. Pass 1 has verified every label and range, so
    /// any failure here is an internal invariant violation.
    pub fn resolve(&self, pc: u32, labels: &Labels) -> Result<Inst, Error> {
        Ok(match self {
            Code::Word(v) => Inst::Word(v.resolve(labels)?),
            Code::Jr(s) => Inst::Jr(*s),
            Code::Jalr(s) => Inst::Jalr(*s),
            Code::Add(d, s, t) => Inst::Add(*d, *s, *t),
            Code::Sub(d, s, t) => Inst::Sub(*d, *s, *t),
            Code::Slt(d, s, t) => Inst::Slt(*d, *s, *t),
            Code::Sltu(d, s, t) => Inst::Sltu(*d, *s, *t),
            Code::Beq(s, t, i) => Inst::Beq(*s, *t, i.resolve(pc, labels)?),
            Code::Bne(s, t, i) => Inst::Bne(*s, *t, i.resolve(pc, labels)?),
            Code::Lis(d) => Inst::Lis(*d),
            Code::Mfhi(d) => Inst::Mfhi(*d),
            Code::Mflo(d) => Inst::Mflo(*d),
            Code::Mult(s, t) => Inst::Mult(*s, *t),
            Code::Multu(s, t) => Inst::Multu(*s, *t),
            Code::Div(s, t) => Inst::Div(*s, *t),
            Code::Divu(s, t) => Inst::Divu(*s, *t),
            Code::Sw(t, i, s) => Inst::Sw(*t, *i, *s),
            Code::Lw(t, i, s) => Inst::Lw(*t, *i, *s),
        })
    }
}

// ----------------------------------------------------------------------------
// Pass 1: validation and symbol-table construction

/// Expected token-kind set at one operand position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Reg,
    Comma,
    LParen,
    RParen,
    /// 16-bit field: decimal -32768..=32767 or hex 0..=0xffff.
    Imm16,
    /// 16-bit field or label (branch target).
    BranchTarget,
    /// 32-bit field or label (`.word` operand).
    WordVal,
}

fn expected(shape: Shape) -> &'static [Expect] {
    use Expect::*;
    match shape {
        Shape::WordArg => &[WordVal],
        Shape::OneReg => &[Reg],
        Shape::TwoReg => &[Reg, Comma, Reg],
        Shape::ThreeReg => &[Reg, Comma, Reg, Comma, Reg],
        Shape::Branch => &[Reg, Comma, Reg, Comma, BranchTarget],
        Shape::Mem => &[Reg, Comma, Imm16, LParen, Reg, RParen],
    }
}

/// A branch operand label together with the pc of the referencing
/// instruction, range-checked after the whole pass.
#[derive(Debug)]
struct PendingRef {
    label: String,
    pc: u32,
}

/// Pass 1 state: feed source lines with [`Pass1::line`], then call
/// [`Pass1::finish`] to run the whole-program label checks.
#[derive(Debug, Default)]
pub struct Pass1 {
    lines: Vec<Line>,
    labels: Labels,
    pc: u32,
    operand_labels: Vec<String>,
    branch_refs: Vec<PendingRef>,
}

/// Typed operands collected while walking one line.
#[derive(Debug, Default)]
struct Operands {
    regs: Vec<Reg>,
    imm: Option<i16>,
    target: Option<Target>,
    val: Option<Val>,
}

impl Pass1 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: &str) -> Result<(), Error> {
        let tokens = LineLexer::new(text).run()?;
        let mut idx = 0;

        // A line may open with any number of label definitions.
        while let Some(Token {
            kind: TokenKind::Label(name),
            ..
        }) = tokens.get(idx)
        {
            self.labels.define(name, self.pc)?;
            idx += 1;
        }

        if idx == tokens.len() {
            self.lines.push(Line {
                text: text.to_string(),
                code: None,
            });
            return Ok(());
        }

        let head = &tokens[idx];
        let mnemonic = match &head.kind {
            TokenKind::Word => Mnemonic::Word,
            TokenKind::Id(name) => name
                .parse::<Mnemonic>()
                .map_err(|_| Error::UnknownMnemonic(name.clone()))?,
            _ => return Err(Error::UnexpectedToken(head.lexeme.clone())),
        };

        let code = self.operands(mnemonic, head, &tokens[idx + 1..])?;
        let pc = self.pc;
        self.pc += 4;
        self.lines.push(Line {
            text: text.to_string(),
            code: Some((code, pc)),
        });
        Ok(())
    }

    /// Walks the operand tokens left to right against the mnemonic's
    /// expected token-kind sets, range-checking as it goes.
    fn operands(&mut self, mnemonic: Mnemonic, head: &Token, tokens: &[Token]) -> Result<Code, Error> {
        let expects = expected(mnemonic.shape());
        let mut ops = Operands::default();

        for (pos, expect) in expects.iter().enumerate() {
            let prev = if pos == 0 { head } else { &tokens[pos - 1] };
            let token = tokens
                .get(pos)
                .ok_or_else(|| Error::MissingOperand(prev.lexeme.clone()))?;
            self.operand(*expect, prev, token, &mut ops)?;
        }
        if let Some(extra) = tokens.get(expects.len()) {
            return Err(Error::ExtraOperand(extra.lexeme.clone()));
        }

        build_code(mnemonic, ops)
    }

    fn operand(
        &mut self,
        expect: Expect,
        prev: &Token,
        token: &Token,
        ops: &mut Operands,
    ) -> Result<(), Error> {
        let invalid = || Error::InvalidOperand(prev.lexeme.clone());
        match expect {
            Expect::Reg => match token.kind {
                TokenKind::Reg(n) => {
                    let reg = u8::try_from(n)
                        .ok()
                        .and_then(Reg::new)
                        .ok_or_else(|| Error::OperandOutOfRange(token.lexeme.clone()))?;
                    ops.regs.push(reg);
                }
                _ => return Err(invalid()),
            },
            Expect::Comma => {
                if token.kind != TokenKind::Comma {
                    return Err(invalid());
                }
            }
            Expect::LParen => {
                if token.kind != TokenKind::LParen {
                    return Err(invalid());
                }
            }
            Expect::RParen => {
                if token.kind != TokenKind::RParen {
                    return Err(invalid());
                }
            }
            Expect::Imm16 => {
                ops.imm = Some(imm16_field(token, invalid)?);
            }
            Expect::BranchTarget => match &token.kind {
                TokenKind::Id(name) => {
                    self.operand_labels.push(name.clone());
                    self.branch_refs.push(PendingRef {
                        label: name.clone(),
                        pc: self.pc,
                    });
                    ops.target = Some(Target::Label(name.clone()));
                }
                _ => {
                    ops.target = Some(Target::Disp(imm16_field(token, invalid)?));
                }
            },
            Expect::WordVal => match &token.kind {
                TokenKind::Id(name) => {
                    self.operand_labels.push(name.clone());
                    ops.val = Some(Val::Label(name.clone()));
                }
                TokenKind::Int(v) | TokenKind::HexInt(v) => {
                    if *v < i32::MIN as i64 || *v > u32::MAX as i64 {
                        return Err(Error::OperandOutOfRange(token.lexeme.clone()));
                    }
                    ops.val = Some(Val::Literal(*v));
                }
                _ => return Err(invalid()),
            },
        }
        Ok(())
    }

    /// Whole-program checks: every operand label must be defined, and
    /// every pending branch displacement must fit a signed 16-bit field.
    pub fn finish(self) -> Result<(Vec<Line>, Labels), Error> {
        for name in &self.operand_labels {
            if self.labels.get(name).is_none() {
                return Err(Error::UndefinedLabel(name.clone()));
            }
        }
        for pending in &self.branch_refs {
            let target = self.labels.get(&pending.label).ok_or_else(|| {
                Error::UndefinedLabel(pending.label.clone())
            })?;
            let disp = branch_disp(target, pending.pc);
            if disp < i16::MIN as i64 || disp > i16::MAX as i64 {
                return Err(Error::BranchOutOfRange(pending.label.clone()));
            }
        }
        Ok((self.lines, self.labels))
    }
}

/// Decimal operands are signed 16-bit, hex operands unsigned 16-bit;
/// both end up as the field's bit pattern.
fn imm16_field(token: &Token, invalid: impl Fn() -> Error) -> Result<i16, Error> {
    match token.kind {
        TokenKind::Int(v) => {
            if v < i16::MIN as i64 || v > i16::MAX as i64 {
                return Err(Error::OperandOutOfRange(token.lexeme.clone()));
            }
            Ok(v as i16)
        }
        TokenKind::HexInt(v) => {
            if v < 0 || v > u16::MAX as i64 {
                return Err(Error::OperandOutOfRange(token.lexeme.clone()));
            }
            Ok(v as u16 as i16)
        }
        _ => Err(invalid()),
    }
}

fn build_code(mnemonic: Mnemonic, ops: Operands) -> Result<Code, Error> {
    let internal = || {
        Error::InternalInvariantViolation(format!(
            "operand shape mismatch while building `{mnemonic}`"
        ))
    };
    let reg = |i: usize| ops.regs.get(i).copied().ok_or_else(internal);

    use Mnemonic::*;
    Ok(match mnemonic {
        Word => Code::Word(ops.val.ok_or_else(internal)?),
        Jr => Code::Jr(reg(0)?),
        Jalr => Code::Jalr(reg(0)?),
        Add => Code::Add(reg(0)?, reg(1)?, reg(2)?),
        Sub => Code::Sub(reg(0)?, reg(1)?, reg(2)?),
        Slt => Code::Slt(reg(0)?, reg(1)?, reg(2)?),
        Sltu => Code::Sltu(reg(0)?, reg(1)?, reg(2)?),
        Beq => Code::Beq(reg(0)?, reg(1)?, ops.target.ok_or_else(internal)?),
        Bne => Code::Bne(reg(0)?, reg(1)?, ops.target.ok_or_else(internal)?),
        Lis => Code::Lis(reg(0)?),
        Mfhi => Code::Mfhi(reg(0)?),
        Mflo => Code::Mflo(reg(0)?),
        Mult => Code::Mult(reg(0)?, reg(1)?),
        Multu => Code::Multu(reg(0)?, reg(1)?),
        Div => Code::Div(reg(0)?, reg(1)?),
        Divu => Code::Divu(reg(0)?, reg(1)?),
        Sw => Code::Sw(reg(0)?, ops.imm.ok_or_else(internal)?, reg(1)?),
        Lw => Code::Lw(reg(0)?, ops.imm.ok_or_else(internal)?, reg(1)?),
    })
}
