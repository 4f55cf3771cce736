use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Duplicate symbol `{0}`")]
    DuplicateLabel(String),

    #[error("No such label: `{0}`")]
    UndefinedLabel(String),

    #[error("Invalid operand after `{0}`")]
    InvalidOperand(String),

    #[error("Constant out of range: `{0}`")]
    OperandOutOfRange(String),

    #[error("Missing operand after `{0}`")]
    MissingOperand(String),

    #[error("Expected end of line, but got `{0}`")]
    ExtraOperand(String),

    #[error("Branch to `{0}` does not fit in 16 bits")]
    BranchOutOfRange(String),

    #[error("Unknown instruction: `{0}`")]
    UnknownMnemonic(String),

    #[error("Invalid directive: `{0}`")]
    InvalidDirective(String),

    #[error("Cannot scan `{0}`")]
    InvalidToken(String),

    #[error("Expected instruction or label, but got `{0}`")]
    UnexpectedToken(String),

    #[error("Internal invariant violated: {0}")]
    InternalInvariantViolation(String),

    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to create file: {0}")]
    FileCreate(String, #[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    FileWrite(String, #[source] std::io::Error),
}
