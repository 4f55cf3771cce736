use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("duplicate procedure declaration for `{0}`")]
    DuplicateProcedure(String),

    #[error("duplicate declaration for `{0}`")]
    DuplicateLocal(String),

    #[error("missing declaration for `{0}`")]
    UndeclaredIdentifier(String),

    #[error("missing declaration for procedure `{0}`")]
    UndeclaredProcedure(String),

    #[error("procedure `{name}` expects {expected} argument(s) but {supplied} were supplied")]
    ArityMismatch {
        name: String,
        expected: usize,
        supplied: usize,
    },

    #[error("cannot call `{0}`, it refers to a variable")]
    ProcedureVariableClash(String),

    #[error("type error: {0}")]
    TypeError(String),

    #[error("malformed parse tree: {0}")]
    MalformedTree(String),

    #[error("internal invariant violated: {0}")]
    Internal(String),

    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    FileWrite(String, #[source] std::io::Error),
}
