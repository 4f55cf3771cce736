use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::error::Error;

/// Terminal kinds of the Pint grammar. Every other symbol appearing on
/// a left-hand side is a non-terminal.
static TERMINALS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "AMP", "BECOMES", "BOF", "COMMA", "DELETE", "ELSE", "EOF", "EQ", "GE", "GT", "ID", "IF",
        "INT", "LBRACE", "LBRACK", "LE", "LPAREN", "LT", "MINUS", "NE", "NEW", "NULL", "NUM",
        "PCT", "PLUS", "PRINTLN", "RBRACE", "RBRACK", "RETURN", "RPAREN", "SEMI", "SLASH", "STAR",
        "WAIN", "WHILE",
    ]
    .into_iter()
    .collect()
});

pub fn is_terminal(symbol: &str) -> bool {
    TERMINALS.contains(symbol)
}

/// One node of the flattened parse tree. For a non-terminal, `rhs`
/// holds the production's right-hand side and `children` one subtree
/// per symbol. For a terminal, `rhs` holds the single lexeme.
#[derive(Debug, Clone)]
pub struct Node {
    pub lhs: String,
    pub rhs: Vec<String>,
    pub children: Vec<Node>,
}

impl Node {
    /// The production as written in the input, for error reporting.
    pub fn rule(&self) -> String {
        let mut text = self.lhs.clone();
        for symbol in &self.rhs {
            text.push(' ');
            text.push_str(symbol);
        }
        text
    }

    /// Lexeme of a terminal leaf.
    pub fn lexeme(&self) -> Result<&str, Error> {
        if !is_terminal(&self.lhs) || self.rhs.len() != 1 {
            return Err(Error::MalformedTree(format!(
                "expected a terminal, found `{}`",
                self.rule()
            )));
        }
        Ok(&self.rhs[0])
    }

    pub fn child(&self, index: usize) -> Result<&Node, Error> {
        self.children.get(index).ok_or_else(|| {
            Error::MalformedTree(format!("`{}` has no child {index}", self.rule()))
        })
    }
}

/// Reads a preorder tree listing: one line per node, children of a
/// non-terminal following it in right-hand-side order.
pub fn parse(source: &str) -> Result<Node, Error> {
    let lines: Vec<Vec<&str>> = source
        .lines()
        .map(|line| line.split_whitespace().collect())
        .collect();
    let mut index = 0;
    let root = read(&lines, &mut index)?;
    if index != lines.len() {
        return Err(Error::MalformedTree(format!(
            "input continues past the tree at line {}",
            index + 1
        )));
    }
    Ok(root)
}

fn read(lines: &[Vec<&str>], index: &mut usize) -> Result<Node, Error> {
    let parts = lines
        .get(*index)
        .ok_or_else(|| Error::MalformedTree("unexpected end of input".into()))?;
    *index += 1;
    let lhs = parts
        .first()
        .ok_or_else(|| Error::MalformedTree(format!("line {} is empty", *index)))?
        .to_string();
    let rhs: Vec<String> = parts[1..].iter().map(|s| s.to_string()).collect();

    if is_terminal(&lhs) {
        if rhs.len() != 1 {
            return Err(Error::MalformedTree(format!(
                "terminal `{lhs}` must carry exactly one lexeme"
            )));
        }
        return Ok(Node {
            lhs,
            rhs,
            children: Vec::new(),
        });
    }

    let mut children = Vec::with_capacity(rhs.len());
    for _ in 0..rhs.len() {
        children.push(read(lines, index)?);
    }
    Ok(Node { lhs, rhs, children })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preorder_reconstruction() {
        let root = parse("expr expr PLUS term\nexpr term\nterm factor\nfactor NUM\nNUM 4\nPLUS +\nterm factor\nfactor NUM\nNUM 2\n").unwrap();
        assert_eq!(root.rule(), "expr expr PLUS term");
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.children[1].lexeme().unwrap(), "+");
    }

    #[test]
    fn epsilon_production_has_no_children() {
        let root = parse("dcls\n").unwrap();
        assert!(root.children.is_empty());
    }

    #[test]
    fn truncated_tree_is_rejected() {
        assert!(matches!(
            parse("expr expr PLUS term\nexpr term\n"),
            Err(Error::MalformedTree(_))
        ));
    }

    #[test]
    fn trailing_lines_are_rejected() {
        assert!(matches!(
            parse("dcls\ndcls\n"),
            Err(Error::MalformedTree(_))
        ));
    }
}
