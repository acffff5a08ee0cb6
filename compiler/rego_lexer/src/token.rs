use std::fmt;

/// Token kinds.
///
/// Operator tokens render under the name of the built-in they desugar to
/// (`+` is `plus`, `=` is `eq`), which is also the operator name the parser
/// puts into call terms.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Token {
    #[default]
    Illegal,
    Eof,
    Whitespace,
    Ident,
    Comment,

    // Keywords
    Package,
    Import,
    As,
    Default,
    Else,
    Not,
    Some,
    With,
    Null,
    True,
    False,

    // Literals
    Number,
    String,

    // Delimiters
    LBrack,
    RBrack,
    LBrace,
    RBrace,
    LParen,
    RParen,
    Comma,
    Colon,
    Dot,
    Semicolon,

    // Operators
    Add,
    Sub,
    Mul,
    Quo,
    Rem,
    And,
    Or,
    Unify,
    Equal,
    Assign,
    Neq,
    Gt,
    Lt,
    Gte,
    Lte,

    // Future keywords
    In,
    Every,
    Contains,
    If,
}

impl Token {
    pub fn as_str(self) -> &'static str {
        match self {
            Token::Illegal => "illegal",
            Token::Eof => "eof",
            Token::Whitespace => "whitespace",
            Token::Ident => "identifier",
            Token::Comment => "comment",
            Token::Package => "package",
            Token::Import => "import",
            Token::As => "as",
            Token::Default => "default",
            Token::Else => "else",
            Token::Not => "not",
            Token::Some => "some",
            Token::With => "with",
            Token::Null => "null",
            Token::True => "true",
            Token::False => "false",
            Token::Number => "number",
            Token::String => "string",
            Token::LBrack => "[",
            Token::RBrack => "]",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Comma => ",",
            Token::Colon => ":",
            Token::Dot => ".",
            Token::Semicolon => ";",
            Token::Add => "plus",
            Token::Sub => "minus",
            Token::Mul => "mul",
            Token::Quo => "div",
            Token::Rem => "rem",
            Token::And => "and",
            Token::Or => "or",
            Token::Unify => "eq",
            Token::Equal => "equal",
            Token::Assign => "assign",
            Token::Neq => "neq",
            Token::Gt => "gt",
            Token::Lt => "lt",
            Token::Gte => "gte",
            Token::Lte => "lte",
            Token::In => "in",
            Token::Every => "every",
            Token::Contains => "contains",
            Token::If => "if",
        }
    }

    /// Reserved in every language version.
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            Token::Package
                | Token::Import
                | Token::As
                | Token::Default
                | Token::Else
                | Token::Not
                | Token::Some
                | Token::With
                | Token::Null
                | Token::True
                | Token::False
        )
    }

    /// Reserved only when enabled by version or import.
    pub fn is_future_keyword(self) -> bool {
        matches!(self, Token::In | Token::Every | Token::Contains | Token::If)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
