use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    /// Keywords, keyed by their lowercase spelling. Keywords are matched
    /// case-insensitively, except `true` and `false` which must begin with a
    /// lowercase letter.
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("class", TokenKind::Class);
        map.insert("inherits", TokenKind::Inherits);
        map.insert("if", TokenKind::If);
        map.insert("then", TokenKind::Then);
        map.insert("else", TokenKind::Else);
        map.insert("fi", TokenKind::Fi);
        map.insert("while", TokenKind::While);
        map.insert("loop", TokenKind::Loop);
        map.insert("pool", TokenKind::Pool);
        map.insert("let", TokenKind::Let);
        map.insert("in", TokenKind::In);
        map.insert("case", TokenKind::Case);
        map.insert("of", TokenKind::Of);
        map.insert("esac", TokenKind::Esac);
        map.insert("new", TokenKind::New);
        map.insert("isvoid", TokenKind::IsVoid);
        map.insert("not", TokenKind::Not);
        map.insert("true", TokenKind::True);
        map.insert("false", TokenKind::False);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Integer,
    String,
    TypeIdentifier,
    ObjectIdentifier,

    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    Assign,     // <-
    DArrow,     // =>
    Equals,     // =
    Less,       // <
    LessEquals, // <=

    Plus,
    Dash,
    Star,
    Slash,
    Tilde,

    Dot,
    At,
    Semicolon,
    Colon,
    Comma,

    // Reserved
    Class,
    Inherits,
    If,
    Then,
    Else,
    Fi,
    While,
    Loop,
    Pool,
    Let,
    In,
    Case,
    Of,
    Esac,
    New,
    IsVoid,
    Not,
    True,
    False,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::String => write!(f, "{:?}", self.value),
            TokenKind::EOF => write!(f, "end of file"),
            _ => write!(f, "{}", self.value),
        }
    }
}
