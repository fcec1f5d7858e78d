use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, &Regex) -> Result<(), Error>;

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

lazy_static! {
    // Tried in order; every regex is anchored at the current position.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        RegexPattern { regex: Regex::new("^[ \\t\\r\\n\\x0B\\x0C]+").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new("^--[^\\n]*").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new("^\\(\\*").unwrap(), handler: comment_handler },
        RegexPattern { regex: Regex::new("^\\*\\)").unwrap(), handler: unmatched_comment_handler },
        RegexPattern { regex: Regex::new("^[0-9]+").unwrap(), handler: number_handler },
        RegexPattern { regex: Regex::new("^[A-Za-z_][A-Za-z0-9_]*").unwrap(), handler: symbol_handler },
        RegexPattern { regex: Regex::new("^\"").unwrap(), handler: string_handler },
        RegexPattern { regex: Regex::new("^<-").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Assign, "<-") },
        RegexPattern { regex: Regex::new("^<=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=") },
        RegexPattern { regex: Regex::new("^<").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Less, "<") },
        RegexPattern { regex: Regex::new("^=>").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::DArrow, "=>") },
        RegexPattern { regex: Regex::new("^=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Equals, "=") },
        RegexPattern { regex: Regex::new("^\\{").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenCurly, "{") },
        RegexPattern { regex: Regex::new("^\\}").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseCurly, "}") },
        RegexPattern { regex: Regex::new("^\\(").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(") },
        RegexPattern { regex: Regex::new("^\\)").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")") },
        RegexPattern { regex: Regex::new("^\\.").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Dot, ".") },
        RegexPattern { regex: Regex::new("^@").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::At, "@") },
        RegexPattern { regex: Regex::new("^;").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";") },
        RegexPattern { regex: Regex::new("^:").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Colon, ":") },
        RegexPattern { regex: Regex::new("^,").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Comma, ",") },
        RegexPattern { regex: Regex::new("^\\+").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Plus, "+") },
        RegexPattern { regex: Regex::new("^-").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Dash, "-") },
        RegexPattern { regex: Regex::new("^\\*").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Star, "*") },
        RegexPattern { regex: Regex::new("^/").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Slash, "/") },
        RegexPattern { regex: Regex::new("^~").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Tilde, "~") },
    ];
}

pub struct Lexer {
    tokens: Vec<Token>,
    source: String,
    pos: usize,
    line: u32,
    column: u32,
    file: Arc<String>,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Arc::new(file)
        } else {
            Arc::new(String::from("<unknown>"))
        };

        Lexer {
            tokens: vec![],
            source,
            pos: 0,
            line: 1,
            column: 1,
            file: file_name,
        }
    }

    /// Moves forward `n` bytes, keeping line and column in step.
    pub fn advance_n(&mut self, n: usize) {
        let end = (self.pos + n).min(self.source.len());
        for ch in self.source[self.pos..end].chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos = end;
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn at(&self) -> Option<char> {
        self.remainder().chars().next()
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column, Arc::clone(&self.file))
    }

    fn matched_len(&self, regex: &Regex) -> usize {
        regex.find(self.remainder()).map(|m| m.end()).unwrap_or(0)
    }
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched_len(regex);
    lexer.advance_n(matched);
    Ok(())
}

fn comment_handler(lexer: &mut Lexer, _regex: &Regex) -> Result<(), Error> {
    let start = lexer.position();
    lexer.advance_n(2);

    let mut depth = 1;
    while depth > 0 {
        let rest = lexer.remainder();
        if rest.is_empty() {
            return Err(Error::new(ErrorImpl::UnterminatedComment, start));
        }

        if rest.starts_with("(*") {
            depth += 1;
            lexer.advance_n(2);
        } else if rest.starts_with("*)") {
            depth -= 1;
            lexer.advance_n(2);
        } else {
            let width = rest.chars().next().map(char::len_utf8).unwrap_or(1);
            lexer.advance_n(width);
        }
    }

    Ok(())
}

fn unmatched_comment_handler(lexer: &mut Lexer, _regex: &Regex) -> Result<(), Error> {
    Err(Error::new(
        ErrorImpl::UnrecognisedToken {
            token: String::from("*)"),
        },
        lexer.position(),
    ))
}

fn number_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let start = lexer.position();
    let len = lexer.matched_len(regex);
    let matched = lexer.remainder()[..len].to_string();

    if matched.parse::<i64>().is_err() {
        return Err(Error::new(ErrorImpl::NumberParseError { token: matched }, start));
    }

    lexer.advance_n(len);
    lexer.push(MK_TOKEN!(
        TokenKind::Integer,
        matched,
        Span {
            start,
            end: lexer.position()
        }
    ));
    Ok(())
}

fn string_handler(lexer: &mut Lexer, _regex: &Regex) -> Result<(), Error> {
    let start = lexer.position();
    lexer.advance_n(1);

    let mut result = String::new();
    loop {
        let Some(ch) = lexer.at() else {
            return Err(Error::new(ErrorImpl::UnterminatedString, start));
        };

        match ch {
            '"' => {
                lexer.advance_n(1);
                break;
            }
            '\n' => return Err(Error::new(ErrorImpl::UnterminatedString, start)),
            '\0' => {
                return Err(Error::new(
                    ErrorImpl::InvalidStringCharacter {
                        character: String::from("\\0"),
                    },
                    lexer.position(),
                ))
            }
            '\\' => {
                lexer.advance_n(1);
                let Some(escaped) = lexer.at() else {
                    return Err(Error::new(ErrorImpl::UnterminatedString, start));
                };

                match escaped {
                    'n' => result.push('\n'),
                    't' => result.push('\t'),
                    'b' => result.push('\u{8}'),
                    'f' => result.push('\u{c}'),
                    '\0' => {
                        return Err(Error::new(
                            ErrorImpl::InvalidStringCharacter {
                                character: String::from("\\0"),
                            },
                            lexer.position(),
                        ))
                    }
                    // Covers `\"`, `\\` and an escaped newline
                    other => result.push(other),
                }
                lexer.advance_n(escaped.len_utf8());
            }
            _ => {
                result.push(ch);
                lexer.advance_n(ch.len_utf8());
            }
        }
    }

    lexer.push(MK_TOKEN!(
        TokenKind::String,
        result,
        Span {
            start,
            end: lexer.position()
        }
    ));
    Ok(())
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let start = lexer.position();
    let len = lexer.matched_len(regex);
    let value = lexer.remainder()[..len].to_string();
    lexer.advance_n(len);

    let span = Span {
        start,
        end: lexer.position(),
    };

    let lowered = value.to_ascii_lowercase();
    let starts_lower = value.starts_with(|c: char| c.is_ascii_lowercase() || c == '_');

    let kind = match RESERVED_LOOKUP.get(lowered.as_str()) {
        Some(TokenKind::True | TokenKind::False) if !starts_lower => None,
        Some(kind) => Some(*kind),
        None => None,
    };

    let kind = kind.unwrap_or(if starts_lower {
        TokenKind::ObjectIdentifier
    } else {
        TokenKind::TypeIdentifier
    });

    lexer.push(MK_TOKEN!(kind, value, span));
    Ok(())
}

pub fn tokenize(source: String, file: Option<String>) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::new(source, file);

    while !lex.at_eof() {
        let pattern = PATTERNS
            .iter()
            .find(|pattern| pattern.regex.is_match(lex.remainder()));

        match pattern {
            Some(pattern) => (pattern.handler)(&mut lex, &pattern.regex)?,
            None => {
                let token = lex.at().map(String::from).unwrap_or_default();
                return Err(Error::new(
                    ErrorImpl::UnrecognisedToken { token },
                    lex.position(),
                ));
            }
        }
    }

    let end = lex.position();
    lex.push(MK_TOKEN!(
        TokenKind::EOF,
        String::from("EOF"),
        Span {
            start: end.clone(),
            end
        }
    ));
    Ok(lex.tokens)
}
