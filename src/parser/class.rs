use crate::{
    ast::ast::{AttributeDecl, ClassDecl, Feature, Formal, MethodDecl},
    errors::errors::Error,
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
    Span,
};

use super::parser::Parser;

/// `class Name [inherits Parent] { feature; ... }`
pub fn parse_class(parser: &mut Parser) -> Result<ClassDecl, Error> {
    let start = parser.expect(TokenKind::Class)?.span.start;
    let name = parser.expect(TokenKind::TypeIdentifier)?.value;

    let parent = if parser.current_token_kind() == TokenKind::Inherits {
        parser.advance();
        Some(parser.expect(TokenKind::TypeIdentifier)?.value)
    } else {
        None
    };

    parser.expect(TokenKind::OpenCurly)?;

    let mut features = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseCurly {
        features.push(parse_feature(parser)?);
        parser.expect(TokenKind::Semicolon)?;
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(ClassDecl {
        name,
        parent,
        features,
        span: Span {
            start,
            end: parser.previous_end(),
        },
    })
}

pub fn parse_feature(parser: &mut Parser) -> Result<Feature, Error> {
    if parser.peek_kind(1) == TokenKind::OpenParen {
        parse_method(parser).map(Feature::Method)
    } else {
        parse_attribute(parser).map(Feature::Attribute)
    }
}

fn parse_method(parser: &mut Parser) -> Result<MethodDecl, Error> {
    let name_token = parser.expect(TokenKind::ObjectIdentifier)?;
    parser.expect(TokenKind::OpenParen)?;

    let mut formals = Vec::new();
    if parser.current_token_kind() != TokenKind::CloseParen {
        loop {
            let formal_token = parser.expect(TokenKind::ObjectIdentifier)?;
            parser.expect(TokenKind::Colon)?;
            let type_name = parser.expect(TokenKind::TypeIdentifier)?.value;
            formals.push(Formal {
                name: formal_token.value,
                type_name,
                span: Span {
                    start: formal_token.span.start,
                    end: parser.previous_end(),
                },
            });

            if parser.current_token_kind() == TokenKind::Comma {
                parser.advance();
            } else {
                break;
            }
        }
    }

    parser.expect(TokenKind::CloseParen)?;
    parser.expect(TokenKind::Colon)?;
    let return_type = parser.expect(TokenKind::TypeIdentifier)?.value;

    parser.expect(TokenKind::OpenCurly)?;
    let body = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseCurly)?;

    Ok(MethodDecl {
        name: name_token.value,
        formals,
        return_type,
        body,
        span: Span {
            start: name_token.span.start,
            end: parser.previous_end(),
        },
    })
}

fn parse_attribute(parser: &mut Parser) -> Result<AttributeDecl, Error> {
    let name_token = parser.expect(TokenKind::ObjectIdentifier)?;
    parser.expect(TokenKind::Colon)?;
    let type_name = parser.expect(TokenKind::TypeIdentifier)?.value;

    let init = if parser.current_token_kind() == TokenKind::Assign {
        parser.advance();
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    Ok(AttributeDecl {
        name: name_token.value,
        type_name,
        init,
        span: Span {
            start: name_token.span.start,
            end: parser.previous_end(),
        },
    })
}
