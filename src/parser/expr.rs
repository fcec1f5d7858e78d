use crate::{
    ast::expressions::{BinaryOp, CaseBranch, Expr, ExprKind, LetBinding, UnaryOp},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    Position, Span,
};

use super::{lookups::BindingPower, parser::Parser};

fn span_from(parser: &Parser, start: Position) -> Span {
    Span {
        start,
        end: parser.previous_end(),
    }
}

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_nud_lookup().get(&token_kind).copied() else {
        return Err(parser.unexpected());
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let token_kind = parser.current_token_kind();
        let next_bp = *parser
            .get_bp_lookup()
            .get(&token_kind)
            .unwrap_or(&BindingPower::Default);
        if next_bp <= bp {
            break;
        }

        let Some(led) = parser.get_led_lookup().get(&token_kind).copied() else {
            return Err(parser.unexpected());
        };
        left = led(parser, left, next_bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.advance();
    let kind = match token.kind {
        TokenKind::Integer => match token.value.parse() {
            Ok(value) => ExprKind::Int(value),
            Err(_) => {
                return Err(Error::new(
                    ErrorImpl::NumberParseError { token: token.value },
                    token.span.start,
                ))
            }
        },
        TokenKind::String => ExprKind::Str(token.value),
        TokenKind::True => ExprKind::Bool(true),
        TokenKind::False => ExprKind::Bool(false),
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: token.to_string(),
                },
                token.span.start,
            ))
        }
    };

    Ok(Expr::new(kind, token.span))
}

/// `id`, `self`, `id <- expr` or the implicit-self dispatch `id(args)`.
pub fn parse_identifier_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.advance();
    let start = token.span.start.clone();

    match parser.current_token_kind() {
        TokenKind::OpenParen => {
            let arguments = parse_arguments(parser)?;
            Ok(Expr::new(
                ExprKind::Dispatch {
                    receiver: None,
                    static_type: None,
                    method: token.value,
                    arguments,
                },
                span_from(parser, start),
            ))
        }
        TokenKind::Assign => {
            parser.advance();
            let value = parse_expr(parser, BindingPower::Default)?;
            Ok(Expr::new(
                ExprKind::Assign {
                    name: token.value,
                    value: Box::new(value),
                },
                span_from(parser, start),
            ))
        }
        _ if token.value == "self" => Ok(Expr::new(ExprKind::SelfRef, token.span)),
        _ => Ok(Expr::new(ExprKind::Identifier(token.value), token.span)),
    }
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance();
    let operator = match operator_token.kind {
        TokenKind::Plus => BinaryOp::Plus,
        TokenKind::Dash => BinaryOp::Minus,
        TokenKind::Star => BinaryOp::Times,
        TokenKind::Slash => BinaryOp::Divide,
        TokenKind::Less => BinaryOp::Less,
        TokenKind::LessEquals => BinaryOp::LessEquals,
        TokenKind::Equals => BinaryOp::Equals,
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: operator_token.to_string(),
                },
                operator_token.span.start,
            ))
        }
    };

    let right = parse_expr(parser, bp)?;

    // Comparisons do not associate: `a < b < c` is rejected
    if bp == BindingPower::Relational
        && matches!(
            parser.current_token_kind(),
            TokenKind::Less | TokenKind::LessEquals | TokenKind::Equals
        )
    {
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().to_string(),
                message: String::from("comparison operators cannot be chained"),
            },
            parser.get_position(),
        ));
    }

    let span = Span {
        start: left.get_span().start.clone(),
        end: right.get_span().end.clone(),
    };

    Ok(Expr::new(
        ExprKind::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    ))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let operator_token = parser.advance();
    let start = operator_token.span.start.clone();

    let kind = match operator_token.kind {
        TokenKind::Tilde => ExprKind::Unary {
            operator: UnaryOp::Negate,
            operand: Box::new(parse_expr(parser, BindingPower::Negate)?),
        },
        TokenKind::Not => ExprKind::Unary {
            operator: UnaryOp::Not,
            operand: Box::new(parse_expr(parser, BindingPower::Not)?),
        },
        TokenKind::IsVoid => ExprKind::IsVoid(Box::new(parse_expr(parser, BindingPower::IsVoid)?)),
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: operator_token.to_string(),
                },
                start,
            ))
        }
    };

    Ok(Expr::new(kind, span_from(parser, start)))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

fn parse_arguments(parser: &mut Parser) -> Result<Vec<Expr>, Error> {
    parser.expect(TokenKind::OpenParen)?;

    let mut args = vec![];
    if parser.current_token_kind() != TokenKind::CloseParen {
        loop {
            args.push(parse_expr(parser, BindingPower::Default)?);
            if parser.current_token_kind() == TokenKind::Comma {
                parser.advance();
            } else {
                break;
            }
        }
    }

    parser.expect(TokenKind::CloseParen)?;
    Ok(args)
}

/// `receiver.method(args)`
pub fn parse_dispatch_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.expect(TokenKind::Dot)?;
    let method = parser.expect(TokenKind::ObjectIdentifier)?.value;
    let arguments = parse_arguments(parser)?;
    let start = left.get_span().start.clone();

    Ok(Expr::new(
        ExprKind::Dispatch {
            receiver: Some(Box::new(left)),
            static_type: None,
            method,
            arguments,
        },
        span_from(parser, start),
    ))
}

/// `receiver@Type.method(args)`
pub fn parse_static_dispatch_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.expect(TokenKind::At)?;
    let static_type = parser.expect(TokenKind::TypeIdentifier)?.value;
    parser.expect(TokenKind::Dot)?;
    let method = parser.expect(TokenKind::ObjectIdentifier)?.value;
    let arguments = parse_arguments(parser)?;
    let start = left.get_span().start.clone();

    Ok(Expr::new(
        ExprKind::Dispatch {
            receiver: Some(Box::new(left)),
            static_type: Some(static_type),
            method,
            arguments,
        },
        span_from(parser, start),
    ))
}

pub fn parse_new_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start;
    let type_name = parser.expect(TokenKind::TypeIdentifier)?.value;

    Ok(Expr::new(ExprKind::New(type_name), span_from(parser, start)))
}

pub fn parse_if_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start;

    let condition = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Then)?;
    let then_branch = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Else)?;
    let else_branch = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Fi)?;

    Ok(Expr::new(
        ExprKind::If {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        },
        span_from(parser, start),
    ))
}

pub fn parse_while_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start;

    let condition = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Loop)?;
    let body = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Pool)?;

    Ok(Expr::new(
        ExprKind::While {
            condition: Box::new(condition),
            body: Box::new(body),
        },
        span_from(parser, start),
    ))
}

pub fn parse_block_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start;

    let mut body = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseCurly {
        body.push(parse_expr(parser, BindingPower::Default)?);
        parser.expect(TokenKind::Semicolon)?;
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(Expr::new(ExprKind::Block(body), span_from(parser, start)))
}

/// `let a : A [<- e], b : B [<- e] in body`
pub fn parse_let_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start;

    let mut bindings = Vec::new();
    loop {
        let name_token = parser.expect(TokenKind::ObjectIdentifier)?;
        parser.expect(TokenKind::Colon)?;
        let type_name = parser.expect(TokenKind::TypeIdentifier)?.value;

        let init = if parser.current_token_kind() == TokenKind::Assign {
            parser.advance();
            Some(parse_expr(parser, BindingPower::Default)?)
        } else {
            None
        };

        bindings.push(LetBinding {
            name: name_token.value,
            type_name,
            init,
            span: span_from(parser, name_token.span.start),
        });

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else {
            break;
        }
    }

    parser.expect(TokenKind::In)?;
    let body = parse_expr(parser, BindingPower::Default)?;

    Ok(Expr::new(
        ExprKind::Let {
            bindings,
            body: Box::new(body),
        },
        span_from(parser, start),
    ))
}

/// `case e of id : T => e; ... esac`
pub fn parse_case_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start;

    let scrutinee = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Of)?;

    let mut branches = Vec::new();
    while parser.current_token_kind() != TokenKind::Esac {
        let name_token = parser.expect(TokenKind::ObjectIdentifier)?;
        parser.expect(TokenKind::Colon)?;
        let type_name = parser.expect(TokenKind::TypeIdentifier)?.value;
        parser.expect(TokenKind::DArrow)?;
        let body = parse_expr(parser, BindingPower::Default)?;
        parser.expect(TokenKind::Semicolon)?;

        branches.push(CaseBranch {
            name: name_token.value,
            type_name,
            body,
            span: span_from(parser, name_token.span.start),
        });
    }

    if branches.is_empty() {
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().to_string(),
                message: String::from("case needs at least one branch"),
            },
            parser.get_position(),
        ));
    }

    parser.expect(TokenKind::Esac)?;

    Ok(Expr::new(
        ExprKind::Case {
            scrutinee: Box::new(scrutinee),
            branches,
        },
        span_from(parser, start),
    ))
}
