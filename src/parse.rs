// SPDX: CC0-1.0

// shunting yard (see https://en.wikipedia.org/wiki/Shunting_yard_algorithm), reducing
// into syntax tree nodes instead of emitting reverse polish notation

use crate::{
    eval::{Associativity, Expr, ExprTyp, Fun, OperatorTyp},
    lex::{LexErr, LexErrTyp, Lexer, SubStr, Tok, TokTyp},
    stdlib::{Ident, Idents},
    Number,
};
use core::{fmt, num::ParseFloatError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompileErrTyp {
    Empty,
    LexErr(LexErrTyp),
    ParseNum(ParseFloatError),
    ParenMismatch,
    ExpectedOperand,
    ExpectedOperator,
    UnexpectedEnd,
    UndefinedIdent,
    MissingCall,
    MisplacedComma,
    Arity {
        name: &'static str,
        arity: usize,
        found: usize,
    },
}

impl fmt::Display for CompileErrTyp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "cannot compile empty expression"),
            Self::LexErr(err) => write!(f, "{err}"),
            Self::ParseNum(err) => write!(f, "invalid number: {err}"),
            Self::ParenMismatch => write!(f, "mismatched parentheses"),
            Self::ExpectedOperand => write!(f, "expected a value but found an operator"),
            Self::ExpectedOperator => write!(f, "expected an operator but found a value"),
            Self::UnexpectedEnd => write!(f, "expression ends unexpectedly"),
            Self::UndefinedIdent => write!(f, "undefined identifier"),
            Self::MissingCall => write!(f, "function name must be followed by '('"),
            Self::MisplacedComma => write!(f, "comma outside of a function call"),
            Self::Arity { name, arity, found } => write!(
                f,
                "function '{name}' requires {arity} argument{s}, but found {found}",
                s = if *arity == 1 { "" } else { "s" }
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileError {
    pub typ: CompileErrTyp,
    pub loc: SubStr,
}

impl CompileError {
    const fn new(typ: CompileErrTyp, loc: SubStr) -> Self {
        Self { typ, loc }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.typ {
            CompileErrTyp::Empty | CompileErrTyp::UnexpectedEnd => write!(f, "{}", self.typ),
            _ => write!(f, "{} at '{}'", self.typ, self.loc),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<LexErr> for CompileError {
    fn from(err: LexErr) -> Self {
        Self::new(CompileErrTyp::LexErr(err.typ), err.loc)
    }
}

#[derive(Clone, Debug)]
enum ShuntOpTyp {
    Operator(OperatorTyp),
    Fun(Fun),
    OpenParen { call: bool, commas: usize },
}

#[derive(Clone, Debug)]
struct ShuntOp {
    typ: ShuntOpTyp,
    loc: SubStr,
}

struct Parser<'a> {
    idents: &'a Idents,
    out: Vec<Expr>,    // operands
    ops: Vec<ShuntOp>, // operator stack
    expect_operand: bool,
    pending_call: Option<SubStr>, // function name still waiting for its '('
}

impl Parser<'_> {
    fn pop_operand(&mut self, at: &SubStr) -> Result<Expr, CompileError> {
        self.out
            .pop()
            .ok_or_else(|| CompileError::new(CompileErrTyp::ExpectedOperand, at.clone()))
    }

    fn reduce(&mut self, op: ShuntOp) -> Result<(), CompileError> {
        let expr = match op.typ {
            ShuntOpTyp::Operator(typ) if typ.is_prefix() => {
                let arg = self.pop_operand(&op.loc)?;
                Expr {
                    loc: op.loc.join(&arg.loc),
                    typ: ExprTyp::Unary {
                        op: typ,
                        arg: Box::new(arg),
                    },
                }
            }
            ShuntOpTyp::Operator(typ) => {
                let rhs = self.pop_operand(&op.loc)?;
                let lhs = self.pop_operand(&op.loc)?;
                Expr {
                    loc: lhs.loc.join(&rhs.loc),
                    typ: ExprTyp::Binary {
                        op: typ,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    },
                }
            }
            ShuntOpTyp::Fun(_) | ShuntOpTyp::OpenParen { .. } => {
                return Err(CompileError::new(CompileErrTyp::ParenMismatch, op.loc));
            }
        };
        self.out.push(expr);
        Ok(())
    }

    /// Reduce operators until the innermost open parenthesis, which is left on the stack.
    fn reduce_to_paren(&mut self) -> Result<(), CompileError> {
        while let Some(op) = self.ops.last() {
            if let ShuntOpTyp::OpenParen { .. } = op.typ {
                break;
            }
            if let Some(op) = self.ops.pop() {
                self.reduce(op)?;
            }
        }
        Ok(())
    }

    fn push_operand(&mut self, expr: Expr) -> Result<(), CompileError> {
        if !self.expect_operand {
            return Err(CompileError::new(CompileErrTyp::ExpectedOperator, expr.loc));
        }
        self.out.push(expr);
        self.expect_operand = false;
        Ok(())
    }

    fn operator(&mut self, o1: OperatorTyp, loc: SubStr) -> Result<(), CompileError> {
        let o1 = match (self.expect_operand, o1) {
            // leading '+' changes nothing
            (true, OperatorTyp::Add) => return Ok(()),
            (true, OperatorTyp::Sub) => OperatorTyp::Neg,
            (true, _) => return Err(CompileError::new(CompileErrTyp::ExpectedOperand, loc)),
            (false, op) => op,
        };

        if !o1.is_prefix() {
            while let Some(ShuntOp {
                typ: ShuntOpTyp::Operator(o2),
                ..
            }) = self.ops.last()
            {
                let o2 = *o2;
                if (o2.precedence() > o1.precedence())
                    || ((o1.precedence() == o2.precedence())
                        && (o1.associativity() == Associativity::Left))
                {
                    if let Some(op) = self.ops.pop() {
                        self.reduce(op)?;
                    }
                } else {
                    break;
                }
            }
        }

        self.ops.push(ShuntOp {
            typ: ShuntOpTyp::Operator(o1),
            loc,
        });
        self.expect_operand = true;
        Ok(())
    }

    fn ident(&mut self, loc: SubStr) -> Result<(), CompileError> {
        let ident = self.idents.get(loc.get()).copied();
        match ident {
            Some(Ident::Var(var)) => self.push_operand(Expr {
                typ: ExprTyp::Variable(var),
                loc,
            }),
            Some(Ident::Const(val)) => self.push_operand(Expr {
                typ: ExprTyp::Number(val),
                loc,
            }),
            Some(Ident::Fun(fun)) => {
                if !self.expect_operand {
                    return Err(CompileError::new(CompileErrTyp::ExpectedOperator, loc));
                }
                self.ops.push(ShuntOp {
                    typ: ShuntOpTyp::Fun(fun),
                    loc: loc.clone(),
                });
                self.pending_call = Some(loc);
                Ok(())
            }
            None => Err(CompileError::new(CompileErrTyp::UndefinedIdent, loc)),
        }
    }

    fn open_paren(&mut self, loc: SubStr) -> Result<(), CompileError> {
        if !self.expect_operand {
            return Err(CompileError::new(CompileErrTyp::ExpectedOperator, loc));
        }
        let call = self.pending_call.take().is_some();
        self.ops.push(ShuntOp {
            typ: ShuntOpTyp::OpenParen { call, commas: 0 },
            loc,
        });
        Ok(())
    }

    fn comma(&mut self, loc: SubStr) -> Result<(), CompileError> {
        if self.expect_operand {
            return Err(CompileError::new(CompileErrTyp::ExpectedOperand, loc));
        }
        self.reduce_to_paren()?;
        match self.ops.last_mut() {
            Some(ShuntOp {
                typ: ShuntOpTyp::OpenParen { call: true, commas },
                ..
            }) => *commas += 1,
            _ => return Err(CompileError::new(CompileErrTyp::MisplacedComma, loc)),
        }
        self.expect_operand = true;
        Ok(())
    }

    fn close_paren(&mut self, loc: SubStr) -> Result<(), CompileError> {
        // `f()`: nothing was pushed since the call's paren
        let empty_call = self.expect_operand
            && matches!(
                self.ops.last(),
                Some(ShuntOp {
                    typ: ShuntOpTyp::OpenParen {
                        call: true,
                        commas: 0
                    },
                    ..
                })
            );
        if self.expect_operand && !empty_call {
            return Err(CompileError::new(CompileErrTyp::ExpectedOperand, loc));
        }

        self.reduce_to_paren()?;
        let (call, commas) = match self.ops.pop() {
            Some(ShuntOp {
                typ: ShuntOpTyp::OpenParen { call, commas },
                ..
            }) => (call, commas),
            _ => return Err(CompileError::new(CompileErrTyp::ParenMismatch, loc)),
        };

        if call {
            let Some(ShuntOp {
                typ: ShuntOpTyp::Fun(fun),
                loc: name_loc,
            }) = self.ops.pop()
            else {
                return Err(CompileError::new(CompileErrTyp::ParenMismatch, loc));
            };
            let call_loc = name_loc.join(&loc);
            let found = if empty_call { 0 } else { commas + 1 };
            if found != fun.arity || found > self.out.len() {
                return Err(CompileError::new(
                    CompileErrTyp::Arity {
                        name: fun.name,
                        arity: fun.arity,
                        found,
                    },
                    call_loc,
                ));
            }
            let args = self.out.split_off(self.out.len() - found);
            self.out.push(Expr {
                typ: ExprTyp::Call { fun, args },
                loc: call_loc,
            });
        }

        self.expect_operand = false;
        Ok(())
    }

    fn token(&mut self, tok: Tok) -> Result<(), CompileError> {
        if let Some(name) = self.pending_call.clone() {
            if tok.typ != TokTyp::OpenParen {
                return Err(CompileError::new(CompileErrTyp::MissingCall, name));
            }
        }

        match tok.typ {
            TokTyp::Number => {
                let num: Number = tok.loc.get().parse().map_err(|err| {
                    CompileError::new(CompileErrTyp::ParseNum(err), tok.loc.clone())
                })?;
                self.push_operand(Expr {
                    typ: ExprTyp::Number(num),
                    loc: tok.loc,
                })
            }
            TokTyp::Ident => self.ident(tok.loc),
            TokTyp::Op(op) => self.operator(op, tok.loc),
            TokTyp::Comma => self.comma(tok.loc),
            TokTyp::OpenParen => self.open_paren(tok.loc),
            TokTyp::CloseParen => self.close_paren(tok.loc),
        }
    }

    fn finish(mut self, end: SubStr) -> Result<Expr, CompileError> {
        if let Some(name) = self.pending_call.take() {
            return Err(CompileError::new(CompileErrTyp::MissingCall, name));
        }
        if self.expect_operand {
            let typ = if self.out.is_empty() && self.ops.is_empty() {
                CompileErrTyp::Empty
            } else {
                CompileErrTyp::UnexpectedEnd
            };
            return Err(CompileError::new(typ, end));
        }

        while let Some(op) = self.ops.pop() {
            self.reduce(op)?;
        }

        match (self.out.pop(), self.out.is_empty()) {
            (Some(root), true) => Ok(root),
            (Some(root), false) => Err(CompileError::new(CompileErrTyp::ExpectedOperator, root.loc)),
            (None, _) => Err(CompileError::new(CompileErrTyp::Empty, end)),
        }
    }
}

pub fn parse(lex: Lexer<'_>, idents: &Idents) -> Result<Expr, CompileError> {
    let end = SubStr::end(lex.src());
    let mut parser = Parser {
        idents,
        out: Vec::new(),
        ops: Vec::new(),
        expect_operand: true,
        pending_call: None,
    };

    for tok in lex {
        parser.token(tok?)?;
    }

    parser.finish(end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{eval::Var, lex::Unsupported, stdlib::standard_idents, Point};
    use std::sync::Arc;

    fn parse_str(src: &str) -> Result<Expr, CompileError> {
        let src = Arc::new(src.to_string());
        parse(Lexer::new(&src), &standard_idents())
    }

    fn at(src: &str, x: Number, y: Number) -> Number {
        parse_str(src).unwrap().eval(Point { x, y })
    }

    fn err(src: &str) -> CompileError {
        parse_str(src).unwrap_err()
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(at("1 + 2 * 3", 0.0, 0.0), 7.0);
        assert_eq!(at("(1 + 2) * 3", 0.0, 0.0), 9.0);
        assert_eq!(at("8 / 4 / 2", 0.0, 0.0), 1.0);
        assert_eq!(at("10 - 4 - 3", 0.0, 0.0), 3.0);
        assert_eq!(at("2 ^ 3 ^ 2", 0.0, 0.0), 512.0);
    }

    #[test]
    fn scientific_literals() {
        assert_eq!(at("1e-3", 0.0, 0.0), 0.001);
        assert_eq!(at("2.5e2 * x - y", 2.0, 1.0), 499.0);
        assert_eq!(at("2*e", 0.0, 0.0), 2.0 * core::f64::consts::E);
        assert_eq!(err("2e").typ, CompileErrTyp::ExpectedOperator);
    }

    #[test]
    fn negation_binds_looser_than_power() {
        assert_eq!(at("-x^2", 3.0, 0.0), -9.0);
        assert_eq!(at("-x*y", 2.0, 3.0), -6.0);
        assert_eq!(at("2^-1", 0.0, 0.0), 0.5);
        assert_eq!(at("x--y", 1.0, 2.0), 3.0);
        assert_eq!(at("+x", 4.0, 0.0), 4.0);
    }

    #[test]
    fn subtraction_without_spaces() {
        assert_eq!(at("x*x+y*y-4", 2.0, 0.0), 0.0);
        assert_eq!(at("y*y -4", 0.0, 1.0), -3.0);
    }

    #[test]
    fn variables_and_constants_resolve() {
        let expr = parse_str("x").unwrap();
        assert_eq!(expr.typ, ExprTyp::Variable(Var::X));
        let expr = parse_str("e").unwrap();
        assert_eq!(expr.typ, ExprTyp::Number(core::f64::consts::E));
    }

    #[test]
    fn atan_is_not_tan() {
        let expr = parse_str("atan(x)").unwrap();
        match &expr.typ {
            ExprTyp::Call { fun, args } => {
                assert_eq!(fun.name, "atan");
                assert_eq!(args.len(), 1);
            }
            other => panic!("expected call, got {other:?}"),
        }
        assert!((at("atan(1)", 0.0, 0.0) - core::f64::consts::FRAC_PI_4).abs() < 1e-15);
    }

    #[test]
    fn every_unary_builtin_calls_through() {
        let x: Number = 0.7;
        for (src, want) in [
            ("sin(x)", x.sin()),
            ("cos(x)", x.cos()),
            ("tan(x)", x.tan()),
            ("atan(x)", x.atan()),
            ("abs(-x)", x),
            ("sqrt(x)", x.sqrt()),
            ("ceil(x)", 1.0),
            ("ln(x)", x.ln()),
        ] {
            assert_eq!(at(src, x, 0.0), want, "{src}");
        }
        assert_eq!(at("sqrt(x * 2 + 2)", 1.0, 0.0), 2.0);
        assert_eq!(at("cos(sin(0))", 0.0, 0.0), 1.0);
        assert_eq!(err("sin(x +)").typ, CompileErrTyp::ExpectedOperand);
    }

    #[test]
    fn names_containing_e_are_not_mangled() {
        // `ceil` and `sqrt` are fine even though they contain letters of other aliases
        assert_eq!(at("ceil(x) + 0 * e", 1.2, 0.0), 2.0);
        assert_eq!(err("exp(x)").typ, CompileErrTyp::UndefinedIdent);
    }

    #[test]
    fn nested_calls() {
        assert_eq!(at("sqrt(abs(x - 10))", 1.0, 0.0), 3.0);
        assert!(at("ln(sqrt(x))", -1.0, 0.0).is_nan());
        let r = at("random()", 0.0, 0.0);
        assert!((0.0..1.0).contains(&r));
    }

    #[test]
    fn malformed_operator_sequence() {
        let e = err("x +* y");
        assert_eq!(e.typ, CompileErrTyp::ExpectedOperand);
        assert_eq!(e.loc.get(), "*");
        assert_eq!(e.loc.start(), 3);
    }

    #[test]
    fn implicit_multiplication_rejected() {
        assert_eq!(err("2x").typ, CompileErrTyp::ExpectedOperator);
        assert_eq!(err("2(x)").typ, CompileErrTyp::ExpectedOperator);
        assert_eq!(err("(x)(y)").typ, CompileErrTyp::ExpectedOperator);
    }

    #[test]
    fn parens_must_match() {
        assert_eq!(err("(x + 1").typ, CompileErrTyp::ParenMismatch);
        assert_eq!(err("x + 1)").typ, CompileErrTyp::ParenMismatch);
        assert_eq!(err("()").typ, CompileErrTyp::ExpectedOperand);
    }

    #[test]
    fn end_of_input() {
        assert_eq!(err("").typ, CompileErrTyp::Empty);
        assert_eq!(err("   ").typ, CompileErrTyp::Empty);
        assert_eq!(err("x +").typ, CompileErrTyp::UnexpectedEnd);
    }

    #[test]
    fn function_arity_checked() {
        let e = err("sin()");
        assert_eq!(
            e.typ,
            CompileErrTyp::Arity {
                name: "sin",
                arity: 1,
                found: 0
            }
        );
        assert_eq!(e.loc.get(), "sin()");
        assert!(matches!(
            err("random(x)").typ,
            CompileErrTyp::Arity { found: 1, .. }
        ));
        assert!(matches!(
            err("cos(x, y)").typ,
            CompileErrTyp::Arity { found: 2, .. }
        ));
    }

    #[test]
    fn function_needs_parens() {
        let e = err("sin x");
        assert_eq!(e.typ, CompileErrTyp::MissingCall);
        assert_eq!(e.loc.get(), "sin");
        assert_eq!(err("x + sin").typ, CompileErrTyp::MissingCall);
    }

    #[test]
    fn commas_only_in_calls() {
        assert_eq!(err("x, y").typ, CompileErrTyp::MisplacedComma);
        assert_eq!(err("(x, y)").typ, CompileErrTyp::MisplacedComma);
    }

    #[test]
    fn bad_numbers_and_chars() {
        assert!(matches!(err("1.2.3").typ, CompileErrTyp::ParseNum(_)));
        assert_eq!(
            err("x = y").typ,
            CompileErrTyp::LexErr(LexErrTyp::Unsupported(Unsupported::Equals))
        );
        assert_eq!(err("x # y").typ, CompileErrTyp::LexErr(LexErrTyp::InvalidChar));
    }

    #[test]
    fn node_spans_cover_source() {
        let expr = parse_str("sin(x) + 1").unwrap();
        assert_eq!(expr.loc.get(), "sin(x) + 1");
        assert_eq!(expr.size(), 4);
    }
}
