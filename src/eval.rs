// SPDX: CC0-1.0

use crate::{lex::SubStr, Number, Point};
use core::fmt;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperatorTyp {
    Neg,
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
}

impl OperatorTyp {
    pub const fn precedence(&self) -> i8 {
        match self {
            Self::Add => 2,
            Self::Sub => 2,
            Self::Mul => 3,
            Self::Div => 3,
            Self::Neg => 4,
            Self::Pow => 5,
        }
    }

    pub const fn associativity(&self) -> Associativity {
        use Associativity::{Left, Right};
        match self {
            Self::Neg => Right,
            Self::Add => Left,
            Self::Sub => Left,
            Self::Mul => Left,
            Self::Div => Left,
            Self::Pow => Right,
        }
    }

    pub const fn is_prefix(&self) -> bool {
        matches!(self, Self::Neg)
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Neg => "neg",
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Pow => "pow",
        }
    }

    pub const fn symbol(&self) -> char {
        match self {
            Self::Neg | Self::Sub => '-',
            Self::Add => '+',
            Self::Mul => '*',
            Self::Div => '/',
            Self::Pow => '^',
        }
    }

    pub fn apply_binary(&self, lhs: Number, rhs: Number) -> Number {
        match self {
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul => lhs * rhs,
            Self::Div => lhs / rhs,
            Self::Pow => lhs.powf(rhs),
            Self::Neg => Number::NAN,
        }
    }
}

/// Largest arity of any builtin; arguments are evaluated into a fixed buffer of this size.
pub const MAX_ARITY: usize = 1;

#[derive(Clone, Copy)]
pub struct Fun {
    pub name: &'static str,
    pub arity: usize,
    pub fun: fn(&[Number]) -> Number,
}

impl Fun {
    pub const fn new(name: &'static str, arity: usize, fun: fn(&[Number]) -> Number) -> Self {
        Self { name, arity, fun }
    }
}

impl fmt::Debug for Fun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fun")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

impl PartialEq for Fun {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.arity == other.arity
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Var {
    X,
    Y,
}

impl Var {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprTyp {
    Number(Number),
    Variable(Var),
    Unary {
        op: OperatorTyp,
        arg: Box<Expr>,
    },
    Binary {
        op: OperatorTyp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        fun: Fun,
        args: Vec<Expr>,
    },
}

/// Node of the syntax tree together with the text it was parsed from.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub typ: ExprTyp,
    pub loc: SubStr,
}

impl Expr {
    pub fn eval(&self, p: Point<Number>) -> Number {
        match &self.typ {
            ExprTyp::Number(val) => *val,
            ExprTyp::Variable(Var::X) => p.x,
            ExprTyp::Variable(Var::Y) => p.y,
            ExprTyp::Unary { op, arg } => match op {
                OperatorTyp::Neg => -arg.eval(p),
                _ => Number::NAN,
            },
            ExprTyp::Binary { op, lhs, rhs } => op.apply_binary(lhs.eval(p), rhs.eval(p)),
            ExprTyp::Call { fun, args } => {
                let mut buf = [Number::NAN; MAX_ARITY];
                for (slot, arg) in buf.iter_mut().zip(args) {
                    *slot = arg.eval(p);
                }
                (fun.fun)(&buf[..fun.arity.min(MAX_ARITY)])
            }
        }
    }

    /// Number of nodes in the tree rooted here.
    pub fn size(&self) -> usize {
        1 + match &self.typ {
            ExprTyp::Number(_) | ExprTyp::Variable(_) => 0,
            ExprTyp::Unary { arg, .. } => arg.size(),
            ExprTyp::Binary { lhs, rhs, .. } => lhs.size() + rhs.size(),
            ExprTyp::Call { args, .. } => args.iter().map(Expr::size).sum(),
        }
    }

    fn dump(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match &self.typ {
            ExprTyp::Number(val) => writeln!(f, "{indent}number {val}"),
            ExprTyp::Variable(var) => writeln!(f, "{indent}variable {}", var.name()),
            ExprTyp::Unary { op, arg } => {
                writeln!(f, "{indent}unary '{}'", op.name())?;
                arg.dump(f, depth + 1)
            }
            ExprTyp::Binary { op, lhs, rhs } => {
                writeln!(f, "{indent}binary '{}'", op.name())?;
                lhs.dump(f, depth + 1)?;
                rhs.dump(f, depth + 1)
            }
            ExprTyp::Call { fun, args } => {
                writeln!(f, "{indent}call '{}'", fun.name)?;
                for arg in args {
                    arg.dump(f, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}

/// Compiled form of f(x, y). Holds no state between calls.
#[derive(Clone, Debug)]
pub struct Evaluator {
    root: Expr,
    src: Arc<String>,
}

impl Evaluator {
    pub fn new(root: Expr, src: Arc<String>) -> Self {
        Self { root, src }
    }

    /// Evaluate at a math-space point. Undefined results (domain errors) come back as NaN.
    #[inline]
    pub fn eval(&self, p: Point<Number>) -> Number {
        self.root.eval(p)
    }

    pub fn root(&self) -> &Expr {
        &self.root
    }

    pub fn src(&self) -> &str {
        &self.src
    }
}

impl fmt::Display for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.dump(f, 0)
    }
}
