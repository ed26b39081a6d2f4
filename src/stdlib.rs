// SPDX: CC0-1.0

use crate::{
    eval::{Fun, Var},
    Number,
};
use core::f64::consts; // assumes Number = f64
use std::collections::HashMap;

pub const X: &str = "x";
pub const Y: &str = "y";

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Ident {
    Var(Var),
    Const(Number),
    Fun(Fun),
}

impl Ident {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Var(_) => "variable",
            Self::Const(_) => "constant",
            Self::Fun(_) => "function",
        }
    }
}

pub type Idents = HashMap<&'static str, Ident>;

pub fn standard_idents() -> Idents {
    let mut ret = HashMap::new();

    ret.insert(X, Ident::Var(Var::X));
    ret.insert(Y, Ident::Var(Var::Y));

    for fun in [
        Fun::new("sin", 1, sin),
        Fun::new("cos", 1, cos),
        Fun::new("tan", 1, tan),
        Fun::new("atan", 1, arctan),
        Fun::new("abs", 1, abs),
        Fun::new("sqrt", 1, sqrt),
        Fun::new("ceil", 1, ceil),
        Fun::new("ln", 1, ln),
        Fun::new("random", 0, random),
    ] {
        ret.insert(fun.name, Ident::Fun(fun));
    }

    ret.insert("e", Ident::Const(consts::E));
    ret
}

/// Closest known name to `text`, if any is similar enough to be worth suggesting.
pub fn most_similar<'a>(idents: &'a Idents, text: &str) -> Option<(&'static str, &'a Ident)> {
    let text = text.to_ascii_lowercase();
    idents
        .iter()
        .map(|(name, ident)| {
            (
                strsim::normalized_damerau_levenshtein(&text, name),
                (*name, ident),
            )
        })
        .filter(|(sim, _)| *sim > 0.3)
        // on a tie the alphabetically first name wins, whatever the table order
        .max_by(|(a, (a_name, _)), (b, (b_name, _))| {
            a.total_cmp(b).then_with(|| b_name.cmp(a_name))
        })
        .map(|(_, found)| found)
}

pub fn sin(args: &[Number]) -> Number {
    let &[x] = args else { return Number::NAN };
    x.sin()
}

pub fn cos(args: &[Number]) -> Number {
    let &[x] = args else { return Number::NAN };
    x.cos()
}

pub fn tan(args: &[Number]) -> Number {
    let &[x] = args else { return Number::NAN };
    x.tan()
}

pub fn arctan(args: &[Number]) -> Number {
    let &[x] = args else { return Number::NAN };
    x.atan()
}

pub fn abs(args: &[Number]) -> Number {
    let &[x] = args else { return Number::NAN };
    x.abs()
}

pub fn sqrt(args: &[Number]) -> Number {
    let &[x] = args else { return Number::NAN };
    x.sqrt()
}

pub fn ceil(args: &[Number]) -> Number {
    let &[x] = args else { return Number::NAN };
    x.ceil()
}

pub fn ln(args: &[Number]) -> Number {
    let &[x] = args else { return Number::NAN };
    x.ln()
}

pub fn random(args: &[Number]) -> Number {
    if !args.is_empty() {
        return Number::NAN;
    }
    rand::random::<Number>()
}
