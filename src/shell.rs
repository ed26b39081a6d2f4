// SPDX: CC0-1.0

use crate::{
    eval::Evaluator,
    lex::SubStr,
    render::{Axis, Tick},
    Number, Point,
};
use anyhow::Context;
use core::{fmt, str::FromStr};
use std::{
    io::{self, stdin, BufRead, Write},
    sync::Arc,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    SetExpr,
    Plot,
    View,
    Pan,
    Zoom,
    Drag,
    SetWin,
    Reset,
    PrintAst,
    Probe,
    Ticks,
}

impl Command {
    pub const fn exhaustive() -> &'static [Command] {
        &[
            Self::Help,
            Self::Quit,
            Self::SetExpr,
            Self::Plot,
            Self::View,
            Self::Pan,
            Self::Zoom,
            Self::Drag,
            Self::SetWin,
            Self::Reset,
            Self::PrintAst,
            Self::Probe,
            Self::Ticks,
        ]
    }

    pub const fn help(&self) -> &'static str {
        match self {
            Self::Help => "display help for each command",
            Self::Quit => "quit the shell",
            Self::SetExpr => "set expression f(x, y) whose zero set is plotted",
            Self::Plot => "redraw and save the plot as a png image",
            Self::View => "redraw and preview the curve in the terminal",
            Self::Pan => "move the origin by a pixel offset",
            Self::Zoom => "zoom in or out about the origin",
            Self::Drag => "drag the canvas along a path of pixel positions",
            Self::SetWin => "set viewport parameters",
            Self::Reset => "restore the initial viewport",
            Self::PrintAst => "print syntax tree compiled from the expression (for debugging)",
            Self::Probe => "evaluate the expression at a point",
            Self::Ticks => "list grid lines and their labels",
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Quit => "quit",
            Self::SetExpr => "set",
            Self::Plot => "plot",
            Self::View => "view",
            Self::Pan => "pan",
            Self::Zoom => "zoom",
            Self::Drag => "drag",
            Self::SetWin => "window",
            Self::Reset => "reset",
            Self::PrintAst => "ast",
            Self::Probe => "probe",
            Self::Ticks => "ticks",
        }
    }
}

impl FromStr for Command {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for c in Self::exhaustive() {
            if s == c.name() {
                return Ok(*c);
            }
        }
        Err(())
    }
}

#[derive(Debug)]
pub enum PointErr {
    Count(usize),
    Num(core::num::ParseFloatError),
}

impl fmt::Display for PointErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "expected 2 coordinates but found {n}"),
            Self::Num(err) => write!(f, "invalid coordinate: {err}"),
        }
    }
}

/// Two numbers separated by whitespace and/or a comma.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointArg(pub Point<Number>);

impl FromStr for PointArg {
    type Err = PointErr;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .collect();
        let &[x, y] = &parts[..] else {
            return Err(PointErr::Count(parts.len()));
        };
        Ok(Self(Point {
            x: x.parse().map_err(PointErr::Num)?,
            y: y.parse().map_err(PointErr::Num)?,
        }))
    }
}

pub fn input<W: Write>(out: W, prompt: impl fmt::Display) -> anyhow::Result<String> {
    fn inner<W: Write>(mut out: W, prompt: impl fmt::Display) -> io::Result<String> {
        write!(out, "{prompt}")?;
        out.flush()?;
        let mut stdin = stdin().lock();
        let mut s = String::new();
        stdin.read_line(&mut s)?;
        Ok(s.trim().to_string())
    }

    let s = inner(out, prompt).context("read from standard input failed")?;
    Ok(s)
}

pub fn read_fromstr<W: Write, T: FromStr>(
    mut out: W,
    prompt: impl fmt::Display,
    ignore_empty: bool,
) -> anyhow::Result<Result<Option<T>, <T as FromStr>::Err>>
where
    <T as FromStr>::Err: fmt::Display,
{
    let input = Arc::new(input(&mut out, prompt)?);
    if ignore_empty && input.is_empty() {
        return Ok(Ok(None));
    }
    match input.parse::<T>() {
        Ok(new) => Ok(Ok(Some(new))),
        Err(err) => {
            writeln!(out)?;
            underline(&mut out, &SubStr::all(input))?;
            writeln!(out, "parse error: {err}")?;
            Ok(Err(err))
        }
    }
}

pub fn underline<W: Write>(mut out: W, span: &SubStr) -> io::Result<()> {
    writeln!(out, "{}", span.src())?;
    writeln!(
        out,
        "{}{}",
        " ".repeat(span.start()),
        "^".repeat(span.len().max(1))
    )?;
    Ok(())
}

pub fn dump_ast<W: Write>(mut out: W, eval: &Evaluator, title: fmt::Arguments) -> io::Result<()> {
    writeln!(out, "{title} ({} nodes): ", eval.root().size())?;
    for line in eval.to_string().lines() {
        writeln!(out, "  {line}")?;
    }
    Ok(())
}

pub fn dump_ticks<W: Write>(mut out: W, ticks: &[Tick]) -> io::Result<()> {
    if ticks.is_empty() {
        writeln!(out, "  (no grid lines on the canvas)")?;
    }
    for tick in ticks {
        let (axis, at) = match tick.axis {
            Axis::X => ("x", "column"),
            Axis::Y => ("y", "row"),
        };
        writeln!(out, "  {axis} = {:>8} at {at} {}", tick.label(), tick.pixel)?;
    }
    Ok(())
}

pub fn expr_undefined<W: Write>(mut out: W) -> io::Result<()> {
    writeln!(out, "error: no expression is defined")
}

pub fn eval_undefined<W: Write>(mut out: W) -> io::Result<()> {
    writeln!(out, "error: the expression has not compiled yet")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile;

    #[test]
    fn commands_round_trip_through_names() {
        for c in Command::exhaustive() {
            assert_eq!(c.name().parse::<Command>(), Ok(*c));
            assert!(!c.help().is_empty());
        }
        assert_eq!("nope".parse::<Command>(), Err(()));
    }

    #[test]
    fn point_args() {
        assert_eq!(
            "1.5, -2".parse::<PointArg>().unwrap(),
            PointArg(Point { x: 1.5, y: -2.0 })
        );
        assert_eq!(
            "  3   4 ".parse::<PointArg>().unwrap(),
            PointArg(Point { x: 3.0, y: 4.0 })
        );
        assert!(matches!("1".parse::<PointArg>(), Err(PointErr::Count(1))));
        assert!(matches!("a b".parse::<PointArg>(), Err(PointErr::Num(_))));
    }

    #[test]
    fn underline_marks_span() {
        let src = Arc::new(String::from("x +* y"));
        let mut buf = Vec::new();
        underline(&mut buf, &SubStr::new(src, 3, 1)).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "x +* y\n   ^\n");
    }

    #[test]
    fn ast_dump_is_indented() {
        let eval = compile("-sin(x)").unwrap();
        let mut buf = Vec::new();
        dump_ast(&mut buf, &eval, format_args!("ast")).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "ast (3 nodes): \n  unary 'neg'\n    call 'sin'\n      variable x\n"
        );
    }
}
