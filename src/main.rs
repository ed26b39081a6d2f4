// SPDX: CC0-1.0

use anyhow::Context;
use chrono::{DateTime, Local};
use clap::Parser;
use implicit_plot::{
    interact::{Event, Session},
    lex::LexErrTyp,
    parse::{CompileErrTyp, CompileError},
    render,
    scan::{self, Cell, ScanStats},
    shell::{self, Command, PointArg},
    stdlib,
    viewport::{Viewport, ZoomDir, DEFAULT_SCALE, DEFAULT_SIZE},
    Number, Point,
};
use std::{
    io::{stdout, BufWriter, Write},
    path::PathBuf,
    process::ExitCode,
    sync::Arc,
};

const PREVIEW_COLS: u32 = 72;

#[derive(Parser, Debug)]
#[command(name = "implicit_plot", about = "Plot implicit curves f(x, y) = 0")]
struct Cli {
    /// expression f(x, y) to plot at startup
    #[arg(long, env = "IMPLICIT_PLOT_EXPR", default_value = "x*x+y*y-4")]
    expr: String,

    #[arg(long, env = "IMPLICIT_PLOT_WIDTH", default_value_t = DEFAULT_SIZE[0])]
    width: u32,

    #[arg(long, env = "IMPLICIT_PLOT_HEIGHT", default_value_t = DEFAULT_SIZE[1])]
    height: u32,

    /// math units per pixel
    #[arg(long, env = "IMPLICIT_PLOT_SCALE", default_value_t = DEFAULT_SCALE)]
    scale: Number,

    /// directory plots are written to
    #[arg(long, env = "IMPLICIT_PLOT_OUT_DIR", default_value = ".")]
    out_dir: PathBuf,

    #[arg(long, env = "IMPLICIT_PLOT_LOG", default_value_t = tracing::Level::WARN)]
    log_level: tracing::Level,
}

fn output_png_filename(now: DateTime<Local>) -> String {
    format!(
        "{}_output-{}.{}",
        env!("CARGO_PKG_NAME"),
        now.format("%Y-%m-%d_%H-%M-%S"),
        "png"
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(cli.log_level)
        .init();

    match try_main(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("unexpected error: {err}");
            let chain = err.chain();
            if chain.len() > 1 {
                eprintln!();
                eprintln!("context:");
                for it in chain.skip(1) {
                    eprintln!("  {it}");
                }
            }
            ExitCode::FAILURE
        }
    }
}

#[derive(Debug)]
struct State {
    // as last entered, even if it failed to compile
    expr: Option<Arc<String>>,
    session: Session,
    initial: Viewport,
    frame: image::RgbImage,
    out_dir: PathBuf,
}

fn try_main(cli: Cli) -> anyhow::Result<()> {
    let viewport = Viewport::centered(cli.scale, cli.width, cli.height)
        .context("invalid viewport configuration")?;
    let mut state = State {
        expr: Some(Arc::new(cli.expr)),
        session: Session::new(viewport),
        initial: viewport,
        frame: image::RgbImage::new(viewport.width(), viewport.height()),
        out_dir: cli.out_dir,
    };

    let mut stdout = BufWriter::new(stdout());
    compile_expr(&mut stdout, &mut state)?;
    writeln!(stdout)?;

    loop {
        match state.expr {
            Some(ref expr) => writeln!(stdout, "{expr} = 0")?,
            None => writeln!(stdout, "f(x, y) is not set")?,
        }

        let mut try_cmd = shell::input(&mut stdout, "> ")?;
        try_cmd.make_ascii_lowercase();
        writeln!(stdout)?;

        if let Ok(cmd) = try_cmd.parse::<Command>() {
            match cmd {
                Command::Help => {
                    for c in Command::exhaustive() {
                        writeln!(stdout, "{name}: {help}", name = c.name(), help = c.help())?;
                    }
                }

                Command::Quit => break,

                Command::SetExpr => set_expr(&mut stdout, &mut state)?,

                Command::Plot => plot(&mut stdout, &mut state)?,

                Command::View => view(&mut stdout, &state)?,

                Command::Pan => {
                    if let Ok(Some(PointArg(delta))) =
                        shell::read_fromstr(&mut stdout, "?dx dy (pixels) = ", true)?
                    {
                        handle(&mut stdout, &mut state, Event::Pan(delta))?;
                    }
                }

                Command::Zoom => {
                    let dir = shell::input(&mut stdout, "?in or out = ")?;
                    match dir.to_ascii_lowercase().parse::<ZoomDir>() {
                        Ok(dir) => handle(&mut stdout, &mut state, Event::Zoom(dir))?,
                        Err(()) => writeln!(stdout, r#"error: expected "in" or "out""#)?,
                    }
                }

                Command::Drag => drag(&mut stdout, &mut state)?,

                Command::SetWin => set_win(&mut stdout, &mut state)?,

                Command::Reset => {
                    *state.session.viewport_mut() = state.initial;
                    writeln!(stdout, "window = {:#}", state.initial)?;
                }

                Command::PrintAst => {
                    if let Some(eval) = state.session.evaluator() {
                        shell::dump_ast(&mut stdout, eval, format_args!("ast"))?;
                    } else {
                        shell::eval_undefined(&mut stdout)?;
                    }
                }

                Command::Probe => probe(&mut stdout, &state)?,

                Command::Ticks => {
                    writeln!(stdout, "grid lines:")?;
                    shell::dump_ticks(&mut stdout, &render::ticks(state.session.viewport()))?;
                }
            }
        } else {
            writeln!(stdout, r#"Unknown command, try "help" for help"#)?;
        }

        writeln!(stdout)?;
    }
    stdout.flush()?;
    Ok(())
}

fn print_stats<W: Write>(mut out: W, stats: Option<ScanStats>) -> anyhow::Result<()> {
    match stats {
        Some(stats) => writeln!(
            out,
            "scanned {visited} pixels: {painted} on the curve, {undefined} undefined",
            visited = stats.visited,
            painted = stats.painted,
            undefined = stats.undefined,
        )?,
        None => shell::eval_undefined(&mut out)?,
    }
    Ok(())
}

fn redraw(state: &mut State) -> Option<ScanStats> {
    let vp = state.session.viewport();
    if state.frame.dimensions() != (vp.width(), vp.height()) {
        state.frame = image::RgbImage::new(vp.width(), vp.height());
    }
    state.session.redraw(&mut state.frame)
}

fn handle<W: Write>(mut out: W, state: &mut State, event: Event) -> anyhow::Result<()> {
    match state.session.handle(event) {
        Ok(true) => {
            let stats = redraw(state);
            writeln!(out, "window = {:#}", state.session.viewport())?;
            print_stats(&mut out, stats)?;
        }
        Ok(false) => {}
        Err(err) => writeln!(out, "error: {err}")?,
    }
    Ok(())
}

fn plot<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    if state.expr.is_none() {
        shell::expr_undefined(&mut out)?;
        return Ok(());
    }

    let stats = redraw(state);
    print_stats(&mut out, stats)?;

    let path = state.out_dir.join(output_png_filename(Local::now()));
    state
        .frame
        .save(&path)
        .with_context(|| format!("failed to write plot to {}", path.display()))?;
    tracing::info!(path = %path.display(), "saved plot");
    writeln!(out, "saved {}", path.display())?;
    Ok(())
}

fn view<W: Write>(mut out: W, state: &State) -> anyhow::Result<()> {
    let Some((mask, stats)) = state.session.mask() else {
        shell::eval_undefined(&mut out)?;
        return Ok(());
    };
    // terminal cells are about twice as tall as they are wide
    let rows = (u64::from(PREVIEW_COLS) * u64::from(mask.height())
        / u64::from(mask.width()).max(1)
        / 2) as u32;
    write!(out, "{}", render::preview(&mask, PREVIEW_COLS, rows))?;
    let (top_left, bottom_right) = state.session.viewport().bounds();
    writeln!(
        out,
        "x from {:.2} to {:.2}, y from {:.2} to {:.2}",
        top_left.x, bottom_right.x, bottom_right.y, top_left.y
    )?;
    print_stats(&mut out, Some(stats))?;
    Ok(())
}

fn drag<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    writeln!(out, "note: positions are in pixels, leave blank to release")?;
    let Ok(Some(PointArg(at))) = shell::read_fromstr(&mut out, "?press at = ", true)? else {
        return Ok(());
    };
    handle(&mut out, state, Event::Press(at))?;

    loop {
        match shell::read_fromstr::<_, PointArg>(&mut out, "?move to = ", true)? {
            Ok(Some(PointArg(at))) => handle(&mut out, state, Event::Motion(at))?,
            Ok(None) => break,
            Err(_) => continue,
        }
    }

    handle(&mut out, state, Event::Release)?;
    Ok(())
}

fn probe<W: Write>(mut out: W, state: &State) -> anyhow::Result<()> {
    let Some(eval) = state.session.evaluator() else {
        shell::eval_undefined(&mut out)?;
        return Ok(());
    };
    let Ok(Some(PointArg(p))) = shell::read_fromstr(&mut out, "?x y = ", true)? else {
        return Ok(());
    };

    let val = eval.eval(p);
    if val.is_nan() {
        writeln!(out, "f({}, {}) is undefined", p.x, p.y)?;
    } else {
        writeln!(out, "f({}, {}) = {val}", p.x, p.y)?;
    }

    let vp = state.session.viewport();
    let px = vp.math_to_pixel(p);
    let (col, row) = (px.x.floor(), px.y.floor());
    if (0.0..Number::from(vp.width())).contains(&col)
        && (0.0..Number::from(vp.height())).contains(&row)
    {
        let cell = Cell::classify(scan::sample(eval, vp, col as u32, row as u32));
        let painted = if cell.on_curve() { ", painted" } else { "" };
        writeln!(out, "pixel ({col}, {row}) is {cell:?}{painted}")?;
    } else {
        writeln!(out, "pixel ({col}, {row}) is off the canvas")?;
    }
    Ok(())
}

fn set_win<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    let vp = *state.session.viewport();
    writeln!(out, "window = {vp:#}")?;
    writeln!(out)?;
    writeln!(out, "note: leave blank to skip")?;

    let mut scale = vp.scale();
    let Point {
        x: mut center_x,
        y: mut center_y,
    } = vp.center();
    for (name, dst) in [
        ("scale", &mut scale),
        ("center x", &mut center_x),
        ("center y", &mut center_y),
    ] {
        match shell::read_fromstr::<_, Number>(
            &mut out,
            format_args!("?{name} (is {cur}) = ", cur = *dst),
            true,
        )? {
            Ok(Some(new)) => *dst = new,
            Ok(None) => {}
            Err(_) => return Ok(()),
        }
    }

    writeln!(out, "note: canvas size must be a nonzero integer")?;
    let (mut width, mut height) = (vp.width(), vp.height());
    for (name, dst) in [("width", &mut width), ("height", &mut height)] {
        match shell::read_fromstr::<_, u32>(
            &mut out,
            format_args!("?{name} (is {cur}) = ", cur = *dst),
            true,
        )? {
            Ok(Some(new)) => *dst = new,
            Ok(None) => {}
            Err(_) => return Ok(()),
        }
    }

    let center = Point {
        x: center_x,
        y: center_y,
    };
    match Viewport::new(scale, center, width, height) {
        Ok(new) => *state.session.viewport_mut() = new,
        Err(err) => writeln!(out, "error: {err}")?,
    }

    Ok(())
}

fn set_expr<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    let input = shell::input(&mut out, "f(x, y) = ")?;
    if input.is_empty() {
        return Ok(());
    }

    state.expr = Some(Arc::new(input));
    compile_expr(&mut out, state)?;

    Ok(())
}

fn compile_expr<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    let Some(ref input) = state.expr else {
        return Ok(());
    };

    let res = state.session.set_expr(input).map(|eval| eval.root().size());
    match res {
        Ok(size) => writeln!(out, "compiled ok ({size} nodes)")?,
        Err(err) => {
            report_compile_err(&mut out, &err)?;
            if state.session.evaluator().is_some() {
                writeln!(out, "note: the previous expression is still plotted")?;
            }
        }
    }

    Ok(())
}

fn report_compile_err<W: Write>(mut out: W, err: &CompileError) -> anyhow::Result<()> {
    writeln!(out)?;
    shell::underline(&mut out, &err.loc)?;
    writeln!(out, "compile error: {}", err.typ)?;
    match err.typ {
        CompileErrTyp::LexErr(lex_err) => match lex_err {
            LexErrTyp::InvalidChar => {
                writeln!(
                    out,
                    "note: available tokens are numbers, alphabetic identifiers, and symbols +-*/^,()"
                )?;
            }
            LexErrTyp::Unsupported(what) => writeln!(out, "note: {}", what.hint())?,
        },

        CompileErrTyp::ParseNum(_) => writeln!(out, "note: parsing as floating point number")?,

        CompileErrTyp::ExpectedOperator => {
            writeln!(
                out,
                "note: implicit multiplication is not supported, so for example '5x' would be '5*x'",
            )?;
        }

        CompileErrTyp::UndefinedIdent => {
            let idents = stdlib::standard_idents();
            if let Some((name, ident)) = stdlib::most_similar(&idents, err.loc.get()) {
                writeln!(out, "note: {} '{name}' has a similar name", ident.kind())?;
            }
        }

        CompileErrTyp::Empty
        | CompileErrTyp::ParenMismatch
        | CompileErrTyp::ExpectedOperand
        | CompileErrTyp::UnexpectedEnd
        | CompileErrTyp::MissingCall
        | CompileErrTyp::MisplacedComma
        | CompileErrTyp::Arity { .. } => {}
    }
    Ok(())
}
