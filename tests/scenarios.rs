// SPDX: CC0-1.0

use implicit_plot::{
    compile,
    interact::{Event, Session},
    parse::CompileErrTyp,
    render,
    scan::{self, Cell},
    viewport::{Viewport, ZoomDir},
    Number, Point,
};

fn circle_view() -> Viewport {
    Viewport::new(0.04, Point { x: 300.0, y: 300.0 }, 600, 600).unwrap()
}

#[test]
fn circle_is_a_thin_ring() {
    let eval = compile("x*x+y*y-4").unwrap();
    let (mask, stats) = scan::scan_mask(&eval, &circle_view());
    assert_eq!(stats.undefined, 0);

    let (mut min_x, mut max_x, mut min_y, mut max_y) = (u32::MAX, 0, u32::MAX, 0);
    for (x, y) in mask.painted() {
        let dx = Number::from(x) - 300.0;
        let dy = Number::from(y) - 300.0;
        let dist = (dx * dx + dy * dy).sqrt();
        assert!((48.0..=52.0).contains(&dist), "({x}, {y}) is {dist} from center");
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    // radius 2 / scale 0.04 = 50 px
    let count = mask.count();
    assert!((314..1000).contains(&count), "{count} pixels painted");
    assert!((98..=102).contains(&(max_x - min_x)), "{min_x}..{max_x}");
    assert!((98..=102).contains(&(max_y - min_y)), "{min_y}..{max_y}");
    assert!(!mask.get(300, 300));
    assert!(mask.get(350, 300));
}

#[test]
fn malformed_input_keeps_previous_render() {
    let err = compile("x +* y").unwrap_err();
    assert_eq!(err.typ, CompileErrTyp::ExpectedOperand);

    let mut session = Session::new(circle_view());
    session.set_expr("x*x+y*y-4").unwrap();
    let (before, _) = session.mask().unwrap();

    assert!(session.set_expr("x +* y").is_err());
    let (after, _) = session.mask().unwrap();
    assert_eq!(before, after);
}

#[test]
fn atan_is_arctangent() {
    let atan = compile("atan(x)").unwrap();
    let tan = compile("tan(x)").unwrap();
    let at = |x| Point { x, y: 0.0 };
    assert!((atan.eval(at(1.0)) - core::f64::consts::FRAC_PI_4).abs() < 1e-12);
    assert!((tan.eval(at(1.0)) - 1.0_f64.tan()).abs() < 1e-12);
    assert!(atan.eval(at(1e9)) < core::f64::consts::FRAC_PI_2);
}

#[test]
fn sqrt_domain_is_never_painted_from_nan_alone() {
    let eval = compile("sqrt(x)").unwrap();
    assert!(eval.eval(Point { x: -1.0, y: 0.0 }).is_nan());

    let vp = circle_view();
    for py in (0..600).step_by(37) {
        for px in 0..299 {
            let cell = Cell::classify(scan::sample(&eval, &vp, px, py));
            assert_eq!(cell, Cell::Undefined, "({px}, {py})");
        }
    }
}

#[test]
fn pixel_math_pixel_round_trip() {
    let mut vp = circle_view();
    vp.pan(Point { x: -123.0, y: 45.0 }).unwrap();
    vp.zoom(ZoomDir::Out);
    for px in (0..600).step_by(13) {
        for py in (0..600).step_by(29) {
            let p = Point {
                x: Number::from(px),
                y: Number::from(py),
            };
            let back = vp.math_to_pixel(vp.pixel_to_math(p));
            assert_eq!(back.x.round(), p.x);
            assert_eq!(back.y.round(), p.y);
            assert!((back.x - p.x).abs() < 1e-9 && (back.y - p.y).abs() < 1e-9);
        }
    }
}

#[test]
fn zoom_gestures_cancel() {
    let mut vp = circle_view();
    for dir in [ZoomDir::In, ZoomDir::In, ZoomDir::Out, ZoomDir::In, ZoomDir::Out, ZoomDir::Out] {
        vp.zoom(dir);
    }
    assert!((vp.scale() - 0.04).abs() < 1e-15);
}

#[test]
fn dragging_moves_the_curve() {
    let mut session = Session::new(circle_view());
    session.set_expr("x*x+y*y-4").unwrap();

    assert!(!session.handle(Event::Press(Point { x: 10.0, y: 10.0 })).unwrap());
    assert!(session.handle(Event::Motion(Point { x: 60.0, y: 10.0 })).unwrap());
    assert!(!session.handle(Event::Release).unwrap());

    let (mask, _) = session.mask().unwrap();
    // the ring is now centered on (350, 300)
    assert!(mask.get(400, 300));
    assert!(!mask.get(350, 300));
}

#[test]
fn redraw_paints_curve_over_grid_and_axes() {
    let mut session = Session::new(circle_view());
    session.set_expr("x - y").unwrap();
    let mut img = image::RgbImage::new(600, 600);
    let stats = session.redraw(&mut img).unwrap();
    assert!(stats.painted > 0);
    // the diagonal passes through the origin, over both axes
    assert_eq!(img.get_pixel(300, 300).0, render::CURVE);
    assert_eq!(img.get_pixel(300, 100).0, render::AXIS);
    assert_eq!(img.get_pixel(100, 300).0, render::AXIS);
    assert_eq!(img.get_pixel(550, 20).0, render::GRID);
}
