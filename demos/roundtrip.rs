//! Construct a clamped cubic spline, evaluate a few points along it,
//! round-trip it through the canonical JSON form, and confirm the
//! parsed copy evaluates identically.
//!
//! Run with `cargo run --example roundtrip`.

use bspline_core::{eval, json, Config, Spline, SplineType};

fn main() {
    env_logger::init();

    let config = Config::default();
    let spline = Spline::new_with_control_points(
        4,
        2,
        3,
        SplineType::Clamped,
        &[0.0, 0.0, 1.0, 2.0, 2.0, 2.0, 3.0, 0.0],
        &config,
    )
    .expect("valid clamped cubic spline");

    println!("sampling the curve:");
    for i in 0..=10 {
        let u = i as f64 / 10.0;
        let net = eval::eval(&spline, u, &config).expect("u is within the domain");
        println!("  u={u:.1} -> {:?}", net.result());
    }

    let text = json::to_json(&spline).expect("serializable spline");
    println!("\ncanonical JSON:\n{text}");

    let parsed = json::parse_json(&text, &config).expect("round-trips through parse_json");
    let before = eval::eval(&spline, 0.5, &config).unwrap();
    let after = eval::eval(&parsed, 0.5, &config).unwrap();
    assert_eq!(before.result(), after.result());
    println!("\nround-trip through JSON preserved eval(0.5)");
}
