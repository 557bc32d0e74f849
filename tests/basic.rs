use bspline_core::{eval, interpolate, json, knots, Config, Spline, SplineType};

fn close(a: &[f64], b: &[f64], epsilon: f64) -> bool {
    a.iter().zip(b).all(|(x, y)| (x - y).abs() < epsilon)
}

fn clamped_cubic_2d() -> Spline {
    let config = Config::default();
    Spline::new_with_control_points(
        4,
        2,
        3,
        SplineType::Clamped,
        &[0.0, 0.0, 1.0, 2.0, 2.0, 2.0, 3.0, 0.0],
        &config,
    )
    .unwrap()
}

#[test]
fn scenario_1_clamped_cubic_endpoints_match_control_points() {
    let config = Config::default();
    let s = clamped_cubic_2d();
    assert!(close(eval::eval(&s, 0.0, &config).unwrap().result(), &[0.0, 0.0], 1e-9));
    assert!(close(eval::eval(&s, 1.0, &config).unwrap().result(), &[3.0, 0.0], 1e-9));
}

#[test]
fn scenario_2_midpoint_de_boor_evaluation() {
    let config = Config::default();
    let s = clamped_cubic_2d();
    let net = eval::eval(&s, 0.5, &config).unwrap();
    assert!(close(net.result(), &[1.5, 1.5], 1e-9));
}

#[test]
fn scenario_3_knot_insertion_preserves_the_curve() {
    let config = Config::default();
    let mut s = clamped_cubic_2d();
    let before = eval::eval(&s, 0.5, &config).unwrap().result().to_vec();
    s.insert_knot(0.5, 1, &config).unwrap();
    assert_eq!(s.num_control_points(), 5);
    let after = eval::eval(&s, 0.5, &config).unwrap();
    assert!(close(&before, after.result(), 1e-6));
}

#[test]
fn scenario_4_to_beziers_decomposes_into_segments() {
    let config = Config::default();
    let s = clamped_cubic_2d();
    let beziers = s.to_beziers(&config).unwrap();
    assert_eq!(beziers.degree(), s.degree());
    assert_eq!(beziers.num_control_points() % beziers.order(), 0);
}

#[test]
fn scenario_5_derivative_drops_degree_and_one_control_point() {
    let config = Config::default();
    let s = clamped_cubic_2d();
    let d = s.derive(1, 1e-9, &config).unwrap();
    assert_eq!(d.degree(), s.degree() - 1);
    assert_eq!(d.num_control_points(), s.num_control_points() - 1);
    assert_eq!(d.num_knots(), s.num_knots() - 2);
}

#[test]
fn scenario_6_cubic_natural_interpolation_passes_through_points() {
    let config = Config::default();
    let points = [0.0, 0.0, 1.0, 1.0, 2.0, 0.0, 3.0, 1.0];
    let s = interpolate::interpolate_cubic_natural(&points, 2, &config).unwrap();

    let (dmin, dmax) = knots::domain(&s);
    for i in 0..=3 {
        let u = dmin + (dmax - dmin) * i as f64 / 3.0;
        let net = eval::eval(&s, u, &config).unwrap();
        assert!(close(net.result(), &points[i * 2..i * 2 + 2], 1e-9));
    }

    // natural boundary condition: second derivative vanishes at both ends
    let second = s.derive(2, -1.0, &config).unwrap();
    let (sd_min, sd_max) = knots::domain(&second);
    let at_start = eval::eval(&second, sd_min, &config).unwrap();
    let at_end = eval::eval(&second, sd_max, &config).unwrap();
    assert!(at_start.result().iter().all(|&v| v.abs() < 1e-9));
    assert!(at_end.result().iter().all(|&v| v.abs() < 1e-9));
}

#[test]
fn round_trip_through_canonical_json() {
    let config = Config::default();
    let s = clamped_cubic_2d();
    let text = json::to_json(&s).unwrap();
    let parsed = json::parse_json(&text, &config).unwrap();
    assert_eq!(parsed, s);
}

#[test]
fn bisection_finds_the_parameter_for_a_monotone_component() {
    let config = Config::default();
    let s = clamped_cubic_2d();
    let net = eval::bisect(&s, 1.5, 1e-9, true, 0, true, 100, &config).unwrap();
    assert!((net.u - 0.5).abs() < 1e-4);
}

#[test]
fn morphing_between_two_splines_recovers_each_endpoint() {
    let config = Config::default();
    let a = clamped_cubic_2d();
    let mut b = clamped_cubic_2d();
    b.set_control_point(2, &[5.0, -1.0]).unwrap();

    let at_start = bspline_core::morph(&a, &b, 0.0, 1e-6, &config, None).unwrap();
    let at_end = bspline_core::morph(&a, &b, 1.0, 1e-6, &config, None).unwrap();
    assert_eq!(at_start, a);
    assert_eq!(at_end, b);
}
