use super::*;

const BREAKS: [f64; 3] = [0.0, 1000.0, 100_000.0];

#[test]
fn scale_is_linear_in_resolution() {
    let f = Feature::default();
    assert!((scale(&f, 1.0) - 3543.3).abs() < 1e-9);
    assert!((scale(&f, 2.0) - 2.0 * 3543.3).abs() < 1e-9);
    assert_eq!(scale(&f, 0.0), 0.0);
}

#[test]
fn bracket_inside_first_interval() {
    let b = range_scale(500.0, &BREAKS).unwrap();
    assert_eq!(
        b,
        ScaleBracket {
            lower: Some(0.0),
            upper: 1000.0
        }
    );
}

#[test]
fn bracket_upper_bound_is_inclusive() {
    let b = range_scale(1000.0, &BREAKS).unwrap();
    assert_eq!(b.lower, Some(0.0));
    assert_eq!(b.upper, 1000.0);
}

#[test]
fn bracket_at_first_breakpoint_has_no_lower() {
    let b = range_scale(0.0, &BREAKS).unwrap();
    assert_eq!(b.lower, None);
    assert_eq!(b.upper, 0.0);
}

#[test]
fn bracket_above_every_breakpoint_is_none() {
    assert_eq!(range_scale(100_000.5, &BREAKS), None);
    assert_eq!(range_scale(1.0, &[]), None);
}

#[test]
fn bracket_brackets_every_probe() {
    let probes = [0.5, 1.0, 999.0, 1000.5, 50_000.0, 99_999.9, 100_000.0];
    for s in probes {
        let b = range_scale(s, &BREAKS).unwrap();
        let lower = b.lower.unwrap();
        assert!(lower < s && s <= b.upper, "{s} not in ({lower}, {}]", b.upper);
        let greatest_below = BREAKS.iter().copied().filter(|&x| x < s).fold(f64::MIN, f64::max);
        assert_eq!(lower, greatest_below);
    }
}
