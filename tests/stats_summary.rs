use approx::assert_abs_diff_eq;
use enhanced_pairplot::Dataset;
use enhanced_pairplot::stats::special::normal_cdf;
use enhanced_pairplot::stats::{grouped_summary, mutual_info_regression, normality_test, pearson};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Inverse of the standard normal CDF by bisection.
fn normal_ppf(p: f64) -> f64 {
    let (mut lo, mut hi) = (-10.0, 10.0);
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if normal_cdf(mid) < p {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

fn normal_sample(n: usize, mean: f64, sd: f64) -> Vec<f64> {
    (0..n)
        .map(|i| mean + sd * normal_ppf((i as f64 + 0.5) / n as f64))
        .collect()
}

#[test]
fn ks_accepts_normal_and_rejects_bimodal() {
    let normal = normal_sample(120, 10.0, 3.0);
    assert!(normality_test(&normal).unwrap().p_value > 0.05);

    let bimodal: Vec<f64> = normal_sample(100, -3.0, 0.3)
        .into_iter()
        .chain(normal_sample(100, 3.0, 0.3))
        .collect();
    assert!(normality_test(&bimodal).unwrap().p_value < 0.05);
}

#[test]
fn mutual_information_tracks_dependence() {
    let x: Vec<f64> = (0..200).map(|i| (i as f64 * 0.37).sin() * 4.0 + i as f64 * 0.01).collect();
    let same = mutual_info_regression(&x, &x).unwrap();

    let mut rng = StdRng::seed_from_u64(11);
    let noise: Vec<f64> = (0..200).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let independent = mutual_info_regression(&x, &noise).unwrap();

    assert!(same > 1.0, "identical series: {same}");
    assert!(independent < 0.2, "independent series: {independent}");
    assert_eq!(independent, mutual_info_regression(&x, &noise).unwrap());
}

#[test]
fn pearson_matches_reference_values() {
    let x = [1.0, 2.0, 3.0, 4.0, 5.0];
    let y = [2.0, 1.0, 4.0, 3.0, 5.0];
    let c = pearson(&x, &y).unwrap();
    assert_abs_diff_eq!(c.coefficient, 0.8, epsilon = 1e-12);
    assert_abs_diff_eq!(c.p_value, 0.104, epsilon = 1e-3);
}

#[test]
fn grouped_summary_reports_every_variable_and_group() {
    let mut ds = Dataset::new(vec!["len".into(), "wid".into()], Some("sp".into())).unwrap();
    let rows = [
        (1.0, 10.0, "a"),
        (2.0, 20.0, "a"),
        (3.0, 30.0, "a"),
        (4.0, 40.0, "a"),
        (10.0, 5.0, "b"),
        (30.0, 6.0, "b"),
    ];
    for (l, w, g) in rows {
        ds.push(vec![l, w], Some(g.into())).unwrap();
    }
    let got = grouped_summary(&ds);
    assert_eq!(got.len(), 4);

    let a = &got[0];
    assert_eq!((a.variable.as_str(), a.group.as_deref()), ("len", Some("a")));
    assert_eq!(a.count, 4);
    assert_eq!(a.min, Some(1.0));
    assert_eq!(a.max, Some(4.0));
    assert_abs_diff_eq!(a.mean.unwrap(), 2.5);
    assert_abs_diff_eq!(a.median.unwrap(), 2.5);
    assert_abs_diff_eq!(a.std.unwrap(), 1.25f64.sqrt(), epsilon = 1e-12);

    let b = &got[1];
    assert_eq!(b.group.as_deref(), Some("b"));
    assert_eq!(b.median, Some(20.0));

    assert_eq!(got[2].variable, "wid");
}

#[test]
fn ungrouped_summary_has_no_group() {
    let mut ds = Dataset::new(vec!["v".into()], None).unwrap();
    for v in [4.0, 4.0, 4.0] {
        ds.push(vec![v], None).unwrap();
    }
    let got = grouped_summary(&ds);
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].group, None);
    assert_eq!(got[0].std, Some(0.0));
    // constant data cannot be standardized
    assert_eq!(got[0].ks_p_value, None);
}
