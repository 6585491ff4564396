use enhanced_pairplot::annotate::{
    Anchor, AnnotationContext, BOTTOM_BASE, Correlation, LEFT_MARGIN, LINE_HEIGHT, MeanSd,
    MutualInformation, NormalityTest, StatisticProvider, TOP_BASE, annotate, annotation_color,
    stacking_index, vertical_offset,
};
use enhanced_pairplot::style::{NEUTRAL, Rgb, group_color};
use enhanced_pairplot::{OUTLIER_LABEL, Reason};

fn labels(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

#[test]
fn stacking_index_is_position_in_group_list() {
    let all = labels(&["setosa", "versicolor", "virginica"]);
    for (i, l) in all.iter().enumerate() {
        assert_eq!(stacking_index(Some(l), &all), i);
    }
    // fewer than two groups never stack
    assert_eq!(stacking_index(Some("setosa"), &labels(&["setosa"])), 0);
    assert_eq!(stacking_index(None, &[]), 0);
}

#[test]
fn bottom_stack_grows_upward_from_the_axis() {
    for groups in 1..6 {
        let last = vertical_offset(Anchor::BottomLeft, groups - 1, groups);
        assert!((last - BOTTOM_BASE).abs() < 1e-12);
        let first = vertical_offset(Anchor::BottomLeft, 0, groups);
        assert!((first - (BOTTOM_BASE + LINE_HEIGHT * (groups - 1) as f64)).abs() < 1e-12);
    }
    assert!((vertical_offset(Anchor::TopLeft, 1, 3) - (TOP_BASE - LINE_HEIGHT)).abs() < 1e-12);
}

#[test]
fn color_rule() {
    let c = group_color(2);
    assert_eq!(annotation_color(c, Some("b"), &labels(&["a", "b"])), c);
    assert_eq!(annotation_color(c, Some("b"), &labels(&["b"])), NEUTRAL);
    assert_eq!(annotation_color(c, None, &[]), NEUTRAL);
}

#[test]
fn mean_sd_of_one_to_five() {
    let x = [1.0, 2.0, 3.0, 4.0, 5.0];
    let ctx = AnnotationContext::new(&x, group_color(0), None, &[]);
    let a = annotate(&MeanSd, &ctx).unwrap();
    assert_eq!(a.text, "μ=3.0, σ=1.41");
    assert_eq!(a.anchor, Anchor::TopLeft);
    assert!((a.x - LEFT_MARGIN).abs() < 1e-12);
    assert!((a.y - TOP_BASE).abs() < 1e-12);
    assert_eq!(a.color, NEUTRAL);
    assert_eq!(a.reference_lines.len(), 3);
}

#[test]
fn perfect_correlations_render_sign_with_minus() {
    let x = [1.0, 2.0, 3.0, 4.0, 5.0];
    let up = [3.0, 5.0, 7.0, 9.0, 11.0];
    let down = [10.0, 8.0, 6.0, 4.0, 2.0];
    let ctx = AnnotationContext::new(&x, group_color(0), None, &[]);
    assert_eq!(annotate(&Correlation, &ctx.with_y(&up)).unwrap().text, "ρ=1.0, p-val=0.0");
    assert_eq!(
        annotate(&Correlation, &ctx.with_y(&down)).unwrap().text,
        "ρ=\u{2212}1.0, p-val=0.0"
    );
}

#[test]
fn outlier_group_only_gets_mean_sd() {
    let all = labels(&["a", OUTLIER_LABEL]);
    let x = [1.0, 4.0, 2.0, 8.0];
    let y = [2.0, 3.0, 9.0, 1.0];
    let ctx = AnnotationContext::new(&x, Rgb::new(1, 2, 3), Some(OUTLIER_LABEL), &all).with_y(&y);
    let providers: [&dyn StatisticProvider; 3] = [&Correlation, &MutualInformation, &NormalityTest];
    for p in providers {
        assert_eq!(p.compute(&ctx).unwrap(), None, "{} should skip outliers", p.name());
    }
    let a = annotate(&MeanSd, &ctx).unwrap();
    assert_eq!(a.stack_index, 1);
    assert_eq!(a.color, Rgb::new(1, 2, 3));
}

#[test]
fn unavailable_statistics_produce_nothing() {
    let x = [3.0, 3.0, 3.0, 3.0];
    let y = [1.0, 2.0, 3.0, 4.0];
    let ctx = AnnotationContext::new(&x, group_color(0), None, &[]).with_y(&y);

    let err = Correlation.compute(&ctx).unwrap_err();
    assert_eq!(err.reason, Reason::ZeroVariance);
    assert!(annotate(&Correlation, &ctx).is_none());
    assert!(annotate(&NormalityTest, &ctx).is_none());

    let few = [1.0, 2.0, 3.0];
    let ctx = AnnotationContext::new(&few, group_color(0), None, &[]).with_y(&few);
    let err = MutualInformation.compute(&ctx).unwrap_err();
    assert!(matches!(err.reason, Reason::InsufficientData { .. }));
}

#[test]
fn nan_input_is_unavailable() {
    let x = [1.0, f64::NAN, 3.0];
    let ctx = AnnotationContext::new(&x, group_color(0), None, &[]);
    assert!(MeanSd.compute(&ctx).is_err());
    assert!(annotate(&MeanSd, &ctx).is_none());
}
