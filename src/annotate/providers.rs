//! The four statistics shown on the grid.

use crate::error::{Reason, StatisticUnavailable, finite};
use crate::models::is_outlier;
use crate::stats;
use crate::style::LineDash;

use super::format::{round_repr, with_minus_sign};
use super::{Anchor, Annotation, AnnotationContext, ReferenceLine, StatisticProvider};

/// Opacity of the mean and quartile markers on the diagonal.
pub const REFERENCE_ALPHA: f64 = 0.2;

/// Mean and population standard deviation, with reference lines at the mean
/// and the quartiles.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanSd;

/// Pearson correlation and its p-value. Skips the outlier group.
#[derive(Debug, Clone, Copy, Default)]
pub struct Correlation;

/// k-nearest-neighbor mutual information. Skips the outlier group.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutualInformation;

/// KS test of the standardized sample against a normal distribution,
/// written at the bottom of the panel. Skips the outlier group.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalityTest;

fn pair<'a>(
    statistic: &'static str,
    ctx: &AnnotationContext<'a>,
) -> Result<&'a [f64], StatisticUnavailable> {
    ctx.y
        .ok_or_else(|| StatisticUnavailable::new(statistic, Reason::MissingSeries))
}

fn skips_pairwise(ctx: &AnnotationContext<'_>) -> bool {
    is_outlier(ctx.label) || ctx.x.len() < 2
}

impl StatisticProvider for MeanSd {
    fn name(&self) -> &'static str {
        "mean and standard deviation"
    }

    fn compute(
        &self,
        ctx: &AnnotationContext<'_>,
    ) -> Result<Option<Annotation>, StatisticUnavailable> {
        let name = self.name();
        let mean = finite(name, stats::mean(ctx.x)?)?;
        let sd = finite(name, stats::std_population(ctx.x)?)?;
        let q25 = stats::quantile(ctx.x, 0.25)?;
        let q75 = stats::quantile(ctx.x, 0.75)?;

        let text = format!("μ={}, σ={}", round_repr(mean, 2), round_repr(sd, 2));
        let mut annotation = ctx.place(name, Anchor::TopLeft, text);
        annotation.reference_lines = [(mean, LineDash::Solid), (q25, LineDash::Dot), (q75, LineDash::Dot)]
            .into_iter()
            .map(|(value, dash)| ReferenceLine {
                value,
                dash,
                color: ctx.color,
                alpha: REFERENCE_ALPHA,
            })
            .collect();
        Ok(Some(annotation))
    }
}

impl StatisticProvider for Correlation {
    fn name(&self) -> &'static str {
        "pearson correlation"
    }

    fn compute(
        &self,
        ctx: &AnnotationContext<'_>,
    ) -> Result<Option<Annotation>, StatisticUnavailable> {
        if skips_pairwise(ctx) {
            return Ok(None);
        }
        let y = pair(self.name(), ctx)?;
        let corr = stats::pearson(ctx.x, y)?;
        let text = format!(
            "ρ={}, p-val={}",
            with_minus_sign(&round_repr(corr.coefficient, 3)),
            round_repr(corr.p_value, 3)
        );
        Ok(Some(ctx.place(self.name(), Anchor::TopLeft, text)))
    }
}

impl StatisticProvider for MutualInformation {
    fn name(&self) -> &'static str {
        "mutual information"
    }

    fn compute(
        &self,
        ctx: &AnnotationContext<'_>,
    ) -> Result<Option<Annotation>, StatisticUnavailable> {
        if skips_pairwise(ctx) {
            return Ok(None);
        }
        let y = pair(self.name(), ctx)?;
        let mi = stats::mutual_info_regression(ctx.x, y)?;
        let text = format!("MI={}", round_repr(mi, 5));
        Ok(Some(ctx.place(self.name(), Anchor::TopLeft, text)))
    }
}

impl StatisticProvider for NormalityTest {
    fn name(&self) -> &'static str {
        "ks normality test"
    }

    fn compute(
        &self,
        ctx: &AnnotationContext<'_>,
    ) -> Result<Option<Annotation>, StatisticUnavailable> {
        if is_outlier(ctx.label) {
            return Ok(None);
        }
        let test = stats::normality_test(ctx.x)?;
        let text = format!("KS p-val={}", round_repr(test.p_value, 3));
        Ok(Some(ctx.place(self.name(), Anchor::BottomLeft, text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::annotate;
    use crate::models::OUTLIER_LABEL;
    use crate::style::{NEUTRAL, Rgb};

    const BLUE: Rgb = Rgb::new(76, 114, 176);

    fn labels(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn mean_sd_text_and_reference_lines() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let a = MeanSd
            .compute(&AnnotationContext::new(&x, BLUE, None, &[]))
            .unwrap()
            .unwrap();
        assert_eq!(a.text, "μ=3.0, σ=1.41");
        assert_eq!(a.color, NEUTRAL);
        assert_eq!(a.anchor, Anchor::TopLeft);
        let values: Vec<f64> = a.reference_lines.iter().map(|l| l.value).collect();
        assert_eq!(values, vec![3.0, 2.0, 4.0]);
        assert_eq!(a.reference_lines[0].dash, LineDash::Solid);
        // the markers keep the series color even when the text is neutral
        assert!(a.reference_lines.iter().all(|l| l.color == BLUE));
    }

    #[test]
    fn correlation_signs() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let up = [2.0, 4.0, 6.0, 8.0];
        let down = [8.0, 6.0, 4.0, 2.0];
        let ctx = AnnotationContext::new(&x, BLUE, None, &[]);
        let a = Correlation.compute(&ctx.with_y(&up)).unwrap().unwrap();
        assert_eq!(a.text, "ρ=1.0, p-val=0.0");
        let b = Correlation.compute(&ctx.with_y(&down)).unwrap().unwrap();
        assert_eq!(b.text, "ρ=\u{2212}1.0, p-val=0.0");
    }

    #[test]
    fn pairwise_statistics_skip_outliers_and_single_points() {
        let all = labels(&["a", OUTLIER_LABEL]);
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [1.0, 3.0, 2.0, 4.0];
        let ctx = AnnotationContext::new(&x, BLUE, Some(OUTLIER_LABEL), &all).with_y(&y);
        assert_eq!(Correlation.compute(&ctx).unwrap(), None);
        assert_eq!(MutualInformation.compute(&ctx).unwrap(), None);
        assert_eq!(NormalityTest.compute(&ctx).unwrap(), None);

        let one = [1.0];
        let single = AnnotationContext::new(&one, BLUE, None, &[]).with_y(&one);
        assert_eq!(Correlation.compute(&single).unwrap(), None);
        assert_eq!(MutualInformation.compute(&single).unwrap(), None);
    }

    #[test]
    fn grouped_annotations_stack_in_group_color() {
        let all = labels(&["a", "b", "c"]);
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [2.0, 1.0, 4.0, 3.0, 6.0, 5.0];
        let red = Rgb::new(196, 78, 82);
        let ctx = AnnotationContext::new(&x, red, Some("c"), &all).with_y(&y);
        let a = MutualInformation.compute(&ctx).unwrap().unwrap();
        assert!(a.text.starts_with("MI="));
        assert_eq!(a.stack_index, 2);
        assert_eq!(a.color, red);

        let ks = NormalityTest.compute(&ctx).unwrap().unwrap();
        assert!(ks.text.starts_with("KS p-val="));
        assert_eq!(ks.anchor, Anchor::BottomLeft);
        assert!((ks.y - 0.02).abs() < 1e-12);
    }

    #[test]
    fn degenerate_input_is_reported_not_raised() {
        let x = [2.0, 2.0, 2.0];
        let y = [1.0, 2.0, 3.0];
        let ctx = AnnotationContext::new(&x, BLUE, None, &[]).with_y(&y);
        assert!(Correlation.compute(&ctx).is_err());
        assert!(NormalityTest.compute(&ctx).is_err());
        assert_eq!(annotate(&Correlation, &ctx), None);
        assert_eq!(annotate(&NormalityTest, &ctx), None);
        // a constant column still has a mean
        assert!(annotate(&MeanSd, &ctx).is_some());
    }

    #[test]
    fn missing_second_series_is_unavailable() {
        let x = [1.0, 2.0, 3.0];
        let ctx = AnnotationContext::new(&x, BLUE, None, &[]);
        let err = Correlation.compute(&ctx).unwrap_err();
        assert_eq!(err.reason, Reason::MissingSeries);
    }
}
