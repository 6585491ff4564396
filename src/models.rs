use crate::error::DatasetError;
use crate::style::{Rgb, group_color};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Group label that is drawn with highlighted markers and excluded from
/// fitted overlays and pairwise statistics.
pub const OUTLIER_LABEL: &str = "outlier";

/// Whether a group key is the reserved outlier label.
pub fn is_outlier(label: Option<&str>) -> bool {
    label == Some(OUTLIER_LABEL)
}

/// One row: a value per numeric variable, plus the group label when a hue is active.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub values: Vec<f64>,
    pub group: Option<String>,
}

/// Tidy table of numeric variables with an optional categorical hue column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    variables: Vec<String>,
    hue: Option<String>,
    rows: Vec<Observation>,
}

impl Dataset {
    pub fn new(variables: Vec<String>, hue: Option<String>) -> Result<Self, DatasetError> {
        for (i, v) in variables.iter().enumerate() {
            if variables[..i].contains(v) {
                return Err(DatasetError::DuplicateVariable(v.clone()));
            }
        }
        Ok(Self {
            variables,
            hue,
            rows: Vec::new(),
        })
    }

    /// Append a row. Grouped datasets require a label; ungrouped ones ignore it.
    pub fn push(&mut self, values: Vec<f64>, group: Option<String>) -> Result<(), DatasetError> {
        if values.len() != self.variables.len() {
            return Err(DatasetError::Arity {
                expected: self.variables.len(),
                actual: values.len(),
            });
        }
        let group = match (&self.hue, group) {
            (Some(_), Some(g)) => Some(g),
            (Some(h), None) => return Err(DatasetError::MissingGroup(h.clone())),
            (None, _) => None,
        };
        self.rows.push(Observation { values, group });
        Ok(())
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn hue(&self) -> Option<&str> {
        self.hue.as_deref()
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn variable_index(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v == name)
    }

    /// Values of one variable restricted to a group (`None` selects every row).
    pub fn column_for_group(&self, idx: usize, group: Option<&str>) -> Vec<f64> {
        self.rows
            .iter()
            .filter(|r| group.is_none() || r.group.as_deref() == group)
            .map(|r| r.values[idx])
            .collect()
    }

    /// Distinct group labels in first-seen order; empty when no hue is active.
    pub fn group_labels(&self) -> Vec<String> {
        self.group_counts().into_iter().map(|(k, _)| k).collect()
    }

    /// Distinct group labels with their row counts, in first-seen order.
    pub fn group_counts(&self) -> Vec<(String, usize)> {
        let mut order: Vec<String> = Vec::new();
        let mut counts: AHashMap<&str, usize> = AHashMap::new();
        for r in &self.rows {
            if let Some(g) = r.group.as_deref() {
                let c = counts.entry(g).or_insert(0);
                if *c == 0 {
                    order.push(g.to_string());
                }
                *c += 1;
            }
        }
        order
            .into_iter()
            .map(|k| {
                let n = counts.get(k.as_str()).copied().unwrap_or(0);
                (k, n)
            })
            .collect()
    }

    /// Copy of the dataset restricted to the named variables (in the given order).
    pub fn select(&self, names: &[String]) -> Result<Dataset, DatasetError> {
        let idxs = names
            .iter()
            .map(|n| {
                self.variable_index(n)
                    .ok_or_else(|| DatasetError::UnknownVariable(n.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let mut out = Dataset::new(names.to_vec(), self.hue.clone())?;
        out.rows = self
            .rows
            .iter()
            .map(|r| Observation {
                values: idxs.iter().map(|&i| r.values[i]).collect(),
                group: r.group.clone(),
            })
            .collect();
        Ok(out)
    }
}

/// One hue group as used by the grid: identity, legend text, size and color.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Group {
    /// Raw label from the hue column; used for identity and the outlier check.
    pub key: String,
    /// Label shown in the legend.
    pub legend: String,
    pub count: usize,
    pub color: Rgb,
}

impl Group {
    pub fn is_outlier(&self) -> bool {
        is_outlier(Some(&self.key))
    }
}

/// Format the legend label of a group, optionally with its observation count.
pub fn legend_label(key: &str, count: usize, show_counts: bool) -> String {
    if show_counts {
        format!("{key} (N={count})")
    } else {
        key.to_string()
    }
}

/// Derive the ordered groups of a dataset. Colors follow first-seen position.
pub fn derive_groups(dataset: &Dataset, show_counts: bool) -> Vec<Group> {
    dataset
        .group_counts()
        .into_iter()
        .enumerate()
        .map(|(i, (key, count))| Group {
            legend: legend_label(&key, count, show_counts),
            key,
            count,
            color: group_color(i),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grouped() -> Dataset {
        let mut ds = Dataset::new(vec!["a".into(), "b".into()], Some("kind".into())).unwrap();
        for (a, b, g) in [
            (1.0, 2.0, "beta"),
            (2.0, 3.0, "alpha"),
            (3.0, 4.0, "beta"),
            (4.0, 1.0, "outlier"),
        ] {
            ds.push(vec![a, b], Some(g.into())).unwrap();
        }
        ds
    }

    #[test]
    fn groups_keep_first_seen_order() {
        let ds = grouped();
        assert_eq!(ds.group_labels(), vec!["beta", "alpha", "outlier"]);
        assert_eq!(
            ds.group_counts(),
            vec![("beta".into(), 2), ("alpha".into(), 1), ("outlier".into(), 1)]
        );
    }

    #[test]
    fn legend_labels_carry_counts_only_when_enabled() {
        let ds = grouped();
        let with = derive_groups(&ds, true);
        assert_eq!(with[0].legend, "beta (N=2)");
        assert_eq!(with[2].key, "outlier");
        assert!(with[2].is_outlier());
        let without = derive_groups(&ds, false);
        assert_eq!(without[0].legend, "beta");
    }

    #[test]
    fn arity_and_missing_group_are_rejected() {
        let mut ds = grouped();
        assert!(matches!(
            ds.push(vec![1.0], Some("x".into())),
            Err(DatasetError::Arity { expected: 2, actual: 1 })
        ));
        assert!(matches!(
            ds.push(vec![1.0, 2.0], None),
            Err(DatasetError::MissingGroup(_))
        ));
    }

    #[test]
    fn select_reorders_columns() {
        let ds = grouped();
        let s = ds.select(&["b".into(), "a".into()]).unwrap();
        assert_eq!(s.rows()[0].values, vec![2.0, 1.0]);
        assert!(ds.select(&["zzz".into()]).is_err());
        assert_eq!(ds.column_for_group(0, Some("beta")), vec![1.0, 3.0]);
        assert_eq!(ds.column_for_group(1, None).len(), 4);
    }
}
