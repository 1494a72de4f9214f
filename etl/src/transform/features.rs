//! Derived feature columns.
//!
//! - `age_group`: quartile bracket of `age`
//! - `purchase_frequency_days`: day count for `frequency_of_purchases`
//!
//! Each derivation is skipped when its input column is absent. `age_group`
//! is also skipped when `age` holds a non-numeric value.

use tracing::{debug, info, warn};

use super::stats::quantiles;
use crate::models::{Dataset, Value};

pub const AGE_COLUMN: &str = "age";
pub const AGE_GROUP_COLUMN: &str = "age_group";
pub const FREQUENCY_COLUMN: &str = "frequency_of_purchases";
pub const FREQUENCY_DAYS_COLUMN: &str = "purchase_frequency_days";

/// Age bracket labels, lowest quartile first.
pub const AGE_GROUP_LABELS: [&str; 4] = ["Young Adult", "Adult", "Middle-aged", "Senior"];

/// Purchase frequency label to interval in days.
pub const FREQUENCY_DAYS: [(&str, i64); 7] = [
    ("Fortnightly", 14),
    ("Weekly", 7),
    ("Monthly", 30),
    ("Quarterly", 90),
    ("Bi-Weekly", 14),
    ("Annually", 365),
    ("Every 3 Months", 90),
];

const QUARTILES: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

/// Add `age_group` and `purchase_frequency_days` where their inputs exist.
pub fn add_features(dataset: &Dataset) -> Dataset {
    info!("Adding derived features");

    let mut out = dataset.clone();
    if let Some(groups) = age_groups(dataset) {
        out = out.with_column(AGE_GROUP_COLUMN, groups);
    } else {
        debug!("age_group not derived");
    }
    if let Some(days) = frequency_days(dataset) {
        out = out.with_column(FREQUENCY_DAYS_COLUMN, days);
    } else {
        debug!("frequency_of_purchases column absent, skipping purchase_frequency_days");
    }

    info!(columns = ?out.column_names(), "Features added");
    out
}

/// Quartile bracket for every row of `age`, or `None` if the column is
/// absent or holds any non-numeric value.
///
/// Bins are right-closed on empirical quartile edges with the minimum folded
/// into the first bin. The label depends only on the age value, so equal
/// ages always share a label; duplicate edges simply leave a bin empty.
pub fn age_groups(dataset: &Dataset) -> Option<Vec<Value>> {
    let ages = dataset.column(AGE_COLUMN)?;
    if ages
        .values
        .iter()
        .any(|v| !v.is_missing() && v.as_f64().is_none())
    {
        warn!("age column is not numeric, skipping age_group");
        return None;
    }
    let present: Vec<f64> = ages.values.iter().filter_map(Value::as_f64).collect();

    let Some(edges) = quantiles(&present, &QUARTILES) else {
        return Some(vec![Value::Missing; ages.len()]);
    };

    Some(
        ages.values
            .iter()
            .map(|v| match v.as_f64() {
                Some(age) => Value::text(AGE_GROUP_LABELS[bracket(age, &edges)]),
                None => Value::Missing,
            })
            .collect(),
    )
}

fn bracket(age: f64, edges: &[f64]) -> usize {
    edges[1..]
        .iter()
        .position(|upper| age <= *upper)
        .unwrap_or(AGE_GROUP_LABELS.len() - 1)
}

/// Day count for every row of `frequency_of_purchases`, or `None` if the
/// column is absent. Unknown labels map to missing.
pub fn frequency_days(dataset: &Dataset) -> Option<Vec<Value>> {
    let labels = dataset.column(FREQUENCY_COLUMN)?;
    Some(
        labels
            .values
            .iter()
            .map(|v| v.as_str().and_then(lookup_days).into())
            .collect(),
    )
}

/// Exact, case-sensitive lookup in [`FREQUENCY_DAYS`].
pub fn lookup_days(label: &str) -> Option<i64> {
    FREQUENCY_DAYS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, days)| *days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Column;

    fn ages(values: Vec<Value>) -> Dataset {
        Dataset::from_columns(vec![Column::new(AGE_COLUMN, values)]).unwrap()
    }

    fn labels_of(ds: &Dataset) -> Vec<Option<String>> {
        ds.column(AGE_GROUP_COLUMN)
            .unwrap()
            .values
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect()
    }

    #[test]
    fn test_quartile_labels() {
        let ds = ages([18, 25, 33, 41, 47, 55, 62, 70].map(Value::Int).to_vec());
        let out = add_features(&ds);
        let labels = labels_of(&out);
        assert_eq!(labels[0].as_deref(), Some("Young Adult"));
        assert_eq!(labels[1].as_deref(), Some("Young Adult"));
        assert_eq!(labels[2].as_deref(), Some("Adult"));
        assert_eq!(labels[3].as_deref(), Some("Adult"));
        assert_eq!(labels[4].as_deref(), Some("Middle-aged"));
        assert_eq!(labels[5].as_deref(), Some("Middle-aged"));
        assert_eq!(labels[6].as_deref(), Some("Senior"));
        assert_eq!(labels[7].as_deref(), Some("Senior"));
    }

    #[test]
    fn test_equal_ages_share_label() {
        let ds = ages([30, 30, 30, 30, 30, 60].map(Value::Int).to_vec());
        let labels = labels_of(&add_features(&ds));
        assert!(labels[..5].iter().all(|l| l.as_deref() == Some("Young Adult")));
        assert_eq!(labels[5].as_deref(), Some("Senior"));
    }

    #[test]
    fn test_age_group_present_iff_age_present() {
        let ds = ages(vec![Value::Int(20), Value::Missing, Value::Int(50), Value::Int(35)]);
        let out = add_features(&ds);
        for row in 0..out.row_count() {
            let age = out.get(row, AGE_COLUMN).unwrap();
            let group = out.get(row, AGE_GROUP_COLUMN).unwrap();
            assert_eq!(age.is_missing(), group.is_missing());
            if let Some(label) = group.as_str() {
                assert!(AGE_GROUP_LABELS.contains(&label));
            }
        }
    }

    #[test]
    fn test_text_age_column_skipped() {
        let ds = ages(vec![Value::from("30"), Value::from("40"), Value::from("unknown")]);
        let out = add_features(&ds);
        assert!(!out.has_column(AGE_GROUP_COLUMN));
        assert_eq!(out, ds);
    }

    #[test]
    fn test_parsed_text_age_column_skipped() {
        let raw = crate::parser::parse_csv_str("age\n30\n40\nunknown\n", Default::default())
            .unwrap();
        let out = add_features(&raw);
        assert_eq!(out.column_names(), vec![AGE_COLUMN]);
    }

    #[test]
    fn test_all_ages_missing() {
        let out = add_features(&ages(vec![Value::Missing, Value::Missing]));
        assert!(labels_of(&out).iter().all(Option::is_none));
    }

    #[test]
    fn test_frequency_lookup() {
        let ds = Dataset::from_columns(vec![Column::new(
            FREQUENCY_COLUMN,
            vec![
                Value::from("Weekly"),
                Value::from("Every 3 Months"),
                Value::from("Annually"),
                Value::from("weekly"),
                Value::from("Daily"),
                Value::Missing,
            ],
        )])
        .unwrap();
        let out = add_features(&ds);
        let days = &out.column(FREQUENCY_DAYS_COLUMN).unwrap().values;
        assert_eq!(
            days,
            &vec![
                Value::Int(7),
                Value::Int(90),
                Value::Int(365),
                Value::Missing,
                Value::Missing,
                Value::Missing,
            ]
        );
    }

    #[test]
    fn test_absent_inputs_skip() {
        let ds = Dataset::from_columns(vec![Column::new("other", vec![Value::Int(1)])]).unwrap();
        let out = add_features(&ds);
        assert_eq!(out, ds);
    }
}
