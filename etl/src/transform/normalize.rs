//! Column name normalization.

use std::collections::HashSet;

use tracing::info;

use crate::models::Dataset;

/// Legacy column names and their replacements, applied after cleanup.
const RENAMES: &[(&str, &str)] = &[("purchase_amount_(usd)", "purchase_amount")];

/// Trim, lower-case and underscore every column name, then apply [`RENAMES`].
///
/// Names that collide after cleanup keep the first occurrence as-is; later
/// ones receive the smallest free `_N` suffix. Running this twice yields the
/// same dataset as running it once.
pub fn normalize_columns(dataset: &Dataset) -> Dataset {
    info!("Standardizing column names");

    let mut taken: HashSet<String> = HashSet::new();
    let names = dataset
        .column_names()
        .into_iter()
        .map(|raw| {
            let name = unique_name(rename(clean_name(raw)), &taken);
            taken.insert(name.clone());
            name
        })
        .collect();

    dataset.clone().with_column_names(names)
}

/// `" Review Rating "` -> `"review_rating"`
pub fn clean_name(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

fn rename(name: String) -> String {
    RENAMES
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| to.to_string())
        .unwrap_or(name)
}

fn unique_name(name: String, taken: &HashSet<String>) -> String {
    if !taken.contains(&name) {
        return name;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{}_{}", name, n);
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
