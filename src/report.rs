//! Таблица важности признаков и текстовая диаграмма топ-N

use crate::error::{PipelineError, Result};
use crate::models::FittedPipeline;
use crate::types::FeatureImportance;

const BAR_WIDTH: usize = 50;

/// Важности классификатора с именами признаков, по убыванию.
/// При равных значениях сохраняется порядок признаков.
pub fn importance_table(pipeline: &FittedPipeline) -> Result<Vec<FeatureImportance>> {
    let importances = pipeline.classifier().feature_importances()?;
    rank_importances(pipeline.feature_names(), &importances)
}

pub fn rank_importances(names: &[String], importances: &[f64]) -> Result<Vec<FeatureImportance>> {
    if names.len() != importances.len() {
        return Err(PipelineError::FeatureMismatch {
            expected: names.len(),
            got: importances.len(),
        });
    }

    let mut table: Vec<FeatureImportance> = names
        .iter()
        .zip(importances)
        .map(|(name, &importance)| FeatureImportance {
            variable: name.clone(),
            importance,
        })
        .collect();
    table.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    Ok(table)
}

/// Горизонтальная диаграмма: самый важный признак сверху
pub fn render_top_chart(table: &[FeatureImportance], top_n: usize, title: &str) -> String {
    let top = &table[..top_n.min(table.len())];
    let max = top.iter().map(|r| r.importance).fold(0.0, f64::max);
    let label_width = top.iter().map(|r| r.variable.len()).max().unwrap_or(0);

    let mut out = format!("{}\n", title);
    for row in top {
        let len = if max > 0.0 {
            ((row.importance / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "{:>width$} | {:<bar$} {:.4}\n",
            row.variable,
            "#".repeat(len),
            row.importance,
            width = label_width,
            bar = BAR_WIDTH
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ranks_descending_and_keeps_ties_stable() {
        let table = rank_importances(&names(&["a", "b", "c", "d"]), &[0.1, 0.4, 0.1, 0.4]).unwrap();
        let order: Vec<&str> = table.iter().map(|r| r.variable.as_str()).collect();
        assert_eq!(order, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn length_mismatch_is_an_error() {
        assert!(rank_importances(&names(&["a"]), &[0.5, 0.5]).is_err());
    }

    #[test]
    fn chart_shows_top_n_largest_first() {
        let table = rank_importances(&names(&["Age", "BMI", "Smoke"]), &[0.5, 0.3, 0.2]).unwrap();
        let chart = render_top_chart(&table, 2, "Top 2");
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Top 2");
        assert!(lines[1].trim_start().starts_with("Age |"));
        assert!(lines[1].contains(&"#".repeat(BAR_WIDTH)));
        assert!(lines[2].trim_start().starts_with("BMI |"));
        assert!(!chart.contains("Smoke"));
    }
}
