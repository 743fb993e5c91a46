// Matrix strategy expansion
// Fans a job with an N-axis matrix into independent jobs, one per
// combination, via the Cartesian product of its axes.

use crate::workflow::models::Job;

use serde_json::Value;

/// Expand a job's matrix strategy into concrete jobs.
///
/// Returns `(new_job_id, job)` pairs. A job with no matrix strategy
/// expands to exactly itself, unchanged. An explicit but empty matrix map
/// expands to zero jobs - malformed input the parser should have flagged,
/// faithfully propagated here as the empty set.
pub fn expand(job_id: &str, job: &Job) -> Vec<(String, Job)> {
    let matrix = match job.strategy.as_ref().and_then(|s| s.matrix.as_ref()) {
        Some(m) => m,
        None => return vec![(job_id.to_string(), job.clone())],
    };

    if matrix.dimensions.is_empty() {
        return Vec::new();
    }

    // Cartesian product, axes in insertion order, last axis varying fastest:
    // each axis folds over the combinations built so far.
    let mut combinations: Vec<Vec<(String, Value)>> = vec![Vec::new()];
    for (axis, raw) in &matrix.dimensions {
        let values: Vec<Value> = match raw {
            Value::Array(items) => items.clone(),
            scalar => vec![scalar.clone()],
        };

        let mut next = Vec::with_capacity(combinations.len() * values.len());
        for combo in &combinations {
            for value in &values {
                let mut extended = combo.clone();
                extended.push((axis.clone(), value.clone()));
                next.push(extended);
            }
        }
        combinations = next;
    }

    combinations
        .into_iter()
        .map(|combo| {
            let suffix = axis_suffix(&combo);
            let mut expanded = job.clone();
            for (axis, value) in &combo {
                expanded
                    .env
                    .insert(format!("matrix.{}", axis), stringify(value));
            }
            let base_name = job.name.clone().unwrap_or_else(|| job_id.to_string());
            expanded.name = Some(format!("{} {}", base_name, suffix));
            (format!("{}{}", job_id, suffix), expanded)
        })
        .collect()
}

fn axis_suffix(combo: &[(String, Value)]) -> String {
    let parts: Vec<String> = combo
        .iter()
        .map(|(axis, value)| format!("{}={}", axis, stringify(value)))
        .collect();
    format!("({})", parts.join(", "))
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::models::{Matrix, Strategy};
    use indexmap::IndexMap;
    use std::collections::HashMap;

    fn base_job() -> Job {
        Job {
            name: Some("Test".to_string()),
            needs: Default::default(),
            runs_on: None,
            if_condition: None,
            env: HashMap::new(),
            defaults: None,
            outputs: HashMap::new(),
            strategy: None,
            steps: Vec::new(),
            services: HashMap::new(),
            container: None,
            timeout_minutes: None,
            continue_on_error: Default::default(),
            permissions: None,
            concurrency: None,
            environment: None,
        }
    }

    fn matrix_of(pairs: &[(&str, Vec<Value>)]) -> Matrix {
        let mut dimensions = IndexMap::new();
        for (k, v) in pairs {
            dimensions.insert(k.to_string(), Value::Array(v.clone()));
        }
        Matrix {
            dimensions,
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    #[test]
    fn test_no_matrix_is_identity() {
        let job = base_job();
        let expanded = expand("t", &job);
        assert_eq!(expanded.len(), 1);
        assert_eq!(expanded[0].0, "t");
    }

    #[test]
    fn test_single_axis_cardinality() {
        let mut job = base_job();
        job.strategy = Some(Strategy {
            matrix: Some(matrix_of(&[(
                "node",
                vec![Value::from(18), Value::from(20)],
            )])),
            fail_fast: true,
            max_parallel: None,
        });

        let expanded = expand("t", &job);
        assert_eq!(expanded.len(), 2);
        assert_eq!(expanded[0].0, "t(node=18)");
        assert_eq!(expanded[1].0, "t(node=20)");
        assert_eq!(
            expanded[0].1.env.get("matrix.node"),
            Some(&"18".to_string())
        );
    }

    #[test]
    fn test_two_axis_last_varies_fastest() {
        let mut job = base_job();
        job.strategy = Some(Strategy {
            matrix: Some(matrix_of(&[
                (
                    "os",
                    vec![
                        Value::from("ubuntu-latest"),
                        Value::from("ubuntu-20.04"),
                    ],
                ),
                ("node", vec![Value::from(18), Value::from(20)]),
            ])),
            fail_fast: true,
            max_parallel: None,
        });

        let expanded = expand("t", &job);
        let ids: Vec<_> = expanded.iter().map(|(id, _)| id.clone()).collect();
        assert_eq!(
            ids,
            vec![
                "t(os=ubuntu-latest, node=18)".to_string(),
                "t(os=ubuntu-latest, node=20)".to_string(),
                "t(os=ubuntu-20.04, node=18)".to_string(),
                "t(os=ubuntu-20.04, node=20)".to_string(),
            ]
        );
    }

    #[test]
    fn test_ids_are_unique() {
        let mut job = base_job();
        job.strategy = Some(Strategy {
            matrix: Some(matrix_of(&[
                ("a", vec![Value::from(1), Value::from(2), Value::from(3)]),
                ("b", vec![Value::from("x"), Value::from("y")]),
            ])),
            fail_fast: true,
            max_parallel: None,
        });

        let expanded = expand("m", &job);
        assert_eq!(expanded.len(), 6);
        let mut ids: Vec<_> = expanded.iter().map(|(id, _)| id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn test_scalar_axis_treated_as_singleton() {
        let mut job = base_job();
        job.strategy = Some(Strategy {
            matrix: Some(matrix_of(&[("node", vec![Value::from(18)])])),
            fail_fast: true,
            max_parallel: None,
        });

        let expanded = expand("t", &job);
        assert_eq!(expanded.len(), 1);
        assert_eq!(expanded[0].0, "t(node=18)");
    }

    #[test]
    fn test_empty_matrix_yields_no_jobs() {
        let mut job = base_job();
        job.strategy = Some(Strategy {
            matrix: Some(Matrix {
                dimensions: IndexMap::new(),
                include: Vec::new(),
                exclude: Vec::new(),
            }),
            fail_fast: true,
            max_parallel: None,
        });

        let expanded = expand("t", &job);
        assert!(expanded.is_empty());
    }
}
