//! Batch benchmark: CSV rows → scored CSV, in memory.

use creditiq::batch::BatchScorer;
use creditiq::config::PolicyConfig;
use creditiq::model::{ModelBundle, ModelKind};
use creditiq::pipeline::InferencePipeline;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const BUNDLE: &str = r#"{
    "model": {
        "n_features": 4,
        "children_left":  [1, -1, 3, -1, -1],
        "children_right": [2, -1, 4, -1, -1],
        "feature":        [1, -2, 3, -2, -2],
        "threshold":      [0.0, -2.0, 0.5, -2.0, -2.0],
        "value":          [[60, 40], [85, 15], [30, 20], [58, 42], [10, 90]]
    },
    "scaler": { "kind": "standard", "mean": [35.0, 0.2, 2.0, 0.0], "scale": [10.0, 0.1, 1.0, 1.0] },
    "encoders": { "cb_person_default_on_file": { "classes": ["N", "Y"] } },
    "feature_columns": ["person_age", "loan_percent_income", "loan_grade", "cb_person_default_on_file"]
}"#;

fn make_csv(rows: usize) -> String {
    let mut s = String::from(
        "person_age,person_income,person_home_ownership,person_emp_length,loan_intent,loan_amnt,loan_int_rate,cb_person_default_on_file,cb_person_cred_hist_length\n",
    );
    for i in 0..rows {
        let income = 20_000 + (i % 50) * 2_000;
        let prior = if i % 7 == 0 { "Y" } else { "N" };
        s.push_str(&format!(
            "{},{},RENT,{},PERSONAL,{},{:.1},{},{}\n",
            21 + i % 40,
            income,
            i % 12,
            5_000 + (i % 30) * 500,
            8.0 + (i % 10) as f64,
            prior,
            2 + i % 15
        ));
    }
    s
}

fn bench_batch(c: &mut Criterion) {
    let bundle = ModelBundle::from_json(BUNDLE).unwrap();
    let pipeline = InferencePipeline::new(&bundle, &PolicyConfig::default()).unwrap();
    let scorer = BatchScorer::new(&pipeline, ModelKind::DecisionTree);

    let mut g = c.benchmark_group("batch_csv");
    for rows in [100, 1_000, 10_000] {
        let input = make_csv(rows);
        g.bench_function(format!("rows_{}", rows).as_str(), |b| {
            b.iter(|| {
                let mut out = Vec::with_capacity(input.len() * 2);
                black_box(scorer.score_csv(input.as_bytes(), &mut out))
            })
        });
    }
    g.finish();
}

criterion_group!(benches, bench_batch);
criterion_main!(benches);
