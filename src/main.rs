//! CreditIQ command line: score one applicant, score a CSV batch, or describe the loaded bundle.
//! Configuration comes from CREDITIQ_CONFIG_PATH (default `creditiq.json`); flags override it.

use clap::{Args, Parser, Subcommand};
use creditiq::{
    batch::BatchScorer,
    config::AppConfig,
    error::{ErrorKind, PipelineError, Result},
    features::ApplicantRecord,
    logging::{PredictionLog, StructuredLogger},
    model::{ModelBundle, ModelKind},
    pipeline::{Assessment, InferencePipeline},
};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "creditiq",
    version,
    about = "Credit-risk prediction from a pre-trained decision tree / logistic regression bundle"
)]
struct Cli {
    /// Model bundle file (overrides the configured search paths)
    #[arg(long, global = true, value_name = "FILE")]
    bundle: Option<PathBuf>,

    /// Classifier to use: dt (decision tree) or lr (logistic regression)
    #[arg(long, global = true, value_name = "MODEL")]
    model: Option<ModelKind>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score a single applicant
    Predict(PredictArgs),
    /// Score every row of a CSV file
    Batch(BatchArgs),
    /// Show dataset size, thresholds and metrics of the loaded bundle
    Info,
}

#[derive(Debug, Args)]
struct PredictArgs {
    #[arg(long, default_value_t = 30.0)]
    age: f64,
    /// Annual income ($)
    #[arg(long, default_value_t = 50_000.0)]
    income: f64,
    /// RENT, OWN, MORTGAGE or OTHER
    #[arg(long, default_value = "RENT")]
    home_ownership: String,
    /// Employment length (years)
    #[arg(long, default_value_t = 5.0)]
    emp_length: f64,
    /// PERSONAL, EDUCATION, MEDICAL, VENTURE, HOMEIMPROVEMENT or DEBTCONSOLIDATION
    #[arg(long, default_value = "PERSONAL")]
    intent: String,
    /// Loan amount ($)
    #[arg(long, default_value_t = 10_000.0)]
    amount: f64,
    /// Interest rate (%)
    #[arg(long, default_value_t = 11.0)]
    rate: f64,
    /// Prior default on file: Y or N
    #[arg(long, default_value = "N")]
    prior_default: String,
    /// Credit history length (years)
    #[arg(long, default_value_t = 5.0)]
    credit_history: f64,
    /// Print one JSON line instead of the text summary
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct BatchArgs {
    /// Input CSV
    #[arg(value_name = "FILE")]
    input: PathBuf,
    /// Output CSV (stdout when omitted)
    #[arg(short = 'o', long = "out", value_name = "FILE")]
    output: Option<PathBuf>,
}

impl PredictArgs {
    fn record(&self) -> ApplicantRecord {
        ApplicantRecord {
            age: self.age,
            annual_income: self.income,
            home_ownership: self.home_ownership.to_ascii_uppercase(),
            employment_years: self.emp_length,
            loan_intent: self.intent.to_ascii_uppercase(),
            loan_amount: self.amount,
            interest_rate: self.rate,
            prior_default: self.prior_default.to_ascii_uppercase(),
            credit_history_years: self.credit_history,
        }
    }
}

fn print_assessment(a: &Assessment, bundle: &ModelBundle, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{} · threshold {}", a.model, a.threshold)?;
    writeln!(out, "{}  ({}% default probability)", a.verdict(), a.probability_percent())?;
    writeln!(out, "  Risk band:      {}", a.band_label())?;
    writeln!(out, "  Confidence:     {:.1}%", a.result.confidence * 100.0)?;
    writeln!(
        out,
        "  Loan grade:     {} (proxy score {:.1})",
        a.derived.loan_grade, a.derived.risk_proxy_score
    )?;
    writeln!(out, "  Loan / income:  {:.1}% (auto)", a.derived.loan_percent_income * 100.0)?;

    let drivers = bundle.metrics(a.model).top_drivers(3);
    if !drivers.is_empty() {
        writeln!(out, "  Top drivers:")?;
        for (i, d) in drivers.iter().enumerate() {
            let direction = match d.raises_risk {
                Some(true) => "  ↑ default",
                Some(false) => "  ↓ good loan",
                None => "",
            };
            writeln!(out, "    {}. {:<28} {:>8.4}{}", i + 1, d.feature, d.weight, direction)?;
        }
    }
    Ok(())
}

fn print_info(bundle: &ModelBundle, out: &mut impl Write) -> io::Result<()> {
    let d = &bundle.dataset_info;
    writeln!(
        out,
        "Dataset: {} samples ({} train / {} test), {} features",
        d.total_samples, d.train_samples, d.test_samples, d.n_features
    )?;
    if let Some(sha) = &bundle.fingerprint {
        writeln!(out, "Bundle sha256: {sha}")?;
    }
    writeln!(
        out,
        "Input features ({}): {}",
        bundle.feature_columns.len(),
        bundle.feature_columns.join(", ")
    )?;

    // side by side
    let kinds = bundle.available_models();
    writeln!(out)?;
    write!(out, "{:<22}", "")?;
    for kind in &kinds {
        write!(out, "{:>22}", kind.label())?;
    }
    writeln!(out)?;
    let rows: [(&str, fn(&ModelBundle, ModelKind) -> Option<f64>); 6] = [
        ("Threshold", |b, k| Some(b.threshold(k))),
        ("Accuracy", |b, k| Some(b.metrics(k).test_accuracy)),
        ("ROC-AUC", |b, k| Some(b.metrics(k).roc_auc)),
        ("Default precision", |b, k| b.metrics(k).default_class().map(|c| c.precision)),
        ("Default recall", |b, k| b.metrics(k).default_class().map(|c| c.recall)),
        ("Default F1", |b, k| b.metrics(k).default_class().map(|c| c.f1_score)),
    ];
    for (label, value) in rows {
        write!(out, "{label:<22}")?;
        for kind in &kinds {
            match value(bundle, *kind) {
                Some(v) => write!(out, "{v:>22.4}")?,
                None => write!(out, "{:>22}", "-")?,
            }
        }
        writeln!(out)?;
    }

    for kind in kinds {
        let m = bundle.metrics(kind);
        writeln!(out)?;
        writeln!(out, "{kind}")?;
        if m.is_empty() {
            writeln!(out, "  no metrics available")?;
            continue;
        }
        let report = m.classification_report();
        if !report.is_empty() {
            writeln!(
                out,
                "  {:<16}{:>10}{:>10}{:>10}{:>10}",
                "", "precision", "recall", "f1-score", "support"
            )?;
            for (label, c) in report {
                let support = c.support.map(|n| n.to_string()).unwrap_or_default();
                writeln!(
                    out,
                    "  {:<16}{:>10.4}{:>10.4}{:>10.4}{:>10}",
                    label, c.precision, c.recall, c.f1_score, support
                )?;
            }
        }
        if let Some([[tn, fp], [fn_, tp]]) = m.confusion_matrix {
            writeln!(out, "  Confusion: TN {tn}  FP {fp}  FN {fn_}  TP {tp}")?;
        }
        for (i, drv) in m.top_drivers(3).iter().enumerate() {
            writeln!(out, "  {}. {} ({:.4})", i + 1, drv.feature, drv.weight)?;
        }
    }
    Ok(())
}

/// Prediction output for `predict`: a text summary, or one JSON line with `--json`.
fn render_prediction(
    a: &Assessment,
    bundle: &ModelBundle,
    json: bool,
    out: &mut impl Write,
) -> io::Result<()> {
    if json {
        let line = PredictionLog::new(a, bundle.fingerprint.as_deref());
        StructuredLogger::emit_json(&line, out)
    } else {
        print_assessment(a, bundle, out)
    }
}

fn run(cli: &Cli, config: &AppConfig) -> Result<()> {
    let bundle = ModelBundle::shared(&config.bundle_paths)?;
    let pipeline = InferencePipeline::new(bundle, &config.policy)?;
    let kind = cli.model.unwrap_or(config.default_model);

    match &cli.command {
        Command::Predict(args) => {
            let record = args.record();
            record.validate()?;
            let assessment = pipeline.assess(&record, kind)?;
            render_prediction(&assessment, pipeline.bundle(), args.json, &mut io::stdout().lock())?;
        }
        Command::Batch(args) => {
            let input = File::open(&args.input)
                .map_err(|e| PipelineError::from(e).context(args.input.display()))?;
            let scorer = BatchScorer::new(&pipeline, kind)
                .with_probability_cap(config.policy.batch_probability_cap);
            let summary = match &args.output {
                Some(path) => {
                    let out = File::create(path)
                        .map_err(|e| PipelineError::from(e).context(path.display()))?;
                    scorer.score_csv(BufReader::new(input), BufWriter::new(out))?
                }
                None => scorer.score_csv(BufReader::new(input), io::stdout().lock())?,
            };
            eprintln!(
                "{} rows: {} low / {} medium / {} high risk, {} predicted defaults",
                summary.rows, summary.low, summary.medium, summary.high, summary.predicted_defaults
            );
        }
        Command::Info => print_info(pipeline.bundle(), &mut io::stdout().lock())?,
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = std::env::var("CREDITIQ_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("creditiq.json"));
    let mut config = match AppConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::from(2);
        }
    };
    if let Some(path) = &cli.bundle {
        config.bundle_paths = vec![path.clone()];
    }

    StructuredLogger::init(config.log.json, &config.log.level);
    info!(config = %config_path.display(), "creditiq starting");

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.kind() == ErrorKind::ArtifactMissing => {
            eprintln!("{}", e.message());
            eprintln!("Place dt_model.json next to the binary, in model/, or pass --bundle.");
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("Prediction failed: {e}");
            ExitCode::FAILURE
        }
    }
}
