use clap::{Parser, Subcommand};
use glyco_core::config::{flag_from_env_value, resolve_model_path};
use glyco_core::constants::{
    DEFAULT_MODEL_PATH, DEFAULT_SAMPLE_SIZE, DEFAULT_SEED, DEFAULT_TEST_FRACTION,
    DEFAULT_TREE_COUNT,
};
use glyco_core::dataset::Dataset;
use glyco_core::forest::ForestParams;
use glyco_core::training::{train, TrainingParams};
use glyco_core::{
    ClassifierArtifact, CoreConfig, FeatureEncoder, PredictionService, Report, SurveyResponse,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "glyco")]
#[command(about = "Glyco diabetes risk survey CLI")]
struct Cli {
    /// Classifier artifact (defaults to GLYCO_MODEL_PATH, then model/model.json)
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a classifier on the health indicators CSV and write the artifact
    Train {
        /// Path to the diabetes_012 health indicators CSV
        #[arg(long)]
        data: PathBuf,
        /// Where to write the artifact
        #[arg(long, default_value = DEFAULT_MODEL_PATH)]
        out: PathBuf,
        /// Rows sampled before splitting
        #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE)]
        sample: usize,
        /// Number of trees in the forest
        #[arg(long, default_value_t = DEFAULT_TREE_COUNT)]
        trees: usize,
        /// Maximum tree depth (unbounded if omitted)
        #[arg(long)]
        max_depth: Option<usize>,
        /// Columns each tree is fitted on (all columns if omitted)
        #[arg(long)]
        max_features: Option<usize>,
        /// Seed for sampling, splitting and bootstrapping
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
        /// Share of the sample held out for evaluation
        #[arg(long, default_value_t = DEFAULT_TEST_FRACTION)]
        test_fraction: f64,
    },
    /// Predict from a JSON file of survey answers and print the report
    Predict {
        /// JSON file holding one survey response
        #[arg(long)]
        answers: PathBuf,
    },
    /// Print the metadata of the classifier artifact
    Inspect,
    /// Print class distribution and feature/label correlations of a dataset
    Summarise {
        /// Path to the diabetes_012 health indicators CSV
        #[arg(long)]
        data: PathBuf,
    },
}

fn core_config(model: Option<PathBuf>) -> Result<CoreConfig, Box<dyn std::error::Error>> {
    let model = model.or_else(|| std::env::var("GLYCO_MODEL_PATH").ok().map(PathBuf::from));
    let require_checksum =
        flag_from_env_value(std::env::var("GLYCO_REQUIRE_CHECKSUM").ok(), false)?;
    Ok(CoreConfig::new(resolve_model_path(model)?, require_checksum)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("glyco_core=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Train {
            data,
            out,
            sample,
            trees,
            max_depth,
            max_features,
            seed,
            test_fraction,
        }) => {
            let dataset = Dataset::from_csv(&data)?;
            println!(
                "Dataset: {} rows x {} features",
                dataset.len(),
                glyco_core::FEATURE_COUNT
            );
            for count in dataset.class_distribution() {
                println!(
                    "  class {}: {} ({:.2}%)",
                    count.class,
                    count.count,
                    count.fraction * 100.0
                );
            }

            let params = TrainingParams {
                sample_size: sample,
                seed,
                test_fraction,
                forest: ForestParams {
                    n_trees: trees,
                    max_depth,
                    max_features,
                    ..ForestParams::default()
                },
            };
            let mut outcome = train(&dataset, &params)?;

            println!(
                "\nTrained on {} rows, evaluated on {} rows",
                outcome.train_rows, outcome.test_rows
            );
            println!("\nConfusion matrix:\n{}", outcome.evaluation.confusion_table());
            println!("Classification report:\n{}", outcome.evaluation);

            let digest = outcome.artifact.save(&out)?;
            println!("Wrote {} (sha256 {})", out.display(), digest);
        }
        Some(Commands::Predict { answers }) => {
            let contents = std::fs::read_to_string(&answers)?;
            let survey: SurveyResponse = serde_json::from_str(&contents)?;

            let cfg = Arc::new(core_config(cli.model)?);
            let service = PredictionService::new(cfg).load()?;
            let features = FeatureEncoder::new().encode(&survey)?;
            let result = service.predict(&features)?;

            print!("{}", Report::new(&features, &result).render_text());
        }
        Some(Commands::Inspect) => {
            let cfg = core_config(cli.model)?;
            let artifact = ClassifierArtifact::load(cfg.model_path(), cfg.require_checksum())?;
            let info = artifact.info();

            println!("Artifact:      {}", cfg.model_path().display());
            println!("Schema:        {}", info.schema);
            println!("Trained at:    {}", info.trained_at.to_rfc3339());
            println!("Training rows: {}", info.training_rows);
            println!("Trees:         {}", info.tree_count);
            println!("Classes:       {:?}", info.classes);
            println!("Checksum:      {}", info.checksum.as_deref().unwrap_or("-"));
            println!("Features:      {}", info.feature_names.join(", "));
        }
        Some(Commands::Summarise { data }) => {
            let dataset = Dataset::from_csv(&data)?;
            println!("Rows: {}", dataset.len());
            println!("\nClass distribution (0 = No, 1 = Pre, 2 = Yes):");
            for count in dataset.class_distribution() {
                println!(
                    "  {:>2}  {:>8}  {:>6.2}%",
                    count.class,
                    count.count,
                    count.fraction * 100.0
                );
            }

            let mut correlations = dataset.label_correlations();
            correlations.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
            println!("\nCorrelation with Diabetes_012:");
            for (name, r) in correlations {
                println!("  {name:<22} {r:>+.4}");
            }
        }
        None => {
            println!("Use 'glyco --help' for commands");
        }
    }

    Ok(())
}
