//! shallow-net command line.
//!
//! Run with:
//!   cargo run --release -- train               # fresh weights
//!   cargo run --release -- train --resume      # continue from the best checkpoint
//!   cargo run --release -- evaluate            # test accuracy of the best checkpoint
//!   cargo run --release -- list                # stored checkpoints, best first
//!   cargo run --release -- config --output cfg.json

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use shallow_net::{
    AppConfig, CheckpointStore, Classifier, Dataset, Error, Initialization, Result, Split, TrainConfig,
};

#[derive(Parser)]
#[command(name = "shallow-net", version, about = "One-hidden-layer digit classifier")]
struct Cli {
    /// JSON config file; missing keys use built-in defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the checkpoint directory.
    #[arg(long, global = true)]
    checkpoint_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train on the training split, report test accuracy and save a checkpoint.
    Train(TrainArgs),
    /// Report test accuracy of a stored checkpoint.
    Evaluate {
        /// Checkpoint file name; defaults to the best one.
        #[arg(long)]
        checkpoint: Option<String>,
    },
    /// List stored checkpoints, best first.
    List,
    /// Write the effective configuration (file + overrides) as JSON.
    Config {
        /// Destination file.
        #[arg(long)]
        output: PathBuf,
    },
}

#[derive(Args)]
struct TrainArgs {
    /// Continue from the best stored checkpoint (fresh weights if there is none).
    #[arg(long, conflicts_with = "checkpoint")]
    resume: bool,
    /// Continue from this checkpoint file name.
    #[arg(long)]
    checkpoint: Option<String>,
    #[arg(long)]
    epochs: Option<usize>,
    #[arg(long)]
    learning_rate: Option<f64>,
    #[arg(long)]
    hidden_size: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_json(path)?,
        None => AppConfig::default(),
    };
    if let Some(dir) = cli.checkpoint_dir {
        config.checkpoint_dir = dir;
    }
    let store = CheckpointStore::new(&config.checkpoint_dir);

    match cli.command {
        Command::Train(args) => train(config, &store, args),
        Command::Evaluate { checkpoint } => evaluate(&config, &store, checkpoint),
        Command::List => list(&store),
        Command::Config { output } => {
            config.save_json(&output)?;
            info!(path = %output.display(), "configuration written");
            Ok(())
        }
    }
}

fn train(mut config: AppConfig, store: &CheckpointStore, args: TrainArgs) -> Result<()> {
    if let Some(epochs) = args.epochs {
        config.epochs = epochs;
    }
    if let Some(lr) = args.learning_rate {
        config.learning_rate = lr;
    }
    if let Some(hidden) = args.hidden_size {
        config.hidden_size = hidden;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate()?;

    let init = match (args.checkpoint, args.resume) {
        (Some(id), _) => Initialization::ResumeFrom(id),
        (None, true) => Initialization::ResumeBest,
        (None, false) => Initialization::Fresh,
    };

    let dataset = Dataset::load(&config.dataset)?;
    if dataset.feature_count() != config.input_size {
        return Err(Error::Shape(format!(
            "dataset has {} features, config expects {}",
            dataset.feature_count(),
            config.input_size
        )));
    }

    info!(
        input_size = config.input_size,
        hidden_size = config.hidden_size,
        output_size = config.output_size,
        epochs = config.epochs,
        learning_rate = config.learning_rate,
        "model initialized"
    );

    let train_config = TrainConfig::new(
        config.input_size,
        config.hidden_size,
        config.output_size,
        config.epochs,
        config.learning_rate,
    )
    .with_init(init);

    let mut rng = make_rng(config.seed);
    let (x_train, y_train) = dataset.batch(Split::Train);
    let mut model = Classifier::new();
    let report = model.train(&x_train, &y_train, &train_config, Some(store), &mut rng)?;
    if let Some(loss) = report.final_loss() {
        info!(epochs = report.epochs_completed, loss, "training finished");
    }

    let (x_test, y_test) = dataset.batch(Split::Test);
    let accuracy = model.accuracy(&x_test, &y_test)?;
    info!(accuracy, "test accuracy");

    let id = store.save(&report.params, accuracy, &config.checkpoint_name)?;
    println!("{}", id);
    Ok(())
}

fn evaluate(config: &AppConfig, store: &CheckpointStore, checkpoint: Option<String>) -> Result<()> {
    let mut model = Classifier::new();
    let id = match checkpoint {
        Some(id) => {
            model.load_checkpoint(store, &id)?;
            id
        }
        None => match model.load_best(store)? {
            Some(info) => info.id,
            None => return Err(Error::MissingCheckpoint(store.dir().to_path_buf())),
        },
    };

    let dataset = Dataset::load(&config.dataset)?;
    let (x_test, y_test) = dataset.batch(Split::Test);
    let accuracy = model.accuracy(&x_test, &y_test)?;
    println!("{}\taccuracy={:.2}", id, accuracy);
    Ok(())
}

fn list(store: &CheckpointStore) -> Result<()> {
    for info in store.list()? {
        let created = info
            .created
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_owned());
        println!("{}\t{}\t{}", info.accuracy, created, info.id);
    }
    Ok(())
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
