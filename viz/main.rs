//! shallow-net visualization server
//!
//! Serves the two requests a drawing client needs: classify a drawn digit,
//! and classify a random test digit of a chosen class. Both return the
//! normalized output probabilities and hidden-layer activations.
//!
//! Run with:
//!   cargo run --bin viz --release -- [config.json]
//! Then POST JSON to http://127.0.0.1:5000/interact or /random.

mod routes;
mod state;

use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tiny_http::Server;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use shallow_net::{AppConfig, CheckpointStore, Classifier, Dataset, Parameters};

use state::VizState;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => match AppConfig::load_json(&path) {
            Ok(config) => config,
            Err(e) => {
                error!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => AppConfig::default(),
    };

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // Best checkpoint, or fresh weights when none has been saved yet.
    let store = CheckpointStore::new(&config.checkpoint_dir);
    let mut model = Classifier::new();
    match model.load_best(&store) {
        Ok(Some(info)) => info!(checkpoint = %info.id, accuracy = info.accuracy, "model loaded"),
        Ok(None) => {
            warn!(dir = %store.dir().display(), "no checkpoints found; run `shallow-net train` first. Using fresh weights");
            model.set_parameters(Parameters::initialize(
                config.input_size,
                config.hidden_size,
                config.output_size,
                &mut rng,
            ));
        }
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    }

    let dataset = match Dataset::load(&config.dataset) {
        Ok(dataset) => Some(dataset),
        Err(e) => {
            warn!("{}; random examples are unavailable", e);
            None
        }
    };

    let server = match Server::http(config.bind_addr.as_str()) {
        Ok(server) => server,
        Err(e) => {
            error!(addr = %config.bind_addr, "failed to bind HTTP server: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(addr = %config.bind_addr, "listening");

    let shared_state = Arc::new(Mutex::new(VizState::new(model, dataset, rng)));

    for request in server.incoming_requests() {
        let state_clone = shared_state.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }

    ExitCode::SUCCESS
}
