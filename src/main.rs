// main.rs — sentvec_host: a framed-JSON host around the averaging engine.
//
// The host plays the orchestration side of the core's contract: it loads
// the trained tables, owns the output matrix, chunks incoming sentences
// into jobs, and reports effective counts back to the driving process.

use std::io::{stdin, stdout};
use std::sync::Arc;

use anyhow::{bail, Context};
use serde_json::Value;

use sentvec::average::Average;
use sentvec::config;
use sentvec::framing;
use sentvec::job::{chunk_by_words, JobStats, TrainJob};
use sentvec::lexicon::{Lexicon, SubwordParams, SubwordVectors, VectorTable};
use sentvec::output::SentenceVectors;
use sentvec::protocol::{LoadModelParams, PrepareParams, TrainParams};
use sentvec::vocab::Vocabulary;
use sentvec::{logging, protocol};

struct HostState {
    job: Option<Average>,
    output: Option<SentenceVectors>,
    totals: JobStats,
}

impl HostState {
    fn new() -> Self {
        Self {
            job: None,
            output: None,
            totals: JobStats::default(),
        }
    }
}

fn main() {
    if let Err(e) = real_main() {
        // Keep stderr noisy for bug reports; logs also go to file.
        eprintln!("[sentvec host] fatal error: {e:?}");
        log::error!("Fatal error: {:?}", e);
        std::process::exit(1);
    }
}

fn real_main() -> anyhow::Result<()> {
    // Short-lived argv mode, used by installers and smoke tests.
    let args: Vec<String> = std::env::args().collect();
    if args.iter().skip(1).any(|a| a == "--version") {
        println!("sentvec_host {}", config::HOST_VERSION);
        return Ok(());
    }

    logging::init_logging()?;

    log::info!("=== sentvec host started ===");
    log::info!("Waiting for framed requests on stdin...");

    let mut state = HostState::new();
    let mut in_stream = stdin();
    let mut out_stream = stdout();

    let mut message_count: u64 = 0;
    loop {
        let req = match framing::read_request(&mut in_stream) {
            Ok(Some(r)) => r,
            Ok(None) => {
                log::info!("No more requests after {} messages, exiting", message_count);
                break;
            }
            Err(e) => {
                log::error!("Error reading request: {:?}", e);
                break;
            }
        };

        message_count += 1;
        log::debug!("Processing request #{}: {} (id: {})", message_count, req.method, req.id);

        match handle_request(&mut state, &req.method, &req.id, &req.params) {
            Ok(v) => {
                if let Err(e) = framing::write_value(&mut out_stream, &v) {
                    log::error!("Error sending response: {:?}", e);
                    break;
                }
            }
            Err(e) => {
                log::error!("Handler error for {}: {:?}", req.method, e);
                let err = serde_json::json!({ "id": req.id, "error": format!("{e}") });
                let _ = framing::write_value(&mut out_stream, &err);
            }
        }
    }

    log::info!("=== sentvec host stopped ===");
    Ok(())
}

fn handle_request(state: &mut HostState, method: &str, msg_id: &str, params: &Value) -> anyhow::Result<Value> {
    match method {
        "hello" => handle_hello(state, msg_id),
        "loadModel" => handle_load_model(state, msg_id, params),
        "prepare" => handle_prepare(state, msg_id, params),
        "trainBatch" => handle_train_batch(state, msg_id, params),
        "getVectors" => handle_get_vectors(state, msg_id),
        "stats" => handle_stats(state, msg_id),
        _ => Ok(serde_json::json!({ "id": msg_id, "error": format!("Unknown method: {method}") })),
    }
}

fn require_job(state: &HostState) -> anyhow::Result<&Average> {
    state.job.as_ref().context("Model not loaded. Call 'loadModel' first.")
}

fn require_output(state: &mut HostState) -> anyhow::Result<&mut SentenceVectors> {
    state.output.as_mut().context("Output matrix not allocated. Call 'prepare' first.")
}

fn handle_hello(state: &HostState, msg_id: &str) -> anyhow::Result<Value> {
    Ok(serde_json::json!({
        "id": msg_id,
        "result": {
            "type": "hello-response",
            "hostImpl": "rust",
            "hostVersion": config::HOST_VERSION,
            "modelLoaded": state.job.is_some(),
            "subword": state.job.as_ref().map(|j| j.has_subword()).unwrap_or(false),
            "preparedRows": state.output.as_ref().map(|o| o.rows()),
        }
    }))
}

fn handle_load_model(state: &mut HostState, msg_id: &str, params: &Value) -> anyhow::Result<Value> {
    let params: LoadModelParams =
        serde_json::from_value(params.clone()).context("invalid loadModel params")?;

    let vocab = Vocabulary::from_entries(params.vocab)?;
    let words = vocab.len();
    let vectors = VectorTable::from_rows(params.size, &params.vectors)?;
    let weights = params.weights.unwrap_or_else(|| vec![1.0; words]);
    let lexicon = Arc::new(Lexicon::new(vocab, vectors, weights)?);

    let subword = match params.subword {
        Some(block) => Some(Arc::new(build_subword(params.size, block)?)),
        None => None,
    };
    let has_subword = subword.is_some();

    // The unit-weight gate fires here, before any batch is accepted.
    let job = Average::new(lexicon, subword)?;

    log::info!(
        "Model loaded: {} words, size {}, subword fallback: {}",
        words,
        params.size,
        has_subword
    );

    state.job = Some(job);
    state.output = None;
    state.totals = JobStats::default();

    Ok(serde_json::json!({
        "id": msg_id,
        "result": { "ok": true, "words": words, "size": params.size, "subword": has_subword }
    }))
}

fn build_subword(size: usize, block: protocol::SubwordBlock) -> anyhow::Result<SubwordVectors> {
    let params = SubwordParams {
        min_n: block.min_n,
        max_n: block.max_n,
        bucket: block.bucket,
    };
    let vectors = VectorTable::from_rows(size, &block.vectors)?;
    SubwordVectors::new(params, vectors)
}

fn handle_prepare(state: &mut HostState, msg_id: &str, params: &Value) -> anyhow::Result<Value> {
    let params: PrepareParams =
        serde_json::from_value(params.clone()).context("invalid prepare params")?;
    let size = require_job(state)?.size();

    state.output = Some(SentenceVectors::zeros(params.rows, size)?);
    state.totals = JobStats::default();
    log::info!("Output matrix prepared: {} rows x {}", params.rows, size);

    Ok(serde_json::json!({
        "id": msg_id,
        "result": { "ok": true, "rows": params.rows, "size": size }
    }))
}

fn handle_train_batch(state: &mut HostState, msg_id: &str, params: &Value) -> anyhow::Result<Value> {
    let params: TrainParams =
        serde_json::from_value(params.clone()).context("invalid trainBatch params")?;
    let Some(job) = state.job.as_ref() else {
        bail!("Model not loaded. Call 'loadModel' first.");
    };
    let Some(output) = state.output.as_mut() else {
        bail!("Output matrix not allocated. Call 'prepare' first.");
    };

    // Batch boundaries are host policy; the engine takes jobs as given.
    let mut stats = JobStats::default();
    for chunk in chunk_by_words(&params.sentences, config::batch::MAX_WORDS_IN_BATCH) {
        stats += job.do_train_job(chunk, output)?;
    }
    state.totals += stats;

    if stats.sentences == 0 && !params.sentences.is_empty() {
        // Corpus/vocabulary mismatch signal: nothing resolved anywhere.
        log::warn!("trainBatch produced 0 effective sentences out of {}", params.sentences.len());
    }

    Ok(serde_json::json!({
        "id": msg_id,
        "result": { "ok": true, "sentences": stats.sentences, "words": stats.words }
    }))
}

fn handle_get_vectors(state: &mut HostState, msg_id: &str) -> anyhow::Result<Value> {
    let output = require_output(state)?;
    Ok(serde_json::json!({
        "id": msg_id,
        "result": { "rows": output.to_rows() }
    }))
}

fn handle_stats(state: &mut HostState, msg_id: &str) -> anyhow::Result<Value> {
    Ok(serde_json::json!({
        "id": msg_id,
        "result": {
            "ok": true,
            "sentences": state.totals.sentences,
            "words": state.totals.words,
            "preparedRows": state.output.as_ref().map(|o| o.rows()),
        }
    }))
}
