//! Console binary entry point

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::io::BufReader;
use tokio::signal;

use shared::{logging, process_debug, process_info, ProcessId, SchemaQuery};
use sv_console::core::ConfigStore;
use sv_console::panels::blend;
use sv_console::panels::control::{self, ExpectationInput};
use sv_console::panels::evaluate;
use sv_console::panels::film_plan::{self, FilmPlanInput};
use sv_console::panels::generate::{self, GenerateInput};
use sv_console::panels::library::{self, BibleView};
use sv_console::panels::retrieval::{self, SearchInput};
use sv_console::{
    services::{FileConfigStorage, RealApiGateway, DEFAULT_BASE_URL, DEFAULT_STATE_FILE},
    AppState, Console, ConsoleApi, ConsoleError, Shell,
};

/// Operator console for the SV composition service
#[derive(Parser)]
#[command(name = "sv-console")]
#[command(about = "Plan, compose and inspect stories against an SV backend")]
struct Args {
    /// Backend base URL
    #[arg(long, env = "SV_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    api_base_url: String,

    /// File holding the bankset and harness between runs
    #[arg(long, env = "SV_STATE_FILE", default_value = DEFAULT_STATE_FILE)]
    state_file: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SV_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,

    /// Health polling period in seconds (shell only)
    #[arg(long, default_value = "30")]
    health_interval_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Raw `/health` payload
    Health,
    /// Service status and default harness
    Status,
    /// Banks offered by the service
    Banks,
    /// Show or replace the persisted bankset
    Bankset {
        /// Bank ids; none prints the current set
        ids: Vec<String>,
    },
    /// Show or set the generation harness
    Harness { name: Option<String> },
    /// Browse bible collections
    Bible {
        #[command(subcommand)]
        view: BibleCommand,
        /// Only keep entries whose id or lemma contains this term
        #[arg(long, global = true)]
        filter: Option<String>,
    },
    /// Retrieval search
    Search {
        query: String,
        #[arg(long, default_value_t = shared::SearchRequest::DEFAULT_K)]
        k: u32,
        /// Kinds to search (schema, metaphor, frame, exemplar)
        #[arg(long, value_delimiter = ',')]
        kinds: Vec<String>,
    },
    /// Plan, then compose every planned beat
    Compose {
        #[arg(long)]
        frame: String,
        #[arg(long)]
        query: String,
        #[arg(long, default_value_t = sv_console::core::workflow::DEFAULT_K)]
        k: u32,
        /// Comma separated beats; defaults to the planned beats
        #[arg(long, default_value = "")]
        beats: String,
        /// Also regenerate this beat after composing
        #[arg(long)]
        beat: Option<String>,
    },
    /// One-shot generation
    Generate {
        #[arg(long)]
        frame: String,
        #[arg(long)]
        query: String,
        #[arg(long, default_value = "")]
        beats: String,
        /// Harness; the configured one when omitted
        #[arg(long)]
        llm: Option<String>,
    },
    /// Blend an active state given as JSON
    Blend {
        /// Active state JSON; a sample state when omitted
        #[arg(long)]
        active: Option<String>,
        #[arg(long)]
        explosion_fired: bool,
    },
    /// Evaluate one piece
    Evaluate {
        piece: String,
        #[arg(long, default_value = "")]
        trace: String,
    },
    /// Evaluate a JSON array of items read from a file
    EvaluateBatch { file: PathBuf },
    /// Check a frame against an active state and/or trace
    Framecheck {
        frame: String,
        #[arg(long, default_value = "")]
        active: String,
        #[arg(long, default_value = "")]
        trace: String,
    },
    /// Expectation curve for active metaphors
    Expectation {
        /// Comma separated metaphors
        metaphors: String,
        #[arg(long)]
        beats: Option<String>,
        /// Comma separated axis:pole pairs
        #[arg(long, default_value = "")]
        poles: String,
        #[arg(long, default_value = shared::ExpectationRequest::DEFAULT_BASE)]
        base: String,
    },
    /// Viewpoint analysis of a prompt
    Viewpoint {
        prompt: String,
        #[arg(long)]
        frame: Option<String>,
        #[arg(long, default_value = shared::DEFAULT_LANG)]
        lang: String,
    },
    /// Attention probe over a text
    Attention {
        text: String,
        #[arg(long, default_value = shared::DEFAULT_LANG)]
        lang: String,
        #[arg(long, default_value_t = shared::AttentionRequest::DEFAULT_TOP_K)]
        top_k: u32,
    },
    /// Gold set statistics
    Gold,
    /// Film plan for a prompt
    FilmPlan {
        prompt: String,
        #[arg(long)]
        frame: Option<String>,
        #[arg(long)]
        beats: Option<String>,
        #[arg(long, default_value_t = shared::FilmPlanRequest::DEFAULT_TOTAL_DURATION_SEC)]
        total_duration: u32,
        #[arg(long, default_value_t = shared::FilmPlanRequest::DEFAULT_SCENE_LENGTH_SEC)]
        scene_length: u32,
        #[arg(long, default_value = shared::FilmPlanRequest::DEFAULT_ASPECT_RATIO)]
        aspect_ratio: String,
        #[arg(long, default_value = shared::FilmPlanRequest::DEFAULT_ALLOCATION_MODE)]
        allocation_mode: String,
        #[arg(long)]
        style_pack: Option<String>,
        #[arg(long)]
        llm_enrich: bool,
        #[arg(long, default_value_t = shared::FilmPlanRequest::DEFAULT_TEMPERATURE)]
        temperature: f64,
        #[arg(long)]
        seed: Option<i64>,
    },
    /// Interactive shell
    Shell,
}

#[derive(Subcommand, Clone)]
enum BibleCommand {
    Schemas {
        #[arg(long)]
        validate: bool,
        #[arg(long)]
        source: Option<String>,
    },
    Compat,
    Lexicon,
    Metaphors {
        #[arg(long)]
        validate: bool,
    },
    Frames,
    BlendRules,
}

impl From<BibleCommand> for BibleView {
    fn from(command: BibleCommand) -> Self {
        match command {
            BibleCommand::Schemas { validate, source } => BibleView::Schemas(SchemaQuery { validate, source }),
            BibleCommand::Compat => BibleView::Compat,
            BibleCommand::Lexicon => BibleView::Lexicon,
            BibleCommand::Metaphors { validate } => BibleView::Metaphors { validate },
            BibleCommand::Frames => BibleView::Frames,
            BibleCommand::BlendRules => BibleView::BlendRules,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Attach the operator-facing message to a failed call
fn explain(error: ConsoleError, fallback: &str) -> anyhow::Error {
    anyhow!(error.user_message(fallback))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    if matches!(args.command, Command::Shell) {
        ProcessId::init_shell();
    } else {
        ProcessId::init_cli();
    }
    logging::init_tracing_with_level(Some(&args.log_level));
    process_debug!(ProcessId::current(), "Backend: {}, state file: {}", args.api_base_url, args.state_file.display());

    let storage = Arc::new(FileConfigStorage::new(&args.state_file));
    let config = Arc::new(ConfigStore::load(storage));
    let gateway = RealApiGateway::with_timeout(
        &args.api_base_url,
        config.clone(),
        Duration::from_secs(args.timeout_secs.max(1)),
    )
    .context("Invalid backend address")?;
    let console = Console::new(Arc::new(gateway), AppState::new(config.clone()));
    let api = console.api();

    match args.command {
        Command::Health => print_json(&api.health().await.map_err(|e| explain(e, "Health check failed"))?)?,
        Command::Status => {
            let status = console.refresh_status().await.map_err(|e| explain(e, library::STATUS_FAILED))?;
            print_json(&status)?;
        }
        Command::Banks => print_json(&library::banks(api).await.map_err(|e| explain(e, library::BANKS_FAILED))?)?,
        Command::Bankset { ids } => {
            let ids: Vec<String> = ids.iter().flat_map(|id| sv_console::core::workflow::to_list(id)).collect();
            if !ids.is_empty() {
                if let Err(e) = console.refresh_banks().await {
                    logging::log_error(ProcessId::current(), "Loading banks", &e);
                }
                console.apply_bankset(ids).await;
            }
            print_json(&config.bankset())?;
        }
        Command::Harness { name } => {
            let harness = match name {
                Some(name) => console.set_harness(&name),
                None => config.harness(),
            };
            println!("{}", harness);
        }
        Command::Bible { view, filter } => {
            let view = BibleView::from(view);
            let payload = library::bible(api, &view)
                .await
                .map_err(|e| explain(e, &view.failure_message()))?;
            match filter {
                Some(term) => print_json(&library::filter_entries(&view, &payload, &term))?,
                None => print_json(&payload)?,
            }
        }
        Command::Search { query, k, kinds } => {
            let input = SearchInput { query, k, kinds };
            let result = retrieval::search(api, input).await.map_err(|e| explain(e, retrieval::FAILED))?;
            print_json(&result)?;
        }
        Command::Compose { frame, query, k, beats, beat } => {
            let session = console.compose_session();
            let beats = sv_console::core::workflow::to_list(&beats);
            session
                .run_plan(&frame, &query, k)
                .await
                .map_err(|e| explain(e, sv_console::core::workflow::PLAN_FAILED))?;
            let composed = session
                .run_compose(&frame, &query, (!beats.is_empty()).then_some(beats))
                .await
                .map_err(|e| explain(e, sv_console::core::workflow::COMPOSE_FAILED))?;
            print_json(&composed)?;

            if let Some(beat) = beat {
                let outcome = session
                    .run_beat(&beat, &frame, &query)
                    .await
                    .map_err(|e| explain(e, sv_console::core::workflow::BEAT_FAILED))?;
                print_json(&outcome.prompts)?;
            }
            session.close().await;
        }
        Command::Generate { frame, query, beats, llm } => {
            if llm.is_none() {
                console.sync_server_harness().await;
            }
            let input = GenerateInput { frame_id: frame, query, beats, llm };
            let result = generate::generate(api, &config, input).await.map_err(|e| explain(e, generate::FAILED))?;
            print_json(&result)?;
        }
        Command::Blend { active, explosion_fired } => {
            let active = match active {
                Some(active) => active,
                None => blend::sample_active_state().to_string(),
            };
            let result = blend::blend(api, &active, explosion_fired).await.map_err(|e| explain(e, blend::FAILED))?;
            print_json(&result)?;
        }
        Command::Evaluate { piece, trace } => {
            let result = evaluate::evaluate(api, &piece, &trace).await.map_err(|e| explain(e, evaluate::FAILED))?;
            print_json(&result)?;
        }
        Command::EvaluateBatch { file } => {
            let raw = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Reading {}", file.display()))?;
            let result = evaluate::evaluate_batch(api, &raw).await.map_err(|e| explain(e, evaluate::BATCH_FAILED))?;
            print_json(&result)?;
        }
        Command::Framecheck { frame, active, trace } => {
            let result = evaluate::framecheck(api, &frame, &active, &trace)
                .await
                .map_err(|e| explain(e, evaluate::FRAMECHECK_FAILED))?;
            print_json(&result)?;
        }
        Command::Expectation { metaphors, beats, poles, base } => {
            let mut input = ExpectationInput { metaphors, poles, base, ..Default::default() };
            if let Some(beats) = beats {
                input.beats = beats;
            }
            let outcome = control::expectation(api, &input)
                .await
                .map_err(|e| explain(e, control::EXPECTATION_FAILED))?;
            if outcome.curve.is_all_absent() {
                process_info!(ProcessId::current(), "📉 Curve has labels but no values");
            }
            print_json(&serde_json::json!({
                "result": outcome.result,
                "curve": outcome.curve.points(),
            }))?;
        }
        Command::Viewpoint { prompt, frame, lang } => {
            let result = control::viewpoint(api, &prompt, frame.as_deref(), &lang)
                .await
                .map_err(|e| explain(e, control::VIEWPOINT_FAILED))?;
            print_json(&result)?;
        }
        Command::Attention { text, lang, top_k } => {
            let result = control::attention(api, &text, &lang, top_k)
                .await
                .map_err(|e| explain(e, control::ATTENTION_FAILED))?;
            print_json(&result)?;
        }
        Command::Gold => print_json(&library::gold_stats(api).await.map_err(|e| explain(e, library::GOLD_FAILED))?)?,
        Command::FilmPlan {
            prompt,
            frame,
            beats,
            total_duration,
            scene_length,
            aspect_ratio,
            allocation_mode,
            style_pack,
            llm_enrich,
            temperature,
            seed,
        } => {
            let mut input = FilmPlanInput {
                prompt,
                frame_id: frame,
                total_duration_sec: total_duration,
                scene_length_sec: scene_length,
                aspect_ratio,
                allocation_mode,
                style_pack,
                llm_enrich,
                temperature: Some(temperature),
                seed,
                ..Default::default()
            };
            if let Some(beats) = beats {
                input.beats = beats;
            }
            let plan = film_plan::film_plan(api, &input).await.map_err(|e| explain(e, film_plan::FAILED))?;
            print_json(&plan)?;
        }
        Command::Shell => run_shell(console, Duration::from_secs(args.health_interval_secs.max(1))).await?,
    }

    Ok(())
}

async fn run_shell(console: Console<RealApiGateway>, health_interval: Duration) -> anyhow::Result<()> {
    logging::log_startup(ProcessId::current(), "interactive shell");
    console.bootstrap().await;
    let monitor = console.start_health_monitor(health_interval);

    let mut shell = Shell::new(console);
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    tokio::select! {
        result = shell.run(stdin, stdout) => result?,
        result = signal::ctrl_c() => {
            match result {
                Ok(()) => logging::log_shutdown(ProcessId::current(), "Received Ctrl+C signal"),
                Err(err) => logging::log_error(ProcessId::current(), "Signal handling", &err),
            }
        }
    }

    monitor.stop();
    logging::log_success(ProcessId::current(), "Shell closed");
    Ok(())
}
