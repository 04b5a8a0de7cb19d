//! # Design CLI
//!
//! Replays edit scripts, exports designs and submits orders.

use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::Parser;
use design_cli::script::{apply_script, parse_script};
use design_cli::{CliArgs, CliConfig, Command, LogFormat, RenderArgs, SubmitArgs};
use design_core::{DesignDocument, EditorState};
use design_order::{DesignSession, HttpBackend, Outcome, SessionConfig};
use design_renderer::{Composition, DesignExporter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,design_core=debug,design_renderer=debug,design_order=debug")
    });

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let config = CliConfig::from(&args);
    init_tracing(config.log_format);

    tracing::debug!("Starting design v{}", design_core::VERSION);

    match args.command {
        Command::Render(render) => run_render(&config, render).await,
        Command::Submit(submit) => run_submit(&config, submit).await,
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

fn load_state(path: &Path) -> anyhow::Result<EditorState> {
    let doc = DesignDocument::load(path)
        .with_context(|| format!("loading design {}", path.display()))?;
    Ok(doc.into_state()?)
}

fn backend(config: &CliConfig) -> anyhow::Result<Option<Arc<HttpBackend>>> {
    config
        .api_url
        .as_deref()
        .map(|url| HttpBackend::new(url).map(Arc::new))
        .transpose()
        .context("configuring backend")
}

async fn run_render(config: &CliConfig, args: RenderArgs) -> anyhow::Result<()> {
    let mut state = match &args.design {
        Some(path) => load_state(path)?,
        None => EditorState::new(args.canvas()),
    };

    if let Some(script_path) = &args.script {
        let json = std::fs::read_to_string(script_path)
            .with_context(|| format!("reading script {}", script_path.display()))?;
        let steps = parse_script(&json)?;
        let base_dir = script_path.parent().unwrap_or_else(|| Path::new("."));
        apply_script(&mut state, &steps, base_dir)?;
    }

    if let Some(path) = &args.save_design {
        DesignDocument::from_state(args.product_id, &state, now_ms())
            .save(path)
            .with_context(|| format!("saving design {}", path.display()))?;
        println!("Saved design to {}", path.display());
    }

    let exporter = DesignExporter::new(config.export_config());
    let exported = match (backend(config)?, args.product_id) {
        (Some(backend), Some(product_id)) => {
            let mut session = DesignSession::new(
                state,
                exporter,
                backend.clone(),
                backend,
                SessionConfig {
                    timeout: config.timeout,
                },
            );
            session.load_product(product_id).await;
            match session.export_download(&args.out_dir).await? {
                Outcome::Completed(file) => file,
                Outcome::AlreadyInFlight => anyhow::bail!("an export is already running"),
            }
        }
        _ => exporter.export_to_file(
            &Composition::from_state(&state),
            &args.out_dir,
            args.product_id,
        )?,
    };

    println!("Exported {}", exported.path.display());
    Ok(())
}

async fn run_submit(config: &CliConfig, args: SubmitArgs) -> anyhow::Result<()> {
    let backend = backend(config)?
        .ok_or_else(|| anyhow::anyhow!("--api-url (or DESIGN_API_URL) is required to submit"))?;
    let state = load_state(&args.design)?;

    let mut session = DesignSession::new(
        state,
        DesignExporter::new(config.export_config()),
        backend.clone(),
        backend,
        SessionConfig {
            timeout: config.timeout,
        },
    );
    session.load_product(args.product_id).await;

    let outcome = session
        .submit(&args.size_quantities(), args.order_details())
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    match outcome {
        Outcome::Completed(ack) => {
            match ack.id {
                Some(id) => println!("Order submitted (request {id})"),
                None => println!("Order submitted"),
            }
            if let Some(message) = ack.message {
                println!("{message}");
            }
        }
        Outcome::AlreadyInFlight => anyhow::bail!("a submission is already running"),
    }
    Ok(())
}
