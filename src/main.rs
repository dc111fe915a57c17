// Terminal front end — panicking on unrecoverable errors is standard for CLI tools.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::io::{BufRead, Write};
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use panel_pilot::config::{self, LlmConfig};
use panel_pilot::llm::{ChatTransport, QwenClient};
use panel_pilot::model::Color;
use panel_pilot::session::Session;
use panel_pilot::state::SessionState;
use panel_pilot::surface;

#[derive(Parser)]
#[command(
    name = "panel-pilot",
    about = "Natural-language control panel over a terminal widget surface",
    version
)]
struct Cli {
    /// API key override; falls back to the QWEN_API_KEY environment variable
    #[arg(long)]
    api_key: Option<String>,

    /// Model name (default qwen-max)
    #[arg(long)]
    model: Option<String>,

    /// Chat-completions endpoint override
    #[arg(long)]
    endpoint: Option<String>,

    /// Run a single instruction and exit
    #[arg(long)]
    once: Option<String>,
}

fn build_transport(cli: &Cli) -> Option<Arc<dyn ChatTransport>> {
    let key = config::discover_api_key(cli.api_key.as_deref())?;
    let mut llm_config = LlmConfig::new(key);
    if let Some(model) = &cli.model {
        llm_config = llm_config.with_model(model.clone());
    }
    if let Some(endpoint) = &cli.endpoint {
        llm_config = llm_config.with_endpoint(endpoint.clone());
    }
    match QwenClient::new(llm_config) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            eprintln!("failed to build HTTP client: {e}");
            None
        }
    }
}

fn render_swatches(colors: &[Color]) {
    if colors.is_empty() {
        println!("history: (empty)");
    } else {
        let strip: Vec<String> = colors.iter().map(Color::hex).collect();
        println!("history: [{}]", strip.join(" "));
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let state = Arc::new(SessionState::new());
    state.with_registry_mut(surface::seed_default);

    // Render transcript lines and the swatch strip as they change.
    state.with_transcript_mut(|t| {
        t.subscribe(Box::new(|message| println!("{}", message.display_line())));
    });
    state.with_history_mut(|h| {
        h.subscribe(Box::new(render_swatches));
    });

    let (scheduler, mut ui_queue) = surface::ui_queue();
    let session = Session::new(state.clone(), scheduler, build_transport(&cli));

    session.startup().await;
    ui_queue.drain();

    if let Some(instruction) = &cli.once {
        session.submit(instruction).await;
        ui_queue.drain();
        session.shutdown();
        ui_queue.drain();
        return;
    }

    let mut last_status = String::new();
    let stdin = std::io::stdin();
    loop {
        let status = state.with_transcript(|t| t.status().text.clone());
        if status != last_status {
            println!("status: {status}");
            last_status = status;
        }

        print!("> ");
        std::io::stdout().flush().expect("stdout");

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("stdin error: {e}");
                break;
            }
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        session.submit(line).await;
        ui_queue.drain();
    }

    session.shutdown();
    ui_queue.drain();
}
