mod cli;
mod client;
mod config;
mod events;
mod notices;
mod poller;
mod terminal;
mod ui;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::event::{self, Event};
use tokio::sync::mpsc;
use tracing::info;

use crate::cli::Args;
use crate::client::ApiClient;
use crate::config::load_config;
use crate::events::{ServiceCommand, ServiceEvent};
use crate::notices::NoticeLevel;
use crate::poller::spawn_poller;
use crate::terminal::{init_tracing, restore_terminal, setup_terminal};
use crate::ui::{draw_ui, handle_key_event, timeline_text, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let _file_guard = init_tracing(&args.log_dir, args.log_to_stderr)?;

    let mut config = load_config(&args.config)
        .with_context(|| format!("failed to load config {}", args.config.display()))?;
    if let Some(url) = args.backend_url {
        config.backend_url = url;
    }
    if args.job.is_some() {
        config.job_id = args.job;
    }
    info!(backend = %config.backend_url, "console starting");

    let client = Arc::new(ApiClient::new(
        &config.backend_url,
        config.api_token.clone(),
    )?);

    if args.once {
        let job_id = config
            .job_id
            .context("--once needs a job_id in the config or --job")?;
        let report = client.fetch_results(job_id).await?;
        let mut app = AppState::new();
        app.apply_report(report);
        for line in timeline_text(&app) {
            println!("{line}");
        }
        return Ok(());
    }

    let (event_tx, mut event_rx) = mpsc::channel::<ServiceEvent>(128);
    let (cmd_tx, cmd_rx) = mpsc::channel::<ServiceCommand>(32);
    spawn_poller(
        Arc::clone(&client),
        config.job_id,
        config.config_path.clone(),
        Duration::from_secs(config.poll_interval_secs),
        event_tx,
        cmd_rx,
    );

    let mut terminal = setup_terminal()?;
    let mut app = AppState::new();
    app.notice(
        NoticeLevel::Info,
        "ready",
        "Tab switches views, q quits",
        Instant::now(),
    );

    let tick_rate = Duration::from_millis(100);
    let run_result = loop {
        let now = Instant::now();
        while let Ok(service_event) = event_rx.try_recv() {
            app.handle_event(service_event, now);
        }
        app.notices.prune(now);
        app.tick = app.tick.wrapping_add(1);

        if let Err(err) = terminal.draw(|frame| draw_ui(frame, &mut app)) {
            break Err(err.into());
        }

        match event::poll(tick_rate) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) => {
                    if handle_key_event(key, &mut app, &cmd_tx) {
                        break Ok(());
                    }
                }
                Ok(_) => {}
                Err(err) => break Err(err.into()),
            },
            Ok(false) => {}
            Err(err) => break Err(err.into()),
        }
    };

    restore_terminal(&mut terminal)?;
    run_result
}
