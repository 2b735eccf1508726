use std::path::Path;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use indicatif::ProgressStyle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, debug, info_span, warn};
use tracing_indicatif::IndicatifLayer;
use tracing_indicatif::filter::IndicatifFilter;
use tracing_indicatif::span_ext::IndicatifSpanExt;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

mod catalog;
mod cli;
mod constants;
mod ping;
mod regions;
mod report;
mod utils;

use crate::cli::{Cli, Commands};
use crate::ping::{ProbeConfig, SystemNetwork, run_ping};
use crate::regions::source_for;
use crate::utils::export::export_report;
use crate::utils::types::OutputFormat;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Ping {
            regions,
            timeout,
            concurrency,
            format,
            export,
        } => {
            let config = ProbeConfig::new(Some(timeout), Some(concurrency));
            debug!(?config, %regions, "Starting ping");

            let cancel = CancellationToken::new();
            spawn_ctrl_c_handler(cancel.clone());

            let progress = match format {
                OutputFormat::Table => progress_span(),
                OutputFormat::Json => Span::none(),
            };

            let source = source_for(&regions)
                .wrap_err_with(|| format!("Unable to use region listing {regions}"))?;
            let report = run_ping(
                &source,
                SystemNetwork::new(),
                config,
                &cancel,
                progress.clone(),
            )
            .instrument(progress.clone())
            .await
            .wrap_err_with(|| format!("Unable to ping endpoints from {regions}"))?;
            // Closing the span clears its progress bar before the report is printed.
            drop(progress);

            match format {
                OutputFormat::Table => print!("{report}"),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }

            if let Some(path) = export {
                export_to_file(&report, &path).await?;
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let indicatif_layer = IndicatifLayer::new();

    // Log lines go through the layer's writer so they suspend any visible bar.
    // Only spans marked with `indicatif.pb_show` get a bar.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(indicatif_layer.get_stderr_writer())
                .with_filter(filter),
        )
        .with(indicatif_layer.with_filter(IndicatifFilter::new(false)))
        .init();
}

/// Cancels `cancel` on Ctrl-C: a pending region listing is abandoned and no
/// further endpoints are started.
fn spawn_ctrl_c_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupted, waiting for in-flight probes...");
                cancel.cancel();
            }
            Err(e) => warn!("Unable to listen for Ctrl-C: {e}"),
        }
    });
}

/// Span whose progress bar is drawn by the indicatif layer.
fn progress_span() -> Span {
    let span = info_span!("ping", indicatif.pb_show = true);
    span.pb_set_style(
        &ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.yellow/blue} {pos}/{len} endpoints {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    span.pb_set_message("Probing...");
    span
}

async fn export_to_file(report: &report::PingReport, path: &Path) -> Result<()> {
    export_report(report, path)
        .await
        .wrap_err_with(|| format!("Unable to export report to {}", path.display()))?;
    eprintln!("Report exported to: {}", path.display().to_string().cyan());
    Ok(())
}
