//! typhoon-signal: Hong Kong tropical cyclone signal checker.
//!
//! Reads the Observatory's 10-minute mean winds at the eight reference
//! stations, decides whether the No.3 or No.8 wind criteria are met, and
//! compares that with the signal actually in force.

mod config;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use common::{Error, ReconciliationResult, WindReading};
use signal::classifier::{NO3_BAND_KMH, NO8_BAND_KMH};
use signal::{Determination, OfficialStatus, SignalEngine};
use tracing::{error, info};

/// Hong Kong tropical cyclone signal checker
#[derive(Parser)]
#[command(name = "typhoon-signal", about = "Check HKO No.3 / No.8 wind criteria against the official signal")]
struct Cli {
    /// TOML config file (defaults to ./config.toml when present).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the determination as JSON.
    #[arg(long)]
    json: bool,

    /// Fail when the official signal cannot be fetched.
    #[arg(long)]
    strict: bool,

    /// Repeat the check every SECS seconds until Ctrl+C.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    watch: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "typhoon_signal=info,hko_client=info,signal=info".into()
            }),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    let cfg = match config::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(
        "Feeds: wind={} warning={} ttl={}s timeout={}s",
        cfg.wind_feed_url, cfg.warning_feed_url, cfg.cache_ttl_secs, cfg.http_timeout_secs
    );

    let engine = match SignalEngine::from_config(&cfg) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            error!("Engine initialization failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let Some(every) = cli.watch else {
        return match run_once(&engine, &cli).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                report_failure(&e);
                ExitCode::FAILURE
            }
        };
    };

    info!("Watching every {}s. Press Ctrl+C to stop.", every);
    let mut interval = tokio::time::interval(Duration::from_secs(every));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                return ExitCode::SUCCESS;
            }
            _ = interval.tick() => {
                // A failed cycle is reported and retried on the next tick.
                if let Err(e) = run_once(&engine, &cli).await {
                    report_failure(&e);
                }
            }
        }
    }
}

async fn run_once(engine: &SignalEngine, cli: &Cli) -> Result<(), Error> {
    if cli.strict {
        let result = engine.determine_strict().await?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print!("{}", render_reconciliation(&result));
        }
        return Ok(());
    }

    let determination = engine.determine().await?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&determination)?);
    } else {
        print!("{}", render_determination(&determination));
    }
    Ok(())
}

fn report_failure(e: &Error) {
    error!("Determination failed: {}", e);
    let what = if e.is_parse() {
        "Observatory data could not be read"
    } else {
        "Observatory data temporarily unavailable"
    };
    eprintln!("{what}, try again. ({e})");
}

// ── Rendering ─────────────────────────────────────────────────────────

fn band_label(speed_kmh: f64) -> &'static str {
    if NO8_BAND_KMH.contains(&speed_kmh) {
        "gale/storm"
    } else if NO3_BAND_KMH.contains(&speed_kmh) {
        "strong"
    } else if speed_kmh >= NO8_BAND_KMH.end {
        "hurricane"
    } else {
        ""
    }
}

fn render_station_table(readings: &[WindReading]) -> String {
    let mut out = format!("{:<16}{:>12}  {}\n", "Station", "Mean km/h", "Band");
    for r in readings {
        out.push_str(&format!(
            "{:<16}{:>12.1}  {}\n",
            r.station_name,
            r.mean_speed_kmh,
            band_label(r.mean_speed_kmh)
        ));
    }
    out
}

fn render_reconciliation(result: &ReconciliationResult) -> String {
    let mut out = format!(
        "Computed signal:  {} ({} qualifying reference stations)\n",
        result.computed.signal, result.computed.qualifying_station_count
    );
    out.push_str(&format!(
        "Official signal:  {} ({})\n",
        result.official.display_name, result.official.signal_code
    ));
    if result.agrees {
        out.push_str("Agreement:        yes\n");
    } else {
        out.push_str("Agreement:        NO, computed and official No.8 status differ\n");
    }
    out
}

fn render_determination(d: &Determination) -> String {
    let mut out = format!(
        "Hong Kong tropical cyclone signal check ({})\n\n",
        d.evaluated_at.format("%Y-%m-%d %H:%M UTC")
    );
    out.push_str(&render_station_table(&d.reference_readings));
    if !d.missing_stations.is_empty() {
        let names: Vec<&str> = d.missing_stations.iter().map(|s| s.name()).collect();
        out.push_str(&format!("No reading from: {}\n", names.join(", ")));
    }
    out.push('\n');

    match &d.official {
        OfficialStatus::Reconciled(result) => out.push_str(&render_reconciliation(result)),
        OfficialStatus::Unavailable { reason } => {
            out.push_str(&format!(
                "Computed signal:  {} ({} qualifying reference stations)\n",
                d.classification.signal, d.classification.qualifying_station_count
            ));
            out.push_str(&format!("Official signal:  unavailable ({reason})\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::{OfficialWarning, Signal, SignalClassification};
    use signal::ReferenceStation;

    fn classification(signal: Signal, count: usize) -> SignalClassification {
        SignalClassification {
            signal,
            qualifying_station_count: count,
        }
    }

    #[test]
    fn test_band_labels_follow_classifier_bands() {
        assert_eq!(band_label(30.0), "");
        assert_eq!(band_label(41.0), "strong");
        assert_eq!(band_label(63.0), "gale/storm");
        assert_eq!(band_label(117.0), "hurricane");
    }

    #[test]
    fn test_render_disagreement() {
        let result = signal::reconcile(
            classification(Signal::None, 0),
            OfficialWarning::new("TC8SW", "No.8 Southwest Gale or Storm Signal"),
        );
        let text = render_reconciliation(&result);
        assert!(text.contains("No signal"));
        assert!(text.contains("No.8 Southwest Gale or Storm Signal (TC8SW)"));
        assert!(text.contains("NO, computed and official"));
    }

    #[test]
    fn test_render_partial_determination() {
        let d = Determination {
            evaluated_at: Utc::now(),
            reference_readings: vec![WindReading::new("Kai Tak", 70.0)],
            missing_stations: vec![ReferenceStation::SaiKung],
            classification: classification(Signal::None, 1),
            official: OfficialStatus::Unavailable {
                reason: "Feed fetch failed: warning feed timed out after 10s".into(),
            },
        };
        let text = render_determination(&d);
        assert!(text.contains("Kai Tak"));
        assert!(text.contains("gale/storm"));
        assert!(text.contains("No reading from: Sai Kung"));
        assert!(text.contains("Official signal:  unavailable"));
    }

    #[test]
    fn test_cli_rejects_zero_watch_interval() {
        assert!(Cli::try_parse_from(["typhoon-signal", "--watch", "0"]).is_err());
        let cli = Cli::try_parse_from(["typhoon-signal", "--json", "--watch", "60"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.watch, Some(60));
    }
}
