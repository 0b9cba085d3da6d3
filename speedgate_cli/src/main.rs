//! Binary entry point: logging, config load, signal wiring, dispatch.

mod cli;
mod error_fmt;
mod rt;
mod run;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use error_fmt::{exit_code_for_error, format_error_json, humanize};
use speedgate_core::DistanceConfig;

fn init_logging(args: &Cli, logging: &speedgate_config::Logging) -> eyre::Result<()> {
    let level = logging.level.as_deref().unwrap_or(&args.log_level);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .wrap_err("invalid log level")?;

    let file_layer = match &logging.file {
        Some(path) => {
            let path = Path::new(path);
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "speedgate.log".to_string());
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(fmt::layer().json().with_writer(writer))
        }
        None => None,
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);
    if args.json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
    Ok(())
}

fn distance_from_flags(
    distance_bits: Option<u8>,
    inches: Option<u8>,
    eighths: u8,
) -> eyre::Result<Option<DistanceConfig>> {
    match (distance_bits, inches) {
        (Some(byte), _) => Ok(Some(DistanceConfig::from_byte(byte))),
        (None, Some(inches)) => Ok(Some(DistanceConfig::from_parts(inches, eighths)?)),
        (None, None) => Ok(None),
    }
}

fn try_main() -> eyre::Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();
    let _ = JSON_MODE.set(args.json);

    let text = std::fs::read_to_string(&args.config)
        .wrap_err_with(|| format!("read config {}", args.config.display()))?;
    let cfg = speedgate_config::load_toml(&text).wrap_err("parse config")?;
    cfg.validate()?;

    init_logging(&args, &cfg.logging)?;

    let thresholds = match &args.calibration {
        Some(path) => {
            let t = speedgate_config::load_calibration_csv(path)?;
            tracing::info!(gate1_cv = t.gate1_cv, gate2_cv = t.gate2_cv, "calibrated thresholds");
            Some(t)
        }
        None => None,
    };

    match args.cmd {
        Commands::Run {
            distance_bits,
            inches,
            eighths,
            trials,
            threshold_cv,
            arm_timeout_ms,
            rt,
            rt_prio,
            rt_lock,
            rt_cpu,
        } => {
            let distance = distance_from_flags(distance_bits, inches, eighths)?;
            let params = run::build_params(
                &cfg,
                thresholds.as_ref(),
                distance,
                threshold_cv,
                arm_timeout_ms,
                trials,
            );

            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&shutdown);
            ctrlc::set_handler(move || {
                flag.store(true, Ordering::Relaxed);
            })
            .wrap_err("install Ctrl-C handler")?;

            let outcome = run::run_with_rt(&cfg, params, rt, rt_prio, rt_lock, rt_cpu, &shutdown)?;
            if args.json {
                let obj = serde_json::json!({
                    "distance_byte": outcome.distance.byte(),
                    "distance_fixed": outcome.distance.distance_fixed(),
                    "completed": outcome.summary.completed,
                    "aborted": outcome.summary.aborted,
                });
                println!("{obj}");
            } else {
                println!(
                    "distance {}\" + {}/8: {} complete, {} aborted",
                    outcome.distance.inches(),
                    outcome.distance.eighths(),
                    outcome.summary.completed,
                    outcome.summary.aborted
                );
            }
            Ok(())
        }
        Commands::SelfCheck => {
            run::self_check(&cfg)?;
            if args.json {
                println!("{}", serde_json::json!({ "status": "ok" }));
            } else {
                println!("self-check ok");
            }
            Ok(())
        }
    }
}

fn main() {
    if let Err(err) = try_main() {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}
