use binci::param::{self, OutputFormat};
use binci::run;
use chrono::Local;
use flexi_logger::{Duplicate, FileSpec, Logger, LoggerHandle, WriteMode};
use log::{error, info, warn};
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

fn start_logger(general: &param::General) -> Result<LoggerHandle, flexi_logger::FlexiLoggerError> {
    let logger = Logger::try_with_str(&general.log_level)?;
    if general.log_base.is_empty() {
        logger.write_mode(WriteMode::Direct).start()
    } else {
        let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
        logger
            .log_to_file(
                FileSpec::default()
                    .basename(&general.log_base)
                    .discriminant(timestamp)
                    .suffix(&general.log_suffix),
            )
            .duplicate_to_stderr(Duplicate::Warn)
            .write_mode(WriteMode::BufferAndFlush)
            .start()
    }
}

fn main() {
    let param_path = std::env::args().nth(1).unwrap_or_else(|| "param.yaml".to_string());
    let param = match param::get(param_path.clone()) {
        Ok(param) => param,
        Err(e) => {
            eprintln!("Failed to load {}: {}", param_path, e);
            process::exit(2);
        }
    };

    let _logger = match start_logger(&param.general) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Failed to start logger: {}", e);
            process::exit(2);
        }
    };
    info!("\x1b[1;96mbinci {} | parameters from {}\x1b[0m", env!("CARGO_PKG_VERSION"), param_path);

    // Stop bootstrapping cleanly on Ctrl-C / SIGTERM
    let running = Arc::new(AtomicBool::new(true));
    match Signals::new([SIGINT, SIGTERM]) {
        Ok(mut signals) => {
            let flag = Arc::clone(&running);
            thread::spawn(move || {
                for signal in signals.forever() {
                    warn!("Signal {} received, stopping...", signal);
                    flag.store(false, Ordering::Relaxed);
                }
            });
        }
        Err(e) => warn!("Could not register signal handlers: {}", e),
    }

    let report = match run(&param, running) {
        Ok(report) => report,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    match param.general.output {
        OutputFormat::json => match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("{}", e);
                process::exit(1);
            }
        },
        OutputFormat::text => println!("{}", report),
    }
}
