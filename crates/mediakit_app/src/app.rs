use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use engine_logging::{engine_info, engine_warn};
use mediakit_core::{update, AppState, Msg, Phase, ToolOptions};
use mediakit_engine::{EngineHandle, ExportSummary};

use crate::cli::RunArgs;
use crate::config::AppConfig;
use crate::effects::EffectRunner;
use crate::intake;
use crate::render::{outputs_summary, StatusPrinter};

const POLL_INTERVAL: Duration = Duration::from_millis(75);
const CANCEL_GRACE: Duration = Duration::from_secs(5);
const EXIT_CANCELLED: u8 = 130;

/// Drives one tool from load to saved artifact.
pub fn run_tool(args: RunArgs, mut config: AppConfig) -> Result<ExitCode> {
    if let Some(out) = args.out {
        config.output_dir = out;
    }
    if let Some(secs) = args.timeout {
        config.step_timeout_secs = Some(secs);
    }
    config.write_manifest |= args.manifest;

    // Reject bad values before any engine work starts.
    let mut probe = ToolOptions::defaults(args.tool);
    for (key, value) in &args.options {
        probe
            .set(key, value)
            .with_context(|| format!("invalid --set {key}={value}"))?;
    }
    let inputs = intake::read_inputs(&args.files)?;

    let engine = EngineHandle::new(config.engine_settings());
    let runner = EffectRunner::new(
        engine,
        args.tool,
        config.output_dir.clone(),
        config.export_options(),
    );
    let mut driver = Driver::new(AppState::new(args.tool), runner);

    let (interrupt_tx, interrupt_rx) = mpsc::channel();
    forward_interrupts(interrupt_tx);

    driver.dispatch(Msg::EngineLoadRequested)?;
    for (key, value) in args.options {
        driver.dispatch(Msg::OptionChanged { key, value })?;
    }
    let offered = inputs.len();
    driver.dispatch(Msg::FilesSelected(inputs))?;
    let accepted = driver.state.inputs().len();
    if accepted == 0 {
        bail!(
            "no supported input files for {} (expected {})",
            args.tool,
            args.tool.accept_label(driver.state.options())
        );
    }
    if accepted < args.tool.min_inputs() {
        bail!(
            "{} needs at least {} input files, got {accepted}",
            args.tool,
            args.tool.min_inputs()
        );
    }
    if accepted < offered {
        engine_warn!("Skipped {} of {} input file(s)", offered - accepted, offered);
        eprintln!("Skipped {} unsupported or extra file(s).", offered - accepted);
    }

    let mut started = false;
    loop {
        if let Some(msg) = driver.runner.next_msg(POLL_INTERVAL) {
            driver.dispatch(msg)?;
        }
        if let Ok(msg) = interrupt_rx.try_recv() {
            let running = driver.state.active_job();
            driver.dispatch(msg)?;
            if let Some(job_id) = running {
                driver.runner.await_completion(job_id, CANCEL_GRACE);
            }
            eprintln!("Cancelled.");
            return Ok(ExitCode::from(EXIT_CANCELLED));
        }

        match driver.state.phase() {
            Phase::EngineFailed => {
                let detail = driver
                    .runner
                    .last_error()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                bail!("{} could not be started: {detail}", args.tool.backend());
            }
            Phase::FileSelected if started => {
                bail!("{} did not start", args.tool);
            }
            Phase::FileSelected => {
                started = true;
                driver.dispatch(Msg::RunClicked)?;
            }
            Phase::Succeeded => {
                println!("{}", outputs_summary(&driver.state.view()).trim_end());
                driver.dispatch(Msg::DownloadClicked)?;
                for summary in &driver.saved {
                    print_saved(summary);
                }
                return Ok(ExitCode::SUCCESS);
            }
            Phase::Failed => {
                if let Some(err) = driver.runner.last_error() {
                    eprintln!("{err}");
                }
                return Ok(ExitCode::FAILURE);
            }
            Phase::Idle | Phase::EngineLoading | Phase::EngineReady | Phase::Processing => {}
        }
    }
}

/// Applies messages to the state, renders on change and runs effects.
struct Driver {
    state: AppState,
    runner: EffectRunner,
    printer: StatusPrinter,
    saved: Vec<ExportSummary>,
}

impl Driver {
    fn new(state: AppState, runner: EffectRunner) -> Self {
        Self {
            state,
            runner,
            printer: StatusPrinter::default(),
            saved: Vec::new(),
        }
    }

    fn dispatch(&mut self, msg: Msg) -> Result<()> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            if let Some(line) = self.printer.frame(&state.view()) {
                println!("{line}");
            }
        }
        self.state = state;
        let saved = self.runner.apply(effects)?;
        self.saved.extend(saved);
        Ok(())
    }
}

fn print_saved(summary: &ExportSummary) {
    for path in &summary.files {
        println!("Saved {}", path.display());
    }
    if let Some(manifest) = &summary.manifest_path {
        println!("Manifest {}", manifest.display());
    }
}

/// Sends a cancel for every Ctrl-C until the process exits.
fn forward_interrupts(interrupt_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                engine_warn!("Ctrl-C handling unavailable: {err}");
                return;
            }
        };
        while runtime.block_on(tokio::signal::ctrl_c()).is_ok() {
            engine_info!("Interrupt received; cancelling");
            if interrupt_tx.send(Msg::CancelClicked).is_err() {
                break;
            }
        }
    });
}
