use crate::{AppState, Blob, Effect, GifSource, MoveDirection, Msg, Phase, ToolOptions};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::EngineLoadRequested => {
            // Exactly one load per tool instance; a failed load is not retried.
            if state.phase() != Phase::Idle {
                return (state, Vec::new());
            }
            let backend = state.tool().backend();
            state.set_phase(Phase::EngineLoading);
            state.set_status(format!("Loading {backend}..."));
            vec![Effect::LoadEngine { backend }]
        }
        Msg::EngineLoaded { version } => {
            if state.phase() == Phase::EngineLoading {
                state.engine_loaded(version);
            }
            Vec::new()
        }
        Msg::EngineLoadFailed { reason: _ } => {
            if state.phase() == Phase::EngineLoading {
                let backend = state.tool().backend();
                state.set_phase(Phase::EngineFailed);
                state.set_status(format!("Failed to load {backend}. Check log for details."));
            }
            Vec::new()
        }
        Msg::FilesSelected(files) => {
            select_files(&mut state, files);
            Vec::new()
        }
        Msg::FileRemoved { index } => {
            if state.phase() != Phase::Processing && index < state.inputs().len() {
                state.inputs_mut().remove(index);
                state.clear_output();
                state.settle_phase();
            }
            Vec::new()
        }
        Msg::FileMoved { index, direction } => {
            if state.phase() != Phase::Processing {
                let len = state.inputs().len();
                let target = match direction {
                    MoveDirection::Up => index.checked_sub(1),
                    MoveDirection::Down => index.checked_add(1).filter(|t| *t < len),
                };
                if let (true, Some(target)) = (index < len, target) {
                    state.inputs_mut().swap(index, target);
                    state.clear_output();
                    state.settle_phase();
                }
            }
            Vec::new()
        }
        Msg::OptionChanged { key, value } => {
            change_option(&mut state, &key, &value);
            Vec::new()
        }
        Msg::RunClicked => {
            // Covers `Processing` too: the action is disabled while a job runs.
            let runnable = matches!(
                state.phase(),
                Phase::FileSelected | Phase::Succeeded | Phase::Failed
            );
            if !runnable || state.inputs().len() < state.tool().min_inputs() {
                return (state, Vec::new());
            }
            let request = state.job_request();
            let job_id = state.start_job();
            vec![Effect::RunJob { job_id, request }]
        }
        Msg::CancelClicked => match state.abandon_job() {
            Some(job_id) => vec![Effect::CancelJob { job_id }],
            None => Vec::new(),
        },
        Msg::JobProgress { job_id, percent } => {
            if state.is_active(job_id) {
                state.apply_progress(percent);
            }
            Vec::new()
        }
        Msg::JobLog { job_id, line } => {
            if state.is_active(job_id) && !line.trim().is_empty() {
                state.set_status(line.trim());
            }
            Vec::new()
        }
        Msg::JobDone { job_id, outcome } => {
            if state.is_active(job_id) {
                state.apply_done(job_id, outcome);
            }
            Vec::new()
        }
        Msg::DownloadClicked => match (state.phase(), state.finished_job(), state.output()) {
            (Phase::Succeeded, Some(job_id), Some(artifact)) => vec![Effect::SaveArtifact {
                job_id,
                artifact: artifact.clone(),
            }],
            _ => Vec::new(),
        },
        Msg::ResetClicked => {
            if state.phase() != Phase::Processing {
                state.inputs_mut().clear();
                state.clear_output();
                if state.phase().is_ready() {
                    state.set_phase(Phase::EngineReady);
                    state.set_status(state.tool().ready_message());
                }
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn select_files(state: &mut AppState, files: Vec<Blob>) {
    if state.phase() == Phase::Processing {
        return;
    }
    let tool = state.tool();
    let mut accepted: Vec<Blob> = files
        .into_iter()
        .filter(|file| tool.accepts(&file.mime, state.options()))
        .collect();
    if accepted.is_empty() {
        state.set_status(format!(
            "No supported files selected (expected {}).",
            tool.accept_label(state.options())
        ));
        return;
    }
    if !tool.multi_select(state.options()) {
        accepted.truncate(1);
    }

    state.clear_output();
    let inputs = state.inputs_mut();
    if tool.appends_selection() {
        inputs.extend(accepted);
    } else {
        *inputs = accepted;
    }

    let status = match state.inputs() {
        [single] => format!("Selected: {}", single.name),
        many => format!("Selected: {} file(s)", many.len()),
    };
    state.set_status(status);
    state.settle_phase();
}

fn change_option(state: &mut AppState, key: &str, value: &str) {
    if state.phase() == Phase::Processing {
        return;
    }
    let previous_source = gif_source(state.options());
    if let Err(err) = state.options_mut().set(key, value) {
        state.set_status(err.to_string());
        return;
    }
    // Switching between video and image stacks invalidates the selection.
    if previous_source != gif_source(state.options()) {
        state.inputs_mut().clear();
        state.clear_output();
        state.settle_phase();
    }
}

fn gif_source(options: &ToolOptions) -> Option<GifSource> {
    match options {
        ToolOptions::GifMaker(opts) => Some(opts.source),
        _ => None,
    }
}
