use mediakit_core::{format_number, AudioEditOptions, AudioOperation, Backend, Blob};

use super::{Invocation, JobPlan, OutputSpec, StagedFile};

const OUTPUT: &str = "output.mp3";

pub(super) fn edit(input: &Blob, inputs: &[Blob], opts: &AudioEditOptions) -> JobPlan {
    if opts.operation == AudioOperation::Merge && inputs.len() > 1 {
        return merge(inputs);
    }

    JobPlan::commands(
        Backend::Media,
        vec![StagedFile::new("input.mp3", input.data.clone())],
        vec![Invocation::new(edit_args(opts))],
        vec![output()],
    )
}

/// Arguments for the single-input operations. A lone file under `merge`
/// is copied through untouched.
fn edit_args(opts: &AudioEditOptions) -> Vec<String> {
    let mut args = vec!["-i".to_string(), "input.mp3".to_string()];
    let mut filters = Vec::new();
    let fade_in = |filters: &mut Vec<String>| {
        if opts.fade_in > 0.0 {
            filters.push(format!("afade=t=in:st=0:d={}", format_number(opts.fade_in)));
        }
    };
    let fade_out = |filters: &mut Vec<String>, start: f64| {
        if opts.fade_out > 0.0 {
            filters.push(format!(
                "afade=t=out:st={}:d={}",
                format_number(start),
                format_number(opts.fade_out)
            ));
        }
    };

    match opts.operation {
        AudioOperation::Trim => push_trim(&mut args, opts),
        AudioOperation::Volume => filters.push(volume_filter(opts.volume)),
        AudioOperation::Fade => {
            fade_in(&mut filters);
            fade_out(&mut filters, opts.end - opts.fade_out);
        }
        AudioOperation::All => {
            // Input-side seeking so the filters see the trimmed clip from zero.
            let mut seek = Vec::with_capacity(4);
            push_trim(&mut seek, opts);
            args.splice(0..0, seek);
            filters.push(volume_filter(opts.volume));
            fade_in(&mut filters);
            fade_out(&mut filters, (opts.end - opts.start) - opts.fade_out);
        }
        AudioOperation::Merge => {}
    }

    if !filters.is_empty() {
        args.push("-af".to_string());
        args.push(filters.join(","));
    }
    args.push(OUTPUT.to_string());
    args
}

fn push_trim(args: &mut Vec<String>, opts: &AudioEditOptions) {
    args.extend([
        "-ss".to_string(),
        format_number(opts.start),
        "-to".to_string(),
        format_number(opts.end),
    ]);
}

fn volume_filter(percent: u32) -> String {
    format!("volume={}", format_number(f64::from(percent) / 100.0))
}

fn merge(inputs: &[Blob]) -> JobPlan {
    let mut staged: Vec<StagedFile> = inputs
        .iter()
        .enumerate()
        .map(|(i, blob)| StagedFile::new(format!("input{i}.mp3"), blob.data.clone()))
        .collect();
    let list = (0..inputs.len())
        .map(|i| format!("file 'input{i}.mp3'"))
        .collect::<Vec<_>>()
        .join("\n");
    staged.push(StagedFile::new("concat.txt", list.into_bytes()));

    JobPlan::commands(
        Backend::Media,
        staged,
        vec![Invocation::new([
            "-f",
            "concat",
            "-safe",
            "0",
            "-i",
            "concat.txt",
            "-c",
            "copy",
            OUTPUT,
        ])],
        vec![output()],
    )
}

fn output() -> OutputSpec {
    OutputSpec::new(OUTPUT, "edited-audio.mp3", "audio/mpeg")
}
