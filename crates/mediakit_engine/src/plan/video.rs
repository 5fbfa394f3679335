use mediakit_core::{Backend, Blob, CompressOptions};

use super::{Invocation, JobPlan, OutputSpec, StagedFile};

pub(super) fn to_mp3(input: &Blob) -> JobPlan {
    JobPlan::commands(
        Backend::Media,
        vec![StagedFile::new("input.mp4", input.data.clone())],
        vec![Invocation::new([
            "-i",
            "input.mp4",
            "-vn",
            "-ab",
            "192k",
            "output.mp3",
        ])],
        vec![OutputSpec::new("output.mp3", "converted.mp3", "audio/mpeg")],
    )
}

pub(super) fn compress(input: &Blob, opts: &CompressOptions) -> JobPlan {
    let mut args = vec![
        "-i".to_string(),
        "input.mp4".to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-crf".to_string(),
        opts.quality.crf().to_string(),
        "-preset".to_string(),
        opts.quality.preset().to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        "128k".to_string(),
    ];
    if let Some(height) = opts.height {
        args.push("-vf".to_string());
        args.push(format!("scale=-2:{height}"));
    }
    args.push("output.mp4".to_string());

    JobPlan::commands(
        Backend::Media,
        vec![StagedFile::new("input.mp4", input.data.clone())],
        vec![Invocation::new(args)],
        vec![OutputSpec::new("output.mp4", "compressed.mp4", "video/mp4")],
    )
}

pub(super) fn mute(input: &Blob) -> JobPlan {
    let mime = if input.mime.starts_with("video/") {
        input.mime.clone()
    } else {
        "video/mp4".to_string()
    };
    JobPlan::commands(
        Backend::Media,
        vec![StagedFile::new("input.mp4", input.data.clone())],
        vec![Invocation::new([
            "-i",
            "input.mp4",
            "-c:v",
            "copy",
            "-an",
            "output.mp4",
        ])],
        vec![OutputSpec::new(
            "output.mp4",
            format!("muted_{}", input.name),
            mime,
        )],
    )
}
