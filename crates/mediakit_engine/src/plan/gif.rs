use mediakit_core::{format_number, Backend, Blob, GifOptions, GifSource};

use super::{Invocation, JobPlan, OutputSpec, StagedFile};

pub(super) fn make(input: &Blob, inputs: &[Blob], opts: &GifOptions) -> JobPlan {
    let (staged, source, filter) = match opts.source {
        GifSource::Video => {
            let source = vec![
                "-ss".to_string(),
                format_number(opts.start),
                "-to".to_string(),
                format_number(opts.end),
                "-i".to_string(),
                "input.mp4".to_string(),
            ];
            let filter = match scale_filter(opts) {
                Some(scale) => format!("fps={},{scale}", opts.fps),
                None => format!("fps={}", opts.fps),
            };
            (
                vec![StagedFile::new("input.mp4", input.data.clone())],
                source,
                filter,
            )
        }
        GifSource::Images => {
            let mut staged: Vec<StagedFile> = inputs
                .iter()
                .enumerate()
                .map(|(i, blob)| StagedFile::new(format!("img{i}.png"), blob.data.clone()))
                .collect();
            staged.push(StagedFile::new(
                "concat.txt",
                concat_list(inputs.len(), opts.fps).into_bytes(),
            ));
            let source = ["-f", "concat", "-safe", "0", "-i", "concat.txt"]
                .map(String::from)
                .to_vec();
            let filter = scale_filter(opts).unwrap_or_else(|| "null".to_string());
            (staged, source, filter)
        }
    };

    let steps = if opts.optimize {
        let palette = source
            .iter()
            .cloned()
            .chain([
                "-vf".to_string(),
                format!("{filter},palettegen"),
                "palette.png".to_string(),
            ]);
        let render = source.iter().cloned().chain([
            "-i".to_string(),
            "palette.png".to_string(),
            "-lavfi".to_string(),
            format!("{filter}[x];[x][1:v]paletteuse"),
            "output.gif".to_string(),
        ]);
        vec![
            Invocation::new(palette).labelled("Generating palette..."),
            Invocation::new(render).labelled("Rendering GIF..."),
        ]
    } else {
        let args = source
            .into_iter()
            .chain(["-vf".to_string(), filter, "output.gif".to_string()]);
        vec![Invocation::new(args)]
    };

    JobPlan::commands(
        Backend::Media,
        staged,
        steps,
        vec![OutputSpec::new("output.gif", "animated.gif", "image/gif")],
    )
}

fn scale_filter(opts: &GifOptions) -> Option<String> {
    opts.width
        .map(|width| format!("scale={width}:-1:flags=lanczos"))
}

/// Concat demuxer script showing each image for one frame.
fn concat_list(count: usize, fps: u32) -> String {
    let duration = format_number(1.0 / f64::from(fps.max(1)));
    (0..count)
        .map(|i| format!("file 'img{i}.png'\nduration {duration}"))
        .collect::<Vec<_>>()
        .join("\n")
}
