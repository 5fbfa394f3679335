use mediakit_core::{
    format_number, Backend, Blob, ImageConvertOptions, ImageFormat, MemeOptions, ResizeOptions,
};

use super::{
    file_stem, input_extension, jpeg_qscale, Invocation, JobPlan, OutputSpec, PlanContext,
    StagedFile,
};

pub(super) fn convert(inputs: &[Blob], opts: &ImageConvertOptions) -> JobPlan {
    let ext = opts.format.extension();
    let total = inputs.len();
    let mut staged = Vec::with_capacity(total);
    let mut steps = Vec::with_capacity(total);
    let mut outputs = Vec::with_capacity(total);

    for (i, blob) in inputs.iter().enumerate() {
        let input_name = format!("input{i}.{}", input_extension(blob));
        let output_name = format!("output{i}.{ext}");

        let mut args = vec!["-i".to_string(), input_name.clone()];
        if let Some(width) = opts.width {
            args.push("-vf".to_string());
            args.push(format!("scale={width}:-1"));
        }
        args.extend(encoder_args(opts.format, f64::from(opts.quality)));
        args.push(output_name.clone());

        staged.push(StagedFile::new(input_name, blob.data.clone()));
        steps.push(
            Invocation::new(args).labelled(format!("Processing {}/{total}: {}", i + 1, blob.name)),
        );
        outputs.push(OutputSpec::new(
            output_name,
            format!("{}.{ext}", file_stem(&blob.name)),
            opts.format.mime(),
        ));
    }

    JobPlan::commands(Backend::Media, staged, steps, outputs)
}

/// Format-specific encoder flags for a 0..=100 quality.
fn encoder_args(format: ImageFormat, quality: f64) -> Vec<String> {
    match format {
        ImageFormat::Jpg => vec!["-q:v".to_string(), jpeg_qscale(quality)],
        ImageFormat::Webp => vec!["-quality".to_string(), format_number(quality.round())],
        ImageFormat::Avif => vec![
            "-c:v".to_string(),
            "libaom-av1".to_string(),
            "-crf".to_string(),
            format_number(((100.0 - quality) / 2.0).round()),
        ],
        ImageFormat::Png => vec!["-compression_level".to_string(), "9".to_string()],
    }
}

pub(super) fn resize(input: &Blob, opts: &ResizeOptions) -> JobPlan {
    let ext = input_extension(input);
    let input_name = format!("input.{ext}");
    let output_name = format!("output.{ext}");

    let mut args = vec!["-i".to_string(), input_name.clone()];
    if let Some(filter) = resize_filter(opts) {
        args.push("-vf".to_string());
        args.push(filter);
    }
    let quality = opts.quality * 100.0;
    match ext.as_str() {
        "jpg" | "jpeg" => args.extend(encoder_args(ImageFormat::Jpg, quality)),
        "webp" => args.extend(encoder_args(ImageFormat::Webp, quality)),
        _ => {}
    }
    args.push(output_name.clone());

    JobPlan::commands(
        Backend::Media,
        vec![StagedFile::new(input_name, input.data.clone())],
        vec![Invocation::new(args)],
        vec![OutputSpec::new(
            output_name,
            format!("resized_{}", input.name),
            input.mime.clone(),
        )],
    )
}

fn resize_filter(opts: &ResizeOptions) -> Option<String> {
    match (opts.width, opts.height) {
        (None, None) => None,
        (Some(w), Some(h)) if opts.keep_aspect => Some(format!(
            "scale={w}:{h}:force_original_aspect_ratio=decrease"
        )),
        (w, h) => Some(format!("scale={}:{}", side(w), side(h))),
    }
}

fn side(value: Option<u32>) -> String {
    value.map_or_else(|| "-1".to_string(), |v| v.to_string())
}

pub(super) fn meme(input: &Blob, opts: &MemeOptions, ctx: &PlanContext) -> JobPlan {
    let input_name = format!("input.{}", input_extension(input));
    let mut staged = vec![StagedFile::new(input_name.clone(), input.data.clone())];
    let mut filters = Vec::new();

    for (file, text, y) in [
        ("top.txt", &opts.top_text, "20"),
        ("bottom.txt", &opts.bottom_text, "h-text_h-20"),
    ] {
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        staged.push(StagedFile::new(file, text.to_uppercase().into_bytes()));
        filters.push(drawtext(file, y, opts, ctx));
    }
    let filter = if filters.is_empty() {
        "null".to_string()
    } else {
        filters.join(",")
    };

    JobPlan::commands(
        Backend::Media,
        staged,
        vec![Invocation::new([
            "-i".to_string(),
            input_name,
            "-vf".to_string(),
            filter,
            "output.png".to_string(),
        ])],
        vec![OutputSpec::new("output.png", "my-meme.png", "image/png")],
    )
}

fn drawtext(text_file: &str, y: &str, opts: &MemeOptions, ctx: &PlanContext) -> String {
    let font = ctx
        .font_file
        .as_ref()
        .map(|path| format!("fontfile='{}':", escape_filter_value(&path.to_string_lossy())))
        .unwrap_or_default();
    let color = opts.color.trim_start_matches('#');
    let border = (opts.font_size / 15).max(1);
    // Captions are drawn literally; `%` and `\` carry no meaning.
    format!(
        "drawtext={font}textfile={text_file}:expansion=none:fontcolor=0x{color}:fontsize={size}:borderw={border}:bordercolor=black:x=(w-text_w)/2:y={y}",
        size = opts.font_size,
    )
}

/// Escapes a value for use inside a single-quoted filter option.
fn escape_filter_value(value: &str) -> String {
    value.replace('\\', "/").replace('\'', "'\\''")
}
