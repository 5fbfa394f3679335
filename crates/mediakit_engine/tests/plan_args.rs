mod common;

use std::path::PathBuf;

use common::{blob, pdf_blob, request};
use mediakit_core::{Backend, ToolKind};
use mediakit_engine::{build_plan, JobPlan, PlanContext, PlanError, Work};
use pretty_assertions::assert_eq;

fn plan(req: &mediakit_core::JobRequest) -> JobPlan {
    build_plan(req, &PlanContext::default()).unwrap()
}

fn step_args(plan: &JobPlan, index: usize) -> Vec<&str> {
    plan.steps()[index].args.iter().map(String::as_str).collect()
}

fn contains_run(args: &[&str], run: &[&str]) -> bool {
    args.windows(run.len()).any(|window| window == run)
}

fn audio(settings: &[(&str, &str)]) -> JobPlan {
    plan(&request(
        ToolKind::AudioEditor,
        vec![blob("song.mp3", "audio/mpeg")],
        settings,
    ))
}

#[test]
fn audio_trim_seeks_on_output() {
    let plan = audio(&[("operation", "trim"), ("start", "2"), ("end", "7")]);
    let args = step_args(&plan, 0);
    assert!(contains_run(&args, &["-ss", "2", "-to", "7"]));
    assert_eq!(
        args,
        vec!["-i", "input.mp3", "-ss", "2", "-to", "7", "output.mp3"]
    );
    assert_eq!(plan.outputs()[0].download_name, "edited-audio.mp3");
    assert_eq!(plan.outputs()[0].mime, "audio/mpeg");
}

#[test]
fn audio_volume_is_a_ratio() {
    let plan = audio(&[("operation", "volume"), ("volume", "150")]);
    assert_eq!(
        step_args(&plan, 0),
        vec!["-i", "input.mp3", "-af", "volume=1.5", "output.mp3"]
    );
}

#[test]
fn audio_fades_use_end_time() {
    let plan = audio(&[
        ("operation", "fade"),
        ("fade_in", "1.5"),
        ("fade_out", "2"),
        ("start", "0"),
        ("end", "10"),
    ]);
    let args = step_args(&plan, 0);
    assert_eq!(
        args,
        vec![
            "-i",
            "input.mp3",
            "-af",
            "afade=t=in:st=0:d=1.5,afade=t=out:st=8:d=2",
            "output.mp3"
        ]
    );
}

#[test]
fn audio_zero_fades_produce_no_filter() {
    let plan = audio(&[("operation", "fade")]);
    assert_eq!(step_args(&plan, 0), vec!["-i", "input.mp3", "output.mp3"]);
}

#[test]
fn audio_all_seeks_before_input_so_fades_follow_the_clip() {
    let plan = audio(&[
        ("operation", "all"),
        ("start", "2"),
        ("end", "7"),
        ("volume", "100"),
        ("fade_in", "0.5"),
        ("fade_out", "1"),
    ]);
    assert_eq!(
        step_args(&plan, 0),
        vec![
            "-ss",
            "2",
            "-to",
            "7",
            "-i",
            "input.mp3",
            "-af",
            "volume=1,afade=t=in:st=0:d=0.5,afade=t=out:st=4:d=1",
            "output.mp3"
        ]
    );
}

#[test]
fn audio_merge_concatenates_in_order() {
    let plan = plan(&request(
        ToolKind::AudioEditor,
        vec![
            blob("b.mp3", "audio/mpeg"),
            blob("a.mp3", "audio/mpeg"),
            blob("c.mp3", "audio/mpeg"),
        ],
        &[("operation", "merge")],
    ));
    let staged: Vec<_> = plan.staged().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        staged,
        vec!["input0.mp3", "input1.mp3", "input2.mp3", "concat.txt"]
    );
    assert_eq!(&plan.staged()[0].data[..], b"b.mp3");
    assert_eq!(
        &plan.staged()[3].data[..],
        b"file 'input0.mp3'\nfile 'input1.mp3'\nfile 'input2.mp3'"
    );
    assert_eq!(
        step_args(&plan, 0),
        vec!["-f", "concat", "-safe", "0", "-i", "concat.txt", "-c", "copy", "output.mp3"]
    );
}

#[test]
fn audio_merge_with_one_file_copies_through() {
    let plan = audio(&[("operation", "merge")]);
    assert_eq!(step_args(&plan, 0), vec!["-i", "input.mp3", "output.mp3"]);
}

#[test]
fn gif_optimized_runs_palette_then_render() {
    let plan = plan(&request(
        ToolKind::GifMaker,
        vec![blob("clip.mp4", "video/mp4")],
        &[("fps", "15"), ("resolution", "480"), ("optimize", "true")],
    ));
    assert_eq!(plan.steps().len(), 2);
    assert_eq!(
        step_args(&plan, 0),
        vec![
            "-ss",
            "0",
            "-to",
            "5",
            "-i",
            "input.mp4",
            "-vf",
            "fps=15,scale=480:-1:flags=lanczos,palettegen",
            "palette.png"
        ]
    );
    assert_eq!(
        step_args(&plan, 1),
        vec![
            "-ss",
            "0",
            "-to",
            "5",
            "-i",
            "input.mp4",
            "-i",
            "palette.png",
            "-lavfi",
            "fps=15,scale=480:-1:flags=lanczos[x];[x][1:v]paletteuse",
            "output.gif"
        ]
    );
    assert_eq!(plan.outputs()[0].download_name, "animated.gif");
}

#[test]
fn gif_single_pass_at_original_size() {
    let plan = plan(&request(
        ToolKind::GifMaker,
        vec![blob("clip.mp4", "video/mp4")],
        &[("resolution", "original"), ("optimize", "false"), ("fps", "10")],
    ));
    assert_eq!(
        step_args(&plan, 0),
        vec!["-ss", "0", "-to", "5", "-i", "input.mp4", "-vf", "fps=10", "output.gif"]
    );
}

#[test]
fn gif_from_images_uses_concat_script() {
    let plan = plan(&request(
        ToolKind::GifMaker,
        vec![blob("1.png", "image/png"), blob("2.png", "image/png")],
        &[
            ("source", "images"),
            ("fps", "10"),
            ("resolution", "original"),
            ("optimize", "true"),
        ],
    ));
    assert_eq!(
        &plan.staged()[2].data[..],
        b"file 'img0.png'\nduration 0.1\nfile 'img1.png'\nduration 0.1"
    );
    assert_eq!(
        step_args(&plan, 0),
        vec![
            "-f",
            "concat",
            "-safe",
            "0",
            "-i",
            "concat.txt",
            "-vf",
            "null,palettegen",
            "palette.png"
        ]
    );
    assert!(contains_run(
        &step_args(&plan, 1),
        &["-lavfi", "null[x];[x][1:v]paletteuse", "output.gif"]
    ));
}

#[test]
fn compressor_maps_quality_and_resolution() {
    let plan = plan(&request(
        ToolKind::VideoCompressor,
        vec![blob("clip.mov", "video/quicktime")],
        &[("quality", "high"), ("resolution", "720p")],
    ));
    assert_eq!(
        step_args(&plan, 0),
        vec![
            "-i",
            "input.mp4",
            "-c:v",
            "libx264",
            "-crf",
            "23",
            "-preset",
            "medium",
            "-c:a",
            "aac",
            "-b:a",
            "128k",
            "-vf",
            "scale=-2:720",
            "output.mp4"
        ]
    );
    assert_eq!(plan.outputs()[0].download_name, "compressed.mp4");
}

#[test]
fn video_to_mp3_and_mute() {
    let mp3 = plan(&request(
        ToolKind::VideoToMp3,
        vec![blob("clip.mp4", "video/mp4")],
        &[],
    ));
    assert_eq!(
        step_args(&mp3, 0),
        vec!["-i", "input.mp4", "-vn", "-ab", "192k", "output.mp3"]
    );
    assert_eq!(mp3.outputs()[0].download_name, "converted.mp3");
    assert_eq!(mp3.backend, Backend::Media);

    let muted = plan(&request(
        ToolKind::MuteVideo,
        vec![blob("clip.webm", "video/webm")],
        &[],
    ));
    assert_eq!(
        step_args(&muted, 0),
        vec!["-i", "input.mp4", "-c:v", "copy", "-an", "output.mp4"]
    );
    assert_eq!(muted.outputs()[0].download_name, "muted_clip.webm");
    assert_eq!(muted.outputs()[0].mime, "video/webm");
}

#[test]
fn converter_runs_once_per_image() {
    let plan = plan(&request(
        ToolKind::ImageConverter,
        vec![blob("cat.png", "image/png"), blob("dog.jpeg", "image/jpeg")],
        &[("format", "jpg"), ("quality", "85"), ("resolution", "1280")],
    ));
    assert_eq!(plan.steps().len(), 2);
    assert_eq!(
        step_args(&plan, 1),
        vec!["-i", "input1.jpeg", "-vf", "scale=1280:-1", "-q:v", "5", "output1.jpg"]
    );
    assert_eq!(
        plan.steps()[0].label.as_deref(),
        Some("Processing 1/2: cat.png")
    );
    let names: Vec<_> = plan
        .outputs()
        .iter()
        .map(|o| (o.download_name.as_str(), o.mime.as_str()))
        .collect();
    assert_eq!(
        names,
        vec![("cat.jpg", "image/jpeg"), ("dog.jpg", "image/jpeg")]
    );
}

#[test]
fn converter_encoder_flags_per_format() {
    let cases = [
        ("webp", vec!["-quality", "85"]),
        ("avif", vec!["-c:v", "libaom-av1", "-crf", "8"]),
        ("png", vec!["-compression_level", "9"]),
    ];
    for (format, flags) in cases {
        let plan = plan(&request(
            ToolKind::ImageConverter,
            vec![blob("cat.png", "image/png")],
            &[("format", format)],
        ));
        let args = step_args(&plan, 0);
        assert!(contains_run(&args, &flags), "{format}: {args:?}");
        assert_eq!(args.last().copied(), Some(format!("output0.{format}").as_str()));
    }
}

#[test]
fn resizer_keeps_aspect_when_both_sides_given() {
    let plan = plan(&request(
        ToolKind::ImageResizer,
        vec![blob("cat.jpg", "image/jpeg")],
        &[("width", "800"), ("height", "600"), ("quality", "0.8")],
    ));
    assert_eq!(
        step_args(&plan, 0),
        vec![
            "-i",
            "input.jpg",
            "-vf",
            "scale=800:600:force_original_aspect_ratio=decrease",
            "-q:v",
            "6",
            "output.jpg"
        ]
    );
    assert_eq!(plan.outputs()[0].download_name, "resized_cat.jpg");
    assert_eq!(plan.outputs()[0].mime, "image/jpeg");
}

#[test]
fn resizer_without_dimensions_only_reencodes() {
    let plan = plan(&request(
        ToolKind::ImageResizer,
        vec![blob("cat.png", "image/png")],
        &[],
    ));
    assert_eq!(
        step_args(&plan, 0),
        vec!["-i", "input.png", "output.png"]
    );
}

#[test]
fn meme_draws_uppercased_captions_from_files() {
    let ctx = PlanContext {
        font_file: Some(PathBuf::from("/fonts/Impact.ttf")),
    };
    let req = request(
        ToolKind::MemeGenerator,
        vec![blob("cat.png", "image/png")],
        &[
            ("top_text", "one does not"),
            ("font_size", "45"),
            ("color", "#FFCC00"),
        ],
    );
    let plan = build_plan(&req, &ctx).unwrap();
    let staged: Vec<_> = plan.staged().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(staged, vec!["input.png", "top.txt"]);
    assert_eq!(&plan.staged()[1].data[..], b"ONE DOES NOT");
    assert_eq!(
        step_args(&plan, 0),
        vec![
            "-i",
            "input.png",
            "-vf",
            "drawtext=fontfile='/fonts/Impact.ttf':textfile=top.txt:expansion=none:fontcolor=0xffcc00:fontsize=45:borderw=3:bordercolor=black:x=(w-text_w)/2:y=20",
            "output.png"
        ]
    );
    assert_eq!(plan.outputs()[0].download_name, "my-meme.png");
}

#[test]
fn meme_captions_with_percent_and_backslash_are_drawn_literally() {
    let plan = plan(&request(
        ToolKind::MemeGenerator,
        vec![blob("cat.png", "image/png")],
        &[("top_text", "50% off \\o/"), ("bottom_text", "100%")],
    ));
    assert_eq!(&plan.staged()[1].data[..], b"50% OFF \\O/");
    assert_eq!(&plan.staged()[2].data[..], b"100%");
    let filter = &step_args(&plan, 0)[3];
    assert_eq!(filter.matches("drawtext=").count(), 2);
    assert_eq!(filter.matches(":expansion=none:").count(), 2);
    assert!(!filter.contains('%'));
}

#[test]
fn meme_without_captions_passes_through() {
    let plan = plan(&request(
        ToolKind::MemeGenerator,
        vec![blob("cat.png", "image/png")],
        &[("bottom_text", "   ")],
    ));
    assert_eq!(
        step_args(&plan, 0),
        vec!["-i", "input.png", "-vf", "null", "output.png"]
    );
}

#[test]
fn pdf_to_jpg_renders_each_page() {
    let plan = plan(&request(
        ToolKind::PdfToJpg,
        vec![pdf_blob("report.pdf", &["a", "b"])],
        &[],
    ));
    assert_eq!(plan.backend, Backend::PdfRenderer);
    assert_eq!(plan.steps().len(), 2);
    assert_eq!(
        step_args(&plan, 1),
        vec![
            "-jpeg",
            "-jpegopt",
            "quality=80",
            "-r",
            "144",
            "-f",
            "2",
            "-l",
            "2",
            "-singlefile",
            "input.pdf",
            "page-2"
        ]
    );
    let outputs: Vec<_> = plan
        .outputs()
        .iter()
        .map(|o| (o.name.as_str(), o.download_name.as_str()))
        .collect();
    assert_eq!(
        outputs,
        vec![
            ("page-1.jpg", "report-page-1.jpg"),
            ("page-2.jpg", "report-page-2.jpg")
        ]
    );
}

#[test]
fn pdf_to_jpg_rejects_garbage() {
    let req = request(
        ToolKind::PdfToJpg,
        vec![blob("fake.pdf", "application/pdf")],
        &[],
    );
    assert!(matches!(
        build_plan(&req, &PlanContext::default()),
        Err(PlanError::UnreadablePdf(_))
    ));
}

#[test]
fn merge_pdf_keeps_document_order() {
    let plan = plan(&request(
        ToolKind::MergePdf,
        vec![pdf_blob("b.pdf", &["b1"]), pdf_blob("a.pdf", &["a1"])],
        &[],
    ));
    assert_eq!(plan.backend, Backend::PdfDocument);
    assert!(plan.steps().is_empty());
    let Work::MergePdf { documents, output } = &plan.work else {
        panic!("expected merge work");
    };
    assert_eq!(documents.len(), 2);
    assert_eq!(common::page_labels(&documents[0]), vec!["b1"]);
    assert_eq!(output.download_name, "merged.pdf");
}

#[test]
fn invalid_requests_are_rejected() {
    let ctx = PlanContext::default();

    let empty = request(ToolKind::VideoToMp3, Vec::new(), &[]);
    assert!(matches!(build_plan(&empty, &ctx), Err(PlanError::NoInputs)));

    let single = request(ToolKind::MergePdf, vec![pdf_blob("a.pdf", &["a"])], &[]);
    assert!(matches!(
        build_plan(&single, &ctx),
        Err(PlanError::TooFewInputs {
            needed: 2,
            got: 1,
            ..
        })
    ));

    let mut mismatched = request(ToolKind::MuteVideo, vec![blob("a.mp4", "video/mp4")], &[]);
    mismatched.tool = ToolKind::VideoToMp3;
    assert!(matches!(
        build_plan(&mismatched, &ctx),
        Err(PlanError::OptionsMismatch { .. })
    ));
}

#[test]
fn planning_is_deterministic() {
    let req = request(
        ToolKind::GifMaker,
        vec![blob("clip.mp4", "video/mp4")],
        &[("start", "1.25"), ("end", "3")],
    );
    assert_eq!(plan(&req), plan(&req));
}
