use std::fmt;
use std::str::FromStr;

use crate::options::{GifSource, ToolOptions};

/// Every utility offered by the suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ToolKind {
    VideoToMp3,
    VideoCompressor,
    AudioEditor,
    GifMaker,
    ImageConverter,
    ImageResizer,
    MemeGenerator,
    MergePdf,
    PdfToJpg,
    MuteVideo,
}

/// The external collaborator a tool runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Backend {
    /// Command-line media engine (ffmpeg).
    Media,
    /// In-process PDF document library.
    PdfDocument,
    /// Command-line PDF page renderer.
    PdfRenderer,
}

impl Backend {
    pub fn label(self) -> &'static str {
        match self {
            Backend::Media => "FFmpeg",
            Backend::PdfDocument => "PDF library",
            Backend::PdfRenderer => "PDF renderer",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl ToolKind {
    pub const ALL: [ToolKind; 10] = [
        ToolKind::VideoToMp3,
        ToolKind::VideoCompressor,
        ToolKind::AudioEditor,
        ToolKind::GifMaker,
        ToolKind::ImageConverter,
        ToolKind::ImageResizer,
        ToolKind::MemeGenerator,
        ToolKind::MergePdf,
        ToolKind::PdfToJpg,
        ToolKind::MuteVideo,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            ToolKind::VideoToMp3 => "video-to-mp3",
            ToolKind::VideoCompressor => "video-compressor",
            ToolKind::AudioEditor => "audio-editor",
            ToolKind::GifMaker => "gif-maker",
            ToolKind::ImageConverter => "image-converter",
            ToolKind::ImageResizer => "image-resizer",
            ToolKind::MemeGenerator => "meme-generator",
            ToolKind::MergePdf => "merge-pdf",
            ToolKind::PdfToJpg => "pdf-to-jpg",
            ToolKind::MuteVideo => "mute-video",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ToolKind::VideoToMp3 => "Video to MP3",
            ToolKind::VideoCompressor => "Video Compressor",
            ToolKind::AudioEditor => "Audio Editor",
            ToolKind::GifMaker => "GIF Maker",
            ToolKind::ImageConverter => "Image Converter",
            ToolKind::ImageResizer => "Image Resizer",
            ToolKind::MemeGenerator => "Meme Generator",
            ToolKind::MergePdf => "Merge PDF",
            ToolKind::PdfToJpg => "PDF to JPG",
            ToolKind::MuteVideo => "Mute Video",
        }
    }

    pub fn backend(self) -> Backend {
        match self {
            ToolKind::MergePdf => Backend::PdfDocument,
            ToolKind::PdfToJpg => Backend::PdfRenderer,
            _ => Backend::Media,
        }
    }

    /// Human-readable accept filter, e.g. `video/*`.
    pub fn accept_label(self, options: &ToolOptions) -> &'static str {
        match self {
            ToolKind::VideoToMp3 | ToolKind::VideoCompressor | ToolKind::MuteVideo => "video/*",
            ToolKind::AudioEditor => "audio/*",
            ToolKind::GifMaker => match gif_source(options) {
                GifSource::Video => "video/*",
                GifSource::Images => "image/*",
            },
            ToolKind::ImageConverter | ToolKind::ImageResizer | ToolKind::MemeGenerator => {
                "image/*"
            }
            ToolKind::MergePdf | ToolKind::PdfToJpg => "application/pdf",
        }
    }

    /// Whether a file with the given MIME type passes the accept filter.
    pub fn accepts(self, mime: &str, options: &ToolOptions) -> bool {
        let mime = mime.trim().to_ascii_lowercase();
        match self.accept_label(options) {
            "application/pdf" => mime == "application/pdf",
            pattern => pattern
                .strip_suffix('*')
                .is_some_and(|prefix| mime.starts_with(prefix)),
        }
    }

    /// Whether more than one file may be selected at once.
    pub fn multi_select(self, options: &ToolOptions) -> bool {
        match self {
            ToolKind::AudioEditor => matches!(
                options,
                ToolOptions::AudioEditor(opts) if opts.operation == crate::AudioOperation::Merge
            ),
            ToolKind::GifMaker => gif_source(options) == GifSource::Images,
            ToolKind::ImageConverter | ToolKind::MergePdf => true,
            _ => false,
        }
    }

    /// New selections are appended to the list instead of replacing it.
    pub fn appends_selection(self) -> bool {
        self == ToolKind::MergePdf
    }

    /// Minimum number of inputs before a job may be started.
    pub fn min_inputs(self) -> usize {
        match self {
            ToolKind::MergePdf => 2,
            _ => 1,
        }
    }

    pub fn ready_message(self) -> &'static str {
        match self {
            ToolKind::VideoToMp3 => "FFmpeg loaded. Ready to convert.",
            ToolKind::VideoCompressor => "FFmpeg loaded. Ready to compress.",
            ToolKind::AudioEditor => "FFmpeg loaded. Ready to edit audio.",
            ToolKind::GifMaker => "FFmpeg loaded. Ready to create GIFs.",
            ToolKind::ImageConverter => "FFmpeg loaded. Ready to convert images.",
            ToolKind::ImageResizer => "FFmpeg loaded. Ready to resize images.",
            ToolKind::MemeGenerator => "FFmpeg loaded. Ready to caption images.",
            ToolKind::MergePdf => "Ready to merge PDFs.",
            ToolKind::PdfToJpg => "PDF renderer loaded. Ready to convert.",
            ToolKind::MuteVideo => "FFmpeg loaded. Ready to mute videos.",
        }
    }

    pub fn running_message(self) -> &'static str {
        match self {
            ToolKind::VideoToMp3 => "Converting...",
            ToolKind::VideoCompressor => "Compressing video...",
            ToolKind::AudioEditor => "Processing audio...",
            ToolKind::GifMaker => "Creating GIF...",
            ToolKind::ImageConverter => "Converting images...",
            ToolKind::ImageResizer => "Resizing image...",
            ToolKind::MemeGenerator => "Generating meme...",
            ToolKind::MergePdf => "Merging PDFs...",
            ToolKind::PdfToJpg => "Rendering pages...",
            ToolKind::MuteVideo => "Removing audio from video...",
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            ToolKind::VideoToMp3 | ToolKind::ImageConverter => "Conversion Complete!",
            ToolKind::VideoCompressor => "Compression Complete!",
            ToolKind::AudioEditor => "Processing Complete!",
            ToolKind::GifMaker => "GIF Created Successfully!",
            ToolKind::ImageResizer => "Resize Complete!",
            ToolKind::MemeGenerator => "Meme Generated!",
            ToolKind::MergePdf => "PDFs Merged!",
            ToolKind::PdfToJpg => "Pages Rendered!",
            ToolKind::MuteVideo => "Video muted successfully!",
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            ToolKind::VideoToMp3 => "Conversion Failed!",
            ToolKind::VideoCompressor => "Compression Failed!",
            ToolKind::AudioEditor => "Processing Failed! Check log for details.",
            ToolKind::GifMaker => "GIF Creation Failed! Check log for details.",
            ToolKind::ImageConverter => "Conversion Failed! Check log for details.",
            ToolKind::ImageResizer => "Resize Failed! Check log for details.",
            ToolKind::MemeGenerator => "Meme Generation Failed! Check log for details.",
            ToolKind::MergePdf => "Error merging PDFs. Please try again.",
            ToolKind::PdfToJpg => "Error converting PDF. Please try again.",
            ToolKind::MuteVideo => "Muting failed! Please try another file.",
        }
    }
}

fn gif_source(options: &ToolOptions) -> GifSource {
    match options {
        ToolOptions::GifMaker(opts) => opts.source,
        _ => GifSource::Video,
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tool '{0}'")]
pub struct UnknownTool(pub String);

impl FromStr for ToolKind {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ToolKind::ALL
            .into_iter()
            .find(|tool| tool.slug() == wanted)
            .ok_or(UnknownTool(wanted))
    }
}
