//! Declarative option schema and the typed option values of every tool.
//!
//! Each tool publishes a static list of [`OptionField`]s. Raw text coming
//! from the front end is parsed and range-checked against that list before
//! it reaches the typed options; nothing else is validated.

use crate::ToolKind;

const MAX_SECONDS: f64 = 86_400.0;
const MAX_DIMENSION: f64 = 16_384.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Number { min: f64, max: f64, step: f64 },
    /// Like `Number`, but `auto` (or an empty value) clears it.
    OptionalNumber { min: f64, max: f64 },
    Choice(&'static [&'static str]),
    Flag,
    Text,
    /// `#rrggbb`
    Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionField {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub default: &'static str,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OptionError {
    #[error("{tool} has no option '{key}'")]
    UnknownField { tool: &'static str, key: String },
    #[error("'{value}' is not a valid number for {key}")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{key} must be between {min} and {max}, got {value}")]
    OutOfRange {
        key: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("'{value}' is not one of {choices:?} for {key}")]
    InvalidChoice {
        key: &'static str,
        value: String,
        choices: &'static [&'static str],
    },
    #[error("'{value}' is not a valid on/off value for {key}")]
    InvalidFlag { key: &'static str, value: String },
    #[error("'{value}' is not a #rrggbb color for {key}")]
    InvalidColor { key: &'static str, value: String },
}

const fn seconds(key: &'static str, label: &'static str, default: &'static str) -> OptionField {
    OptionField {
        key,
        label,
        kind: FieldKind::Number {
            min: 0.0,
            max: MAX_SECONDS,
            step: 0.1,
        },
        default,
    }
}

const COMPRESS_QUALITIES: &[&str] = &["high", "medium", "low"];
const COMPRESS_RESOLUTIONS: &[&str] = &["original", "1080p", "720p", "480p"];
const AUDIO_OPERATIONS: &[&str] = &["trim", "merge", "volume", "fade", "all"];
const GIF_SOURCES: &[&str] = &["video", "images"];
const GIF_RESOLUTIONS: &[&str] = &["original", "720", "480", "360"];
const IMAGE_FORMATS: &[&str] = &["jpg", "png", "webp", "avif"];
const IMAGE_RESOLUTIONS: &[&str] = &["original", "1920", "1280", "720", "480"];

const COMPRESSOR_SCHEMA: &[OptionField] = &[
    OptionField {
        key: "quality",
        label: "Quality",
        kind: FieldKind::Choice(COMPRESS_QUALITIES),
        default: "medium",
    },
    OptionField {
        key: "resolution",
        label: "Resolution",
        kind: FieldKind::Choice(COMPRESS_RESOLUTIONS),
        default: "original",
    },
];

const AUDIO_SCHEMA: &[OptionField] = &[
    OptionField {
        key: "operation",
        label: "Operation",
        kind: FieldKind::Choice(AUDIO_OPERATIONS),
        default: "trim",
    },
    seconds("start", "Start Time (seconds)", "0"),
    seconds("end", "End Time (seconds)", "10"),
    OptionField {
        key: "volume",
        label: "Volume (%)",
        kind: FieldKind::Number {
            min: 0.0,
            max: 200.0,
            step: 5.0,
        },
        default: "100",
    },
    seconds("fade_in", "Fade In Duration (seconds)", "0"),
    seconds("fade_out", "Fade Out Duration (seconds)", "0"),
];

const GIF_SCHEMA: &[OptionField] = &[
    OptionField {
        key: "source",
        label: "Mode",
        kind: FieldKind::Choice(GIF_SOURCES),
        default: "video",
    },
    OptionField {
        key: "fps",
        label: "Frame Rate",
        kind: FieldKind::Number {
            min: 5.0,
            max: 30.0,
            step: 1.0,
        },
        default: "15",
    },
    OptionField {
        key: "resolution",
        label: "Width",
        kind: FieldKind::Choice(GIF_RESOLUTIONS),
        default: "480",
    },
    OptionField {
        key: "optimize",
        label: "Optimize (two-pass palette)",
        kind: FieldKind::Flag,
        default: "true",
    },
    seconds("start", "Start Time (seconds)", "0"),
    seconds("end", "End Time (seconds)", "5"),
];

const CONVERTER_SCHEMA: &[OptionField] = &[
    OptionField {
        key: "format",
        label: "Output Format",
        kind: FieldKind::Choice(IMAGE_FORMATS),
        default: "webp",
    },
    OptionField {
        key: "quality",
        label: "Quality (%)",
        kind: FieldKind::Number {
            min: 1.0,
            max: 100.0,
            step: 1.0,
        },
        default: "85",
    },
    OptionField {
        key: "resolution",
        label: "Max Width",
        kind: FieldKind::Choice(IMAGE_RESOLUTIONS),
        default: "original",
    },
];

const RESIZER_SCHEMA: &[OptionField] = &[
    OptionField {
        key: "width",
        label: "Width (px)",
        kind: FieldKind::OptionalNumber {
            min: 1.0,
            max: MAX_DIMENSION,
        },
        default: "auto",
    },
    OptionField {
        key: "height",
        label: "Height (px)",
        kind: FieldKind::OptionalNumber {
            min: 1.0,
            max: MAX_DIMENSION,
        },
        default: "auto",
    },
    OptionField {
        key: "keep_aspect",
        label: "Maintain Aspect Ratio",
        kind: FieldKind::Flag,
        default: "true",
    },
    OptionField {
        key: "quality",
        label: "Quality",
        kind: FieldKind::Number {
            min: 0.1,
            max: 1.0,
            step: 0.1,
        },
        default: "0.8",
    },
];

const MEME_SCHEMA: &[OptionField] = &[
    OptionField {
        key: "top_text",
        label: "Top Text",
        kind: FieldKind::Text,
        default: "",
    },
    OptionField {
        key: "bottom_text",
        label: "Bottom Text",
        kind: FieldKind::Text,
        default: "",
    },
    OptionField {
        key: "font_size",
        label: "Font Size",
        kind: FieldKind::Number {
            min: 10.0,
            max: 120.0,
            step: 1.0,
        },
        default: "40",
    },
    OptionField {
        key: "color",
        label: "Text Color",
        kind: FieldKind::Color,
        default: "#ffffff",
    },
];

impl ToolKind {
    /// Option fields shown for this tool, in display order.
    pub fn schema(self) -> &'static [OptionField] {
        match self {
            ToolKind::VideoCompressor => COMPRESSOR_SCHEMA,
            ToolKind::AudioEditor => AUDIO_SCHEMA,
            ToolKind::GifMaker => GIF_SCHEMA,
            ToolKind::ImageConverter => CONVERTER_SCHEMA,
            ToolKind::ImageResizer => RESIZER_SCHEMA,
            ToolKind::MemeGenerator => MEME_SCHEMA,
            ToolKind::VideoToMp3 | ToolKind::MergePdf | ToolKind::PdfToJpg | ToolKind::MuteVideo => {
                &[]
            }
        }
    }
}

impl OptionField {
    fn number(&self, raw: &str) -> Result<f64, OptionError> {
        let FieldKind::Number { min, max, .. } = self.kind else {
            return Err(self.invalid_number(raw));
        };
        self.ranged(raw, min, max)
    }

    fn integer(&self, raw: &str) -> Result<u32, OptionError> {
        let value = self.number(raw)?;
        if value.fract() != 0.0 {
            return Err(self.invalid_number(raw));
        }
        Ok(value as u32)
    }

    fn optional_number(&self, raw: &str) -> Result<Option<u32>, OptionError> {
        let FieldKind::OptionalNumber { min, max } = self.kind else {
            return Err(self.invalid_number(raw));
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
            return Ok(None);
        }
        let value = self.ranged(trimmed, min, max)?;
        if value.fract() != 0.0 {
            return Err(self.invalid_number(raw));
        }
        Ok(Some(value as u32))
    }

    fn ranged(&self, raw: &str, min: f64, max: f64) -> Result<f64, OptionError> {
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| self.invalid_number(raw))?;
        if !value.is_finite() {
            return Err(self.invalid_number(raw));
        }
        if value < min || value > max {
            return Err(OptionError::OutOfRange {
                key: self.key,
                min,
                max,
                value,
            });
        }
        Ok(value)
    }

    fn choice(&self, raw: &str) -> Result<&'static str, OptionError> {
        let FieldKind::Choice(choices) = self.kind else {
            return Err(OptionError::InvalidChoice {
                key: self.key,
                value: raw.to_string(),
                choices: &[],
            });
        };
        let wanted = raw.trim().to_ascii_lowercase();
        choices
            .iter()
            .copied()
            .find(|choice| *choice == wanted)
            .ok_or_else(|| OptionError::InvalidChoice {
                key: self.key,
                value: raw.to_string(),
                choices,
            })
    }

    fn flag(&self, raw: &str) -> Result<bool, OptionError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(OptionError::InvalidFlag {
                key: self.key,
                value: raw.to_string(),
            }),
        }
    }

    fn color(&self, raw: &str) -> Result<String, OptionError> {
        let trimmed = raw.trim();
        let valid = trimmed
            .strip_prefix('#')
            .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()));
        if valid {
            Ok(trimmed.to_ascii_lowercase())
        } else {
            Err(OptionError::InvalidColor {
                key: self.key,
                value: raw.to_string(),
            })
        }
    }

    fn invalid_number(&self, raw: &str) -> OptionError {
        OptionError::InvalidNumber {
            key: self.key,
            value: raw.to_string(),
        }
    }
}

/// Renders a number the way it appears on an engine command line:
/// `2.0` becomes `2`, `1.5` stays `1.5`.
pub fn format_number(value: f64) -> String {
    format!("{value}")
}

fn dimension_choice(choice: &str) -> Option<u32> {
    choice.trim_end_matches('p').parse().ok()
}

fn dimension_label(value: Option<u32>, suffix: &str) -> String {
    match value {
        Some(v) => format!("{v}{suffix}"),
        None => "original".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressQuality {
    High,
    Medium,
    Low,
}

impl CompressQuality {
    fn from_choice(choice: &str) -> Self {
        match choice {
            "high" => CompressQuality::High,
            "low" => CompressQuality::Low,
            _ => CompressQuality::Medium,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            CompressQuality::High => "high",
            CompressQuality::Medium => "medium",
            CompressQuality::Low => "low",
        }
    }

    /// x264 constant rate factor.
    pub fn crf(self) -> u32 {
        match self {
            CompressQuality::High => 23,
            CompressQuality::Medium => 28,
            CompressQuality::Low => 35,
        }
    }

    pub fn preset(self) -> &'static str {
        match self {
            CompressQuality::High => "medium",
            CompressQuality::Medium => "fast",
            CompressQuality::Low => "veryfast",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressOptions {
    pub quality: CompressQuality,
    /// Target height; `None` keeps the source resolution.
    pub height: Option<u32>,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            quality: CompressQuality::Medium,
            height: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioOperation {
    Trim,
    Merge,
    Volume,
    Fade,
    All,
}

impl AudioOperation {
    fn from_choice(choice: &str) -> Self {
        match choice {
            "merge" => AudioOperation::Merge,
            "volume" => AudioOperation::Volume,
            "fade" => AudioOperation::Fade,
            "all" => AudioOperation::All,
            _ => AudioOperation::Trim,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            AudioOperation::Trim => "trim",
            AudioOperation::Merge => "merge",
            AudioOperation::Volume => "volume",
            AudioOperation::Fade => "fade",
            AudioOperation::All => "all",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioEditOptions {
    pub operation: AudioOperation,
    pub start: f64,
    pub end: f64,
    /// Percent, 100 leaves the level unchanged.
    pub volume: u32,
    pub fade_in: f64,
    pub fade_out: f64,
}

impl Default for AudioEditOptions {
    fn default() -> Self {
        Self {
            operation: AudioOperation::Trim,
            start: 0.0,
            end: 10.0,
            volume: 100,
            fade_in: 0.0,
            fade_out: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GifSource {
    Video,
    Images,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GifOptions {
    pub source: GifSource,
    pub fps: u32,
    /// Output width; `None` keeps the source width.
    pub width: Option<u32>,
    pub optimize: bool,
    pub start: f64,
    pub end: f64,
}

impl Default for GifOptions {
    fn default() -> Self {
        Self {
            source: GifSource::Video,
            fps: 15,
            width: Some(480),
            optimize: true,
            start: 0.0,
            end: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpg,
    Png,
    Webp,
    Avif,
}

impl ImageFormat {
    fn from_choice(choice: &str) -> Self {
        match choice {
            "jpg" => ImageFormat::Jpg,
            "png" => ImageFormat::Png,
            "avif" => ImageFormat::Avif,
            _ => ImageFormat::Webp,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Webp => "webp",
            ImageFormat::Avif => "avif",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ImageFormat::Jpg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Avif => "image/avif",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageConvertOptions {
    pub format: ImageFormat,
    /// 1..=100
    pub quality: u32,
    pub width: Option<u32>,
}

impl Default for ImageConvertOptions {
    fn default() -> Self {
        Self {
            format: ImageFormat::Webp,
            quality: 85,
            width: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub keep_aspect: bool,
    /// 0.1..=1.0, used by lossy formats only.
    pub quality: f64,
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            keep_aspect: true,
            quality: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemeOptions {
    pub top_text: String,
    pub bottom_text: String,
    pub font_size: u32,
    /// `#rrggbb`
    pub color: String,
}

impl Default for MemeOptions {
    fn default() -> Self {
        Self {
            top_text: String::new(),
            bottom_text: String::new(),
            font_size: 40,
            color: "#ffffff".to_string(),
        }
    }
}

/// Current option-panel state of one tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOptions {
    VideoToMp3,
    VideoCompressor(CompressOptions),
    AudioEditor(AudioEditOptions),
    GifMaker(GifOptions),
    ImageConverter(ImageConvertOptions),
    ImageResizer(ResizeOptions),
    MemeGenerator(MemeOptions),
    MergePdf,
    PdfToJpg,
    MuteVideo,
}

impl ToolOptions {
    pub fn defaults(tool: ToolKind) -> Self {
        match tool {
            ToolKind::VideoToMp3 => ToolOptions::VideoToMp3,
            ToolKind::VideoCompressor => ToolOptions::VideoCompressor(CompressOptions::default()),
            ToolKind::AudioEditor => ToolOptions::AudioEditor(AudioEditOptions::default()),
            ToolKind::GifMaker => ToolOptions::GifMaker(GifOptions::default()),
            ToolKind::ImageConverter => {
                ToolOptions::ImageConverter(ImageConvertOptions::default())
            }
            ToolKind::ImageResizer => ToolOptions::ImageResizer(ResizeOptions::default()),
            ToolKind::MemeGenerator => ToolOptions::MemeGenerator(MemeOptions::default()),
            ToolKind::MergePdf => ToolOptions::MergePdf,
            ToolKind::PdfToJpg => ToolOptions::PdfToJpg,
            ToolKind::MuteVideo => ToolOptions::MuteVideo,
        }
    }

    pub fn tool(&self) -> ToolKind {
        match self {
            ToolOptions::VideoToMp3 => ToolKind::VideoToMp3,
            ToolOptions::VideoCompressor(_) => ToolKind::VideoCompressor,
            ToolOptions::AudioEditor(_) => ToolKind::AudioEditor,
            ToolOptions::GifMaker(_) => ToolKind::GifMaker,
            ToolOptions::ImageConverter(_) => ToolKind::ImageConverter,
            ToolOptions::ImageResizer(_) => ToolKind::ImageResizer,
            ToolOptions::MemeGenerator(_) => ToolKind::MemeGenerator,
            ToolOptions::MergePdf => ToolKind::MergePdf,
            ToolOptions::PdfToJpg => ToolKind::PdfToJpg,
            ToolOptions::MuteVideo => ToolKind::MuteVideo,
        }
    }

    /// Parses `raw` against the schema entry for `key` and stores it.
    pub fn set(&mut self, key: &str, raw: &str) -> Result<(), OptionError> {
        let tool = self.tool();
        let field = tool
            .schema()
            .iter()
            .find(|field| field.key == key)
            .ok_or_else(|| OptionError::UnknownField {
                tool: tool.slug(),
                key: key.to_string(),
            })?;

        match self {
            ToolOptions::VideoCompressor(o) => match field.key {
                "quality" => o.quality = CompressQuality::from_choice(field.choice(raw)?),
                _ => o.height = dimension_choice(field.choice(raw)?),
            },
            ToolOptions::AudioEditor(o) => match field.key {
                "operation" => o.operation = AudioOperation::from_choice(field.choice(raw)?),
                "start" => o.start = field.number(raw)?,
                "end" => o.end = field.number(raw)?,
                "volume" => o.volume = field.integer(raw)?,
                "fade_in" => o.fade_in = field.number(raw)?,
                _ => o.fade_out = field.number(raw)?,
            },
            ToolOptions::GifMaker(o) => match field.key {
                "source" => {
                    o.source = match field.choice(raw)? {
                        "images" => GifSource::Images,
                        _ => GifSource::Video,
                    }
                }
                "fps" => o.fps = field.integer(raw)?,
                "resolution" => o.width = dimension_choice(field.choice(raw)?),
                "optimize" => o.optimize = field.flag(raw)?,
                "start" => o.start = field.number(raw)?,
                _ => o.end = field.number(raw)?,
            },
            ToolOptions::ImageConverter(o) => match field.key {
                "format" => o.format = ImageFormat::from_choice(field.choice(raw)?),
                "quality" => o.quality = field.integer(raw)?,
                _ => o.width = dimension_choice(field.choice(raw)?),
            },
            ToolOptions::ImageResizer(o) => match field.key {
                "width" => o.width = field.optional_number(raw)?,
                "height" => o.height = field.optional_number(raw)?,
                "keep_aspect" => o.keep_aspect = field.flag(raw)?,
                _ => o.quality = field.number(raw)?,
            },
            ToolOptions::MemeGenerator(o) => match field.key {
                "top_text" => o.top_text = raw.to_string(),
                "bottom_text" => o.bottom_text = raw.to_string(),
                "font_size" => o.font_size = field.integer(raw)?,
                _ => o.color = field.color(raw)?,
            },
            ToolOptions::VideoToMp3
            | ToolOptions::MergePdf
            | ToolOptions::PdfToJpg
            | ToolOptions::MuteVideo => {}
        }
        Ok(())
    }

    /// Current value of `key` as display text.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match (self, key) {
            (ToolOptions::VideoCompressor(o), "quality") => o.quality.as_str().to_string(),
            (ToolOptions::VideoCompressor(o), "resolution") => dimension_label(o.height, "p"),
            (ToolOptions::AudioEditor(o), "operation") => o.operation.as_str().to_string(),
            (ToolOptions::AudioEditor(o), "start") => format_number(o.start),
            (ToolOptions::AudioEditor(o), "end") => format_number(o.end),
            (ToolOptions::AudioEditor(o), "volume") => o.volume.to_string(),
            (ToolOptions::AudioEditor(o), "fade_in") => format_number(o.fade_in),
            (ToolOptions::AudioEditor(o), "fade_out") => format_number(o.fade_out),
            (ToolOptions::GifMaker(o), "source") => match o.source {
                GifSource::Video => "video".to_string(),
                GifSource::Images => "images".to_string(),
            },
            (ToolOptions::GifMaker(o), "fps") => o.fps.to_string(),
            (ToolOptions::GifMaker(o), "resolution") => dimension_label(o.width, ""),
            (ToolOptions::GifMaker(o), "optimize") => o.optimize.to_string(),
            (ToolOptions::GifMaker(o), "start") => format_number(o.start),
            (ToolOptions::GifMaker(o), "end") => format_number(o.end),
            (ToolOptions::ImageConverter(o), "format") => o.format.extension().to_string(),
            (ToolOptions::ImageConverter(o), "quality") => o.quality.to_string(),
            (ToolOptions::ImageConverter(o), "resolution") => dimension_label(o.width, ""),
            (ToolOptions::ImageResizer(o), "width") => optional_label(o.width),
            (ToolOptions::ImageResizer(o), "height") => optional_label(o.height),
            (ToolOptions::ImageResizer(o), "keep_aspect") => o.keep_aspect.to_string(),
            (ToolOptions::ImageResizer(o), "quality") => format_number(o.quality),
            (ToolOptions::MemeGenerator(o), "top_text") => o.top_text.clone(),
            (ToolOptions::MemeGenerator(o), "bottom_text") => o.bottom_text.clone(),
            (ToolOptions::MemeGenerator(o), "font_size") => o.font_size.to_string(),
            (ToolOptions::MemeGenerator(o), "color") => o.color.clone(),
            _ => return None,
        };
        Some(value)
    }

    /// All `(key, value)` pairs in schema order.
    pub fn values(&self) -> Vec<(&'static str, String)> {
        self.tool()
            .schema()
            .iter()
            .filter_map(|field| self.get(field.key).map(|value| (field.key, value)))
            .collect()
    }
}

fn optional_label(value: Option<u32>) -> String {
    value.map_or_else(|| "auto".to_string(), |v| v.to_string())
}
