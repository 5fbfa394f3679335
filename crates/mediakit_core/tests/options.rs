use pretty_assertions::assert_eq;

use mediakit_core::{
    AudioOperation, FieldKind, GifSource, OptionError, ToolKind, ToolOptions,
};

#[test]
fn schema_defaults_match_typed_defaults() {
    for tool in ToolKind::ALL {
        let mut options = ToolOptions::defaults(tool);
        for field in tool.schema() {
            options
                .set(field.key, field.default)
                .unwrap_or_else(|err| panic!("{tool}: default for {} rejected: {err}", field.key));
        }
        assert_eq!(options, ToolOptions::defaults(tool), "{tool}");
    }
}

#[test]
fn values_follow_schema_order() {
    let options = ToolOptions::defaults(ToolKind::AudioEditor);
    let keys: Vec<_> = options.values().into_iter().map(|(k, _)| k).collect();
    assert_eq!(
        keys,
        vec!["operation", "start", "end", "volume", "fade_in", "fade_out"]
    );
    assert!(ToolOptions::defaults(ToolKind::MuteVideo).values().is_empty());
}

#[test]
fn unknown_key_is_rejected() {
    let mut options = ToolOptions::defaults(ToolKind::VideoToMp3);
    let err = options.set("bitrate", "320").unwrap_err();
    assert_eq!(
        err,
        OptionError::UnknownField {
            tool: "video-to-mp3",
            key: "bitrate".to_string()
        }
    );
}

#[test]
fn numbers_are_range_checked() {
    let mut options = ToolOptions::defaults(ToolKind::GifMaker);
    assert!(matches!(
        options.set("fps", "60"),
        Err(OptionError::OutOfRange { key: "fps", .. })
    ));
    assert!(matches!(
        options.set("fps", "12.5"),
        Err(OptionError::InvalidNumber { key: "fps", .. })
    ));
    assert!(matches!(
        options.set("start", "-1"),
        Err(OptionError::OutOfRange { key: "start", .. })
    ));
    assert!(matches!(
        options.set("end", "NaN"),
        Err(OptionError::InvalidNumber { .. })
    ));

    options.set("fps", " 24 ").unwrap();
    options.set("start", "1.5").unwrap();
    let ToolOptions::GifMaker(gif) = &options else {
        panic!("wrong variant");
    };
    assert_eq!(gif.fps, 24);
    assert_eq!(gif.start, 1.5);
}

#[test]
fn choices_and_flags_parse_case_insensitively() {
    let mut options = ToolOptions::defaults(ToolKind::GifMaker);
    options.set("source", "Images").unwrap();
    options.set("resolution", "original").unwrap();
    options.set("optimize", "off").unwrap();
    let ToolOptions::GifMaker(gif) = &options else {
        panic!("wrong variant");
    };
    assert_eq!(gif.source, GifSource::Images);
    assert_eq!(gif.width, None);
    assert!(!gif.optimize);

    assert!(matches!(
        options.set("resolution", "1000"),
        Err(OptionError::InvalidChoice { key: "resolution", .. })
    ));
    assert!(matches!(
        options.set("optimize", "maybe"),
        Err(OptionError::InvalidFlag { .. })
    ));
}

#[test]
fn resizer_dimensions_accept_auto() {
    let mut options = ToolOptions::defaults(ToolKind::ImageResizer);
    options.set("width", "800").unwrap();
    assert_eq!(options.get("width").as_deref(), Some("800"));
    options.set("width", "AUTO").unwrap();
    assert_eq!(options.get("width").as_deref(), Some("auto"));
    options.set("height", "").unwrap();
    assert_eq!(options.get("height").as_deref(), Some("auto"));
    assert!(options.set("height", "0").is_err());
    assert!(options.set("height", "20000").is_err());
}

#[test]
fn meme_color_must_be_hex() {
    let mut options = ToolOptions::defaults(ToolKind::MemeGenerator);
    options.set("color", "#FF8800").unwrap();
    assert_eq!(options.get("color").as_deref(), Some("#ff8800"));
    assert!(matches!(
        options.set("color", "orange"),
        Err(OptionError::InvalidColor { .. })
    ));
    options.set("top_text", "when the build passes").unwrap();
    assert_eq!(
        options.get("top_text").as_deref(),
        Some("when the build passes")
    );
}

#[test]
fn compressor_resolution_maps_to_height() {
    let mut options = ToolOptions::defaults(ToolKind::VideoCompressor);
    options.set("resolution", "720p").unwrap();
    options.set("quality", "low").unwrap();
    let ToolOptions::VideoCompressor(compress) = &options else {
        panic!("wrong variant");
    };
    assert_eq!(compress.height, Some(720));
    assert_eq!(compress.quality.crf(), 35);
    assert_eq!(compress.quality.preset(), "veryfast");
    assert_eq!(options.get("resolution").as_deref(), Some("720p"));
}

#[test]
fn audio_operation_round_trips_through_get() {
    let mut options = ToolOptions::defaults(ToolKind::AudioEditor);
    options.set("operation", "all").unwrap();
    let ToolOptions::AudioEditor(audio) = &options else {
        panic!("wrong variant");
    };
    assert_eq!(audio.operation, AudioOperation::All);
    assert_eq!(options.get("operation").as_deref(), Some("all"));
}

#[test]
fn schema_number_fields_carry_step() {
    let volume = ToolKind::AudioEditor
        .schema()
        .iter()
        .find(|f| f.key == "volume")
        .unwrap();
    assert_eq!(
        volume.kind,
        FieldKind::Number {
            min: 0.0,
            max: 200.0,
            step: 5.0
        }
    );
}

#[test]
fn tool_slugs_parse_back() {
    for tool in ToolKind::ALL {
        assert_eq!(tool.slug().parse::<ToolKind>(), Ok(tool));
    }
    assert_eq!(" Merge-PDF ".parse::<ToolKind>(), Ok(ToolKind::MergePdf));
    assert!("pdf-to-png".parse::<ToolKind>().is_err());
}

#[test]
fn accept_rules_follow_gif_source() {
    let mut options = ToolOptions::defaults(ToolKind::GifMaker);
    assert!(ToolKind::GifMaker.accepts("video/webm", &options));
    assert!(!ToolKind::GifMaker.accepts("image/png", &options));
    options.set("source", "images").unwrap();
    assert!(ToolKind::GifMaker.accepts("image/png", &options));
    assert!(!ToolKind::GifMaker.accepts("video/webm", &options));

    let none = ToolOptions::defaults(ToolKind::MergePdf);
    assert!(ToolKind::MergePdf.accepts("Application/PDF", &none));
    assert!(!ToolKind::MergePdf.accepts("application/pdfx", &none));
}
