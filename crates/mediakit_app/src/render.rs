use std::fmt::Write as _;

use mediakit_core::{
    format_number, AppViewModel, FieldKind, OptionField, Phase, ToolKind, ToolOptions,
};

/// Turns successive view models into terminal lines, printing only what
/// changed since the previous frame.
#[derive(Debug, Default)]
pub struct StatusPrinter {
    last_status: Option<String>,
    last_bucket: Option<u8>,
}

impl StatusPrinter {
    pub fn frame(&mut self, view: &AppViewModel) -> Option<String> {
        let bucket = (view.phase == Phase::Processing).then_some(view.progress / 10);
        let status_changed = self.last_status.as_deref() != Some(view.status.as_str());
        let progress_moved = bucket.is_some() && bucket != self.last_bucket;
        self.last_bucket = bucket;
        if !status_changed && !progress_moved {
            return None;
        }
        self.last_status = Some(view.status.clone());
        Some(status_line(view))
    }
}

pub fn status_line(view: &AppViewModel) -> String {
    match view.phase {
        Phase::Processing => format!("[{:>3}%] {}", view.progress, view.status),
        _ => view.status.clone(),
    }
}

/// Output files of a finished job, one per line.
pub fn outputs_summary(view: &AppViewModel) -> String {
    let mut out = String::new();
    for row in &view.outputs {
        let _ = writeln!(out, "  {}  ({}, {})", row.name, row.mime, row.size);
    }
    out
}

/// Every tool with its engine, accept rule and option schema.
pub fn tool_catalog() -> String {
    let mut out = String::new();
    for tool in ToolKind::ALL {
        let defaults = ToolOptions::defaults(tool);
        let _ = writeln!(
            out,
            "{:<18} {:<18} {:<14} accepts {}{}",
            tool.slug(),
            tool.title(),
            tool.backend().label(),
            tool.accept_label(&defaults),
            if tool.min_inputs() > 1 {
                format!(" (at least {})", tool.min_inputs())
            } else {
                String::new()
            }
        );
        for field in tool.schema() {
            let _ = writeln!(out, "{}", field_line(field));
        }
    }
    out
}

fn field_line(field: &OptionField) -> String {
    format!(
        "    {:<16} {:<24} default {}",
        field.key,
        describe_kind(&field.kind),
        if field.default.is_empty() {
            "(empty)"
        } else {
            field.default
        }
    )
}

fn describe_kind(kind: &FieldKind) -> String {
    match kind {
        FieldKind::Number { min, max, step } => format!(
            "{}..{} step {}",
            format_number(*min),
            format_number(*max),
            format_number(*step)
        ),
        FieldKind::OptionalNumber { min, max } => {
            format!("auto | {}..{}", format_number(*min), format_number(*max))
        }
        FieldKind::Choice(choices) => choices.join(" | "),
        FieldKind::Flag => "true | false".to_string(),
        FieldKind::Text => "text".to_string(),
        FieldKind::Color => "#rrggbb".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediakit_core::{update, AppState, Msg};
    use pretty_assertions::assert_eq;

    fn processing_view(progress: u8, status: &str) -> AppViewModel {
        let mut view = AppState::new(ToolKind::VideoCompressor).view();
        view.phase = Phase::Processing;
        view.progress = progress;
        view.status = status.to_string();
        view
    }

    #[test]
    fn progress_prints_once_per_ten_percent() {
        let mut printer = StatusPrinter::default();
        let lines: Vec<_> = [0, 3, 9, 10, 14, 35, 100]
            .into_iter()
            .filter_map(|p| printer.frame(&processing_view(p, "Compressing video...")))
            .collect();
        assert_eq!(
            lines,
            vec![
                "[  0%] Compressing video...",
                "[ 10%] Compressing video...",
                "[ 35%] Compressing video...",
                "[100%] Compressing video...",
            ]
        );
    }

    #[test]
    fn status_change_prints_even_without_progress() {
        let mut printer = StatusPrinter::default();
        let (state, _) = update(AppState::new(ToolKind::MergePdf), Msg::EngineLoadRequested);
        assert_eq!(printer.frame(&state.view()).as_deref(), Some("Loading PDF library..."));
        assert_eq!(printer.frame(&state.view()), None);
        let (state, _) = update(
            state,
            Msg::EngineLoaded {
                version: "lopdf".to_string(),
            },
        );
        assert_eq!(printer.frame(&state.view()).as_deref(), Some("Ready to merge PDFs."));
    }

    #[test]
    fn catalog_lists_every_tool_and_option() {
        let catalog = tool_catalog();
        for tool in ToolKind::ALL {
            assert!(catalog.contains(tool.slug()), "missing {}", tool.slug());
            for field in tool.schema() {
                assert!(catalog.contains(field.key), "missing {}", field.key);
            }
        }
        assert!(catalog.contains("accepts application/pdf (at least 2)"));
    }

    #[test]
    fn kinds_are_described_for_the_command_line() {
        assert_eq!(
            describe_kind(&FieldKind::Number {
                min: 0.0,
                max: 200.0,
                step: 5.0
            }),
            "0..200 step 5"
        );
        assert_eq!(describe_kind(&FieldKind::Choice(&["jpg", "png"])), "jpg | png");
        assert_eq!(
            describe_kind(&FieldKind::OptionalNumber {
                min: 1.0,
                max: 16384.0
            }),
            "auto | 1..16384"
        );
    }
}
