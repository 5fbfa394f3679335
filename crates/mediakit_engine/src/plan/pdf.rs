use mediakit_core::{Backend, Blob};

use super::{file_stem, Invocation, JobPlan, OutputSpec, PlanError, StagedFile, Work};
use crate::pdf::page_count;

/// Fixed 2x upscale of the 72 dpi PDF user space.
const RENDER_DPI: u32 = 144;
const JPEG_QUALITY: u32 = 80;

pub(super) fn to_jpg(input: &Blob) -> Result<JobPlan, PlanError> {
    let pages = page_count(&input.data)?;
    if pages == 0 {
        return Err(PlanError::EmptyPdf);
    }

    let stem = file_stem(&input.name);
    let mut steps = Vec::with_capacity(pages);
    let mut outputs = Vec::with_capacity(pages);
    for page in 1..=pages {
        let page_arg = page.to_string();
        steps.push(
            Invocation::new([
                "-jpeg".to_string(),
                "-jpegopt".to_string(),
                format!("quality={JPEG_QUALITY}"),
                "-r".to_string(),
                RENDER_DPI.to_string(),
                "-f".to_string(),
                page_arg.clone(),
                "-l".to_string(),
                page_arg,
                "-singlefile".to_string(),
                "input.pdf".to_string(),
                format!("page-{page}"),
            ])
            .labelled(format!("Rendering page {page} of {pages}...")),
        );
        outputs.push(OutputSpec::new(
            format!("page-{page}.jpg"),
            format!("{stem}-page-{page}.jpg"),
            "image/jpeg",
        ));
    }

    Ok(JobPlan::commands(
        Backend::PdfRenderer,
        vec![StagedFile::new("input.pdf", input.data.clone())],
        steps,
        outputs,
    ))
}

pub(super) fn merge(inputs: &[Blob]) -> JobPlan {
    JobPlan {
        backend: Backend::PdfDocument,
        work: Work::MergePdf {
            documents: inputs.iter().map(|blob| blob.data.clone()).collect(),
            output: OutputSpec::new("merged.pdf", "merged.pdf", "application/pdf"),
        },
    }
}
