//! PDF output — draws paginated report lines with the base-14 Helvetica fonts.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use tracing::info;

use crate::errors::AppError;
use crate::models::content::ContentIdeas;
use crate::render::font_metrics::ReportFont;
use crate::render::layout::{layout_report, paginate, PlacedLine, A4};

const LAYER_NAME: &str = "Layer 1";

/// Renders `ideas` to PDF bytes.
pub fn render_pdf_bytes(
    ideas: &ContentIdeas,
    generated_at: &DateTime<Local>,
) -> Result<Vec<u8>, AppError> {
    let pages = paginate(&layout_report(ideas, generated_at), &A4);

    let (doc, first_page, first_layer) = PdfDocument::new(
        "Generated Content Ideas",
        Mm(A4.width_mm),
        Mm(A4.height_mm),
        LAYER_NAME,
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::Render(format!("failed to load Helvetica: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AppError::Render(format!("failed to load Helvetica-Bold: {e}")))?;

    let mut pages = pages.into_iter();
    if let Some(lines) = pages.next() {
        let layer = doc.get_page(first_page).get_layer(first_layer);
        draw_lines(&layer, &lines, &regular, &bold);
    }
    for lines in pages {
        let (page, layer) = doc.add_page(Mm(A4.width_mm), Mm(A4.height_mm), LAYER_NAME);
        let layer = doc.get_page(page).get_layer(layer);
        draw_lines(&layer, &lines, &regular, &bold);
    }

    doc.save_to_bytes()
        .map_err(|e| AppError::Render(format!("failed to serialize PDF: {e}")))
}

fn draw_lines(
    layer: &PdfLayerReference,
    lines: &[PlacedLine],
    regular: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    for line in lines {
        let font = match line.style.font() {
            ReportFont::Helvetica => regular,
            ReportFont::HelveticaBold => bold,
        };
        layer.use_text(
            line.text.clone(),
            line.style.font_size_pt(),
            Mm(line.x_mm),
            Mm(line.y_mm),
            font,
        );
    }
}

/// Report file name, e.g. `pwnspectrum_20261019_0930.pdf`.
pub fn report_file_name(brand: &str, generated_at: &DateTime<Local>) -> String {
    let brand: String = brand
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("{}_{}.pdf", brand, generated_at.format("%Y%m%d_%H%M"))
}

/// Renders `ideas` and writes the PDF into `output_dir`, creating it if needed.
pub async fn write_report(
    ideas: &ContentIdeas,
    brand: &str,
    output_dir: &Path,
    generated_at: &DateTime<Local>,
) -> Result<PathBuf, AppError> {
    // PDF assembly is CPU-bound; keep it off the async executor.
    let owned_ideas = ideas.clone();
    let at = *generated_at;
    let bytes = tokio::task::spawn_blocking(move || render_pdf_bytes(&owned_ideas, &at))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in render: {e}")))??;
    let path = output_dir.join(report_file_name(brand, generated_at));

    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| AppError::Render(format!("failed to create {}: {e}", output_dir.display())))?;
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| AppError::Render(format!("failed to write {}: {e}", path.display())))?;

    info!("Wrote report {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}
