//! Tracing worksheet example: passages and glosses from JSON, a CJK font from
//! the system when one can be found
//!
//! Run with `cargo run --example tracing_sheet [output.pdf]`

use hanja_tracing::{
    GlossResolver, JsonPassageSource, MapGlossSource, PassageSource, TtfFontMetrics,
    WorksheetConfig, WorksheetDocument,
};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Try to load a system font with Hangul and CJK ideograph coverage
fn load_cjk_font() -> Option<TtfFontMetrics> {
    let candidates = [
        "/usr/share/fonts/opentype/noto/NotoSerifCJK-Regular.ttc",
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/truetype/nanum/NanumMyeongjo.ttf",
        "/usr/share/fonts/truetype/nanum/NanumGothic.ttf",
        "/System/Library/Fonts/AppleSDGothicNeo.ttc",
        "C:\\Windows\\Fonts\\malgun.ttf",
    ];
    candidates
        .iter()
        .find_map(|path| TtfFontMetrics::from_file(path).ok())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    let data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos").join("data");
    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tracing_sheet.pdf".to_string());

    let passages = JsonPassageSource::new(data_dir.join("passages.json")).passages()?;
    let glosses = MapGlossSource::from_json_file(data_dir.join("glosses.json"))?;
    println!("Loaded {} passages and {} glosses", passages.len(), glosses.len());

    let mut resolver = GlossResolver::new(glosses);
    // Reading in this verse is 열, not the first-listed 설
    resolver.add_override("說", "기쁠 열");

    let font = load_cjk_font();
    if font.is_none() {
        println!("No CJK font found, falling back to Helvetica (ideographs will not display)");
    }

    let document = WorksheetDocument::new(WorksheetConfig::new())?;
    let summary = document.save_pdf(&passages, &mut resolver, font, &output)?;

    println!(
        "Rendered {} passages on {} pages to '{}'",
        summary.passages, summary.pages, output
    );
    Ok(())
}
