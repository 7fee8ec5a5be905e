use std::fs::{self, File};
use std::io::{Cursor, Read};
use std::path::Path;

use folio::export::{Exporter, PdfConfig, PdfExporter};
use folio::export::FontChoice;
use folio::{Block, CountUnit, Error, Format, LockPolicy, RenderOptions, portfolio, render};
use tempfile::TempDir;
use zip::ZipArchive;

const SLIDE_COUNT: usize = 13;
const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn options(dir: &Path) -> RenderOptions {
    RenderOptions {
        system_fonts: false,
        ..RenderOptions::default().with_out_dir(dir)
    }
}

fn read_part(path: &Path, name: &str) -> String {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut part = archive.by_name(name).unwrap();
    let mut xml = String::new();
    part.read_to_string(&mut xml).unwrap();
    xml
}

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("{needle:?} not found"))
}

#[test]
fn test_every_format_writes_its_file() {
    let dir = TempDir::new().unwrap();
    let opts = options(dir.path());
    let tree = portfolio();

    for format in Format::ALL {
        let report = render(&tree, format, &opts).expect("render failed");
        let expected = dir
            .path()
            .join(format!("PORTFOLIO_PRESENTATION.{}", format.extension()));
        assert_eq!(report.path, expected);
        assert!(!report.fell_back);
        assert!(fs::metadata(&expected).unwrap().len() > 0);
        println!("{format}: {} {}", report.count, report.unit);
    }
}

#[test]
fn test_out_dir_is_created() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("out").join("doc");
    let report = render(&portfolio(), Format::Docx, &options(&nested)).unwrap();
    assert!(report.path.starts_with(&nested));
    assert!(report.path.exists());
}

#[test]
fn test_deck_has_thirteen_slides() {
    let dir = TempDir::new().unwrap();
    let report = render(&portfolio(), Format::Pptx, &options(dir.path())).unwrap();

    assert_eq!(report.unit, CountUnit::Slides);
    assert_eq!(report.count, SLIDE_COUNT);
    assert_eq!(report.slide_titles.len(), SLIDE_COUNT);
    assert_eq!(report.slide_titles[1], "About Me");

    let archive = ZipArchive::new(File::open(&report.path).unwrap()).unwrap();
    let slides = archive
        .file_names()
        .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
        .count();
    assert_eq!(slides, SLIDE_COUNT);
}

#[test]
fn test_document_counts_paragraphs() {
    let dir = TempDir::new().unwrap();
    let tree = portfolio();
    let report = render(&tree, Format::Docx, &options(dir.path())).unwrap();

    let blocks = tree
        .blocks()
        .filter(|(_, block)| !matches!(block, Block::SlideBreak { .. }))
        .count();
    assert_eq!(report.unit, CountUnit::Paragraphs);
    assert_eq!(report.count, tree.sections().len() + blocks);
}

#[test]
fn test_about_me_precedes_technical_skills() {
    let dir = TempDir::new().unwrap();
    let opts = options(dir.path());
    let tree = portfolio();

    let docx = render(&tree, Format::Docx, &opts).unwrap();
    let body = read_part(&docx.path, "word/document.xml");
    assert!(position(&body, ">About Me<") < position(&body, ">Technical Skills<"));

    let pptx = render(&tree, Format::Pptx, &opts).unwrap();
    let about = pptx.slide_titles.iter().position(|t| t == "About Me");
    let skills = pptx.slide_titles.iter().position(|t| t.starts_with("Technical Skills"));
    assert!(about.unwrap() < skills.unwrap());
    let slide2 = read_part(&pptx.path, "ppt/slides/slide2.xml");
    assert!(slide2.contains("About Me"));

    // Uncompressed so the content streams can be searched.
    let mut out = Cursor::new(Vec::new());
    PdfExporter::new()
        .with_config(PdfConfig {
            system_fonts: false,
            compress: false,
            ..Default::default()
        })
        .export(&tree, &mut out)
        .unwrap();
    let pdf = String::from_utf8_lossy(out.get_ref());
    assert!(position(&pdf, "(About Me) Tj") < position(&pdf, "(Technical Skills) Tj"));
}

#[test]
fn test_renders_are_byte_identical() {
    let tree = portfolio();
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();

    for format in Format::ALL {
        let a = render(&tree, format, &options(first.path())).unwrap();
        let b = render(&tree, format, &options(second.path())).unwrap();
        assert_eq!(
            fs::read(&a.path).unwrap(),
            fs::read(&b.path).unwrap(),
            "{format} output differs between runs"
        );
    }
}

#[test]
fn test_pdf_without_fonts_falls_back_to_helvetica() {
    let dir = TempDir::new().unwrap();
    let opts = RenderOptions {
        font_candidates: vec![dir.path().join("missing.ttf")],
        ..options(dir.path())
    };
    let report = render(&portfolio(), Format::Pdf, &opts).unwrap();
    assert_eq!(report.unit, CountUnit::Flowables);

    let bytes = fs::read(&report.path).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("/Helvetica"));
    assert!(!text.contains("/FontFile2"));
}

#[test]
fn test_locked_pdf_goes_to_timestamped_name() {
    let dir = TempDir::new().unwrap();
    let default = dir.path().join("PORTFOLIO_PRESENTATION.pdf");
    fs::write(&default, b"held open elsewhere").unwrap();

    let opts = RenderOptions {
        lock_probe: |_| false,
        ..options(dir.path())
    };
    let report = render(&portfolio(), Format::Pdf, &opts).unwrap();

    assert!(report.fell_back);
    assert_ne!(report.path, default);
    let name = report.path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("PORTFOLIO_PRESENTATION_"));
    assert!(name.ends_with(".pdf"));
    // PORTFOLIO_PRESENTATION_YYYYMMDD_HHMMSS.pdf
    assert_eq!(name.len(), "PORTFOLIO_PRESENTATION_".len() + 15 + ".pdf".len());
    assert_eq!(fs::read(&default).unwrap(), b"held open elsewhere");
}

#[test]
fn test_fail_policy_keeps_default_name() {
    let dir = TempDir::new().unwrap();
    let default = dir.path().join("PORTFOLIO_PRESENTATION.docx");
    fs::write(&default, b"stale").unwrap();

    let opts = RenderOptions {
        lock_policy: Some(LockPolicy::Fail),
        lock_probe: |_| false,
        ..options(dir.path())
    };
    let report = render(&portfolio(), Format::Docx, &opts).unwrap();

    assert!(!report.fell_back);
    assert_eq!(report.path, default);
    assert!(fs::read(&default).unwrap().starts_with(b"PK"));
}

#[test]
fn test_unlocked_existing_file_is_overwritten() {
    let dir = TempDir::new().unwrap();
    let opts = options(dir.path());
    let first = render(&portfolio(), Format::Pdf, &opts).unwrap();
    let second = render(&portfolio(), Format::Pdf, &opts).unwrap();
    assert_eq!(first.path, second.path);
    assert!(!second.fell_back);
}

#[test]
fn test_pdf_embeds_korean_font() {
    let dir = TempDir::new().unwrap();
    let font = Path::new(FIXTURES_DIR).join("folio-hangul.ttf");
    let opts = RenderOptions {
        font_candidates: vec![font.clone()],
        ..options(dir.path())
    };
    let report = render(&portfolio(), Format::Pdf, &opts).unwrap();

    let bytes = fs::read(&report.path).unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("/FontFile2"));
    assert!(text.contains("/CIDFontType2"));
    assert!(text.contains("/ToUnicode"));
    assert!(!text.contains("/Helvetica"));

    let choice = PdfExporter::new()
        .with_config(PdfConfig {
            font_candidates: vec![font.clone()],
            system_fonts: false,
            ..Default::default()
        })
        .probe_font(&portfolio());
    assert_eq!(choice, FontChoice::Embedded(font));
}

#[cfg(unix)]
#[test]
fn test_read_only_out_dir_is_unwritable() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("doc");
    fs::create_dir(&out).unwrap();
    fs::set_permissions(&out, fs::Permissions::from_mode(0o555)).unwrap();

    // Privileged users write through directory permissions.
    let bypassed = fs::write(out.join("check"), b"").is_ok();
    let result = if bypassed {
        None
    } else {
        Some(render(&portfolio(), Format::Docx, &options(&out)))
    };
    fs::set_permissions(&out, fs::Permissions::from_mode(0o755)).unwrap();
    let Some(result) = result else {
        eprintln!("skipping: permissions are not enforced for this user");
        return;
    };

    let err = result.unwrap_err();
    match &err {
        Error::OutputUnwritable { path, .. } => {
            assert_eq!(path, &out.join("PORTFOLIO_PRESENTATION.docx"));
        }
        other => panic!("expected OutputUnwritable, got {other:?}"),
    }
    assert!(err.remediation().unwrap().len() > 1);
}
