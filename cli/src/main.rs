//! arextract CLI - Arabic text extraction tool

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use arextract::{
    classify, extract_text_from_file, CorrectionTable, Error, ExtractOptions, ExtractedText,
    Extractor, NormalizeOptions, OcrConfig, OcrSpaceClient, PageOutcome, PageSelection,
    SourceDocument,
};

/// Characters shown by `preview`.
const PREVIEW_CHARS: usize = 1000;

#[derive(Parser)]
#[command(name = "arextract")]
#[command(version)]
#[command(about = "Extract normalized Arabic text from PDF and Word uploads", long_about = None)]
struct Cli {
    /// Log per-page decisions
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the extracted text
    Text {
        #[command(flatten)]
        extract: ExtractArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show length, page report and the beginning of the text
    Preview {
        #[command(flatten)]
        extract: ExtractArgs,
    },

    /// Print the per-page extraction report as JSON
    Report {
        #[command(flatten)]
        extract: ExtractArgs,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show which extraction path a file would take
    Classify {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Declared media type (sniffed from content if omitted)
        #[arg(long, value_name = "TYPE")]
        media_type: Option<String>,
    },

    /// Normalize a text file (stdin if not specified)
    Normalize {
        /// Input text file
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        #[command(flatten)]
        normalize: NormalizeArgs,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct ExtractArgs {
    /// Input PDF or Word file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Declared media type (sniffed from content if omitted)
    #[arg(long, value_name = "TYPE")]
    media_type: Option<String>,

    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long)]
    pages: Option<String>,

    /// OCR.space API key
    #[arg(long, env = "OCR_SPACE_API_KEY", hide_env_values = true)]
    ocr_key: Option<String>,

    /// Send pages with at most this many non-whitespace characters to OCR
    #[arg(long, default_value_t = arextract::parser::DEFAULT_OCR_THRESHOLD)]
    ocr_threshold: usize,

    /// Per-page OCR timeout in seconds
    #[arg(long, default_value_t = 5.0)]
    ocr_timeout: f64,

    #[command(flatten)]
    normalize: NormalizeArgs,
}

#[derive(Args)]
struct NormalizeArgs {
    /// JSON file with extra corrections
    #[arg(long, value_name = "JSON")]
    corrections: Option<PathBuf>,

    /// Compose to Unicode NFC before cleanup
    #[arg(long)]
    nfc: bool,
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Text { extract, output } => cmd_text(&extract, output.as_deref()).await,
        Commands::Preview { extract } => cmd_preview(&extract).await,
        Commands::Report { extract, compact } => cmd_report(&extract, compact).await,
        Commands::Classify { input, media_type } => cmd_classify(&input, media_type.as_deref()),
        Commands::Normalize { input, normalize } => cmd_normalize(input.as_deref(), &normalize),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn cmd_text(args: &ExtractArgs, output: Option<&Path>) -> CliResult<()> {
    let extracted = run_extraction(args).await?;

    if let Some(path) = output {
        fs::write(path, &extracted.text)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", extracted.text);
    }

    warn_partial(&extracted);
    Ok(())
}

async fn cmd_preview(args: &ExtractArgs) -> CliResult<()> {
    let extracted = run_extraction(args).await?;
    let report = &extracted.report;

    println!("{}", "Extraction Preview".cyan().bold());
    println!("{}", "=".repeat(40));
    println!("{}: {}", "File".bold(), args.input.display());
    println!("{}: {}", "Format".bold(), report.format);
    println!("{}: {}", "Length".bold(), extracted.char_count());
    if report.page_count > 0 {
        println!("{}: {}", "Pages".bold(), report.page_count);
    }

    for (page, outcome) in &report.pages {
        let line = match outcome {
            PageOutcome::Embedded { chars } => format!("text layer, {} chars", chars).normal(),
            PageOutcome::Ocr { chars } => format!("OCR, {} chars", chars).cyan(),
            PageOutcome::Skipped(reason) => format!("skipped ({})", reason).yellow(),
        };
        println!("  {} {:>4}: {}", "├─".dimmed(), page, line);
    }

    println!();
    println!("{}", extracted.scoring_prefix(PREVIEW_CHARS));
    if extracted.char_count() > PREVIEW_CHARS {
        println!("{}", "...".dimmed());
    }

    Ok(())
}

async fn cmd_report(args: &ExtractArgs, compact: bool) -> CliResult<()> {
    let extracted = run_extraction(args).await?;

    let json = if compact {
        serde_json::to_string(&extracted.report)?
    } else {
        serde_json::to_string_pretty(&extracted.report)?
    };
    println!("{}", json);

    Ok(())
}

fn cmd_classify(input: &Path, media_type: Option<&str>) -> CliResult<()> {
    let source = load_source(input, media_type)?;

    let declared = if source.media_type().is_empty() {
        "(none)"
    } else {
        source.media_type()
    };
    println!("{}: {}", "File".bold(), source.name());
    println!("{}: {}", "Media type".bold(), declared);

    match classify(source.name(), source.media_type()) {
        Ok(format) => println!("{}: {}", "Path".bold(), format.to_string().green()),
        Err(e) => println!("{}: {}", "Path".bold(), e.to_string().red()),
    }

    Ok(())
}

fn cmd_normalize(input: Option<&Path>, args: &NormalizeArgs) -> CliResult<()> {
    let text = match input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let normalizer = arextract::ArabicNormalizer::new(normalize_options(args)?)?;
    println!("{}", normalizer.normalize(&text));
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "arextract".cyan().bold(), env!("CARGO_PKG_VERSION"));
}

async fn run_extraction(args: &ExtractArgs) -> CliResult<ExtractedText> {
    let source = load_source(&args.input, args.media_type.as_deref())?;
    let extractor = build_extractor(args)?;
    Ok(extract_text_from_file(&source, &extractor).await?)
}

fn load_source(input: &Path, media_type: Option<&str>) -> CliResult<SourceDocument> {
    let source = SourceDocument::from_path(input)?;
    Ok(match media_type {
        Some(media_type) => source.with_media_type(media_type),
        None => source,
    })
}

fn build_extractor(args: &ExtractArgs) -> CliResult<Extractor> {
    let extractor = Extractor::new().with_options(extract_options(args)?);

    let mut config = OcrConfig::from_env();
    if let Some(key) = &args.ocr_key {
        config = config.with_api_key(key.clone());
    }

    match OcrSpaceClient::from_config(config) {
        Ok(client) => Ok(extractor.with_ocr(client)),
        Err(Error::OcrUnavailable) => {
            log::info!("no OCR key configured; pages without a text layer will be skipped");
            Ok(extractor)
        }
        Err(e) => Err(e.into()),
    }
}

fn extract_options(args: &ExtractArgs) -> CliResult<ExtractOptions> {
    let pages = match &args.pages {
        Some(p) => PageSelection::parse(p).map_err(|e| format!("Invalid page range: {}", e))?,
        None => PageSelection::All,
    };

    if !(args.ocr_timeout.is_finite() && args.ocr_timeout > 0.0) {
        return Err(format!("Invalid OCR timeout: {}", args.ocr_timeout).into());
    }

    Ok(ExtractOptions::new()
        .with_pages(pages)
        .with_ocr_threshold(args.ocr_threshold)
        .with_ocr_timeout(Duration::from_secs_f64(args.ocr_timeout))
        .with_normalize(normalize_options(&args.normalize)?))
}

fn normalize_options(args: &NormalizeArgs) -> CliResult<NormalizeOptions> {
    let mut corrections = CorrectionTable::default();
    if let Some(path) = &args.corrections {
        corrections.extend(CorrectionTable::from_json_file(path)?);
    }

    Ok(NormalizeOptions::new()
        .with_corrections(corrections)
        .with_unicode_nfc(args.nfc))
}

fn warn_partial(extracted: &ExtractedText) {
    let skipped = extracted.report.skipped_pages();
    if !skipped.is_empty() {
        eprintln!(
            "{} {} page(s) contributed no text: {:?}",
            "Warning:".yellow().bold(),
            skipped.len(),
            skipped
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_extract_options_from_flags() {
        let cli = parse(&[
            "arextract",
            "text",
            "lesson.pdf",
            "--pages",
            "1-3",
            "--ocr-threshold",
            "40",
            "--ocr-timeout",
            "2.5",
            "--nfc",
        ]);
        let Commands::Text { extract, .. } = cli.command else {
            panic!("expected text command");
        };

        let options = extract_options(&extract).unwrap();
        assert_eq!(options.pages, PageSelection::Range(1..=3));
        assert_eq!(options.ocr_threshold, 40);
        assert_eq!(options.ocr_timeout, Duration::from_millis(2500));
        assert!(options.normalize.unicode_nfc);
    }

    #[test]
    fn test_rejects_bad_timeout() {
        let cli = parse(&["arextract", "report", "a.pdf", "--ocr-timeout", "0"]);
        let Commands::Report { extract, .. } = cli.command else {
            panic!("expected report command");
        };
        assert!(extract_options(&extract).is_err());
    }

    #[test]
    fn test_corrections_file_extends_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extra.json");
        fs::write(&path, r#"[{"find": "اجلامعة", "replace": "الجامعة"}]"#).unwrap();

        let args = NormalizeArgs {
            corrections: Some(path),
            nfc: false,
        };
        let options = normalize_options(&args).unwrap();
        assert_eq!(
            options.corrections.len(),
            CorrectionTable::default().len() + 1
        );
    }
}
