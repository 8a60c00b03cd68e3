use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use helpmark_core::{
    CompileError, Diagnostic, Document, HtmlEmitOptions, RenderError, compile,
    emit_html_sanitized_with_options, emit_html_with_options,
};
use helpmark_renderer::{DirectoryImages, emit_rtf, wrap_page};

const IMAGE_CACHE_SIZE: usize = 64;

#[derive(Parser)]
#[command(
    name = "helpmark",
    version,
    about = "Compile help markup into HTML or RTF"
)]
struct Cli {
    /// Input file. Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Html)]
    format: Format,

    /// Print only the HTML body fragment instead of a full page
    #[arg(long)]
    raw: bool,

    /// Run the HTML through the sanitizer allow-list
    #[arg(long)]
    sanitized: bool,

    /// Directory searched for images. Defaults to the input's directory.
    #[arg(long, env = "HELPMARK_IMAGE_DIR")]
    image_dir: Option<PathBuf>,

    /// Reference images by name instead of embedding them (HTML only)
    #[arg(long)]
    link_images: bool,

    /// How compile errors are reported on stderr
    #[arg(long, value_enum, default_value_t = DiagnosticsMode::Pretty)]
    diagnostics: DiagnosticsMode,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Html,
    Rtf,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DiagnosticsMode {
    Json,
    Pretty,
}

#[derive(Debug)]
enum Failure {
    Io(String),
    Compile(CompileError),
    Render(RenderError),
    Serialize(serde_json::Error),
}

impl Failure {
    /// Output failures share the render exit code.
    fn code(&self) -> u8 {
        match self {
            Failure::Io(_) => 1,
            Failure::Compile(_) => 2,
            Failure::Render(_) | Failure::Serialize(_) => 3,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            match &failure {
                Failure::Io(message) => eprintln!("{}", message),
                Failure::Compile(error) => emit_diagnostics(error, cli.diagnostics),
                Failure::Render(error) => eprintln!("{}", error),
                Failure::Serialize(error) => {
                    eprintln!("failed to serialize document: {}", error)
                }
            }
            ExitCode::from(failure.code())
        }
    }
}

fn run(cli: &Cli) -> Result<(), Failure> {
    let source = read_input(cli.input.as_deref())?;
    let document = compile(&source).map_err(Failure::Compile)?;
    log::info!(
        "compiled {} parts, title: {:?}",
        document.parts.len(),
        document.title
    );

    let output = render(cli, &document)?;
    io::stdout()
        .write_all(output.as_bytes())
        .map_err(|err| Failure::Io(format!("failed to write output: {}", err)))
}

fn read_input(input: Option<&Path>) -> Result<Vec<u8>, Failure> {
    match input {
        Some(path) => fs::read(path)
            .map_err(|err| Failure::Io(format!("failed to read {}: {}", path.display(), err))),
        None => {
            let mut buffer = Vec::new();
            io::stdin()
                .read_to_end(&mut buffer)
                .map_err(|err| Failure::Io(format!("failed to read stdin: {}", err)))?;
            Ok(buffer)
        }
    }
}

fn image_root(cli: &Cli) -> PathBuf {
    if let Some(dir) = &cli.image_dir {
        return dir.clone();
    }
    cli.input
        .as_deref()
        .and_then(Path::parent)
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn render(cli: &Cli, document: &Document) -> Result<String, Failure> {
    let mut images = DirectoryImages::new(image_root(cli), IMAGE_CACHE_SIZE);
    match cli.format {
        Format::Json => serde_json::to_string_pretty(document)
            .map(|json| json + "\n")
            .map_err(Failure::Serialize),
        Format::Rtf => emit_rtf(document, &mut images).map_err(Failure::Render),
        Format::Html => {
            let options = HtmlEmitOptions {
                inline_images: !cli.link_images,
            };
            let body = if cli.sanitized {
                emit_html_sanitized_with_options(document, &options, &mut images)
            } else {
                emit_html_with_options(document, &options, &mut images)
            }
            .map_err(Failure::Render)?;
            if cli.raw {
                return Ok(body);
            }
            Ok(wrap_page(&body, document.title.as_deref()))
        }
    }
}

fn emit_diagnostics(error: &CompileError, mode: DiagnosticsMode) {
    let diagnostics = vec![Diagnostic::from(error)];
    match mode {
        DiagnosticsMode::Json => match serde_json::to_string_pretty(&diagnostics) {
            Ok(json) => eprintln!("{}", json),
            Err(err) => {
                log::warn!("cannot serialize diagnostics: {}", err);
                eprintln!("{}", diagnostics[0].to_pretty());
            }
        },
        DiagnosticsMode::Pretty => {
            for diagnostic in &diagnostics {
                eprintln!("{}", diagnostic.to_pretty());
            }
        }
    }
}
