#![doc = include_str!("../README.md")]

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use configfile::{Config, FormatOptions, LengthWidth, ParseError};
use tracing::debug;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Exit codes
// ============================================================================

const EXIT_SUCCESS: i32 = 0;
const EXIT_SYNTAX_ERROR: i32 = 1;
const EXIT_LOOKUP_ERROR: i32 = 2;
const EXIT_IO_ERROR: i32 = 3;

// ============================================================================
// CLI argument structures
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "configfile", version)]
#[command(about = "Check, format, query and convert configuration files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a file and report syntax errors
    Check {
        file: PathBuf,

        /// Binary lengths are little-endian u64 (for `.bin` files)
        #[arg(long)]
        fixed_width: bool,
    },

    /// Rewrite a text file in canonical layout
    Fmt {
        file: PathBuf,

        /// Write to this file instead of stdout
        #[arg(short = 'o', long, conflicts_with = "in_place")]
        output: Option<PathBuf>,

        /// Modify the input file in place
        #[arg(long)]
        in_place: bool,

        /// Use LF line endings instead of CRLF
        #[arg(long)]
        unix: bool,
    },

    /// Print one value, addressed by a dotted path such as `player.speed`
    Get {
        file: PathBuf,

        path: String,

        /// How to interpret the stored value
        #[arg(long = "as", value_enum, default_value_t = ValueKind::Str)]
        kind: ValueKind,

        /// Read the file as binary
        #[arg(long)]
        binary: bool,

        /// Binary lengths are little-endian u64
        #[arg(long, requires = "binary")]
        fixed_width: bool,
    },

    /// Convert between text and binary
    Convert {
        input: PathBuf,

        output: PathBuf,

        /// Input format (default: from the extension, `.bin` is binary)
        #[arg(long, value_enum)]
        from: Option<Format>,

        /// Output format (default: from the extension, `.bin` is binary)
        #[arg(long, value_enum)]
        to: Option<Format>,

        /// Binary lengths are little-endian u64
        #[arg(long)]
        fixed_width: bool,
    },

    /// Print the nested structure of a file
    Tree {
        file: PathBuf,

        /// Read the file as binary
        #[arg(long)]
        binary: bool,

        /// Binary lengths are little-endian u64
        #[arg(long, requires = "binary")]
        fixed_width: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ValueKind {
    /// The stored, escaped text
    Raw,
    /// Text with escapes decoded
    Str,
    Int,
    Real,
    Char,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Binary,
}

impl Format {
    fn infer(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("bin") => Format::Binary,
            _ => Format::Text,
        }
    }
}

fn length_width(fixed: bool) -> LengthWidth {
    if fixed {
        LengthWidth::Fixed64
    } else {
        LengthWidth::Native
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
enum CliError {
    Io(io::Error),
    ParseDiagnostic {
        error: ParseError,
        source: String,
        filename: String,
    },
    Config(configfile::Error),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Io(_) => EXIT_IO_ERROR,
            CliError::ParseDiagnostic { .. } => EXIT_SYNTAX_ERROR,
            CliError::Config(e) => match e {
                configfile::Error::FileNotFound { .. }
                | configfile::Error::Io(_)
                | configfile::Error::CorruptBinary { .. }
                | configfile::Error::TooDeep { .. } => EXIT_IO_ERROR,
                configfile::Error::Parse(_) => EXIT_SYNTAX_ERROR,
                _ => EXIT_LOOKUP_ERROR,
            },
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "{e}"),
            CliError::ParseDiagnostic {
                error, filename, ..
            } => write!(f, "{filename}: {error}"),
            CliError::Config(e) => write!(f, "{e}"),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<configfile::Error> for CliError {
    fn from(e: configfile::Error) -> Self {
        CliError::Config(e)
    }
}

// ============================================================================
// Entry point
// ============================================================================

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_logging();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = if e.use_stderr() {
                EXIT_SYNTAX_ERROR
            } else {
                EXIT_SUCCESS
            };
            std::process::exit(code);
        }
    };

    match run(cli.command) {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(e) => {
            match &e {
                CliError::ParseDiagnostic {
                    error,
                    source,
                    filename,
                } => error.write_report(filename, source, io::stderr()),
                _ => eprintln!("error: {e}"),
            }
            std::process::exit(e.exit_code());
        }
    }
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Check { file, fixed_width } => run_check(&file, length_width(fixed_width)),
        Command::Fmt {
            file,
            output,
            in_place,
            unix,
        } => run_fmt(&file, output.as_deref(), in_place, unix),
        Command::Get {
            file,
            path,
            kind,
            binary,
            fixed_width,
        } => {
            let config = load(&file, binary_or_text(binary), length_width(fixed_width))?;
            println!("{}", lookup(&config, &path, kind)?);
            Ok(())
        }
        Command::Convert {
            input,
            output,
            from,
            to,
            fixed_width,
        } => run_convert(&input, &output, from, to, length_width(fixed_width)),
        Command::Tree {
            file,
            binary,
            fixed_width,
        } => {
            let config = load(&file, binary_or_text(binary), length_width(fixed_width))?;
            let mut out = io::stdout().lock();
            out.write_all(render_tree(&config).as_bytes())?;
            Ok(())
        }
    }
}

fn binary_or_text(binary: bool) -> Format {
    if binary { Format::Binary } else { Format::Text }
}

// ============================================================================
// Loading
// ============================================================================

/// Read and parse a text file, keeping the source for diagnostics.
fn load_text(path: &Path) -> Result<Config, CliError> {
    let source = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            CliError::Config(configfile::Error::FileNotFound {
                path: path.to_path_buf(),
            })
        } else {
            CliError::Io(e)
        }
    })?;
    let parsed = configfile::parse(&source);
    parsed.map_err(|error| CliError::ParseDiagnostic {
        error,
        source,
        filename: path.display().to_string(),
    })
}

fn load(path: &Path, format: Format, width: LengthWidth) -> Result<Config, CliError> {
    debug!(path = %path.display(), ?format, "loading");
    match format {
        Format::Text => load_text(path),
        Format::Binary => {
            let mut config = Config::new();
            config.read_bin_with(path, width)?;
            Ok(config)
        }
    }
}

// ============================================================================
// Subcommand implementations
// ============================================================================

fn run_check(file: &Path, width: LengthWidth) -> Result<(), CliError> {
    let config = load(file, Format::infer(file), width)?;
    println!(
        "{}: ok ({} variables, {} blocks)",
        file.display(),
        config.variable_count(),
        config.config_count()
    );
    Ok(())
}

fn run_fmt(
    file: &Path,
    output: Option<&Path>,
    in_place: bool,
    unix: bool,
) -> Result<(), CliError> {
    let config = load_text(file)?;
    let options = if unix {
        FormatOptions::new().unix()
    } else {
        FormatOptions::new()
    };

    if in_place {
        config.write_txt_with_options(file, options)?;
    } else if let Some(out_path) = output {
        config.write_txt_with_options(out_path, options)?;
    } else {
        let text = configfile::to_text_with_options(&config, options);
        io::stdout().lock().write_all(text.as_bytes())?;
    }
    Ok(())
}

fn run_convert(
    input: &Path,
    output: &Path,
    from: Option<Format>,
    to: Option<Format>,
    width: LengthWidth,
) -> Result<(), CliError> {
    let from = from.unwrap_or_else(|| Format::infer(input));
    let to = to.unwrap_or_else(|| Format::infer(output));
    debug!(?from, ?to, ?width, "converting");

    let config = load(input, from, width)?;
    match to {
        Format::Text => config.write_txt(output)?,
        Format::Binary => config.write_bin_with(output, width)?,
    }
    Ok(())
}

/// Look up `path` and format the value as `kind`.
fn lookup(config: &Config, path: &str, kind: ValueKind) -> Result<String, configfile::Error> {
    let (parent, name) = path.rsplit_once('.').unwrap_or(("", path));
    let scope = config.config_at(parent)?;
    Ok(match kind {
        ValueKind::Raw => scope.get(name)?.to_string(),
        ValueKind::Str => scope.get_str(name)?,
        ValueKind::Int => scope.get_int(name)?.to_string(),
        ValueKind::Real => scope.get_real(name)?.to_string(),
        ValueKind::Char => scope.get_char(name)?.to_string(),
    })
}

fn render_tree(config: &Config) -> String {
    let mut out = String::from(".\n");
    render_children(config, "", &mut out);
    out
}

fn render_children(config: &Config, prefix: &str, out: &mut String) {
    let total = config.len();
    let mut idx = 0;

    for (name, section) in config.sections() {
        idx += 1;
        let last = idx == total;
        out.push_str(prefix);
        out.push_str(if last { "└── " } else { "├── " });
        out.push_str(name);
        out.push('\n');
        let child_prefix = format!("{prefix}{}", if last { "    " } else { "│   " });
        render_children(section, &child_prefix, out);
    }

    for (name, raw) in config.variables() {
        idx += 1;
        out.push_str(prefix);
        out.push_str(if idx == total { "└── " } else { "├── " });
        out.push_str(name);
        out.push_str(" = ");
        out.push_str(raw);
        out.push('\n');
    }
}
