//! nfssgen CLI (made by FontLab https://www.fontlab.com/)

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use nfssgen_core::config::Config;
use nfssgen_core::error::NfssError;
use nfssgen_core::install::{
    fonts_dir, texmf_home, write_emission, ConversionCommand, DryRunSink, Installer, ProcessSink,
};
use nfssgen_core::oracle::{AttributeFile, Otfinfo};
use nfssgen_core::output::{plan_entries, write_json_pretty, write_ndjson, PlanEntry};
use nfssgen_core::pipeline::{LoadOptions, Pipeline};
use nfssgen_core::record::FontRecord;

/// Name written into the header of every generated file.
const GENERATOR: &str = concat!("nfssgen ", env!("CARGO_PKG_VERSION"));

/// CLI entrypoint for nfssgen.
#[derive(Debug, Parser)]
#[command(
    name = "nfssgen",
    about = "OpenType fonts to LaTeX NFSS families (made by FontLab https://www.fontlab.com/)"
)]
pub struct Cli {
    /// JSON configuration file (defaults apply to missing fields)
    #[arg(long = "config", global = true, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Log every extracted font and command
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the variants and conversion commands for some fonts
    Plan(PlanArgs),
    /// Write .fd/.sty files and convert every variant
    Install(InstallArgs),
    /// Print what was learned about each font
    Inspect(InspectArgs),
    /// Print the effective configuration as JSON
    Config,
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// Font files or directories (defaults to the current directory)
    #[arg(value_hint = ValueHint::AnyPath)]
    paths: Vec<PathBuf>,

    /// Read newline-delimited paths from STDIN
    #[arg(long = "stdin-paths", action = ArgAction::SetTrue)]
    stdin_paths: bool,

    /// Take font attributes from this JSON file instead of running otfinfo
    #[arg(long = "attributes", value_hint = ValueHint::FilePath)]
    attributes: Option<PathBuf>,

    /// Descend into subdirectories
    #[arg(short = 'r', long = "recursive", action = ArgAction::SetTrue)]
    recursive: bool,

    /// Follow symlinks while walking paths
    #[arg(long = "follow-symlinks", action = ArgAction::SetTrue)]
    follow_symlinks: bool,

    /// Number of extraction threads
    #[arg(short = 'j', long = "jobs", value_parser = clap::value_parser!(usize))]
    jobs: Option<usize>,
}

#[derive(Debug, Args)]
struct PlanArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Emit a single JSON array
    #[arg(long = "json", action = ArgAction::SetTrue, conflicts_with = "ndjson")]
    json: bool,

    /// Emit newline-delimited JSON
    #[arg(long = "ndjson", action = ArgAction::SetTrue)]
    ndjson: bool,

    /// Control colorized output (auto|always|never)
    #[arg(long = "color", default_value_t = ColorChoice::Auto, value_enum)]
    color: ColorChoice,
}

#[derive(Debug, Args)]
struct InstallArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Print the conversion commands instead of running them
    #[arg(short = 'n', long = "dry-run", action = ArgAction::SetTrue)]
    dry_run: bool,

    /// Directory for .fd/.sty files (defaults to the local fonts dir under $TEXMFHOME)
    #[arg(short = 'o', long = "output-dir", value_hint = ValueHint::DirPath)]
    output_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct InspectArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Emit newline-delimited JSON
    #[arg(long = "ndjson", action = ArgAction::SetTrue)]
    ndjson: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

/// Parse CLI args and execute the selected command.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Plan(args) => run_plan(config, args),
        Command::Install(args) => run_install(config, args),
        Command::Inspect(args) => run_inspect(config, args),
        Command::Config => run_config(&config),
    }
}

fn init_logger(verbose: bool) {
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut builder = env_logger::Builder::from_env(env);
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_path(path),
        None => Ok(Config::default()),
    }
}

fn run_plan(config: Config, args: PlanArgs) -> Result<()> {
    let stdin = io::stdin();
    let mut pipeline = load_pipeline(config, &args.source, stdin.lock())?;
    pipeline.explode()?;

    let entries = plan_entries(pipeline.exploded());
    let commands = pipeline.commands()?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let use_color = match args.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => handle.is_terminal(),
    };

    if args.ndjson {
        write_ndjson(&entries, &mut handle)?;
    } else if args.json {
        write_json_pretty(&entries, &mut handle)?;
    } else {
        write_plain(&entries, &commands, &mut handle, use_color)?;
    }

    Ok(())
}

fn run_install(config: Config, args: InstallArgs) -> Result<()> {
    let stdin = io::stdin();
    let mut pipeline = load_pipeline(config, &args.source, stdin.lock())?;
    pipeline.explode()?;

    let commands = pipeline.commands()?;
    if commands.is_empty() {
        return Err(NfssError::NothingToInstall.into());
    }

    let date = chrono::Local::now().format("%Y/%m/%d").to_string();
    let emission = pipeline.emit(GENERATOR, &date)?;
    let dir = match args.output_dir {
        Some(dir) => dir,
        None => fonts_dir(pipeline.config(), &texmf_home()?),
    };
    let written = write_emission(&emission, &dir)?;
    log::info!("wrote {} files to {}", written.len(), dir.display());

    if args.dry_run {
        let stdout = io::stdout();
        let mut installer = Installer::new(DryRunSink::new(stdout.lock())).refresh(false);
        installer.run(&commands)?;
    } else {
        let mut installer = Installer::new(ProcessSink);
        installer.run(&commands)?;
    }

    Ok(())
}

fn run_inspect(config: Config, args: InspectArgs) -> Result<()> {
    let stdin = io::stdin();
    let pipeline = load_pipeline(config, &args.source, stdin.lock())?;
    let records: Vec<&FontRecord> = pipeline.store().iter().collect();

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if args.ndjson {
        write_ndjson(&records, &mut handle)?;
    } else {
        write_json_pretty(&records, &mut handle)?;
    }
    Ok(())
}

fn run_config(config: &Config) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let json = serde_json::to_string_pretty(config)?;
    writeln!(handle, "{json}")?;
    Ok(())
}

/// Build a pipeline and fill it from the requested font source.
///
/// With an attribute file and no paths, every entry in the file is used.
fn load_pipeline(config: Config, source: &SourceArgs, stdin: impl BufRead) -> Result<Pipeline> {
    let mut pipeline = Pipeline::new(config)?;
    let paths = gather_paths(&source.paths, source.stdin_paths, stdin)?;
    let opts = LoadOptions {
        follow_symlinks: source.follow_symlinks,
        recursive: source.recursive,
        jobs: source.jobs,
    };

    match &source.attributes {
        Some(file) => {
            let oracle = AttributeFile::from_path(file)?;
            if paths.is_empty() {
                for attrs in oracle.entries() {
                    pipeline.add_attributes(attrs.clone());
                }
            } else {
                pipeline.load(&paths, &oracle, &opts)?;
            }
        }
        None => {
            let otfinfo = Otfinfo::default();
            otfinfo
                .check_version()
                .context("otfinfo (from LCDF Typetools) is required to read fonts")?;
            let paths = if paths.is_empty() {
                vec![PathBuf::from(".")]
            } else {
                paths
            };
            pipeline.load(&paths, &otfinfo, &opts)?;
        }
    }

    if pipeline.store().is_empty() {
        log::warn!("no usable OpenType fonts found");
    }
    Ok(pipeline)
}

fn gather_paths(
    raw_paths: &[PathBuf],
    read_stdin: bool,
    mut stdin: impl BufRead,
) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    if read_stdin {
        paths.extend(read_paths_from(&mut stdin)?);
    }

    for path in raw_paths {
        if path == Path::new("-") {
            paths.extend(read_paths_from(&mut stdin)?);
        } else {
            paths.push(path.clone());
        }
    }

    Ok(paths)
}

fn read_paths_from(reader: &mut impl BufRead) -> Result<Vec<PathBuf>> {
    let mut buf = String::new();
    let mut paths = Vec::new();

    loop {
        buf.clear();
        let read = reader.read_line(&mut buf)?;
        if read == 0 {
            break;
        }

        let trimmed = buf.trim();
        if !trimmed.is_empty() {
            paths.push(PathBuf::from(trimmed));
        }
    }

    Ok(paths)
}

fn write_plain(
    entries: &[PlanEntry],
    commands: &[ConversionCommand],
    mut w: impl Write,
    color: bool,
) -> Result<()> {
    let key_width = entries
        .iter()
        .map(|e| leaf_label(e).len())
        .max()
        .unwrap_or(0)
        .clamp(0, 80);

    for entry in entries {
        let padded = format!("{:<key_width$}", leaf_label(entry));
        let rendered_key = apply_color(&padded, color, AnsiColor::Cyan);
        let rendered_name = apply_color(&entry.font_name, color, AnsiColor::Yellow);
        writeln!(w, "{rendered_key}  {rendered_name}")?;
    }

    if !commands.is_empty() {
        writeln!(w)?;
    }
    for command in commands {
        writeln!(w, "{}", apply_color(&command.render(), color, AnsiColor::Green))?;
    }
    Ok(())
}

fn leaf_label(entry: &PlanEntry) -> String {
    if entry.optical.is_empty() {
        format!("{}/{}/{}", entry.family, entry.series, entry.shape)
    } else {
        format!(
            "{}/{}/{}/{}",
            entry.family, entry.series, entry.shape, entry.optical
        )
    }
}

#[derive(Copy, Clone)]
enum AnsiColor {
    Cyan,
    Yellow,
    Green,
}

fn apply_color(text: &str, color: bool, code: AnsiColor) -> String {
    if !color {
        return text.to_string();
    }

    let code_str = match code {
        AnsiColor::Cyan => "36",
        AnsiColor::Yellow => "33",
        AnsiColor::Green => "32",
    };

    format!("\u{1b}[{}m{}\u{1b}[0m", code_str, text)
}
