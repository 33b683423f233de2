//! Conversion commands and their execution (made by FontLab https://www.fontlab.com/)

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{anyhow, Context};

use crate::config::Config;
use crate::emit::Emission;
use crate::error::{NfssError, Result};
use crate::explode::{ExplodedFont, ExplodedIndex};
use crate::tokens::nice_font_name;

pub const OTFTOTFM: &str = "otftotfm";

/// One external program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ConversionCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// `otftotfm` call producing the metrics and map entry for one variant.
    pub fn otftotfm(config: &Config, font: &ExplodedFont) -> Result<Self> {
        let encoding = config.encoding_spec()?;
        let mut args: Vec<String> = vec!["--no-updmap".to_string(), "-a".to_string()];
        args.extend(encoding.commandline.split_whitespace().map(str::to_string));
        args.push("--typeface".to_string());
        args.push(nice_font_name(&font.family));
        args.push("--vendor".to_string());
        args.push(font.vendor.clone());
        args.push(font.filename.to_string_lossy().into_owned());
        args.extend(font.options.iter().map(|o| format!("-f{o}")));
        args.push(font.font_name.clone());
        Ok(Self::new(OTFTOTFM, args))
    }

    /// Shell-ready rendering, quoting arguments where needed.
    pub fn render(&self) -> String {
        let mut line = shell_quote(&self.program).into_owned();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&shell_quote(arg));
        }
        line
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for ConversionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn shell_quote(arg: &str) -> Cow<'_, str> {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=+,@%".contains(c));
    if safe {
        Cow::Borrowed(arg)
    } else {
        Cow::Owned(format!("'{}'", arg.replace('\'', r"'\''")))
    }
}

/// One conversion command per exploded leaf, in index order.
pub fn plan_commands(config: &Config, index: &ExplodedIndex) -> Result<Vec<ConversionCommand>> {
    index
        .iter()
        .map(|(_, font)| ConversionCommand::otftotfm(config, font))
        .collect()
}

/// Map and filename-database refresh run after a real install.
pub fn refresh_commands() -> Vec<ConversionCommand> {
    vec![
        ConversionCommand::new("updmap", ["-user"]),
        ConversionCommand::new("texhash", Vec::<String>::new()),
        ConversionCommand::new("updmap", ["-user"]),
    ]
}

/// Where commands go: a real process, or a listing.
pub trait CommandSink {
    fn run(&mut self, command: &ConversionCommand) -> anyhow::Result<()>;
}

/// Runs every command as a child process; a non-zero exit is an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessSink;

impl CommandSink for ProcessSink {
    fn run(&mut self, command: &ConversionCommand) -> anyhow::Result<()> {
        let status = command
            .to_command()
            .status()
            .with_context(|| format!("failed to run {}", command.program))?;
        if !status.success() {
            return Err(NfssError::ToolFailed {
                tool: command.render(),
                detail: format!("exited with {status}"),
            }
            .into());
        }
        Ok(())
    }
}

/// Writes each command line instead of running it.
#[derive(Debug)]
pub struct DryRunSink<W: Write> {
    out: W,
}

impl<W: Write> DryRunSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> CommandSink for DryRunSink<W> {
    fn run(&mut self, command: &ConversionCommand) -> anyhow::Result<()> {
        writeln!(self.out, "{}", command.render())?;
        Ok(())
    }
}

/// Runs a conversion plan sequentially, then refreshes the TeX databases.
#[derive(Debug)]
pub struct Installer<S: CommandSink> {
    sink: S,
    refresh: bool,
}

impl<S: CommandSink> Installer<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            refresh: true,
        }
    }

    /// Whether to run `updmap`/`texhash` after the conversions.
    pub fn refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    /// Run every command, stopping at the first failure. Returns the number
    /// of conversion commands run.
    pub fn run(&mut self, commands: &[ConversionCommand]) -> anyhow::Result<usize> {
        if commands.is_empty() {
            return Err(NfssError::NothingToInstall.into());
        }

        for command in commands {
            log::debug!("running {command}");
            self.sink.run(command)?;
        }

        if self.refresh {
            for command in refresh_commands() {
                log::debug!("running {command}");
                self.sink.run(&command)?;
            }
        }

        log::info!("ran {} conversion commands", commands.len());
        Ok(commands.len())
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// `$TEXMFHOME` as expanded by `kpsewhich`.
pub fn texmf_home() -> anyhow::Result<PathBuf> {
    let output = Command::new("kpsewhich")
        .arg("-expand-path=$TEXMFHOME")
        .output()
        .context("failed to run kpsewhich")?;
    if !output.status.success() {
        return Err(NfssError::ToolFailed {
            tool: "kpsewhich -expand-path=$TEXMFHOME".to_string(),
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into());
    }

    let home = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if home.is_empty() {
        return Err(anyhow!("kpsewhich reported an empty TEXMFHOME"));
    }
    Ok(PathBuf::from(home))
}

/// Directory receiving `.fd` and `.sty` files below `texmf_home`.
pub fn fonts_dir(config: &Config, texmf_home: &Path) -> PathBuf {
    texmf_home.join(config.local_fonts_dir.trim_start_matches('/'))
}

/// Write every generated file into `dir`, creating it if needed.
pub fn write_emission(emission: &Emission, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut written = Vec::new();
    for file in emission.files() {
        let path = dir.join(&file.name);
        fs::write(&path, &file.contents).with_context(|| format!("writing {}", path.display()))?;
        log::debug!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
