//! Morphological analyzer backends.
//!
//! Segmentation itself is delegated to an external analyzer process that
//! prints IPAdic-style records, one per line:
//!
//! ```text
//! テスト	名詞,サ変接続,*,*,*,*,テスト,テスト,テスト
//! です	助動詞,*,*,*,特殊・デス,基本形,です,デス,デス
//! EOS
//! ```
//!
//! Two interchangeable backends are provided (MeCab and Janome). One is picked
//! at startup by probing and kept for the rest of the run.

use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use std::thread;

use log::{debug, info, warn};

use crate::classifier::{AnalyzedToken, PosMajor};
use crate::config::MinerConfig;
use crate::error::{MinerError, MinerResult};

/// Text used to check that a backend actually segments Japanese.
pub const PROBE_TEXT: &str = "テスト文章です。";

// Field positions in the comma-separated feature column.
const FEATURE_MINOR1: usize = 1;
const FEATURE_MINOR2: usize = 2;
const FEATURE_BASE: usize = 6;

/// Capability interface every analyzer backend implements.
pub trait MorphAnalyzer {
    fn name(&self) -> &str;

    /// Cheap probe run once at startup.
    fn is_available(&self) -> bool;

    fn analyze(&self, text: &str) -> MinerResult<Vec<AnalyzedToken>>;
}

/// Parse IPAdic output into tokens. `EOS`, blank and malformed lines are skipped.
pub fn parse_ipadic_output(output: &str) -> Vec<AnalyzedToken> {
    let mut tokens = Vec::new();
    for line in output.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() || line == "EOS" {
            continue;
        }
        let Some((surface, features)) = line.split_once('\t') else {
            debug!("skipping analyzer line without features: {line:?}");
            continue;
        };
        if surface.is_empty() {
            continue;
        }
        let fields: Vec<&str> = features.split(',').collect();
        if fields.len() < 2 {
            debug!("skipping analyzer line with too few features: {line:?}");
            continue;
        }
        let field = |i: usize| fields.get(i).copied().unwrap_or("");
        let base_form = match fields.get(FEATURE_BASE) {
            Some(&base) if base != "*" && !base.is_empty() => base,
            _ => surface,
        };
        tokens.push(AnalyzedToken::new(
            surface,
            base_form,
            PosMajor::from_label(fields[0]),
            field(FEATURE_MINOR1),
            field(FEATURE_MINOR2),
        ));
    }
    tokens
}

/// Feed `text` to `program` on stdin and collect its stdout.
fn run_analyzer(program: &str, args: &[String], text: &str) -> MinerResult<String> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| MinerError::Analyzer(format!("cannot start {program}: {e}")))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| MinerError::Analyzer(format!("{program}: stdin unavailable")))?;
    let mut input = text.to_owned();
    if !input.ends_with('\n') {
        input.push('\n');
    }
    // Written from a second thread so a chatty child cannot fill stdout while
    // we are still blocked on stdin.
    let writer = thread::spawn(move || stdin.write_all(input.as_bytes()));

    let output = child.wait_with_output()?;
    match writer.join() {
        Ok(Ok(())) => {}
        Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {}
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            return Err(MinerError::Analyzer(format!(
                "{program}: stdin writer panicked"
            )));
        }
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MinerError::Analyzer(format!(
            "{program} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    String::from_utf8(output.stdout)
        .map_err(|e| MinerError::Analyzer(format!("{program} produced invalid UTF-8: {e}")))
}

/// Split a configured command line such as `mecab -r /etc/mecabrc` into the
/// program and its leading arguments.
fn split_command(command: &str) -> (String, Vec<String>) {
    let mut parts = command.split_whitespace().map(str::to_string);
    let program = parts.next().unwrap_or_default();
    (program, parts.collect())
}

fn probe(program: &str, args: &[String]) -> bool {
    match run_analyzer(program, args, PROBE_TEXT) {
        Ok(out) => !parse_ipadic_output(&out).is_empty(),
        Err(e) => {
            debug!("probe of {program} {args:?} failed: {e}");
            false
        }
    }
}

/// MeCab driven as a subprocess (`mecab [-d DICDIR]`).
#[derive(Debug)]
pub struct MecabAnalyzer {
    program: String,
    base_args: Vec<String>,
    dicdir: Option<PathBuf>,
    // Arguments that passed the probe.
    resolved_args: OnceLock<Vec<String>>,
}

impl MecabAnalyzer {
    pub fn new(command: &str, dicdir: Option<PathBuf>) -> Self {
        let (program, base_args) = split_command(command);
        Self {
            program,
            base_args,
            dicdir,
            resolved_args: OnceLock::new(),
        }
    }

    fn candidate_args(&self) -> Vec<Vec<String>> {
        let mut candidates = vec![self.base_args.clone()];
        if let Some(dir) = &self.dicdir {
            let mut args = self.base_args.clone();
            args.push("-d".to_string());
            args.push(dir.display().to_string());
            candidates.push(args);
        }
        candidates
    }
}

impl MorphAnalyzer for MecabAnalyzer {
    fn name(&self) -> &str {
        "mecab"
    }

    fn is_available(&self) -> bool {
        if self.resolved_args.get().is_some() {
            return true;
        }
        for args in self.candidate_args() {
            if probe(&self.program, &args) {
                let _ = self.resolved_args.set(args);
                return true;
            }
        }
        false
    }

    fn analyze(&self, text: &str) -> MinerResult<Vec<AnalyzedToken>> {
        let args = self
            .resolved_args
            .get()
            .cloned()
            .unwrap_or_else(|| self.base_args.clone());
        let out = run_analyzer(&self.program, &args, text)?;
        Ok(parse_ipadic_output(&out))
    }
}

/// Janome's command-line front end, reading stdin.
#[derive(Debug)]
pub struct JanomeAnalyzer {
    program: String,
    args: Vec<String>,
}

impl JanomeAnalyzer {
    pub fn new(command: &str) -> Self {
        let (program, args) = split_command(command);
        Self { program, args }
    }
}

impl MorphAnalyzer for JanomeAnalyzer {
    fn name(&self) -> &str {
        "janome"
    }

    fn is_available(&self) -> bool {
        probe(&self.program, &self.args)
    }

    fn analyze(&self, text: &str) -> MinerResult<Vec<AnalyzedToken>> {
        let out = run_analyzer(&self.program, &self.args, text)?;
        Ok(parse_ipadic_output(&out))
    }
}

/// Primary then secondary backend, as configured.
pub fn configured_backends(config: &MinerConfig) -> Vec<Box<dyn MorphAnalyzer>> {
    vec![
        Box::new(MecabAnalyzer::new(
            &config.mecab_command,
            config.mecab_dicdir.clone(),
        )),
        Box::new(JanomeAnalyzer::new(&config.janome_command)),
    ]
}

/// Probe the candidates in order and keep the first that answers.
pub fn select_analyzer(
    candidates: Vec<Box<dyn MorphAnalyzer>>,
) -> MinerResult<Box<dyn MorphAnalyzer>> {
    let mut tried = Vec::new();
    for candidate in candidates {
        if candidate.is_available() {
            info!("morphological analyzer: {}", candidate.name());
            return Ok(candidate);
        }
        warn!("analyzer {} unavailable, trying next", candidate.name());
        tried.push(candidate.name().to_string());
    }
    Err(MinerError::AnalyzerUnavailable { tried })
}
