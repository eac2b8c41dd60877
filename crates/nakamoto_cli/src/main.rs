//! `nakamoto` command-line entry point.
//!
//! # Responsibility
//! - Own file discovery and reading; hand contents to the pure core.
//! - Render one report per analysed domain plus a summary table.
//!
//! # Invariants
//! - Unreadable or malformed documents are counted and skipped.
//! - `--dry-run` computes everything but writes no report and no CSV.

use clap::Parser;
use log::{error, info, warn};
use nakamoto_core::{
    default_log_level, init_logging, nakamoto_coefficient, parse_batch, parse_meeting,
    parse_proposal, render_summary_text, shares_from_json, write_summary_csv, Analysis,
    AnalysisConfig, CoefficientError, CoefficientResult, ConfigError, Domain, DomainSummary,
    LoggingError, MappingError, OrganizationMapping, ParseResult, PipelineError, RawRecord,
    ReportFormatter, ReportInput, ShareParseError, ShareRow, SilentFormatter,
    TextReportFormatter,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Nakamoto coefficients for protocol governance activity.
///
/// Examples:
///   nakamoto --eips EIPS/EIPS --mapping org_mapping.json
///   nakamoto --meetings pm/AllCoreDevs-EL-Meetings --output summary.csv
///   nakamoto --client-data clients.json --staking-data pools.json --dry-run
#[derive(Parser, Debug)]
#[command(name = "nakamoto")]
#[command(version)]
#[command(about, long_about = None)]
struct Cli {
    /// Directory of `eip-<n>.md` proposal files
    #[arg(long, value_name = "DIR")]
    eips: Option<PathBuf>,

    /// Directory of meeting notes (`.md`)
    #[arg(long, value_name = "DIR")]
    meetings: Option<PathBuf>,

    /// Person/handle → organization mapping (JSON)
    #[arg(long, value_name = "FILE")]
    mapping: Option<PathBuf>,

    /// Analysis config (JSON); accepted-proposal defaults when absent
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Client share list (JSON)
    #[arg(long, value_name = "FILE")]
    client_data: Option<PathBuf>,

    /// Staking pool share list (JSON)
    #[arg(long, value_name = "FILE")]
    staking_data: Option<PathBuf>,

    /// Write the `Domain,Nakamoto_Coefficient` summary here
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Compute without printing reports or writing the summary
    #[arg(long)]
    dry_run: bool,

    /// Absolute directory for rolling log files
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Debug)]
enum CliError {
    Read { path: PathBuf, source: std::io::Error },
    Write { path: PathBuf, source: std::io::Error },
    Csv { path: PathBuf, source: csv::Error },
    Logging(LoggingError),
    Mapping(MappingError),
    Config(ConfigError),
    Shares { path: PathBuf, source: ShareParseError },
    Pipeline(PipelineError),
    Coefficient(CoefficientError),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => write!(f, "cannot read `{}`: {source}", path.display()),
            Self::Write { path, source } => {
                write!(f, "cannot write `{}`: {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "cannot write `{}`: {source}", path.display())
            }
            Self::Logging(err) => write!(f, "{err}"),
            Self::Mapping(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Shares { path, source } => write!(f, "`{}`: {source}", path.display()),
            Self::Pipeline(err) => write!(f, "{err}"),
            Self::Coefficient(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } | Self::Write { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Logging(err) => Some(err),
            Self::Mapping(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Shares { source, .. } => Some(source),
            Self::Pipeline(err) => Some(err),
            Self::Coefficient(err) => Some(err),
        }
    }
}

impl From<LoggingError> for CliError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<MappingError> for CliError {
    fn from(value: MappingError) -> Self {
        Self::Mapping(value)
    }
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<PipelineError> for CliError {
    fn from(value: PipelineError) -> Self {
        Self::Pipeline(value)
    }
}

impl From<CoefficientError> for CliError {
    fn from(value: CoefficientError) -> Self {
        Self::Coefficient(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=run_failed module=cli status=error reason={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or_else(|| default_log_level());
        init_logging(level, log_dir)?;
    }

    let mapping = match &cli.mapping {
        Some(path) => OrganizationMapping::from_json_str(&read_file(path)?)?,
        None => OrganizationMapping::default(),
    };
    let config = match &cli.config {
        Some(path) => AnalysisConfig::from_json_str(&read_file(path)?)?,
        None => AnalysisConfig::accepted_proposals(),
    };
    info!(
        "event=run_start module=cli mapping_entries={} threshold={} dry_run={}",
        mapping.len(),
        config.threshold,
        cli.dry_run
    );

    let formatter: Box<dyn ReportFormatter> = if cli.dry_run {
        Box::new(SilentFormatter)
    } else {
        Box::new(TextReportFormatter::new(config.report_top_n))
    };
    let mut summary = DomainSummary::new();

    if let Some(dir) = &cli.eips {
        let analysis = Analysis::new(&mapping, config.clone());
        let domain = Domain::ProposalAuthorship;
        let source = DocumentSource {
            dir,
            prefix: Some("eip-"),
            parse: parse_proposal,
        };
        let result = analyse_documents(&source, &analysis, formatter.as_ref(), domain)?;
        summary.record(domain, result);
    }

    if let Some(dir) = &cli.meetings {
        let analysis = Analysis::new(&mapping, config.without_status_filters());
        let domain = Domain::MeetingAttendance;
        let source = DocumentSource {
            dir,
            prefix: None,
            parse: parse_meeting,
        };
        let result = analyse_documents(&source, &analysis, formatter.as_ref(), domain)?;
        summary.record(domain, result);
    }

    for (domain, path) in [
        (Domain::ClientDiversity, &cli.client_data),
        (Domain::StakingDistribution, &cli.staking_data),
    ] {
        let Some(path) = path else { continue };
        let rows = shares_from_json(&read_file(path)?).map_err(|source| CliError::Shares {
            path: path.clone(),
            source,
        })?;
        let result = nakamoto_coefficient(&rows, config.threshold)?;
        emit(formatter.as_ref(), domain, &rows, &result);
        summary.record(domain, result);
    }

    if summary.is_empty() {
        warn!("event=nothing_analysed module=cli");
        eprintln!("nothing to analyse; pass --eips, --meetings, --client-data or --staking-data");
        return Ok(());
    }
    if cli.dry_run {
        for (domain, result) in summary.iter() {
            info!(
                "event=dry_run_result module=cli domain={} coefficient={}",
                domain.as_str(),
                result.coefficient
            );
        }
        return Ok(());
    }

    print!("{}", render_summary_text(&summary));
    if let Some(path) = &cli.output {
        let file = std::fs::File::create(path).map_err(|source| CliError::Write {
            path: path.clone(),
            source,
        })?;
        write_summary_csv(&summary, file).map_err(|source| CliError::Csv {
            path: path.clone(),
            source,
        })?;
        info!("event=summary_written module=cli path={}", path.display());
    }
    Ok(())
}

/// Where one document domain is read from and how it is parsed.
struct DocumentSource<'a> {
    dir: &'a Path,
    /// Case-insensitive file name prefix; `None` takes every `.md` file.
    prefix: Option<&'a str>,
    parse: fn(&str, &str) -> ParseResult<RawRecord>,
}

fn analyse_documents(
    source: &DocumentSource<'_>,
    analysis: &Analysis<'_>,
    formatter: &dyn ReportFormatter,
    domain: Domain,
) -> Result<CoefficientResult, CliError> {
    let dir = source.dir;
    let documents = collect_markdown(dir, source.prefix)?;
    let batch = parse_batch(
        documents
            .files
            .iter()
            .map(|(name, content)| (name.as_str(), content.as_str())),
        source.parse,
    );
    let outcome = analysis.run(&batch.records)?;
    eprintln!(
        "{}: {} documents, {} processed, {} filtered, {} skipped",
        dir.display(),
        documents.files.len() + documents.unreadable,
        outcome.processed_records,
        outcome.filtered_records,
        documents.unreadable + batch.skipped + outcome.skipped_records
    );
    emit(formatter, domain, &outcome.reported_rows, &outcome.coefficient);
    Ok(outcome.coefficient)
}

fn emit(
    formatter: &dyn ReportFormatter,
    domain: Domain,
    rows: &[ShareRow],
    result: &CoefficientResult,
) {
    let input = ReportInput {
        title: domain.title(),
        entity_column: domain.entity_column(),
        rows,
        coefficient: result,
    };
    if let Some(text) = formatter.format(&input) {
        println!("{text}");
    }
}

#[derive(Debug, Default)]
struct MarkdownFiles {
    /// `(file_name, content)` sorted by file name.
    files: Vec<(String, String)>,
    unreadable: usize,
}

/// Reads `.md` files directly inside `dir` whose name starts with `prefix`
/// (case-insensitive).
fn collect_markdown(dir: &Path, prefix: Option<&str>) -> Result<MarkdownFiles, CliError> {
    let read_err = |source: std::io::Error| CliError::Read {
        path: dir.to_path_buf(),
        source,
    };
    let prefix = prefix.map(str::to_ascii_lowercase);

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let lower = name.to_ascii_lowercase();
        let wanted = path.is_file()
            && lower.ends_with(".md")
            && prefix.as_deref().map_or(true, |p| lower.starts_with(p));
        if wanted {
            paths.push((name.to_string(), path));
        }
    }
    paths.sort();

    let mut collected = MarkdownFiles::default();
    for (name, path) in paths {
        match std::fs::read_to_string(&path) {
            Ok(content) => collected.files.push((name, content)),
            Err(err) => {
                collected.unreadable += 1;
                warn!("event=document_unreadable module=cli file={name} reason={err}");
            }
        }
    }
    Ok(collected)
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}
