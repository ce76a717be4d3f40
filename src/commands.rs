//! Command handlers for spag.
//!
//! Each handler takes a [`Workspace`] (the stores rooted at the spag
//! directory) plus the command's arguments and returns the text to print.
//! Nothing in here writes to stdout, so every command is testable against a
//! temporary directory.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::config::{ConfigError, SpagConfig};
use crate::document::{Document, PathError};
use crate::environment::{EnvError, EnvironmentProvider, EnvironmentStore};
use crate::files::{self, FileError, PathIndex};
use crate::history::{
    format_history_entry, format_history_list, History, HistoryError, RecordedExchange,
    RememberStore,
};
use crate::models::{PreparedRequest, RequestError, RequestFile};
use crate::variables::{
    describe_params, parse_withs, untemplate, ParamDescription, VarError, VariableSources,
};

/// Error types for command execution.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Files(#[from] FileError),

    #[error(transparent)]
    Environment(#[from] EnvError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Template(#[from] VarError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A command-line argument had the wrong shape
    #[error("{0}")]
    InvalidArgument(String),

    #[error("You must provide something to set!")]
    NothingToSet,
}

/// The stores under one spag directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub config: SpagConfig,
    pub environments: EnvironmentStore,
    pub remembers: RememberStore,
    pub history: History,
}

impl Workspace {
    pub fn new(config: SpagConfig) -> Self {
        Self {
            environments: EnvironmentStore::new(
                config.environments_dir(),
                config.extension.clone(),
            ),
            remembers: RememberStore::new(config.remembers_dir(), config.extension.clone()),
            history: History::new(config.history_file(), config.history_limit),
            config,
        }
    }

    /// The template sources backed by this workspace's stores.
    pub fn sources(&self) -> VariableSources<'_> {
        VariableSources::new(&self.environments, &self.remembers)
            .with_body_mode(self.config.body_mode)
    }

    /// Directories searched for request files.
    ///
    /// An explicit `--dir` wins, then the configured `requestDirs`, then the
    /// active environment's `dir`, then the working directory.
    pub fn request_dirs(&self, dir: Option<&Path>) -> Result<Vec<PathBuf>, CommandError> {
        if let Some(dir) = dir {
            return Ok(vec![dir.to_path_buf()]);
        }
        if !self.config.request_dirs.is_empty() {
            return Ok(self.config.request_dirs.clone());
        }

        let env = self.environments.load_environment(None)?;
        match env.get("dir").and_then(Document::as_str) {
            Some(dir) => Ok(vec![PathBuf::from(dir)]),
            None => Ok(vec![PathBuf::from(".")]),
        }
    }

    /// A fresh index over the request directories.
    pub fn request_index(&self, dir: Option<&Path>) -> Result<PathIndex, CommandError> {
        let dirs = self.request_dirs(dir)?;
        debug!(?dirs, "indexing request files");
        Ok(PathIndex::with_dirs(self.config.extension.clone(), dirs)?)
    }
}

/// Options shared by the request commands.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// `key=value` bindings
    pub withs: Vec<String>,
    /// Overrides the environment's endpoint
    pub endpoint: Option<String>,
    /// `Key:Value` headers
    pub headers: Vec<String>,
    /// Overrides the file's body
    pub data: Option<String>,
}

/// Splits `Key:Value` on the first colon, trimming the value.
pub fn parse_header(raw: &str) -> Result<(String, String), CommandError> {
    match raw.split_once(':') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(CommandError::InvalidArgument(format!(
            "Invalid header '{}'. Expected Key:Value",
            raw
        ))),
    }
}

/// Splits `key=value` on the first `=`.
pub fn parse_assignment(raw: &str) -> Result<(String, String), CommandError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(CommandError::InvalidArgument(format!(
            "Invalid assignment '{}'. Expected key=value",
            raw
        ))),
    }
}

/// Every request file, relative to the working directory.
pub fn list_requests(ws: &Workspace, dir: Option<&Path>) -> Result<Vec<String>, CommandError> {
    Ok(ws.request_index(dir)?.get_file_list())
}

/// The raw contents of a request file, headed by its path.
pub fn show_request(
    ws: &Workspace,
    name: &str,
    dir: Option<&Path>,
) -> Result<String, CommandError> {
    let path = ws.request_index(dir)?.get_path(name)?;
    let contents = files::read_file(&path)?;
    let cwd = std::env::current_dir().unwrap_or_default();
    let shown = path.strip_prefix(&cwd).unwrap_or(&path);
    Ok(format!("File {}\n{}", shown.display(), contents))
}

/// Describes the placeholders of a request file.
pub fn request_params(
    ws: &Workspace,
    name: &str,
    dir: Option<&Path>,
) -> Result<Vec<ParamDescription>, CommandError> {
    let path = ws.request_index(dir)?.get_path(name)?;
    let contents = files::read_file(&path)?;
    Ok(describe_params(&contents, false)?)
}

/// Resolves a request file into a ready-to-send request.
///
/// The raw file is untemplated with the `--with` bindings (shortcuts are left
/// alone so `@` can appear in bodies), then parsed. Headers are layered as
/// environment `headers`, then the file's `headers`, then `-H` options.
/// `-H` values and `--data` are untemplated with shortcuts.
pub fn prepare_request(
    ws: &Workspace,
    name: &str,
    dir: Option<&Path>,
    options: &RequestOptions,
) -> Result<PreparedRequest, CommandError> {
    let sources = ws.sources();
    let withs = parse_withs(&options.withs)?;
    let no_withs = HashMap::new();

    let path = ws.request_index(dir)?.get_path(name)?;
    debug!(path = %path.display(), "preparing request");
    let raw = files::read_file(&path)?;
    let request = RequestFile::parse(&untemplate(&raw, &withs, false, &sources)?)?;

    let env = ws.environments.load_environment(None)?;
    let endpoint = match &options.endpoint {
        Some(endpoint) => untemplate(endpoint, &no_withs, ws.config.shortcuts, &sources)?,
        None => env
            .get("endpoint")
            .map(Document::interpolate)
            .transpose()
            .map_err(|e: PathError| RequestError::InvalidFormat(format!("endpoint: {}", e)))?
            .ok_or(RequestError::MissingEndpoint)?,
    };

    let mut headers = BTreeMap::new();
    if let Some(env_headers) = env.get("headers").and_then(Document::as_mapping) {
        for (key, value) in env_headers {
            if let Ok(value) = value.interpolate() {
                headers.insert(key.clone(), value);
            }
        }
    }
    headers.extend(request.headers);
    for raw in &options.headers {
        let (key, value) = parse_header(raw)?;
        headers.insert(key, untemplate(&value, &no_withs, ws.config.shortcuts, &sources)?);
    }

    let body = match &options.data {
        Some(data) => Some(untemplate(data, &no_withs, ws.config.shortcuts, &sources)?),
        None => request.body,
    };

    Ok(PreparedRequest {
        method: request.method,
        url: format!("{}{}", endpoint, request.uri),
        headers,
        body,
    })
}

/// Untemplates ad-hoc text.
pub fn render(
    ws: &Workspace,
    text: &str,
    withs: &[String],
    shortcuts: bool,
) -> Result<String, CommandError> {
    let withs = parse_withs(withs)?;
    Ok(untemplate(text, &withs, shortcuts, &ws.sources())?)
}

fn to_yaml(doc: &Document) -> Result<String, CommandError> {
    Ok(doc.to_yaml_string()?)
}

pub fn env_activate(ws: &Workspace, name: &str) -> Result<String, CommandError> {
    ws.environments.activate(name)?;
    Ok(format!("Environment {} activated", name))
}

pub fn env_deactivate(ws: &Workspace) -> Result<String, CommandError> {
    ws.environments.deactivate()?;
    Ok("Deactivated".to_string())
}

/// The named (or active) environment as YAML.
pub fn env_show(ws: &Workspace, name: Option<&str>) -> Result<String, CommandError> {
    to_yaml(&ws.environments.load_environment(name)?)
}

/// Sets `key=value` pairs and `Key:Value` headers in the active environment.
///
/// Values are untemplated with shortcuts, so `spag env set id=@id` stores the
/// id of the last response.
pub fn env_set(
    ws: &Workspace,
    assignments: &[String],
    headers: &[String],
) -> Result<String, CommandError> {
    if assignments.is_empty() && headers.is_empty() {
        return Err(CommandError::NothingToSet);
    }

    let sources = ws.sources();
    let no_withs = HashMap::new();
    let mut pairs = Vec::with_capacity(assignments.len() + headers.len());
    for raw in assignments {
        let (key, value) = parse_assignment(raw)?;
        pairs.push((key, untemplate(&value, &no_withs, ws.config.shortcuts, &sources)?));
    }
    for raw in headers {
        let (key, value) = parse_header(raw)?;
        pairs.push((
            format!("headers.{}", key),
            untemplate(&value, &no_withs, ws.config.shortcuts, &sources)?,
        ));
    }

    let pairs: Vec<(String, Document)> = pairs
        .into_iter()
        .map(|(key, value)| (key, Document::string(value)))
        .collect();
    to_yaml(&ws.environments.set(&pairs)?)
}

/// Removes one key, or everything, from the active environment.
pub fn env_unset(
    ws: &Workspace,
    key: Option<&str>,
    everything: bool,
) -> Result<String, CommandError> {
    let env = match (key, everything) {
        (_, true) => ws.environments.unset_all()?,
        (Some(key), false) => ws.environments.unset(key)?,
        (None, false) => {
            return Err(CommandError::InvalidArgument(
                "Give a key to unset, or --everything".to_string(),
            ))
        }
    };
    to_yaml(&env)
}

/// Environment names, the active one marked with `*`.
pub fn env_list(ws: &Workspace) -> Result<Vec<String>, CommandError> {
    let active = ws.environments.active_name()?;
    Ok(ws
        .environments
        .list()?
        .into_iter()
        .map(|name| {
            if name == active {
                format!("* {}", name)
            } else {
                format!("  {}", name)
            }
        })
        .collect())
}

pub fn history_list(ws: &Workspace) -> Result<Vec<String>, CommandError> {
    Ok(format_history_list(&ws.history.load()?))
}

pub fn history_show(ws: &Workspace, index: &str) -> Result<String, CommandError> {
    Ok(format_history_entry(&ws.history.get(index)?))
}

/// Empties the history. Remembered exchanges are kept.
pub fn history_clear(ws: &Workspace) -> Result<String, CommandError> {
    ws.history.clear()?;
    Ok("History cleared".to_string())
}

/// Imports a captured exchange: remembers it (as `last` and optionally
/// `name`) and appends it to the history.
pub fn record(
    ws: &Workspace,
    exchange_text: &str,
    name: Option<&str>,
) -> Result<String, CommandError> {
    let exchange = RecordedExchange::from_yaml_str(exchange_text)?;
    let path = ws
        .remembers
        .remember(name.unwrap_or(crate::history::LAST_EXCHANGE), &exchange)?;
    ws.history.append(&exchange)?;
    Ok(format!("Recorded {} as {}", exchange.summary(), path.display()))
}
