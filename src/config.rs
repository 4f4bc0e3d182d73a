use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{Result, VidmillError};

/// A variable value: either a string or an integer.
///
/// The distinction only matters for rendering (integers are written as plain
/// decimal); merging and lookup always go through the rendered string form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarValue {
    Str(String),
    Int(i64),
}

impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarValue::Str(s) => f.write_str(s),
            VarValue::Int(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for VarValue {
    fn from(s: &str) -> Self {
        VarValue::Str(s.to_string())
    }
}

impl From<String> for VarValue {
    fn from(s: String) -> Self {
        VarValue::Str(s)
    }
}

impl From<i64> for VarValue {
    fn from(n: i64) -> Self {
        VarValue::Int(n)
    }
}

impl From<i32> for VarValue {
    fn from(n: i32) -> Self {
        VarValue::Int(n.into())
    }
}

impl From<u32> for VarValue {
    fn from(n: u32) -> Self {
        VarValue::Int(n.into())
    }
}

/// Builder for a Vidmill configuration document.
///
/// A config document has three sections -- variables, settings, and output
/// targets -- rendered as `var`, `set`, and `->` lines respectively. The
/// service substitutes `$name` variable references on its side; the builder
/// passes them through verbatim.
///
/// # Example
///
/// ```
/// use vidmill::ConfigBuilder;
///
/// # fn example() -> vidmill::Result<String> {
/// let config = ConfigBuilder::new()
///     .var("vid", 1234)
///     .var("s3", "s3://accesskey:secret@bucket")
///     .source("https://example.com/video.mp4")
///     .webhook("https://example.com/hook?vid=$vid")
///     .output("mp4", "$s3/$vid.mp4")
///     .build()?;
/// # Ok(config)
/// # }
/// ```
///
/// Entries from [`base_file`](Self::base_file) are merged in first; entries
/// supplied on the builder win on key collision, section by section.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    base: Option<PathBuf>,
    vars: BTreeMap<String, VarValue>,
    settings: BTreeMap<String, String>,
    outputs: BTreeMap<String, String>,
}

impl ConfigBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge entries from an on-disk config document written in the same
    /// `var` / `set` / `->` format. Builder entries override it per key.
    pub fn base_file(mut self, path: impl AsRef<Path>) -> Self {
        self.base = Some(path.as_ref().to_path_buf());
        self
    }

    /// Declare a variable, referenced from setting and output values as
    /// `$name`.
    pub fn var(mut self, name: impl Into<String>, value: impl Into<VarValue>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Set a top-level directive (`set name = value`).
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(name.into(), value.into());
        self
    }

    /// Set the `source` directive: the URL of the video to encode.
    /// Required for [`build`](Self::build) to succeed.
    pub fn source(self, url: impl Into<String>) -> Self {
        self.set("source", url)
    }

    /// Set the `webhook` directive: where the service posts job progress.
    pub fn webhook(self, url: impl Into<String>) -> Self {
        self.set("webhook", url)
    }

    /// Pin the service API version (`set api_version = ...`).
    pub fn api_version(self, version: impl Into<String>) -> Self {
        self.set("api_version", version)
    }

    /// Declare an output target: an encoding format name and its destination
    /// URI template (`-> mp4 = $s3/video.mp4`).
    pub fn output(mut self, format: impl Into<String>, destination: impl Into<String>) -> Self {
        self.outputs.insert(format.into(), destination.into());
        self
    }

    /// Merge the base file (if any) with the builder's entries and render the
    /// canonical document text.
    ///
    /// # Errors
    ///
    /// - [`VidmillError::BaseFileNotFound`] if the base path does not exist.
    /// - [`VidmillError::Io`] for any other failure reading the base file.
    /// - [`VidmillError::InvalidConfig`] if a supplied key is empty or no
    ///   `source` setting is present after the merge.
    pub fn build(self) -> Result<String> {
        let mut doc = match &self.base {
            Some(path) => Document::from_file(path)?,
            None => Document::default(),
        };

        for (name, value) in &self.vars {
            ensure_key(name, "variable")?;
            doc.vars.insert(name.clone(), value.to_string());
        }
        for (name, value) in &self.settings {
            ensure_key(name, "setting")?;
            doc.settings.insert(name.clone(), value.clone());
        }
        for (name, value) in &self.outputs {
            ensure_key(name, "output")?;
            doc.outputs.insert(name.clone(), value.clone());
        }

        if !doc.settings.contains_key("source") {
            return Err(VidmillError::InvalidConfig {
                message: "no `source` setting present after merge".to_string(),
            });
        }

        Ok(doc.render())
    }
}

fn ensure_key(name: &str, kind: &str) -> Result<()> {
    if name.is_empty() {
        return Err(VidmillError::InvalidConfig {
            message: format!("empty {kind} name"),
        });
    }
    Ok(())
}

/// A parsed three-section config document. `BTreeMap` keeps each section in
/// ascending key order, which is the canonical rendering order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Document {
    pub(crate) vars: BTreeMap<String, String>,
    pub(crate) settings: BTreeMap<String, String>,
    pub(crate) outputs: BTreeMap<String, String>,
}

impl Document {
    pub(crate) fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VidmillError::BaseFileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                VidmillError::Io(e)
            }
        })?;
        Ok(Self::parse(&text))
    }

    /// Parse document text. Lines that don't carry a recognized prefix or a
    /// `name = value` entry (comments, blank separators, junk) are skipped.
    pub(crate) fn parse(text: &str) -> Self {
        let mut doc = Self::default();

        for line in text.lines() {
            let line = line.trim();

            let section = if let Some(rest) = line.strip_prefix("var ") {
                Some((&mut doc.vars, rest))
            } else if let Some(rest) = line.strip_prefix("set ") {
                Some((&mut doc.settings, rest))
            } else if let Some(rest) = line.strip_prefix("->") {
                Some((&mut doc.outputs, rest))
            } else {
                None
            };

            match section {
                Some((map, rest)) => match parse_entry(rest) {
                    Some((name, value)) => {
                        map.insert(name, value);
                    }
                    None => debug!("skipping malformed config line: {line}"),
                },
                None if !line.is_empty() => {
                    debug!("skipping unrecognized config line: {line}");
                }
                None => {}
            }
        }

        doc
    }

    /// Render the canonical text form: sorted entries, fixed section order,
    /// one blank line between sections. The separator after the variables
    /// section is dropped when both the variables and settings sections are
    /// empty; the one after settings is always emitted.
    pub(crate) fn render(&self) -> String {
        let mut lines: Vec<String> = Vec::new();

        for (name, value) in &self.vars {
            lines.push(format!("var {name} = {value}"));
        }
        if !(self.vars.is_empty() && self.settings.is_empty()) {
            lines.push(String::new());
        }
        for (name, value) in &self.settings {
            lines.push(format!("set {name} = {value}"));
        }
        lines.push(String::new());
        for (name, value) in &self.outputs {
            lines.push(format!("-> {name} = {value}"));
        }

        lines.join("\n")
    }
}

/// Split `name = value` on the first `=`, trimming both sides. Values keep
/// any further `=` characters (query strings, presigned URLs).
fn parse_entry(rest: &str) -> Option<(String, String)> {
    let (name, value) = rest.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}
