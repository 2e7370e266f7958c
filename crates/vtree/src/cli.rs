//! Core logic behind the `vtree-diff` and `vtree-patch` binaries.
//!
//! - `vtree-diff <old.json> <new.json>` prints the edit script between two
//!   JsonML documents.
//! - `vtree-patch '<script-json>'` reads a JsonML document from stdin, mounts
//!   it into a [`MemoryTree`], applies the script, and prints the markup.

use std::path::Path;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::apply::apply_patches;
use crate::codec::json::{from_json_patch, to_json_patch, vnode_from_json, CodecError};
use crate::diff::{diff_with, AttrCompare, ValueKindCompare};
use crate::host::memory::MemoryTree;
use crate::html::HtmlOptions;
use crate::live::LiveTree;
use crate::mount::mount;
use crate::patch::PatchError;
use crate::vnode::{AttrValue, VNode};

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Patch(#[from] PatchError),
}

// ── Options ───────────────────────────────────────────────────────────────

/// Flags shared by both tools.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    /// Indented JSON / HTML output.
    pub pretty: bool,
    /// `-v` count: 0 defers to `RUST_LOG`, 1 is debug, 2+ is trace.
    pub verbose: u8,
}

/// Split `args` (without the program name) into flags and positionals.
pub fn parse_args<I>(args: I) -> Result<(CliOptions, Vec<String>), CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut options = CliOptions::default();
    let mut positional = Vec::new();
    for arg in args {
        match arg.as_str() {
            "--pretty" | "-p" => options.pretty = true,
            "-v" | "--verbose" => options.verbose = options.verbose.saturating_add(1),
            "-vv" => options.verbose = options.verbose.saturating_add(2),
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(CliError::Usage(format!("unknown flag: {flag}")));
            }
            _ => positional.push(arg.clone()),
        }
    }
    Ok((options, positional))
}

/// Install the stderr log subscriber.
pub fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    // A second install (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

// ── Shared helpers ────────────────────────────────────────────────────────

/// Handlers decoded from JSON are fresh no-ops, so identity comparison would
/// report every handler as changed. Documents compare handlers by label.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelCompare;

impl AttrCompare for LabelCompare {
    fn same(&self, key: &str, old: &AttrValue, new: &AttrValue) -> bool {
        match (old, new) {
            (AttrValue::Handler(a), AttrValue::Handler(b)) => a.label() == b.label(),
            _ => ValueKindCompare.same(key, old, new),
        }
    }
}

pub fn read_document(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn parse_tree(json: &str) -> Result<VNode, CliError> {
    let value: Value = serde_json::from_str(json)?;
    Ok(vnode_from_json(&value)?)
}

fn render_json(value: &Value, pretty: bool) -> Result<String, CliError> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

// ── vtree-diff ────────────────────────────────────────────────────────────

/// Edit script between two JsonML documents, as JSON text.
pub fn diff_documents(old: &str, new: &str, options: &CliOptions) -> Result<String, CliError> {
    let old = parse_tree(old)?;
    let new = parse_tree(new)?;
    let patches = diff_with(&old, &new, &LabelCompare);
    info!(
        old_nodes = old.walk().count(),
        new_nodes = new.walk().count(),
        patches = patches.len(),
        "computed edit script"
    );
    render_json(&to_json_patch(&patches), options.pretty)
}

// ── vtree-patch ───────────────────────────────────────────────────────────

/// Mount the JsonML `document`, apply the JSON edit `script`, and return the
/// resulting markup.
pub fn patch_document(document: &str, script: &str, options: &CliOptions) -> Result<String, CliError> {
    let virtual_tree = parse_tree(document)?;
    let script: Value = serde_json::from_str(script)?;
    let patches = from_json_patch(&script)?;

    let mut host = MemoryTree::new();
    let container = host.document();
    let root = mount(&mut host, &virtual_tree, &container)?;
    debug!(patches = patches.len(), "patching mounted document");
    apply_patches(&mut host, root, &patches)?;

    let html_options = if options.pretty {
        HtmlOptions::indented("  ")
    } else {
        HtmlOptions::default()
    };
    Ok(host
        .children(&container)
        .map_err(PatchError::from)?
        .iter()
        .map(|node| host.to_html(node, &html_options))
        .collect::<Vec<_>>()
        .join(if options.pretty { "\n" } else { "" }))
}
