//! wn-audit: run the Wonder Nest accessibility auditor over an HTML file

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use wn_a11y::{AuditConfig, AuditScope, AuditSession, KeyValueStore, MemoryStore, PageRegistry};
use wn_dom::Document;
use wn_html::HtmlParser;

mod cli;
mod report;
mod store;

use cli::Cli;
use report::Report;
use store::JsonFileStore;

fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    let scope = cli.audit_scope()?;

    let mut parser = HtmlParser::new();
    if let Some((width, height)) = cli.viewport {
        parser = parser.with_viewport(width, height);
    }
    let doc = parser
        .parse_file(&cli.input)
        .with_context(|| format!("failed to load {}", cli.input.display()))?;

    let registry = match &cli.registry {
        Some(path) => load_registry(path)?,
        None => PageRegistry::new(),
    };
    let custom_css = cli.css.as_deref().map(load_css).transpose()?;

    let run = AuditRun {
        cli: &cli,
        scope,
        registry,
        custom_css,
    };
    match &cli.history {
        Some(path) => {
            let store = JsonFileStore::open(path)
                .with_context(|| format!("failed to open history {}", path.display()))?;
            tracing::debug!("Using history file {}", store.path().display());
            run.execute(doc, cli.config(), store)
        }
        None => run.execute(doc, cli.config(), MemoryStore::new()),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

struct AuditRun<'a> {
    cli: &'a Cli,
    scope: AuditScope,
    registry: PageRegistry,
    custom_css: Option<String>,
}

impl AuditRun<'_> {
    fn execute<S: KeyValueStore>(self, mut doc: Document, config: AuditConfig, store: S) -> anyhow::Result<ExitCode> {
        let mut session = AuditSession::start(config, store);
        let score = session.run_audit_blocking(
            &mut doc,
            &self.scope,
            &self.registry,
            self.custom_css.as_deref(),
        );

        let filter = self.cli.filter();
        let report = Report::new(
            self.cli.input.display().to_string(),
            &score,
            session.filtered_issues(&filter),
            session.history(),
        );
        if self.cli.json {
            println!("{}", report.to_json()?);
        } else {
            print!("{}", report.to_text());
        }

        if let Some(path) = &self.cli.annotated {
            fs::write(path, wn_html::to_html(&doc))
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        session.stop(&mut doc);

        match self.cli.fail_under {
            Some(min) if score.overall < min => {
                tracing::warn!("Overall score {} is below {}", score.overall, min);
                Ok(ExitCode::FAILURE)
            }
            _ => Ok(ExitCode::SUCCESS),
        }
    }
}

fn load_registry(path: &Path) -> anyhow::Result<PageRegistry> {
    let raw = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let pages: BTreeMap<String, Vec<String>> =
        serde_json::from_str(&raw).with_context(|| format!("invalid page registry {}", path.display()))?;
    let mut registry = PageRegistry::new();
    for (page, sections) in pages {
        registry.insert(page, sections);
    }
    Ok(registry)
}

/// `--css` names a file when one exists at that path, otherwise it is the CSS itself
fn load_css(value: &str) -> anyhow::Result<String> {
    let path = Path::new(value);
    if path.is_file() {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    } else {
        Ok(value.to_string())
    }
}
