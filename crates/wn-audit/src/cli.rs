use std::path::PathBuf;

use anyhow::bail;
use clap::{Parser, ValueEnum};
use wn_a11y::{AuditConfig, AuditScope, IssueFilter, IssueType, Severity};

#[derive(Parser, Debug)]
#[command(name = "wn-audit", version, about = "Accessibility audit of an HTML page")]
pub struct Cli {
    #[arg(help = "HTML file to audit")]
    pub input: PathBuf,

    #[arg(long, value_enum, default_value_t = ScopeArg::Global)]
    pub scope: ScopeArg,

    #[arg(long, default_value = "home", help = "Id of the page the input renders")]
    pub page: String,

    #[arg(long, value_delimiter = ',', help = "Page ids for --scope custom")]
    pub pages: Vec<String>,

    #[arg(long, value_delimiter = ',', help = "Section ids for --scope custom")]
    pub sections: Vec<String>,

    #[arg(long, help = "Comma-separated selectors for --scope component")]
    pub selectors: Option<String>,

    #[arg(long, help = "Page registry JSON: {\"<page>\": [\"<section>\", ...]}")]
    pub registry: Option<PathBuf>,

    #[arg(long, help = "Extra highlight CSS (file path or inline text)")]
    pub css: Option<String>,

    #[arg(long, help = "Score history file, created if missing")]
    pub history: Option<PathBuf>,

    #[arg(long, help = "Write the annotated document to this file")]
    pub annotated: Option<PathBuf>,

    #[arg(long, value_parser = parse_viewport, help = "Viewport as WIDTHxHEIGHT")]
    pub viewport: Option<(f64, f64)>,

    #[arg(long = "type", value_enum, help = "Only report issues of this type")]
    pub issue_type: Option<TypeArg>,

    #[arg(long, value_enum, help = "Only report issues of this severity")]
    pub severity: Option<SeverityArg>,

    #[arg(long, help = "Exit with status 1 when the overall score is below this")]
    pub fail_under: Option<i64>,

    #[arg(long, help = "Output machine-readable JSON")]
    pub json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ScopeArg {
    Current,
    Global,
    Custom,
    Component,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum TypeArg {
    Contrast,
    Semantic,
    Aria,
    Seo,
    Navigation,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SeverityArg {
    Critical,
    Warning,
    Info,
}

impl From<TypeArg> for IssueType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Contrast => IssueType::Contrast,
            TypeArg::Semantic => IssueType::Semantic,
            TypeArg::Aria => IssueType::Aria,
            TypeArg::Seo => IssueType::Seo,
            TypeArg::Navigation => IssueType::Navigation,
        }
    }
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Critical => Severity::Critical,
            SeverityArg::Warning => Severity::Warning,
            SeverityArg::Info => Severity::Info,
        }
    }
}

impl Cli {
    pub fn audit_scope(&self) -> anyhow::Result<AuditScope> {
        Ok(match self.scope {
            ScopeArg::Current => AuditScope::Current,
            ScopeArg::Global => AuditScope::Global,
            ScopeArg::Custom => {
                if self.pages.is_empty() {
                    bail!("--scope custom needs at least one page in --pages");
                }
                AuditScope::custom(self.pages.iter().cloned(), self.sections.iter().cloned())
            }
            ScopeArg::Component => match self.selectors.as_deref() {
                Some(input) => AuditScope::component_from_input(input),
                None => bail!("--scope component needs --selectors"),
            },
        })
    }

    pub fn config(&self) -> AuditConfig {
        AuditConfig::default().with_page(self.page.clone())
    }

    pub fn filter(&self) -> IssueFilter {
        let mut filter = IssueFilter::new();
        if let Some(t) = self.issue_type {
            filter = filter.issue_type(t.into());
        }
        if let Some(s) = self.severity {
            filter = filter.severity(s.into());
        }
        filter
    }
}

fn parse_viewport(value: &str) -> Result<(f64, f64), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{}`", value))?;
    let dim = |s: &str| {
        s.trim()
            .parse::<f64>()
            .ok()
            .filter(|d| *d > 0.0)
            .ok_or_else(|| format!("invalid viewport dimension `{}`", s))
    };
    Ok((dim(w)?, dim(h)?))
}
