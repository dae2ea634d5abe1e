//! Project-wide pattern extraction.

use crate::model::{
    ComponentUsageStats, DataSourceUsagePattern, DetectedPattern, FormComplexity, FormPattern,
    Navigation, PageStructurePattern, PatternExample, PatternKind, ProjectAnalysisResult,
    ValidationLibrary, ValidationPattern,
};
use crate::observation::{FileObservation, FormOccurrence};
use crate::recommendations::{self, RecommendationRule};
use archbase_core::config::{self, Config};
use archbase_core::discovery::{FileDiscovery, GlobList};
use archbase_core::thresholds;
use archbase_core::{
    ComponentFactExtractor, FileError, ParseOptions, ScanError, ScanFailure, SourceParser,
    SCHEMA_VERSION,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Files never analyzed for patterns.
pub const PATTERN_EXCLUDES: &[&str] = &["*.test.*", "*.spec.*", "*.d.ts"];

/// Path keyword to usage context.
const CONTEXT_KEYWORDS: &[(&str, &str)] = &[
    ("form", "forms"),
    ("page", "pages"),
    ("modal", "modals"),
    ("dashboard", "dashboard"),
    ("admin", "admin"),
    ("list", "lists"),
];

/// Longest example excerpt, in lines.
const EXAMPLE_MAX_LINES: usize = 12;

/// Errors from pattern analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The analyzer could not be set up.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Export failed.
    #[error("Failed to write {}: {source}", .path.display())]
    Export {
        /// Target file.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Serialization failed.
    #[error("Failed to serialize analysis: {0}")]
    Json(#[from] serde_json::Error),
}

/// Extracts reusable generation patterns from a project tree.
#[derive(Debug, Clone)]
pub struct PatternAnalyzer {
    root: PathBuf,
    config: Config,
    rules: Vec<RecommendationRule>,
}

impl PatternAnalyzer {
    /// Creates an analyzer for `root` with default settings.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: Config::default(),
            rules: recommendations::RULES.to_vec(),
        }
    }

    /// Takes include/exclude settings from a configuration.
    #[must_use]
    pub fn config(mut self, config: &Config) -> Self {
        self.config = config.clone();
        self
    }

    /// Replaces the recommendation rules.
    #[must_use]
    pub fn recommendation_rules(mut self, rules: Vec<RecommendationRule>) -> Self {
        self.rules = rules;
        self
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn discovery(&self) -> Result<FileDiscovery, ScanError> {
        let root = if self.root.is_absolute() {
            self.root.clone()
        } else {
            std::env::current_dir()?.join(&self.root)
        };
        if !root.is_dir() {
            return Err(ScanError::Configuration(format!(
                "root is not a directory: {}",
                root.display()
            )));
        }
        let scanner = &self.config.scanner;
        let mut exclude = scanner.exclude.clone();
        exclude.extend(PATTERN_EXCLUDES.iter().map(|p| (*p).to_owned()));
        Ok(FileDiscovery::new(
            root,
            GlobList::new(&scanner.include)?,
            GlobList::new(&exclude)?,
        )
        .deep(scanner.deep)
        .respect_gitignore(scanner.respect_gitignore))
    }

    /// Analyzes every discovered file and aggregates the patterns.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not a directory or a configured glob
    /// is invalid. Per-file failures are recorded in the result.
    pub fn analyze_project(&self) -> Result<ProjectAnalysisResult, AnalysisError> {
        let discovery = self.discovery()?;
        info!("Analyzing patterns in {}", discovery.root().display());
        let files = discovery.discover();
        info!("Found {} files to analyze", files.len());

        let parser = SourceParser::new();
        let extractor = ComponentFactExtractor::new();
        let mut observations = Vec::new();
        let mut failures = Vec::new();

        for file in files {
            match observe(&parser, &extractor, discovery.root(), &file) {
                Ok(obs) => {
                    debug!("{}: {} usages, {} forms", file.display(), obs.usages.len(), obs.forms.len());
                    observations.push(obs);
                }
                Err(e) => {
                    warn!("Failed to analyze {}: {e}", file.display());
                    failures.push(e.to_failure(&file));
                }
            }
        }

        let result = aggregate(&observations, failures, &self.rules);
        info!(
            "Pattern analysis complete: {} patterns, {} recommendations",
            result.patterns.len(),
            result.recommendations.len()
        );
        Ok(result)
    }
}

fn observe(
    parser: &SourceParser,
    extractor: &ComponentFactExtractor,
    root: &Path,
    file: &Path,
) -> Result<FileObservation, FileError> {
    let path = root.join(file);
    let source = std::fs::read_to_string(&path).map_err(|source| FileError::Read { path, source })?;
    let parsed = parser.parse(&source, file, ParseOptions::component())?;
    Ok(FileObservation::collect(&parsed, extractor))
}

/// Writes `result` as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn export(result: &ProjectAnalysisResult, path: &Path) -> Result<(), AnalysisError> {
    let json = serde_json::to_string_pretty(result)?;
    std::fs::write(path, json).map_err(|source| AnalysisError::Export {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Analysis exported to {}", path.display());
    Ok(())
}

fn push_file(files: &mut Vec<PathBuf>, file: &Path) {
    if !files.iter().any(|f| f == file) {
        files.push(file.to_path_buf());
    }
}

/// Finds the entry matching `key`, inserting `init()` when absent.
fn entry<'a, T>(items: &'a mut Vec<T>, key: impl Fn(&T) -> bool, init: impl FnOnce() -> T) -> &'a mut T {
    let index = match items.iter().position(key) {
        Some(i) => i,
        None => {
            items.push(init());
            items.len() - 1
        }
    };
    &mut items[index]
}

fn form_complexity(field_types: usize) -> FormComplexity {
    if field_types >= thresholds::FORM_HIGH_MIN_FIELD_TYPES {
        FormComplexity::High
    } else if field_types >= thresholds::FORM_MEDIUM_MIN_FIELD_TYPES {
        FormComplexity::Medium
    } else {
        FormComplexity::Low
    }
}

fn contexts_of(file: &Path) -> impl Iterator<Item = String> {
    let lower = file.to_string_lossy().to_lowercase();
    CONTEXT_KEYWORDS
        .iter()
        .filter(move |(keyword, _)| lower.contains(keyword))
        .map(|(_, context)| (*context).to_owned())
}

fn excerpt(code: &str) -> String {
    code.lines().take(EXAMPLE_MAX_LINES).collect::<Vec<_>>().join("\n")
}

/// Folds per-file observations into a result.
fn aggregate(
    observations: &[FileObservation],
    failures: Vec<ScanFailure>,
    rules: &[RecommendationRule],
) -> ProjectAnalysisResult {
    let mut data_source_usage: Vec<DataSourceUsagePattern> = Vec::new();
    let mut component_usage: Vec<ComponentUsageStats> = Vec::new();
    let mut form_patterns: Vec<FormPattern> = Vec::new();
    let mut form_examples: Vec<Vec<(PathBuf, &FormOccurrence)>> = Vec::new();
    let mut validation_patterns: Vec<ValidationPattern> = Vec::new();
    let mut page_structures: Vec<PageStructurePattern> = Vec::new();

    for obs in observations {
        for usage in &obs.usages {
            let stats = entry(
                &mut component_usage,
                |c| c.component == usage.name,
                || ComponentUsageStats {
                    component: usage.name.clone(),
                    usage_count: 0,
                    common_props: BTreeMap::new(),
                    patterns: Default::default(),
                    contexts: Default::default(),
                },
            );
            stats.usage_count += 1;
            for prop in &usage.props {
                *stats.common_props.entry(prop.name.clone()).or_default() += 1;
            }
            stats.patterns.extend(usage.patterns.iter().cloned());
            stats.contexts.extend(contexts_of(&obs.file));

            if !usage.has_data_source {
                continue;
            }
            let group = entry(
                &mut data_source_usage,
                |d| d.component == usage.name && d.version == usage.data_source_version,
                || DataSourceUsagePattern {
                    component: usage.name.clone(),
                    version: usage.data_source_version,
                    usage_count: 0,
                    common_props: BTreeMap::new(),
                    patterns: Default::default(),
                    files: Vec::new(),
                },
            );
            group.usage_count += 1;
            for prop in &usage.props {
                *group.common_props.entry(prop.name.clone()).or_default() += 1;
            }
            group.patterns.extend(usage.patterns.iter().cloned());
            push_file(&mut group.files, &obs.file);
        }

        for form in &obs.forms {
            let complexity = form_complexity(form.field_types.len());
            let index = match form_patterns.iter().position(|f| {
                f.validation_library == form.validation
                    && f.layout == form.layout
                    && f.complexity == complexity
            }) {
                Some(i) => i,
                None => {
                    form_patterns.push(FormPattern {
                        field_types: Default::default(),
                        validation_library: form.validation,
                        layout: form.layout.clone(),
                        common_features: Default::default(),
                        complexity,
                        frequency: 0,
                        files: Vec::new(),
                    });
                    form_examples.push(Vec::new());
                    form_patterns.len() - 1
                }
            };
            let pattern = &mut form_patterns[index];
            pattern.frequency += 1;
            pattern.field_types.extend(form.field_types.iter().cloned());
            pattern.common_features.extend(form.features.iter().cloned());
            push_file(&mut pattern.files, &obs.file);
            form_examples[index].push((obs.file.clone(), form));
        }

        for (library, rules) in &obs.validation {
            if rules.is_empty() {
                continue;
            }
            let pattern = entry(
                &mut validation_patterns,
                |v| v.library == *library,
                || ValidationPattern {
                    library: *library,
                    rules: Default::default(),
                    frequency: 0,
                    examples: Vec::new(),
                },
            );
            pattern.frequency += 1;
            pattern.rules.extend(rules.iter().cloned());
            pattern.examples.push(obs.file.clone());
        }

        if let Some(page) = &obs.page {
            let structure = entry(
                &mut page_structures,
                |p| p.layout == page.layout,
                || PageStructurePattern {
                    layout: page.layout.clone(),
                    sections: Default::default(),
                    navigation: Navigation::Absent,
                    authentication: false,
                    frequency: 0,
                    files: Vec::new(),
                },
            );
            structure.frequency += 1;
            structure.sections.extend(page.sections.iter().cloned());
            if page.navigation {
                structure.navigation = Navigation::Present;
            }
            structure.authentication |= page.authentication;
            push_file(&mut structure.files, &obs.file);
        }
    }

    let mut patterns = Vec::new();
    for (form, examples) in form_patterns.iter().zip(&form_examples) {
        if form.frequency < thresholds::FORM_PATTERN_MIN_FREQUENCY {
            continue;
        }
        patterns.push(form_pattern(form, examples));
    }
    for usage in &data_source_usage {
        if usage.usage_count < thresholds::DATASOURCE_PATTERN_MIN_USAGES {
            continue;
        }
        patterns.push(data_source_pattern(usage));
    }
    for page in &page_structures {
        if page.frequency < thresholds::PAGE_PATTERN_MIN_FREQUENCY {
            continue;
        }
        patterns.push(page_pattern(page));
    }

    let mut result = ProjectAnalysisResult {
        schema_version: SCHEMA_VERSION,
        files_analyzed: observations.len(),
        failures,
        patterns,
        data_source_usage,
        form_patterns,
        component_usage,
        validation_patterns,
        page_structures,
        recommendations: Vec::new(),
    };
    result.recommendations = recommendations::evaluate(rules, &result);
    result
}

fn parameters(pairs: [(&str, Value); 4]) -> BTreeMap<String, Value> {
    pairs.into_iter().map(|(k, v)| (k.to_owned(), v)).collect()
}

fn form_pattern(form: &FormPattern, examples: &[(PathBuf, &FormOccurrence)]) -> DetectedPattern {
    let lib = form.validation_library;
    let layout = &form.layout;
    DetectedPattern {
        name: format!("form-{lib}-{layout}-{}", form.complexity),
        kind: PatternKind::Form,
        frequency: form.frequency,
        priority: thresholds::pattern_priority(form.frequency),
        files: form.files.clone(),
        description: format!("{layout} form with {lib} validation"),
        template: format!("forms/{lib}-{layout}.hbs"),
        parameters: parameters([
            ("validation", json!(lib)),
            ("layout", json!(layout)),
            ("fieldTypes", json!(form.field_types)),
            ("complexity", json!(form.complexity)),
        ]),
        examples: examples
            .first()
            .map(|(file, occurrence)| PatternExample {
                file: file.clone(),
                code: excerpt(&occurrence.snippet),
                description: format!("{} field type(s)", occurrence.field_types.len()),
            })
            .into_iter()
            .collect(),
    }
}

fn data_source_pattern(usage: &DataSourceUsagePattern) -> DetectedPattern {
    let version = usage.version;
    DetectedPattern {
        name: format!("datasource-{version}-{}", usage.component),
        kind: PatternKind::Component,
        frequency: usage.usage_count,
        priority: thresholds::pattern_priority(usage.usage_count),
        files: usage.files.clone(),
        description: format!("{} bound to DataSource {version}", usage.component),
        template: format!("components/datasource-{version}.hbs"),
        parameters: parameters([
            ("version", json!(version)),
            ("component", json!(usage.component)),
            ("commonProps", json!(usage.common_props)),
            ("patterns", json!(usage.patterns)),
        ]),
        examples: Vec::new(),
    }
}

fn page_pattern(page: &PageStructurePattern) -> DetectedPattern {
    let layout = &page.layout;
    DetectedPattern {
        name: format!("page-{layout}"),
        kind: PatternKind::Page,
        frequency: page.frequency,
        priority: thresholds::pattern_priority(page.frequency),
        files: page.files.clone(),
        description: format!("Page with {layout} layout"),
        template: format!("pages/{layout}.hbs"),
        parameters: parameters([
            ("layout", json!(layout)),
            ("sections", json!(page.sections)),
            ("navigation", json!(page.navigation)),
            ("authentication", json!(page.authentication)),
        ]),
        examples: Vec::new(),
    }
}

/// Analyzes `root` using `archbase.toml` from the root when present.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the analysis cannot
/// start.
pub fn analyze_project(root: impl Into<PathBuf>) -> Result<ProjectAnalysisResult, AnalysisError> {
    let root = root.into();
    let config_path = root.join(config::CONFIG_FILE_NAME);
    let config = if config_path.is_file() {
        Config::from_file(&config_path).map_err(ScanError::from)?
    } else {
        Config::default()
    };
    PatternAnalyzer::new(root).config(&config).analyze_project()
}
