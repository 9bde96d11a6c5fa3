//! ApplicationSet resolution.
//!
//! A values-only chart carries no upstream reference of its own; the matching
//! ApplicationSet manifest supplies the chart coordinates. This module finds
//! that manifest, extracts the coordinates from whichever source shape the
//! manifest uses (plain chart reference or git path reference), and resolves
//! templated target revisions from generator-supplied values.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::yamlpath::{first_source_with, scalar_at};

/// `{{ targetRevision }}` / `{{ .values.targetRevision }}` style placeholder.
/// The referenced field name is the final dotted segment.
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*\.?(?:values\.)?([A-Za-z0-9_-]+)\s*\}\}").expect("placeholder regex")
});

/// Resolved upstream reference for a values-only chart.
///
/// Git-backed charts are a separate variant rather than a marker substring in
/// the name: the renderer cannot fetch them without a full clone, so they are
/// skipped, and the type makes that impossible to miss downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartRef {
    /// Published chart in a Helm repository.
    Repository {
        name: String,
        repo_url: String,
        target_revision: String,
    },
    /// Chart referenced by repository path; not renderable here.
    Git {
        name: String,
        repo_url: String,
        target_revision: String,
    },
}

impl ChartRef {
    pub fn name(&self) -> &str {
        match self {
            ChartRef::Repository { name, .. } | ChartRef::Git { name, .. } => name,
        }
    }

    pub fn is_git_backed(&self) -> bool {
        matches!(self, ChartRef::Git { .. })
    }
}

/// Why coordinate extraction gave up on a manifest.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no source entry carries a chart or path field")]
    NoSource,
    #[error("templated target revision references '{field}' but no generator supplies it")]
    UnresolvedTemplate { field: String },
    #[error("missing or empty {field} in resolved coordinates")]
    MissingField { field: &'static str },
    #[error("failed to parse ApplicationSet YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to read ApplicationSet file: {0}")]
    Io(#[from] std::io::Error),
}

/// Locate the ApplicationSet manifest for a chart name.
///
/// `{root}/{name}/{name}.yaml` is the conventional layout; the flat
/// `{root}/{name}.yaml` form is accepted as a fallback. Both extensions are
/// tried at each step. `None` means no upstream reference can be established
/// and the chart must be skipped, not failed.
pub fn find_appset_file(chart_name: &str, appset_root: &Path) -> Option<PathBuf> {
    let candidates = [
        appset_root.join(chart_name).join(format!("{chart_name}.yaml")),
        appset_root.join(chart_name).join(format!("{chart_name}.yml")),
        appset_root.join(format!("{chart_name}.yaml")),
        appset_root.join(format!("{chart_name}.yml")),
    ];
    candidates.into_iter().find(|path| path.is_file())
}

/// Extract chart coordinates from an ApplicationSet file.
pub fn extract_chart_ref_from_file(path: &Path) -> Result<ChartRef, ExtractError> {
    let content = fs::read_to_string(path)?;
    let doc: Value = serde_yaml::from_str(&content)?;
    extract_chart_ref(&doc)
}

/// Extract chart coordinates from a parsed ApplicationSet document.
///
/// A source with a `chart` field wins over one with a `path` field, whatever
/// their relative order. Templated target revisions are resolved from the
/// first generator's cluster values, falling back to the first element of a
/// list generator. The final revision always has a single leading `v`
/// stripped, templated or not.
pub fn extract_chart_ref(doc: &Value) -> Result<ChartRef, ExtractError> {
    let (git_backed, name, source) = if let Some(source) = first_source_with(doc, "chart") {
        let name = scalar_at(source, "chart").unwrap_or_default();
        (false, name, source)
    } else if let Some(source) = first_source_with(doc, "path") {
        let path = scalar_at(source, "path").unwrap_or_default();
        let name = path.rsplit('/').next().unwrap_or(&path).to_string();
        (true, name, source)
    } else {
        return Err(ExtractError::NoSource);
    };

    let repo_url = scalar_at(source, "repoURL").unwrap_or_default();
    let raw_revision = scalar_at(source, "targetRevision").unwrap_or_default();

    let substituted = resolve_revision(doc, &raw_revision)?;
    let target_revision = substituted
        .strip_prefix('v')
        .unwrap_or(&substituted)
        .to_string();

    if name.is_empty() {
        return Err(ExtractError::MissingField { field: "chart name" });
    }
    if repo_url.is_empty() {
        return Err(ExtractError::MissingField { field: "repoURL" });
    }
    if target_revision.is_empty() {
        return Err(ExtractError::MissingField {
            field: "targetRevision",
        });
    }

    Ok(if git_backed {
        ChartRef::Git {
            name,
            repo_url,
            target_revision,
        }
    } else {
        ChartRef::Repository {
            name,
            repo_url,
            target_revision,
        }
    })
}

/// Substitute a `{{ field }}` placeholder in the target revision, if any.
///
/// Lookup order: `spec.generators[0].clusters.values.<field>`, then
/// `spec.generators[0].list.elements[0].<field>`. A placeholder neither
/// generator can satisfy is an extraction error.
fn resolve_revision(doc: &Value, revision: &str) -> Result<String, ExtractError> {
    let Some(captures) = PLACEHOLDER.captures(revision) else {
        return Ok(revision.to_string());
    };
    let field = &captures[1];

    let resolved = scalar_at(doc, &format!("spec.generators.0.clusters.values.{field}"))
        .or_else(|| scalar_at(doc, &format!("spec.generators.0.list.elements.0.{field}")))
        .ok_or_else(|| ExtractError::UnresolvedTemplate {
            field: field.to_string(),
        })?;

    Ok(PLACEHOLDER.replace(revision, resolved.as_str()).into_owned())
}

/// Why an ApplicationSet manifest failed syntax validation.
#[derive(Debug, Error)]
pub enum AppSetSyntaxError {
    #[error("not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("kind is '{found}', expected 'ApplicationSet'")]
    WrongKind { found: String },
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

/// Check that a file parses as YAML and declares `kind: ApplicationSet`.
pub fn validate_appset_syntax(path: &Path) -> Result<(), AppSetSyntaxError> {
    let content = fs::read_to_string(path)?;
    let doc: Value = serde_yaml::from_str(&content)?;

    let kind = scalar_at(&doc, "kind").unwrap_or_default();
    if kind != "ApplicationSet" {
        return Err(AppSetSyntaxError::WrongKind { found: kind });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn parse(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn appset(sources: &str, generators: &str) -> Value {
        parse(&format!(
            r"
apiVersion: argoproj.io/v1alpha1
kind: ApplicationSet
spec:
  generators:
{generators}
  template:
    spec:
      sources:
{sources}
"
        ))
    }

    const NO_GENERATORS: &str = "    []";

    #[test]
    fn plain_chart_with_literal_revision() {
        let doc = appset(
            r"        - chart: nginx
          repoURL: https://charts.example.com
          targetRevision: 4.1.0",
            NO_GENERATORS,
        );

        let chart = extract_chart_ref(&doc).unwrap();
        assert_eq!(
            chart,
            ChartRef::Repository {
                name: "nginx".into(),
                repo_url: "https://charts.example.com".into(),
                target_revision: "4.1.0".into(),
            }
        );
    }

    #[test]
    fn templated_revision_resolved_from_cluster_generator() {
        let doc = appset(
            r"        - chart: nginx
          repoURL: https://charts.example.com
          targetRevision: 'v{{ targetRevision }}'",
            r"    - clusters:
        values:
          targetRevision: 2.0.0",
        );

        let chart = extract_chart_ref(&doc).unwrap();
        // the literal v from the template is consumed by the strip step
        assert_eq!(
            chart,
            ChartRef::Repository {
                name: "nginx".into(),
                repo_url: "https://charts.example.com".into(),
                target_revision: "2.0.0".into(),
            }
        );
    }

    #[test]
    fn templated_revision_falls_back_to_list_generator() {
        let doc = appset(
            r"        - chart: nginx
          repoURL: https://charts.example.com
          targetRevision: '{{ targetRevision }}'",
            r"    - list:
        elements:
          - targetRevision: 3.1.4",
        );

        let chart = extract_chart_ref(&doc).unwrap();
        assert_eq!(
            chart,
            ChartRef::Repository {
                name: "nginx".into(),
                repo_url: "https://charts.example.com".into(),
                target_revision: "3.1.4".into(),
            }
        );
    }

    #[test]
    fn unresolvable_template_is_an_error() {
        let doc = appset(
            r"        - chart: nginx
          repoURL: https://charts.example.com
          targetRevision: '{{ targetRevision }}'",
            r"    - clusters: {}",
        );

        let err = extract_chart_ref(&doc).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::UnresolvedTemplate { ref field } if field == "targetRevision"
        ));
    }

    #[test]
    fn git_path_source_yields_git_variant() {
        let doc = appset(
            r"        - path: charts/foo-bar
          repoURL: https://github.com/example/infra.git
          targetRevision: main",
            NO_GENERATORS,
        );

        let chart = extract_chart_ref(&doc).unwrap();
        assert!(chart.is_git_backed());
        assert_eq!(chart.name(), "foo-bar");
    }

    #[test]
    fn chart_source_wins_over_git_path_source() {
        let doc = appset(
            r"        - path: charts/infra-thing
          repoURL: https://github.com/example/infra.git
          targetRevision: main
        - chart: nginx
          repoURL: https://charts.example.com
          targetRevision: 4.1.0",
            NO_GENERATORS,
        );

        let chart = extract_chart_ref(&doc).unwrap();
        assert!(!chart.is_git_backed());
        assert_eq!(chart.name(), "nginx");
    }

    #[test]
    fn no_usable_source_is_an_error() {
        let doc = appset(
            r"        - repoURL: https://charts.example.com
          targetRevision: 4.1.0",
            NO_GENERATORS,
        );

        assert!(matches!(
            extract_chart_ref(&doc),
            Err(ExtractError::NoSource)
        ));
    }

    #[test]
    fn literal_v_prefix_is_stripped_unconditionally() {
        let doc = appset(
            r"        - chart: nginx
          repoURL: https://charts.example.com
          targetRevision: v1.2.3",
            NO_GENERATORS,
        );

        let chart = extract_chart_ref(&doc).unwrap();
        let ChartRef::Repository {
            target_revision, ..
        } = chart
        else {
            panic!("expected repository chart");
        };
        assert_eq!(target_revision, "1.2.3");
    }

    #[test]
    fn missing_repo_url_is_an_error() {
        let doc = appset(
            r"        - chart: nginx
          targetRevision: 4.1.0",
            NO_GENERATORS,
        );

        assert!(matches!(
            extract_chart_ref(&doc),
            Err(ExtractError::MissingField { field: "repoURL" })
        ));
    }

    #[test]
    fn find_appset_file_prefers_nested_layout() {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("nginx")).unwrap();
        fs::write(root.path().join("nginx/nginx.yaml"), "kind: ApplicationSet\n").unwrap();
        fs::write(root.path().join("nginx.yaml"), "kind: ApplicationSet\n").unwrap();

        assert_eq!(
            find_appset_file("nginx", root.path()),
            Some(root.path().join("nginx/nginx.yaml"))
        );
    }

    #[test]
    fn find_appset_file_falls_back_to_flat_layout() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("redis.yml"), "kind: ApplicationSet\n").unwrap();

        assert_eq!(
            find_appset_file("redis", root.path()),
            Some(root.path().join("redis.yml"))
        );
    }

    #[test]
    fn find_appset_file_reports_absence() {
        let root = TempDir::new().unwrap();
        assert_eq!(find_appset_file("ghost", root.path()), None);
    }

    #[test]
    fn syntax_validation_accepts_applicationset() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("appset.yaml");
        fs::write(&path, "kind: ApplicationSet\nspec: {}\n").unwrap();

        assert!(validate_appset_syntax(&path).is_ok());
    }

    #[test]
    fn syntax_validation_rejects_wrong_kind() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("app.yaml");
        fs::write(&path, "kind: Application\nspec: {}\n").unwrap();

        let err = validate_appset_syntax(&path).unwrap_err();
        assert!(matches!(
            err,
            AppSetSyntaxError::WrongKind { ref found } if found == "Application"
        ));
    }

    #[test]
    fn syntax_validation_rejects_malformed_yaml() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("broken.yaml");
        fs::write(&path, "kind: [unclosed\n").unwrap();

        assert!(matches!(
            validate_appset_syntax(&path),
            Err(AppSetSyntaxError::Yaml(_))
        ));
    }
}
