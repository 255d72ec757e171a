//! Branch classification against the configured branch-type table

use crate::config::{EffectiveConfiguration, ResolvedConfiguration};
use crate::domain::prerelease::normalize_label_template;
use crate::domain::{escape_branch_name, friendly_name};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::trace;

/// A branch name paired with the branch type it matched
#[derive(Debug, Clone)]
pub struct ClassifiedBranch {
    pub name: String,
    pub configuration: Arc<EffectiveConfiguration>,
    /// Rendered label; `Some("")` for stable branch types
    pub label: Option<String>,
}

impl ClassifiedBranch {
    /// Label to use for pre-release tags (empty when stable)
    pub fn label_str(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }
}

/// Matches branch names to branch types; first regex in table order wins.
///
/// Results are memoized per name for the lifetime of the classifier.
pub struct BranchClassifier<'c> {
    configuration: &'c ResolvedConfiguration,
    cache: Mutex<HashMap<String, Arc<ClassifiedBranch>>>,
}

impl<'c> BranchClassifier<'c> {
    pub fn new(configuration: &'c ResolvedConfiguration) -> Self {
        BranchClassifier {
            configuration,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn configuration(&self) -> &'c ResolvedConfiguration {
        self.configuration
    }

    /// Classify a branch name, falling back to the `unknown` branch type
    pub fn classify(&self, name: &str) -> Arc<ClassifiedBranch> {
        let name = friendly_name(name);
        let mut cache = self.cache.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(found) = cache.get(&name) {
            return Arc::clone(found);
        }

        let (configuration, label) = {
            let (configuration, captures) = self
                .configuration
                .branch_types()
                .iter()
                .find_map(|branch_type| {
                    branch_type
                        .regex
                        .captures(&name)
                        .map(|caps| (Arc::clone(branch_type), Some(caps)))
                })
                .unwrap_or_else(|| {
                    let unknown = self.configuration.unknown();
                    (Arc::clone(unknown), unknown.regex.captures(&name))
                });
            let label = render_label(
                configuration.label.as_deref(),
                &configuration.regex,
                captures.as_ref(),
                &name,
            );
            (configuration, label)
        };
        trace!(branch = %name, branch_type = %configuration.branch_type, ?label, "classified branch");

        let classified = Arc::new(ClassifiedBranch {
            name: name.clone(),
            configuration,
            label: Some(label),
        });
        cache.insert(name, Arc::clone(&classified));
        classified
    }
}

/// Render a label template for a branch
///
/// `{BranchName}` and every other named group of the branch regex are
/// replaced by the sanitized captured text. A missing template yields the
/// sanitized branch name. A trailing `.{count}` is dropped since the number
/// is appended anyway.
pub fn render_label(
    template: Option<&str>,
    regex: &Regex,
    captures: Option<&Captures<'_>>,
    branch_name: &str,
) -> String {
    let Some(template) = template else {
        return escape_branch_name(branch_name);
    };

    let mut label = normalize_label_template(template);
    for group in regex.capture_names().flatten() {
        let value = captures
            .and_then(|caps| caps.name(group))
            .map(|m| escape_branch_name(m.as_str()))
            .unwrap_or_default();
        label = label.replace(&format!("{{{}}}", group), &value);
    }
    if label.contains("{BranchName}") {
        label = label.replace("{BranchName}", &escape_branch_name(branch_name));
    }
    label
}
