//! # Info mappings
//!
//! An info mapping turns the path of a stimulus file into the information the
//! evaluation needs about it: which session it belongs to, its image name, the
//! experimental condition and, most importantly, its category label.
//!
//! The label produced here replaces whatever label the directory layout
//! suggests. Different dataset families encode this information differently,
//! so the mapping is a strategy chosen by configuration ([`InfoMappingKind`])
//! rather than guessed from the data.
//!
//! Every mapping is a pure function of the path string: the same path always
//! resolves to the same [`PathInfo`], independently of iteration order.

use std::fmt;
use std::path::MAIN_SEPARATOR;
use std::str::FromStr;
use std::sync::Arc;

use stimulus_core::StimulusError;

const DEFAULT_SESSION: &str = "session-1";
const NO_CONDITION: &str = "NaN";

/// Information derived from a stimulus path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathInfo {
    pub session: String,
    pub image_name: String,
    pub condition: String,
    /// The category label propagated to samples and batches.
    pub label: String,
}

/// Strategy mapping a file path to its [`PathInfo`].
pub trait InfoMapping: Send + Sync {
    /// Resolves the information encoded in `path`.
    ///
    /// # Errors
    ///
    /// Returns `StimulusError::Configuration` if `path` does not follow the
    /// naming convention this mapping expects. The dataset and the mapping do
    /// not belong together in that case; no default label is substituted.
    fn resolve(&self, path: &str) -> Result<PathInfo, StimulusError>;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str;
}

/// Splits a path into its non-empty components, accepting `/` on every
/// platform in addition to the native separator.
fn components(path: &str) -> Vec<&str> {
    path.split(|c| c == '/' || c == MAIN_SEPARATOR)
        .filter(|part| !part.is_empty())
        .collect()
}

fn unresolvable(path: &str, reason: impl Into<String>) -> StimulusError {
    StimulusError::Configuration {
        path: path.to_string(),
        reason: reason.into(),
    }
}

/// Returns the last `n` components of `path`, oldest first.
fn trailing<'a>(path: &'a str, n: usize, layout: &str) -> Result<Vec<&'a str>, StimulusError> {
    let parts = components(path);
    if parts.len() < n {
        return Err(unresolvable(
            path,
            format!("expected a path of the form {layout}"),
        ));
    }
    Ok(parts[parts.len() - n..].to_vec())
}

/// ImageNet-like layout without sessions or conditions:
/// `.../{category}/{img_name}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageNetInfoMapping;

impl InfoMapping for ImageNetInfoMapping {
    fn resolve(&self, path: &str) -> Result<PathInfo, StimulusError> {
        let parts = trailing(path, 2, ".../{category}/{img_name}")?;
        Ok(PathInfo {
            session: DEFAULT_SESSION.to_string(),
            image_name: parts[1].to_string(),
            condition: NO_CONDITION.to_string(),
            label: parts[0].to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "imagenet"
    }
}

/// ImageNet-C layout:
/// `.../{corruption}/{severity}/{category}/{img_name}`.
///
/// The condition is reported as `{corruption}-{severity}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageNetCInfoMapping;

impl InfoMapping for ImageNetCInfoMapping {
    fn resolve(&self, path: &str) -> Result<PathInfo, StimulusError> {
        let parts = trailing(
            path,
            4,
            ".../{corruption}/{severity}/{category}/{img_name}",
        )?;
        Ok(PathInfo {
            session: DEFAULT_SESSION.to_string(),
            image_name: parts[3].to_string(),
            condition: format!("{}-{}", parts[0], parts[1]),
            label: parts[2].to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "imagenet-c"
    }
}

/// Psychophysics layout with one directory per session:
/// `.../{session}/{idx}_{tag}_{subject}_{condition}_{category}[_...].{ext}`.
///
/// Condition and category are taken from the underscore-separated file name;
/// any extension is stripped from the category token.
#[derive(Debug, Clone, Copy, Default)]
pub struct InfoMappingWithSessions;

impl InfoMapping for InfoMappingWithSessions {
    fn resolve(&self, path: &str) -> Result<PathInfo, StimulusError> {
        let parts = trailing(path, 2, ".../{session}/{img_name}")?;
        let (session, image_name) = (parts[0], parts[1]);

        let tokens: Vec<&str> = image_name.split('_').collect();
        if tokens.len() < 5 {
            return Err(unresolvable(
                path,
                "expected an image name of the form {idx}_{tag}_{subject}_{condition}_{category}",
            ));
        }
        let condition = tokens[3];
        let label = tokens[4].split('.').next().unwrap_or_default();
        if label.is_empty() {
            return Err(unresolvable(path, "empty category token in image name"));
        }

        Ok(PathInfo {
            session: session.to_string(),
            image_name: image_name.to_string(),
            condition: condition.to_string(),
            label: label.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "sessions"
    }
}

/// Configuration-level choice of info mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InfoMappingKind {
    #[default]
    ImageNet,
    ImageNetC,
    Sessions,
}

impl InfoMappingKind {
    /// Builds the mapping as a shareable trait object.
    pub fn build(self) -> Arc<dyn InfoMapping> {
        match self {
            InfoMappingKind::ImageNet => Arc::new(ImageNetInfoMapping),
            InfoMappingKind::ImageNetC => Arc::new(ImageNetCInfoMapping),
            InfoMappingKind::Sessions => Arc::new(InfoMappingWithSessions),
        }
    }
}

impl fmt::Display for InfoMappingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InfoMappingKind::ImageNet => "imagenet",
            InfoMappingKind::ImageNetC => "imagenet-c",
            InfoMappingKind::Sessions => "sessions",
        };
        f.write_str(name)
    }
}

impl FromStr for InfoMappingKind {
    type Err = StimulusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "imagenet" => Ok(InfoMappingKind::ImageNet),
            "imagenet-c" | "imagenet_c" => Ok(InfoMappingKind::ImageNetC),
            "sessions" => Ok(InfoMappingKind::Sessions),
            other => Err(StimulusError::InvalidConfig(format!(
                "unknown info mapping '{other}' (expected imagenet, imagenet-c or sessions)"
            ))),
        }
    }
}

/// The mapping used when none is configured.
pub fn default_info_mapping() -> Arc<dyn InfoMapping> {
    InfoMappingKind::default().build()
}

#[cfg(test)]
#[path = "info_mapping_test.rs"]
mod tests;
