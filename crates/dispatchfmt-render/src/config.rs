//! Loading simple formatter config and template variables from files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use dispatchfmt_bbparser::{RenderContext, SimpleFormattersConfig};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::RenderError;

/// Serialization format of a variables file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Toml,
    Yaml,
    Json,
}

impl FileFormat {
    fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("yaml" | "yml") => FileFormat::Yaml,
            Some("json") => FileFormat::Json,
            _ => FileFormat::Toml,
        }
    }

    fn parse<T: DeserializeOwned>(self, path: &Path, text: &str) -> Result<T, RenderError> {
        let parsed = match self {
            FileFormat::Toml => toml::from_str(text).map_err(|err| err.to_string()),
            FileFormat::Yaml => serde_yaml::from_str(text).map_err(|err| err.to_string()),
            FileFormat::Json => serde_json::from_str(text).map_err(|err| err.to_string()),
        };
        parsed.map_err(|reason| RenderError::Parse {
            path: path.to_path_buf(),
            reason,
        })
    }
}

fn read(
    path: &Path,
    not_found: impl FnOnce(PathBuf) -> RenderError,
) -> Result<String, RenderError> {
    std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            not_found(path.to_path_buf())
        } else {
            RenderError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Loads simple formatter declarations from a TOML file.
///
/// ```toml
/// [b]
/// format_string = "[b]%s[/b]"
///
/// [li]
/// format_string = "[*]%s"
/// newline_closes = true
/// ```
pub fn load_simple_formatters(
    path: impl AsRef<Path>,
) -> Result<SimpleFormattersConfig, RenderError> {
    let path = path.as_ref();
    let text = read(path, |path| RenderError::ConfigNotFound { path })?;
    let config: SimpleFormattersConfig = FileFormat::Toml.parse(path, &text)?;
    tracing::debug!(path = %path.display(), count = config.len(), "loaded simple formatter config");
    Ok(config)
}

/// Loads template variables from files, merged in order.
///
/// Later files replace top-level keys of earlier ones. The format of each
/// file follows its extension: `.yaml`/`.yml`, `.json`, anything else is
/// TOML. An empty file contributes nothing.
pub fn load_template_vars<P: AsRef<Path>>(paths: &[P]) -> Result<RenderContext, RenderError> {
    let mut vars = RenderContext::new();

    for path in paths {
        let path = path.as_ref();
        let text = read(path, |path| RenderError::VarsNotFound { path })?;
        if text.trim().is_empty() {
            tracing::warn!(path = %path.display(), "template variable file is empty");
            continue;
        }

        let value: serde_json::Value = FileFormat::from_path(path).parse(path, &text)?;
        match value {
            serde_json::Value::Object(map) => vars.extend(map),
            serde_json::Value::Null => {
                tracing::warn!(path = %path.display(), "template variable file is empty");
            }
            _ => {
                return Err(RenderError::Parse {
                    path: path.to_path_buf(),
                    reason: "top level must be a table of variables".to_string(),
                });
            }
        }
        tracing::debug!(path = %path.display(), "loaded template variable file");
    }

    Ok(vars)
}

/// Info about people (nation, Discord ID, ...) keyed by their name.
///
/// Each entry also carries its own key under `name`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeopleInfo {
    people: BTreeMap<String, Map<String, Value>>,
}

impl PeopleInfo {
    /// Merges the named variable groups, later groups replacing people of
    /// the same name.
    pub fn from_var_groups<S: AsRef<str>>(
        vars: &RenderContext,
        groups: &[S],
    ) -> Result<Self, RenderError> {
        let mut people = BTreeMap::new();

        for group in groups {
            let group = group.as_ref();
            let members = match vars.get(group) {
                Some(Value::Object(members)) => members,
                Some(_) => return Err(invalid_group(group, "people info group must be a table")),
                None => return Err(RenderError::PeopleInfoGroupNotFound(group.to_string())),
            };

            for (name, info) in members {
                let Value::Object(info) = info else {
                    return Err(invalid_group(group, "info for each person must be a table"));
                };
                let mut info = info.clone();
                info.insert("name".to_string(), Value::String(name.clone()));
                people.insert(name.clone(), info);
            }
        }

        tracing::debug!(count = people.len(), "loaded people info");
        Ok(Self { people })
    }

    pub fn get(&self, name: &str) -> Option<&Map<String, Value>> {
        self.people.get(name)
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    fn lookup(&self, name: &Value) -> Result<Value, RenderError> {
        match name {
            Value::String(name) => match self.people.get(name) {
                Some(info) => Ok(Value::Object(info.clone())),
                None => Err(RenderError::PersonNotFound(name.clone())),
            },
            other => Err(RenderError::PersonNotFound(other.to_string())),
        }
    }
}

/// Replaces each name in the personnel groups with that person's info.
///
/// A position may hold one name or a list of names. A list stays a list,
/// with every name replaced.
pub fn replace_personnel_names<S: AsRef<str>>(
    vars: &mut RenderContext,
    personnel_groups: &[S],
    people: &PeopleInfo,
) -> Result<(), RenderError> {
    for group in personnel_groups {
        let group = group.as_ref();
        let positions = match vars.get_mut(group) {
            Some(Value::Object(positions)) => positions,
            Some(_) => return Err(invalid_group(group, "personnel group must be a table")),
            None => return Err(RenderError::PersonnelGroupNotFound(group.to_string())),
        };

        for names in positions.values_mut() {
            *names = match &*names {
                Value::Array(list) => Value::Array(
                    list.iter()
                        .map(|name| people.lookup(name))
                        .collect::<Result<_, _>>()?,
                ),
                name => people.lookup(name)?,
            };
        }
        tracing::debug!(group, "replaced personnel names with info");
    }

    Ok(())
}

fn invalid_group(group: &str, reason: &str) -> RenderError {
    RenderError::InvalidVarGroup {
        group: group.to_string(),
        reason: reason.to_string(),
    }
}

/// Builds [`PeopleInfo`] from `people_info_groups` and applies it to
/// `personnel_groups`.
pub fn resolve_personnel<S: AsRef<str>>(
    vars: &mut RenderContext,
    people_info_groups: &[S],
    personnel_groups: &[S],
) -> Result<(), RenderError> {
    let people = PeopleInfo::from_var_groups(vars, people_info_groups)?;
    replace_personnel_names(vars, personnel_groups, &people)
}
