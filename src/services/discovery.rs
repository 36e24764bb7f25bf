//! Workspace discovery from root `workspaces` globs.

use super::manifest::{normalize_path, resolve_manifest, ManifestField};
use crate::domain::{Workspace, MANIFEST_FILE};
use crate::error::{WorkspaceError, WorkspaceResult};
use glob::{MatchOptions, Pattern};
use std::path::{Component, Path, PathBuf};

/// Result of expanding a set of workspace globs
#[derive(Debug, Clone, Default)]
pub struct DiscoveredWorkspaces {
    /// Accepted workspaces sorted by name, then path
    pub workspaces: Vec<Workspace>,
}

/// Discover every workspace matched by `workspace_globs` under `root_dir`.
///
/// Patterns are processed in order. A workspace whose path was already
/// accepted is skipped, so the first matching pattern wins; a second
/// workspace with an already accepted name is an error.
pub fn discover_workspaces(
    root_dir: &Path,
    workspace_globs: &[String],
) -> WorkspaceResult<DiscoveredWorkspaces> {
    let root = normalize_path(root_dir);
    let mut workspaces: Vec<Workspace> = Vec::new();

    for pattern in workspace_globs {
        if !validate_pattern(pattern) {
            continue;
        }

        let mut entries = Vec::new();
        for alternative in expand_workspace_pattern(pattern) {
            entries.extend(scan_workspace_glob(&alternative, &root)?);
        }

        for entry in entries {
            let Some(manifest_path) = resolve_manifest_path(&entry) else {
                continue;
            };

            let manifest = resolve_manifest(
                &manifest_path,
                &root,
                &[ManifestField::Name, ManifestField::Scripts],
            )?;

            let Some(path) = manifest_path
                .parent()
                .and_then(|dir| relative_path(&root, dir))
            else {
                tracing::warn!(
                    "Skipping {} matched by {:?}: not inside {}",
                    manifest_path.display(),
                    pattern,
                    root.display()
                );
                continue;
            };

            let workspace = Workspace {
                name: manifest.name.clone(),
                path,
                match_pattern: pattern.clone(),
                manifest,
            };

            if validate_workspace(&workspace, &workspaces)? {
                tracing::debug!(
                    "Found workspace {:?} at {:?} (pattern {:?})",
                    workspace.name,
                    workspace.path,
                    pattern
                );
                workspaces.push(workspace);
            }
        }
    }

    workspaces.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));

    Ok(DiscoveredWorkspaces { workspaces })
}

fn validate_pattern(pattern: &str) -> bool {
    if pattern.starts_with('!') {
        tracing::warn!(
            "Negation patterns are not supported by Bun workspaces: {:?}",
            pattern
        );
        return false;
    }
    true
}

/// Returns `false` for an already known path, errors on a duplicate name.
fn validate_workspace(workspace: &Workspace, accepted: &[Workspace]) -> WorkspaceResult<bool> {
    if accepted.iter().any(|ws| ws.path == workspace.path) {
        return Ok(false);
    }

    if accepted.iter().any(|ws| ws.name == workspace.name) {
        return Err(WorkspaceError::DuplicateWorkspaceName(format!(
            "Duplicate workspace name found: {:?}",
            workspace.name
        )));
    }

    Ok(true)
}

/// Rewrite a workspace pattern into the plain globs `glob` understands.
///
/// `{a,b}` groups become one glob per alternative, and a run of stars
/// inside a path segment other than `**` matches like a single `*`.
fn expand_workspace_pattern(pattern: &str) -> Vec<String> {
    let mut expanded: Vec<String> = Vec::new();
    for alternative in expand_braces(pattern) {
        let alternative = collapse_stars(&alternative);
        if !expanded.contains(&alternative) {
            expanded.push(alternative);
        }
    }
    expanded
}

/// Groups without a top-level comma, like `{a}`, are kept literally.
fn expand_braces(pattern: &str) -> Vec<String> {
    let mut from = 0;
    while let Some(offset) = pattern[from..].find('{') {
        let open = from + offset;
        if let Some((close, commas)) = brace_group(pattern, open) {
            if !commas.is_empty() {
                let prefix = &pattern[..open];
                let suffix = &pattern[close + 1..];
                let bounds: Vec<usize> = std::iter::once(open)
                    .chain(commas)
                    .chain(std::iter::once(close))
                    .collect();
                return bounds
                    .windows(2)
                    .flat_map(|pair| {
                        let choice = &pattern[pair[0] + 1..pair[1]];
                        expand_braces(&format!("{}{}{}", prefix, choice, suffix))
                    })
                    .collect();
            }
        }
        from = open + 1;
    }
    vec![pattern.to_string()]
}

/// Closing brace and top-level comma positions of the group opened at `open`
fn brace_group(pattern: &str, open: usize) -> Option<(usize, Vec<usize>)> {
    let mut depth = 0usize;
    let mut commas = Vec::new();
    for (index, c) in pattern[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((open + index, commas));
                }
            }
            ',' if depth == 1 => commas.push(open + index),
            _ => {}
        }
    }
    None
}

fn collapse_stars(pattern: &str) -> String {
    pattern
        .split('/')
        .map(|segment| {
            if segment == "**" {
                return segment.to_string();
            }
            let mut collapsed = String::with_capacity(segment.len());
            for c in segment.chars() {
                if c == '*' && collapsed.ends_with('*') {
                    continue;
                }
                collapsed.push(c);
            }
            collapsed
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Expand `pattern` relative to `root`. Entries come back sorted per
/// directory, so the order is stable for a given filesystem state.
fn scan_workspace_glob(pattern: &str, root: &Path) -> WorkspaceResult<Vec<PathBuf>> {
    let pattern = pattern.trim_end_matches('/');
    let invalid = |e: glob::PatternError| {
        WorkspaceError::InvalidWorkspacePattern(format!(
            "Invalid workspace pattern {:?}: {}",
            pattern, e
        ))
    };

    // Checked on its own so error positions point into the user's pattern
    Pattern::new(pattern).map_err(invalid)?;

    let escaped_root = Pattern::escape(&root.to_string_lossy());
    let full_pattern = Path::new(&escaped_root).join(pattern);

    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };

    let paths = glob::glob_with(&full_pattern.to_string_lossy(), options).map_err(invalid)?;

    let mut entries = Vec::new();
    for path in paths {
        match path {
            Ok(path) => entries.push(normalize_path(&path)),
            Err(e) => {
                tracing::warn!("Skipping unreadable path while matching {:?}: {}", pattern, e)
            }
        }
    }
    Ok(entries)
}

/// The entry itself when it is a manifest, else a manifest directly inside it.
fn resolve_manifest_path(entry: &Path) -> Option<PathBuf> {
    if entry.file_name().is_some_and(|name| name == MANIFEST_FILE) {
        return Some(entry.to_path_buf());
    }

    let candidate = entry.join(MANIFEST_FILE);
    candidate.is_file().then_some(candidate)
}

fn relative_path(root: &Path, dir: &Path) -> Option<String> {
    let relative = dir.strip_prefix(root).ok()?;
    let parts = relative
        .components()
        .map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}
