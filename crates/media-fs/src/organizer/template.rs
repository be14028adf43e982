// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The organization template grammar: literal text, `{Token}`
//! substitutions, and `(...)` conditional groups that collapse — along
//! with one adjacent space — when every token inside resolves empty.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Placeholder for a collapsed conditional group, used internally during
/// rendering to locate (and remove) one adjacent space. Chosen from the
/// Unicode Private Use Area so it can never collide with template text.
const COLLAPSE_MARKER: char = '\u{E000}';

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Literal(String),
    Token(String),
    Conditional(Vec<Node>),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unclosed '{{' in template")]
    UnclosedToken,
    #[error("unclosed '(' in template")]
    UnclosedGroup,
    #[error("unexpected ')' with no matching '(' in template")]
    UnmatchedGroupClose,
    #[error("empty token name '{{}}' in template")]
    EmptyTokenName,
    #[error("rendered path is empty")]
    EmptyResult,
    #[error("rendered path contains an invalid character: {0:?}")]
    InvalidCharacter(char),
}

fn parse(template: &str) -> Result<Vec<Node>, TemplateError> {
    let mut stack: Vec<Vec<Node>> = vec![Vec::new()];
    let mut chars = template.chars().peekable();
    let mut literal = String::new();

    fn flush_literal(literal: &mut String, nodes: &mut Vec<Node>) {
        if !literal.is_empty() {
            nodes.push(Node::Literal(std::mem::take(literal)));
        }
    }

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                flush_literal(&mut literal, stack.last_mut().expect("non-empty stack"));
                let mut name = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                if !closed {
                    return Err(TemplateError::UnclosedToken);
                }
                if name.is_empty() {
                    return Err(TemplateError::EmptyTokenName);
                }
                stack.last_mut().expect("non-empty stack").push(Node::Token(name));
            }
            '(' => {
                flush_literal(&mut literal, stack.last_mut().expect("non-empty stack"));
                stack.push(Vec::new());
            }
            ')' => {
                flush_literal(&mut literal, stack.last_mut().expect("non-empty stack"));
                let group = stack.pop().ok_or(TemplateError::UnmatchedGroupClose)?;
                if stack.is_empty() {
                    return Err(TemplateError::UnmatchedGroupClose);
                }
                stack
                    .last_mut()
                    .expect("non-empty stack")
                    .push(Node::Conditional(group));
            }
            c => literal.push(c),
        }
    }
    if stack.len() != 1 {
        return Err(TemplateError::UnclosedGroup);
    }
    flush_literal(&mut literal, stack.last_mut().expect("non-empty stack"));
    Ok(stack.pop().expect("non-empty stack"))
}

/// Flat input to a template render: a candidate set of resolved
/// `name -> value` pairs, e.g. `HubName`, `Year`, `Format`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizerCandidate {
    pub values: BTreeMap<String, String>,
}

impl OrganizerCandidate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

/// Named token resolvers, registered at startup, matching `spec.md`
/// §4.C's "Token resolvers are registered at startup, keyed by name."
/// Unknown tokens resolve to empty rather than failing the render.
pub struct TokenRegistry {
    resolvers: BTreeMap<String, Box<dyn Fn(&OrganizerCandidate) -> Option<String> + Send + Sync>>,
}

impl std::fmt::Debug for TokenRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRegistry")
            .field("tokens", &self.resolvers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for TokenRegistry {
    fn default() -> Self {
        let mut registry = Self {
            resolvers: BTreeMap::new(),
        };
        for name in [
            "Category", "HubName", "Year", "Format", "Edition", "Ext", "Franchise", "Title", "Author",
        ] {
            registry.register(name, move |candidate: &OrganizerCandidate| {
                candidate.values.get(name).cloned()
            });
        }
        registry
    }
}

impl TokenRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            resolvers: BTreeMap::new(),
        }
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        resolver: impl Fn(&OrganizerCandidate) -> Option<String> + Send + Sync + 'static,
    ) {
        self.resolvers.insert(name.into(), Box::new(resolver));
    }

    #[must_use]
    fn resolve(&self, name: &str, candidate: &OrganizerCandidate) -> String {
        self.resolvers
            .get(name)
            .and_then(|resolver| resolver(candidate))
            .unwrap_or_default()
    }
}

fn is_blank_or_empty(value: &str) -> bool {
    value.trim().is_empty()
}

fn collect_token_names<'a>(nodes: &'a [Node], out: &mut Vec<&'a str>) {
    for node in nodes {
        match node {
            Node::Token(name) => out.push(name),
            Node::Conditional(children) => collect_token_names(children, out),
            Node::Literal(_) => {}
        }
    }
}

fn group_is_empty(children: &[Node], registry: &TokenRegistry, candidate: &OrganizerCandidate) -> bool {
    let mut names = Vec::new();
    collect_token_names(children, &mut names);
    !names.is_empty() && names.iter().all(|name| is_blank_or_empty(&registry.resolve(name, candidate)))
}

fn render_nodes(nodes: &[Node], registry: &TokenRegistry, candidate: &OrganizerCandidate, out: &mut String) {
    for node in nodes {
        match node {
            Node::Literal(text) => out.push_str(text),
            Node::Token(name) => out.push_str(&registry.resolve(name, candidate)),
            Node::Conditional(children) => {
                if group_is_empty(children, registry, candidate) {
                    out.push(COLLAPSE_MARKER);
                } else {
                    out.push('(');
                    render_nodes(children, registry, candidate, out);
                    out.push(')');
                }
            }
        }
    }
}

/// Removes each collapse marker along with one adjacent space: the space
/// immediately preceding it in the already-built output if there is one,
/// otherwise the space immediately following it.
fn strip_collapse_markers(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == COLLAPSE_MARKER {
            if out.ends_with(' ') {
                out.pop();
            } else if chars.get(i + 1) == Some(&' ') {
                i += 1;
            }
            i += 1;
            continue;
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

fn render(template: &str, registry: &TokenRegistry, candidate: &OrganizerCandidate) -> Result<String, TemplateError> {
    let nodes = parse(template)?;
    let mut raw = String::new();
    render_nodes(&nodes, registry, candidate, &mut raw);
    Ok(strip_collapse_markers(&raw))
}

const INVALID_PATH_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*', '\0'];

/// 4.C `CalculatePath` — substitutes `candidate` into `template`, producing
/// a path relative to the library root.
pub fn calculate_path(
    candidate: &OrganizerCandidate,
    template: &str,
    registry: &TokenRegistry,
) -> Result<PathBuf, TemplateError> {
    let rendered = render(template, registry, candidate)?;
    if rendered.trim().is_empty() {
        return Err(TemplateError::EmptyResult);
    }
    if let Some(c) = rendered.chars().find(|c| INVALID_PATH_CHARS.contains(c)) {
        return Err(TemplateError::InvalidCharacter(c));
    }
    Ok(PathBuf::from(rendered))
}

/// 4.C `ValidateTemplate` — evaluates `template` against a synthetic sample
/// token set and verifies the result is a non-empty relative path free of
/// invalid path characters.
pub fn validate_template(template: &str, registry: &TokenRegistry) -> Result<(), String> {
    let sample = OrganizerCandidate::new()
        .with("Category", "Books")
        .with("HubName", "Sample Hub")
        .with("Year", "2001")
        .with("Format", "Epub")
        .with("Edition", "1st")
        .with("Ext", ".epub")
        .with("Franchise", "Sample Franchise")
        .with("Title", "Sample Title")
        .with("Author", "Sample Author");
    let path = calculate_path(&sample, template, registry).map_err(|e| e.to_string())?;
    if path.is_absolute() {
        return Err("template must render a relative path".to_owned());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conditional_groups_collapse_with_adjacent_space() {
        let registry = TokenRegistry::default();
        let candidate = OrganizerCandidate::new()
            .with("Category", "Books")
            .with("HubName", "Dune")
            .with("Format", "Epub")
            .with("Ext", ".epub");
        let path = calculate_path(
            &candidate,
            "{Category}/{HubName} ({Year})/{Format}/{HubName} ({Edition}){Ext}",
            &registry,
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("Books/Dune/Epub/Dune.epub"));
    }

    #[test]
    fn conditional_groups_render_when_non_empty() {
        let registry = TokenRegistry::default();
        let candidate = OrganizerCandidate::new()
            .with("HubName", "Dune")
            .with("Year", "1965")
            .with("Ext", ".epub");
        let path = calculate_path(&candidate, "{HubName} ({Year}){Ext}", &registry).unwrap();
        assert_eq!(path, PathBuf::from("Dune (1965).epub"));
    }

    #[test]
    fn unknown_tokens_resolve_to_empty() {
        let registry = TokenRegistry::default();
        let candidate = OrganizerCandidate::new().with("HubName", "Dune");
        let path = calculate_path(&candidate, "{HubName}{Mystery}.epub", &registry).unwrap();
        assert_eq!(path, PathBuf::from("Dune.epub"));
    }

    #[test]
    fn validate_template_rejects_an_empty_template() {
        let registry = TokenRegistry::default();
        assert!(validate_template("", &registry).is_err());
    }

    #[test]
    fn validate_template_accepts_a_well_formed_template() {
        let registry = TokenRegistry::default();
        assert!(validate_template("{Category}/{HubName} ({Year})/{Format}/{HubName}{Ext}", &registry).is_ok());
    }

    #[test]
    fn unclosed_token_is_an_error() {
        assert_eq!(parse("{HubName"), Err(TemplateError::UnclosedToken));
    }

    #[test]
    fn unmatched_group_close_is_an_error() {
        assert_eq!(parse("{HubName})"), Err(TemplateError::UnmatchedGroupClose));
    }
}
