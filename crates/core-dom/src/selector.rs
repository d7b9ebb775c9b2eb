//! Minimal selector engine: compound steps (`tag`, `*`, `#id`, `.class`),
//! descendant (whitespace) and child (`>`) combinators, and `,` groups.

use crate::error::{DomError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SelectorStep {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl SelectorStep {
    pub fn id_only(&self) -> Option<&str> {
        if self.tag.is_none() && self.classes.is_empty() {
            self.id.as_deref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorPart {
    pub step: SelectorStep,
    // Relation to the previous (left) part; `None` for the first.
    pub combinator: Option<Combinator>,
}

pub(crate) fn parse_selector_groups(selector: &str) -> Result<Vec<Vec<SelectorPart>>> {
    let mut groups = Vec::new();
    for group in selector.split(',') {
        groups.push(parse_chain(group, selector)?);
    }
    Ok(groups)
}

fn parse_chain(group: &str, whole: &str) -> Result<Vec<SelectorPart>> {
    let invalid = || DomError::InvalidSelector(whole.to_string());
    let spaced = group.replace('>', " > ");
    let mut parts = Vec::new();
    let mut pending: Option<Combinator> = None;
    for token in spaced.split_whitespace() {
        if token == ">" {
            if parts.is_empty() || pending.is_some() {
                return Err(invalid());
            }
            pending = Some(Combinator::Child);
            continue;
        }
        let step = parse_step(token).ok_or_else(invalid)?;
        let combinator = if parts.is_empty() {
            None
        } else {
            Some(pending.take().unwrap_or(Combinator::Descendant))
        };
        parts.push(SelectorPart { step, combinator });
    }
    if parts.is_empty() || pending.is_some() {
        return Err(invalid());
    }
    Ok(parts)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn parse_step(token: &str) -> Option<SelectorStep> {
    let mut step = SelectorStep::default();
    let mut rest = token;

    if let Some(after) = rest.strip_prefix('*') {
        rest = after;
    } else {
        let end = rest.find(|c: char| !is_ident_char(c)).unwrap_or(rest.len());
        if end > 0 {
            step.tag = Some(rest[..end].to_ascii_lowercase());
            rest = &rest[end..];
        }
    }

    while let Some(sigil) = rest.chars().next() {
        let body = &rest[sigil.len_utf8()..];
        let end = body.find(|c: char| !is_ident_char(c)).unwrap_or(body.len());
        if end == 0 {
            return None;
        }
        let name = body[..end].to_string();
        match sigil {
            '#' if step.id.is_none() => step.id = Some(name),
            '.' => step.classes.push(name),
            _ => return None,
        }
        rest = &body[end..];
    }
    Some(step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compound_step() {
        let groups = parse_selector_groups("div.label.big#title").unwrap();
        let step = &groups[0][0].step;
        assert_eq!(step.tag.as_deref(), Some("div"));
        assert_eq!(step.id.as_deref(), Some("title"));
        assert_eq!(step.classes, vec!["label".to_string(), "big".to_string()]);
    }

    #[test]
    fn parses_combinators_and_groups() {
        let groups = parse_selector_groups("ul > li .name, #x").unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 3);
        assert_eq!(groups[0][1].combinator, Some(Combinator::Child));
        assert_eq!(groups[0][2].combinator, Some(Combinator::Descendant));
        assert_eq!(groups[1][0].step.id_only(), Some("x"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_selector_groups("").is_err());
        assert!(parse_selector_groups("div >").is_err());
        assert!(parse_selector_groups("#").is_err());
        assert!(parse_selector_groups("a[href]").is_err());
        assert!(parse_selector_groups("#a#b").is_err());
    }
}
