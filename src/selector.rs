use crate::dom::{Dom, NodeId, has_class};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectorAttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
    StartsWith { key: String, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SelectorStep {
    pub(crate) tag: Option<String>,
    pub(crate) universal: bool,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) attrs: Vec<SelectorAttrCondition>,
}

impl SelectorStep {
    fn id_only(&self) -> Option<&str> {
        if !self.universal && self.tag.is_none() && self.classes.is_empty() && self.attrs.is_empty()
        {
            self.id.as_deref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SelectorCombinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorPart {
    pub(crate) step: SelectorStep,
    // Relation to previous (left) selector part.
    pub(crate) combinator: Option<SelectorCombinator>,
}

pub(crate) fn query_selector(dom: &Dom, selector: &str) -> Result<Option<NodeId>> {
    Ok(query_selector_all(dom, selector)?.into_iter().next())
}

pub(crate) fn query_selector_all(dom: &Dom, selector: &str) -> Result<Vec<NodeId>> {
    let groups = parse_selector_groups(selector)?;

    if groups.len() == 1 && groups[0].len() == 1 {
        if let Some(id) = groups[0][0].step.id_only() {
            return Ok(dom.by_id(id).into_iter().collect());
        }
    }

    Ok(matching_nodes(dom, dom.all_element_nodes(), &groups))
}

pub(crate) fn query_selector_from(
    dom: &Dom,
    scope: NodeId,
    selector: &str,
) -> Result<Option<NodeId>> {
    Ok(query_selector_all_from(dom, scope, selector)?
        .into_iter()
        .next())
}

pub(crate) fn query_selector_all_from(
    dom: &Dom,
    scope: NodeId,
    selector: &str,
) -> Result<Vec<NodeId>> {
    let groups = parse_selector_groups(selector)?;
    Ok(matching_nodes(dom, dom.descendant_elements(scope), &groups))
}

fn matching_nodes(dom: &Dom, candidates: Vec<NodeId>, groups: &[Vec<SelectorPart>]) -> Vec<NodeId> {
    candidates
        .into_iter()
        .filter(|node| groups.iter().any(|chain| matches_chain(dom, *node, chain)))
        .collect()
}

fn matches_chain(dom: &Dom, node: NodeId, parts: &[SelectorPart]) -> bool {
    let Some((last, rest)) = parts.split_last() else {
        return false;
    };
    if !step_matches(dom, node, &last.step) {
        return false;
    }
    if rest.is_empty() {
        return true;
    }

    match last.combinator {
        Some(SelectorCombinator::Child) => dom
            .parent(node)
            .map(|parent| dom.element(parent).is_some() && matches_chain(dom, parent, rest))
            .unwrap_or(false),
        _ => {
            let mut cursor = dom.parent(node);
            while let Some(current) = cursor {
                if dom.element(current).is_some() && matches_chain(dom, current, rest) {
                    return true;
                }
                cursor = dom.parent(current);
            }
            false
        }
    }
}

fn step_matches(dom: &Dom, node: NodeId, step: &SelectorStep) -> bool {
    let Some(element) = dom.element(node) else {
        return false;
    };

    if let Some(tag) = &step.tag {
        if !element.tag_name.eq_ignore_ascii_case(tag) {
            return false;
        }
    }

    if let Some(id) = &step.id {
        if element.attrs.get("id").map(String::as_str) != Some(id.as_str()) {
            return false;
        }
    }

    for class in &step.classes {
        if !has_class(element, class) {
            return false;
        }
    }

    for condition in &step.attrs {
        let matched = match condition {
            SelectorAttrCondition::Exists { key } => element.attrs.contains_key(key),
            SelectorAttrCondition::Eq { key, value } => {
                element.attrs.get(key).map(String::as_str) == Some(value.as_str())
            }
            SelectorAttrCondition::StartsWith { key, value } => element
                .attrs
                .get(key)
                .map(|actual| actual.starts_with(value))
                .unwrap_or(false),
        };
        if !matched {
            return false;
        }
    }

    true
}

pub(crate) fn parse_selector_groups(selector: &str) -> Result<Vec<Vec<SelectorPart>>> {
    let groups = split_selector_groups(selector)?;
    let mut parsed = Vec::with_capacity(groups.len());
    for group in groups {
        parsed.push(parse_selector_chain(&group)?);
    }
    Ok(parsed)
}

fn split_selector_groups(selector: &str) -> Result<Vec<String>> {
    let mut groups = Vec::new();
    let mut current = String::new();
    let mut bracket_depth = 0usize;

    for ch in selector.chars() {
        match ch {
            '[' => {
                bracket_depth += 1;
                current.push(ch);
            }
            ']' => {
                if bracket_depth == 0 {
                    return Err(Error::UnsupportedSelector(selector.into()));
                }
                bracket_depth -= 1;
                current.push(ch);
            }
            ',' if bracket_depth == 0 => {
                if current.trim().is_empty() {
                    return Err(Error::UnsupportedSelector(selector.into()));
                }
                groups.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }

    if bracket_depth > 0 || current.trim().is_empty() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    groups.push(current);
    Ok(groups)
}

fn parse_selector_chain(selector: &str) -> Result<Vec<SelectorPart>> {
    let selector = selector.trim();
    if selector.is_empty() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }

    let tokens = tokenize_selector(selector)?;
    let mut parts: Vec<SelectorPart> = Vec::new();
    let mut pending_combinator: Option<SelectorCombinator> = None;

    for token in tokens {
        if token == ">" {
            if pending_combinator.is_some() || parts.is_empty() {
                return Err(Error::UnsupportedSelector(selector.into()));
            }
            pending_combinator = Some(SelectorCombinator::Child);
            continue;
        }

        let step = parse_selector_step(&token, selector)?;
        let combinator = if parts.is_empty() {
            None
        } else {
            Some(
                pending_combinator
                    .take()
                    .unwrap_or(SelectorCombinator::Descendant),
            )
        };
        parts.push(SelectorPart { step, combinator });
    }

    if parts.is_empty() || pending_combinator.is_some() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }

    Ok(parts)
}

fn tokenize_selector(selector: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut bracket_depth = 0usize;
    let mut quote: Option<char> = None;

    for ch in selector.chars() {
        if let Some(q) = quote {
            current.push(ch);
            if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '\'' | '"' if bracket_depth > 0 => {
                quote = Some(ch);
                current.push(ch);
            }
            '[' => {
                bracket_depth += 1;
                current.push(ch);
            }
            ']' => {
                if bracket_depth == 0 {
                    return Err(Error::UnsupportedSelector(selector.into()));
                }
                bracket_depth -= 1;
                current.push(ch);
            }
            '>' if bracket_depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push(">".into());
            }
            ch if ch.is_whitespace() && bracket_depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }

    if quote.is_some() || bracket_depth > 0 {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    if tokens.is_empty() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    Ok(tokens)
}

fn parse_selector_step(token: &str, selector: &str) -> Result<SelectorStep> {
    let chars = token.chars().collect::<Vec<_>>();
    let mut step = SelectorStep::default();
    let mut i = 0usize;

    if chars.first() == Some(&'*') {
        step.universal = true;
        i += 1;
    } else if chars.first().map(|ch| is_ident_char(*ch)).unwrap_or(false) {
        let start = i;
        while i < chars.len() && is_ident_char(chars[i]) {
            i += 1;
        }
        step.tag = Some(
            chars[start..i]
                .iter()
                .collect::<String>()
                .to_ascii_lowercase(),
        );
    }

    while i < chars.len() {
        match chars[i] {
            '#' => {
                i += 1;
                let ident = take_ident(&chars, &mut i);
                if ident.is_empty() || step.id.is_some() {
                    return Err(Error::UnsupportedSelector(selector.into()));
                }
                step.id = Some(ident);
            }
            '.' => {
                i += 1;
                let ident = take_ident(&chars, &mut i);
                if ident.is_empty() {
                    return Err(Error::UnsupportedSelector(selector.into()));
                }
                step.classes.push(ident);
            }
            '[' => {
                i += 1;
                let start = i;
                let mut quote: Option<char> = None;
                while i < chars.len() {
                    if let Some(q) = quote {
                        if chars[i] == q {
                            quote = None;
                        }
                    } else if chars[i] == '\'' || chars[i] == '"' {
                        quote = Some(chars[i]);
                    } else if chars[i] == ']' {
                        break;
                    }
                    i += 1;
                }
                if i >= chars.len() {
                    return Err(Error::UnsupportedSelector(selector.into()));
                }
                let inner = chars[start..i].iter().collect::<String>();
                i += 1;
                step.attrs.push(parse_attr_condition(&inner, selector)?);
            }
            _ => return Err(Error::UnsupportedSelector(selector.into())),
        }
    }

    if !step.universal
        && step.tag.is_none()
        && step.id.is_none()
        && step.classes.is_empty()
        && step.attrs.is_empty()
    {
        return Err(Error::UnsupportedSelector(selector.into()));
    }

    Ok(step)
}

fn parse_attr_condition(inner: &str, selector: &str) -> Result<SelectorAttrCondition> {
    let inner = inner.trim();
    let Some(eq) = inner.find('=') else {
        let key = inner.to_ascii_lowercase();
        if key.is_empty() || !key.chars().all(is_ident_char) {
            return Err(Error::UnsupportedSelector(selector.into()));
        }
        return Ok(SelectorAttrCondition::Exists { key });
    };

    let (raw_key, starts_with) = if eq > 0 && inner.as_bytes()[eq - 1] == b'^' {
        (&inner[..eq - 1], true)
    } else {
        (&inner[..eq], false)
    };

    let key = raw_key.trim().to_ascii_lowercase();
    if key.is_empty() || !key.chars().all(is_ident_char) {
        return Err(Error::UnsupportedSelector(selector.into()));
    }

    let value = unquote_attr_value(inner[eq + 1..].trim());

    if starts_with {
        Ok(SelectorAttrCondition::StartsWith { key, value })
    } else {
        Ok(SelectorAttrCondition::Eq { key, value })
    }
}

fn unquote_attr_value(value: &str) -> String {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'\'' || bytes[0] == b'"')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        value[1..value.len() - 1].to_string()
    } else {
        value.to_string()
    }
}

fn take_ident(chars: &[char], i: &mut usize) -> String {
    let start = *i;
    while *i < chars.len() && is_ident_char(chars[*i]) {
        *i += 1;
    }
    chars[start..*i].iter().collect()
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}
