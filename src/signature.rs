use std::collections::HashSet;
use std::fmt::Write;

use scraper::{ElementRef, Html};

/// Distinct element signatures, used as the "no results" blacklist.
pub type SignatureSet = HashSet<String>;

/// Builds the canonical signature of `element`: `tag#id` when it has an id, otherwise
/// `tag` plus its classes sorted and joined with `.`. Identifiers are CSS-escaped, so
/// every signature is itself a valid selector. Empty when the element has no tag name.
pub fn signature(element: ElementRef) -> String {
    let tag = element.value().name();
    if tag.is_empty() {
        return String::new();
    }
    if let Some(id) = non_empty_attr(element, "id") {
        return format!("{tag}#{}", escape_ident(id));
    }

    let mut class_list: Vec<&str> = classes(element).collect();
    if class_list.is_empty() {
        return tag.to_string();
    }
    class_list.sort_unstable();
    let escaped: Vec<String> = class_list.into_iter().map(escape_ident).collect();
    format!("{tag}.{}", escaped.join("."))
}

/// Every distinct signature among the elements inside `<body>`.
pub fn signature_set(document: &Html) -> SignatureSet {
    body_elements(document)
        .map(signature)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Class names in attribute order, split on any whitespace.
pub fn classes<'a>(element: ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    element
        .value()
        .attr("class")
        .unwrap_or_default()
        .split_whitespace()
}

pub fn non_empty_attr<'a>(element: ElementRef<'a>, name: &str) -> Option<&'a str> {
    element.value().attr(name).filter(|v| !v.is_empty())
}

pub fn child_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap)
}

/// Descendants in document order, excluding `element` itself.
pub fn descendant_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.descendants().skip(1).filter_map(ElementRef::wrap)
}

/// All elements under `<body>` in document order (the `body *` scope).
pub fn body_elements(document: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    child_elements(document.root_element())
        .find(|e| e.value().name() == "body")
        .into_iter()
        .flat_map(descendant_elements)
}

/// Number of element ancestors. A direct child of `<body>` has depth 2.
pub fn depth(element: ElementRef) -> usize {
    element
        .ancestors()
        .filter(|node| node.value().is_element())
        .count()
}

/// First of `element` and its ancestors satisfying `pred`.
pub fn closest<'a>(
    element: ElementRef<'a>,
    pred: impl Fn(ElementRef<'a>) -> bool,
) -> Option<ElementRef<'a>> {
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .find(|e| pred(*e))
}

pub fn closest_tag<'a>(element: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    closest(element, |e| e.value().name() == tag)
}

pub fn has_class(element: ElementRef, class: &str) -> bool {
    classes(element).any(|c| c == class)
}

pub fn text_of(element: ElementRef) -> String {
    element.text().collect()
}

/// Path-based locator for `element`, e.g.
/// `html > body > header > form[action="/search"].bar > input[name="q"]`.
///
/// Stops at the first ancestor carrying an id, since that part is already unique.
pub fn selector_path(element: ElementRef) -> String {
    let mut parts = Vec::new();
    let mut reached_root = true;
    let mut current = Some(element);

    while let Some(node) = current {
        let tag = node.value().name();
        if tag == "html" {
            break;
        }

        let mut part = tag.to_string();
        if let Some(id) = non_empty_attr(node, "id") {
            part.push('#');
            part.push_str(&escape_ident(id));
            parts.push(part);
            reached_root = false;
            break;
        }

        if let Some(action) = node.value().attr("action") {
            part.push_str(&format!(r#"[action="{}"]"#, escape_attr(action)));
        } else if let Some(name) = node.value().attr("name") {
            part.push_str(&format!(r#"[name="{}"]"#, escape_attr(name)));
        }
        for class in classes(node) {
            part.push('.');
            part.push_str(&escape_ident(class));
        }

        parts.push(part);
        current = node.parent().and_then(ElementRef::wrap);
    }

    parts.reverse();
    let path = parts.join(" > ");
    if reached_root {
        format!("html > {path}")
    } else {
        path
    }
}

/// Serializes `ident` as a CSS identifier (CSSOM "serialize an identifier").
pub fn escape_ident(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    let lone_dash = ident == "-";
    for (i, ch) in ident.chars().enumerate() {
        let leading_digit = ch.is_ascii_digit() && (i == 0 || (i == 1 && ident.starts_with('-')));
        match ch {
            '\0' => out.push('\u{FFFD}'),
            c if leading_digit || matches!(c, '\u{1}'..='\u{1f}' | '\u{7f}') => {
                let _ = write!(out, "\\{:x} ", c as u32);
            }
            '-' if lone_dash => out.push_str("\\-"),
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() => out.push(c),
            c => {
                out.push('\\');
                out.push(c);
            }
        }
    }
    out
}

fn escape_attr(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
