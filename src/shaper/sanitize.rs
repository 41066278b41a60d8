//! Display-name sanitization.
//!
//! Names are user-entered and may contain markup. Only the visible text
//! survives: script/style content is dropped, tags are removed and
//! entities are decoded by the HTML parser.

use std::sync::OnceLock;

use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html};

/// Fallback when nothing printable is left of a name.
pub const UNKNOWN_PLAYER: &str = "Unknown Player";

const SKIP_TAGS: &[&str] = &["script", "style", "noscript", "iframe", "svg", "template"];

fn leftover_brackets() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[<>]").expect("static pattern"))
}

fn whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static pattern"))
}

fn collect_text(element: &ElementRef, text: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(t) => {
                text.push_str(&t.text);
            }
            Node::Element(el) => {
                if SKIP_TAGS.contains(&el.name()) {
                    continue;
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text(&child_ref, text);
                }
            }
            _ => {}
        }
    }
}

/// Strip markup from a stored name, leaving plain text.
pub fn sanitize_name(raw: &str) -> String {
    if !raw.contains(['<', '>', '&']) {
        return whitespace().replace_all(raw.trim(), " ").into_owned();
    }

    let fragment = Html::parse_fragment(raw);
    let mut text = String::new();
    collect_text(&fragment.root_element(), &mut text);

    let text = leftover_brackets().replace_all(&text, "");
    whitespace().replace_all(text.trim(), " ").into_owned()
}

/// Sanitized name, or a placeholder when nothing is left.
pub fn display_name(raw: &str) -> String {
    let name = sanitize_name(raw);
    if name.is_empty() {
        UNKNOWN_PLAYER.to_string()
    } else {
        name
    }
}

/// Blank or missing image URLs become `None`.
pub fn normalize_image_url(url: Option<&str>) -> Option<String> {
    url.map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
}
