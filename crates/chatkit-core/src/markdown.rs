//! Untrusted markdown to restricted HTML.
//!
//! Answer text comes from a model and is never trusted. [`render`] parses
//! it with `pulldown-cmark` (tables enabled) and emits only an explicit
//! allow-list of elements with no attributes; raw HTML in the input is
//! stripped to its inner text and escaped. The produced fragment then goes
//! through [`sanitize`], which enforces the same allow-list on the markup
//! itself, so the output stays safe even if the structural stage misses
//! something.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

/// Element names that may appear in rendered output.
const ALLOWED_ELEMENTS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "em", "strong", "ul", "ol", "li", "table", "thead",
    "tbody", "tr", "th", "td", "code", "pre", "br",
];

/// Renders untrusted markdown into a restricted, attribute-free HTML
/// fragment. Pure and stateless per call.
pub fn render(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    let parser = Parser::new_ext(text, options);

    let mut writer = HtmlWriter::new(text.len());
    for event in parser {
        writer.event(event);
    }
    sanitize(&writer.out)
}

struct HtmlWriter {
    out: String,
    /// Header cells render as `th`, body cells as `td`.
    in_table_head: bool,
}

impl HtmlWriter {
    fn new(input_len: usize) -> Self {
        Self {
            out: String::with_capacity(input_len * 2),
            in_table_head: false,
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(&tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => push_escaped(&mut self.out, &text),
            Event::Code(code) => {
                self.out.push_str("<code>");
                push_escaped(&mut self.out, &code);
                self.out.push_str("</code>");
            }
            // Raw HTML is never passed through: keep the inner text only.
            Event::Html(html) => push_escaped(&mut self.out, &strip_tags(&html)),
            Event::InlineHtml(_) => {}
            Event::SoftBreak | Event::HardBreak => self.out.push_str("<br />"),
            Event::Rule
            | Event::FootnoteReference(_)
            | Event::TaskListMarker(_)
            | Event::InlineMath(_)
            | Event::DisplayMath(_) => {}
        }
    }

    fn start_tag(&mut self, tag: &Tag<'_>) {
        match tag {
            Tag::Paragraph => self.out.push_str("<p>"),
            Tag::Heading { level, .. } => {
                self.out.push('<');
                self.out.push_str(heading_name(*level));
                self.out.push('>');
            }
            Tag::CodeBlock(_) => self.out.push_str("<pre><code>"),
            Tag::List(Some(_)) => self.out.push_str("<ol>"),
            Tag::List(None) => self.out.push_str("<ul>"),
            Tag::Item => self.out.push_str("<li>"),
            Tag::Emphasis => self.out.push_str("<em>"),
            Tag::Strong => self.out.push_str("<strong>"),
            Tag::Table(_) => self.out.push_str("<table>"),
            Tag::TableHead => {
                self.in_table_head = true;
                self.out.push_str("<thead><tr>");
            }
            Tag::TableRow => self.out.push_str("<tr>"),
            Tag::TableCell => {
                self.out
                    .push_str(if self.in_table_head { "<th>" } else { "<td>" });
            }
            // Everything else is stripped; inner text still flows through.
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.out.push_str("</p>"),
            TagEnd::Heading(level) => {
                self.out.push_str("</");
                self.out.push_str(heading_name(level));
                self.out.push('>');
            }
            TagEnd::CodeBlock => self.out.push_str("</code></pre>"),
            TagEnd::List(true) => self.out.push_str("</ol>"),
            TagEnd::List(false) => self.out.push_str("</ul>"),
            TagEnd::Item => self.out.push_str("</li>"),
            TagEnd::Emphasis => self.out.push_str("</em>"),
            TagEnd::Strong => self.out.push_str("</strong>"),
            TagEnd::Table => self.out.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.in_table_head = false;
                self.out.push_str("</tr></thead><tbody>");
            }
            TagEnd::TableRow => self.out.push_str("</tr>"),
            TagEnd::TableCell => {
                self.out
                    .push_str(if self.in_table_head { "</th>" } else { "</td>" });
            }
            _ => {}
        }
    }
}

fn heading_name(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

fn push_escaped(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

/// Removes `<...>` tag spans, keeping the text between them.
fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => text.push(c),
            _ => {}
        }
    }
    text
}

/// Defense-in-depth pass over an HTML fragment.
///
/// Re-emits only allow-listed elements, dropping every attribute (which
/// removes inline event handlers and script-URI references wholesale);
/// non-allow-listed tags disappear while their inner text remains; a `<`
/// that does not start a well-formed tag is escaped.
pub fn sanitize(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut rest = fragment;
    while let Some(pos) = rest.find('<') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match parse_tag(tail) {
            Some(tag) => {
                if ALLOWED_ELEMENTS.contains(&tag.name.as_str()) {
                    if tag.closing {
                        out.push_str("</");
                        out.push_str(&tag.name);
                        out.push('>');
                    } else if tag.name == "br" {
                        out.push_str("<br />");
                    } else {
                        out.push('<');
                        out.push_str(&tag.name);
                        out.push('>');
                    }
                }
                rest = &tail[tag.consumed..];
            }
            None => {
                out.push_str("&lt;");
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

struct ParsedTag {
    name: String,
    closing: bool,
    /// Bytes consumed from the input, including both angle brackets.
    consumed: usize,
}

fn parse_tag(s: &str) -> Option<ParsedTag> {
    let end = s.find('>')?;
    let inner = &s[1..end];
    let (closing, inner) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };
    let name: String = inner
        .chars()
        .take_while(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase();
    if name.is_empty() {
        return None;
    }
    Some(ParsedTag {
        name,
        closing,
        consumed: end + 1,
    })
}
