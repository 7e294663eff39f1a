//! Paginated HTML rendering.
//!
//! Consumes parsed transcript records and emits one HTML document per
//! conversation. Pages are `<div>` sections keyed by `id=pg{N}` inside the
//! same document, navigated with in-page anchors, not separate files.
//!
//! Bodies go through pulldown-cmark, and the resulting event stream is
//! rewritten in place before serialization: images become `<figure>`
//! embeds, anchors to audio files become inline players, `.mp4` anchors
//! become inline video, and bare URLs get open-in-new-tab anchors.
//!
//! The assembled document is pretty-printed last: one tag or text run per
//! line, indentation normalized to four spaces per nesting level.

use std::fs;
use std::path::Path;

use pulldown_cmark::{Event, Parser, Tag, TagEnd, html};
use regex::Regex;

use crate::error::Result;
use crate::report::Reporter;
use crate::transcript::{ParsedMessage, TranscriptParser};

/// Stylesheet written once to the destination root.
pub const STYLE_CSS: &str = include_str!("style.css");

/// Renders conversations into paginated HTML documents.
pub struct HtmlPaginator {
    messages_per_page: i64,
    reaction: Regex,
    quote: Regex,
}

impl HtmlPaginator {
    /// Creates a paginator; `messages_per_page <= 0` means one page.
    pub fn new(messages_per_page: i64) -> Self {
        Self {
            messages_per_page,
            reaction: Regex::new(r"\(- (.*) -\)").unwrap(),
            quote: Regex::new(r"(?s)>\n> (.*)\n>").unwrap(),
        }
    }

    /// Renders one conversation into a complete HTML document.
    pub fn render(&self, name: &str, messages: &[ParsedMessage]) -> String {
        let count = messages.len();
        let page_size = if self.messages_per_page <= 0 {
            count.max(1)
        } else {
            usize::try_from(self.messages_per_page).unwrap_or(usize::MAX)
        };
        // Zero-based index of the final page; a NEXT link must never point
        // past it.
        let last_page = if count == 0 { 0 } else { (count - 1) / page_size };

        let mut content = String::new();
        for (i, msg) in messages.iter().enumerate() {
            if i % page_size == 0 {
                let page = i / page_size;
                if page > 0 {
                    content.push_str("</div>\n");
                }
                content.push_str(&nav(page, last_page));
            }
            content.push_str(&self.message_html(msg));
            content.push('\n');
        }
        if count > 0 {
            content.push_str("</div>\n");
        }

        prettify(&page_shell(name, &content))
    }

    /// Renders every conversation directory under `dest`.
    ///
    /// Each subdirectory's `index.md` is parsed (created empty when
    /// absent) and `index.html` is written next to it.
    pub fn write_all(&self, dest: &Path, reporter: &Reporter) -> Result<()> {
        let parser = TranscriptParser::new();

        let mut dirs: Vec<_> = fs::read_dir(dest)?
            .filter_map(std::result::Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        dirs.sort();

        for dir in dirs {
            let name = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            reporter.detail(format!("\tDoing html for {name}"));

            let md_path = dir.join("index.md");
            if !md_path.exists() {
                fs::File::create(&md_path)?;
            }
            let messages = parser.parse_file(&md_path)?;
            fs::write(dir.join("index.html"), self.render(&name, &messages))?;
        }
        Ok(())
    }

    /// One message block: date/time/sender/quote/body/reactions.
    fn message_html(&self, msg: &ParsedMessage) -> String {
        let sender = msg.sender_name().to_string();
        let (date, time) = msg.date_time();

        let mut body = msg.body.clone();

        let reactions = self
            .reaction
            .captures(&body)
            .map(|c| c[1].replace(',', ""))
            .unwrap_or_default();
        body = self.reaction.replace_all(&body, "").into_owned();

        let quote = self
            .quote
            .captures(&body)
            .map(|c| format!("<div class=\"quote\">{}</div>", &c[1]))
            .unwrap_or_default();
        body = self.quote.replace_all(&body, "").into_owned();

        let body_html = markdown_to_html(&body);

        let class = if sender == "Me" { "msg me" } else { "msg" };
        format!(
            "<div class=\"{class}\"><span class=\"date\">{date}</span>\
             <span class=\"time\">{time}</span>\
             <span class=\"sender\">{sender}</span>{quote}\
             <div class=\"body\">{body_html}</div>\
             <div class=\"reactions\">{reactions}</div></div>"
        )
    }
}

impl Default for HtmlPaginator {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Writes the bundled stylesheet to the destination root.
pub fn write_style(dest: &Path) -> Result<()> {
    fs::write(dest.join("style.css"), STYLE_CSS)?;
    Ok(())
}

/// Converts a message body to HTML, rewriting media on the way.
fn markdown_to_html(source: &str) -> String {
    let events = rewrite_media(Parser::new(source));
    let mut out = String::new();
    html::push_html(&mut out, events.into_iter());
    out
}

/// Walks the markdown event stream and replaces media elements in place.
fn rewrite_media<'a>(parser: Parser<'a>) -> Vec<Event<'a>> {
    let mut out = Vec::new();
    // (src, accumulated alt text) while inside an image element.
    let mut image: Option<(String, String)> = None;
    let mut swallow_link = 0usize;
    // Depth inside ordinary links, where text must not be autolinked.
    let mut plain_link = 0usize;

    for event in parser {
        if let Some((_, alt)) = image.as_mut() {
            match event {
                Event::Text(t) | Event::Code(t) => alt.push_str(&t),
                Event::End(TagEnd::Image) => {
                    let (src, alt) = image.take().expect("image state present");
                    out.push(Event::InlineHtml(figure_html(&src, &alt).into()));
                }
                _ => {}
            }
            continue;
        }
        if swallow_link > 0 {
            match event {
                Event::Start(Tag::Link { .. }) => swallow_link += 1,
                Event::End(TagEnd::Link) => swallow_link -= 1,
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(Tag::Image { dest_url, .. }) => {
                image = Some((dest_url.to_string(), String::new()));
            }
            Event::Start(Tag::Link { dest_url, .. }) if is_audio(&dest_url) => {
                out.push(Event::InlineHtml(audio_html(&dest_url).into()));
                swallow_link = 1;
            }
            Event::Start(Tag::Link { dest_url, .. }) if is_video(&dest_url) => {
                out.push(Event::InlineHtml(video_html(&dest_url).into()));
                swallow_link = 1;
            }
            Event::Start(tag @ Tag::Link { .. }) => {
                plain_link += 1;
                out.push(Event::Start(tag));
            }
            Event::End(TagEnd::Link) => {
                plain_link = plain_link.saturating_sub(1);
                out.push(Event::End(TagEnd::Link));
            }
            Event::Text(text) if plain_link == 0 => autolink_into(&text, &mut out),
            other => out.push(other),
        }
    }
    out
}

/// Splits a text run around bare URLs, anchoring each one.
fn autolink_into(text: &str, out: &mut Vec<Event<'_>>) {
    let mut rest = text;
    loop {
        let hit = match (rest.find("http://"), rest.find("https://")) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        let Some(start) = hit else {
            if !rest.is_empty() {
                out.push(Event::Text(rest.to_string().into()));
            }
            return;
        };
        if start > 0 {
            out.push(Event::Text(rest[..start].to_string().into()));
        }
        let tail = &rest[start..];
        let end = tail.find(char::is_whitespace).unwrap_or(tail.len());
        let url = &tail[..end];
        out.push(Event::InlineHtml(
            format!("<a href='{url}' target='_blank'>{url}</a> ").into(),
        ));
        rest = &tail[end..];
    }
}

fn is_audio(dest: &str) -> bool {
    let lower = dest.to_ascii_lowercase();
    lower.ends_with(".m4a") || lower.ends_with(".aac")
}

fn is_video(dest: &str) -> bool {
    dest.to_ascii_lowercase().contains(".mp4")
}

fn figure_html(src: &str, alt: &str) -> String {
    format!("<figure><img src=\"{src}\" alt=\"{alt}\" loading=\"lazy\"></figure>")
}

fn audio_html(src: &str) -> String {
    format!("<audio controls><source src=\"{src}\"></audio>")
}

fn video_html(src: &str) -> String {
    format!("<video controls><source src=\"{src}\" type=\"video/mp4\"></video>")
}

fn nav(page: usize, last_page: usize) -> String {
    let prev = if page == 0 {
        "PREV".to_string()
    } else {
        format!("<a href=\"#pg{}\">PREV</a>", page - 1)
    };
    let next = if page == last_page {
        "NEXT".to_string()
    } else {
        format!("<a href=\"#pg{}\">NEXT</a>", page + 1)
    };
    format!(
        "<div class=\"page\" id=\"pg{page}\">\n\
         <nav><div class=\"prev\">{prev}</div><div class=\"next\">{next}</div></nav>\n"
    )
}

fn page_shell(name: &str, content: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{name}</title>\n\
         <link rel=\"stylesheet\" href=\"../style.css\">\n\
         </head>\n\
         <body>\n\
         <h1>{name}</h1>\n\
         {content}\
         </body>\n\
         </html>\n"
    )
}

/// Four spaces per nesting level in the final document.
const INDENT: &str = "    ";

/// Elements that never take a closing tag.
const VOID_TAGS: [&str; 7] = ["meta", "link", "img", "br", "hr", "source", "input"];

/// Re-emits a document with one tag or text run per line and leading
/// indentation derived from tag nesting depth alone, so the output shape
/// is independent of how the templates were concatenated.
fn prettify(document: &str) -> String {
    let mut out = String::new();
    let mut depth = 0usize;
    let mut rest = document;

    while let Some(start) = rest.find('<') {
        push_text(&mut out, depth, &rest[..start]);

        let Some(len) = rest[start..].find('>') else {
            push_text(&mut out, depth, &rest[start..]);
            return out;
        };
        let tag = &rest[start..=start + len];
        if tag.starts_with("</") {
            depth = depth.saturating_sub(1);
            push_line(&mut out, depth, tag);
        } else {
            push_line(&mut out, depth, tag);
            if opens_scope(tag) {
                depth += 1;
            }
        }
        rest = &rest[start + len + 1..];
    }
    push_text(&mut out, depth, rest);
    out
}

fn push_text(out: &mut String, depth: usize, text: &str) {
    for line in text.lines() {
        let line = line.trim();
        if !line.is_empty() {
            push_line(out, depth, line);
        }
    }
}

fn push_line(out: &mut String, depth: usize, line: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(line);
    out.push('\n');
}

/// Whether an opening tag increases nesting depth.
fn opens_scope(tag: &str) -> bool {
    if tag.starts_with("<!") || tag.ends_with("/>") {
        return false;
    }
    let name = tag[1..]
        .split(|c: char| c == '>' || c == '/' || c.is_whitespace())
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    !VOID_TAGS.contains(&name.as_str())
}
