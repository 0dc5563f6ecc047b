//! Page content as Markdown for extraction prompts.
//!
//! Conversion runs in the page, where the live DOM is available; the result
//! is tidied here.

use once_cell::sync::Lazy;
use regex::Regex;
use webhands_protocols::{BrowserPage, PageError};

/// Walks `document.body` and renders it as Markdown.
pub const MARKDOWN_JS: &str = r#"(() => {
  const SKIP = new Set(['SCRIPT', 'STYLE', 'HEAD', 'NOSCRIPT', 'SVG', 'TEMPLATE', 'IFRAME']);
  const BLOCK = new Set(['P', 'DIV', 'SECTION', 'ARTICLE', 'MAIN', 'HEADER', 'FOOTER',
    'NAV', 'ASIDE', 'FORM', 'TABLE', 'TR', 'BLOCKQUOTE', 'FIGURE', 'UL', 'OL']);
  const squash = (s) => s.replace(/[ \t\r\n]+/g, ' ');

  const render = (node, depth) => {
    if (node.nodeType === Node.TEXT_NODE) return squash(node.textContent || '');
    if (node.nodeType !== Node.ELEMENT_NODE) return '';
    const tag = node.tagName.toUpperCase();
    if (SKIP.has(tag)) return '';
    const inner = () => Array.from(node.childNodes).map((c) => render(c, depth)).join('');

    if (/^H[1-6]$/.test(tag)) {
      const text = inner().trim();
      return text ? `\n\n${'#'.repeat(Number(tag[1]))} ${text}\n\n` : '';
    }
    switch (tag) {
      case 'BR': return '\n';
      case 'HR': return '\n\n* * *\n\n';
      case 'A': {
        const href = (node.getAttribute('href') || '').trim();
        const text = inner().trim();
        if (!href) return text;
        const title = node.title ? ` "${node.title}"` : '';
        return `[${text}](${href}${title})\n`;
      }
      case 'IMG': {
        const src = node.getAttribute('src');
        return src ? `![${node.getAttribute('alt') || ''}](${src})` : '';
      }
      case 'STRONG': case 'B': {
        const text = inner().trim();
        return text ? `**${text}**` : '';
      }
      case 'EM': case 'I': {
        const text = inner().trim();
        return text ? `_${text}_` : '';
      }
      case 'CODE': return '`' + inner() + '`';
      case 'PRE': return '\n\n```\n' + (node.textContent || '') + '\n```\n\n';
      case 'LI': {
        const marker = node.parentElement && node.parentElement.tagName === 'OL'
          ? `${Array.from(node.parentElement.children).indexOf(node) + 1}.` : '-';
        const body = Array.from(node.childNodes).map((c) => render(c, depth + 1)).join('').trim();
        return `\n${'    '.repeat(depth)}${marker} ${body}`;
      }
      case 'TD': case 'TH': return ` ${inner().trim()} |`;
    }
    if (BLOCK.has(tag)) {
      const prefix = tag === 'TR' ? '\n|' : '\n\n';
      return `${prefix}${inner()}\n\n`;
    }
    return inner();
  };

  return document.body ? render(document.body, 0) : '';
})()"#;

static SKIP_TO_CONTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[Skip to Content\]\(#[^)]*\)").expect("skip link regex")
});

static BLANK_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").expect("blank line regex"));

/// Render the current page as Markdown.
pub async fn page_markdown(page: &dyn BrowserPage) -> Result<String, PageError> {
    let value = page.evaluate(MARKDOWN_JS).await?;
    Ok(tidy(value.as_str().unwrap_or_default()))
}

/// Clean up converter output.
///
/// Newlines inside link text are escaped so a link stays one Markdown
/// element, skip-to-content anchors are dropped and runs of blank lines are
/// collapsed.
pub fn tidy(markdown: &str) -> String {
    let escaped = escape_multiline_links(markdown);
    let without_skip = SKIP_TO_CONTENT.replace_all(&escaped, "");
    BLANK_RUNS
        .replace_all(&without_skip, "\n\n")
        .trim()
        .to_string()
}

fn escape_multiline_links(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    let mut open = 0usize;
    for c in markdown.chars() {
        match c {
            '[' => open += 1,
            ']' => open = open.saturating_sub(1),
            _ => {}
        }
        if open > 0 && c == '\n' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
