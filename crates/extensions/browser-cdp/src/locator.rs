//! In-page resolution of [`Locator`]s.
//!
//! Every locator operation is one `Runtime.evaluate` of [`LOCATOR_JS`]
//! applied to the serialized locator. Frame hops are resolved from the top
//! document down and the iframe offsets are added so rectangles come back
//! in top-level viewport pixels.

use serde::Deserialize;
use serde_json::Value;
use webhands_protocols::{Locator, LocatorInfo, PageError};

pub(crate) const LOCATOR_JS: &str = r#"(spec, op, arg) => {
  const resolveIn = (doc, selector) => {
    if (selector.kind === 'xpath') {
      const snap = doc.evaluate(selector.value, doc, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
      const out = [];
      for (let i = 0; i < snap.snapshotLength; i++) out.push(snap.snapshotItem(i));
      return out;
    }
    const hops = selector.value.split('>>').map((s) => s.trim()).filter(Boolean);
    let scopes = [doc];
    for (let i = 0; i < hops.length; i++) {
      const found = [];
      for (const scope of scopes) found.push(...scope.querySelectorAll(hops[i]));
      if (i === hops.length - 1) return found;
      scopes = found.map((el) => el.shadowRoot).filter(Boolean);
    }
    return [];
  };
  const resolve = (loc) => {
    if (!loc.frame) return { elements: resolveIn(document, loc.selector), offsetX: 0, offsetY: 0 };
    const outer = resolve(loc.frame);
    const frameEl = outer.elements[0];
    if (!frameEl || !frameEl.contentDocument) return { elements: [], offsetX: 0, offsetY: 0 };
    const r = frameEl.getBoundingClientRect();
    return {
      elements: resolveIn(frameEl.contentDocument, loc.selector),
      offsetX: outer.offsetX + r.left + frameEl.clientLeft,
      offsetY: outer.offsetY + r.top + frameEl.clientTop,
    };
  };
  const found = resolve(spec);
  const el = found.elements[0];
  const describe = () => {
    if (!el) return { count: 0, tag: null, visible: false, enabled: false, rect: null, fingerprint: null };
    const r = el.getBoundingClientRect();
    const style = el.ownerDocument.defaultView.getComputedStyle(el);
    return {
      count: found.elements.length,
      tag: el.tagName.toLowerCase(),
      visible: r.width > 0 && r.height > 0 && style.visibility !== 'hidden' && style.display !== 'none',
      enabled: !(el.disabled === true || el.getAttribute('aria-disabled') === 'true'),
      rect: { x: r.left + found.offsetX, y: r.top + found.offsetY, width: r.width, height: r.height },
      fingerprint: {
        id: el.getAttribute('id') || null,
        text: Array.from((el.textContent || '').replace(/\s+/g, ' ').trim()).slice(0, 128).join(''),
      },
    };
  };
  if (op === 'inspect') return describe();
  if (!el) return { error: 'not found' };
  const notify = () => {
    el.dispatchEvent(new Event('input', { bubbles: true }));
    el.dispatchEvent(new Event('change', { bubbles: true }));
  };
  if (op === 'scrollIntoView') {
    el.scrollIntoView({ block: 'center', inline: 'center' });
    return describe();
  }
  if (op === 'fill') {
    const view = el.ownerDocument.defaultView;
    const tag = el.tagName.toLowerCase();
    el.focus();
    if (tag === 'input' || tag === 'textarea') {
      const proto = tag === 'input' ? view.HTMLInputElement.prototype : view.HTMLTextAreaElement.prototype;
      Object.getOwnPropertyDescriptor(proto, 'value').set.call(el, arg);
    } else if (el.isContentEditable) {
      el.textContent = arg;
    } else {
      return { error: 'Element is not an <input>, <textarea> or [contenteditable] element' };
    }
    notify();
    return { ok: true };
  }
  if (op === 'select') {
    if (el.tagName.toLowerCase() !== 'select') return { error: 'Element is not a <select> element' };
    const options = Array.from(el.options);
    const opt = options.find((o) => o.label === arg || o.text.trim() === arg)
      || options.find((o) => o.value === arg);
    if (!opt) return { error: 'No option matching "' + arg + '"' };
    el.value = opt.value;
    opt.selected = true;
    notify();
    return { ok: true };
  }
  return { error: 'Unknown locator operation ' + op };
}"#;

/// Operation run against the first match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LocatorOp {
    Inspect,
    ScrollIntoView,
    Fill,
    Select,
}

impl LocatorOp {
    fn as_str(self) -> &'static str {
        match self {
            LocatorOp::Inspect => "inspect",
            LocatorOp::ScrollIntoView => "scrollIntoView",
            LocatorOp::Fill => "fill",
            LocatorOp::Select => "select",
        }
    }
}

/// Expression applying [`LOCATOR_JS`] to one locator.
pub(crate) fn locator_expression(
    locator: &Locator,
    op: LocatorOp,
    arg: Option<&str>,
) -> Result<String, PageError> {
    let spec = serde_json::to_string(locator).map_err(|e| PageError::Script(e.to_string()))?;
    let arg = serde_json::to_string(&arg).map_err(|e| PageError::Script(e.to_string()))?;
    Ok(format!(
        "({})({}, \"{}\", {})",
        LOCATOR_JS,
        spec,
        op.as_str(),
        arg
    ))
}

#[derive(Debug, Deserialize)]
struct MutationResult {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Interpret the value returned by an inspect or scroll operation.
pub(crate) fn parse_info(value: Value, locator: &Locator) -> Result<LocatorInfo, PageError> {
    if value.get("error").is_some() {
        return Err(PageError::ElementNotFound(locator.to_string()));
    }
    serde_json::from_value(value).map_err(|e| PageError::Script(e.to_string()))
}

/// Interpret the value returned by a fill or select operation.
pub(crate) fn parse_mutation(value: Value, locator: &Locator) -> Result<(), PageError> {
    let result: MutationResult =
        serde_json::from_value(value).map_err(|e| PageError::Script(e.to_string()))?;
    match result.error {
        Some(error) if error == "not found" => Err(PageError::ElementNotFound(locator.to_string())),
        Some(error) => Err(PageError::Other(error)),
        None if result.ok => Ok(()),
        None => Err(PageError::Script(format!(
            "locator operation on {} returned no result",
            locator
        ))),
    }
}
