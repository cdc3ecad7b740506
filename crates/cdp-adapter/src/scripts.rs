//! JavaScript expressions evaluated by the Chromium backend.
//!
//! Every expression evaluates to an object with a `status` field: `ok`, `stale`,
//! `no_frame`, `not_interactable`, `not_select`, `no_option` or `error`.

use crate::commands::{By, Locator};
use crate::driver::FrameScope;

pub(crate) const HANDLE_ATTR: &str = "data-vp-handle";

fn literal(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// Expression yielding the document for `scope`, or `null` when it cannot be reached.
pub(crate) fn scope_expression(scope: FrameScope) -> String {
    match scope {
        FrameScope::TopLevel => "document".to_string(),
        FrameScope::Frame(index) => format!(
            "(() => {{ try {{ const f = window.frames[{index}]; return f && f.document ? f.document : null; }} catch (err) {{ return null; }} }})()"
        ),
    }
}

pub(crate) fn query(scope: FrameScope, locator: &Locator, handle_prefix: &str) -> String {
    let collect = match locator.by {
        By::XPath => format!(
            "const snap = doc.evaluate({expr}, doc, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);\n\
             for (let i = 0; i < snap.snapshotLength; i++) {{ const n = snap.snapshotItem(i); if (n && n.nodeType === 1) {{ nodes.push(n); }} }}",
            expr = literal(&locator.expression)
        ),
        By::Css | By::Id => format!(
            "nodes = Array.from(doc.querySelectorAll({sel}));",
            sel = literal(&locator.as_css().unwrap_or_default())
        ),
    };
    format!(
        "(() => {{\n\
           const doc = {scope};\n\
           if (!doc) {{ return {{ status: 'ok', handles: [] }}; }}\n\
           let nodes = [];\n\
           try {{\n{collect}\n}} catch (err) {{ return {{ status: 'error', message: String(err) }}; }}\n\
           const handles = nodes.map((el, i) => {{\n\
             let h = el.getAttribute('{attr}');\n\
             if (!h) {{ h = {prefix} + '-' + i; el.setAttribute('{attr}', h); }}\n\
             return h;\n\
           }});\n\
           return {{ status: 'ok', handles }};\n\
         }})()",
        scope = scope_expression(scope),
        attr = HANDLE_ATTR,
        prefix = literal(handle_prefix),
    )
}

/// Wraps `body` so it runs with `doc` and `el` bound to the element behind `handle`.
pub(crate) fn with_element(scope: FrameScope, handle: &str, body: &str) -> String {
    let selector = format!("[{HANDLE_ATTR}=\"{handle}\"]");
    format!(
        "(() => {{\n\
           const doc = {scope};\n\
           if (!doc) {{ return {{ status: 'no_frame' }}; }}\n\
           const el = doc.querySelector({sel});\n\
           if (!el) {{ return {{ status: 'stale' }}; }}\n\
           try {{\n{body}\n}} catch (err) {{ return {{ status: 'error', message: String(err) }}; }}\n\
         }})()",
        scope = scope_expression(scope),
        sel = literal(&selector),
    )
}

pub(crate) const ELEMENT_STATE: &str = "\
const view = el.ownerDocument.defaultView || window;
const style = view.getComputedStyle(el);
const rect = el.getBoundingClientRect();
const displayed = style.display !== 'none'
  && style.visibility !== 'hidden'
  && parseFloat(style.opacity || '1') > 0
  && (rect.width > 0 || rect.height > 0);
const enabled = !el.disabled && el.getAttribute('aria-disabled') !== 'true';
return { status: 'ok', displayed, enabled };";

pub(crate) const CLICK_POINT: &str = "\
el.scrollIntoView({ block: 'center', inline: 'center' });
const rect = el.getBoundingClientRect();
if (rect.width === 0 && rect.height === 0) {
  return { status: 'not_interactable', reason: 'element has an empty box' };
}
const cx = rect.left + rect.width / 2;
const cy = rect.top + rect.height / 2;
const hit = doc.elementFromPoint(cx, cy);
if (!hit || (hit !== el && !el.contains(hit))) {
  const who = hit ? hit.tagName.toLowerCase() + (hit.id ? '#' + hit.id : '') : 'nothing';
  return { status: 'not_interactable', reason: 'click would land on ' + who };
}
let x = cx;
let y = cy;
const frameEl = doc.defaultView ? doc.defaultView.frameElement : null;
if (frameEl) {
  const fr = frameEl.getBoundingClientRect();
  x += fr.left + frameEl.clientLeft;
  y += fr.top + frameEl.clientTop;
}
return { status: 'ok', x, y };";

pub(crate) const SCRIPT_CLICK: &str = "el.click();\nreturn { status: 'ok' };";

pub(crate) const FOCUS: &str = "el.focus();\nreturn { status: 'ok' };";

pub(crate) const CLEAR: &str = "\
el.focus();
if ('value' in el) {
  const proto = Object.getPrototypeOf(el);
  const desc = Object.getOwnPropertyDescriptor(proto, 'value');
  if (desc && desc.set) { desc.set.call(el, ''); } else { el.value = ''; }
  el.dispatchEvent(new Event('input', { bubbles: true }));
  el.dispatchEvent(new Event('change', { bubbles: true }));
} else if (el.isContentEditable) {
  el.textContent = '';
}
return { status: 'ok' };";

pub(crate) fn select_by_visible_text(text: &str) -> String {
    format!(
        "if (el.tagName.toLowerCase() !== 'select') {{ return {{ status: 'not_select' }}; }}\n\
         const wanted = {wanted}.trim();\n\
         const opt = Array.from(el.options).find(o => o.text.trim() === wanted);\n\
         if (!opt) {{ return {{ status: 'no_option' }}; }}\n\
         el.value = opt.value;\n\
         opt.selected = true;\n\
         el.dispatchEvent(new Event('input', {{ bubbles: true }}));\n\
         el.dispatchEvent(new Event('change', {{ bubbles: true }}));\n\
         return {{ status: 'ok' }};",
        wanted = literal(text)
    )
}

pub(crate) const TEXT: &str = "\
const raw = typeof el.innerText === 'string' ? el.innerText : (el.textContent || '');
return { status: 'ok', value: raw.trim() };";

pub(crate) fn attribute(name: &str) -> String {
    format!(
        "const name = {name};\n\
         const prop = el[name];\n\
         if (prop !== undefined && prop !== null && typeof prop !== 'object' && typeof prop !== 'function') {{\n\
           return {{ status: 'ok', value: String(prop) }};\n\
         }}\n\
         return {{ status: 'ok', value: el.getAttribute(name) }};",
        name = literal(name)
    )
}

pub(crate) fn css_value(property: &str) -> String {
    format!(
        "const view = el.ownerDocument.defaultView || window;\n\
         const value = view.getComputedStyle(el).getPropertyValue({prop});\n\
         return {{ status: 'ok', value: value === '' ? null : value }};",
        prop = literal(property)
    )
}

pub(crate) fn parent(fresh_handle: &str) -> String {
    format!(
        "const p = el.parentElement;\n\
         if (!p) {{ return {{ status: 'ok', handle: null }}; }}\n\
         let h = p.getAttribute('{HANDLE_ATTR}');\n\
         if (!h) {{ h = {fresh}; p.setAttribute('{HANDLE_ATTR}', h); }}\n\
         return {{ status: 'ok', handle: h }};",
        fresh = literal(fresh_handle)
    )
}

pub(crate) const SCROLL_INTO_VIEW: &str = "\
el.scrollIntoView({ block: 'center', inline: 'nearest' });
return { status: 'ok' };";

pub(crate) const IN_VIEWPORT: &str = "\
const view = el.ownerDocument.defaultView || window;
const r = el.getBoundingClientRect();
const value = r.bottom > 0 && r.right > 0 && r.top < view.innerHeight && r.left < view.innerWidth;
return { status: 'ok', value };";

pub(crate) const FRAME_COUNT: &str = "(() => ({ status: 'ok', value: window.frames.length }))()";

pub(crate) const READY_STATE: &str = "(() => ({ status: 'ok', value: document.readyState }))()";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_scope_reaches_through_window_frames() {
        assert_eq!(scope_expression(FrameScope::TopLevel), "document");
        assert!(scope_expression(FrameScope::Frame(2)).contains("window.frames[2]"));
    }

    #[test]
    fn xpath_query_escapes_expression() {
        let script = query(
            FrameScope::TopLevel,
            &Locator::xpath("//span[text()='Pathogenic']"),
            "abc",
        );
        assert!(script.contains("doc.evaluate(\"//span[text()='Pathogenic']\""));
        assert!(script.contains(HANDLE_ATTR));
    }

    #[test]
    fn id_query_uses_attribute_selector() {
        let script = query(FrameScope::TopLevel, &Locator::id("acmg"), "abc");
        assert!(script.contains("querySelectorAll(\"[id=\\\"acmg\\\"]\")"));
    }
}
