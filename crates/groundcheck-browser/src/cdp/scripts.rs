//! Page scripts evaluated over CDP.

use crate::dom::NodeRef;

/// Attribute stamped on every element by [`SNAPSHOT`].
pub const REF_ATTRIBUTE: &str = "data-gc-ref";

/// Serializes the document into the `DomSnapshot` shape.
///
/// Element order is `querySelectorAll('*')` order, i.e. document order, so a
/// parent always precedes its children.
pub const SNAPSHOT: &str = r#"(() => {
  const all = Array.from(document.querySelectorAll('*'));
  const index = new Map();
  all.forEach((el, i) => { index.set(el, i); el.setAttribute('data-gc-ref', String(i)); });
  const attr = (el, name) => el.getAttribute(name) || '';
  const nodes = all.map((el) => {
    const r = el.getBoundingClientRect();
    const full = (el.textContent || '').trim();
    const cls = typeof el.className === 'string' ? el.className : attr(el, 'class');
    const type = el.getAttribute('type');
    return {
      parent: el.parentElement && index.has(el.parentElement) ? index.get(el.parentElement) : null,
      tag: el.tagName.toLowerCase(),
      className: cls,
      elementId: el.id || '',
      name: attr(el, 'name'),
      placeholder: attr(el, 'placeholder'),
      inputType: type === null ? null : type.toLowerCase(),
      href: attr(el, 'href'),
      value: typeof el.value === 'string' ? el.value : '',
      text: full.slice(0, 1024),
      textLen: full.length,
      rect: { x: r.x, y: r.y, width: r.width, height: r.height },
      rendered: el.offsetParent !== null,
      pointerCursor: !!(el.style && el.style.cursor === 'pointer'),
      hasClickHandler: typeof el.onclick === 'function' || el.hasAttribute('onclick'),
      options: el.tagName === 'SELECT'
        ? Array.from(el.options).map((o) => ({ text: (o.textContent || '').trim(), value: o.value }))
        : [],
    };
  });
  return {
    url: location.href,
    viewport: { width: window.innerWidth, height: window.innerHeight },
    nodes,
  };
})()"#;

/// Wraps `body` so it runs with `el` bound to the referenced element.
///
/// Evaluates to `false` when the element is gone, `true` otherwise.
fn with_element(node: NodeRef, body: &str) -> String {
    format!(
        "(() => {{ const el = document.querySelector('[{REF_ATTRIBUTE}=\"{}\"]'); \
         if (!el) return false; {body} return true; }})()",
        node.0
    )
}

pub fn click(node: NodeRef) -> String {
    with_element(node, "el.click();")
}

/// `value` must already be a JSON string literal.
pub fn fill(node: NodeRef, value: &str) -> String {
    with_element(
        node,
        &format!(
            "el.focus(); el.value = {value}; \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }}));"
        ),
    )
}

/// `value` must already be a JSON string literal.
pub fn select(node: NodeRef, value: &str) -> String {
    with_element(
        node,
        &format!("el.value = {value}; el.dispatchEvent(new Event('change', {{ bubbles: true }}));"),
    )
}
