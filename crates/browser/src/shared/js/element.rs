//! Page-side halves of the locator protocol. Every function takes
//! `(selector, index, childSelector, childIndex)`; `childSelector` may be null.

const LOCATE: &str = r#"
    const nodes = document.querySelectorAll(selector);
    let el = nodes[index];
    if (el && childSelector !== null) {
        el = el.querySelectorAll(childSelector)[childIndex];
    }
"#;

pub fn read_text() -> String {
    format!(
        "(selector, index, childSelector, childIndex) => {{ {} return el ? el.innerText : null; }}",
        LOCATE
    )
}

pub fn activate() -> String {
    format!(
        "(selector, index, childSelector, childIndex) => {{ {} if (!el) return false; el.click(); return true; }}",
        LOCATE
    )
}

pub const READ_ALL_TEXT: &str = r#"
(selector) => Array.from(document.querySelectorAll(selector)).map(e => e.innerText)
"#;
