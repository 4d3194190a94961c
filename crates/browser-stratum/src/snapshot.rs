use chromiumoxide::Page;
use serde::Deserialize;

use crate::errors::BrowserError;
use crate::model::{BrowserElement, ElementLocator};

/// Enumerates candidate elements matching a fixed selector set, dedups,
/// and returns the raw per-element data needed to build CSS selectors and
/// the ref table. The visibility rule and label priority are spec.md
/// §4.C3's verbatim rules, implemented in-page for a single round trip.
const SNAPSHOT_SCRIPT: &str = r#"
(() => {
    const interactiveOnly = %INTERACTIVE%;
    const selectorSet = [
        'a[href]', 'button', 'input:not([type="hidden"])', 'select', 'textarea',
        '[role="button"]', '[role="link"]', '[role="checkbox"]', '[role="radio"]',
        '[role="tab"]', '[role="menuitem"]', '[role="combobox"]', '[role="textbox"]',
        '[contenteditable="true"]',
    ];
    const isVisible = (el) => {
        const rect = el.getBoundingClientRect();
        if (rect.width <= 0 || rect.height <= 0) return false;
        const style = window.getComputedStyle(el);
        if (style.display === 'none') return false;
        if (style.visibility === 'hidden') return false;
        if (parseFloat(style.opacity) === 0) return false;
        return true;
    };
    const computeLabel = (el) => {
        const ariaLabel = el.getAttribute('aria-label');
        if (ariaLabel && ariaLabel.trim()) return ariaLabel.trim();
        if (el.id) {
            const labelEl = document.querySelector('label[for="' + CSS.escape(el.id) + '"]');
            if (labelEl && labelEl.innerText.trim()) return labelEl.innerText.trim();
        }
        const placeholder = el.getAttribute('placeholder');
        if (placeholder && placeholder.trim()) return placeholder.trim();
        if (el.title && el.title.trim()) return el.title.trim();
        const text = (el.innerText || el.textContent || '').trim();
        return text;
    };
    const stableSelector = (el) => {
        const testId = el.getAttribute('data-testid');
        if (testId) return '[data-testid="' + CSS.escape(testId) + '"]';
        if (el.id) return '#' + CSS.escape(el.id);
        const parent = el.parentElement;
        if (parent && parent.id) {
            const siblings = Array.from(parent.children).filter(c => c.tagName === el.tagName);
            const idx = siblings.indexOf(el) + 1;
            return '#' + CSS.escape(parent.id) + ' > ' + el.tagName.toLowerCase() + ':nth-of-type(' + idx + ')';
        }
        for (const attr of ['name', 'type', 'aria-label']) {
            const v = el.getAttribute(attr);
            if (v) return el.tagName.toLowerCase() + '[' + attr + '="' + CSS.escape(v) + '"]';
        }
        const all = Array.from(document.querySelectorAll(el.tagName.toLowerCase()));
        return el.tagName.toLowerCase() + ':nth-of-type(' + (all.indexOf(el) + 1) + ')';
    };

    const seen = new Set();
    const out = [];
    for (const sel of selectorSet) {
        const nodes = Array.from(document.querySelectorAll(sel));
        for (const el of nodes) {
            if (seen.has(el)) continue;
            seen.add(el);
            const disabled = el.disabled === true || el.getAttribute('aria-disabled') === 'true';
            if (interactiveOnly && (!isVisible(el) || disabled)) continue;
            const role = el.getAttribute('role') || el.tagName.toLowerCase();
            let label = computeLabel(el);
            if (label.length > 80) label = label.slice(0, 80);
            out.push({
                selector: stableSelector(el),
                role: role,
                label: label.length > 0 ? label.slice(0, 100) : null,
                tag: el.tagName.toLowerCase(),
            });
        }
    }
    return { url: document.location.href, title: document.title, elements: out };
})()
"#;

#[derive(Debug, Deserialize)]
struct RawElement {
    selector: String,
    role: String,
    label: Option<String>,
    tag: String,
}

#[derive(Debug, Deserialize)]
struct RawSnapshot {
    url: String,
    title: String,
    elements: Vec<RawElement>,
}

pub async fn collect_raw_snapshot(
    page: &Page,
    interactive_only: bool,
) -> Result<(String, String, Vec<(ElementLocator, String, Option<String>, String)>), BrowserError>
{
    let script = SNAPSHOT_SCRIPT.replace("%INTERACTIVE%", if interactive_only { "true" } else { "false" });
    let result = page
        .evaluate(script)
        .await
        .map_err(|err| BrowserError::CdpIo(err.to_string()))?;
    let raw: RawSnapshot = result
        .into_value()
        .map_err(|err| BrowserError::CdpIo(err.to_string()))?;

    let entries = raw
        .elements
        .into_iter()
        .map(|el| {
            (
                ElementLocator {
                    selector: el.selector,
                    owning_page_url: raw.url.clone(),
                },
                el.role,
                el.label,
                el.tag,
            )
        })
        .collect();

    Ok((raw.url, raw.title, entries))
}

pub fn to_element_records(
    refs: Vec<String>,
    entries: Vec<(ElementLocator, String, Option<String>, String)>,
) -> Vec<BrowserElement> {
    refs.into_iter()
        .zip(entries)
        .map(|(reference, (_, role, label, tag))| BrowserElement {
            reference,
            role,
            label,
            tag,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_substitutes_interactive_flag() {
        let rendered = SNAPSHOT_SCRIPT.replace("%INTERACTIVE%", "true");
        assert!(rendered.contains("const interactiveOnly = true;"));
    }
}
