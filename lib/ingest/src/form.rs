//! Form field discovery in HTML documents built on `scraper`.

use std::path::Path;

use formfill_core::{Error, FieldDescriptor, Result};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Read `path` and extract its form fields. A missing file is an error.
pub fn extract_form_fields(path: impl AsRef<Path>) -> Result<Vec<FieldDescriptor>> {
    let html = std::fs::read_to_string(path.as_ref())?;
    parse_form_fields(&html)
}

/// Every `input`, `select` and `textarea` with a resolvable identity and
/// label, in document order.
///
/// The label comes from a `<label for=..>` matching the field's `id`, then
/// the `placeholder` attribute, then `name`. Identity is `id`, else `name`.
/// Fields missing either are skipped.
pub fn parse_form_fields(html: &str) -> Result<Vec<FieldDescriptor>> {
    let document = Html::parse_document(html);
    let selectors = FormSelectors::new()?;

    let labels: Vec<ElementRef<'_>> = document.select(&selectors.label).collect();

    let mut fields = Vec::new();
    for element in document.select(&selectors.field) {
        let attrs = element.value();
        let id = attrs.attr("id").filter(|id| !id.is_empty());

        let label = id
            .and_then(|id| label_for(&labels, id))
            .or_else(|| fallback_label(&element));
        let identity = id.or_else(|| attrs.attr("name").filter(|name| !name.is_empty()));

        match (identity, label) {
            (Some(identity), Some(label)) if !label.is_empty() => {
                fields.push(FieldDescriptor::new(identity, label));
            }
            _ => debug!("Skipping <{}> without id or label", attrs.name()),
        }
    }

    Ok(fields)
}

struct FormSelectors {
    field: Selector,
    label: Selector,
}

impl FormSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            field: parse_selector("input, select, textarea")?,
            label: parse_selector("label")?,
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::Html(format!("invalid selector {:?}: {}", selector, e)))
}

/// Text of the first label pointing at `id`, without surrounding whitespace or trailing colons.
fn label_for(labels: &[ElementRef<'_>], id: &str) -> Option<String> {
    labels
        .iter()
        .find(|label| label.value().attr("for") == Some(id))
        .map(|label| {
            let text: String = label.text().collect();
            text.trim().trim_end_matches(':').to_string()
        })
}

fn fallback_label(element: &ElementRef<'_>) -> Option<String> {
    let attrs = element.value();
    attrs
        .attr("placeholder")
        .filter(|placeholder| !placeholder.is_empty())
        .or_else(|| attrs.attr("name"))
        .map(|description| description.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn field(id: &str, label: &str) -> FieldDescriptor {
        FieldDescriptor::new(id, label)
    }

    #[test]
    fn test_placeholder_label() {
        let fields = parse_form_fields(r#"<input id="ssn" placeholder="Social Security Number">"#).unwrap();
        assert_eq!(fields, vec![field("ssn", "Social Security Number")]);
    }

    #[test]
    fn test_label_trailing_colon_stripped() {
        let fields = parse_form_fields(r#"<label for="name">Full Name:</label><input id="name">"#).unwrap();
        assert_eq!(fields, vec![field("name", "Full Name")]);
    }

    #[test]
    fn test_label_precedence() {
        let html = r#"
            <form>
              <label for="x"> Gross Income: </label>
              <input id="x" placeholder="Income" name="gross">
              <input id="y" placeholder="Deductions" name="deductions">
              <input id="z" name="tax_paid">
            </form>
        "#;
        let fields = parse_form_fields(html).unwrap();
        assert_eq!(
            fields,
            vec![
                field("x", "Gross Income"),
                field("y", "Deductions"),
                field("z", "tax_paid"),
            ]
        );
    }

    #[test]
    fn test_name_used_as_identity() {
        let html = r#"<select name="filing_status"><option>Single</option></select>"#;
        let fields = parse_form_fields(html).unwrap();
        assert_eq!(fields, vec![field("filing_status", "filing_status")]);
    }

    #[test]
    fn test_nested_label_markup() {
        let html = r#"<label for="notes"><b>Extra</b> notes::</label><textarea id="notes"></textarea>"#;
        let fields = parse_form_fields(html).unwrap();
        assert_eq!(fields, vec![field("notes", "Extra notes")]);
    }

    #[test]
    fn test_fields_without_identity_or_label_dropped() {
        let html = r#"
            <input type="submit" value="Send">
            <input placeholder="No identity">
            <input id="bare">
            <label for="empty">   </label><input id="empty">
            <input id="kept" placeholder="Kept">
        "#;
        let fields = parse_form_fields(html).unwrap();
        assert_eq!(fields, vec![field("kept", "Kept")]);
        assert!(fields.iter().all(|f| !f.id.is_empty() && !f.label.is_empty()));
    }

    #[test]
    fn test_document_order_and_duplicates_kept() {
        let html = r#"
            <textarea id="b" placeholder="Second"></textarea>
            <input id="a" placeholder="First">
            <input id="b" placeholder="Again">
        "#;
        let ids: Vec<String> = parse_form_fields(html).unwrap().into_iter().map(|f| f.id).collect();
        assert_eq!(ids, vec!["b", "a", "b"]);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"<form><label for="fullName">Full Name:</label><input id="fullName">
               <input id="income" placeholder="Total Income"></form>"#
        )
        .unwrap();

        let first = extract_form_fields(file.path()).unwrap();
        let second = extract_form_fields(file.path()).unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = extract_form_fields(dir.path().join("missing.html"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
