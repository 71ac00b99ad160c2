//! Input loaders: the HTML form to fill and the PDF corpus that answers it.

pub mod form;
pub mod pdf;

pub use form::{extract_form_fields, parse_form_fields};
pub use pdf::{load_corpus, load_pdf};
