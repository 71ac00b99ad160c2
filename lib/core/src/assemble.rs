use std::collections::BTreeMap;

use crate::AnsweredField;

/// Field id to answer text, serialized with sorted keys
pub type FilledForm = BTreeMap<String, String>;

/// Project answered fields onto a flat map. A later duplicate id overwrites an earlier one.
pub fn assemble(answers: Vec<AnsweredField>) -> FilledForm {
    answers
        .into_iter()
        .map(|answered| (answered.field.id, answered.response))
        .collect()
}
