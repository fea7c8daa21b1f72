/// A telemetry topic to extract, with the fields that propagate into the
/// aligned output. Arbitrary topic columns are never carried along.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSpec {
    pub name: String,
    pub fields: Vec<String>,
}

impl TopicSpec {
    pub fn new<S: Into<String>>(name: S, fields: &[&str]) -> Self {
        Self {
            name: name.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}
