use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug, Deserialize)]
pub(crate) struct SubjectRow {
    pub(crate) id: u32,
    pub(crate) name: String,
    #[serde(alias = "department", alias = "discipline")]
    pub(crate) category: String,
    #[serde(default)]
    pub(crate) details: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) marks: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResourceRow {
    pub(crate) id: u32,
    #[serde(alias = "kind")]
    pub(crate) os: String,
    #[serde(default)]
    pub(crate) tools: String,
}

/// Deserialize every row of a headed CSV export, trimming whitespace.
pub(crate) fn parse_rows<T, R>(reader: R) -> Result<Vec<T>, csv::Error>
where
    T: for<'de> Deserialize<'de>,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader.deserialize::<T>().collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}
