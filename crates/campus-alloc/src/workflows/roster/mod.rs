//! CSV import of subject and resource records.

mod parser;

use crate::workflows::allocation::{
    ResourceId, ResourceKind, ResourceRecord, SubjectId, SubjectRecord, UnknownResourceKind,
};
use std::io::Read;
use std::path::Path;

use parser::{ResourceRow, SubjectRow};

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    UnknownKind {
        resource: u32,
        source: UnknownResourceKind,
    },
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read roster export: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid roster CSV data: {}", err),
            RosterImportError::UnknownKind { resource, source } => {
                write!(f, "computer {} has an {}", resource, source)
            }
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
            RosterImportError::UnknownKind { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Loads roster exports with `id,name,category,details,marks` subject
/// columns and `id,os,tools` resource columns.
pub struct RosterImporter;

impl RosterImporter {
    pub fn subjects_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<SubjectRecord>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::subjects_from_reader(file)
    }

    pub fn subjects_from_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<SubjectRecord>, RosterImportError> {
        let rows: Vec<SubjectRow> = parser::parse_rows(reader)?;
        Ok(rows
            .into_iter()
            .map(|row| SubjectRecord {
                id: SubjectId(row.id),
                name: row.name,
                category: row.category,
                details: row.details,
                marks: row.marks,
            })
            .collect())
    }

    pub fn resources_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<ResourceRecord>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::resources_from_reader(file)
    }

    pub fn resources_from_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<ResourceRecord>, RosterImportError> {
        let rows: Vec<ResourceRow> = parser::parse_rows(reader)?;
        rows.into_iter()
            .map(|row| {
                let kind = row.os.parse::<ResourceKind>().map_err(|source| {
                    RosterImportError::UnknownKind {
                        resource: row.id,
                        source,
                    }
                })?;
                Ok(ResourceRecord {
                    id: ResourceId(row.id),
                    kind,
                    tools: row.tools,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_subject_roster_with_blank_marks() {
        let csv = "id,name,department,details,marks\n\
                   1,Alice,Computer Science,High School Transcript: Excellent,A+\n\
                   2,Bob,Electrical Engineering,,\n";

        let subjects =
            RosterImporter::subjects_from_reader(Cursor::new(csv)).expect("roster parses");

        assert_eq!(subjects.len(), 2);
        assert_eq!(subjects[0].id, SubjectId(1));
        assert_eq!(subjects[0].category, "Computer Science");
        assert_eq!(subjects[0].marks.as_deref(), Some("A+"));
        assert_eq!(subjects[1].marks, None);
        assert!(subjects[1].details.is_empty());
    }

    #[test]
    fn parses_resource_kinds_case_insensitively() {
        let csv = "id,os,tools\n1,linux,Programming Tools\n2, WINDOWS ,Office Suite\n";

        let resources =
            RosterImporter::resources_from_reader(Cursor::new(csv)).expect("resources parse");

        assert_eq!(resources[0].kind, ResourceKind::Linux);
        assert_eq!(resources[1].kind, ResourceKind::Windows);
        assert_eq!(resources[1].tools, "Office Suite");
    }

    #[test]
    fn rejects_unknown_operating_system() {
        let csv = "id,os,tools\n7,Plan9,Acme\n";

        let err = RosterImporter::resources_from_reader(Cursor::new(csv))
            .expect_err("unknown kind rejected");

        match err {
            RosterImportError::UnknownKind { resource, .. } => assert_eq!(resource, 7),
            other => panic!("expected unknown kind error, got {other:?}"),
        }
    }

    #[test]
    fn surfaces_malformed_rows_as_csv_errors() {
        let csv = "id,name,category\nnot-a-number,Alice,Physics\n";

        let err = RosterImporter::subjects_from_reader(Cursor::new(csv))
            .expect_err("malformed id rejected");

        assert!(matches!(err, RosterImportError::Csv(_)));
    }
}
