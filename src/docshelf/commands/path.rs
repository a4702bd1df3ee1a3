use crate::commands::CmdResult;
use crate::engine::SyncEngine;
use crate::error::{Result, ShelfError};
use crate::model::DocumentRecord;
use crate::remote::RemoteSource;
use crate::store::SnapshotStore;

/// Resolves a document by file token (exact), falling back to a
/// case-insensitive title substring, and returns its cached path.
pub fn run<R, S>(engine: &SyncEngine<R, S>, query: &str) -> Result<CmdResult>
where
    R: RemoteSource,
    S: SnapshotStore + 'static,
{
    let documents = engine.documents();
    let doc = find_document(&documents, query)?;
    let path = engine.open_path(doc)?;
    Ok(CmdResult::default().with_paths(vec![path]))
}

pub fn find_document<'a>(documents: &'a [DocumentRecord], query: &str) -> Result<&'a DocumentRecord> {
    let query = query.trim();
    if let Some(doc) = documents.iter().find(|d| d.file_name == query) {
        return Ok(doc);
    }

    let needle = query.to_lowercase();
    let matches: Vec<&DocumentRecord> = documents
        .iter()
        .filter(|d| d.title.to_lowercase().contains(&needle))
        .collect();

    match matches.as_slice() {
        [] => Err(ShelfError::DocumentNotFound(query.to_string())),
        [doc] => Ok(doc),
        many => {
            let names: Vec<&str> = many.iter().map(|d| d.file_name.as_str()).collect();
            Err(ShelfError::Api(format!(
                "'{}' matches several documents: {}",
                query,
                names.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs() -> Vec<DocumentRecord> {
        vec![
            DocumentRecord::new("1", "Planta general", "P-2044_DW_01"),
            DocumentRecord::new("2", "Planta alta", "P-2044_DW_02"),
            DocumentRecord::new("3", "Memoria de cálculo", "MC_01"),
        ]
    }

    #[test]
    fn exact_file_name_wins() {
        let docs = docs();
        assert_eq!(find_document(&docs, "MC_01").unwrap().remote_id, "3");
    }

    #[test]
    fn unique_title_substring_matches() {
        let docs = docs();
        assert_eq!(find_document(&docs, "memoria").unwrap().remote_id, "3");
    }

    #[test]
    fn ambiguous_title_is_an_error() {
        let docs = docs();
        let err = find_document(&docs, "planta").unwrap_err();
        assert!(err.to_string().contains("P-2044_DW_01, P-2044_DW_02"));
    }

    #[test]
    fn no_match_is_not_found() {
        let docs = docs();
        assert!(matches!(
            find_document(&docs, "corte"),
            Err(ShelfError::DocumentNotFound(_))
        ));
    }
}
