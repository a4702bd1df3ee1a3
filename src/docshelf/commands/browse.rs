use crate::catalog::Catalog;
use crate::commands::{empty_catalog_hint, CmdResult, DocumentEntry, Listing};
use crate::error::{Result, ShelfError};
use crate::store::cache::CacheDir;

/// Lists one level of the catalog: areas, the types in an area, or the
/// documents in an `(area, type)` bucket.
pub fn run(
    catalog: &Catalog,
    cache: &CacheDir,
    area: Option<&str>,
    kind: Option<&str>,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    if let Some(hint) = empty_catalog_hint(catalog) {
        result.add_message(hint);
        return Ok(result);
    }

    let listing = match (area, kind) {
        (None, _) => Listing::Areas(
            catalog
                .areas
                .iter()
                .map(|(name, node)| (name.clone(), node.count))
                .collect(),
        ),
        (Some(area), None) => {
            let node = find_area(catalog, area)?;
            Listing::Types {
                area: area.to_string(),
                types: node
                    .types
                    .iter()
                    .map(|(name, node)| (name.clone(), node.count))
                    .collect(),
            }
        }
        (Some(area), Some(kind)) => {
            find_area(catalog, area)?;
            let bucket = catalog.bucket(area, kind).ok_or_else(|| {
                ShelfError::Api(format!("No type '{}' in area '{}'", kind, area))
            })?;
            Listing::Documents {
                area: area.to_string(),
                kind: kind.to_string(),
                documents: bucket
                    .documents
                    .iter()
                    .map(|doc| DocumentEntry {
                        cached: cache.is_cached(&cache.local_path(&doc.file_name)),
                        document: doc.clone(),
                    })
                    .collect(),
            }
        }
    };

    Ok(result.with_listing(listing))
}

fn find_area<'a>(catalog: &'a Catalog, area: &str) -> Result<&'a crate::catalog::AreaNode> {
    catalog
        .area(area)
        .ok_or_else(|| ShelfError::Api(format!("Unknown area: {}", area)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DocumentRecord;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, CacheDir, Catalog) {
        let dir = TempDir::new().unwrap();
        let cache = CacheDir::new(dir.path().to_path_buf());
        let docs = vec![
            DocumentRecord::new("1", "Planta", "P-2044_DW").with_classification("Área 2044", "Plano"),
            DocumentRecord::new("2", "Corte", "P-2044_DW_2").with_classification("Área 2044", "Plano"),
            DocumentRecord::new("3", "Memoria", "MC").with_classification("General", "Memoria"),
        ];
        (dir, cache, Catalog::build(&docs))
    }

    #[test]
    fn top_level_lists_areas_sorted_with_counts() {
        let (_dir, cache, catalog) = setup();
        let result = run(&catalog, &cache, None, None).unwrap();
        match result.listing.unwrap() {
            Listing::Areas(areas) => assert_eq!(
                areas,
                vec![("General".to_string(), 1), ("Área 2044".to_string(), 2)]
            ),
            other => panic!("unexpected listing {:?}", other),
        }
    }

    #[test]
    fn area_level_lists_types() {
        let (_dir, cache, catalog) = setup();
        let result = run(&catalog, &cache, Some("Área 2044"), None).unwrap();
        match result.listing.unwrap() {
            Listing::Types { types, .. } => assert_eq!(types, vec![("Plano".to_string(), 2)]),
            other => panic!("unexpected listing {:?}", other),
        }
    }

    #[test]
    fn bucket_level_marks_cached_documents() {
        let (_dir, cache, catalog) = setup();
        fs::write(cache.local_path("P-2044_DW_2"), b"x").unwrap();

        let result = run(&catalog, &cache, Some("Área 2044"), Some("Plano")).unwrap();
        match result.listing.unwrap() {
            Listing::Documents { documents, .. } => {
                let marks: Vec<_> = documents
                    .iter()
                    .map(|e| (e.document.title.as_str(), e.cached))
                    .collect();
                assert_eq!(marks, vec![("Planta", false), ("Corte", true)]);
            }
            other => panic!("unexpected listing {:?}", other),
        }
    }

    #[test]
    fn unknown_area_or_type_is_an_error() {
        let (_dir, cache, catalog) = setup();
        assert!(run(&catalog, &cache, Some("Nope"), None).is_err());
        assert!(run(&catalog, &cache, Some("General"), Some("Plano")).is_err());
    }

    #[test]
    fn empty_catalog_gives_hint() {
        let dir = TempDir::new().unwrap();
        let cache = CacheDir::new(dir.path().to_path_buf());
        let result = run(&Catalog::default(), &cache, None, None).unwrap();
        assert!(result.listing.is_none());
        assert!(result.messages[0].content.contains("docshelf sync"));
    }
}
