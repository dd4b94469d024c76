//! Source references attached to a completed answer

use serde::{Deserialize, Serialize};

use super::document::RetrievedChunk;

/// Display metadata for one source reference
///
/// `page` and `namespace` serialize as explicit nulls when absent; clients
/// rely on the keys being present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMeta {
    pub source: String,
    pub page: Option<u32>,
    pub namespace: Option<String>,
}

/// One source reference, numbered 1..N within a single response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    pub id: usize,
    pub snippet: String,
    pub meta: SourceMeta,
}

impl SourceRef {
    /// Derive references from the top `max` retrieved chunks, preserving
    /// retrieval order. Ids are 1-based and gapless.
    pub fn from_chunks(chunks: &[RetrievedChunk], max: usize) -> Vec<SourceRef> {
        chunks
            .iter()
            .take(max)
            .enumerate()
            .map(|(i, chunk)| SourceRef {
                id: i + 1,
                snippet: chunk.text.clone(),
                meta: SourceMeta {
                    source: chunk
                        .metadata
                        .source
                        .clone()
                        .or_else(|| chunk.metadata.file_name.clone())
                        .unwrap_or_else(|| "pdf".to_string()),
                    page: chunk
                        .metadata
                        .page
                        .or_else(|| chunk.metadata.loc.as_ref().and_then(|l| l.page_number)),
                    namespace: chunk.metadata.namespace.clone(),
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::document::{ChunkMetadata, PageLocation};

    fn chunk(rank: usize, metadata: ChunkMetadata) -> RetrievedChunk {
        RetrievedChunk {
            text: format!("chunk {rank}"),
            metadata,
            relevance_rank: rank,
            score: 1.0 - rank as f32 * 0.1,
        }
    }

    #[test]
    fn ids_are_one_based_and_capped() {
        let chunks: Vec<_> = (0..6).map(|i| chunk(i, ChunkMetadata::default())).collect();
        let refs = SourceRef::from_chunks(&chunks, 4);
        assert_eq!(refs.len(), 4);
        assert_eq!(refs.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(refs[0].snippet, "chunk 0");
    }

    #[test]
    fn source_fallback_chain() {
        let with_source = chunk(
            0,
            ChunkMetadata {
                source: Some("policy.pdf".to_string()),
                file_name: Some("upload-1.pdf".to_string()),
                ..Default::default()
            },
        );
        let with_file_name = chunk(
            1,
            ChunkMetadata {
                file_name: Some("upload-2.pdf".to_string()),
                ..Default::default()
            },
        );
        let bare = chunk(2, ChunkMetadata::default());

        let refs = SourceRef::from_chunks(&[with_source, with_file_name, bare], 4);
        assert_eq!(refs[0].meta.source, "policy.pdf");
        assert_eq!(refs[1].meta.source, "upload-2.pdf");
        assert_eq!(refs[2].meta.source, "pdf");
    }

    #[test]
    fn page_fallback_chain() {
        let direct = chunk(
            0,
            ChunkMetadata {
                page: Some(2),
                loc: Some(PageLocation { page_number: Some(9) }),
                ..Default::default()
            },
        );
        let via_loc = chunk(
            1,
            ChunkMetadata {
                loc: Some(PageLocation { page_number: Some(9) }),
                ..Default::default()
            },
        );
        let none = chunk(2, ChunkMetadata::default());

        let refs = SourceRef::from_chunks(&[direct, via_loc, none], 4);
        assert_eq!(refs[0].meta.page, Some(2));
        assert_eq!(refs[1].meta.page, Some(9));
        assert_eq!(refs[2].meta.page, None);
    }

    #[test]
    fn absent_page_serializes_as_null() {
        let refs = SourceRef::from_chunks(&[chunk(0, ChunkMetadata::default())], 4);
        let json = serde_json::to_value(&refs).unwrap();
        assert!(json[0]["meta"]["page"].is_null());
        assert!(json[0]["meta"]["namespace"].is_null());
        assert_eq!(json[0]["meta"]["source"], "pdf");
    }
}
