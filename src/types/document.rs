//! Chunk documents and index entry types

use serde::{Deserialize, Serialize};

/// Page location as written by PDF loaders that track per-page provenance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageLocation {
    #[serde(rename = "pageNumber", default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
}

/// Provenance metadata attached to a chunk
///
/// All fields are optional on the wire; consumers resolve display values
/// through the fallback chains `source ?? fileName ?? "pdf"` and
/// `page ?? loc.pageNumber ?? null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(rename = "fileName", default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<PageLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// A bounded text segment produced by the chunker, ready for embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkDocument {
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// Metadata payload stored alongside a vector in the index
///
/// The chunk text rides in the metadata under the `text` key so a query
/// with metadata included can reconstruct the chunk without a second store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub text: String,
    #[serde(flatten)]
    pub info: ChunkMetadata,
}

/// The upsert wire unit for the vector index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedEntry {
    /// Deterministic id so re-ingestion overwrites instead of duplicating
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: EntryMetadata,
}

impl ChunkDocument {
    /// Pair this chunk with its embedding under a deterministic id
    pub fn into_entry(self, id: String, values: Vec<f32>) -> IndexedEntry {
        IndexedEntry {
            id,
            values,
            metadata: EntryMetadata {
                text: self.text,
                info: self.metadata,
            },
        }
    }
}

/// One similarity-query result, scoped to a single request
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedChunk {
    pub text: String,
    pub metadata: ChunkMetadata,
    /// 0 is most relevant; strictly increasing across a result set
    pub relevance_rank: usize,
    /// Similarity score, non-increasing across a result set
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_metadata_flattens_on_the_wire() {
        let chunk = ChunkDocument {
            text: "refunds are processed within 14 days".to_string(),
            metadata: ChunkMetadata {
                source: Some("policy.pdf".to_string()),
                page: Some(3),
                ..Default::default()
            },
        };
        let entry = chunk.into_entry("ab12cd34ef56-0".to_string(), vec![0.1, 0.2]);
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["id"], "ab12cd34ef56-0");
        assert_eq!(json["metadata"]["text"], "refunds are processed within 14 days");
        assert_eq!(json["metadata"]["source"], "policy.pdf");
        assert_eq!(json["metadata"]["page"], 3);
        // Unset optional fields stay off the wire entirely.
        assert!(json["metadata"].get("fileName").is_none());
    }

    #[test]
    fn entry_metadata_round_trips_loc() {
        let raw = r#"{"text":"warranty covers parts","loc":{"pageNumber":7},"namespace":"default"}"#;
        let metadata: EntryMetadata = serde_json::from_str(raw).unwrap();
        assert_eq!(metadata.info.loc.unwrap().page_number, Some(7));
        assert_eq!(metadata.info.namespace.as_deref(), Some("default"));
    }
}
