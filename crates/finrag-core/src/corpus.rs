//! Chunk corpus input for the offline indexer.
//!
//! Chunk extraction from workbooks happens upstream; the indexer consumes
//! one `DocumentChunk` JSON object per line.

use crate::types::DocumentChunk;
use anyhow::Context;
use std::path::Path;

pub fn read_chunks_jsonl(path: &Path) -> anyhow::Result<Vec<DocumentChunk>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading chunk file {}", path.display()))?;
    let mut chunks = Vec::new();
    for (lineno, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let chunk: DocumentChunk = serde_json::from_str(line)
            .with_context(|| format!("{}:{}: invalid chunk record", path.display(), lineno + 1))?;
        chunks.push(chunk);
    }
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_chunks_and_skips_blank_lines() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("chunks.jsonl");
        let mut f = std::fs::File::create(&path)?;
        writeln!(
            f,
            r#"{{"id":"w1:0","doc_id":"w1","doc_path":"/data/q3.xlsx","sheet":"P&L","content":"Revenue: $12M in 2023","chunk_index":0,"total_chunks":2}}"#
        )?;
        writeln!(f)?;
        writeln!(
            f,
            r#"{{"id":"w1:1","doc_id":"w1","doc_path":"/data/q3.xlsx","sheet":"P&L","content":"EBITDA margin 18%","chunk_index":1,"total_chunks":2}}"#
        )?;

        let chunks = read_chunks_jsonl(&path)?;
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].sheet, "P&L");
        assert_eq!(chunks[1].chunk_index, 1);
        Ok(())
    }

    #[test]
    fn rejects_malformed_records() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("bad.jsonl");
        std::fs::write(&path, "{\"id\":\"x\"}\n")?;
        assert!(read_chunks_jsonl(&path).is_err());
        Ok(())
    }
}
