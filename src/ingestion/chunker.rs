//! Text chunking with sentence-boundary splitting and bounded overlap

use unicode_segmentation::UnicodeSegmentation;

/// Splits text into chunks of at most `chunk_size` characters, with
/// consecutive chunks sharing an `overlap`-character tail
///
/// Splitting prefers sentence boundaries; a single sentence larger than the
/// window is hard-cut at UTF-8 character boundaries. The same input and
/// parameters always produce the same chunk sequence.
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker; `overlap` must be smaller than `chunk_size`
    /// (validated at config load)
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        debug_assert!(overlap < chunk_size);
        Self {
            chunk_size,
            overlap,
        }
    }

    /// Chunk a text; a document no longer than the window yields a single
    /// chunk, and an empty text yields no chunks
    pub fn chunk(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        if text.len() <= self.chunk_size {
            return vec![text.to_string()];
        }

        // Sentences larger than `chunk_size - overlap` are pre-cut so that
        // an overlap tail plus any piece always fits the window.
        let max_piece = self.chunk_size - self.overlap;
        let mut pieces: Vec<&str> = Vec::new();
        for sentence in text.split_sentence_bounds() {
            if sentence.len() > max_piece {
                hard_cut(sentence, max_piece, &mut pieces);
            } else {
                pieces.push(sentence);
            }
        }

        let mut chunks = Vec::new();
        let mut current = String::new();
        for piece in pieces {
            if !current.is_empty() && current.len() + piece.len() > self.chunk_size {
                let tail = overlap_tail(&current, self.overlap).to_string();
                chunks.push(std::mem::take(&mut current));
                current = tail;
            }
            current.push_str(piece);
        }
        if !current.is_empty() {
            chunks.push(current);
        }

        chunks
    }
}

/// Cut `text` into consecutive segments of at most `max` bytes, each ending
/// at a character boundary
fn hard_cut<'a>(text: &'a str, max: usize, out: &mut Vec<&'a str>) {
    let mut start = 0;
    while start < text.len() {
        let mut end = (start + max).min(text.len());
        while end > start && !text.is_char_boundary(end) {
            end -= 1;
        }
        if end == start {
            // A single character wider than the window; emit it whole.
            end = text[start..]
                .chars()
                .next()
                .map(|c| start + c.len_utf8())
                .unwrap_or(text.len());
        }
        out.push(&text[start..end]);
        start = end;
    }
}

/// Suffix of `text` of at most `overlap` bytes, starting at a character
/// boundary
fn overlap_tail(text: &str, overlap: usize) -> &str {
    let mut start = text.len().saturating_sub(overlap);
    while start < text.len() && !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}
