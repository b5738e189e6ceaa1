//! Section-and-sentence text chunker.
//!
//! Splits raw document or page text into bounded, independently retrievable
//! chunks while preserving source order, so citations read naturally.
//!
//! # Algorithm
//!
//! 1. Split the text into sections on paragraph boundaries (a blank line,
//!    i.e. two or more consecutive newlines) and on markdown heading
//!    markers (1–6 `#` followed by whitespace). A heading opens the section
//!    it titles.
//! 2. Drop sections whose trimmed length is below [`MIN_CHUNK_CHARS`] —
//!    too short to carry independent meaning or be worth a citation.
//! 3. Sections longer than [`MAX_SECTION_CHARS`] are re-split on
//!    sentence-ending punctuation (`.`, `!`, `?` followed by whitespace)
//!    and greedily re-packed: whenever adding the next sentence would push
//!    the buffer past [`SOFT_CAP_CHARS`], the buffer is flushed and the
//!    sentence starts a new chunk. Sentences are never split internally,
//!    so a chunk can exceed the soft cap by at most one sentence.
//! 4. A final pass drops chunks below [`MIN_CHUNK_CHARS`] again (short
//!    trailing buffers).
//!
//! Text with no paragraph or heading structure degrades to one long
//! section that step 3 then bounds. Text entirely below the minimum yields
//! zero chunks — a valid outcome, not an error.
//!
//! All lengths are counted in characters, and every split lands on a
//! sentence or section boundary, so multi-byte UTF-8 text is never cut
//! mid-character.

use sha2::{Digest, Sha256};

/// Minimum viable chunk size; shorter sections and trailing buffers are
/// discarded.
pub const MIN_CHUNK_CHARS: usize = 40;

/// Sections longer than this are re-split into sentence-bounded chunks.
pub const MAX_SECTION_CHARS: usize = 1000;

/// Soft cap for sentence re-packing: a buffer is flushed before the
/// sentence that would push it past this length.
pub const SOFT_CAP_CHARS: usize = 800;

/// Split text into retrieval-sized chunks, in source order.
pub fn chunk_text(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();

    for section in split_sections(text) {
        let trimmed = section.trim();
        if char_len(trimmed) < MIN_CHUNK_CHARS {
            continue;
        }
        if char_len(trimmed) <= MAX_SECTION_CHARS {
            chunks.push(trimmed.to_string());
        } else {
            chunks.extend(pack_sentences(&split_sentences(trimmed)));
        }
    }

    chunks.retain(|c| char_len(c.trim()) >= MIN_CHUNK_CHARS);
    chunks
}

/// SHA-256 hex digest of a chunk's text, used for staleness detection and
/// idempotent-replace verification at the index.
pub fn chunk_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// `#`–`######` followed by whitespace opens a new section.
fn is_heading(line: &str) -> bool {
    let trimmed = line.trim_start();
    let hashes = trimmed.chars().take_while(|&c| c == '#').count();
    if !(1..=6).contains(&hashes) {
        return false;
    }
    trimmed[hashes..]
        .chars()
        .next()
        .is_some_and(|c| c.is_whitespace())
}

/// Split into candidate sections on blank lines and heading markers,
/// preserving document order.
fn split_sections(text: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                sections.push(current.join("\n"));
                current.clear();
            }
        } else if is_heading(line) {
            if !current.is_empty() {
                sections.push(current.join("\n"));
                current.clear();
            }
            current.push(line);
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        sections.push(current.join("\n"));
    }

    sections
}

/// Split on `.`, `!`, `?` followed by whitespace, keeping the punctuation
/// with its sentence. The trailing remainder (terminated or not) is the
/// last sentence.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut iter = text.char_indices().peekable();

    while let Some((_, c)) = iter.next() {
        if matches!(c, '.' | '!' | '?') {
            if let Some(&(next_idx, next)) = iter.peek() {
                if next.is_whitespace() {
                    let sentence = text[start..next_idx].trim();
                    if !sentence.is_empty() {
                        sentences.push(sentence);
                    }
                    start = next_idx;
                }
            }
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }

    sentences
}

/// Greedily accumulate sentences into chunks bounded by [`SOFT_CAP_CHARS`].
fn pack_sentences(sentences: &[&str]) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut buf = String::new();
    let mut buf_chars = 0usize;

    for sentence in sentences {
        let sentence_chars = char_len(sentence);
        let would_be = if buf.is_empty() {
            sentence_chars
        } else {
            buf_chars + 1 + sentence_chars
        };

        if would_be > SOFT_CAP_CHARS && !buf.is_empty() {
            chunks.push(std::mem::take(&mut buf));
            buf_chars = 0;
        }
        if !buf.is_empty() {
            buf.push(' ');
            buf_chars += 1;
        }
        buf.push_str(sentence);
        buf_chars += sentence_chars;
    }

    if !buf.is_empty() {
        chunks.push(buf);
    }

    chunks
}
