//! Text chunking for size-capped speech requests.
//!
//! The speech backend accepts a bounded number of bytes per request, so
//! articles are cut into chunks before synthesis. Chunks never break a
//! word or a sentence:
//!
//! ```text
//! text ─┬─ fits? ─────────────────────────────▶ [text]
//!       └─ paragraphs (\n\n+) ─┬─ fits ─▶ merge forward with "\n"
//!                              └─ too long ─▶ sentences ([.!?]\s+) ─▶ merge forward
//! ```
//!
//! Paragraph breaks are normalized to a single `\n` when paragraphs are merged
//! into the same chunk, and dropped between chunks. Speech synthesis treats all
//! whitespace alike, so denser chunks only mean fewer requests.

use std::iter::Peekable;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Largest chunk sent to the speech endpoint. The backend caps input at
/// 4096 bytes.
pub const SPEECH_CHUNK_BYTES: usize = 4000;

const PARAGRAPH_JOIN: &str = "\n";
const SENTENCE_JOIN: &str = "";

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("paragraph pattern is valid"));

// ASCII terminators only; `。` and friends do not end a sentence here.
static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?][[:space:]]+").expect("sentence pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("chunk budget must be positive, got {0}")]
    InvalidArgument(usize),

    #[error("sentence too long: {len} bytes exceeds the {max} byte budget")]
    InputTooLong { len: usize, max: usize },
}

/// Split `text` into chunks of at most `max_bytes` bytes.
///
/// Text that already fits is returned as a single chunk (including the empty
/// string). Otherwise the text is split at paragraph boundaries, oversized
/// paragraphs are split at sentence boundaries, and neighbouring pieces are
/// greedily merged while the result still fits.
///
/// Fails with [`SplitError::InputTooLong`] when a single sentence is larger
/// than the budget; nothing is returned in that case.
pub fn split_text(max_bytes: usize, text: &str) -> Result<Vec<String>, SplitError> {
    if max_bytes == 0 {
        return Err(SplitError::InvalidArgument(max_bytes));
    }
    if text.len() <= max_bytes {
        return Ok(vec![text.to_string()]);
    }
    split_paragraphs(max_bytes, text)
}

fn split_paragraphs(max_bytes: usize, text: &str) -> Result<Vec<String>, SplitError> {
    let mut paragraphs = PARAGRAPH_BREAK.split(text).peekable();
    let mut chunks = Vec::new();

    while let Some(paragraph) = paragraphs.next() {
        if paragraph.len() > max_bytes {
            chunks.extend(split_sentences(max_bytes, paragraph)?);
        } else {
            chunks.push(merge_forward(
                paragraph,
                &mut paragraphs,
                PARAGRAPH_JOIN,
                max_bytes,
            ));
        }
    }

    Ok(chunks)
}

fn split_sentences(max_bytes: usize, paragraph: &str) -> Result<Vec<String>, SplitError> {
    let sentences = sentences(paragraph);

    if let Some(long) = sentences.iter().find(|s| s.len() > max_bytes) {
        return Err(SplitError::InputTooLong {
            len: long.len(),
            max: max_bytes,
        });
    }

    let mut sentences = sentences.into_iter().peekable();
    let mut chunks = Vec::new();
    while let Some(sentence) = sentences.next() {
        chunks.push(merge_forward(
            sentence,
            &mut sentences,
            SENTENCE_JOIN,
            max_bytes,
        ));
    }

    Ok(chunks)
}

/// Cut a paragraph after every terminator run. Each piece keeps its
/// terminator and trailing whitespace; the tail keeps whatever it has.
fn sentences(paragraph: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;

    for boundary in SENTENCE_END.find_iter(paragraph) {
        pieces.push(&paragraph[start..boundary.end()]);
        start = boundary.end();
    }
    if start < paragraph.len() {
        pieces.push(&paragraph[start..]);
    }

    pieces
}

/// Append following units to `first` for as long as the joined result fits.
fn merge_forward<'a, I>(
    first: &str,
    rest: &mut Peekable<I>,
    separator: &str,
    max_bytes: usize,
) -> String
where
    I: Iterator<Item = &'a str>,
{
    let mut chunk = first.to_string();
    while let Some(next) =
        rest.next_if(|next| chunk.len() + separator.len() + next.len() <= max_bytes)
    {
        chunk.push_str(separator);
        chunk.push_str(next);
    }
    chunk
}
