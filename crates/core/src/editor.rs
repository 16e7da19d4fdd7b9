//! Edit operations on the input buffer.
//!
//! The buffer is kept as raw bytes. Everything here takes the buffer by value
//! and hands back the edited one.

/// Appends `text` to the end of the buffer.
pub fn append_text(mut buffer: Vec<u8>, text: &str) -> Vec<u8> {
    buffer.extend_from_slice(text.as_bytes());
    buffer
}

/// Removes the last complete character.
///
/// When the trailing bytes are not valid UTF-8 exactly one byte is dropped
/// instead. Buffers of one byte or less come back empty.
pub fn delete_last_rune(mut buffer: Vec<u8>) -> Vec<u8> {
    if buffer.len() <= 1 {
        buffer.clear();
        return buffer;
    }

    let width = last_rune_width(&buffer).unwrap_or(1);
    buffer.truncate(buffer.len() - width);
    buffer
}

/// Byte length of the trailing character, if the tail decodes to exactly one.
fn last_rune_width(buffer: &[u8]) -> Option<usize> {
    let max_width = buffer.len().min(4);

    (1..=max_width).find(|&width| {
        let tail = &buffer[buffer.len() - width..];
        matches!(std::str::from_utf8(tail), Ok(s) if s.chars().count() == 1)
    })
}

/// Removes the last whitespace separated word.
///
/// Remaining words are joined with single spaces and, if any are left, a
/// trailing space is added so typing continues with a new word.
pub fn delete_last_word(buffer: Vec<u8>) -> Vec<u8> {
    let fields = split_fields(&buffer);

    match fields.split_last() {
        Some((_, [])) | None => Vec::new(),
        Some((_, remaining)) => {
            let mut result = remaining.join(&b' ');
            result.push(b' ');
            result
        }
    }
}

/// Splits on Unicode whitespace. Invalid UTF-8 bytes belong to a word.
fn split_fields(buffer: &[u8]) -> Vec<&[u8]> {
    let mut fields = Vec::new();
    let mut start = None;
    let mut offset = 0;

    for chunk in buffer.utf8_chunks() {
        for c in chunk.valid().chars() {
            if c.is_whitespace() {
                if let Some(begin) = start.take() {
                    fields.push(&buffer[begin..offset]);
                }
            } else if start.is_none() {
                start = Some(offset);
            }
            offset += c.len_utf8();
        }

        if !chunk.invalid().is_empty() {
            start.get_or_insert(offset);
            offset += chunk.invalid().len();
        }
    }

    if let Some(begin) = start {
        fields.push(&buffer[begin..]);
    }
    fields
}
