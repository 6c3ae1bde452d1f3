use std::mem;

use crate::sse::DATA_PREFIX;

/// Splits a chunked byte stream into newline-terminated records.
///
/// UTF-8 decoding carries across `feed` calls: a multi-byte character split
/// between two chunks is held back until its remaining bytes arrive.
#[derive(Debug, Default)]
pub struct LineBuffer {
    undecoded: Vec<u8>,
    text: String,
}

impl LineBuffer {
    /// Feed one network chunk and drain every record completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.decode(chunk);

        let mut records = Vec::new();
        while let Some(newline) = self.text.find('\n') {
            let mut record: String = self.text.drain(..=newline).collect();
            record.pop();
            if record.ends_with('\r') {
                record.pop();
            }
            records.push(record);
        }

        records
    }

    /// Drains the trailing partial record at end of stream.
    ///
    /// Only a leftover that looks like an event record is returned; anything
    /// else is discarded.
    pub fn finish(&mut self) -> Option<String> {
        if !self.undecoded.is_empty() {
            let tail = String::from_utf8_lossy(&self.undecoded).into_owned();
            self.text.push_str(&tail);
            self.undecoded.clear();
        }

        let leftover = mem::take(&mut self.text);
        let leftover = leftover.trim_end_matches('\r');
        if leftover.trim_start().starts_with(DATA_PREFIX) {
            Some(leftover.to_string())
        } else {
            None
        }
    }

    /// Text received after the last newline.
    pub fn pending(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.undecoded.is_empty() && self.text.trim().is_empty()
    }

    fn decode(&mut self, chunk: &[u8]) {
        self.undecoded.extend_from_slice(chunk);

        let mut consumed = 0;
        while consumed < self.undecoded.len() {
            match std::str::from_utf8(&self.undecoded[consumed..]) {
                Ok(valid) => {
                    self.text.push_str(valid);
                    consumed = self.undecoded.len();
                }
                Err(error) => {
                    let valid_end = consumed + error.valid_up_to();
                    self.text
                        .push_str(&String::from_utf8_lossy(&self.undecoded[consumed..valid_end]));
                    match error.error_len() {
                        Some(invalid_len) => {
                            self.text.push(char::REPLACEMENT_CHARACTER);
                            consumed = valid_end + invalid_len;
                        }
                        None => {
                            // Incomplete sequence at the chunk edge.
                            consumed = valid_end;
                            break;
                        }
                    }
                }
            }
        }

        self.undecoded.drain(..consumed);
    }
}
