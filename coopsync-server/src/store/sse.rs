/// One server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

/// Incremental `text/event-stream` decoder.
///
/// Chunks may end anywhere, including inside a UTF-8 sequence, so bytes are
/// buffered until a blank line closes the event.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer
            .extend(chunk.iter().copied().filter(|byte| *byte != b'\r'));

        let mut events = Vec::new();

        while let Some(end) = self.buffer.windows(2).position(|pair| pair == b"\n\n") {
            let block: Vec<u8> = self.buffer.drain(..end + 2).collect();
            if let Some(event) = Self::parse_block(&String::from_utf8_lossy(&block)) {
                events.push(event);
            }
        }

        events
    }

    fn parse_block(block: &str) -> Option<SseEvent> {
        let mut event = String::from("message");
        let mut data: Vec<&str> = Vec::new();

        for line in block.lines() {
            if line.is_empty() || line.starts_with(':') {
                continue;
            }

            let (field, value) = line.split_once(':').unwrap_or((line, ""));
            let value = value.strip_prefix(' ').unwrap_or(value);

            match field {
                "event" => event = value.to_string(),
                "data" => data.push(value),
                _ => {}
            }
        }

        if data.is_empty() && event == "message" {
            return None;
        }

        Some(SseEvent {
            event,
            data: data.join("\n"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_split_chunks() {
        let mut parser = SseParser::new();

        assert!(parser.push(b"event: put\ndata: {\"path\":\"/\",").is_empty());

        let events = parser.push(b"\"data\":1}\n\nevent: keep-alive\ndata: null\n\n");

        assert_eq!(
            events,
            vec![
                SseEvent {
                    event: "put".to_string(),
                    data: "{\"path\":\"/\",\"data\":1}".to_string(),
                },
                SseEvent {
                    event: "keep-alive".to_string(),
                    data: "null".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_crlf_and_comments() {
        let mut parser = SseParser::new();

        let events = parser.push(b": hello\r\nevent: cancel\r\ndata: permission denied\r\n\r\n");

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "cancel");
        assert_eq!(events[0].data, "permission denied");
    }
}
