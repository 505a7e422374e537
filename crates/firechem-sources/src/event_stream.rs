//! Decoder for `text/event-stream` bodies.
//!
//! Follows the server-sent-events line format: `field: value` lines, blank
//! line terminates an event, `:` starts a comment, multiple `data` lines are
//! joined with `\n`. A final event without a trailing blank line is still
//! emitted since streamed bodies are often cut off after the last payload.

/// One dispatched event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
    pub id: Option<String>,
}

impl ServerEvent {
    /// `data` parsed as JSON, if it is JSON.
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.data).ok()
    }

    pub fn is_error(&self) -> bool {
        self.event.as_deref() == Some("error")
    }
}

#[derive(Default)]
struct Pending {
    event: Option<String>,
    data: Vec<String>,
    id: Option<String>,
}

impl Pending {
    /// Events with no data lines are dropped.
    fn take(&mut self) -> Option<ServerEvent> {
        let pending = std::mem::take(self);
        if pending.data.is_empty() {
            return None;
        }
        Some(ServerEvent {
            event: pending.event,
            data: pending.data.join("\n"),
            id: pending.id,
        })
    }
}

pub fn parse_events(body: &str) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    let mut pending = Pending::default();

    for raw in body.split('\n') {
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        if line.is_empty() {
            events.extend(pending.take());
            continue;
        }
        if line.starts_with(':') {
            continue;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => pending.event = Some(value.to_string()),
            "data" => pending.data.push(value.to_string()),
            "id" => pending.id = Some(value.to_string()),
            // retry and unknown fields are ignored
            _ => {}
        }
    }

    events.extend(pending.take());
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_stream() {
        assert!(parse_events("").is_empty());
        assert!(parse_events("\n\n\r\n").is_empty());
    }

    #[test]
    fn test_gradio_complete_event() {
        let body = "event: generating\ndata: null\n\nevent: complete\ndata: [\"{\\\"success\\\": true}\"]\n\n";
        let events = parse_events(body);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].event.as_deref(), Some("complete"));
        let json = events[1].json().unwrap();
        assert!(json.is_array());
    }

    #[test]
    fn test_multiple_data_lines_are_joined() {
        let events = parse_events("data: {\"a\":\ndata: 1}\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "{\"a\":\n1}");
        assert_eq!(events[0].json().unwrap()["a"], 1);
    }

    #[test]
    fn test_comments_and_crlf() {
        let body = ": keep-alive\r\nid: 7\r\ndata:no-space\r\n\r\n";
        let events = parse_events(body);
        assert_eq!(
            events,
            vec![ServerEvent {
                event: None,
                data: "no-space".to_string(),
                id: Some("7".to_string()),
            }]
        );
    }

    #[test]
    fn test_non_json_data_is_kept_as_text() {
        let events = parse_events("data: not json\n\n");
        assert_eq!(events[0].data, "not json");
        assert!(events[0].json().is_none());
    }

    #[test]
    fn test_event_without_data_is_dropped() {
        let events = parse_events("event: heartbeat\n\ndata: 1\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, None);
    }

    #[test]
    fn test_trailing_event_without_blank_line() {
        let events = parse_events("event: error\ndata: null");
        assert_eq!(events.len(), 1);
        assert!(events[0].is_error());
    }
}
