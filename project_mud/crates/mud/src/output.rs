use std::sync::Mutex;

/// Where a player's text goes. Implemented by the network layer's
/// connection writer; writes must not block.
pub trait Output: Send + Sync {
    fn write(&self, text: &str);

    fn write_line(&self, text: &str) {
        self.write(&format!("{}\n", text));
    }

    /// Ask the session to close. Safe to call more than once.
    fn request_disconnect(&self, reason: &str);
}

/// In-memory sink that records everything written to it.
#[derive(Debug, Default)]
pub struct CaptureOutput {
    buf: Mutex<String>,
    disconnect: Mutex<Option<String>>,
}

impl CaptureOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        self.buf.lock().map(|b| b.clone()).unwrap_or_default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    /// Return everything written so far and clear the buffer.
    pub fn take(&self) -> String {
        self.buf
            .lock()
            .map(|mut b| std::mem::take(&mut *b))
            .unwrap_or_default()
    }

    pub fn disconnect_reason(&self) -> Option<String> {
        self.disconnect.lock().ok().and_then(|r| r.clone())
    }
}

impl Output for CaptureOutput {
    fn write(&self, text: &str) {
        if let Ok(mut buf) = self.buf.lock() {
            buf.push_str(text);
        }
    }

    fn request_disconnect(&self, reason: &str) {
        if let Ok(mut slot) = self.disconnect.lock() {
            slot.get_or_insert_with(|| reason.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_records_lines() {
        let out = CaptureOutput::new();
        out.write("> ");
        out.write_line("hello");
        assert_eq!(out.contents(), "> hello\n");
        assert_eq!(out.take(), "> hello\n");
        assert!(out.contents().is_empty());
    }

    #[test]
    fn first_disconnect_reason_sticks() {
        let out = CaptureOutput::new();
        out.request_disconnect("quit");
        out.request_disconnect("error");
        assert_eq!(out.disconnect_reason().as_deref(), Some("quit"));
    }
}
