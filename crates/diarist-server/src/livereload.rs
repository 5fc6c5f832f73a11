//! WebSocket-based live reload.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Path of the live reload WebSocket endpoint.
pub const SOCKET_PATH: &str = "/__livereload";

/// Path the client script is served from.
pub const SCRIPT_PATH: &str = "/__livereload.js";

/// Messages sent to connected browsers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReloadMessage {
    /// Full page reload
    Reload,

    /// The last rebuild failed; the page on disk is stale
    BuildFailed {
        /// Error description
        message: String,
    },

    /// Connection established
    Connected,
}

/// Hub for broadcasting reload messages to all connected browsers.
#[derive(Debug, Clone)]
pub struct ReloadHub {
    sender: broadcast::Sender<ReloadMessage>,
}

impl ReloadHub {
    /// Create a new reload hub.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Send a message to all connected browsers.
    pub fn send(&self, msg: ReloadMessage) {
        // Ignore send errors (no receivers)
        let _ = self.sender.send(msg);
    }

    /// Subscribe to reload messages.
    pub fn subscribe(&self) -> broadcast::Receiver<ReloadMessage> {
        self.sender.subscribe()
    }

    /// Get the number of connected browsers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate the client-side live reload script.
///
/// The socket URL is derived from the page's own host so the script works on
/// whatever port the server was started with.
pub fn client_script() -> String {
    format!(
        r#"
(function() {{
  'use strict';

  const url = (location.protocol === 'https:' ? 'wss://' : 'ws://') + location.host + '{}';
  let reconnectAttempts = 0;
  const maxReconnectAttempts = 10;

  function connect() {{
    const ws = new WebSocket(url);

    ws.onopen = function() {{
      console.log('[livereload] Connected');
      if (reconnectAttempts > 0) {{
        location.reload();
      }}
      reconnectAttempts = 0;
    }};

    ws.onmessage = function(event) {{
      const msg = JSON.parse(event.data);

      switch (msg.type) {{
        case 'reload':
          location.reload();
          break;

        case 'build_failed':
          console.error('[livereload] Build failed:', msg.message);
          break;

        case 'connected':
          console.log('[livereload] Server acknowledged connection');
          break;
      }}
    }};

    ws.onclose = function() {{
      console.log('[livereload] Disconnected');
      if (reconnectAttempts < maxReconnectAttempts) {{
        reconnectAttempts++;
        setTimeout(connect, 1000 * reconnectAttempts);
      }}
    }};
  }}

  connect();
}})();
"#,
        SOCKET_PATH
    )
}

/// Insert the client script tag before the last `</body>`, or append it when
/// the page has no body end tag.
pub fn inject_script(html: &str) -> String {
    let tag = format!(r#"<script src="{}"></script>"#, SCRIPT_PATH);

    match html.to_ascii_lowercase().rfind("</body>") {
        Some(pos) => {
            let mut out = String::with_capacity(html.len() + tag.len() + 1);
            out.push_str(&html[..pos]);
            out.push_str(&tag);
            out.push('\n');
            out.push_str(&html[pos..]);
            out
        }
        None => format!("{}\n{}", html, tag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hub_broadcasts_messages() {
        let hub = ReloadHub::new();
        let mut rx = hub.subscribe();

        hub.send(ReloadMessage::Reload);

        match rx.try_recv() {
            Ok(ReloadMessage::Reload) => {}
            _ => panic!("Expected Reload message"),
        }
    }

    #[test]
    fn send_without_subscribers_is_harmless() {
        let hub = ReloadHub::new();

        hub.send(ReloadMessage::Reload);

        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn serializes_messages() {
        let msg = ReloadMessage::BuildFailed {
            message: "cannot read template".to_string(),
        };

        let json = serde_json::to_string(&msg).unwrap();

        assert_eq!(json, r#"{"type":"build_failed","message":"cannot read template"}"#);
        assert_eq!(serde_json::to_string(&ReloadMessage::Reload).unwrap(), r#"{"type":"reload"}"#);
    }

    #[test]
    fn injects_before_body_end() {
        let html = "<html><body><p>x</p></BODY></html>";

        let out = inject_script(html);

        assert_eq!(
            out,
            "<html><body><p>x</p><script src=\"/__livereload.js\"></script>\n</BODY></html>"
        );
    }

    #[test]
    fn appends_without_body_end() {
        let out = inject_script("<p>fragment</p>");

        assert_eq!(out, "<p>fragment</p>\n<script src=\"/__livereload.js\"></script>");
    }

    #[test]
    fn script_targets_socket_path() {
        assert!(client_script().contains("'/__livereload'"));
    }
}
