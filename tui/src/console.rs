//! Console Display Surface
//!
//! Line-oriented surface over any async reader and blocking writer. Used for
//! single-shot prompts, `--plain` sessions, and whenever stdout is not a
//! terminal.

use std::io::Write;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;

use tiller_conductor::{DisplaySurface, Message, MessageKind};

pub struct ConsoleSurface<R, W> {
    reader: tokio::sync::Mutex<R>,
    writer: Mutex<W>,
    interactive: bool,
    closed: CancellationToken,
}

impl<R, W> ConsoleSurface<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    pub fn new(reader: R, writer: W, interactive: bool) -> Self {
        Self {
            reader: tokio::sync::Mutex::new(reader),
            writer: Mutex::new(writer),
            interactive,
            closed: CancellationToken::new(),
        }
    }

    /// Consume the surface and return the writer
    pub fn into_writer(self) -> W {
        self.writer.into_inner()
    }

    fn write_line(&self, text: &str) {
        let mut writer = self.writer.lock();
        if let Err(e) = writeln!(writer, "{text}").and_then(|()| writer.flush()) {
            tracing::warn!(error = %e, "Console write failed");
        }
    }

    fn prompt(&self) {
        let mut writer = self.writer.lock();
        if let Err(e) = write!(writer, "You: ").and_then(|()| writer.flush()) {
            tracing::warn!(error = %e, "Console write failed");
        }
    }
}

impl ConsoleSurface<tokio::io::BufReader<tokio::io::Stdin>, std::io::Stdout> {
    /// Surface over the process's stdin and stdout
    pub fn stdio(interactive: bool) -> Self {
        Self::new(
            tokio::io::BufReader::new(tokio::io::stdin()),
            std::io::stdout(),
            interactive,
        )
    }
}

#[async_trait]
impl<R, W> DisplaySurface for ConsoleSurface<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    async fn send_message(&self, message: Message) {
        if let Some(text) = format_message(&message, self.interactive) {
            self.write_line(&text);
        }
    }

    async fn user_input(&self) -> Option<String> {
        let mut reader = self.reader.lock().await;
        loop {
            if self.closed.is_cancelled() {
                return None;
            }
            self.prompt();

            let mut line = String::new();
            let read = tokio::select! {
                biased;
                () = self.closed.cancelled() => return None,
                read = reader.read_line(&mut line) => read,
            };

            match read {
                Ok(0) => return None,
                Ok(_) => {
                    let text = line.trim_end_matches(['\r', '\n']);
                    if text.trim().is_empty() {
                        continue;
                    }
                    return Some(text.to_string());
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read console input");
                    return None;
                }
            }
        }
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn close(&self) {
        self.closed.cancel();
    }
}

/// Console text for a message, or `None` when it prints nothing
///
/// User input is already on screen from typing. Non-interactive output
/// keeps assistant text bare so it can be piped.
pub fn format_message(message: &Message, interactive: bool) -> Option<String> {
    match message.kind {
        MessageKind::UserInput => None,
        MessageKind::Assistant if interactive => Some(format!("Assistant: {}", message.content)),
        MessageKind::Assistant => Some(message.content.clone()),
        MessageKind::ToolCall if interactive => {
            let text = match message.tool_call_data() {
                Some(call) => format!("Tool: {}({})", call.tool_name, call.input),
                None => format!("Tool: {}", message.content),
            };
            Some(text)
        }
        MessageKind::ToolCall => None,
        MessageKind::ToolResult if interactive => {
            let name = message
                .tool_result_data()
                .map_or_else(|| "tool".to_string(), |result| result.tool_name);
            let label = if message.is_error() {
                "Tool Error"
            } else {
                "Tool Result"
            };
            Some(format!("{label} ({name}): {}", message.content))
        }
        MessageKind::ToolResult => None,
        MessageKind::Error => Some(format!("Error: {}", message.content)),
        MessageKind::SystemInfo => Some(message.content.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use std::sync::Arc;
    use std::time::Duration;
    use tiller_conductor::{ToolCallData, ToolResultData};

    fn surface(input: &str, interactive: bool) -> ConsoleSurface<Cursor<Vec<u8>>, Vec<u8>> {
        ConsoleSurface::new(Cursor::new(input.as_bytes().to_vec()), Vec::new(), interactive)
    }

    #[tokio::test]
    async fn test_reads_lines_then_eof() {
        let console = surface("first\n\n   \nsecond\r\n", true);
        assert_eq!(console.user_input().await, Some("first".to_string()));
        assert_eq!(console.user_input().await, Some("second".to_string()));
        assert_eq!(console.user_input().await, None);
    }

    #[tokio::test]
    async fn test_prompt_is_written() {
        let console = surface("hi\n", true);
        console.user_input().await;
        let out = String::from_utf8(console.into_writer()).unwrap();
        assert_eq!(out, "You: ");
    }

    #[tokio::test]
    async fn test_close_unblocks_pending_read() {
        let (client, server) = tokio::io::duplex(64);
        let _keep_open = client;
        let console = Arc::new(ConsoleSurface::new(
            tokio::io::BufReader::new(server),
            Vec::new(),
            true,
        ));

        let waiter = {
            let console = console.clone();
            tokio::spawn(async move { console.user_input().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        console.close();
        console.close();

        let result = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("close must release the read")
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_send_message_output() {
        let console = surface("", true);
        console.send_message(Message::user_input("ignored")).await;
        console.send_message(Message::assistant("hello")).await;
        console.send_message(Message::error("bad")).await;
        let out = String::from_utf8(console.into_writer()).unwrap();
        assert_eq!(out, "Assistant: hello\nError: bad\n");
    }

    #[test]
    fn test_format_tool_messages() {
        let call = Message::tool_call(&ToolCallData {
            tool_name: "read_file".to_string(),
            tool_id: "t1".to_string(),
            input: serde_json::json!({"path": "a.txt"}),
        });
        assert_eq!(
            format_message(&call, true).as_deref(),
            Some(r#"Tool: read_file({"path":"a.txt"})"#)
        );
        assert_eq!(format_message(&call, false), None);

        let failed = Message::tool_result(&ToolResultData {
            tool_name: "bash".to_string(),
            tool_id: "t1".to_string(),
            result: "exit 1".to_string(),
            is_error: true,
        });
        assert_eq!(
            format_message(&failed, true).as_deref(),
            Some("Tool Error (bash): exit 1")
        );
    }

    #[test]
    fn test_non_interactive_assistant_is_bare() {
        assert_eq!(
            format_message(&Message::assistant("42"), false).as_deref(),
            Some("42")
        );
        assert_eq!(
            format_message(&Message::error("boom"), false).as_deref(),
            Some("Error: boom")
        );
    }
}
