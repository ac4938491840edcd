use crate::traits::Interface;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};
use tokio::sync::Mutex;

pub struct TerminalInterface {
    reader: Mutex<BufReader<Stdin>>,
    prompt: String,
}

impl TerminalInterface {
    pub fn new() -> Self {
        Self::with_prompt("wallet> ")
    }

    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            reader: Mutex::new(BufReader::new(tokio::io::stdin())),
            prompt: prompt.into(),
        }
    }

    async fn write(&self, text: &str) {
        let mut stdout = tokio::io::stdout();
        let _ = stdout.write_all(text.as_bytes()).await;
        let _ = stdout.flush().await;
    }
}

impl Default for TerminalInterface {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Interface for TerminalInterface {
    async fn receive_input(&self) -> Option<String> {
        self.write(&self.prompt).await;

        let mut reader = self.reader.lock().await;
        let mut line = String::new();
        match reader.read_line(&mut line).await {
            Ok(0) => None, // EOF
            Ok(_) => Some(line.trim().to_string()),
            Err(_) => None,
        }
    }

    async fn send_output(&self, message: &str) {
        self.write(&format!("{}\n", message)).await;
    }

    async fn request_approval(&self, action: &str) -> bool {
        self.send_output(&format!("⚠️  Approval required: {}", action))
            .await;
        self.write("Approve? (y/n): ").await;

        let mut reader = self.reader.lock().await;
        let mut line = String::new();
        match reader.read_line(&mut line).await {
            Ok(n) if n > 0 => {
                let answer = line.trim().to_lowercase();
                answer.starts_with('y') || answer.starts_with('s')
            }
            _ => false,
        }
    }

    async fn show_status(&self, status: &str) {
        self.send_output(&format!("ℹ️  {}", status)).await;
    }
}
