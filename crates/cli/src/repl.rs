//! Read-eval-print loop over any async line source and sink.

use policydesk_agent::Assistant;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::warn;

const BANNER: &str = "Multi-Agent RAG Assistant Ready!\nAsk your question (type 'exit' to quit):\n\n";

/// Answer questions line by line until `exit` or end of input.
///
/// A failed question is printed as `[error] ..` and the loop goes on.
/// Lines are decoded lossily, so stray non-UTF-8 bytes do not end the session.
pub async fn run<R, W>(assistant: &mut Assistant, mut input: R, mut output: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output.write_all(BANNER.as_bytes()).await?;
    let mut buf = Vec::new();

    loop {
        output.write_all(b"> ").await?;
        output.flush().await?;

        buf.clear();
        if input.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let query = line.trim();
        if query.eq_ignore_ascii_case("exit") {
            break;
        }
        if query.is_empty() {
            continue;
        }

        let reply = match assistant.answer_query(query).await {
            Ok(answer) => format!("\nAssistant: {answer} \n\n"),
            Err(e) => {
                warn!(error = %e, "Question failed");
                format!("\n[error] {e}\n\n")
            }
        };
        output.write_all(reply.as_bytes()).await?;
    }

    output.flush().await
}
