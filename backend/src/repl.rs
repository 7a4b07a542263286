//! Terminal chat
//!
//! Line-oriented front end over the same `Assistant` the HTTP API uses.
//! Each non-empty line is one question; `/reset` clears the conversation and
//! `/quit` (or end of input) leaves.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::models::Session;
use crate::services::Assistant;

const BANNER: &str = "🟧 मराठा आरक्षण – जनसंपर्क केंद्र 🟧\nInspired by Manoj Dada Jarange’s movement for justice\nType /reset to start over, /quit to exit.\n";
const PROMPT: &str = "> ";

enum Command<'a> {
    Ask(&'a str),
    Reset,
    Quit,
    Skip,
}

fn parse(line: &str) -> Command<'_> {
    match line.trim() {
        "" => Command::Skip,
        "/quit" | "/exit" => Command::Quit,
        "/reset" => Command::Reset,
        _ => Command::Ask(line),
    }
}

/// Run the conversation until `/quit` or end of input
pub async fn run<R, W>(
    assistant: &Assistant,
    session: &mut Session,
    input: R,
    mut output: W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output.write_all(BANNER.as_bytes()).await?;

    let mut lines = input.lines();
    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse(&line) {
            Command::Skip => continue,
            Command::Quit => break,
            Command::Reset => {
                session.clear();
                output.write_all("(conversation cleared)\n".as_bytes()).await?;
            },
            Command::Ask(question) => {
                let reply = assistant.respond(session, question).await;
                tracing::debug!("REPL turn: kind={:?}", reply.kind);
                output.write_all(format!("{}\n\n", reply.text).as_bytes()).await?;
            },
        }
    }

    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{AllowList, PhraseSet, REFUSAL_EN, REFUSAL_MR};
    use crate::services::llm::mock::MockChat;
    use std::sync::Arc;

    fn assistant(llm: Arc<MockChat>) -> Assistant {
        let set = PhraseSet::new().with_category("topic", ["Maratha reservation"]);
        Assistant::new(Arc::new(AllowList::build(&set).unwrap()), "POLICY", llm)
    }

    async fn drive(assistant: &Assistant, session: &mut Session, input: &str) -> String {
        let mut out = Vec::new();
        run(assistant, session, input.as_bytes(), &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_questions_and_refusals() {
        let llm = Arc::new(MockChat::new().reply("It is about quota."));
        let assistant = assistant(llm.clone());
        let mut session = Session::default();

        let out = drive(
            &assistant,
            &mut session,
            "What is Maratha reservation?\nमराठा आरक्षण काय आहे?\nweather?\n",
        )
        .await;

        assert!(out.starts_with("🟧"));
        assert!(out.contains("It is about quota.\n"));
        assert!(out.contains(REFUSAL_MR));
        assert!(out.contains(REFUSAL_EN));
        assert_eq!(session.len(), 6);
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_blank_lines_are_skipped() {
        let assistant = assistant(Arc::new(MockChat::new()));
        let mut session = Session::default();

        drive(&assistant, &mut session, "\n   \n\n").await;
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn test_reset_and_quit() {
        let assistant = assistant(Arc::new(MockChat::new()));
        let mut session = Session::default();

        let out = drive(&assistant, &mut session, "hello\n/reset\nhi\n/quit\nnever asked\n").await;
        assert!(out.contains("(conversation cleared)"));
        // Only the exchange after the reset remains
        assert_eq!(session.len(), 2);
        assert_eq!(session.history()[0].content, "hi");
    }
}
