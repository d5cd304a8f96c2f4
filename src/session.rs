//! Interactive session driver: a thin REPL over the dispatcher.

use std::sync::Arc;

use futures::{stream, Stream, StreamExt};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::context::UserContext;
use crate::dispatch::Dispatcher;
use crate::error::{DispatchError, Error};

const FALLBACK_MESSAGE: &str = "Sorry, something went wrong while answering. Please try again.";

/// One caller's conversation. The identity is fixed for the lifetime of
/// the session; every turn dispatches under the same context.
pub struct Session {
    ctx: UserContext,
    dispatcher: Arc<Dispatcher>,
}

impl Session {
    pub fn new(ctx: UserContext, dispatcher: Arc<Dispatcher>) -> Self {
        Self { ctx, dispatcher }
    }

    pub fn context(&self) -> &UserContext {
        &self.ctx
    }

    /// Run one turn and render the outcome as user-facing text. Scope
    /// rejections become the fixed refusal line; infrastructure failures
    /// are logged and softened rather than shown raw.
    pub async fn turn(&self, message: &str) -> String {
        match self.dispatcher.handle_turn(message, &self.ctx).await {
            Ok(result) => result.final_text,
            Err(Error::Dispatch(DispatchError::ScopeRejected)) => {
                self.dispatcher.refusal_message().to_string()
            }
            Err(e) => {
                tracing::error!(error = %e, "Turn failed");
                FALLBACK_MESSAGE.to_string()
            }
        }
    }

    /// Read-eval loop over stdin until EOF, `/quit`, or ctrl-c.
    pub async fn run(self) -> Result<(), Error> {
        let mut lines = stdin_lines();

        eprint!("> ");
        loop {
            tokio::select! {
                biased;

                _ = tokio::signal::ctrl_c() => {
                    eprintln!();
                    tracing::info!("Interrupted, shutting down");
                    break;
                }
                line = lines.next() => {
                    let Some(line) = line else { break };
                    let message = line.trim();
                    if message.is_empty() {
                        eprint!("> ");
                        continue;
                    }
                    if message == "/quit" || message == "/exit" {
                        break;
                    }

                    let answer = self.turn(message).await;
                    println!("\n{}\n", answer);
                    eprint!("> ");
                }
            }
        }

        eprintln!("Goodbye!");
        Ok(())
    }
}

/// Stdin as a line stream. A dedicated task owns the blocking-ish reader
/// so the select loop stays responsive to ctrl-c.
fn stdin_lines() -> impl Stream<Item = String> + Unpin {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut reader = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = reader.next_line().await {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    Box::pin(stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|line| (line, rx))
    }))
}
