//! Scripted session: gates operator rows, applies commands, writes outcomes.

use std::io;

use tokio_stream::{Stream, StreamExt};
use tracing::warn;

use crate::Engine;
use crate::csv::{OutcomeWriter, ScriptRow};
use crate::operator::OperatorGate;

pub struct Session<W: io::Write> {
    engine: Engine,
    gate: OperatorGate,
    writer: OutcomeWriter<W>,
}

impl<W: io::Write> Session<W> {
    pub fn new(engine: Engine, gate: OperatorGate, writer: OutcomeWriter<W>) -> Self {
        Self {
            engine,
            gate,
            writer,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Run the session with the given script stream
    pub async fn run(&mut self, mut stream: impl Stream<Item = ScriptRow> + Unpin) {
        while let Some(row) = stream.next().await {
            // a failed write is logged and does not stop the session
            if let Err(e) = self.step(row) {
                warn!("failed to write outcome: {e}");
            }
        }
    }

    /// Apply one script row and write its outcome row.
    pub fn step(&mut self, row: ScriptRow) -> Result<(), ::csv::Error> {
        let command = row.command;
        if command.requires_operator() {
            if let Err(denied) = self.gate.check(command.name(), row.secret.as_deref()) {
                warn!(line = row.line, "{denied}");
                return self
                    .writer
                    .denied(&command, self.engine.balance(), &denied);
            }
        }
        let result = self.engine.apply(command.clone());
        self.writer.write(&command, self.engine.balance(), &result)
    }

    /// Flush pending rows and hand back the engine and the sink.
    pub fn finish(self) -> Result<(Engine, W), io::Error> {
        let inner = self.writer.into_inner()?;
        Ok((self.engine, inner))
    }
}
