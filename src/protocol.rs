use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::error::EngineError;
use crate::service::{Engine, Request, Response};

/// One parsed input line.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Request(Request),
    Malformed(EngineError),
    Quit,
    Skip,
}

/// Reads requests from stdin, one per line, and answers each on stdout.
pub fn run(engine: &mut Engine) -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    serve(stdin.lock(), stdout.lock(), engine)
}

/// Line loop over arbitrary streams. Stops at `quit` or end of input.
pub fn serve<R: BufRead, W: Write>(input: R, mut output: W, engine: &mut Engine) -> io::Result<()> {
    for line in input.lines() {
        let line = line?;

        let response = match parse_line(&line) {
            Command::Quit => break,
            Command::Skip => continue,
            Command::Request(request) => engine.handle(&request),
            Command::Malformed(err) => {
                debug!(error = %err, "unreadable request line");
                Response::from_error(&err)
            }
        };

        serde_json::to_writer(&mut output, &response)?;
        writeln!(output)?;
        output.flush()?;
    }
    Ok(())
}

/// A line is a JSON request, `fen <FEN>`, a bare FEN, or `quit`.
fn parse_line(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Skip;
    }

    if line.starts_with('{') {
        return match serde_json::from_str::<Request>(line) {
            Ok(request) => Command::Request(request),
            Err(e) => Command::Malformed(EngineError::InvalidInput(format!("Invalid request: {e}"))),
        };
    }

    let mut tokens = line.splitn(2, char::is_whitespace);
    match tokens.next() {
        Some("quit") => Command::Quit,
        Some("fen") => Command::Request(Request::new(tokens.next().unwrap_or("").trim())),
        _ => Command::Request(Request::new(line)),
    }
}


// Output is one JSON object per line so a caller can pipe requests through
// the binary. Logs go to stderr and never interleave with responses.
