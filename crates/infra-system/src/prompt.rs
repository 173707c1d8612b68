// Interactive worker count prompt
use bufferline_core::domain::{parse_count, WorkerCount, MAX_WORKERS, MIN_WORKERS};
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Ask for a worker count until a valid one is entered.
///
/// Prints `Enter the number of <label> (1-10): ` and re-prompts on invalid
/// input with the reason.
///
/// # Errors
/// - io::ErrorKind::UnexpectedEof if input ends before a valid count
/// - any read/write error from the underlying streams
pub fn prompt_count<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> io::Result<WorkerCount> {
    let mut line = String::new();
    loop {
        write!(
            output,
            "Enter the number of {} ({}-{}): ",
            label, MIN_WORKERS, MAX_WORKERS
        )?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("input closed before a {} count was entered", label),
            ));
        }

        match parse_count(&line) {
            Ok(count) => {
                debug!(label, count = count.get(), "Worker count accepted");
                return Ok(count);
            }
            Err(e) => writeln!(output, "Invalid input: {}. Please try again.", e)?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_prompt_accepts_first_valid() {
        let mut input = Cursor::new("4\n");
        let mut output = Vec::new();

        let count = prompt_count(&mut input, &mut output, "producers").unwrap();

        assert_eq!(count.get(), 4);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Enter the number of producers (1-10): "
        );
    }

    #[test]
    fn test_prompt_reprompts_on_invalid() {
        let mut input = Cursor::new("abc\n0\n11\n  9 \n");
        let mut output = Vec::new();

        let count = prompt_count(&mut input, &mut output, "consumers").unwrap();
        assert_eq!(count.get(), 9);

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.matches("Enter the number of consumers (1-10): ").count(), 4);
        assert_eq!(text.matches("Invalid input").count(), 3);
    }

    #[test]
    fn test_prompt_eof_is_error() {
        let mut input = Cursor::new("nope\n");
        let mut output = Vec::new();

        let err = prompt_count(&mut input, &mut output, "producers").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
