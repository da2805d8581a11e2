use anyhow::{bail, Context, Result};
use std::io::{self, BufRead, Write};

/// Asks for the API key on stdin until a non-empty value is entered.
pub fn input_api_key() -> Result<String> {
    let stdin = io::stdin();
    read_api_key(&mut stdin.lock(), &mut io::stdout())
}

fn read_api_key<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<String> {
    loop {
        write!(output, "Enter the API Key: ").context("Failed to write prompt")?;
        output.flush().context("Failed to flush stdout")?;

        let mut user_input = String::new();
        let read = input.read_line(&mut user_input)
            .context("Failed to read line")?;
        if read == 0 {
            bail!("No API key provided");
        }

        let trimmed = user_input.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
        writeln!(output, "API key cannot be empty. Please try again.")
            .context("Failed to write prompt")?;
    }
}
