//! Shell completion script generation

use crate::cli::{Cli, CompletionsArgs};
use crate::error::Result;
use clap::CommandFactory;
use std::io::{self, Write};

/// Print the completion script for the requested shell
pub fn handle_completions(args: CompletionsArgs) -> Result<()> {
    write_completions(args, &mut io::stdout())
}

fn write_completions(args: CompletionsArgs, sink: &mut dyn Write) -> Result<()> {
    let mut command = Cli::command();
    let bin_name = command.get_name().to_string();
    clap_complete::generate(args.shell.to_clap_shell(), &mut command, bin_name, sink);
    sink.flush()?;
    Ok(())
}
