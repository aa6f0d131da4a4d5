//! CLI parse tests.

use super::{Cli, CliCommand, SendArgs};
use clap::Parser;

pub(super) fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

pub(super) fn parse_send(args: &[&str]) -> SendArgs {
    match parse(args) {
        CliCommand::Send(send) => send,
        other => panic!("expected Send, got {:?}", other),
    }
}
