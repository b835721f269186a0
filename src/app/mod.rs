// Application layer: the CLI subcommands, writing their results to any `Write`.

pub mod commands;
