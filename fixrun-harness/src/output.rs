// Copyright (c) The fixrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Output and logging configuration for the harness.

use clap::{Args, ValueEnum};
use owo_colors::Style;
use std::io::IsTerminal;
use tracing::level_filters::LevelFilter;

/// Output-related options, shared by every subcommand.
#[derive(Copy, Clone, Debug, Args)]
#[must_use]
pub struct OutputOpts {
    /// Verbose output
    #[arg(long, short, global = true, env = "FIXRUN_VERBOSE")]
    pub verbose: bool,

    /// Produce color output: auto, always, never
    #[arg(
        long,
        value_enum,
        default_value_t,
        hide_possible_values = true,
        global = true,
        value_name = "WHEN",
        env = "FIXRUN_COLOR"
    )]
    pub color: Color,
}

impl OutputOpts {
    /// Initializes logging and returns the resolved output context.
    pub fn init(self) -> OutputContext {
        let OutputOpts { verbose, color } = self;

        let max_level = if verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::WARN
        };
        // Ignore the error if a subscriber is already set, e.g. when the
        // harness entry point is invoked twice in tests.
        let _ = tracing_subscriber::fmt()
            .with_max_level(max_level)
            .with_writer(std::io::stderr)
            .with_ansi(color.should_colorize(supports_color::Stream::Stderr))
            .try_init();

        OutputContext { verbose, color }
    }
}

/// The resolved output context for one harness invocation.
#[derive(Copy, Clone, Debug)]
#[must_use]
pub struct OutputContext {
    /// Whether verbose output was requested.
    pub verbose: bool,

    /// The color setting.
    pub color: Color,
}

impl OutputContext {
    /// Returns general stderr styles for the current output context.
    pub(crate) fn stderr_styles(&self) -> StderrStyles {
        let mut styles = StderrStyles::default();
        if self.color.should_colorize(supports_color::Stream::Stderr) {
            styles.colorize();
        }
        styles
    }
}

/// Whether to produce colored output.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
#[must_use]
pub enum Color {
    /// Colorize output when writing to a terminal that supports it.
    #[default]
    Auto,

    /// Always colorize output.
    Always,

    /// Never colorize output.
    Never,
}

impl Color {
    /// Returns true if the given stream should be colorized.
    pub fn should_colorize(self, stream: supports_color::Stream) -> bool {
        match self {
            Color::Auto => {
                let is_terminal = match stream {
                    supports_color::Stream::Stdout => std::io::stdout().is_terminal(),
                    supports_color::Stream::Stderr => std::io::stderr().is_terminal(),
                };
                is_terminal && supports_color::on_cached(stream).is_some()
            }
            Color::Always => true,
            Color::Never => false,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct StderrStyles {
    pub(crate) error: Style,
    pub(crate) bold: Style,
}

impl StderrStyles {
    fn colorize(&mut self) {
        self.error = Style::new().red().bold();
        self.bold = Style::new().bold();
    }
}
