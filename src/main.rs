use clap::Parser;
use miette::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use trackwise::cli::commands::{self, completions, init, shell};
use trackwise::cli::{Cli, Commands, Session};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    // Logs go to stderr so list output stays pipeable.
    let default_level = if global.verbose { "trackwise=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("TRACKWISE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();

    match cli.command {
        Commands::Init(args) => init::run(args, &global),
        Commands::Shell(args) => shell::run(args, &global),
        Commands::Completions(args) => completions::run(args),
        command => {
            let session = Session::open(&global)?;
            commands::dispatch(command, &session, &global)
        }
    }
}
