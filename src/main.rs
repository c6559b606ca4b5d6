use clap::Parser;
use miette::Result;
use stepform::cli::{Cli, Commands};
use stepform::core::Config;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
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
    let (config, warnings) = Config::load();
    stepform::cli::logging::init_logging(&config, global.verbose, global.quiet)?;
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    match cli.command {
        Commands::Run(args) => stepform::cli::commands::run::run(args, &global, &config),
        Commands::Replay(args) => stepform::cli::commands::replay::run(args, &global, &config),
        Commands::Check(args) => stepform::cli::commands::check::run(args, &global),
        Commands::Show(args) => stepform::cli::commands::show::run(args, &global, &config),
        Commands::List => stepform::cli::commands::list::run(&global, &config),
        Commands::Completions(args) => stepform::cli::commands::completions::run(args),
    }
}
