use clap::Parser;
use env_logger::Env;
use miette::Result;
use wirekit::cli::{Cli, Commands};

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

    // Default level depends on --verbose, RUST_LOG overrides
    let env = if global.verbose {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("warn")
    };
    env_logger::Builder::from_env(env).init();

    match cli.command {
        Commands::Bom(args) => wirekit::cli::commands::bom::run(args, &global),
        Commands::Graph(args) => wirekit::cli::commands::graph::run(args, &global),
        Commands::Validate(args) => wirekit::cli::commands::validate::run(args),
        Commands::Completions(args) => wirekit::cli::commands::completions::run(args),
    }
}
