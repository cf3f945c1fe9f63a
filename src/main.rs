use anyhow::Result;
use clap::{Parser, Subcommand};
use sift::areas::repository::Repository;
use sift::artifacts::status::{display, options::StatusOptions};

#[derive(Parser)]
#[command(
    name = "sift",
    version = "0.1.0",
    about = "A repository status and diff engine",
    long_about = "sift reads git-format repositories (loose objects, v2 index, HEAD refs) \
    and computes working-tree status with rename detection, \
    without linking any native git library.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "status",
        about = "Show the working tree status",
        long_about = "This command compares the HEAD tree, the index and the working tree \
        and reports every path whose state differs between them."
    )]
    Status {
        #[arg(long, help = "Machine-readable two-letter output")]
        porcelain: bool,
        #[arg(short, long, help = "Include untracked files")]
        untracked: bool,
        #[arg(long, help = "Include ignored files")]
        ignored: bool,
        #[arg(long, help = "Include unchanged tracked files")]
        unmodified: bool,
        #[arg(long, help = "Detect renames between the index and the working tree")]
        renames: bool,
        #[arg(long, help = "Report each file inside untracked directories")]
        recurse_untracked: bool,
        #[arg(long, help = "Skip content hashing; trust stat data alone")]
        no_refresh: bool,
        #[arg(long, help = "Write refreshed stat caches back to the index")]
        update_index: bool,
        #[arg(index = 1, num_args = 0.., help = "Limit output to matching paths")]
        pathspecs: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Status {
            porcelain,
            untracked,
            ignored,
            unmodified,
            renames,
            recurse_untracked,
            no_refresh,
            update_index,
            pathspecs,
        } => {
            let pwd = std::env::current_dir()?;
            let repository = Repository::open(&pwd)?;

            let options = StatusOptions {
                include_untracked: untracked,
                include_ignored: ignored,
                include_unmodified: unmodified,
                renames_head_to_index: renames,
                renames_index_to_workdir: renames,
                recurse_untracked_dirs: recurse_untracked,
                no_refresh,
                update_index,
                pathspecs,
                ..Default::default()
            };

            let entries = repository.status(&options).await?;
            let output = if porcelain {
                display::porcelain(&entries)
            } else {
                display::long_format(&entries)
            };
            print!("{output}");
        }
    }

    Ok(())
}
