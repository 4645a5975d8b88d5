use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use histosync::{CommandSampler, HistoSync};
use std::path::PathBuf;
use std::process::ExitCode;

fn common_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("path")
            .long("path")
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help("Base path somewhere inside the simulation tree (must contain the anchor segment)"),
    )
    .arg(
        Arg::new("anchor")
            .long("anchor")
            .default_value("sim")
            .help("Anchor path segment used as the depth and layout pivot"),
    )
    .arg(
        Arg::new("anchor-depth")
            .long("anchor-depth")
            .default_value("5")
            .value_parser(value_parser!(usize))
            .help("Segments from the anchor to a dataset directory"),
    )
    .arg(
        Arg::new("dryrun")
            .long("dryrun")
            .action(ArgAction::SetTrue)
            .help("Select and log, but do not touch the filesystem"),
    )
    .arg(
        Arg::new("jobs")
            .long("jobs")
            .default_value("1")
            .value_parser(value_parser!(usize))
            .help("Datasets processed concurrently"),
    )
    .arg(
        Arg::new("summary-json")
            .long("summary-json")
            .value_parser(value_parser!(PathBuf))
            .help("Write the run report to this file"),
    )
    .arg(
        Arg::new("no-progress")
            .long("no-progress")
            .action(ArgAction::SetTrue)
            .help("Disable the progress bar"),
    )
}

fn percentage_arg() -> Arg {
    Arg::new("sample-percentage")
        .long("sample-percentage")
        .required(true)
        .value_parser(|s: &str| -> Result<f64, String> {
            let f: f64 = s.parse().map_err(|e| format!("{e}"))?;
            if (0.0..=1.0).contains(&f) {
                Ok(f)
            } else {
                Err(String::from("sample percentage must be within [0, 1]"))
            }
        })
        .help("Fraction of items to sample, in [0, 1]")
}

fn build_sync(args: &ArgMatches) -> HistoSync {
    let mut sync = HistoSync::new()
        .base_dir(args.get_one::<PathBuf>("path").unwrap())
        .anchor_token(args.get_one::<String>("anchor").unwrap())
        .anchor_distance(*args.get_one::<usize>("anchor-depth").unwrap())
        .dry_run(args.get_flag("dryrun"))
        .unit_concurrency(*args.get_one::<usize>("jobs").unwrap())
        .progress(!args.get_flag("no-progress"));
    if let Some(path) = args.get_one::<PathBuf>("summary-json") {
        sync = sync.summary_json(path);
    }
    if let Some(seed) = args.try_get_one::<u64>("seed").ok().flatten() {
        sync = sync.seed(*seed);
    }
    if let Some(f) = args.try_get_one::<f64>("sample-percentage").ok().flatten() {
        sync = sync.sample_fraction(*f);
    }
    sync
}

fn main() -> ExitCode {
    let cli = Command::new("histosync")
        .version("0.1.0")
        .about("Replicate and sample simulation-production histogram artifacts")
        .subcommand_required(true)
        .subcommand(
            common_args(
                Command::new("copy-histos")
                    .about("Mirror dataset-level .histo.hdf5 artifacts into a destination root"),
            )
            .arg(
                Arg::new("dest")
                    .long("dest")
                    .required(true)
                    .value_parser(value_parser!(PathBuf))
                    .help("Destination root for the mirrored tree"),
            )
            .arg(
                Arg::new("force")
                    .long("force")
                    .action(ArgAction::SetTrue)
                    .help("Overwrite artifacts that already exist at the destination"),
            ),
        )
        .subcommand(
            common_args(
                Command::new("copy-job-histos")
                    .about("Mirror a sampled subset of per-job histogram files into a destination root"),
            )
            .arg(
                Arg::new("dest")
                    .long("dest")
                    .required(true)
                    .value_parser(value_parser!(PathBuf))
                    .help("Destination root for the mirrored tree"),
            )
            .arg(percentage_arg())
            .arg(
                Arg::new("seed")
                    .long("seed")
                    .value_parser(value_parser!(u64))
                    .help("Fix the selection seed for reproducible runs"),
            )
            .arg(
                Arg::new("force")
                    .long("force")
                    .action(ArgAction::SetTrue)
                    .help("Overwrite artifacts that already exist at the destination"),
            ),
        )
        .subcommand(
            common_args(
                Command::new("sample-datasets")
                    .about("Run the external sampler over datasets lacking an aggregate artifact"),
            )
            .arg(percentage_arg())
            .arg(
                Arg::new("max-datasets")
                    .long("max-datasets")
                    .required(true)
                    .value_parser(value_parser!(usize))
                    .help("Stop after this many datasets have been sampled successfully"),
            )
            .arg(
                Arg::new("sampler-cmd")
                    .long("sampler-cmd")
                    .default_value("sample-dataset-histos")
                    .help("External sampling program invoked once per dataset"),
            ),
        );

    let matches = cli.get_matches();
    let result = match matches.subcommand() {
        Some(("copy-histos", args)) => build_sync(args)
            .force(args.get_flag("force"))
            .copy_dataset_histos(args.get_one::<PathBuf>("dest").unwrap()),
        Some(("copy-job-histos", args)) => build_sync(args)
            .force(args.get_flag("force"))
            .copy_job_histos(args.get_one::<PathBuf>("dest").unwrap()),
        Some(("sample-datasets", args)) => {
            let sampler = CommandSampler::new(args.get_one::<String>("sampler-cmd").unwrap());
            build_sync(args)
                .max_datasets(*args.get_one::<usize>("max-datasets").unwrap())
                .sample_datasets(&sampler)
        }
        _ => unreachable!("subcommand is required"),
    };

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("histosync: {e:#}");
            ExitCode::FAILURE
        }
    }
}
