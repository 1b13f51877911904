use anyhow::{anyhow, bail, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use cognilab_lib::models::Experiment;
use cognilab_lib::trials::{generate_json, SequenceKind, SEQUENCE_KINDS};

const USAGE: &str = "Usage:
  cognilab generate <kind> [--seed N]
  cognilab summary <experiment> [--session ID]
  cognilab export <experiment> [--session ID]
  cognilab clear <experiment> --session ID

Experiments: stroop, bouba-kiki, drm, mental-rep
Environment: COGNILAB_DB, COGNILAB_SETTINGS, COGNILAB_DEBUG, RUST_LOG";

struct Options {
    seed: Option<u64>,
    session: Option<String>,
}

fn parse_options(args: &[String]) -> Result<Options> {
    let mut options = Options {
        seed: None,
        session: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                let value = args.get(i).ok_or_else(|| anyhow!("--seed needs a value"))?;
                options.seed = Some(
                    value
                        .parse()
                        .map_err(|_| anyhow!("Invalid --seed value: {value}"))?,
                );
            }
            "--session" => {
                i += 1;
                let value = args.get(i).ok_or_else(|| anyhow!("--session needs a value"))?;
                options.session = Some(value.clone());
            }
            other => bail!("Unknown option: {other}"),
        }
        i += 1;
    }
    Ok(options)
}

fn parse_experiment(value: &str) -> Result<Experiment> {
    Experiment::parse(value).ok_or_else(|| anyhow!("Unknown experiment: {value}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{USAGE}");
        return Ok(());
    };
    if command == "--help" || command == "-h" {
        println!("{USAGE}");
        return Ok(());
    }
    let target = args
        .get(1)
        .ok_or_else(|| anyhow!("{command} needs an argument\n\n{USAGE}"))?;
    let options = parse_options(&args[2..])?;

    if command == "generate" {
        let kind = SequenceKind::parse(target).ok_or_else(|| {
            let names: Vec<&str> = SEQUENCE_KINDS.iter().map(|kind| kind.as_str()).collect();
            anyhow!("Unknown sequence {target}; expected one of {}", names.join(", "))
        })?;
        cognilab_lib::utils::logging::init();
        let config = cognilab_lib::settings::SettingsStore::from_env().trial_config();
        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let trials = generate_json(kind, &config, &mut rng)?;
        println!("{}", serde_json::to_string_pretty(&trials)?);
        return Ok(());
    }

    let experiment = parse_experiment(target)?;
    let lab = cognilab_lib::run()?;
    let session = options.session.as_deref();

    match command.as_str() {
        "summary" => {
            let summary = lab.summary(experiment, session).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        "export" => {
            print!("{}", lab.export_csv(experiment, session).await?);
        }
        "clear" => {
            let session = session.ok_or_else(|| anyhow!("clear needs --session ID"))?;
            let owner = lab.db().get_session(session).await?;
            match owner {
                Some(record) if record.experiment != experiment => bail!(
                    "Session {session} belongs to {}, not {}",
                    record.experiment.as_str(),
                    experiment.as_str()
                ),
                Some(_) => {
                    lab.clear_session(session).await?;
                    println!("Cleared session {session}");
                }
                None => println!("No session {session}"),
            }
        }
        other => bail!("Unknown command: {other}\n\n{USAGE}"),
    }

    Ok(())
}
