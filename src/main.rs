//! Command-line front end for the pregnancy disease predictor.
//!
//! Usage:
//!   gestadx symptoms
//!   gestadx predict --present G6,G19
//!   gestadx predict --flags 0,0,0,0,0,1,...
//!   gestadx predict --json '{"G6": 1, "G19": 1}'

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gestadx::{DISCLAIMER, KnowledgeBase, Observation, Predictor, UnknownSymptomPolicy, load_model};
use log::debug;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gestadx")]
#[command(version)]
#[command(about = "Predict pregnancy complications from observed symptoms", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Classifier artifact (JSON)
    #[arg(short, long, env = "GESTADX_MODEL", default_value = "models/pregnancy_knn.json")]
    model: PathBuf,

    /// Symptom catalog and disease table (JSON); the built-in pregnancy tables when omitted
    #[arg(long)]
    knowledge_base: Option<PathBuf>,

    /// Ignore symptom codes that are not in the catalog instead of rejecting them
    #[arg(long)]
    allow_unknown_symptoms: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the symptom catalog in feature order
    Symptoms,

    /// Predict the most likely disease
    Predict(PredictArgs),
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct PredictArgs {
    /// Codes of the symptoms that are present, e.g. G6,G19
    #[arg(short, long, value_delimiter = ',')]
    present: Option<Vec<String>>,

    /// One 0/1 flag per catalog entry, in catalog order
    #[arg(short, long, value_delimiter = ',')]
    flags: Option<Vec<u8>>,

    /// Observation as JSON: an object of code -> flag, or an array of flags
    #[arg(short, long)]
    json: Option<String>,
}

impl PredictArgs {
    fn observation(self) -> Result<Observation> {
        if let Some(codes) = self.present {
            return Ok(Observation::from_present(codes));
        }
        if let Some(flags) = self.flags {
            return Ok(Observation::from_flags(&flags)?);
        }
        let text = self.json.unwrap_or_default();
        let value: serde_json::Value =
            serde_json::from_str(&text).context("observation is not valid JSON")?;
        Ok(Observation::from_json(&value)?)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut knowledge = match &cli.knowledge_base {
        Some(path) => KnowledgeBase::from_json_file(path)
            .with_context(|| format!("failed to load knowledge base {}", path.display()))?,
        None => KnowledgeBase::pregnancy(),
    };
    if cli.allow_unknown_symptoms {
        knowledge = knowledge.with_unknown_symptom_policy(UnknownSymptomPolicy::Ignore);
    }

    match cli.command {
        Commands::Symptoms => {
            for (i, symptom) in knowledge.catalog().iter().enumerate() {
                println!("{:>3}  {:<4} {}", i + 1, symptom.code, symptom.label);
                println!("           {}", symptom.description);
            }
        }
        Commands::Predict(args) => {
            // Refuse to serve anything until the artifact has loaded.
            let model = load_model(&cli.model)?;
            let predictor = Predictor::new(&model, &knowledge)?;
            debug!("{:?}", predictor);

            let observation = args.observation()?;
            let diagnosis = predictor.diagnose(&observation)?;
            println!("Prediction: {}", diagnosis);
            println!();
            println!("Note: {}", DISCLAIMER);
        }
    }

    Ok(())
}
