use clap::{Parser, Subcommand};
use fresh_lens_lib::models::weather_types::Coordinates;
use fresh_lens_lib::{build_session, init_logging, AppConfig, AppError, ImageSource, Phase, StorageCondition};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "fresh-lens", version, about = "Identify food and estimate its shelf life")]
struct Cli {
    /// TOML configuration file
    #[arg(long, short, env = "FRESHLENS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the top three predictions for an image
    Classify { image: PathBuf },

    /// Classify, then estimate shelf life for one of the predictions
    Predict {
        image: PathBuf,

        /// 1-based rank of the prediction to use
        #[arg(long, default_value_t = 1)]
        pick: usize,

        #[arg(long)]
        storage: Option<StorageCondition>,

        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let mut config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Classify { image } => {
            let session = build_session(&config);
            let state = session.choose_image(ImageSource::File(image)).await;
            if let Some(err) = state.error_message {
                return Err(err.into());
            }
            print_results(&state.top_results);
        }
        Command::Predict {
            image,
            pick,
            storage,
            lat,
            lon,
        } => {
            if let (Some(latitude), Some(longitude)) = (lat, lon) {
                config.location = Some(Coordinates { latitude, longitude });
            }
            let session = build_session(&config);

            let state = session.choose_image(ImageSource::File(image)).await;
            if let Some(err) = state.error_message {
                return Err(err.into());
            }
            print_results(&state.top_results);

            let state = session.select(pick.saturating_sub(1)).await;
            if state.phase != Phase::FoodSelected {
                return Err(format!("No prediction at rank {}", pick).into());
            }
            if let Some(storage) = storage {
                session.set_storage(storage).await;
            }

            let state = session.request_prediction().await;
            if let Some(weather) = &state.weather {
                println!(
                    "Weather: {} {:.1}°C / {}%",
                    weather.city, weather.temp_c, weather.humidity_pct
                );
            }
            match (state.prediction_text, state.error_message) {
                (Some(text), _) => println!("Estimated shelf life ({}): {}", state.storage, text),
                (None, Some(err)) => return Err(err.into()),
                (None, None) => return Err("Prediction did not complete".into()),
            }
        }
    }

    Ok(())
}

fn print_results(results: &[fresh_lens_lib::ClassificationResult]) {
    if results.is_empty() {
        println!("No predictions");
    }
    for (rank, result) in results.iter().enumerate() {
        println!("{}. {} ({:.1}%)", rank + 1, result.label, result.score * 100.0);
    }
}
