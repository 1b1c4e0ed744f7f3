use anyhow::Result;
use clap::Parser;
use parla::{
    create_router, AppState, CaptureController, Config, FileRecognizer, HttpSpeechToText,
    HttpSynthesizer, HttpTranslator, InputConfig, MicrophoneFactory, SpeechOutput, SpeechToText,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "parla", about = "Speech recognition, translation, and synthesis service")]
struct Args {
    /// Configuration file (without extension, per the config crate)
    #[arg(long, default_value = "config/parla")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} v0.1.0", cfg.service.name);

    let input_config = InputConfig {
        target_sample_rate: cfg.capture.sample_rate,
        target_channels: cfg.capture.channels,
        ..InputConfig::default()
    };
    let microphone = Arc::new(MicrophoneFactory::new(input_config));

    let speech: Arc<dyn SpeechToText> = Arc::new(HttpSpeechToText::new(&cfg.providers.speech)?);
    let controller = Arc::new(CaptureController::new(microphone, Arc::clone(&speech)));
    let recognizer = Arc::new(FileRecognizer::new(
        Arc::clone(&speech),
        PathBuf::from(&cfg.output.temp_dir),
    ));
    let translator = Arc::new(HttpTranslator::new(&cfg.providers.translation)?);
    let synthesizer = Arc::new(HttpSynthesizer::new(&cfg.providers.synthesis)?);
    let output = Arc::new(SpeechOutput::new(&cfg.output.audio_path));

    let state = AppState::new(
        controller,
        recognizer,
        translator,
        synthesizer,
        output,
        cfg.capture.clone(),
    );

    let router = create_router(state);
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("HTTP API listening on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
