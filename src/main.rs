use anyhow::Result;
use log::info;
use shaderlab::{app::App, config, scenes::Exercise};
use simple_logger::SimpleLogger;

fn run() -> Result<()> {
    let mut config = config::load_or_create_config()?;
    if let Some(name) = std::env::args().nth(1) {
        config.exercise = name.parse::<Exercise>()?;
    }

    SimpleLogger::new().with_level(config.level_filter()?).init()?;
    info!("Running exercise {}", config.exercise);

    let (app, event_loop) = App::new(config)?;
    app.run(event_loop)
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(-1);
    }
}
