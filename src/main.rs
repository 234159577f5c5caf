use factorybase::{App, AppConfig, Hud};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "factorybase=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(2);
        }
    };

    info!(
        save_file = %config.save_file_path().display(),
        tick_ms = config.tick_interval.as_millis() as u64,
        "Starting factory base"
    );

    let app = App::new(config);
    app.initialize();
    let hud = Hud::attach(app.dispatcher.clone(), &app.game_instance);
    app.game_state.start_game();

    // Everything runs on this thread; the dispatcher is not Send
    let mut ticker = interval(app.config.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_time = String::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                app.tick(app.config.tick_interval);
                hud.update_time(app.game_instance.game_time());

                let view = hud.view();
                if view.time_text != last_time {
                    info!(
                        score = %view.score_text,
                        level = %view.level_text,
                        time = %view.time_text,
                        paused = view.pause_visible,
                        "HUD"
                    );
                    last_time = view.time_text;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
        }
    }

    drop(hud);
    if let Err(e) = app.shutdown() {
        error!(error = %e, "Failed to save game on shutdown");
    }
    info!("Factory base stopped");
}
