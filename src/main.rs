#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod association;
mod config;
mod launch;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli_args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut notices = Vec::new();
    let target_file = match launch::parse_target_file_from_args(&cli_args) {
        Ok(target) => target,
        Err(err) => {
            log::warn!("Ignoring launch arguments: {err}");
            notices.push(format!("Launch args error: {err}"));
            None
        }
    };

    let config_path = config::config_file_path();
    let loaded = config::load_or_create(&config_path);
    notices.extend(loaded.notice);
    let config = loaded.config;
    let initial_status = (!notices.is_empty()).then(|| notices.join("\n"));

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([500.0, 400.0])
            .with_resizable(false),
        ..Default::default()
    };

    eframe::run_native(
        app::APP_TITLE,
        native_options,
        Box::new(move |_cc| {
            Ok(Box::new(app::SlicerLauncherApp::new(
                config.clone(),
                config_path.clone(),
                target_file.clone(),
                initial_status.clone(),
            )))
        }),
    )
}
