use wetcloth_viz::prelude::*;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let resolution = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(24);

    let result = Viewer::new(demo::wet_cloth(resolution))
        .with_title("wetcloth-viz")
        .with_update(demo::advance)
        .run();

    if let Err(err) = result {
        log::error!("{err}");
        std::process::exit(1);
    }
}
