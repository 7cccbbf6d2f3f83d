use sphere_shell::SceneConfig;

fn main() -> anyhow::Result<()> {
    sphere_shell::app::run(SceneConfig::default())
}
