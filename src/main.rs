use anyhow::{bail, Result};
use emv_sim::{ColorMap, ConflictResolver, ExactReplay, GreedySimulator, GridRenderer, ScenarioConfig};

fn main() -> Result<()> {
    env_logger::init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let exact = args.iter().any(|arg| arg == "--exact");
    args.retain(|arg| arg != "--exact");
    if args.is_empty() {
        bail!("usage: emv-sim <scenario.json> [output.png] [--exact]");
    }
    let scenario = &args[0];
    let output = args.get(1).map(String::as_str).unwrap_or("simulation.png");

    let config = ScenarioConfig::load(scenario)?;

    let snapshots = if exact {
        let replay = ExactReplay::from_config(&config)?;
        println!("replay contains {} manoeuvres", replay.changes().total());
        replay.snapshots().to_vec()
    } else {
        GreedySimulator::new(&config).run(config.horizon)
    };

    let resolver = ConflictResolver::new(&config);
    let frames: Vec<_> = snapshots.iter().map(|s| resolver.frame(s)).collect();
    GridRenderer::new(&config, ColorMap::default()).render_strip(&frames, output)?;

    println!("wrote {}", output);
    Ok(())
}
