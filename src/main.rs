use std::time::Instant;

use anyhow::Result;
use mirror::output;
use mirror::settings;
use mirror::sweep::CancellationToken;

fn main() -> Result<()> {
    env_logger::init();

    let settings = settings::load_config()?;
    println!("{}", settings);

    let sweep = settings.build_sweep()?;
    let start = Instant::now();
    let result = sweep.run(&CancellationToken::new())?;
    println!("Time taken: {:.2?}", start.elapsed());

    let table = output::write_result(&settings.output, &result)?;
    output::write_settings(&settings.output, &settings)?;
    println!("Results written to {}", table.display());
    Ok(())
}
