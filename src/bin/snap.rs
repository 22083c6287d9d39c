use clap::Parser;
use tracing::{debug, error};

use picapture::{logging, snapshot, Interrupt, ProcessModule, SnapshotConfig, SystemClock};

fn main() -> anyhow::Result<()> {
    let config = SnapshotConfig::parse();

    let interrupt = Interrupt::new();
    interrupt.install()?;

    logging::scoped(config.verbosity, || {
        debug!("{:?}", config);
        let mut module = ProcessModule::new(config.programs());
        match snapshot::run(&mut module, &config, &SystemClock::new(interrupt)) {
            Ok(captured) => {
                debug!("{} images captured", captured);
                Ok(())
            }
            Err(err) => {
                error!("{}", err);
                Err(err)
            }
        }
    })?;

    Ok(())
}
