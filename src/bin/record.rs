use clap::Parser;
use tracing::{debug, error};

use picapture::{logging, record, Interrupt, ProcessModule, RecordConfig, SystemClock};

fn main() -> anyhow::Result<()> {
    let config = RecordConfig::parse();

    let interrupt = Interrupt::new();
    interrupt.install()?;

    logging::scoped(config.verbosity, || {
        debug!("{:?}", config);
        let mut module = ProcessModule::new(config.programs());
        record(&mut module, &config, &SystemClock::new(interrupt)).map_err(|err| {
            error!("{}", err);
            err
        })
    })?;

    Ok(())
}
