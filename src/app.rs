//! Application entry point for a stretch run.
//!
//! Turns parsed arguments and configuration into run parameters, opens the
//! source and sink, and drives the pipeline.

use crate::audio::{SampleSource, SpooledWavSink, WavSink, WavSource};
use crate::cli::Cli;
use crate::config::Config;
use crate::error::{Result, WavstretchError};
use crate::pipeline::{InputSelector, OutputSelector, Pipeline, RunParameters, RunSummary, StatusReporter};
use crate::stretch::AdjustmentParameters;

/// Build run parameters from the command line, with config as the base.
///
/// Flags only ever turn features on (`--quick`, `--speech`) or off (`--naa`)
/// relative to the config file.
pub fn run_parameters(cli: &Cli, config: &Config) -> Result<RunParameters> {
    let Some(input) = cli.input.as_deref() else {
        return Err(WavstretchError::configuration("input", "no input given"));
    };

    let mut processing = config.processing.clone();
    processing.quick_seek |= cli.quick;
    processing.anti_alias &= !cli.naa;
    processing.speech |= cli.speech;

    let mut params = RunParameters::new(
        config.resolve_input(input),
        cli.output.as_deref().map(|name| config.resolve_output(name)),
    );
    params.adjustments = AdjustmentParameters {
        tempo_delta_percent: cli.tempo,
        pitch_semitones: cli.pitch,
        rate_delta_percent: cli.rate,
    };
    params.bpm = cli.bpm_request();
    params.settings = processing.engine_settings();
    params.buffer_capacity = processing.buffer_capacity;

    params.adjustments.validate()?;
    params.settings.validate()?;
    Ok(params)
}

/// Open the input named by `selector`.
pub fn open_source(selector: &InputSelector) -> Result<Box<dyn SampleSource>> {
    Ok(match selector {
        InputSelector::Path(path) => Box::new(WavSource::open(path)?),
        InputSelector::Stdin => Box::new(WavSource::from_stdin()?),
    })
}

/// Run the whole stretch: open, analyze, transform, write.
///
/// The sink is created only after the source has been opened and validated,
/// so a bad input never leaves an empty output file behind.
pub fn run_stretch(params: &RunParameters, reporter: &dyn StatusReporter) -> Result<RunSummary> {
    let mut source = open_source(&params.input)?;
    let descriptor = source.descriptor();
    descriptor.validate()?;

    let mut pipeline = Pipeline::new(params, reporter);
    match &params.output {
        None => pipeline.run(source.as_mut(), None),
        Some(OutputSelector::Path(path)) => {
            let mut sink = WavSink::create(path, descriptor)?;
            pipeline.run(source.as_mut(), Some(&mut sink))
        }
        Some(OutputSelector::Stdout) => {
            let mut sink = SpooledWavSink::to_stdout(descriptor)?;
            pipeline.run(source.as_mut(), Some(&mut sink))
        }
    }
}
