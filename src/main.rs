use std::{env, fs, fs::File};

use anyhow::{Context, Result, bail};
use log::info;
use serde::Serialize;
use simplelog::{LevelFilter, WriteLogger};

use speakable::{
    DomTree, EngineEvent, SimulatedEngine, Speakables, Utterance, Voice, WidgetOptions,
};

const USAGE: &str = "Usage: speakable [--config FILE] [--selector SEL] [--multi-voice] \
                     [--json] [--simulate] [--log FILE] <input.html>";

#[derive(Debug, Default)]
struct CliArgs {
    config: Option<String>,
    selector: Option<String>,
    multi_voice: bool,
    json: bool,
    simulate: bool,
    log_file: Option<String>,
    input: String,
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut input = None;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => parsed.config = Some(iter.next().context(USAGE)?.clone()),
            "--selector" => parsed.selector = Some(iter.next().context(USAGE)?.clone()),
            "--log" => parsed.log_file = Some(iter.next().context(USAGE)?.clone()),
            "--multi-voice" => parsed.multi_voice = true,
            "--json" => parsed.json = true,
            "--simulate" => parsed.simulate = true,
            "-h" | "--help" => bail!(USAGE),
            flag if flag.starts_with("--") => bail!("Unknown option {flag}\n{USAGE}"),
            path => {
                if input.replace(path.to_string()).is_some() {
                    bail!("Only one input file is supported\n{USAGE}");
                }
            }
        }
    }

    parsed.input = input.context(USAGE)?;
    Ok(parsed)
}

fn init_logging(log_file: Option<&str>) -> Result<()> {
    // html5ever is chatty at debug level
    let config = simplelog::ConfigBuilder::new()
        .set_max_level(LevelFilter::Debug)
        .add_filter_ignore_str("html5ever")
        .build();

    match log_file {
        Some(path) => WriteLogger::init(
            LevelFilter::Debug,
            config,
            File::create(path).with_context(|| format!("Failed to create log file {path}"))?,
        )?,
        None => WriteLogger::init(LevelFilter::Warn, config, std::io::stderr())?,
    }
    Ok(())
}

#[derive(Serialize)]
struct WidgetReport<'a> {
    element: usize,
    language: &'a str,
    utterances: &'a [Utterance],
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let args = parse_args(&args)?;
    init_logging(args.log_file.as_deref())?;

    let mut options = WidgetOptions::load_or_default(args.config.as_deref());
    if let Some(selector) = args.selector {
        options.selector = selector;
    }
    options.multi_voice |= args.multi_voice;

    let html = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input))?;
    let tree = DomTree::parse_html(&html);

    let engine = SimulatedEngine::with_voices(vec![
        Voice::new("Simulated English", "en-US").as_default(),
        Voice::new("Simulated German", "de-DE"),
        Voice::new("Simulated French", "fr-FR"),
    ]);
    let mut speakables = Speakables::init(&tree, &options, Some(Box::new(engine.clone())))
        .context("Failed to set up widgets")?;
    info!(
        "Found {} widgets matching '{}' in {}",
        speakables.len(),
        options.selector,
        args.input
    );

    if args.json {
        print_json(&speakables)?;
    } else {
        print_plain(&speakables);
    }

    if args.simulate {
        for index in 0..speakables.len() {
            simulate(&mut speakables, &engine, index);
        }
    }

    Ok(())
}

fn print_json(speakables: &Speakables) -> Result<()> {
    let reports: Vec<WidgetReport<'_>> = speakables
        .widgets()
        .iter()
        .enumerate()
        .map(|(index, widget)| WidgetReport {
            element: widget.element().index(),
            language: widget.language(),
            utterances: speakables.utterances(index),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

fn print_plain(speakables: &Speakables) {
    for (index, widget) in speakables.widgets().iter().enumerate() {
        println!("Widget {index} ({})", widget.language());
        for utterance in speakables.utterances(index) {
            println!("  [{}] {}", utterance.language, utterance.text);
        }
    }
}

fn simulate(speakables: &mut Speakables, engine: &SimulatedEngine, index: usize) {
    println!("\nPlaying widget {index}");
    speakables.play(index);

    let mut last_progress = None;
    while let Some(event) = engine.next_event() {
        speakables.handle_event(event);
        if let EngineEvent::ProgressReported(_) = event {
            let progress = speakables.progress(index);
            if last_progress != Some(progress) {
                println!(
                    "[progress {progress:>3}%] {}",
                    speakables.spoken_sentence(index).unwrap_or_default()
                );
                last_progress = Some(progress);
            }
        }
    }

    if let Some(controls) = speakables.controls(index) {
        println!("{}", controls.to_html());
    }
}
