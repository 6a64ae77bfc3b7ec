use std::io::{self, Read};

use gumdrop::Options;
use serde::Serialize;

use hantypo::hangul;
use hantypo::transformer::{TypoCandidate, TypoTransformer};

trait OutputWriter {
    fn write_candidates(&mut self, text: &str, candidates: &[TypoCandidate]);
    fn finish(&mut self);
}

struct StdoutWriter;

impl OutputWriter for StdoutWriter {
    fn write_candidates(&mut self, text: &str, candidates: &[TypoCandidate]) {
        println!("Input: {}", text);
        for candidate in candidates {
            println!("{:>8.2}: {}", candidate.cost(), candidate.value());
        }
        println!();
    }

    fn finish(&mut self) {}
}

#[derive(Serialize)]
struct CandidateRequest {
    text: String,
    candidates: Vec<TypoCandidate>,
}

#[derive(Serialize)]
struct JsonWriter {
    results: Vec<CandidateRequest>,
}

impl JsonWriter {
    pub fn new() -> JsonWriter {
        JsonWriter { results: vec![] }
    }
}

impl OutputWriter for JsonWriter {
    fn write_candidates(&mut self, text: &str, candidates: &[TypoCandidate]) {
        self.results.push(CandidateRequest {
            text: text.to_owned(),
            candidates: candidates.to_vec(),
        });
    }

    fn finish(&mut self) {
        println!("{}", serde_json::to_string_pretty(self).unwrap());
    }
}

#[derive(Debug, Options)]
struct Args {
    #[options(help = "print help message")]
    help: bool,

    #[options(command)]
    command: Option<Command>,
}

#[derive(Debug, Options)]
enum Command {
    #[options(help = "generate typo candidates for provided input")]
    Generate(GenerateArgs),

    #[options(help = "print input in decomposed jamo units")]
    Decompose(DecomposeArgs),
}

#[derive(Debug, Options)]
struct GenerateArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(
        help = "rule preset to use: none, basic, continual or basic-continual",
        default = "basic"
    )]
    preset: String,

    #[options(help = "maximum cost of a candidate", default = "2.5")]
    threshold: f32,

    #[options(no_short, help = "multiply every rule cost by this factor")]
    scale: Option<f32>,

    #[options(no_short, long = "json", help = "output in JSON format")]
    use_json: bool,

    #[options(free, help = "texts to be processed")]
    inputs: Vec<String>,
}

#[derive(Debug, Options)]
struct DecomposeArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(free, help = "text to be decomposed")]
    inputs: Vec<String>,
}

fn read_inputs(inputs: Vec<String>) -> Vec<String> {
    if inputs.is_empty() {
        eprintln!("Reading from stdin...");
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .expect("reading stdin");
        buffer
            .trim()
            .split('\n')
            .map(|x| x.trim().to_string())
            .collect()
    } else {
        inputs
    }
}

fn preset(name: &str) -> anyhow::Result<TypoTransformer> {
    match name {
        "none" => Ok(TypoTransformer::without_typo()),
        "basic" => Ok(TypoTransformer::basic()),
        "continual" => Ok(TypoTransformer::continual()),
        "basic-continual" => Ok(TypoTransformer::basic_with_continual()),
        other => anyhow::bail!("unknown preset: {}", other),
    }
}

fn generate(args: GenerateArgs) -> anyhow::Result<()> {
    let mut typos = preset(&args.preset)?;
    if let Some(factor) = args.scale {
        typos.scale_cost(factor)?;
    }
    let prepared = typos.compile();

    let mut writer: Box<dyn OutputWriter> = if args.use_json {
        Box::new(JsonWriter::new())
    } else {
        Box::new(StdoutWriter)
    };

    for text in read_inputs(args.inputs) {
        let candidates: Vec<TypoCandidate> =
            prepared.generate(&text, args.threshold).iter().collect();
        writer.write_candidates(&text, &candidates);
    }

    writer.finish();

    Ok(())
}

fn decompose(args: DecomposeArgs) -> anyhow::Result<()> {
    for text in read_inputs(args.inputs) {
        let units = hangul::decompose(&text);
        let rendered: Vec<String> = units.iter().map(|u| format!("U+{:04X}", *u as u32)).collect();
        println!("{}: {}", text, rendered.join(" "));
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let args = Args::parse_args_default_or_exit();

    match args.command {
        None => Ok(()),
        Some(Command::Generate(args)) => generate(args),
        Some(Command::Decompose(args)) => decompose(args),
    }
}
