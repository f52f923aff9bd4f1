use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "infer-runner",
    version,
    about = "Score one feature payload with an ONNX model and print a JSON result line"
)]
pub struct Cli {
    #[arg(long, help = "Path to the ONNX model file")]
    pub model: PathBuf,
    #[arg(long, help = "Path to the JSON feature payload")]
    pub input: PathBuf,
}
