use std::{path::PathBuf, process, sync::Arc, time::Duration};

use clap::{ArgAction, CommandFactory, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use vidbarcode::{
    BarcodeError, ErrorKind, FfmpegEngine, FfmpegLogLevel, GenerationOptions, Orchestrator,
    ProgressEvent, ProgressRenderer, RawRequest,
};

const CLI_AFTER_HELP: &str = "Examples:\n  vidbarcode video.mp4                                generate video.mp4.png of 1000 x 100 pixels\n  vidbarcode video.mp4 --style=vertical               compress individual frames to rows\n  vidbarcode video.mp4 -w 1920 -h 200 -o barcode.png  override size and name of the output file\n  vidbarcode video.mp4 -o live.bgra                   raw BGRA file, filled in while generating";

#[derive(Debug, Parser)]
#[command(
    name = "vidbarcode",
    version,
    about = "Compress a video into a barcode of colour-averaged frames",
    after_help = CLI_AFTER_HELP,
    disable_help_flag = true
)]
struct Cli {
    /// Barcode width; defaults to height*10, or 1000 pixels if both are unset.
    #[arg(short = 'w', long)]
    width: Option<u32>,

    /// Barcode height; defaults to width/10.
    #[arg(short = 'h', long)]
    height: Option<u32>,

    /// Output file; defaults to $(basename VIDEOFILE).png. A *.bgra file is a
    /// raw 32-bit BGRA buffer that is updated while the barcode is generated.
    #[arg(short = 'o', long, value_name = "FILENAME")]
    output: Option<PathBuf>,

    /// 'horizontal' (default) or 'vertical', which compresses frames down to
    /// rows and rotates them counterclockwise before appending.
    #[arg(short = 's', long, value_name = "STYLE")]
    style: Option<String>,

    /// Don't show the progress indicator.
    #[arg(short = 'q', long)]
    quiet: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, value_name = "LEVEL", default_value = "error", value_parser = parse_log_level)]
    log_level: FfmpegLogLevel,

    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Input video file.
    #[arg(value_name = "VIDEOFILE")]
    input: PathBuf,
}

fn parse_log_level(value: &str) -> Result<FfmpegLogLevel, String> {
    value.parse()
}

/// Two-phase terminal display: a spinner while the keyframe index is built,
/// then a percentage bar while columns are sampled.
struct TerminalProgress {
    bar: ProgressBar,
    sampling_style: ProgressStyle,
}

impl TerminalProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(100);
        let indexing_style = ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(indexing_style);

        let sampling_style =
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {msg}")
                .map(|style| style.progress_chars("##-"))
                .unwrap_or_else(|_| ProgressStyle::default_bar());

        Self {
            bar,
            sampling_style,
        }
    }
}

impl ProgressRenderer for TerminalProgress {
    fn on_event(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::IndexingStarted => {
                self.bar.set_message("Building keyframe index...");
                self.bar.enable_steady_tick(Duration::from_millis(100));
            }
            ProgressEvent::IndexingFinished => {
                self.bar.disable_steady_tick();
                self.bar
                    .println(format!("{} Building keyframe index... done.", "✓".green()));
                self.bar.set_style(self.sampling_style.clone());
                self.bar.set_message("");
                self.bar.set_position(0);
            }
            ProgressEvent::Sampling { percent } => {
                self.bar.set_position(u64::from(*percent));
            }
            ProgressEvent::Finished => {
                self.bar.set_position(100);
                self.bar.finish_with_message("done");
            }
        }
    }
}

fn run(cli: Cli) -> Result<(), BarcodeError> {
    vidbarcode::set_ffmpeg_log_level(cli.log_level);

    let raw = RawRequest {
        input: cli.input,
        width: cli.width,
        height: cli.height,
        style: cli.style,
        output: cli.output,
    };
    let (request, target) = vidbarcode::resolve(&raw)?;

    let mut options = GenerationOptions::new().with_quiet(cli.quiet);
    if !cli.quiet {
        options = options.with_renderer(Arc::new(TerminalProgress::new()));
    }

    let summary = Orchestrator::new(options).run::<FfmpegEngine>(&request, &target)?;

    if !cli.quiet {
        println!(
            "{} {}",
            "->".green().bold(),
            format!("'{}'", summary.output.display()).green()
        );
    }
    Ok(())
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) if error.use_stderr() => {
            let _ = error.print();
            process::exit(1);
        }
        Err(error) => error.exit(),
    };

    if let Err(error) = run(cli) {
        eprintln!("{} {error}", "error:".red().bold());
        if error.kind() == ErrorKind::Validation {
            eprintln!();
            eprintln!("{}", Cli::command().render_help());
        }
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;

    #[test]
    fn short_flags_match_the_documented_surface() {
        let cli = Cli::try_parse_from([
            "vidbarcode", "-w", "1920", "-h", "200", "-o", "out.bgra", "-s", "vertical", "-q",
            "video.mp4",
        ])
        .unwrap();
        assert_eq!(cli.width, Some(1920));
        assert_eq!(cli.height, Some(200));
        assert_eq!(cli.output.as_deref(), Some(std::path::Path::new("out.bgra")));
        assert_eq!(cli.style.as_deref(), Some("vertical"));
        assert!(cli.quiet);
    }

    #[test]
    fn exactly_one_input_is_required() {
        assert!(Cli::try_parse_from(["vidbarcode"]).is_err());
        assert!(Cli::try_parse_from(["vidbarcode", "a.mp4", "b.mp4"]).is_err());
    }

    #[test]
    fn negative_width_is_a_parse_error() {
        assert!(Cli::try_parse_from(["vidbarcode", "-w", "-5", "a.mp4"]).is_err());
    }

    #[test]
    fn log_level_defaults_to_error() {
        let cli = Cli::try_parse_from(["vidbarcode", "a.mp4"]).unwrap();
        assert_eq!(cli.log_level, vidbarcode::FfmpegLogLevel::Error);
        assert!(Cli::try_parse_from(["vidbarcode", "--log-level", "loud", "a.mp4"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
