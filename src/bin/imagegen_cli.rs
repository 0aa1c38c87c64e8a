//! imagegen-cli — command-line front end for the generation service
//!
//! Usage:
//!   imagegen-cli health                          Check service liveness
//!   imagegen-cli styles                          List available styles
//!   imagegen-cli models                          List text-to-image models
//!   imagegen-cli queue                           Show queue occupancy
//!   imagegen-cli generate <prompt> [options]     Generate an image
//!   imagegen-cli transform <image_url> <prompt>  Image-to-image

use anyhow::{anyhow, bail, Context};
use imagegen_client::{
    ClientConfig, GenerationRequest, GenerationResult, ImageClient, ProgressEvent,
    TransformRequest,
};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &[String]) -> anyhow::Result<()> {
    let Some(command) = args.first() else {
        print_usage();
        bail!("missing command");
    };

    match command.as_str() {
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        "version" | "--version" | "-V" => {
            println!("imagegen-cli {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "health" => cmd_health().await,
        "styles" => cmd_styles().await,
        "models" => cmd_models().await,
        "queue" => cmd_queue().await,
        "generate" => cmd_generate(&args[1..]).await,
        "transform" => cmd_transform(&args[1..]).await,
        other => {
            print_usage();
            bail!("unknown command: {other}")
        }
    }
}

fn print_usage() {
    println!(
        r#"imagegen-cli — image generation service client

USAGE:
    imagegen-cli <COMMAND> [OPTIONS]

COMMANDS:
    health                          Check service liveness
    styles                          List available styles
    models                          List text-to-image models
    queue                           Show queue occupancy
    generate <prompt> [OPTIONS]     Generate an image (queued unless --direct)
        --style <style>
        --resolution <WxH>
        --model <model>
        --negative <text>
        --enhance
        --direct
    transform <image_url> <prompt> [OPTIONS]
        --style <style>
        --resolution <WxH>
        --negative <text>
    version                         Show version information
    help                            Show this help message

ENVIRONMENT:
    IMAGEGEN_API_URL                Service base URL (default http://localhost:8000)
    IMAGEGEN_POLL_BUDGET_SECS       Give up on a queued job after this long
    RUST_LOG                        Log filter (default info)"#
    );
}

fn client() -> anyhow::Result<ImageClient> {
    ImageClient::new(ClientConfig::from_env()).context("invalid client configuration")
}

async fn cmd_health() -> anyhow::Result<()> {
    let client = client()?;
    if client.health().await {
        println!("ok ({})", client.config().base_url);
        Ok(())
    } else {
        bail!("service at {} is not healthy", client.config().base_url)
    }
}

async fn cmd_styles() -> anyhow::Result<()> {
    for style in client()?.list_styles_or_default().await {
        println!("{style}");
    }
    Ok(())
}

async fn cmd_models() -> anyhow::Result<()> {
    for (id, description) in client()?.list_models_or_default().await {
        println!("{id:<16} {description}");
    }
    Ok(())
}

async fn cmd_queue() -> anyhow::Result<()> {
    let q = client()?.queue_status().await?;
    println!(
        "pending: {}  processing: {}  slots: {}/{}",
        q.pending, q.processing, q.available_slots, q.max_concurrent
    );
    Ok(())
}

/// Options shared by `generate` and `transform`.
#[derive(Default)]
struct Options {
    positional: Vec<String>,
    style: Option<String>,
    resolution: Option<String>,
    model: Option<String>,
    negative: Option<String>,
    enhance: bool,
    direct: bool,
}

fn parse_options(args: &[String]) -> anyhow::Result<Options> {
    let mut opts = Options::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| anyhow!("{flag} requires a value"))
        };
        match arg.as_str() {
            "--style" => opts.style = Some(value("--style")?),
            "--resolution" => opts.resolution = Some(value("--resolution")?),
            "--model" => opts.model = Some(value("--model")?),
            "--negative" => opts.negative = Some(value("--negative")?),
            "--enhance" => opts.enhance = true,
            "--direct" => opts.direct = true,
            flag if flag.starts_with("--") => bail!("unknown option: {flag}"),
            _ => opts.positional.push(arg.clone()),
        }
    }
    Ok(opts)
}

async fn cmd_generate(args: &[String]) -> anyhow::Result<()> {
    let opts = parse_options(args)?;
    let prompt = opts.positional.join(" ");

    let mut request = GenerationRequest::new(prompt);
    if let Some(style) = opts.style {
        request = request.style(style);
    }
    if let Some(resolution) = opts.resolution {
        request = request.resolution(resolution);
    }
    if let Some(model) = opts.model {
        request = request.model(model);
    }
    if let Some(negative) = opts.negative {
        request = request.negative_prompt(negative);
    }
    if opts.enhance {
        request = request.enhance(true);
    }

    let client = client()?;
    let result = if opts.direct {
        client.generate_direct(&request).await?
    } else {
        let print_progress = |e: &ProgressEvent| eprintln!("{}", e.status_text);
        client.generate_with_progress(&request, &print_progress).await?
    };
    print_result(result)
}

async fn cmd_transform(args: &[String]) -> anyhow::Result<()> {
    let opts = parse_options(args)?;
    let (image_url, prompt) = match opts.positional.split_first() {
        Some((url, rest)) => (url.clone(), rest.join(" ")),
        None => bail!("transform requires <image_url> <prompt>"),
    };

    let mut request = TransformRequest::new(prompt, image_url);
    if let Some(style) = opts.style {
        request = request.style(style);
    }
    if let Some(resolution) = opts.resolution {
        request = request.resolution(resolution);
    }
    if let Some(negative) = opts.negative {
        request = request.negative_prompt(negative);
    }

    print_result(client()?.transform(&request).await?)
}

fn print_result(result: GenerationResult) -> anyhow::Result<()> {
    if !result.success {
        bail!(
            "{}",
            result
                .error
                .unwrap_or_else(|| "generation was not successful".to_string())
        );
    }
    match result.image_url {
        Some(url) => println!("{url}"),
        None => bail!("service reported success but returned no image URL"),
    }
    if let Some(seed) = result.seed {
        eprintln!("seed: {seed}");
    }
    if let Some(model) = result.model {
        eprintln!("model: {model}");
    }
    Ok(())
}
