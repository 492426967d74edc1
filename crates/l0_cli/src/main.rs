use argh::FromArgs;
use std::path::{Path, PathBuf};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use image::{DynamicImage, GrayImage, RgbImage};
use log::info;
use ndarray::Array3;

use l0_core::{l0_smooth_with_progress, signal_from_u8, signal_to_u8, L0Config};

#[derive(FromArgs)]
/// Edge-preserving smoothing of an image by L0 gradient minimization
struct Args {
    /// path of the image to smooth
    #[argh(positional)]
    input: PathBuf,

    /// path of the smoothed image; the format follows the extension
    #[argh(positional)]
    output: PathBuf,

    /// smoothing strength, typically in [1e-3, 1e-1]
    #[argh(option, default = "2e-2")]
    lambda: f64,

    /// growth rate of the penalty weight, in (1, 2]
    #[argh(option, default = "2.0")]
    kappa: f64,

    /// penalty weight at which iteration stops
    #[argh(option, default = "1e5")]
    beta_max: f64,

    /// process the image as a single grayscale channel
    #[argh(switch)]
    gray: bool,
}

fn load_image(img: DynamicImage, gray: bool) -> Result<Array3<u8>, Box<dyn std::error::Error>> {
    let (width, height) = (img.width() as usize, img.height() as usize);
    let (channels, raw) = if gray || !img.color().has_color() {
        (1, img.into_luma8().into_raw())
    } else {
        (3, img.into_rgb8().into_raw())
    };
    Ok(Array3::from_shape_vec((height, width, channels), raw)?)
}

fn save_image(image: &Array3<u8>, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (height, width, channels) = image.dim();
    let raw: Vec<u8> = image.iter().copied().collect();
    let (width, height) = (width as u32, height as u32);

    match channels {
        1 => GrayImage::from_raw(width, height, raw)
            .ok_or("grayscale buffer does not match image size")?
            .save(path)?,
        _ => RgbImage::from_raw(width, height, raw)
            .ok_or("rgb buffer does not match image size")?
            .save(path)?,
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();

    let config = L0Config::new()
        .with_lambda(args.lambda)
        .with_kappa(args.kappa)
        .with_beta_max(args.beta_max);
    config.validate()?;

    let image = load_image(image::open(&args.input)?, args.gray)?;
    let (height, width, channels) = image.dim();
    info!(
        "loaded {} ({}x{}, {} channel(s))",
        args.input.display(),
        width,
        height,
        channels
    );

    // create a cancel token to stop the solver between iterations
    let cancel_token = Arc::new(AtomicBool::new(false));

    ctrlc::set_handler({
        let cancel_token = cancel_token.clone();
        move || {
            println!("Received Ctrl-C signal. Sending cancel signal !!");
            cancel_token.store(true, Ordering::SeqCst);
        }
    })?;

    let signal = signal_from_u8::<f64>(image.view());
    let start = std::time::Instant::now();
    let smoothed = l0_smooth_with_progress(
        signal.view(),
        &config,
        Some(cancel_token.as_ref()),
        |iteration, total| {
            if iteration == total || iteration % 5 == 0 {
                info!("iteration {}/{}", iteration, total);
            }
        },
    )?;
    info!("smoothing took {:.3}s", start.elapsed().as_secs_f64());

    save_image(&signal_to_u8(smoothed.view()), &args.output)?;
    info!("saved {}", args.output.display());

    Ok(())
}
