use docopt::Docopt;
use serde_derive::Deserialize;

use mazeframes::{
    generators::{self, RecursiveBacktracker},
    grid::Grid,
    renderers::{FrameRenderer, GifRecorder, TileSet},
    schedulers,
    units::{Height, StepsPerTick, Width},
};
use rand::rngs::StdRng;
use rand::SeedableRng;

const USAGE: &str = "Mazeframes

Usage:
    mazeframes_driver -h | --help
    mazeframes_driver [--grid-width=<w> --grid-height=<h>] [--steps-per-tick=<n>] [--seed=<s>] [--sprite=<path>] [--gif-out=<path>] [--frame-delay=<ms>] [--image-out=<path>] [--carve-doorways] [--text]

Options:
    -h --help             Show this screen.
    --grid-width=<w>      The grid width in a w*h grid [default: 20].
    --grid-height=<h>     The grid height in a w*h grid [default: 20].
    --steps-per-tick=<n>  Generator steps executed per rendered frame, minimum 1 [default: 1].
    --seed=<s>            Fix the random seed so the same maze is rebuilt every run.
    --sprite=<path>       Sprite sheet to slice into tiles, a horizontal strip of squares. A built-in palette is used when absent.
    --gif-out=<path>      Record every generation frame into an animated gif at this path.
    --frame-delay=<ms>    Gif frame delay in milliseconds [default: 20].
    --image-out=<path>    Save the finished maze as a still image. Always PNG format.
    --carve-doorways      Open an entry doorway on the first room and an exit on the last, after generation.
    --text                Print the finished maze to stdout as ascii art.
";

#[derive(Debug, Deserialize)]
struct DriverArgs {
    flag_grid_width: usize,
    flag_grid_height: usize,
    flag_steps_per_tick: usize,
    flag_seed: Option<u64>,
    flag_sprite: String,
    flag_gif_out: String,
    flag_frame_delay: u32,
    flag_image_out: String,
    flag_carve_doorways: bool,
    flag_text: bool,
}

mod errors {
    // Create the Error, ErrorKind, ResultExt, and Result types
    // Result is a typedef of std `Result` with the error type our own `Error`.
    use error_chain::*;
    error_chain! {

        foreign_links {
            DocOptFailure(::docopt::Error);
            ImageWriteError(::image::ImageError);
            GridError(::mazeframes::grid::InvalidDimension);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {
    env_logger::init();

    let args: DriverArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;

    if args.flag_steps_per_tick == 0 {
        return Err("--steps-per-tick must be at least 1".into());
    }

    let mut grid = Grid::new(Width(args.flag_grid_width), Height(args.flag_grid_height))?;

    let (mut walk, mut background_rng) = match args.flag_seed {
        Some(seed) => (RecursiveBacktracker::with_seed(&mut grid, seed),
                       StdRng::seed_from_u64(seed)),
        None => (RecursiveBacktracker::new(&mut grid), StdRng::from_entropy()),
    };

    let tiles = if args.flag_sprite.is_empty() {
        TileSet::baked()
    } else {
        TileSet::from_sprite_sheet(&args.flag_sprite)
            .chain_err(|| format!("Failed to load sprite sheet {}", args.flag_sprite))?
    };

    let mut renderer = FrameRenderer::new(&grid, tiles, &mut background_rng);

    let mut recorder = if args.flag_gif_out.is_empty() {
        None
    } else {
        Some(GifRecorder::create(&args.flag_gif_out, args.flag_frame_delay)
            .chain_err(|| format!("Failed to create gif file {}", args.flag_gif_out))?)
    };

    // The scheduler's progress hook cannot return an error, so a failed frame
    // write is stashed and surfaced once the run ends.
    let mut capture_failure: Option<image::ImageError> = None;
    schedulers::run_to_completion(&mut grid,
                                  &mut walk,
                                  StepsPerTick(args.flag_steps_per_tick),
                                  |snapshot, generator| {
                                      let frame = renderer.draw(snapshot, generator.current());
                                      if let Some(gif) = recorder.as_mut() {
                                          if capture_failure.is_none() {
                                              capture_failure = gif.add_frame(frame).err();
                                          }
                                      }
                                  },
                                  |_| {});
    if let Some(gif_error) = capture_failure {
        return Err(gif_error)
            .chain_err(|| format!("Failed to record a frame to {}", args.flag_gif_out));
    }

    if args.flag_carve_doorways {
        generators::carve_doorways(&mut grid);
    }

    // One closing frame: doorways applied, no cursor left on the grid.
    let final_frame = renderer.draw(&grid, None);
    if let Some(gif) = recorder.as_mut() {
        gif.add_frame(final_frame)
            .chain_err(|| format!("Failed to record the final frame to {}", args.flag_gif_out))?;
    }

    if !args.flag_image_out.is_empty() {
        mazeframes::renderers::save_still(final_frame, &args.flag_image_out)
            .chain_err(|| format!("Failed to write maze image to {}", args.flag_image_out))?;
    }

    if args.flag_text {
        println!("{}", grid);
    }

    Ok(())
}
