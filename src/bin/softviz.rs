//! Synthetic synchrotron image renderer
//!
//! Renders SOFT images to PNG or SVG files, e.g.
//! ```shell
//! softviz "runs/*.mat" -o figures --quantity linpolfrac --colorbar --overlay wall --overlay separatrix
//! ```
//! The render settings apply to every input file. Polarimetric images can be
//! shown as a grid of panels, one per quantity, e.g.
//! ```shell
//! softviz run.mat -o stokes.png --panel I --panel Q --panel U --panel V --rows 2 --labels --colorbar
//! ```

use std::{fs::File, path::PathBuf};

use anyhow::Context;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use softviz::{
    loader::Loader,
    projection::SectionLimits,
    render::{
        export::{self, ExportOptions},
        Alignment, Assembler, Caption, IntensitySlider, Overlay, PanelGrid, PanelLabel,
        RenderState, Scene,
    },
    stokes::Quantity,
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "softviz")]
struct Opt {
    /// Image files or glob patterns (.dat, .topview, .mat, .h5)
    #[structopt(required = true)]
    inputs: Vec<String>,
    /// Output file for a single input, output directory otherwise
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,
    /// Output format of the files written to the output directory
    #[structopt(long, default_value = "png")]
    format: String,
    /// Displayed quantity: I, Q, -Q, U, -U, V, -V, linpolfrac, polangle, ...
    #[structopt(short, long, default_value = "I")]
    quantity: Quantity,
    /// Colormap
    #[structopt(short, long, default_value = "GeriMap")]
    colormap: String,
    /// Reversed colormap
    #[structopt(long)]
    invert: bool,
    /// Logarithmic color scale
    #[structopt(long)]
    log: bool,
    /// Intensity ceiling [% of the image maximum]
    #[structopt(short, long, default_value = "100")]
    intensity: f64,
    /// Divides the intensity ceiling by 100
    #[structopt(long)]
    bright: bool,
    /// Draws the colorbar
    #[structopt(long)]
    colorbar: bool,
    /// Colorbar ticks on round values instead of % of the color maximum
    #[structopt(long)]
    native: bool,
    /// Geometry overlay: wall, separatrix, topview, topview-separatrix,
    /// topview-orthogonal-cross-section, flux-surfaces, detector-normal, wall-sweep
    #[structopt(long = "overlay")]
    overlays: Vec<Overlay>,
    /// CSV file of captions with the header `x,y,fontsize,text`
    #[structopt(long, parse(from_os_str))]
    captions: Option<PathBuf>,
    /// Hides the pixels below the given fraction of the color maximum
    #[structopt(long)]
    mask: Option<f64>,
    /// GeriMap transparency ramp over the bottom fraction of the colormap
    #[structopt(long)]
    transparency: Option<f64>,
    /// Wall cross-section outer radius limit [m]
    #[structopt(long)]
    r_max: Option<f64>,
    /// Wall cross-section upper height limit [m]
    #[structopt(long)]
    z_max: Option<f64>,
    /// Wall cross-section lower height limit [m]
    #[structopt(long)]
    z_min: Option<f64>,
    /// Multi-panel view quantity, one panel per occurrence in row-major order
    #[structopt(long = "panel")]
    panels: Vec<Quantity>,
    /// Number of panel rows
    #[structopt(long, default_value = "1")]
    rows: usize,
    /// Number of panel columns [default: the panels spread over the rows]
    #[structopt(long)]
    cols: Option<usize>,
    /// Writes the quantity name on each panel
    #[structopt(long)]
    labels: bool,
    /// Panel label abscissa [fraction of the panel width]
    #[structopt(long, default_value = "0.9")]
    label_x: f64,
    /// Panel label ordinate [fraction of the panel height]
    #[structopt(long, default_value = "0.9")]
    label_y: f64,
    /// Panel label font size [pt]
    #[structopt(long, default_value = "22")]
    label_size: f64,
    /// Panel label alignment: left, center or right
    #[structopt(long, default_value = "right")]
    label_align: Alignment,
    /// Output resolution
    #[structopt(long, default_value = "100")]
    dpi: f64,
    /// Output width [inch]
    #[structopt(long, default_value = "6")]
    size: f64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let mut inputs = Vec::new();
    for pattern in &opt.inputs {
        for path in glob(pattern)? {
            inputs.push(path?);
        }
    }
    anyhow::ensure!(!inputs.is_empty(), "no input file matches {:?}", opt.inputs);

    let ceiling = IntensitySlider {
        percent: opt.intensity,
        bright: opt.bright,
    }
    .fraction();
    let mut state = RenderState::default()
        .quantity(opt.quantity)
        .logarithmic(opt.log)
        .ceiling(ceiling)
        .mask(opt.mask)
        .colorbar(opt.colorbar, !opt.native)
        .panel_label(opt.labels.then(|| PanelLabel {
            x: opt.label_x,
            y: opt.label_y,
            fontsize: opt.label_size,
            alignment: opt.label_align,
        }))
        .limits(SectionLimits {
            r_max: opt.r_max,
            z_max: opt.z_max,
            z_min: opt.z_min,
        });
    for overlay in &opt.overlays {
        state = state.overlay(*overlay);
    }
    if let Some(path) = &opt.captions {
        let file = File::open(path).with_context(|| format!("failed to open {:?}", path))?;
        state = state.captions(Caption::from_csv(file)?);
    }

    let grid = if opt.panels.is_empty() {
        None
    } else {
        let rows = opt.rows.max(1);
        let cols = opt
            .cols
            .unwrap_or_else(|| (opt.panels.len() + rows - 1) / rows);
        Some(PanelGrid::new(rows, cols, opt.panels.clone())?)
    };

    let mut assembler = Assembler::new(state);
    if opt.transparency.is_some() {
        assembler.register_gerimap(opt.transparency)?;
    }
    assembler.set_colormap(&opt.colormap, opt.invert)?;

    let single_file = inputs.len() == 1
        && opt
            .output
            .as_ref()
            .map_or(false, |path| path.extension().is_some());
    let output_dir = opt.output.clone().unwrap_or_else(|| PathBuf::from("."));
    if !single_file {
        std::fs::create_dir_all(&output_dir)?;
    }
    let options = ExportOptions {
        dpi: opt.dpi,
        size: opt.size,
    };

    let loader = Loader::default();
    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar().template("{bar:40.cyan/blue} {pos:>4}/{len:4} {msg}")?,
    );
    for input in inputs {
        pb.set_message(input.display().to_string());
        let report = assembler
            .load_file(&loader, &input)
            .with_context(|| format!("failed to load {:?}", input))?;
        log::info!("{:?}: {:?}", input, report);
        let path = if single_file {
            output_dir.clone()
        } else {
            let stem = input.file_stem().unwrap_or_default();
            output_dir.join(stem).with_extension(&opt.format)
        };
        match &grid {
            Some(grid) => {
                let panels = assembler.assemble_panels(grid)?;
                export::save_panels(&panels, &path, &options)?;
            }
            None => {
                let mut scene = Scene::new(assembler.state().background);
                assembler.assemble(&mut scene)?;
                export::save(&scene, &path, &options)?;
            }
        }
        pb.inc(1);
    }
    pb.finish();
    Ok(())
}
